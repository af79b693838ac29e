use std::sync::Arc;

use crate::components::root::{RootAction, RootReducer, RootState};
use crate::environment::types::AppEvent;
use crate::environment::{model::Model, repository::Repository, Environment};
use crate::environment::{LogNotifier, StaticConfirm};
use crate::error::Error;
use crate::store::Store;

/// Log to stdout as `file:line timestamp [LEVEL] - message`. `RUST_LOG`
/// wins over `filter`.
pub fn setup_logging(filter: &str) {
    use env_logger::Env;
    use std::io::Write;
    let result = env_logger::Builder::from_env(Env::default().default_filter_or(filter))
        .format(|buf, record| {
            writeln!(
                buf,
                "{}:{} {} [{}] - {}",
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                chrono::Local::now().format("%Y-%m-%dT%H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .target(env_logger::Target::Stdout)
        .try_init();
    if let Err(e) = result {
        log::debug!("Logger already set up: {e}");
    }
}

/// The root store plus the channel app events arrive on
pub struct App {
    store: Store<RootReducer>,
    events: flume::Receiver<AppEvent>,
    sender: flume::Sender<AppEvent>,
}

impl App {
    pub fn new(environment: Environment) -> Self {
        let mut state = RootState::default();
        state.wire.context = environment.config.default_context;
        state.profile.context = environment.config.default_context;
        let (sender, events) = flume::unbounded();
        Self {
            store: Store::new(state, environment),
            events,
            sender,
        }
    }

    /// Hand this to whatever produces app events (menus, document events)
    pub fn event_sender(&self) -> flume::Sender<AppEvent> {
        self.sender.clone()
    }

    /// Dispatch every queued app event. Returns how many there were.
    pub fn pump_events(&mut self) -> usize {
        let events: Vec<AppEvent> = self.events.try_iter().collect();
        let count = events.len();
        for event in events {
            self.store.dispatch(RootAction::AppEvent(event));
        }
        count
    }

    pub fn dispatch(&mut self, action: RootAction) {
        self.store.dispatch(action);
    }

    /// Run until no events are queued and no request is in flight
    pub async fn settle(&mut self) {
        loop {
            self.pump_events();
            if !self.store.next().await && self.events.is_empty() {
                break;
            }
        }
    }

    pub fn state(&self) -> &RootState {
        self.store.state()
    }
}

/// Load everything once against the configured backend and log a summary
pub async fn run(repository: Repository) -> Result<(), Error> {
    let config = repository.config()?;
    setup_logging(&config.log_filter);
    log::info!("Using configuration at {}", repository.path().display());

    let model = Model::new(&config)?;
    log::info!("Connecting to {}", model.url);
    let environment = Environment::new(
        Arc::new(model),
        Arc::new(LogNotifier),
        Arc::new(StaticConfirm(false)),
        config,
    );

    let mut app = App::new(environment);
    if app.event_sender().send(AppEvent::Reload).is_err() {
        log::error!("Event channel closed");
    }
    app.settle().await;

    let state = app.state();
    log::info!(
        "{} items ({} total), {} companies, {} topics",
        state.wire.items.len(),
        state.wire.total_items.unwrap_or_default(),
        state.companies.companies.len(),
        state.profile.topics.len()
    );
    if let Some(error) = &state.wire.error {
        log::warn!("Search failed: {error}");
    }
    Ok(())
}
