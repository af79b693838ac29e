//! Reducer-style state updates + effect interpretation.

mod effect;

pub use effect::{Continuation, Effect, Method, Request};

use std::collections::VecDeque;

use futures_util::future::BoxFuture;
use futures_util::stream::FuturesUnordered;
use futures_util::StreamExt;

use crate::environment::Environment;

pub trait Reducer {
    type Action: std::fmt::Debug + Send + 'static;

    type State;

    fn reduce(
        action: Self::Action,
        state: &mut Self::State,
        environment: &Environment,
    ) -> Effect<Self::Action>;

    /// Dispatched once when the store is created
    fn initial_action() -> Option<Self::Action> {
        None
    }
}

/// Owns the state of one reducer and runs its effects.
///
/// Actions are applied synchronously. Requests become futures that
/// [`Store::settle`] drives. Each response is dispatched back through the
/// same reducer once it resolves.
pub struct Store<R: Reducer> {
    state: R::State,
    environment: Environment,
    pending: FuturesUnordered<BoxFuture<'static, R::Action>>,
}

impl<R: Reducer> Store<R> {
    pub fn new(state: R::State, environment: Environment) -> Self {
        let mut store = Self {
            state,
            environment,
            pending: FuturesUnordered::new(),
        };
        if let Some(action) = R::initial_action() {
            store.dispatch(action);
        }
        store
    }

    pub fn state(&self) -> &R::State {
        &self.state
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Number of requests that haven't resolved yet
    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }

    pub fn dispatch(&mut self, action: R::Action) {
        let mut queue = VecDeque::from([action]);
        while let Some(action) = queue.pop_front() {
            let effect = R::reduce(action, &mut self.state, &self.environment);
            self.run(effect, &mut queue);
        }
    }

    fn run(&mut self, effect: Effect<R::Action>, queue: &mut VecDeque<R::Action>) {
        match effect {
            Effect::None => (),
            Effect::Action(action) => queue.push_back(action),
            Effect::Request { request, then } => {
                log::debug!("{} {}", request.method, request.path);
                let server = self.environment.server.clone();
                self.pending.push(Box::pin(async move {
                    let result = server.send(&request).await;
                    then(result)
                }));
            }
            Effect::Notify(notification) => self.environment.notifier.notify(&notification),
            Effect::Confirm {
                message,
                on_confirm,
            } => {
                if self.environment.confirm.confirm(&message) {
                    queue.push_back(on_confirm);
                } else {
                    log::debug!("Declined: {message}");
                }
            }
            Effect::Batch(effects) => {
                for effect in effects {
                    self.run(effect, queue);
                }
            }
        }
    }

    /// Wait for the next response and dispatch it. Returns `false` if
    /// nothing was in flight.
    pub async fn next(&mut self) -> bool {
        let Some(action) = self.pending.next().await else {
            return false;
        };
        self.dispatch(action);
        true
    }

    /// Drive requests until none are left, including the ones that
    /// responses trigger in turn
    pub async fn settle(&mut self) {
        while self.next().await {}
    }
}
