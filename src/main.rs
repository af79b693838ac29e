use newshub::environment::{Config, Repository};

/// Usage: `newshub [config.json]`. Without a path the platform config
/// directory is used.
#[tokio::main]
async fn main() {
    let repository = match std::env::args().nth(1) {
        Some(path) => Repository::at(path),
        None => Repository::new(),
    };
    let result = match repository {
        Ok(repository) => newshub::run(repository).await,
        Err(e) => Err(e),
    };
    if let Err(e) = result {
        // a no-op when `run` already set up logging
        newshub::setup_logging(&Config::default().log_filter);
        log::error!("{e}");
        std::process::exit(1);
    }
}
