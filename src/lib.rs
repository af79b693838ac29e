mod app;
pub mod components;
pub mod environment;
pub mod error;
mod helper;
pub mod store;

pub use app::{run, setup_logging, App};
pub use error::{Error, HttpError};

/// Handy macro for future localization
#[macro_export]
macro_rules! loc {
    ($x:expr $(,)?) => {
        $x
    };
}
