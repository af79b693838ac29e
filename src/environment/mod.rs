pub mod model;
pub mod repository;
pub mod storage;
pub mod types;

pub use model::Model;
pub use repository::{Config, Repository};

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::HttpError;
use crate::store::{Method, Request};
use types::{Notification, NotificationKind};

/// The backend. Paths are relative to the API base.
#[async_trait]
pub trait Server: Send + Sync {
    async fn get(&self, path: &str) -> Result<Value, HttpError>;
    async fn post(&self, path: &str, body: &Value) -> Result<Value, HttpError>;
    async fn del(&self, path: &str) -> Result<Value, HttpError>;

    async fn send(&self, request: &Request) -> Result<Value, HttpError> {
        match request.method {
            Method::Get => self.get(&request.path).await,
            Method::Post => {
                let body = request.body.clone().unwrap_or(Value::Null);
                self.post(&request.path, &body).await
            }
            Method::Delete => self.del(&request.path).await,
        }
    }
}

/// Shows one-shot notifications to the user
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &Notification);
}

/// Asks the user before destructive actions
pub trait Confirm: Send + Sync {
    fn confirm(&self, message: &str) -> bool;
}

/// Without a UI attached, notifications end up in the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: &Notification) {
        match notification.kind {
            NotificationKind::Success => log::info!("{}", notification.message),
            NotificationKind::Error => log::warn!("{}", notification.message),
        }
    }
}

/// Answers every confirmation the same way
#[derive(Debug, Clone, Copy)]
pub struct StaticConfirm(pub bool);

impl Confirm for StaticConfirm {
    fn confirm(&self, message: &str) -> bool {
        log::debug!("Confirm '{message}': {}", self.0);
        self.0
    }
}

#[derive(Clone)]
pub struct Environment {
    pub server: Arc<dyn Server>,
    pub notifier: Arc<dyn Notifier>,
    pub confirm: Arc<dyn Confirm>,
    pub config: Config,
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Environment")
            .field("config", &self.config)
            .finish()
    }
}

impl Environment {
    pub fn new(
        server: Arc<dyn Server>,
        notifier: Arc<dyn Notifier>,
        confirm: Arc<dyn Confirm>,
        config: Config,
    ) -> Self {
        Self {
            server,
            notifier,
            confirm,
            config,
        }
    }
}

/// Parse a response body into `T`
pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T, HttpError> {
    serde_json::from_value(value).map_err(|e| {
        log::error!("Could not decode response: {e:?}");
        HttpError::Decode(e.to_string())
    })
}
