use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde_json::Value;
use url::Url;

use super::{Config, Server};
use crate::error::{Error, HttpError};

/// The REST backend, reached through `reqwest`
#[derive(Clone)]
pub struct Model {
    pub url: Url,
    client: reqwest::Client,
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model").field("url", &self.url.as_str()).finish()
    }
}

impl Model {
    pub fn new(config: &Config) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            url: config.api_base()?,
            client,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, HttpError> {
        self.url
            .join(path.trim_start_matches('/'))
            .map_err(|e| HttpError::Transport(format!("Invalid path {path}: {e}")))
    }

    async fn handle(response: Response, call: &'static str) -> Result<Value, HttpError> {
        let status = response.status();
        let bytes = response.bytes().await.api_error(call)?;
        if status.is_success() {
            if bytes.is_empty() {
                return Ok(Value::Null);
            }
            return serde_json::from_slice(&bytes).map_err(|e| {
                log::error!("API Error: {call} {e:?}");
                HttpError::Decode(e.to_string())
            });
        }
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        log::error!("API Error: {call} {status}");
        Err(HttpError::Status {
            status: status.as_u16(),
            status_text: status_text(status),
            body,
        })
    }
}

#[async_trait]
impl Server for Model {
    async fn get(&self, path: &str) -> Result<Value, HttpError> {
        log::trace!("GET {path}");
        let response = self
            .client
            .get(self.endpoint(path)?)
            .send()
            .await
            .api_error("get")?;
        Self::handle(response, "get").await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, HttpError> {
        log::trace!("POST {path}");
        let response = self
            .client
            .post(self.endpoint(path)?)
            .json(body)
            .send()
            .await
            .api_error("post")?;
        Self::handle(response, "post").await
    }

    async fn del(&self, path: &str) -> Result<Value, HttpError> {
        log::trace!("DELETE {path}");
        let response = self
            .client
            .delete(self.endpoint(path)?)
            .send()
            .await
            .api_error("del")?;
        Self::handle(response, "del").await
    }
}

fn status_text(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_uppercase)
        .unwrap_or_else(|| status.as_str().to_string())
}

trait ResultExt {
    type Output;
    fn api_error(self, call: &'static str) -> Result<Self::Output, HttpError>;
}

impl<T> ResultExt for Result<T, reqwest::Error> {
    type Output = T;
    fn api_error(self, call: &'static str) -> Result<T, HttpError> {
        self.map_err(|e| {
            log::error!("API Error: {call} {e:?}");
            HttpError::Transport(e.to_string())
        })
    }
}

#[cfg(test)]
pub mod mock {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use serde_json::Value;

    use crate::environment::{Config, Confirm, Environment, Notifier, Server, StaticConfirm};
    use crate::environment::types::Notification;
    use crate::error::HttpError;
    use crate::store::{Method, Request};

    type Response = (Method, String, Result<Value, HttpError>);

    /// Records every request and answers from a script. Responses are
    /// matched by method and path prefix. Unscripted requests get `null`.
    #[derive(Default)]
    pub struct MockServer {
        requests: Mutex<Vec<Request>>,
        responses: Mutex<Vec<Response>>,
    }

    impl MockServer {
        pub fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        pub fn respond(&self, method: Method, path: &str, result: Result<Value, HttpError>) {
            self.responses
                .lock()
                .unwrap()
                .push((method, path.to_string(), result));
        }

        pub fn requests(&self) -> Vec<Request> {
            self.requests.lock().unwrap().clone()
        }

        fn answer(&self, request: Request) -> Result<Value, HttpError> {
            let result = self
                .responses
                .lock()
                .unwrap()
                .iter()
                .find(|(method, path, _)| {
                    *method == request.method && request.path.starts_with(path.as_str())
                })
                .map(|(_, _, result)| result.clone())
                .unwrap_or(Ok(Value::Null));
            self.requests.lock().unwrap().push(request);
            result
        }
    }

    #[async_trait]
    impl Server for MockServer {
        async fn get(&self, path: &str) -> Result<Value, HttpError> {
            self.answer(Request::get(path))
        }

        async fn post(&self, path: &str, body: &Value) -> Result<Value, HttpError> {
            self.answer(Request::post(path, body.clone()))
        }

        async fn del(&self, path: &str) -> Result<Value, HttpError> {
            self.answer(Request::delete(path))
        }
    }

    #[derive(Default)]
    pub struct RecordingNotifier {
        notifications: Mutex<Vec<Notification>>,
    }

    impl RecordingNotifier {
        pub fn notifications(&self) -> Vec<Notification> {
            self.notifications.lock().unwrap().clone()
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, notification: &Notification) {
            self.notifications.lock().unwrap().push(notification.clone());
        }
    }

    pub fn status(status: u16, status_text: &str) -> HttpError {
        HttpError::Status {
            status,
            status_text: status_text.to_string(),
            body: Value::Null,
        }
    }

    pub fn environment(
        server: Arc<MockServer>,
        confirm: bool,
    ) -> (Environment, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::default());
        let confirm: Arc<dyn Confirm> = Arc::new(StaticConfirm(confirm));
        let environment = Environment::new(server, notifier.clone(), confirm, Config::default());
        (environment, notifier)
    }
}
