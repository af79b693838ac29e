use std::path::PathBuf;

use serde_json::Value;

use crate::environment::types::FieldErrors;

/// Failures outside of the request/response cycle: configuration,
/// storage and client setup.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Could not access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid API url: {0}")]
    Url(#[from] url::ParseError),
    #[error("Couldn't find a folder to save data")]
    NoConfigDirectory,
    #[error("HTTP client: {0}")]
    Client(#[from] reqwest::Error),
    #[error("Config Data Error: {0}")]
    Storage(String),
}

/// A rejected request. `Status` is what the backend answered with,
/// the other two never reached a usable response.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HttpError {
    #[error("{status} {status_text}")]
    Status {
        status: u16,
        status_text: String,
        body: Value,
    },
    #[error("Transport Error: {0}")]
    Transport(String),
    #[error("Could not decode response: {0}")]
    Decode(String),
}

impl HttpError {
    pub fn status(&self) -> Option<u16> {
        match self {
            HttpError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The text shown verbatim in the user facing notification
    pub fn status_text(&self) -> String {
        match self {
            HttpError::Status { status_text, .. } => status_text.clone(),
            other => other.to_string(),
        }
    }

    /// Only a `400` carries field level validation messages. Any other
    /// status, or a body that isn't a field map, yields `None`.
    pub fn field_errors(&self) -> Option<FieldErrors> {
        match self {
            HttpError::Status {
                status: 400, body, ..
            } => serde_json::from_value(body.clone()).ok(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn field_errors_only_for_bad_request() {
        let bad = HttpError::Status {
            status: 400,
            status_text: "BAD REQUEST".to_string(),
            body: json!({"name": ["required"]}),
        };
        let errors = bad.field_errors().expect("field errors");
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors["name"].messages().collect::<Vec<_>>(),
            vec!["required"]
        );

        let server = HttpError::Status {
            status: 500,
            status_text: "INTERNAL SERVER ERROR".to_string(),
            body: json!({"name": ["required"]}),
        };
        assert!(server.field_errors().is_none());
        assert_eq!(server.status_text(), "INTERNAL SERVER ERROR");
    }

    #[test]
    fn unparseable_bad_request_has_no_field_errors() {
        let bad = HttpError::Status {
            status: 400,
            status_text: "BAD REQUEST".to_string(),
            body: json!(["not", "a", "map"]),
        };
        assert!(bad.field_errors().is_none());
    }
}
