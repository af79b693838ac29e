use std::sync::Arc;

use serde_json::Value;
use strum_macros::Display;

use crate::environment::types::Notification;
use crate::error::HttpError;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Delete,
}

/// A request against the backend, relative to the API base
#[derive(Clone, Debug, PartialEq)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

impl Request {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            body: Some(body),
        }
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            method: Method::Delete,
            path: path.into(),
            body: None,
        }
    }
}

pub type Continuation<A> = Box<dyn FnOnce(Result<Value, HttpError>) -> A + Send>;

/// What a reducer asks the store to do after it updated its state.
///
/// Reducers never perform side effects themselves. They describe them here
/// and the [`Store`](super::Store) interprets the description.
pub enum Effect<A> {
    None,
    /// Dispatch another action right away
    Action(A),
    /// Send `request`, then dispatch whatever `then` maps the response to
    Request {
        request: Request,
        then: Continuation<A>,
    },
    /// Show a one-shot notification
    Notify(Notification),
    /// Ask the user. Dispatch `on_confirm` only if they agree.
    Confirm { message: String, on_confirm: A },
    Batch(Vec<Effect<A>>),
}

impl<A> std::fmt::Debug for Effect<A>
where
    A: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Action(arg0) => f.debug_tuple("Action").field(arg0).finish(),
            Self::Request { request, .. } => f.debug_tuple("Request").field(request).finish(),
            Self::Notify(arg0) => f.debug_tuple("Notify").field(arg0).finish(),
            Self::Confirm {
                message,
                on_confirm,
            } => f
                .debug_struct("Confirm")
                .field("message", message)
                .field("on_confirm", on_confirm)
                .finish(),
            Self::Batch(arg0) => f.debug_tuple("Batch").field(arg0).finish(),
        }
    }
}

impl<A: 'static> Effect<A> {
    pub const NONE: Self = Effect::None;

    pub fn action(action: A) -> Self {
        Effect::Action(action)
    }

    pub fn request(
        request: Request,
        then: impl FnOnce(Result<Value, HttpError>) -> A + Send + 'static,
    ) -> Self {
        Effect::Request {
            request,
            then: Box::new(then),
        }
    }

    pub fn get(
        path: impl Into<String>,
        then: impl FnOnce(Result<Value, HttpError>) -> A + Send + 'static,
    ) -> Self {
        Self::request(Request::get(path), then)
    }

    pub fn post(
        path: impl Into<String>,
        body: Value,
        then: impl FnOnce(Result<Value, HttpError>) -> A + Send + 'static,
    ) -> Self {
        Self::request(Request::post(path, body), then)
    }

    pub fn delete(
        path: impl Into<String>,
        then: impl FnOnce(Result<Value, HttpError>) -> A + Send + 'static,
    ) -> Self {
        Self::request(Request::delete(path), then)
    }

    pub fn notify(notification: Notification) -> Self {
        Effect::Notify(notification)
    }

    pub fn confirm(message: impl Into<String>, on_confirm: A) -> Self {
        Effect::Confirm {
            message: message.into(),
            on_confirm,
        }
    }

    pub fn merge2(a: Self, b: Self) -> Self {
        Effect::Batch(vec![a, b])
    }

    pub fn merge(effects: Vec<Self>) -> Self {
        Effect::Batch(effects)
    }

    pub fn is_none(&self) -> bool {
        match self {
            Effect::None => true,
            Effect::Batch(effects) => effects.iter().all(Effect::is_none),
            _ => false,
        }
    }

    /// Lift a child effect into the parent's action space
    pub fn map<B: 'static>(self, f: impl Fn(A) -> B + Send + Sync + 'static) -> Effect<B> {
        self.map_shared(Arc::new(f))
    }

    fn map_shared<B: 'static>(self, f: Arc<dyn Fn(A) -> B + Send + Sync>) -> Effect<B> {
        match self {
            Effect::None => Effect::None,
            Effect::Action(a) => Effect::Action(f(a)),
            Effect::Request { request, then } => Effect::Request {
                request,
                then: Box::new(move |result| f(then(result))),
            },
            Effect::Notify(n) => Effect::Notify(n),
            Effect::Confirm {
                message,
                on_confirm,
            } => Effect::Confirm {
                message,
                on_confirm: f(on_confirm),
            },
            Effect::Batch(effects) => Effect::Batch(
                effects
                    .into_iter()
                    .map(|e| e.map_shared(f.clone()))
                    .collect(),
            ),
        }
    }

    /// All requests this effect would send, in order
    pub fn requests(&self) -> Vec<&Request> {
        match self {
            Effect::Request { request, .. } => vec![request],
            Effect::Batch(effects) => effects.iter().flat_map(Effect::requests).collect(),
            _ => Vec::new(),
        }
    }

    /// All actions this effect dispatches immediately, in order
    pub fn actions(&self) -> Vec<&A> {
        match self {
            Effect::Action(a) => vec![a],
            Effect::Batch(effects) => effects.iter().flat_map(Effect::actions).collect(),
            _ => Vec::new(),
        }
    }

    pub fn notifications(&self) -> Vec<&Notification> {
        match self {
            Effect::Notify(n) => vec![n],
            Effect::Batch(effects) => effects.iter().flat_map(Effect::notifications).collect(),
            _ => Vec::new(),
        }
    }
}
