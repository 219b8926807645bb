//! Error types for the routing core.
//!
//! Registration and lookup failures are distinct types so callers can tell a
//! startup problem ([`DuplicateRouteError`]) from a per-request miss
//! ([`RouteNotFoundError`]). Errors raised by handlers are never rewritten:
//! [`DispatchError::Handler`] carries them as-is.

use std::fmt;

use thiserror::Error;

use crate::route_type::RouteType;

/// Boxed error type returned by handlers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Renders an optional key for diagnostics.
struct KeyDisplay<'a>(Option<&'a str>);

impl fmt::Display for KeyDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(key) => write!(f, "'{key}'"),
            None => f.write_str("<none>"),
        }
    }
}

/// A route could not be constructed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidRouteError {
    /// The route key was empty.
    #[error("route key must not be empty (route type: {route_type})")]
    EmptyKey {
        /// Route type of the rejected route.
        route_type: RouteType,
    },

    /// The owning extension name was empty.
    #[error("route owner must not be empty (route: '{key}', route type: {route_type})")]
    EmptyOwner {
        /// Route type of the rejected route.
        route_type: RouteType,
        /// Key of the rejected route.
        key: String,
    },
}

/// A route with the same key already exists in the route type's table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "a route with the name of '{key}' already exists in the route type: {route_type} \
     (registered by '{existing_owner}', rejected for '{owner}')"
)]
pub struct DuplicateRouteError {
    /// Table the collision happened in.
    pub route_type: RouteType,
    /// Colliding key.
    pub key: String,
    /// Owner whose registration was rejected.
    pub owner: String,
    /// Owner of the route already in the table.
    pub existing_owner: String,
}

/// No route matches the requested key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct RouteNotFoundError {
    /// Table that was searched.
    pub route_type: RouteType,
    /// Key that was looked up; `None` when key derivation produced nothing.
    pub key: Option<String>,
}

impl fmt::Display for RouteNotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "no route with the name of {} exists in route type: {}",
            KeyDisplay(self.key.as_deref()),
            self.route_type
        )
    }
}

/// Failure of [`Router::dispatch`](crate::router::Router::dispatch).
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No handler is registered for the request's effective key.
    #[error(transparent)]
    NotFound(#[from] RouteNotFoundError),

    /// The handler itself failed; the error is passed through untouched.
    #[error(transparent)]
    Handler(BoxError),
}

impl DispatchError {
    /// Returns the not-found error, if this is one.
    pub fn as_not_found(&self) -> Option<&RouteNotFoundError> {
        match self {
            Self::NotFound(e) => Some(e),
            Self::Handler(_) => None,
        }
    }

    /// Returns the handler's error, if this is one.
    pub fn into_handler_error(self) -> Option<BoxError> {
        match self {
            Self::Handler(e) => Some(e),
            Self::NotFound(_) => None,
        }
    }
}

/// A request body could not be parsed.
#[derive(Debug, Error)]
pub enum PayloadError {
    /// The body was not valid JSON or did not match the target type.
    #[error("invalid payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// Signature verification failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationError {
    /// The receiving bot has no signing secret to check the request with.
    #[error("no signing secret configured")]
    NoSigningSecret,

    /// The request did not carry a verification envelope.
    #[error("request carries no verification data")]
    MissingEnvelope,

    /// The envelope has no timestamp.
    #[error("missing request timestamp")]
    MissingTimestamp,

    /// The envelope has no signature.
    #[error("missing request signature")]
    MissingSignature,

    /// The timestamp is not an integer.
    #[error("malformed request timestamp: {0}")]
    MalformedTimestamp(String),

    /// The timestamp is too far from the current time.
    #[error("request timestamp {timestamp} is outside the allowed window")]
    Expired {
        /// Timestamp carried by the request.
        timestamp: i64,
    },

    /// The signature does not match the body.
    #[error("signature of request is not valid")]
    InvalidSignature,
}
