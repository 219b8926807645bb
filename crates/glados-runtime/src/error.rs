//! Runtime error types.

use thiserror::Error;

use glados_core::{DuplicateRouteError, InvalidRouteError, RouteType, VerificationError};

pub use crate::config::error::{ConfigError, ConfigResult};

/// Errors that can occur while assembling or running the host.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// A bot with this name is already registered.
    #[error("Bot already exists: {0}")]
    BotExists(String),

    /// The named bot is not registered.
    #[error("bot: {bot} is not found as required for {extension}")]
    BotNotFound {
        /// Missing bot name.
        bot: String,
        /// Extension that asked for it.
        extension: String,
    },

    /// An extension with this name is already loaded.
    #[error("extension already loaded: {0}")]
    ExtensionExists(String),

    /// The extension configuration names no bot.
    #[error("no bot name set for extension: {0}")]
    MissingBotName(String),

    /// An extension registered the same key twice for one route type.
    #[error("a route with the name of {key} already exists in the route type: {route_type}")]
    RouteExists {
        /// Route type of the collision.
        route_type: RouteType,
        /// Colliding key (after bot namespacing).
        key: String,
    },

    /// A route could not be built.
    #[error(transparent)]
    InvalidRoute(#[from] InvalidRouteError),

    /// Two extensions registered the same route with the router.
    #[error(transparent)]
    DuplicateRoute(#[from] DuplicateRouteError),

    /// A secret refers to an unset environment variable.
    #[error("missing env var: {0}")]
    MissingEnvVar(String),

    /// Request signature verification failed.
    #[error("request verification failed for bot '{bot}': {source}")]
    Verification {
        /// Bot whose secret was used.
        bot: String,
        /// Underlying failure.
        #[source]
        source: VerificationError,
    },

    /// Posting to a `response_url` failed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bot_not_found_display() {
        let e = RuntimeError::BotNotFound {
            bot: "acme".into(),
            extension: "greeter".into(),
        };
        assert_eq!(e.to_string(), "bot: acme is not found as required for greeter");
    }

    #[test]
    fn test_duplicate_route_converts() {
        let dup = DuplicateRouteError {
            route_type: RouteType::Slash,
            key: "ask".into(),
            owner: "b".into(),
            existing_owner: "a".into(),
        };
        let e: RuntimeError = dup.clone().into();
        assert_eq!(e.to_string(), dup.to_string());
    }
}
