//! GLaDOS Runtime - hosting layer for the GLaDOS bot platform.
//!
//! This crate provides:
//! - Bots and their credentials (`Bot`, `BotRegistry`)
//! - Slack request signature verification (`SigningSecretVerifier`)
//! - Interaction responses posted back to `response_url` (`ResponseUrlClient`)
//! - Extensions: named route groups bound to a bot (`Extension`,
//!   `ExtensionDescriptor`, the link-time `EXTENSIONS` slice)
//! - Layered configuration (`ConfigLoader`, `GladosConfig`)
//! - Logging setup (`LoggingBuilder`)
//! - The host itself (`Glados`)
//!
//! # Startup
//!
//! ```text
//! glados.toml + GLADOS_* ──▶ GladosConfig ──▶ logging
//!                                          ├─▶ BotRegistry ([bots])
//!                                          └─▶ extensions ([extensions], EXTENSIONS) ──▶ Router
//! ```
//!
//! ```rust,ignore
//! use glados_runtime::Glados;
//!
//! let glados = Glados::builder().config_file("glados.toml").build()?;
//! let response = glados.request(request).await?;
//! ```

pub mod bot;
pub mod config;
pub mod error;
pub mod extension;
pub mod logging;
pub mod registry;
pub mod responder;
pub mod runtime;
pub mod verifier;

// Re-exports
pub use bot::{Bot, SharedBot, resolve_secret};
pub use config::{ConfigError, ConfigLoader, ConfigResult, GladosConfig};
pub use error::{RuntimeError, RuntimeResult};
pub use extension::{
    CreateExtensionFn, EXTENSIONS, Extension, ExtensionContext, ExtensionDescriptor,
};
pub use logging::{LoggingBuilder, SpanEvents};
pub use registry::BotRegistry;
pub use responder::ResponseUrlClient;
pub use runtime::{Glados, GladosBuilder};
pub use verifier::SigningSecretVerifier;

// For `#[linkme(crate = glados_runtime::linkme)]` in extension crates.
pub use linkme;
pub use tracing;

/// Prelude module for convenient imports.
///
/// Logging macros plus the `Level` type for span creation.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
