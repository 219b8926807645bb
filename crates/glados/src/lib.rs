//! # GLaDOS
//!
//! A chat-bot dispatch layer. Inbound Slack requests (slash commands, Events
//! API callbacks, interactive components, menu option requests) are
//! normalized into a [`Request`](core::Request), keyed according to their
//! [`RouteType`](core::RouteType), and handed to the one handler an extension
//! registered for that key.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐    ┌─────────┐    ┌─────────────────────────────────┐
//! │ HTTP adapter │───▶│ Request │───▶│ Router (one table / route type) │──▶ handler
//! │ (yours)      │    └─────────┘    └─────────────────────────────────┘
//! └──────────────┘                      ▲ routes
//!                                       │
//!                     Glados ── bots ── extensions (config + EXTENSIONS)
//! ```
//!
//! - **Core** (`glados-core`): route types, key derivation, routes, router
//! - **Runtime** (`glados-runtime`): bots, signature verification,
//!   extensions, configuration, logging and the [`Glados`](runtime::Glados) host
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use glados::prelude::*;
//!
//! async fn ping(_request: Request) -> HandlerResult {
//!     Ok(json!({"text": "pong"}))
//! }
//!
//! fn create(ctx: ExtensionContext) -> RuntimeResult<Extension> {
//!     let mut extension = ctx.extension();
//!     extension.add_route(RouteType::Slash, "ping", ping)?;
//!     Ok(extension)
//! }
//!
//! #[distributed_slice(EXTENSIONS)]
//! #[linkme(crate = glados::linkme)]
//! static PING: ExtensionDescriptor = ExtensionDescriptor::new("ping", create);
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let glados = Glados::builder().build()?;
//!     // Slash requests are checked against the bot's signing secret.
//!     let envelope = VerificationEnvelope::new(body, Some(timestamp), Some(signature));
//!     let request = Request::builder(RouteType::Slash)
//!         .bot("acme")
//!         .key("ping")
//!         .verification(envelope)
//!         .build();
//!     println!("{}", glados.request(request).await?);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config` *(default)*: `glados.toml` configuration files
//! - `yaml-config`: `glados.yaml` configuration files
//! - `json-log`: JSON log lines

pub use glados_core as core;
pub use glados_runtime as runtime;
pub use glados_runtime::linkme;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use glados::prelude::*;
/// ```
pub mod prelude {
    // Host
    pub use glados_runtime::{Glados, GladosBuilder, GladosConfig, RuntimeError, RuntimeResult};

    // Bots and extensions
    pub use glados_runtime::{
        Bot, EXTENSIONS, Extension, ExtensionContext, ExtensionDescriptor,
    };

    // Requests and handlers
    pub use glados_core::{
        BoxError, DispatchError, EventRoute, HandlerResult, Payload, Request, RouteType,
        VerificationEnvelope,
    };

    // Link-time extension registration
    pub use glados_runtime::linkme::distributed_slice;

    pub use serde_json::json;
}
