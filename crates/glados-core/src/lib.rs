//! # GLaDOS Core
//!
//! Request normalization and routing for the GLaDOS bot platform.
//!
//! Inbound platform events (slash commands, Events API callbacks, interactive
//! components, menu option requests, ...) are normalized into a [`Request`],
//! whose dispatch key is derived from the payload according to its
//! [`RouteType`]. A [`Router`] holds one table of [`Route`]s per route type and
//! hands each request to exactly one handler.
//!
//! ```text
//! payload ──▶ Request::builder(..).build() ──▶ Router::dispatch ──▶ Handler
//!             (key derivation + bot prefix)    (per-type table)
//! ```
//!
//! This crate knows nothing about configuration, extension loading, bot
//! credentials or signature checking. Those live in `glados-runtime`; the core
//! only carries a [`VerificationEnvelope`] and defines the [`Verifier`] seam.

pub mod error;
pub mod handler;
pub mod payload;
pub mod request;
pub mod route;
pub mod route_type;
pub mod router;
pub mod verify;

pub use error::{
    BoxError, DispatchError, DuplicateRouteError, InvalidRouteError, PayloadError,
    RouteNotFoundError, VerificationError,
};
pub use handler::{BoxedHandler, Handler, HandlerResult, into_handler};
pub use payload::{Node, Payload};
pub use request::{Request, RequestBuilder, derive_key, prefixed_key};
pub use route::Route;
pub use route_type::{BOT_ROUTES, EventRoute, RouteType, UnknownRouteType, VERIFY_ROUTES};
pub use router::Router;
pub use verify::{VerificationEnvelope, Verifier};
