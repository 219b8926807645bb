//! Route handlers.
//!
//! A handler receives the [`Request`] it was dispatched for and returns a JSON
//! response or an error. Any `async fn(Request) -> HandlerResult` (or closure
//! returning such a future) is a handler:
//!
//! ```rust
//! use glados_core::{HandlerResult, Request};
//! use serde_json::json;
//!
//! async fn ask_user(request: Request) -> HandlerResult {
//!     let text = request.payload().get("text").as_str().unwrap_or_default();
//!     Ok(json!({"text": format!("you said: {text}")}))
//! }
//! # let _ = glados_core::into_handler(ask_user);
//! ```

use std::any::type_name;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::Value;

use crate::error::BoxError;
use crate::request::Request;

/// What a handler returns.
pub type HandlerResult = Result<Value, BoxError>;

/// Type-erased, shareable handler.
pub type BoxedHandler = Arc<dyn Handler>;

/// A function invoked for a matched route.
pub trait Handler: Send + Sync + 'static {
    /// Handles one request.
    fn call(&self, request: Request) -> BoxFuture<'static, HandlerResult>;

    /// Human-readable identity used in diagnostics.
    fn name(&self) -> &'static str {
        type_name::<Self>()
    }
}

impl<F, Fut> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    fn call(&self, request: Request) -> BoxFuture<'static, HandlerResult> {
        Box::pin(self(request))
    }
}

/// Boxes a handler for storage in a [`Route`](crate::route::Route).
pub fn into_handler<H: Handler>(handler: H) -> BoxedHandler {
    Arc::new(handler)
}
