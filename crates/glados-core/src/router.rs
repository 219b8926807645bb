//! Request router.
//!
//! The [`Router`] keeps one `key → Route` table per [`RouteType`]. Each table
//! has its own read-write lock, so lookups for different route types never
//! contend, and registering routes after startup is safe while requests are
//! being dispatched. Locks are only held for the map operation itself: a
//! resolved [`Route`] is cloned out before its handler runs.
//!
//! ```rust
//! use glados_core::{HandlerResult, Request, Route, RouteType, Router};
//! use serde_json::json;
//!
//! async fn send_mock(request: Request) -> HandlerResult {
//!     Ok(json!({"echo": request.payload().get("message").as_str()}))
//! }
//!
//! # tokio_test::block_on(async {
//! let router = Router::new();
//! let route = Route::new("mock", RouteType::SendMessage, "send_mock", send_mock).unwrap();
//! router.add_route("mock", route).unwrap();
//!
//! let request = Request::builder(RouteType::SendMessage)
//!     .key("send_mock")
//!     .payload(json!({"message": "Hello World!"}))
//!     .build();
//! let response = router.dispatch(request).await.unwrap();
//! assert_eq!(response, json!({"echo": "Hello World!"}));
//! # });
//! ```

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use parking_lot::RwLock;
use tracing::{Instrument, Level, debug, span};

use crate::error::{DispatchError, DuplicateRouteError, RouteNotFoundError};
use crate::handler::HandlerResult;
use crate::request::Request;
use crate::route::Route;
use crate::route_type::RouteType;

type RouteTable = RwLock<HashMap<String, Route>>;

/// Registers routes and dispatches requests to them.
///
/// `Router` is `Send + Sync`; share it behind an `Arc`.
pub struct Router {
    tables: [RouteTable; RouteType::COUNT],
}

impl Router {
    /// Creates a router with an empty table for every route type.
    pub fn new() -> Self {
        Self {
            tables: std::array::from_fn(|_| RwLock::new(HashMap::new())),
        }
    }

    fn table(&self, route_type: RouteType) -> &RouteTable {
        &self.tables[route_type.index()]
    }

    /// Adds a route on behalf of `owner`.
    ///
    /// `owner` must be the route's own [`Route::owner`]; debug builds assert
    /// it.
    ///
    /// # Errors
    ///
    /// [`DuplicateRouteError`] if the route's key is already taken in its
    /// route type's table. The existing route is left in place.
    pub fn add_route(&self, owner: &str, route: Route) -> Result<(), DuplicateRouteError> {
        debug_assert_eq!(owner, route.owner(), "route registered under another owner");
        debug!(owner, %route, "Adding route");

        let mut table = self.table(route.route_type()).write();
        match table.entry(route.key().to_owned()) {
            Entry::Occupied(existing) => Err(DuplicateRouteError {
                route_type: route.route_type(),
                key: route.key().to_owned(),
                owner: owner.to_owned(),
                existing_owner: existing.get().owner().to_owned(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(route);
                Ok(())
            }
        }
    }

    /// Adds several routes, stopping at the first failure.
    ///
    /// Routes added before the failing one stay registered. Callers loading a
    /// whole extension should treat an error as a failed load of that
    /// extension.
    pub fn add_routes<I>(&self, owner: &str, routes: I) -> Result<(), DuplicateRouteError>
    where
        I: IntoIterator<Item = Route>,
    {
        for route in routes {
            self.add_route(owner, route)?;
        }
        Ok(())
    }

    /// Removes and returns the route registered under `key`, if any.
    pub fn remove_route(&self, route_type: RouteType, key: &str) -> Option<Route> {
        let removed = self.table(route_type).write().remove(key);
        if let Some(route) = &removed {
            debug!(%route, "Removed route");
        }
        removed
    }

    /// Looks up the route for `key` in `route_type`'s table.
    ///
    /// # Errors
    ///
    /// [`RouteNotFoundError`] when nothing is registered under `key`. An empty
    /// key never matches.
    pub fn resolve(&self, route_type: RouteType, key: &str) -> Result<Route, RouteNotFoundError> {
        let not_found = || RouteNotFoundError {
            route_type,
            key: Some(key.to_owned()).filter(|k| !k.is_empty()),
        };
        if key.is_empty() {
            return Err(not_found());
        }
        self.table(route_type)
            .read()
            .get(key)
            .cloned()
            .ok_or_else(not_found)
    }

    /// Resolves `request` and runs the matching handler.
    ///
    /// The handler's result is returned unchanged; a handler error comes back
    /// as [`DispatchError::Handler`] holding the original error.
    pub async fn dispatch(&self, request: Request) -> Result<serde_json::Value, DispatchError> {
        let route_type = request.route_type();
        let route = match request.effective_key() {
            Some(key) => self.resolve(route_type, &key)?,
            None => {
                return Err(RouteNotFoundError {
                    route_type,
                    key: None,
                }
                .into());
            }
        };

        let span = span!(
            Level::DEBUG,
            "dispatch",
            route_type = %route_type,
            key = route.key(),
            owner = route.owner()
        );
        debug!(parent: &span, "Calling route handler");

        let result: HandlerResult = route.handler().call(request).instrument(span).await;
        result.map_err(DispatchError::Handler)
    }

    /// Number of routes registered for `route_type`.
    pub fn len(&self, route_type: RouteType) -> usize {
        self.table(route_type).read().len()
    }

    /// `true` when no route of any type is registered.
    pub fn is_empty(&self) -> bool {
        self.tables.iter().all(|t| t.read().is_empty())
    }

    /// Registered keys for `route_type`, sorted.
    pub fn keys(&self, route_type: RouteType) -> Vec<String> {
        let mut keys: Vec<String> = self.table(route_type).read().keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("Router");
        for route_type in RouteType::ALL {
            s.field(route_type.name(), &self.len(route_type));
        }
        s.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoxError;
    use serde_json::{Value, json};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    async fn ok_handler(_request: Request) -> HandlerResult {
        Ok(Value::Bool(true))
    }

    async fn other_handler(_request: Request) -> HandlerResult {
        Ok(Value::Bool(false))
    }

    fn route(route_type: RouteType, key: &str) -> Route {
        Route::new("test", route_type, key, ok_handler).unwrap()
    }

    #[test]
    fn test_new_router_is_empty() {
        let router = Router::new();
        assert!(router.is_empty());
        for t in RouteType::ALL {
            assert_eq!(router.len(t), 0);
            let err = router.resolve(t, "anything").unwrap_err();
            assert_eq!(err.route_type, t);
            assert_eq!(err.key.as_deref(), Some("anything"));
        }
    }

    #[test]
    fn test_resolve_returns_registered_handler() {
        let router = Router::new();
        let r = route(RouteType::Slash, "ask");
        let handler = Arc::clone(r.handler());
        router.add_route("test", r).unwrap();

        let resolved = router.resolve(RouteType::Slash, "ask").unwrap();
        assert!(Arc::ptr_eq(resolved.handler(), &handler));
        assert_eq!(resolved.key(), "ask");
        assert_eq!(resolved.owner(), "test");
    }

    #[test]
    fn test_tables_are_separate() {
        let router = Router::new();
        router.add_route("test", route(RouteType::Slash, "ask")).unwrap();
        router.add_route("test", route(RouteType::Menu, "ask")).unwrap();
        assert!(router.resolve(RouteType::Callback, "ask").is_err());
        assert_eq!(router.len(RouteType::Slash), 1);
        assert_eq!(router.len(RouteType::Menu), 1);
    }

    #[test]
    fn test_duplicate_rejected_and_first_kept() {
        let router = Router::new();
        let first = Route::new("first", RouteType::Events, "acme_message", ok_handler).unwrap();
        let handler = Arc::clone(first.handler());
        router.add_route("first", first).unwrap();

        let second = Route::new("second", RouteType::Events, "acme_message", other_handler).unwrap();
        let err = router.add_route("second", second).unwrap_err();
        assert_eq!(err.route_type, RouteType::Events);
        assert_eq!(err.key, "acme_message");
        assert_eq!(err.owner, "second");
        assert_eq!(err.existing_owner, "first");

        let kept = router.resolve(RouteType::Events, "acme_message").unwrap();
        assert!(Arc::ptr_eq(kept.handler(), &handler));
        assert_eq!(kept.owner(), "first");
        assert_eq!(router.len(RouteType::Events), 1);
    }

    #[test]
    fn test_add_routes_stops_at_first_failure() {
        let router = Router::new();
        router.add_route("test", route(RouteType::Slash, "b")).unwrap();

        let batch = vec![
            route(RouteType::Slash, "a"),
            route(RouteType::Slash, "b"),
            route(RouteType::Slash, "c"),
        ];
        let err = router.add_routes("test", batch).unwrap_err();
        assert_eq!(err.key, "b");
        assert_eq!(router.keys(RouteType::Slash), vec!["a", "b"]);
    }

    #[test]
    fn test_remove_route() {
        let router = Router::new();
        router.add_route("test", route(RouteType::Slash, "ask")).unwrap();

        let removed = router.remove_route(RouteType::Slash, "ask").unwrap();
        assert_eq!(removed.key(), "ask");
        assert!(router.resolve(RouteType::Slash, "ask").is_err());
        assert!(router.remove_route(RouteType::Slash, "ask").is_none());

        // The key is free again.
        router.add_route("test", route(RouteType::Slash, "ask")).unwrap();
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "route registered under another owner")]
    fn test_owner_must_match_route() {
        let router = Router::new();
        let _ = router.add_route("someone_else", route(RouteType::Slash, "ask"));
    }

    #[test]
    fn test_empty_key_never_resolves() {
        let router = Router::new();
        let err = router.resolve(RouteType::Slash, "").unwrap_err();
        assert_eq!(err.key, None);
    }

    #[tokio::test]
    async fn test_dispatch_not_found_names_type_and_key() {
        let router = Router::new();
        let request = Request::builder(RouteType::SendMessage)
            .key("send_mock_fail")
            .build();
        let err = router.dispatch(request).await.unwrap_err();
        let not_found = err.as_not_found().unwrap();
        assert_eq!(not_found.route_type, RouteType::SendMessage);
        assert_eq!(not_found.key.as_deref(), Some("send_mock_fail"));
        assert!(err.to_string().contains("send_mock_fail"));
    }

    #[tokio::test]
    async fn test_dispatch_invokes_handler_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let handler = move |request: Request| {
            let seen = Arc::clone(&seen);
            async move {
                seen.fetch_add(1, Ordering::SeqCst);
                assert_eq!(request.key(), Some("send_mock"));
                Ok::<Value, BoxError>(json!({"message": request.payload().get("message").as_str()}))
            }
        };

        let router = Router::new();
        router
            .add_route(
                "mock",
                Route::new("mock", RouteType::SendMessage, "send_mock", handler).unwrap(),
            )
            .unwrap();

        let request = Request::builder(RouteType::SendMessage)
            .key("send_mock")
            .payload(json!({"message": "Hello World!"}))
            .build();
        let response = router.dispatch(request).await.unwrap();

        assert_eq!(response, json!({"message": "Hello World!"}));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_dispatch_uses_bot_prefixed_key() {
        let router = Router::new();
        router
            .add_route("test", route(RouteType::Events, "acme_message"))
            .unwrap();

        let request = Request::builder(RouteType::Events)
            .bot("acme")
            .payload(json!({"event": {"type": "message"}}))
            .build();
        assert_eq!(router.dispatch(request).await.unwrap(), Value::Bool(true));

        let other_bot = Request::builder(RouteType::Events)
            .bot("other")
            .payload(json!({"event": {"type": "message"}}))
            .build();
        assert!(router.dispatch(other_bot).await.is_err());
    }

    #[tokio::test]
    async fn test_dispatch_missing_key_is_not_found() {
        let router = Router::new();
        router.add_route("test", route(RouteType::Menu, "approve")).unwrap();

        let request = Request::builder(RouteType::Menu).payload(json!({})).build();
        let err = router.dispatch(request).await.unwrap_err();
        let not_found = err.as_not_found().unwrap();
        assert_eq!(not_found.route_type, RouteType::Menu);
        assert_eq!(not_found.key, None);
    }

    #[tokio::test]
    async fn test_handler_error_passes_through() {
        #[derive(Debug, thiserror::Error)]
        #[error("handler exploded")]
        struct Exploded;

        let failing = |_request: Request| async { Err::<Value, BoxError>(Box::new(Exploded)) };
        let router = Router::new();
        router
            .add_route(
                "test",
                Route::new("test", RouteType::Callback, "boom", failing).unwrap(),
            )
            .unwrap();

        let request = Request::builder(RouteType::Callback).key("boom").build();
        let err = router.dispatch(request).await.unwrap_err();
        assert_eq!(err.to_string(), "handler exploded");
        let inner = err.into_handler_error().unwrap();
        assert!(inner.downcast_ref::<Exploded>().is_some());
    }

    #[tokio::test]
    async fn test_registration_while_dispatching() {
        let router = Arc::new(Router::new());
        router.add_route("test", route(RouteType::Slash, "ask")).unwrap();

        let writer = {
            let router = Arc::clone(&router);
            tokio::spawn(async move {
                for i in 0..100 {
                    let late =
                        Route::new("late", RouteType::Slash, format!("late_{i}"), ok_handler)
                            .unwrap();
                    router.add_route("late", late).unwrap();
                }
            })
        };

        for _ in 0..100 {
            let request = Request::builder(RouteType::Slash).key("ask").build();
            assert!(router.dispatch(request).await.is_ok());
        }
        writer.await.unwrap();
        assert_eq!(router.len(RouteType::Slash), 101);
    }
}
