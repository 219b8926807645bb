//! Route bindings.

use std::fmt;
use std::sync::Arc;

use crate::error::InvalidRouteError;
use crate::handler::{BoxedHandler, Handler};
use crate::route_type::RouteType;

/// Binding of a `(route type, key)` pair to a handler.
///
/// Cloning a route is cheap; the handler is shared.
#[derive(Clone)]
pub struct Route {
    route_type: RouteType,
    key: String,
    handler: BoxedHandler,
    owner: String,
}

impl Route {
    /// Creates a route. Key and owner must be non-empty.
    pub fn new<H: Handler>(
        owner: impl Into<String>,
        route_type: RouteType,
        key: impl Into<String>,
        handler: H,
    ) -> Result<Self, InvalidRouteError> {
        Self::from_boxed(owner, route_type, key, Arc::new(handler))
    }

    /// Creates a route around an already boxed handler.
    pub fn from_boxed(
        owner: impl Into<String>,
        route_type: RouteType,
        key: impl Into<String>,
        handler: BoxedHandler,
    ) -> Result<Self, InvalidRouteError> {
        let key = key.into();
        let owner = owner.into();
        if key.is_empty() {
            return Err(InvalidRouteError::EmptyKey { route_type });
        }
        if owner.is_empty() {
            return Err(InvalidRouteError::EmptyOwner { route_type, key });
        }
        Ok(Self {
            route_type,
            key,
            handler,
            owner,
        })
    }

    /// Table this route belongs to.
    pub fn route_type(&self) -> RouteType {
        self.route_type
    }

    /// Dispatch key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The bound handler.
    pub fn handler(&self) -> &BoxedHandler {
        &self.handler
    }

    /// Name of the extension that contributed this route.
    pub fn owner(&self) -> &str {
        &self.owner
    }
}

impl PartialEq for Route {
    /// Routes are equal when they bind the same key to the same handler
    /// instance.
    fn eq(&self, other: &Self) -> bool {
        self.route_type == other.route_type
            && self.key == other.key
            && self.owner == other.owner
            && Arc::ptr_eq(&self.handler, &other.handler)
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("route_type", &self.route_type)
            .field("key", &self.key)
            .field("owner", &self.owner)
            .field("handler", &self.handler.name())
            .finish()
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Route| route: {} | route type: {} | owner: {} | function: {} >",
            self.key,
            self.route_type,
            self.owner,
            self.handler.name()
        )
    }
}
