//! Extensions: named groups of routes that run as one bot.
//!
//! An extension is created by its [`ExtensionDescriptor`] once the bot it is
//! configured for is known. Routes added to it are namespaced by the bot name
//! where the route type requires it, and are wrapped so that requests on
//! signed route types are checked against the bot's signing secret before the
//! handler runs. With a [`ResponseUrlClient`] attached, Interaction responses
//! are also posted back to the request's `response_url`.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use glados_core::{EventRoute, HandlerResult, Request, RouteType};
//! use glados_runtime::{Bot, Extension};
//! use serde_json::json;
//!
//! async fn home(_request: Request) -> HandlerResult {
//!     Ok(json!({"text": "welcome"}))
//! }
//!
//! let mut extension = Extension::new("greeter", Arc::new(Bot::new("acme", "xoxb")));
//! extension.add_route(RouteType::Events, EventRoute::AppHomeOpened, home).unwrap();
//! assert_eq!(extension.routes()[0].key(), "acme_app_home_opened");
//! ```

mod descriptor;

pub use descriptor::{CreateExtensionFn, EXTENSIONS, ExtensionContext, ExtensionDescriptor};

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use futures::future::BoxFuture;
use glados_core::{
    BoxError, Handler, HandlerResult, InvalidRouteError, Request, Route, RouteType, prefixed_key,
};
use serde_json::Value;
use tracing::{debug, error};

use crate::bot::SharedBot;
use crate::error::{RuntimeError, RuntimeResult};
use crate::responder::ResponseUrlClient;

/// A named set of routes bound to one bot.
pub struct Extension {
    name: String,
    bot: SharedBot,
    responder: Option<ResponseUrlClient>,
    routes: BTreeMap<(RouteType, String), Route>,
}

impl Extension {
    /// Creates an empty extension.
    pub fn new(name: impl Into<String>, bot: SharedBot) -> Self {
        Self {
            name: name.into(),
            bot,
            responder: None,
            routes: BTreeMap::new(),
        }
    }

    /// Posts Interaction responses of routes added after this call to the
    /// request's `response_url`.
    pub fn with_responder(mut self, responder: ResponseUrlClient) -> Self {
        self.responder = Some(responder);
        self
    }

    /// Extension name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The bot this extension runs as.
    pub fn bot(&self) -> &SharedBot {
        &self.bot
    }

    /// Adds a route.
    ///
    /// `key` is a plain string or an [`EventRoute`](glados_core::EventRoute).
    /// For bot-prefixed route types the stored key is `{bot}_{key}`, which is
    /// what requests built with [`RequestBuilder::bot`] resolve to.
    ///
    /// [`RequestBuilder::bot`]: glados_core::RequestBuilder::bot
    pub fn add_route<H: Handler>(
        &mut self,
        route_type: RouteType,
        key: impl Into<String>,
        handler: H,
    ) -> RuntimeResult<()> {
        let key = key.into();
        if key.is_empty() {
            return Err(InvalidRouteError::EmptyKey { route_type }.into());
        }
        let key = prefixed_key(route_type, Some(self.bot.name()), &key);

        let wrapped = GuardedHandler {
            bot: self.bot.clone(),
            responder: self.responder.clone(),
            inner: handler,
        };
        let route = Route::new(self.name.as_str(), route_type, key.clone(), wrapped)?;

        match self.routes.entry((route_type, key)) {
            Entry::Occupied(entry) => Err(RuntimeError::RouteExists {
                route_type,
                key: entry.key().1.clone(),
            }),
            Entry::Vacant(entry) => {
                debug!(extension = %self.name, %route, "Added route");
                entry.insert(route);
                Ok(())
            }
        }
    }

    /// All routes, ordered by route type then key.
    pub fn routes(&self) -> Vec<Route> {
        self.routes.values().cloned().collect()
    }

    /// Consumes the extension, returning its routes.
    pub fn into_routes(self) -> Vec<Route> {
        self.routes.into_values().collect()
    }

    /// Number of routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether no route was added.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl std::fmt::Debug for Extension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extension")
            .field("name", &self.name)
            .field("bot", &self.bot.name())
            .field("routes", &self.routes.values().collect::<Vec<_>>())
            .finish()
    }
}

/// Verifies signed route types, maps `null` responses to `""` and posts
/// Interaction responses to their `response_url`.
struct GuardedHandler<H> {
    bot: SharedBot,
    responder: Option<ResponseUrlClient>,
    inner: H,
}

impl<H: Handler> Handler for GuardedHandler<H> {
    fn call(&self, request: Request) -> BoxFuture<'static, HandlerResult> {
        if request.route_type().requires_verification()
            && let Err(e) = self.bot.verify(request.verification())
        {
            return Box::pin(async move { Err(BoxError::from(e)) });
        }

        let respond_to = match (&self.responder, request.response_url()) {
            (Some(responder), Some(url)) if request.route_type() == RouteType::Interaction => {
                Some((responder.clone(), url.to_string()))
            }
            _ => None,
        };

        let response = self.inner.call(request);
        Box::pin(async move {
            let response = match response.await? {
                Value::Null => return Ok(Value::String(String::new())),
                other => other,
            };
            if let Some((responder, url)) = respond_to
                && let Err(e) = responder.respond(&url, &response).await
            {
                error!(url = %url, error = %e, "Failed to post to response_url");
            }
            Ok(response)
        })
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::bot::Bot;
    use crate::responder::tests::{hook_server, local_client};
    use crate::verifier::SigningSecretVerifier;
    use axum::http::StatusCode;
    use glados_core::{EventRoute, VerificationEnvelope, VerificationError};
    use serde_json::json;

    async fn nothing(_request: Request) -> HandlerResult {
        Ok(Value::Null)
    }

    async fn ok(_request: Request) -> HandlerResult {
        Ok(json!({"ok": true}))
    }

    fn extension() -> Extension {
        let bot = Bot::new("acme", "xoxb").insecure_skip_verification();
        Extension::new("tester", Arc::new(bot))
    }

    fn signed_extension() -> (Extension, SigningSecretVerifier) {
        let verifier = SigningSecretVerifier::new("s3cret").max_age(None);
        let bot = Bot::new("acme", "xoxb").with_verifier(verifier.clone());
        (Extension::new("tester", Arc::new(bot)), verifier)
    }

    fn route_for(extension: &Extension, route_type: RouteType) -> Route {
        extension
            .routes()
            .into_iter()
            .find(|r| r.route_type() == route_type)
            .unwrap()
    }

    #[test]
    fn test_bot_routes_are_prefixed() {
        let mut ext = extension();
        ext.add_route(RouteType::SendMessage, "send_mock", ok).unwrap();
        ext.add_route(RouteType::Slash, "ask", ok).unwrap();
        ext.add_route(RouteType::Callback, "cb", ok).unwrap();
        ext.add_route(RouteType::Events, EventRoute::Message, ok).unwrap();

        let keys: Vec<_> = ext.routes().iter().map(|r| r.key().to_string()).collect();
        assert_eq!(keys, vec!["send_mock", "cb", "ask", "acme_message"]);
        assert!(ext.routes().iter().all(|r| r.owner() == "tester"));
    }

    #[test]
    fn test_duplicate_route_rejected() {
        let mut ext = extension();
        ext.add_route(RouteType::Interaction, "approve", ok).unwrap();
        let err = ext.add_route(RouteType::Interaction, "approve", nothing).unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::RouteExists { route_type: RouteType::Interaction, ref key }
                if key == "acme_approve"
        ));

        // Same key in another route type is fine.
        ext.add_route(RouteType::Response, "approve", ok).unwrap();
        assert_eq!(ext.len(), 2);
    }

    #[test]
    fn test_empty_key_rejected() {
        let mut ext = extension();
        let err = ext.add_route(RouteType::Slash, "", ok).unwrap_err();
        assert!(matches!(err, RuntimeError::InvalidRoute(_)));
        assert!(ext.is_empty());
    }

    #[test]
    fn test_route_reports_user_handler_name() {
        let mut ext = extension();
        ext.add_route(RouteType::Callback, "cb", nothing).unwrap();
        assert!(ext.routes()[0].handler().name().contains("nothing"));
    }

    #[tokio::test]
    async fn test_null_response_becomes_empty_string() {
        let mut ext = extension();
        ext.add_route(RouteType::Callback, "cb", nothing).unwrap();
        let route = route_for(&ext, RouteType::Callback);

        let request = Request::builder(RouteType::Callback).key("cb").build();
        assert_eq!(route.handler().call(request).await.unwrap(), json!(""));
    }

    #[tokio::test]
    async fn test_signed_request_is_verified() {
        let (mut ext, verifier) = signed_extension();
        ext.add_route(RouteType::Slash, "ask", ok).unwrap();
        let route = route_for(&ext, RouteType::Slash);

        let body = "command=%2Fask";
        let envelope =
            VerificationEnvelope::new(body, Some("100".into()), Some(verifier.sign("100", body)));
        let request = Request::builder(RouteType::Slash)
            .bot("acme")
            .key("ask")
            .verification(envelope)
            .build();
        assert_eq!(route.handler().call(request).await.unwrap(), json!({"ok": true}));
    }

    #[tokio::test]
    async fn test_unsigned_request_is_rejected() {
        let (mut ext, _) = signed_extension();
        ext.add_route(RouteType::Slash, "ask", ok).unwrap();
        let route = route_for(&ext, RouteType::Slash);

        let request = Request::builder(RouteType::Slash).bot("acme").key("ask").build();
        let err = route.handler().call(request).await.unwrap_err();
        let err = err.downcast::<RuntimeError>().unwrap();
        assert!(matches!(
            *err,
            RuntimeError::Verification {
                source: VerificationError::MissingEnvelope,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_unsigned_route_types_skip_verification() {
        let (mut ext, _) = signed_extension();
        ext.add_route(RouteType::SendMessage, "send", ok).unwrap();
        let route = route_for(&ext, RouteType::SendMessage);

        let request = Request::builder(RouteType::SendMessage).bot("acme").key("send").build();
        assert!(route.handler().call(request).await.is_ok());
    }

    #[tokio::test]
    async fn test_interaction_response_posted_to_response_url() {
        let (url, mut bodies) = hook_server(StatusCode::OK).await;
        let mut ext = extension().with_responder(local_client());
        ext.add_route(RouteType::Interaction, "approve", |_request: Request| async {
            Ok::<Value, BoxError>(json!("approved"))
        })
        .unwrap();
        let route = route_for(&ext, RouteType::Interaction);

        let request = Request::builder(RouteType::Interaction)
            .bot("acme")
            .payload(json!({"actions": [{"action_id": "approve"}], "response_url": url}))
            .build();
        assert_eq!(route.handler().call(request).await.unwrap(), json!("approved"));
        assert_eq!(bodies.recv().await.unwrap(), json!({"text": "approved"}));
    }

    #[tokio::test]
    async fn test_response_url_failure_keeps_response() {
        let (url, _bodies) = hook_server(StatusCode::INTERNAL_SERVER_ERROR).await;
        let mut ext = extension().with_responder(local_client());
        ext.add_route(RouteType::Interaction, "approve", ok).unwrap();
        let route = route_for(&ext, RouteType::Interaction);

        let request = Request::builder(RouteType::Interaction)
            .bot("acme")
            .payload(json!({"actions": [{"action_id": "approve"}], "response_url": url}))
            .build();
        assert_eq!(route.handler().call(request).await.unwrap(), json!({"ok": true}));
    }

    #[tokio::test]
    async fn test_null_interaction_response_not_posted() {
        let (url, mut bodies) = hook_server(StatusCode::OK).await;
        let mut ext = extension().with_responder(local_client());
        ext.add_route(RouteType::Interaction, "approve", nothing).unwrap();
        let route = route_for(&ext, RouteType::Interaction);

        let request = Request::builder(RouteType::Interaction)
            .bot("acme")
            .payload(json!({"actions": [{"action_id": "approve"}], "response_url": url}))
            .build();
        assert_eq!(route.handler().call(request).await.unwrap(), json!(""));
        assert!(bodies.try_recv().is_err());
    }
}
