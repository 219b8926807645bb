//! Normalized inbound requests.
//!
//! A [`Request`] is built once per inbound event. Building it derives the
//! dispatch key from the payload according to the route type:
//!
//! | route type    | key source                         |
//! |---------------|------------------------------------|
//! | `Menu`        | `action_id`                        |
//! | `Interaction` | `actions[0].action_id`             |
//! | `Events`      | `event.type`                       |
//! | others        | the key supplied by the caller     |
//!
//! For [`BOT_ROUTES`](crate::route_type::BOT_ROUTES) the effective key is
//! additionally namespaced as `"{bot_name}_{key}"`. A missing bot name gives
//! an empty namespace (`"_{key}"`). A missing key stays missing whatever the
//! route type, and never matches a route.

use crate::payload::Payload;
use crate::route_type::RouteType;
use crate::verify::VerificationEnvelope;

/// Derives the dispatch key for `route_type` from `payload`.
///
/// Empty strings are treated as absent.
pub fn derive_key(route_type: RouteType, payload: &Payload, raw_key: Option<&str>) -> Option<String> {
    let key = match route_type {
        RouteType::Menu => payload.get("action_id").to_key(),
        RouteType::Interaction => payload.get("actions").at(0).get("action_id").to_key(),
        RouteType::Events => payload.get("event").get("type").to_key(),
        RouteType::SendMessage | RouteType::Response | RouteType::Callback | RouteType::Slash => {
            raw_key.map(str::to_owned)
        }
    };
    key.filter(|k| !k.is_empty())
}

/// Applies the bot namespace for bot-prefixed route types.
pub fn prefixed_key(route_type: RouteType, bot_name: Option<&str>, key: &str) -> String {
    if route_type.requires_bot_prefix() {
        format!("{}_{}", bot_name.unwrap_or_default(), key)
    } else {
        key.to_owned()
    }
}

/// A normalized inbound request.
///
/// # Example
///
/// ```rust
/// use glados_core::{Request, RouteType};
/// use serde_json::json;
///
/// let request = Request::builder(RouteType::Events)
///     .bot("acme")
///     .payload(json!({"event": {"type": "message"}}))
///     .build();
/// assert_eq!(request.key(), Some("message"));
/// assert_eq!(request.effective_key().as_deref(), Some("acme_message"));
/// ```
#[derive(Debug, Clone)]
pub struct Request {
    route_type: RouteType,
    payload: Payload,
    bot_name: Option<String>,
    raw_key: Option<String>,
    key: Option<String>,
    verification: Option<VerificationEnvelope>,
    response_url: Option<String>,
    trigger_id: Option<String>,
}

impl Request {
    /// Starts building a request of the given type.
    pub fn builder(route_type: RouteType) -> RequestBuilder {
        RequestBuilder {
            route_type,
            payload: Payload::empty(),
            bot_name: None,
            raw_key: None,
            verification: None,
        }
    }

    /// The route type.
    pub fn route_type(&self) -> RouteType {
        self.route_type
    }

    /// The request body.
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// The bot this request is addressed to.
    pub fn bot_name(&self) -> Option<&str> {
        self.bot_name.as_deref()
    }

    /// The key supplied by the caller, before any payload-derived override.
    pub fn raw_key(&self) -> Option<&str> {
        self.raw_key.as_deref()
    }

    /// The dispatch key before bot namespacing.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Replaces the dispatch key, bypassing derivation.
    ///
    /// Used for manual dispatch and tests. Bot namespacing still applies.
    pub fn set_key(&mut self, key: impl Into<String>) {
        let key = key.into();
        self.raw_key = Some(key.clone());
        self.key = Some(key).filter(|k| !k.is_empty());
    }

    /// The key used to look up the route.
    pub fn effective_key(&self) -> Option<String> {
        let key = self.key.as_deref()?;
        Some(prefixed_key(self.route_type, self.bot_name.as_deref(), key))
    }

    /// Verification data, when the boundary layer supplied it.
    pub fn verification(&self) -> Option<&VerificationEnvelope> {
        self.verification.as_ref()
    }

    /// `response_url` of an interaction.
    pub fn response_url(&self) -> Option<&str> {
        self.response_url.as_deref()
    }

    /// `trigger_id` of an interaction.
    pub fn trigger_id(&self) -> Option<&str> {
        self.trigger_id.as_deref()
    }
}

/// Builder for [`Request`].
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    route_type: RouteType,
    payload: Payload,
    bot_name: Option<String>,
    raw_key: Option<String>,
    verification: Option<VerificationEnvelope>,
}

impl RequestBuilder {
    /// Sets the caller-supplied key.
    ///
    /// Ignored for `Menu`, `Interaction` and `Events`, whose keys come from
    /// the payload.
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.raw_key = Some(key.into());
        self
    }

    /// Sets the addressed bot.
    pub fn bot(mut self, name: impl Into<String>) -> Self {
        self.bot_name = Some(name.into());
        self
    }

    /// Sets the body.
    pub fn payload(mut self, payload: impl Into<Payload>) -> Self {
        self.payload = payload.into();
        self
    }

    /// Attaches verification data.
    pub fn verification(mut self, envelope: VerificationEnvelope) -> Self {
        self.verification = Some(envelope);
        self
    }

    /// Derives the key and finishes the request. Never fails.
    pub fn build(self) -> Request {
        let key = derive_key(self.route_type, &self.payload, self.raw_key.as_deref());

        let (response_url, trigger_id) = match self.route_type {
            RouteType::Interaction => (
                self.payload.get("response_url").as_str().map(str::to_owned),
                self.payload.get("trigger_id").as_str().map(str::to_owned),
            ),
            _ => (None, None),
        };

        Request {
            route_type: self.route_type,
            payload: self.payload,
            bot_name: self.bot_name,
            raw_key: self.raw_key,
            key,
            verification: self.verification,
            response_url,
            trigger_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_menu_key_from_action_id() {
        let r = Request::builder(RouteType::Menu)
            .payload(json!({"action_id": "approve"}))
            .build();
        assert_eq!(r.key(), Some("approve"));
        assert_eq!(r.effective_key().as_deref(), Some("approve"));
    }

    #[test]
    fn test_interaction_key_and_side_fields() {
        let r = Request::builder(RouteType::Interaction)
            .payload(json!({
                "actions": [{"action_id": "open"}],
                "response_url": "https://x",
                "trigger_id": "T1"
            }))
            .build();
        assert_eq!(r.key(), Some("open"));
        assert_eq!(r.response_url(), Some("https://x"));
        assert_eq!(r.trigger_id(), Some("T1"));
    }

    #[test]
    fn test_interaction_ignores_supplied_key() {
        let r = Request::builder(RouteType::Interaction)
            .key("manual")
            .payload(json!({"actions": [{"action_id": "open"}]}))
            .build();
        assert_eq!(r.raw_key(), Some("manual"));
        assert_eq!(r.key(), Some("open"));
    }

    #[test]
    fn test_side_fields_only_for_interaction() {
        let body = json!({"response_url": "https://x", "trigger_id": "T1"});
        for t in RouteType::ALL {
            let r = Request::builder(t).payload(body.clone()).build();
            assert_eq!(r.response_url().is_some(), t == RouteType::Interaction, "{t}");
            assert_eq!(r.trigger_id().is_some(), t == RouteType::Interaction, "{t}");
        }
    }

    #[test]
    fn test_events_key_from_event_type() {
        let r = Request::builder(RouteType::Events)
            .payload(json!({"event": {"type": "message"}}))
            .build();
        assert_eq!(r.key(), Some("message"));
    }

    #[test]
    fn test_supplied_key_for_other_types() {
        for t in [
            RouteType::SendMessage,
            RouteType::Response,
            RouteType::Callback,
            RouteType::Slash,
        ] {
            let r = Request::builder(t)
                .key("send_mock")
                .payload(json!({"action_id": "ignored", "event": {"type": "ignored"}}))
                .build();
            assert_eq!(r.key(), Some("send_mock"), "{t}");
        }
    }

    #[test]
    fn test_bot_prefix() {
        let events = Request::builder(RouteType::Events)
            .bot("acme")
            .payload(json!({"event": {"type": "message"}}))
            .build();
        assert_eq!(events.effective_key().as_deref(), Some("acme_message"));

        let interaction = Request::builder(RouteType::Interaction)
            .bot("acme")
            .payload(json!({"actions": [{"action_id": "message"}]}))
            .build();
        assert_eq!(interaction.effective_key().as_deref(), Some("acme_message"));

        let slash = Request::builder(RouteType::Slash)
            .bot("acme")
            .key("message")
            .build();
        assert_eq!(slash.effective_key().as_deref(), Some("message"));
    }

    #[test]
    fn test_missing_bot_name_gives_empty_prefix() {
        let r = Request::builder(RouteType::Events)
            .payload(json!({"event": {"type": "message"}}))
            .build();
        assert_eq!(r.effective_key().as_deref(), Some("_message"));
    }

    #[test]
    fn test_missing_source_path_is_absent() {
        let menu = Request::builder(RouteType::Menu).payload(json!({})).build();
        assert_eq!(menu.key(), None);
        assert_eq!(menu.effective_key(), None);

        let interaction = Request::builder(RouteType::Interaction)
            .bot("acme")
            .payload(json!({"actions": []}))
            .build();
        assert_eq!(interaction.effective_key(), None);

        let events = Request::builder(RouteType::Events)
            .bot("acme")
            .payload(json!({"event": "message"}))
            .build();
        assert_eq!(events.effective_key(), None);
    }

    #[test]
    fn test_empty_key_is_absent() {
        let r = Request::builder(RouteType::Menu)
            .payload(json!({"action_id": ""}))
            .build();
        assert_eq!(r.key(), None);

        let slash = Request::builder(RouteType::Slash).key("").build();
        assert_eq!(slash.effective_key(), None);
    }

    #[test]
    fn test_set_key_overrides_derivation() {
        let mut r = Request::builder(RouteType::Events)
            .bot("acme")
            .payload(json!({"event": {"type": "message"}}))
            .build();
        r.set_key("app_home_opened");
        assert_eq!(r.raw_key(), Some("app_home_opened"));
        assert_eq!(r.effective_key().as_deref(), Some("acme_app_home_opened"));
    }

    #[test]
    fn test_verification_is_carried() {
        let envelope = VerificationEnvelope::new("body", Some("1".into()), Some("v0=aa".into()));
        let r = Request::builder(RouteType::Slash)
            .key("ask")
            .verification(envelope.clone())
            .build();
        assert_eq!(r.verification(), Some(&envelope));
    }
}
