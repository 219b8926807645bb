//! Route type taxonomy.
//!
//! Every inbound platform event falls into exactly one [`RouteType`]. The
//! type decides where the dispatch key comes from (see
//! [`derive_key`](crate::request::derive_key)), whether the key is namespaced
//! by a bot name, and whether the boundary layer has to verify the request
//! signature before the request is built.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Classification of inbound requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RouteType {
    /// Outgoing message requested by an internal caller.
    SendMessage,
    /// Response to an earlier request.
    Response,
    /// Generic callback.
    Callback,
    /// Slash command.
    Slash,
    /// Events API callback.
    Events,
    /// Block-kit button or other interactive component.
    Interaction,
    /// External select-menu options request.
    Menu,
}

/// Route types whose dispatch key is prefixed with `"{bot_name}_"`.
pub const BOT_ROUTES: [RouteType; 2] = [RouteType::Events, RouteType::Interaction];

/// Route types whose upstream signature must be verified.
pub const VERIFY_ROUTES: [RouteType; 4] = [
    RouteType::Slash,
    RouteType::Events,
    RouteType::Interaction,
    RouteType::Menu,
];

impl RouteType {
    /// All variants, in declaration order.
    pub const ALL: [RouteType; 7] = [
        RouteType::SendMessage,
        RouteType::Response,
        RouteType::Callback,
        RouteType::Slash,
        RouteType::Events,
        RouteType::Interaction,
        RouteType::Menu,
    ];

    /// Number of variants.
    pub const COUNT: usize = Self::ALL.len();

    /// Dense index of this variant, `0..COUNT`.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the variant name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::SendMessage => "SendMessage",
            Self::Response => "Response",
            Self::Callback => "Callback",
            Self::Slash => "Slash",
            Self::Events => "Events",
            Self::Interaction => "Interaction",
            Self::Menu => "Menu",
        }
    }

    /// Whether the dispatch key for this type is namespaced by a bot name.
    pub const fn requires_bot_prefix(self) -> bool {
        matches!(self, Self::Events | Self::Interaction)
    }

    /// Whether requests of this type carry a signature that must be checked.
    pub const fn requires_verification(self) -> bool {
        matches!(
            self,
            Self::Slash | Self::Events | Self::Interaction | Self::Menu
        )
    }

    /// The bot-prefixed route types.
    pub fn to_bot_routes() -> &'static [RouteType] {
        &BOT_ROUTES
    }

    /// The route types that require signature verification.
    pub fn to_verify_routes() -> &'static [RouteType] {
        &VERIFY_ROUTES
    }
}

impl fmt::Display for RouteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown route type name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown route type '{0}'")]
pub struct UnknownRouteType(pub String);

impl FromStr for RouteType {
    type Err = UnknownRouteType;

    /// Parses a variant name, case-insensitively (`"slash"`, `"Slash"`,
    /// `"send_message"` and `"SendMessage"` are all accepted).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();
        Self::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| UnknownRouteType(s.to_string()))
    }
}

/// Well-known Events API event types, usable as route keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventRoute {
    /// A user opened the app home tab.
    AppHomeOpened,
    /// A message was posted.
    Message,
}

impl EventRoute {
    /// The wire name of the event type.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AppHomeOpened => "app_home_opened",
            Self::Message => "message",
        }
    }
}

impl fmt::Display for EventRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventRoute {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "app_home_opened" => Ok(Self::AppHomeOpened),
            "message" => Ok(Self::Message),
            _ => Err(()),
        }
    }
}

impl From<EventRoute> for String {
    fn from(route: EventRoute) -> Self {
        route.as_str().to_string()
    }
}
