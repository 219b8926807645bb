//! Null-safe structured payloads.
//!
//! Inbound bodies are arbitrary nested JSON. Routing needs to reach into them
//! (`actions[0].action_id`, `event.type`, ...) without caring whether any
//! intermediate level exists. [`Node`] is a borrowed view that is either a
//! present value or absent; every accessor on it is total, so a chain of
//! lookups short-circuits to [`Node::Absent`] instead of failing.
//!
//! ```rust
//! use glados_core::Payload;
//! use serde_json::json;
//!
//! let payload = Payload::new(json!({"actions": [{"action_id": "open"}]}));
//! assert_eq!(payload.get("actions").at(0).get("action_id").as_str(), Some("open"));
//! assert!(payload.get("actions").at(3).get("action_id").is_absent());
//! assert!(payload.get("event").get("type").at(1).is_absent());
//! ```

use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::PayloadError;

/// An owned request body.
///
/// A missing or `null` body is normalized to an empty object.
#[derive(Clone, PartialEq)]
pub struct Payload {
    value: Value,
}

impl Payload {
    /// Wraps a JSON document.
    pub fn new(value: Value) -> Self {
        match value {
            Value::Null => Self::empty(),
            value => Self { value },
        }
    }

    /// An empty object.
    pub fn empty() -> Self {
        Self {
            value: Value::Object(Map::new()),
        }
    }

    /// Parses a JSON string. Blank input yields an empty payload.
    pub fn from_json_str(s: &str) -> Result<Self, PayloadError> {
        if s.trim().is_empty() {
            return Ok(Self::empty());
        }
        let value = serde_json::from_str(s)?;
        Ok(Self::new(value))
    }

    /// Root of the document.
    pub fn root(&self) -> Node<'_> {
        Node::Present(&self.value)
    }

    /// Shorthand for `self.root().get(key)`.
    pub fn get(&self, key: &str) -> Node<'_> {
        self.root().get(key)
    }

    /// Shorthand for `self.root().at(index)`.
    pub fn at(&self, index: usize) -> Node<'_> {
        self.root().at(index)
    }

    /// Borrows the underlying document.
    pub fn as_value(&self) -> &Value {
        &self.value
    }

    /// Consumes the payload, returning the underlying document.
    pub fn into_value(self) -> Value {
        self.value
    }

    /// Deserializes the whole payload into `T`.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, PayloadError> {
        Ok(T::deserialize(&self.value)?)
    }
}

impl Default for Payload {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Payload({})", self.value)
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.value, f)
    }
}

/// A borrowed position inside a payload that may not exist.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Node<'a> {
    /// The path resolved to a value (possibly `null`).
    Present(&'a Value),
    /// Some step of the path did not exist or was not a container.
    Absent,
}

impl<'a> Node<'a> {
    /// Looks up `key` if this node is an object.
    pub fn get(self, key: &str) -> Node<'a> {
        match self {
            Node::Present(Value::Object(map)) => map.get(key).map_or(Node::Absent, Node::Present),
            _ => Node::Absent,
        }
    }

    /// Indexes into this node if it is an array.
    pub fn at(self, index: usize) -> Node<'a> {
        match self {
            Node::Present(Value::Array(items)) => {
                items.get(index).map_or(Node::Absent, Node::Present)
            }
            _ => Node::Absent,
        }
    }

    /// Follows a dotted path; numeric segments index arrays.
    ///
    /// `"actions.0.action_id"` is equivalent to
    /// `.get("actions").at(0).get("action_id")`.
    pub fn path(self, path: &str) -> Node<'a> {
        path.split('.').fold(self, |node, segment| match node {
            Node::Present(Value::Array(_)) => match segment.parse::<usize>() {
                Ok(index) => node.at(index),
                Err(_) => Node::Absent,
            },
            _ => node.get(segment),
        })
    }

    /// `true` when the path did not resolve.
    pub fn is_absent(self) -> bool {
        matches!(self, Node::Absent)
    }

    /// `true` when the path resolved to a value.
    pub fn is_present(self) -> bool {
        !self.is_absent()
    }

    /// The underlying value, if present.
    pub fn value(self) -> Option<&'a Value> {
        match self {
            Node::Present(value) => Some(value),
            Node::Absent => None,
        }
    }

    /// String content, if this is a present string.
    pub fn as_str(self) -> Option<&'a str> {
        self.value().and_then(Value::as_str)
    }

    /// Integer content, if this is a present integer.
    pub fn as_i64(self) -> Option<i64> {
        self.value().and_then(Value::as_i64)
    }

    /// Boolean content, if this is a present boolean.
    pub fn as_bool(self) -> Option<bool> {
        self.value().and_then(Value::as_bool)
    }

    /// Scalar content rendered as a string.
    ///
    /// Strings are returned as-is; numbers and booleans are formatted. Objects,
    /// arrays, `null` and absent nodes yield `None`.
    pub fn to_key(self) -> Option<String> {
        match self.value()? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_is_empty_object() {
        assert_eq!(Payload::default(), Payload::empty());
        assert_eq!(Payload::default().as_value(), &json!({}));
    }

    #[test]
    fn test_null_and_blank_become_empty_object() {
        assert_eq!(Payload::new(Value::Null).as_value(), &json!({}));
        assert_eq!(Payload::from_json_str("  ").unwrap().as_value(), &json!({}));
    }

    #[test]
    fn test_from_json_str() {
        let payload = Payload::from_json_str(r#"{"message": "hi"}"#).unwrap();
        assert_eq!(payload.get("message").as_str(), Some("hi"));
        assert!(payload.get("other_param").is_absent());
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(matches!(
            Payload::from_json_str("{not json"),
            Err(PayloadError::Json(_))
        ));
    }

    #[test]
    fn test_missing_levels_are_absent() {
        let payload = Payload::empty();
        assert!(payload.get("event").get("type").is_absent());
        assert!(payload.get("actions").at(0).get("action_id").is_absent());
    }

    #[test]
    fn test_index_past_end_is_absent() {
        let payload = Payload::new(json!({"actions": []}));
        assert!(payload.get("actions").is_present());
        assert!(payload.get("actions").at(0).is_absent());
    }

    #[test]
    fn test_chaining_through_scalar_is_absent() {
        let payload = Payload::new(json!({"event": "message", "n": 3}));
        assert!(payload.get("event").get("type").is_absent());
        assert!(payload.get("event").at(0).is_absent());
        assert!(payload.get("n").get("x").at(2).is_absent());
    }

    #[test]
    fn test_path() {
        let payload = Payload::new(json!({"actions": [{"action_id": "open"}], "event": {"type": "message"}}));
        assert_eq!(payload.root().path("actions.0.action_id").as_str(), Some("open"));
        assert_eq!(payload.root().path("event.type").as_str(), Some("message"));
        assert!(payload.root().path("actions.x.action_id").is_absent());
        assert!(payload.root().path("actions.1").is_absent());
    }

    #[test]
    fn test_to_key() {
        let payload = Payload::new(json!({"s": "a", "n": 7, "b": true, "z": null, "o": {}}));
        assert_eq!(payload.get("s").to_key().as_deref(), Some("a"));
        assert_eq!(payload.get("n").to_key().as_deref(), Some("7"));
        assert_eq!(payload.get("b").to_key().as_deref(), Some("true"));
        assert_eq!(payload.get("z").to_key(), None);
        assert_eq!(payload.get("o").to_key(), None);
        assert_eq!(payload.get("missing").to_key(), None);
    }

    #[test]
    fn test_deserialize() {
        #[derive(serde::Deserialize)]
        struct Body {
            text: String,
        }
        let payload = Payload::new(json!({"text": "hello"}));
        let body: Body = payload.deserialize().unwrap();
        assert_eq!(body.text, "hello");
        assert!(payload.deserialize::<Vec<u8>>().is_err());
    }
}
