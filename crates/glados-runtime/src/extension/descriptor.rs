//! Extension descriptors: the static, `Copy` handle to an extension.
//!
//! Descriptors are either handed to the host explicitly or collected at link
//! time from the [`EXTENSIONS`] slice:
//!
//! ```rust,ignore
//! use glados::linkme::distributed_slice;
//! use glados::prelude::*;
//!
//! fn create(ctx: ExtensionContext) -> RuntimeResult<Extension> {
//!     let mut extension = ctx.extension();
//!     extension.add_route(RouteType::Slash, "ping", pong)?;
//!     Ok(extension)
//! }
//!
//! #[distributed_slice(EXTENSIONS)]
//! #[linkme(crate = glados::linkme)]
//! static PING: ExtensionDescriptor = ExtensionDescriptor::new("ping", create);
//! ```

use linkme::distributed_slice;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::Extension;
use crate::bot::SharedBot;
use crate::error::RuntimeResult;
use crate::responder::ResponseUrlClient;

/// Factory that builds a live [`Extension`].
pub type CreateExtensionFn = fn(ExtensionContext) -> RuntimeResult<Extension>;

/// Extensions linked into the binary.
#[distributed_slice]
pub static EXTENSIONS: [ExtensionDescriptor];

/// Static handle naming an extension and its factory.
///
/// The name is the lookup key into the `[extensions]` configuration section.
#[derive(Debug, Clone, Copy)]
pub struct ExtensionDescriptor {
    /// Extension name.
    pub name: &'static str,
    /// Factory.
    pub create: CreateExtensionFn,
}

impl ExtensionDescriptor {
    /// Creates a descriptor.
    pub const fn new(name: &'static str, create: CreateExtensionFn) -> Self {
        Self { name, create }
    }

    /// Builds the live extension.
    #[inline]
    pub fn instantiate(&self, ctx: ExtensionContext) -> RuntimeResult<Extension> {
        (self.create)(ctx)
    }
}

/// What an extension factory receives.
#[derive(Debug, Clone)]
pub struct ExtensionContext {
    name: String,
    bot: SharedBot,
    settings: Value,
    responder: Option<ResponseUrlClient>,
}

impl ExtensionContext {
    /// Creates a context.
    pub fn new(name: impl Into<String>, bot: SharedBot, settings: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            bot,
            settings: Value::Object(settings),
            responder: None,
        }
    }

    /// Client the extension posts Interaction responses with.
    pub fn with_responder(mut self, responder: Option<ResponseUrlClient>) -> Self {
        self.responder = responder;
        self
    }

    /// Extension name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The bot the extension is configured to run as.
    pub fn bot(&self) -> &SharedBot {
        &self.bot
    }

    /// An empty extension with this context's name, bot and responder.
    pub fn extension(&self) -> Extension {
        let extension = Extension::new(self.name.clone(), self.bot.clone());
        match &self.responder {
            Some(responder) => extension.with_responder(responder.clone()),
            None => extension,
        }
    }

    /// Raw `settings` table from the extension's configuration.
    pub fn settings(&self) -> &Value {
        &self.settings
    }

    /// Deserializes the `settings` table into `T`.
    ///
    /// Use `#[serde(default)]` on `T` to make every field optional.
    pub fn get_config<T>(&self) -> serde_json::Result<T>
    where
        T: DeserializeOwned,
    {
        T::deserialize(&self.settings)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::bot::Bot;
    use glados_core::{HandlerResult, Request, RouteType};
    use serde::Deserialize;
    use serde_json::json;

    async fn pong(_request: Request) -> HandlerResult {
        Ok(json!("pong"))
    }

    fn create(ctx: ExtensionContext) -> RuntimeResult<Extension> {
        let mut extension = ctx.extension();
        extension.add_route(RouteType::Callback, "ping", pong)?;
        Ok(extension)
    }

    #[distributed_slice(EXTENSIONS)]
    static PING: ExtensionDescriptor = ExtensionDescriptor::new("ping_test", create);

    fn context(settings: Value) -> ExtensionContext {
        let settings = match settings {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        ExtensionContext::new("ping_test", Arc::new(Bot::new("acme", "xoxb")), settings)
    }

    #[test]
    fn test_instantiate() {
        let extension = PING.instantiate(context(json!({}))).unwrap();
        assert_eq!(extension.name(), "ping_test");
        assert_eq!(extension.bot().name(), "acme");
        assert_eq!(extension.len(), 1);
    }

    #[test]
    fn test_linked_descriptor_is_collected() {
        assert!(EXTENSIONS.iter().any(|d| d.name == "ping_test"));
    }

    #[test]
    fn test_get_config() {
        #[derive(Deserialize)]
        struct Settings {
            greeting: String,
            #[serde(default)]
            loud: bool,
        }

        let ctx = context(json!({"greeting": "hello"}));
        let settings: Settings = ctx.get_config().unwrap();
        assert_eq!(settings.greeting, "hello");
        assert!(!settings.loud);

        assert!(context(json!({})).get_config::<Settings>().is_err());
    }
}
