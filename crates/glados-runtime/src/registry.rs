//! Bot registry.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use crate::bot::{Bot, SharedBot};
use crate::error::{RuntimeError, RuntimeResult};

/// Bots known to the host, by name.
#[derive(Debug, Default)]
pub struct BotRegistry {
    bots: RwLock<BTreeMap<String, SharedBot>>,
}

impl BotRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a bot. Names are unique.
    pub fn insert(&self, bot: Bot) -> RuntimeResult<SharedBot> {
        let mut bots = self.bots.write();
        if bots.contains_key(bot.name()) {
            return Err(RuntimeError::BotExists(bot.name().to_string()));
        }
        let name = bot.name().to_string();
        let bot = Arc::new(bot);
        bots.insert(name.clone(), Arc::clone(&bot));
        info!(bot = %name, "Registered bot");
        Ok(bot)
    }

    /// Looks up a bot by name.
    pub fn get(&self, name: &str) -> Option<SharedBot> {
        self.bots.read().get(name).cloned()
    }

    /// Whether a bot with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.bots.read().contains_key(name)
    }

    /// Registered bot names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.bots.read().keys().cloned().collect()
    }

    /// Number of registered bots.
    pub fn len(&self) -> usize {
        self.bots.read().len()
    }

    /// Whether no bot is registered.
    pub fn is_empty(&self) -> bool {
        self.bots.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_get() {
        let registry = BotRegistry::new();
        registry.insert(Bot::new("zeta", "t1")).unwrap();
        registry.insert(Bot::new("acme", "t2")).unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names(), vec!["acme", "zeta"]);
        assert_eq!(registry.get("acme").unwrap().token(), "t2");
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let registry = BotRegistry::new();
        registry.insert(Bot::new("acme", "t1")).unwrap();
        let err = registry.insert(Bot::new("acme", "t2")).unwrap_err();
        assert!(matches!(err, RuntimeError::BotExists(ref name) if name == "acme"));
        assert_eq!(registry.get("acme").unwrap().token(), "t1");
    }
}
