//! Configuration module for the GLaDOS host.
//!
//! Layered TOML/YAML/environment loading plus validation for bots,
//! extensions, logging and host startup options.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file, load_named_folder};
pub use schema::{
    BotConfig, ExtensionBotConfig, ExtensionConfig, GladosConfig, HostConfig, LogFormat,
    LogLevel, LogOutput, LoggingConfig, SecretSource, SpanEventConfig,
};
pub use validation::validate_config;
