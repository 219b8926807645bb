//! Configuration validation utilities.

use super::error::{ConfigError, ConfigResult};
use super::schema::{GladosConfig, LogOutput, LoggingConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &GladosConfig) -> ConfigResult<()> {
    validate_logging_config(&config.logging)?;

    if config.host.respond_to_url && config.host.response_timeout_secs == 0 {
        return Err(ConfigError::validation(
            "glados.response_timeout_secs must be positive when respond_to_url is set",
        ));
    }

    for name in config.bots.keys() {
        validate_name("bot", name)?;
    }

    for (name, extension) in &config.extensions {
        validate_name("extension", name)?;
        if let Some(bot) = &extension.bot.name {
            validate_name("bot", bot)?;
        }
    }

    Ok(())
}

/// Validates logging settings.
fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::validation(
            "logging.file_path is required when logging.output is \"file\"",
        ));
    }

    if logging.filters.keys().any(|target| target.trim().is_empty()) {
        return Err(ConfigError::validation(
            "logging.filters cannot contain an empty target",
        ));
    }

    Ok(())
}

/// Names become route prefixes and registry keys.
fn validate_name(kind: &str, name: &str) -> ConfigResult<()> {
    if name.is_empty() {
        return Err(ConfigError::validation(format!("{kind} name cannot be empty")));
    }

    if name.chars().any(char::is_whitespace) {
        return Err(ConfigError::validation(format!(
            "{kind} name cannot contain whitespace: {name:?}"
        )));
    }

    Ok(())
}
