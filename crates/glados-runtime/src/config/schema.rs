//! Configuration schema definitions.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration structure.
///
/// ```toml
/// [glados]
/// bots_config_folder = "config/bots"
/// plugins_config_folder = "config/plugins"
/// import_bots = true
///
/// [logging]
/// level = "debug"
///
/// [bots.acme]
/// token = { env_var = "ACME_TOKEN" }
/// signing_secret = { env_var = "ACME_SIGNING_SECRET" }
///
/// [extensions.greeter]
/// enabled = true
/// bot = { name = "acme" }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GladosConfig {
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Startup behaviour of the host, the `[glados]` section.
    #[serde(default, rename = "glados")]
    pub host: HostConfig,

    /// Bots, keyed by name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub bots: BTreeMap<String, BotConfig>,

    /// Per-extension settings, keyed by extension name.
    #[serde(default, alias = "plugins", skip_serializing_if = "BTreeMap::is_empty")]
    pub extensions: BTreeMap<String, ExtensionConfig>,
}

/// Host startup settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    /// Directory whose `*.toml` / `*.yaml` files are merged into `bots`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bots_config_folder: Option<PathBuf>,

    /// Directory whose `*.toml` / `*.yaml` files are merged into `extensions`.
    #[serde(
        default,
        alias = "plugins_config_folder",
        skip_serializing_if = "Option::is_none"
    )]
    pub extensions_config_folder: Option<PathBuf>,

    /// Register configured bots at startup.
    #[serde(default)]
    pub import_bots: bool,

    /// Load enabled extensions at startup.
    #[serde(default = "default_true", alias = "import_plugins")]
    pub import_extensions: bool,

    /// Post Interaction responses back to the request's `response_url`.
    #[serde(default = "default_true")]
    pub respond_to_url: bool,

    /// Timeout for a `response_url` post, in seconds.
    #[serde(default = "default_response_timeout_secs")]
    pub response_timeout_secs: u64,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            bots_config_folder: None,
            extensions_config_folder: None,
            import_bots: false,
            import_extensions: true,
            respond_to_url: true,
            response_timeout_secs: default_response_timeout_secs(),
        }
    }
}

fn default_response_timeout_secs() -> u64 {
    10
}

fn default_true() -> bool {
    true
}

/// A secret value, either inline or read from the environment.
///
/// ```toml
/// token = "xoxb-inline"
/// signing_secret = { env_var = "ACME_SIGNING_SECRET" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SecretSource {
    /// Name of an environment variable holding the secret.
    Env {
        /// Variable name.
        env_var: String,
    },
    /// The secret itself.
    Literal(String),
}

/// Bot configuration. The bot name is the key in [`GladosConfig::bots`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// API token.
    pub token: SecretSource,

    /// Secret used to verify request signatures.
    #[serde(default)]
    pub signing_secret: Option<SecretSource>,

    /// Accept unsigned requests when no signing secret is set. Local
    /// development only.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub insecure_skip_verification: bool,
}

/// Per-extension configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtensionConfig {
    /// Extensions are disabled unless switched on.
    #[serde(default)]
    pub enabled: bool,

    /// Bot binding.
    #[serde(default)]
    pub bot: ExtensionBotConfig,

    /// Free-form settings handed to the extension factory.
    #[serde(default)]
    pub settings: serde_json::Map<String, serde_json::Value>,
}

/// Which bot an extension runs as.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtensionBotConfig {
    /// Bot name.
    #[serde(default)]
    pub name: Option<String>,
}

// =============================================================================
// Logging
// =============================================================================

/// Log level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Everything.
    Trace,
    /// Debugging detail.
    Debug,
    /// Informational messages.
    Info,
    /// Warnings and errors only.
    #[default]
    Warn,
    /// Errors only.
    Error,
}

impl LogLevel {
    /// Returns the level name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// Converts to a `tracing` level.
    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Single-line, abbreviated.
    #[default]
    Compact,
    /// Single-line, with all span context.
    Full,
    /// Multi-line, human oriented.
    Pretty,
    /// Newline-delimited JSON (requires the `json-log` feature).
    Json,
}

/// Log destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    /// Standard output.
    #[default]
    Stdout,
    /// Standard error.
    Stderr,
    /// A file, see [`LoggingConfig::file_path`].
    File,
}

/// Which span lifecycle events are logged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpanEventConfig {
    /// Span creation.
    #[serde(default)]
    pub new: bool,
    /// Span entry.
    #[serde(default)]
    pub enter: bool,
    /// Span exit.
    #[serde(default)]
    pub exit: bool,
    /// Span close.
    #[serde(default)]
    pub close: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Base level; `RUST_LOG` takes precedence when set.
    #[serde(default)]
    pub level: LogLevel,

    /// Line format.
    #[serde(default)]
    pub format: LogFormat,

    /// Destination.
    #[serde(default)]
    pub output: LogOutput,

    /// Log file, required when `output = "file"`.
    #[serde(default)]
    pub file_path: Option<PathBuf>,

    /// Span lifecycle events.
    #[serde(default)]
    pub span_events: SpanEventConfig,

    /// Include thread ids.
    #[serde(default)]
    pub thread_ids: bool,

    /// Include file name and line number.
    #[serde(default)]
    pub file_location: bool,

    /// Per-module level overrides, e.g. `glados_core = "debug"`.
    #[serde(default)]
    pub filters: BTreeMap<String, LogLevel>,
}
