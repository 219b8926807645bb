//! The GLaDOS host: bots, extensions and the router they feed.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use glados_runtime::Glados;
//!
//! // Loads glados.toml from the current directory, initializes logging,
//! // imports bots and loads every enabled extension linked into the binary.
//! let glados = Glados::builder().build()?;
//!
//! let response = glados.request(request).await?;
//! ```

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use glados_core::{DispatchError, Request, RouteType, Router};
use parking_lot::RwLock;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::bot::{Bot, SharedBot};
use crate::config::{ConfigLoader, GladosConfig, validate_config};
use crate::error::{RuntimeError, RuntimeResult};
use crate::extension::{EXTENSIONS, Extension, ExtensionContext, ExtensionDescriptor};
use crate::logging::{self, LoggingBuilder};
use crate::registry::BotRegistry;
use crate::responder::ResponseUrlClient;

/// The host.
///
/// All methods take `&self`; bots and extensions may be added while requests
/// are being dispatched.
pub struct Glados {
    config: GladosConfig,
    router: Arc<Router>,
    bots: BotRegistry,
    extensions: RwLock<BTreeSet<String>>,
    responder: Option<ResponseUrlClient>,
}

impl Glados {
    /// Creates an empty host. Nothing is imported and logging is untouched.
    pub fn new(config: GladosConfig) -> Self {
        Self {
            config,
            router: Arc::new(Router::new()),
            bots: BotRegistry::new(),
            extensions: RwLock::new(BTreeSet::new()),
            responder: None,
        }
    }

    /// Posts Interaction responses of extensions loaded from now on to their
    /// `response_url`.
    pub fn with_responder(mut self, responder: ResponseUrlClient) -> Self {
        self.responder = Some(responder);
        self
    }

    /// Client used for `response_url` posts, if enabled.
    pub fn responder(&self) -> Option<&ResponseUrlClient> {
        self.responder.as_ref()
    }

    /// Creates a builder that loads configuration from the current directory.
    pub fn builder() -> GladosBuilder {
        GladosBuilder::new()
    }

    /// The configuration the host was built with.
    pub fn config(&self) -> &GladosConfig {
        &self.config
    }

    /// The router.
    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }

    /// Registered bots.
    pub fn bots(&self) -> &BotRegistry {
        &self.bots
    }

    /// Names of loaded extensions, sorted.
    pub fn extensions(&self) -> Vec<String> {
        self.extensions.read().iter().cloned().collect()
    }

    /// Registers a bot.
    pub fn add_bot(&self, bot: Bot) -> RuntimeResult<SharedBot> {
        self.bots.insert(bot)
    }

    /// Registers every bot in the `[bots]` configuration section.
    pub fn import_bots(&self) -> RuntimeResult<()> {
        for (name, config) in &self.config.bots {
            self.add_bot(Bot::from_config(name, config)?)?;
        }
        debug!(count = self.config.bots.len(), "Imported bots");
        Ok(())
    }

    /// Registers all routes of `extension` with the router.
    ///
    /// Either every route is registered or none is: on a collision the routes
    /// already added are removed again and the extension is not recorded as
    /// loaded, so a corrected extension of the same name can be added later.
    pub fn add_extension(&self, extension: Extension) -> RuntimeResult<()> {
        let name = extension.name().to_string();
        let mut loaded = self.extensions.write();
        if loaded.contains(&name) {
            return Err(RuntimeError::ExtensionExists(name));
        }

        let count = extension.len();
        let mut added: Vec<(RouteType, String)> = Vec::with_capacity(count);
        for route in extension.into_routes() {
            let slot = (route.route_type(), route.key().to_string());
            if let Err(e) = self.router.add_route(&name, route) {
                for (route_type, key) in &added {
                    self.router.remove_route(*route_type, key);
                }
                warn!(
                    extension = %name,
                    rolled_back = added.len(),
                    error = %e,
                    "Extension not loaded"
                );
                return Err(e.into());
            }
            added.push(slot);
        }

        loaded.insert(name.clone());
        info!(extension = %name, routes = count, "Loaded extension");
        Ok(())
    }

    /// Creates and adds the extension described by `descriptor`, following its
    /// `[extensions.<name>]` configuration.
    ///
    /// Returns `Ok(false)` when the extension is not configured or disabled.
    pub fn load_extension(&self, descriptor: &ExtensionDescriptor) -> RuntimeResult<bool> {
        let name = descriptor.name;
        let Some(config) = self.config.extensions.get(name) else {
            warn!(extension = name, "No configuration for extension, skipping");
            return Ok(false);
        };
        if !config.enabled {
            warn!(extension = name, "Extension is disabled");
            return Ok(false);
        }

        let bot_name = config
            .bot
            .name
            .as_deref()
            .filter(|n| !n.is_empty())
            .ok_or_else(|| RuntimeError::MissingBotName(name.to_string()))?;
        let bot = self
            .bots
            .get(bot_name)
            .ok_or_else(|| RuntimeError::BotNotFound {
                bot: bot_name.to_string(),
                extension: name.to_string(),
            })?;

        let ctx = ExtensionContext::new(name, bot, config.settings.clone())
            .with_responder(self.responder.clone());
        self.add_extension(descriptor.instantiate(ctx)?)?;
        Ok(true)
    }

    /// Loads each descriptor in turn and returns the names loaded.
    ///
    /// Extensions whose bot is unset or unknown are skipped; any other
    /// failure aborts loading.
    pub fn load_extensions<'a, I>(&self, descriptors: I) -> RuntimeResult<Vec<String>>
    where
        I: IntoIterator<Item = &'a ExtensionDescriptor>,
    {
        let mut loaded = Vec::new();
        for descriptor in descriptors {
            match self.load_extension(descriptor) {
                Ok(true) => loaded.push(descriptor.name.to_string()),
                Ok(false) => {}
                Err(e @ (RuntimeError::MissingBotName(_) | RuntimeError::BotNotFound { .. })) => {
                    error!(error = %e, extension = descriptor.name, "Disabling extension");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(loaded)
    }

    /// Dispatches a request to its handler.
    pub async fn request(&self, request: Request) -> Result<Value, DispatchError> {
        self.router.dispatch(request).await
    }
}

impl std::fmt::Debug for Glados {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Glados")
            .field("bots", &self.bots.names())
            .field("extensions", &self.extensions())
            .field("router", &self.router)
            .finish()
    }
}

// =============================================================================
// GladosBuilder
// =============================================================================

/// Builder for a [`Glados`] host.
///
/// `build` runs the startup sequence:
///
/// 1. load (or take) and validate the configuration
/// 2. initialize logging
/// 3. create the `response_url` client when `respond_to_url` is set
/// 4. register explicitly added bots, then `[bots]` when `import_bots` is set
/// 5. when `import_extensions` is set, load the explicitly added descriptors
///    followed by those in [`EXTENSIONS`]
pub struct GladosBuilder {
    config_loader: ConfigLoader,
    config: Option<GladosConfig>,
    logging: Option<LoggingBuilder>,
    init_logging: bool,
    bots: Vec<Bot>,
    descriptors: Vec<ExtensionDescriptor>,
    linked_extensions: bool,
}

impl GladosBuilder {
    /// Creates a builder that searches the current directory for config.
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new().with_current_dir(),
            config: None,
            logging: None,
            init_logging: true,
            bots: Vec::new(),
            descriptors: Vec::new(),
            linked_extensions: true,
        }
    }

    /// Loads this configuration file instead of searching.
    pub fn config_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    /// Sets the configuration profile.
    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    /// Adds a configuration search path.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    /// Disables `GLADOS_*` environment overrides.
    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    /// Merges configuration over the loaded files.
    pub fn merge(mut self, config: GladosConfig) -> Self {
        self.config_loader = self.config_loader.merge(config);
        self
    }

    /// Uses this configuration as is, skipping file and environment loading.
    pub fn config(mut self, config: GladosConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Initializes logging with this builder instead of the `[logging]` section.
    pub fn logging(mut self, logging: LoggingBuilder) -> Self {
        self.logging = Some(logging);
        self.init_logging = true;
        self
    }

    /// Leaves logging setup to the caller.
    pub fn without_logging(mut self) -> Self {
        self.init_logging = false;
        self
    }

    /// Registers a bot before configured bots are imported.
    pub fn bot(mut self, bot: Bot) -> Self {
        self.bots.push(bot);
        self
    }

    /// Adds an extension descriptor.
    pub fn extension(mut self, descriptor: ExtensionDescriptor) -> Self {
        self.descriptors.push(descriptor);
        self
    }

    /// Ignores descriptors in [`EXTENSIONS`].
    pub fn without_linked_extensions(mut self) -> Self {
        self.linked_extensions = false;
        self
    }

    /// Builds the host.
    pub fn build(self) -> RuntimeResult<Glados> {
        let config = match self.config {
            Some(config) => config,
            None => self.config_loader.load()?,
        };
        validate_config(&config)?;

        if self.init_logging {
            let installed = match self.logging {
                Some(builder) => builder.try_init().is_ok(),
                None => logging::init_from_config(&config.logging),
            };
            if !installed {
                debug!("Global subscriber already installed, keeping it");
            }
        }

        let respond_to_url = config.host.respond_to_url;
        let timeout = Duration::from_secs(config.host.response_timeout_secs);
        let mut glados = Glados::new(config);
        if respond_to_url {
            glados = glados.with_responder(ResponseUrlClient::new(timeout)?);
        }

        for bot in self.bots {
            glados.add_bot(bot)?;
        }
        if glados.config.host.import_bots {
            glados.import_bots()?;
        }

        if glados.config.host.import_extensions {
            let linked: &[ExtensionDescriptor] = if self.linked_extensions {
                &EXTENSIONS
            } else {
                &[]
            };
            glados.load_extensions(self.descriptors.iter().chain(linked.iter()))?;
        } else {
            debug!("Extension import disabled");
        }

        info!(
            bots = glados.bots.len(),
            extensions = glados.extensions.read().len(),
            "GLaDOS host ready"
        );
        Ok(glados)
    }
}

impl Default for GladosBuilder {
    fn default() -> Self {
        Self::new()
    }
}
