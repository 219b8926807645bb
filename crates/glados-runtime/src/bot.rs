//! Bots: named Slack identities with their credentials.

use std::sync::Arc;

use glados_core::{VerificationEnvelope, VerificationError, Verifier};
use tracing::{debug, error, warn};

use crate::config::{BotConfig, SecretSource};
use crate::error::{RuntimeError, RuntimeResult};
use crate::verifier::SigningSecretVerifier;

/// A configured bot.
///
/// The name is URL safe and namespaces the bot's slash commands and
/// message-send routes.
#[derive(Clone)]
pub struct Bot {
    name: String,
    token: String,
    verifier: Option<SigningSecretVerifier>,
    skip_verification: bool,
}

impl Bot {
    /// Creates a bot from already resolved credentials.
    pub fn new(name: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            token: token.into(),
            verifier: None,
            skip_verification: false,
        }
    }

    /// Sets the signing secret used to verify inbound requests.
    pub fn with_signing_secret(mut self, secret: impl Into<String>) -> Self {
        self.verifier = Some(SigningSecretVerifier::new(secret));
        self
    }

    /// Replaces the request verifier, e.g. to widen the timestamp window.
    pub fn with_verifier(mut self, verifier: SigningSecretVerifier) -> Self {
        self.verifier = Some(verifier);
        self
    }

    /// Accepts requests on signed route types without checking them when no
    /// signing secret is configured. For local development only.
    pub fn insecure_skip_verification(mut self) -> Self {
        self.skip_verification = true;
        self
    }

    /// Builds a bot from its configuration entry, reading secrets from the
    /// environment where configured.
    pub fn from_config(name: &str, config: &BotConfig) -> RuntimeResult<Self> {
        let token = resolve_secret(&config.token)?;
        let mut bot = Self::new(name, token);
        if let Some(secret) = &config.signing_secret {
            bot = bot.with_signing_secret(resolve_secret(secret)?);
        }
        if config.insecure_skip_verification {
            bot = bot.insecure_skip_verification();
        }
        debug!(bot = name, verifies = bot.verifier.is_some(), "Bot configured");
        Ok(bot)
    }

    /// Bot name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// API token.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Whether a signing secret is configured.
    pub fn has_signing_secret(&self) -> bool {
        self.verifier.is_some()
    }

    /// Verifier for this bot's signing secret, if one is configured.
    pub fn verifier(&self) -> Option<&SigningSecretVerifier> {
        self.verifier.as_ref()
    }

    /// Checks a request signature against this bot's signing secret.
    ///
    /// A bot without a signing secret rejects every request unless
    /// [`insecure_skip_verification`](Self::insecure_skip_verification) was
    /// set. A missing envelope is always rejected when a secret is configured.
    pub fn verify(&self, envelope: Option<&VerificationEnvelope>) -> RuntimeResult<()> {
        let checked = match &self.verifier {
            Some(verifier) => envelope
                .ok_or(VerificationError::MissingEnvelope)
                .and_then(|envelope| verifier.verify(envelope)),
            None if self.skip_verification => {
                warn!(bot = %self.name, "No signing secret configured, skipping verification");
                return Ok(());
            }
            None => Err(VerificationError::NoSigningSecret),
        };
        checked.map_err(|source| {
            error!(bot = %self.name, error = %source, "Request signature rejected");
            RuntimeError::Verification {
                bot: self.name.clone(),
                source,
            }
        })
    }
}

impl std::fmt::Debug for Bot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bot")
            .field("name", &self.name)
            .field("token", &"<redacted>")
            .field("signing_secret", &self.verifier.is_some())
            .field("skip_verification", &self.skip_verification)
            .finish()
    }
}

/// Shared bot handle.
pub type SharedBot = Arc<Bot>;

/// Resolves a secret, reading `env_var` sources from the environment.
pub fn resolve_secret(source: &SecretSource) -> RuntimeResult<String> {
    match source {
        SecretSource::Literal(value) => Ok(value.clone()),
        SecretSource::Env { env_var } => std::env::var(env_var).map_err(|_| {
            error!(env_var = %env_var, "missing env var");
            RuntimeError::MissingEnvVar(env_var.clone())
        }),
    }
}
