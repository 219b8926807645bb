//! Slack request signature verification.
//!
//! Slack signs every request with `v0=hex(HMAC-SHA256(secret, "v0:{ts}:{body}"))`
//! and sends the timestamp alongside. A request is accepted when the
//! signature matches and the timestamp is within five minutes of now.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use glados_core::{VerificationEnvelope, VerificationError, Verifier};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::{debug, warn};

type HmacSha256 = Hmac<Sha256>;

/// Signature version prefix.
const VERSION: &str = "v0";

/// Default tolerated clock skew between Slack and this host.
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(60 * 5);

/// Verifies Slack `v0` signatures with a bot's signing secret.
#[derive(Clone)]
pub struct SigningSecretVerifier {
    secret: String,
    max_age: Option<Duration>,
}

impl SigningSecretVerifier {
    /// Creates a verifier with the default five minute window.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            max_age: Some(DEFAULT_MAX_AGE),
        }
    }

    /// Sets the accepted timestamp window; `None` disables the check.
    pub fn max_age(mut self, max_age: Option<Duration>) -> Self {
        self.max_age = max_age;
        self
    }

    /// Computes the `v0=...` signature for a timestamp and body.
    pub fn sign(&self, timestamp: &str, body: &str) -> String {
        let mac = self.mac(timestamp, body);
        format!("{VERSION}={}", hex::encode(mac.finalize().into_bytes()))
    }

    /// Verifies `envelope` as if the current unix time were `now`.
    pub fn verify_at(
        &self,
        envelope: &VerificationEnvelope,
        now: i64,
    ) -> Result<(), VerificationError> {
        let timestamp = envelope
            .timestamp()
            .ok_or(VerificationError::MissingTimestamp)?;
        let signature = envelope
            .signature()
            .ok_or(VerificationError::MissingSignature)?;

        let ts: i64 = timestamp
            .trim()
            .parse()
            .map_err(|_| VerificationError::MalformedTimestamp(timestamp.to_string()))?;

        if let Some(max_age) = self.max_age
            && now.abs_diff(ts) > max_age.as_secs()
        {
            warn!(timestamp = ts, now, "Rejected stale request timestamp");
            return Err(VerificationError::Expired { timestamp: ts });
        }

        let digest = signature
            .strip_prefix(VERSION)
            .and_then(|rest| rest.strip_prefix('='))
            .and_then(|hex_digest| hex::decode(hex_digest).ok())
            .ok_or(VerificationError::InvalidSignature)?;

        self.mac(timestamp, envelope.body())
            .verify_slice(&digest)
            .map_err(|_| VerificationError::InvalidSignature)?;

        debug!(timestamp = ts, "Request signature verified");
        Ok(())
    }

    fn mac(&self, timestamp: &str, body: &str) -> HmacSha256 {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .unwrap_or_else(|_| unreachable!("HMAC accepts keys of any length"));
        mac.update(VERSION.as_bytes());
        mac.update(b":");
        mac.update(timestamp.as_bytes());
        mac.update(b":");
        mac.update(body.as_bytes());
        mac
    }
}

impl Verifier for SigningSecretVerifier {
    fn verify(&self, envelope: &VerificationEnvelope) -> Result<(), VerificationError> {
        self.verify_at(envelope, unix_now())
    }
}

impl std::fmt::Debug for SigningSecretVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningSecretVerifier")
            .field("secret", &"<redacted>")
            .field("max_age", &self.max_age)
            .finish()
    }
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}
