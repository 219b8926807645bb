//! Verification data carried by requests.
//!
//! The router never inspects these; the boundary layer (or an extension
//! wrapper) hands the envelope to a [`Verifier`] for route types where
//! [`RouteType::requires_verification`](crate::RouteType::requires_verification)
//! is true.

use crate::error::VerificationError;

/// Raw material needed to authenticate an inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationEnvelope {
    body: String,
    timestamp: Option<String>,
    signature: Option<String>,
}

impl VerificationEnvelope {
    /// Creates an envelope from the raw body and the timestamp and signature
    /// headers.
    pub fn new(body: impl Into<String>, timestamp: Option<String>, signature: Option<String>) -> Self {
        Self {
            body: body.into(),
            timestamp,
            signature,
        }
    }

    /// The raw request body, exactly as received.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// The request timestamp header.
    pub fn timestamp(&self) -> Option<&str> {
        self.timestamp.as_deref()
    }

    /// The request signature header.
    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }
}

/// Checks a [`VerificationEnvelope`].
pub trait Verifier: Send + Sync {
    /// Returns `Ok(())` when the envelope authenticates the request.
    fn verify(&self, envelope: &VerificationEnvelope) -> Result<(), VerificationError>;
}

impl<F> Verifier for F
where
    F: Fn(&VerificationEnvelope) -> Result<(), VerificationError> + Send + Sync,
{
    fn verify(&self, envelope: &VerificationEnvelope) -> Result<(), VerificationError> {
        self(envelope)
    }
}
