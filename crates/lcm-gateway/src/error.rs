//! Error types for the model gateway
//!
//! The retry layer only ever retries `Throttled`; everything else
//! propagates to the pipeline immediately.

/// Errors raised while talking to the model service
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// No usable API key for the model provider
    #[error("model credentials unavailable: {0}")]
    Credentials(String),

    /// The service asked us to slow down
    #[error("model service throttled: {0}")]
    Throttled(String),

    /// Any other request failure (transport, status, malformed reply)
    #[error("model request failed: {0}")]
    Request(String),

    /// Throttling persisted through every allowed attempt
    #[error("model request retries exhausted after {attempts} attempts: {last}")]
    RetriesExhausted {
        /// Attempts made, including the first
        attempts: u32,
        /// Message from the final throttling signal
        last: String,
    },
}

impl GatewayError {
    /// Check if the error is a throttling signal
    #[inline]
    #[must_use]
    pub fn is_throttled(&self) -> bool {
        matches!(self, Self::Throttled(_))
    }
}

impl From<lcm_secrets::SecretError> for GatewayError {
    fn from(err: lcm_secrets::SecretError) -> Self {
        Self::Credentials(err.to_string())
    }
}
