//! Error types for secret lookup
//!
//! Any failure here is a configuration error for the caller: the helper
//! process is the single source of truth for credentials and lookups are
//! never retried by this crate.

/// Errors raised by secret providers
#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    /// Helper executable could not be spawned
    #[error("failed to run credential helper for '{provider}': {message}")]
    HelperSpawn { provider: String, message: String },

    /// Helper exited non-zero
    #[error("credential helper failed for '{provider}': {stderr}")]
    HelperFailed { provider: String, stderr: String },

    /// Helper stdout was not the expected JSON shape
    #[error("credential helper returned malformed json: {output}")]
    MalformedReply { output: String },

    /// Helper reported a non-success status or a mismatched provider
    #[error("credential lookup for '{provider}' was not successful: {output}")]
    LookupFailed { provider: String, output: String },

    /// No key is stored for the provider
    #[error("no key configured for provider '{0}'")]
    Missing(String),
}
