//! LCM Secrets - credential lookup capability
//!
//! Credentials live in an external secret-management executable; this
//! crate abstracts it as the `SecretProvider` capability so the pipeline
//! can be wired with an in-process store in tests and other environments.
//!
//! The helper adapter is the only production implementation; it is
//! read-only from the pipeline's perspective and safe to call from
//! concurrent requests (each call is an independent process invocation).

#![warn(unreachable_pub)]

mod error;
mod helper;

pub use error::SecretError;
pub use helper::{HelperProcess, HELPER_PATH_ENV};

use parking_lot::RwLock;
use std::collections::HashMap;

/// Capability interface for provider-keyed secret lookup
#[async_trait::async_trait]
pub trait SecretProvider: Send + Sync {
    /// Fetch the key stored for `provider`; empty means "not configured"
    async fn fetch(&self, provider: &str) -> Result<String, SecretError>;

    /// Store or replace the key for `provider`
    async fn store(&self, provider: &str, key: &str) -> Result<(), SecretError>;

    /// Delete the key for `provider`
    async fn delete(&self, provider: &str) -> Result<(), SecretError>;
}

/// In-process secret store
///
/// Stands in for the helper process in tests and single-binary
/// deployments without the credential manager.
#[derive(Debug, Default)]
pub struct InMemoryProvider {
    keys: RwLock<HashMap<String, String>>,
}

impl InMemoryProvider {
    /// Create an empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with one key
    #[must_use]
    pub fn with_key(provider: impl Into<String>, key: impl Into<String>) -> Self {
        let store = Self::new();
        store.keys.write().insert(provider.into(), key.into());
        store
    }
}

#[async_trait::async_trait]
impl SecretProvider for InMemoryProvider {
    async fn fetch(&self, provider: &str) -> Result<String, SecretError> {
        Ok(self.keys.read().get(provider).cloned().unwrap_or_default())
    }

    async fn store(&self, provider: &str, key: &str) -> Result<(), SecretError> {
        self.keys
            .write()
            .insert(provider.to_string(), key.to_string());
        Ok(())
    }

    async fn delete(&self, provider: &str) -> Result<(), SecretError> {
        self.keys.write().remove(provider);
        Ok(())
    }
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn in_memory_round_trip() {
        let store = InMemoryProvider::new();
        store.store("openai", "sk-test").await.unwrap();
        assert_eq!(store.fetch("openai").await.unwrap(), "sk-test");

        store.delete("openai").await.unwrap();
        assert_eq!(store.fetch("openai").await.unwrap(), "");
    }

    #[tokio::test]
    async fn unknown_provider_fetches_empty() {
        let store = InMemoryProvider::new();
        assert_eq!(store.fetch("github").await.unwrap(), "");
    }
}
