//! Adapter over the external credential-manager executable
//!
//! The helper owns encrypted credential storage; this crate only speaks
//! its process contract: one invocation per operation, a JSON object on
//! stdout (`{provider, status, key}`), and a non-`success` status meaning
//! the operation failed. Nothing here is retried.

use crate::error::SecretError;
use crate::SecretProvider;
use serde::Deserialize;
use std::path::PathBuf;
use tokio::process::Command;

/// Environment variable overriding the helper executable location
pub const HELPER_PATH_ENV: &str = "LCM_API_MANAGER";

/// One JSON reply from the helper process
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct HelperReply {
    #[serde(default)]
    pub(crate) provider: String,
    #[serde(default)]
    pub(crate) status: String,
    #[serde(default)]
    pub(crate) key: Option<String>,
}

/// Secret provider backed by the credential-manager helper process
#[derive(Debug, Clone)]
pub struct HelperProcess {
    executable: PathBuf,
}

impl HelperProcess {
    /// Use an explicit helper executable path
    #[inline]
    #[must_use]
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    /// Resolve the helper from the environment, falling back to the
    /// conventional build location next to the backend
    #[must_use]
    pub fn from_env() -> Self {
        let executable = std::env::var_os(HELPER_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                PathBuf::from("./api_manager/target/release").join(Self::executable_name())
            });
        Self { executable }
    }

    /// Platform-specific helper executable name
    #[inline]
    #[must_use]
    pub fn executable_name() -> &'static str {
        if cfg!(windows) {
            "api_manager.exe"
        } else {
            "api_manager"
        }
    }

    async fn run(&self, args: &[&str], provider: &str) -> Result<HelperReply, SecretError> {
        let output = Command::new(&self.executable)
            .args(args)
            .output()
            .await
            .map_err(|e| SecretError::HelperSpawn {
                provider: provider.to_string(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(SecretError::HelperFailed {
                provider: provider.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        parse_reply(&stdout)
    }
}

pub(crate) fn parse_reply(stdout: &str) -> Result<HelperReply, SecretError> {
    serde_json::from_str(stdout).map_err(|_| SecretError::MalformedReply {
        output: stdout.to_string(),
    })
}

#[async_trait::async_trait]
impl SecretProvider for HelperProcess {
    async fn fetch(&self, provider: &str) -> Result<String, SecretError> {
        let reply = self.run(&["-g", provider], provider).await?;
        if reply.status == "success" && reply.provider == provider {
            // An empty key means "not configured", not an error
            let key = reply.key.unwrap_or_default();
            return Ok(key.trim().to_string());
        }
        Err(SecretError::LookupFailed {
            provider: provider.to_string(),
            output: format!("status={}, provider={}", reply.status, reply.provider),
        })
    }

    async fn store(&self, provider: &str, key: &str) -> Result<(), SecretError> {
        let reply = self.run(&["-s", key, provider], provider).await?;
        if reply.status == "success" {
            tracing::info!(provider, "credential stored");
            return Ok(());
        }
        Err(SecretError::LookupFailed {
            provider: provider.to_string(),
            output: format!("status={}", reply.status),
        })
    }

    async fn delete(&self, provider: &str) -> Result<(), SecretError> {
        let reply = self.run(&["-d", provider], provider).await?;
        if reply.status == "success" {
            tracing::info!(provider, "credential deleted");
            return Ok(());
        }
        Err(SecretError::LookupFailed {
            provider: provider.to_string(),
            output: format!("status={}", reply.status),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_parses_success_shape() {
        let reply = parse_reply(r#"{"provider":"openai","status":"success","key":"sk-123"}"#)
            .unwrap();
        assert_eq!(reply.provider, "openai");
        assert_eq!(reply.status, "success");
        assert_eq!(reply.key.as_deref(), Some("sk-123"));
    }

    #[test]
    fn reply_tolerates_missing_key_field() {
        let reply = parse_reply(r#"{"provider":"openai","status":"success"}"#).unwrap();
        assert!(reply.key.is_none());
    }

    #[test]
    fn malformed_reply_is_an_error() {
        let err = parse_reply("not json at all").unwrap_err();
        assert!(matches!(err, SecretError::MalformedReply { .. }));
    }

    #[tokio::test]
    async fn missing_executable_is_a_spawn_error() {
        let helper = HelperProcess::new("/nonexistent/api_manager");
        let err = helper.fetch("openai").await.unwrap_err();
        assert!(matches!(err, SecretError::HelperSpawn { .. }));
    }
}
