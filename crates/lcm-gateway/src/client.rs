//! Chat-completions client
//!
//! `ChatBackend` is the seam between the pipeline and the network: the
//! production implementation posts to the completions endpoint, test
//! doubles script responses. The API key is fetched through the secret
//! provider at call time, so key rotation needs no process restart.

use crate::error::GatewayError;
use crate::message::ChatMessage;
use lcm_secrets::SecretProvider;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Default completions endpoint base
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Secret-provider name for the model-service key
pub const KEY_PROVIDER: &str = "openai";

/// One prompt+response exchange against a completions-style service
#[async_trait::async_trait]
pub trait ChatBackend: Send + Sync {
    /// Issue a single exchange and return the raw response text
    async fn complete(
        &self,
        model: &str,
        messages: &[ChatMessage],
        temperature: f32,
    ) -> Result<String, GatewayError>;
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct CompletionReply {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Production backend for the OpenAI-style completions API
pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    secrets: Arc<dyn SecretProvider>,
}

impl OpenAiClient {
    /// Create a client that looks up its key through `secrets`
    #[must_use]
    pub fn new(secrets: Arc<dyn SecretProvider>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            secrets,
        }
    }

    /// Point the client at a different endpoint base
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn api_key(&self) -> Result<String, GatewayError> {
        let key = self.secrets.fetch(KEY_PROVIDER).await?;
        if key.is_empty() {
            return Err(GatewayError::Credentials(
                "no OpenAI API key configured".to_string(),
            ));
        }
        Ok(key)
    }
}

#[async_trait::async_trait]
impl ChatBackend for OpenAiClient {
    async fn complete(
        &self,
        model: &str,
        messages: &[ChatMessage],
        temperature: f32,
    ) -> Result<String, GatewayError> {
        let key = self.api_key().await?;
        let body = CompletionRequest {
            model,
            messages,
            temperature,
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::Request(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GatewayError::Request(e.to_string()))?;

        if status.as_u16() == 429 || text.to_lowercase().contains("rate limit") {
            return Err(GatewayError::Throttled(text));
        }
        if !status.is_success() {
            return Err(GatewayError::Request(format!("{status}: {text}")));
        }

        let reply: CompletionReply = serde_json::from_str(&text)
            .map_err(|e| GatewayError::Request(format!("malformed completion reply: {e}")))?;
        let choice = reply
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| GatewayError::Request("completion reply had no choices".to_string()))?;

        Ok(choice.message.content.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lcm_secrets::InMemoryProvider;

    #[test]
    fn completion_reply_parses() {
        let json = r#"{"choices":[{"message":{"role":"assistant","content":"x = 1"}}]}"#;
        let reply: CompletionReply = serde_json::from_str(json).unwrap();
        assert_eq!(
            reply.choices[0].message.content.as_deref(),
            Some("x = 1")
        );
    }

    #[tokio::test]
    async fn missing_key_is_a_credentials_error() {
        let client = OpenAiClient::new(Arc::new(InMemoryProvider::new()));
        let err = client
            .complete("gpt-4.1", &[ChatMessage::user("hi")], 0.0)
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Credentials(_)));
    }
}
