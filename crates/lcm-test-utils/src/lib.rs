//! Shared test doubles for the LCM workspace
//!
//! `ScriptedBackend` stands in for the model service: it replays a fixed
//! sequence of responses and records every exchange so tests can assert
//! on call counts, models, and effective temperatures.

#![warn(unreachable_pub)]

use lcm_gateway::{ChatBackend, ChatMessage, GatewayError, Role};
use parking_lot::Mutex;
use std::collections::VecDeque;

/// One recorded exchange against the scripted backend
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// Model identifier the caller requested
    pub model: String,
    /// Temperature as it arrived at the backend (post-policy)
    pub temperature: f32,
    /// Content of the user message, when present
    pub user_prompt: String,
}

/// Chat backend replaying a scripted sequence of results
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    script: Mutex<VecDeque<Result<String, GatewayError>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedBackend {
    /// Script a sequence of successful responses
    #[must_use]
    pub fn new(responses: &[&str]) -> Self {
        Self::from_results(responses.iter().map(|r| Ok((*r).to_string())).collect())
    }

    /// Script an arbitrary sequence of results
    #[must_use]
    pub fn from_results(results: Vec<Result<String, GatewayError>>) -> Self {
        Self {
            script: Mutex::new(results.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Number of exchanges issued so far
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// All recorded exchanges, in order
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }
}

#[async_trait::async_trait]
impl ChatBackend for ScriptedBackend {
    async fn complete(
        &self,
        model: &str,
        messages: &[ChatMessage],
        temperature: f32,
    ) -> Result<String, GatewayError> {
        let user_prompt = messages
            .iter()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.clone())
            .unwrap_or_default();
        self.calls.lock().push(RecordedCall {
            model: model.to_string(),
            temperature,
            user_prompt,
        });

        self.script
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(GatewayError::Request("script exhausted".to_string())))
    }
}
