//! Temperature policy and retry/backoff around a chat backend

use crate::client::ChatBackend;
use crate::error::GatewayError;
use crate::message::ChatMessage;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use std::time::Duration;

/// Retry/backoff configuration
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts per exchange, including the first
    pub max_attempts: u32,
    /// Backoff when the throttling signal carries no wait hint
    pub default_wait: Duration,
    /// Delay inserted between dependent calls in a multi-step exchange
    pub pacing: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            default_wait: Duration::from_secs(20),
            pacing: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Create the default policy
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With a different attempt cap
    #[inline]
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// With a different fallback wait
    #[inline]
    #[must_use]
    pub fn with_default_wait(mut self, default_wait: Duration) -> Self {
        self.default_wait = default_wait;
        self
    }

    /// With a different pacing delay
    #[inline]
    #[must_use]
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }
}

/// `"Please try again in 20s"` / `"retry after 5 seconds"` style hints.
/// Error phrasing is not stable; anything unmatched falls back to the
/// policy default.
static WAIT_HINT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:try again in|retry after)\s*([0-9]+(?:\.[0-9]+)?)\s*s")
        .expect("wait-hint pattern is valid")
});

/// Extract a server-suggested wait duration from a throttling message
#[must_use]
pub fn parse_wait_hint(message: &str) -> Option<Duration> {
    let captures = WAIT_HINT.captures(message)?;
    let seconds: f64 = captures.get(1)?.as_str().parse().ok()?;
    Some(Duration::from_secs_f64(seconds))
}

/// Check if a model identifier belongs to the reasoning tier
///
/// Reasoning-tier models only accept the maximum temperature.
#[must_use]
pub fn is_reasoning_tier(model: &str) -> bool {
    let mut chars = model.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some('o'), Some(second)) if second.is_ascii_digit()
    )
}

/// Select the temperature actually sent for a model
///
/// Locked models ignore the caller-supplied value.
#[must_use]
pub fn effective_temperature(model: &str, requested: f32) -> f32 {
    if is_reasoning_tier(model) {
        1.0
    } else {
        requested
    }
}

/// Gateway over a chat backend: temperature policy plus retry/backoff
#[derive(Clone)]
pub struct ModelGateway {
    backend: Arc<dyn ChatBackend>,
    policy: RetryPolicy,
}

impl ModelGateway {
    /// Wrap a backend with the default policy
    #[must_use]
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self {
            backend,
            policy: RetryPolicy::default(),
        }
    }

    /// Replace the retry policy
    #[must_use]
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Current retry policy
    #[inline]
    #[must_use]
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Issue one exchange, applying the temperature policy
    pub async fn complete(
        &self,
        model: &str,
        messages: &[ChatMessage],
        temperature: f32,
    ) -> Result<String, GatewayError> {
        let temperature = effective_temperature(model, temperature);
        self.backend.complete(model, messages, temperature).await
    }

    /// Issue one exchange, backing off and retrying on throttling signals
    ///
    /// Non-throttling errors propagate immediately; persistent throttling
    /// exhausts the attempt cap and surfaces as `RetriesExhausted`.
    pub async fn complete_with_retry(
        &self,
        model: &str,
        messages: &[ChatMessage],
        temperature: f32,
    ) -> Result<String, GatewayError> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.complete(model, messages, temperature).await {
                Ok(text) => return Ok(text),
                Err(GatewayError::Throttled(message)) => {
                    if attempt >= max_attempts {
                        return Err(GatewayError::RetriesExhausted {
                            attempts: max_attempts,
                            last: message,
                        });
                    }
                    let wait = parse_wait_hint(&message).unwrap_or(self.policy.default_wait);
                    tracing::warn!(
                        attempt,
                        wait_secs = wait.as_secs_f64(),
                        "model service throttled, backing off"
                    );
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
                Err(other) => return Err(other),
            }
        }
    }

    /// Sleep the pacing delay between dependent calls
    pub async fn pace(&self) {
        tokio::time::sleep(self.policy.pacing).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::time::Instant;

    /// Backend that replays a scripted sequence of results
    struct Scripted {
        script: Mutex<Vec<Result<String, GatewayError>>>,
        calls: Mutex<u32>,
    }

    impl Scripted {
        fn new(script: Vec<Result<String, GatewayError>>) -> Self {
            Self {
                script: Mutex::new(script),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> u32 {
            *self.calls.lock()
        }
    }

    #[async_trait::async_trait]
    impl ChatBackend for Scripted {
        async fn complete(
            &self,
            _model: &str,
            _messages: &[ChatMessage],
            _temperature: f32,
        ) -> Result<String, GatewayError> {
            *self.calls.lock() += 1;
            self.script.lock().remove(0)
        }
    }

    fn quick_policy() -> RetryPolicy {
        RetryPolicy::new().with_default_wait(Duration::from_millis(20))
    }

    #[test]
    fn wait_hint_parses_seconds() {
        assert_eq!(
            parse_wait_hint("Rate limit reached. Please try again in 20s."),
            Some(Duration::from_secs(20))
        );
        assert_eq!(
            parse_wait_hint("throttled, retry after 5 seconds"),
            Some(Duration::from_secs(5))
        );
        assert_eq!(
            parse_wait_hint("Please try again in 1.5s"),
            Some(Duration::from_secs_f64(1.5))
        );
        assert_eq!(parse_wait_hint("something else entirely"), None);
    }

    #[test]
    fn reasoning_tier_detection() {
        assert!(is_reasoning_tier("o4-mini"));
        assert!(is_reasoning_tier("o1"));
        assert!(!is_reasoning_tier("gpt-4.1"));
        assert!(!is_reasoning_tier("openai-custom"));
    }

    #[test]
    fn locked_models_ignore_caller_temperature() {
        assert_eq!(effective_temperature("o4-mini", 0.0), 1.0);
        assert_eq!(effective_temperature("gpt-4.1", 0.2), 0.2);
    }

    #[tokio::test]
    async fn throttle_then_success_retries_once() {
        let backend = Arc::new(Scripted::new(vec![
            Err(GatewayError::Throttled(
                "Please try again in 0.02s".to_string(),
            )),
            Ok("recovered".to_string()),
        ]));
        let gateway = ModelGateway::new(backend.clone()).with_policy(quick_policy());

        let started = Instant::now();
        let out = gateway
            .complete_with_retry("gpt-4.1", &[ChatMessage::user("hi")], 0.0)
            .await
            .unwrap();

        assert_eq!(out, "recovered");
        assert_eq!(backend.calls(), 2);
        // One backoff of the parsed 0.02s hint
        assert!(started.elapsed() >= Duration::from_millis(20));
    }

    #[tokio::test]
    async fn persistent_throttling_exhausts_the_cap() {
        let throttle = || Err(GatewayError::Throttled("try again in 0.01s".to_string()));
        let backend = Arc::new(Scripted::new(vec![throttle(), throttle(), throttle()]));
        let gateway = ModelGateway::new(backend.clone()).with_policy(quick_policy());

        let err = gateway
            .complete_with_retry("gpt-4.1", &[ChatMessage::user("hi")], 0.0)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            GatewayError::RetriesExhausted { attempts: 3, .. }
        ));
        assert_eq!(backend.calls(), 3);
    }

    #[tokio::test]
    async fn non_throttling_errors_are_not_retried() {
        let backend = Arc::new(Scripted::new(vec![Err(GatewayError::Request(
            "500: boom".to_string(),
        ))]));
        let gateway = ModelGateway::new(backend.clone()).with_policy(quick_policy());

        let err = gateway
            .complete_with_retry("gpt-4.1", &[ChatMessage::user("hi")], 0.0)
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::Request(_)));
        assert_eq!(backend.calls(), 1);
    }
}
