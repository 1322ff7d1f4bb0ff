//! Migration orchestrator
//!
//! Sequences the pipeline for one request: validate, syntactic rewrite,
//! modernization exchange, explanation exchange, security audit. Strictly
//! sequential; every step is fatal except the audit. All state is request-
//! local, so concurrent migrations are independent.

use crate::audit::SecurityAuditor;
use crate::error::MigrationError;
use crate::prompts;
use crate::types::{MigrationRequest, MigrationResult};
use lcm_gateway::{sanitize, ChatMessage, ModelGateway};
use lcm_transform::Transformer;

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Model used when the request does not name one (also the audit model)
    pub default_model: String,
    /// Temperature for the explanation exchange; prose tolerates more
    /// variation than code
    pub explanation_temperature: f32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            default_model: "gpt-4.1".to_string(),
            explanation_temperature: 0.2,
        }
    }
}

impl PipelineConfig {
    /// Create the default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With a different default model
    #[inline]
    #[must_use]
    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }
}

/// The migration orchestrator
///
/// Owns its collaborators explicitly; nothing here is process-global, so
/// tests wire in a scripted backend through the gateway.
#[derive(Clone)]
pub struct Migrator {
    transformer: Transformer,
    gateway: ModelGateway,
    auditor: SecurityAuditor,
    config: PipelineConfig,
}

impl Migrator {
    /// Create a migrator with the default configuration
    #[must_use]
    pub fn new(gateway: ModelGateway) -> Self {
        Self::with_config(gateway, PipelineConfig::default())
    }

    /// Create a migrator with an explicit configuration
    #[must_use]
    pub fn with_config(gateway: ModelGateway, config: PipelineConfig) -> Self {
        let auditor = SecurityAuditor::new(gateway.clone(), config.default_model.clone());
        Self {
            transformer: Transformer::new(),
            gateway,
            auditor,
            config,
        }
    }

    /// Current configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the full pipeline for one request
    ///
    /// Fails without partial results on validation, transform, or model
    /// errors; a degraded audit yields an empty issue list instead.
    pub async fn migrate(
        &self,
        request: MigrationRequest,
    ) -> Result<MigrationResult, MigrationError> {
        validate(&request.source_text)?;
        let model = request
            .model
            .as_deref()
            .unwrap_or(&self.config.default_model);
        tracing::info!(filename = %request.filename, model, "starting migration");

        // Scratch state for the rewrite lives inside the transformer call
        // and is released before any network traffic happens.
        let transformed = self.transformer.transform(&request.source_text)?;
        let rewritten = transformed.rewritten_text;

        let messages = [
            ChatMessage::system(prompts::MODERNIZE_SYSTEM),
            ChatMessage::user(prompts::modernization_request(&rewritten)),
        ];
        let raw = self.gateway.complete_with_retry(model, &messages, 0.0).await?;
        let modernized_code = sanitize(&raw);
        tracing::debug!(bytes = modernized_code.len(), "modernization exchange complete");

        self.gateway.pace().await;

        let messages = [
            ChatMessage::system(prompts::MODERNIZE_SYSTEM),
            ChatMessage::user(prompts::explanation_request(&rewritten, &modernized_code)),
        ];
        let explanation = self
            .gateway
            .complete_with_retry(model, &messages, self.config.explanation_temperature)
            .await?;

        self.gateway.pace().await;

        let issues = self.auditor.audit(&modernized_code, &request.filename).await;
        tracing::info!(issues = issues.len(), "migration complete");

        Ok(MigrationResult {
            modernized_code,
            explanation,
            issues,
        })
    }
}

/// Reject input before any external call is made
fn validate(source: &str) -> Result<(), MigrationError> {
    if source.trim().is_empty() {
        return Err(MigrationError::Validation("no code given".to_string()));
    }
    // NUL bytes would corrupt the scratch-file round trip
    if source.contains('\0') {
        return Err(MigrationError::Validation(
            "input contains NUL bytes".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_nul_input_fail_validation() {
        assert!(matches!(
            validate("   \n"),
            Err(MigrationError::Validation(_))
        ));
        assert!(matches!(
            validate("x = 1\0"),
            Err(MigrationError::Validation(_))
        ));
        assert!(validate("x = 1").is_ok());
    }
}
