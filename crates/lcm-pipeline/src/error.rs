//! Error taxonomy for the migration pipeline
//!
//! Any stage failure aborts the remaining steps for the request; there is
//! no partial `MigrationResult`. The security audit is the sole exception
//! and degrades inside the auditor itself.

use lcm_gateway::GatewayError;
use lcm_transform::TransformError;

/// Pipeline failure, wrapping the failing stage
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// Input rejected before any external call
    #[error("validation failed: {0}")]
    Validation(String),

    /// Legacy grammar rewrite failed
    #[error("syntax transform failed: {0}")]
    Transform(#[from] TransformError),

    /// Model service failed, including retry exhaustion
    #[error("model request failed: {0}")]
    Model(#[from] GatewayError),
}

impl MigrationError {
    /// Check if the failure is attributable to the caller's input
    /// (4xx-equivalent) rather than to this service or its collaborators
    #[inline]
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        match self {
            Self::Validation(_) => true,
            Self::Transform(err) => err.is_user_error(),
            Self::Model(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migration_error_display_carries_context() {
        let err = MigrationError::Validation("no code given".to_string());
        assert!(err.to_string().contains("validation failed"));

        let err = MigrationError::from(TransformError::Empty);
        assert!(err.to_string().contains("syntax transform failed"));
    }

    #[test]
    fn user_error_classification() {
        assert!(MigrationError::Validation("empty".to_string()).is_user_error());
        assert!(MigrationError::from(TransformError::Parse("x".to_string())).is_user_error());
        assert!(!MigrationError::from(TransformError::Rewrite("x".to_string())).is_user_error());
        assert!(!MigrationError::from(GatewayError::Request("x".to_string())).is_user_error());
    }
}
