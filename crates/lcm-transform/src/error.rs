//! Error types for the syntax transformer
//!
//! Failure here is always fatal for the surrounding migration: the
//! transformer never emits partially-rewritten text.

/// Errors raised while rewriting legacy syntax
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    /// Input was empty or whitespace-only
    #[error("input code is empty")]
    Empty,

    /// Source does not parse under the legacy grammar
    #[error("legacy syntax error: {0}")]
    Parse(String),

    /// Rewrite engine produced no valid modern-grammar result
    #[error("rewrite produced invalid modern syntax: {0}")]
    Rewrite(String),

    /// Grammar could not be loaded into the parser
    #[error("grammar initialization failed: {0}")]
    Grammar(String),

    /// Scratch-file IO failed
    #[error("scratch io error: {0}")]
    Scratch(#[from] std::io::Error),
}

impl TransformError {
    /// Check if the error is attributable to the caller's input
    #[inline]
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::Empty | Self::Parse(_))
    }
}
