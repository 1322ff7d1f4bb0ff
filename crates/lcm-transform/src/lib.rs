//! LCM Transform - deterministic legacy-syntax rewriter
//!
//! Converts Python 2 surface syntax into Python 3 using exact grammar
//! spans from tree-sitter:
//! - print statements (including `>>stream` and trailing-comma forms)
//! - the `<>` comparison operator
//! - comma-form except clauses
//! - renamed builtins (`xrange`, `raw_input`, `unicode`, `basestring`)
//!
//! The transformer fails closed: input that does not parse under the
//! legacy grammar, or output that does not parse under the modern one,
//! raises instead of returning partially-rewritten text.
//!
//! # Example
//!
//! ```rust
//! use lcm_transform::Transformer;
//!
//! let result = Transformer::new().transform("print \"hi\"").unwrap();
//! assert_eq!(result.rewritten_text, "print(\"hi\")\n");
//! ```

#![warn(unreachable_pub)]

mod error;
mod rewrite;

pub use error::TransformError;

use std::fs;

/// Output of one syntactic rewrite
///
/// Invariant: `rewritten_text` parses under the modern grammar whenever
/// the input parsed under the legacy grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformResult {
    /// The fully-rewritten source text
    pub rewritten_text: String,
}

/// The syntactic transformer
///
/// Stateless; each call owns a private scratch directory that is removed
/// on every exit path, so concurrent calls never collide.
#[derive(Debug, Clone, Copy, Default)]
pub struct Transformer;

impl Transformer {
    /// Create a new transformer
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Rewrite legacy source text into modern syntax
    ///
    /// A trailing newline is appended before parsing when missing (the
    /// grammar tool requires one). The text is staged through files in a
    /// per-call temporary directory, mirroring the rewrite engine's
    /// file-oriented contract.
    pub fn transform(&self, source: &str) -> Result<TransformResult, TransformError> {
        if source.trim().is_empty() {
            return Err(TransformError::Empty);
        }

        let mut text = source.to_string();
        if !text.ends_with('\n') {
            text.push('\n');
        }

        let scratch = tempfile::tempdir()?;
        let src_path = scratch.path().join("legacy.py");
        let dst_path = scratch.path().join("modern.py");

        fs::write(&src_path, &text)?;
        let staged = fs::read_to_string(&src_path)?;

        let rewritten = rewrite::rewrite_source(&staged)?;
        tracing::debug!(
            bytes_in = staged.len(),
            bytes_out = rewritten.len(),
            "syntax rewrite complete"
        );

        fs::write(&dst_path, &rewritten)?;
        let rewritten_text = fs::read_to_string(&dst_path)?;

        Ok(TransformResult { rewritten_text })
    }
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_rejected() {
        let err = Transformer::new().transform("   \n  ").unwrap_err();
        assert!(matches!(err, TransformError::Empty));
    }

    #[test]
    fn missing_trailing_newline_is_appended() {
        let result = Transformer::new().transform("x = 1").unwrap();
        assert_eq!(result.rewritten_text, "x = 1\n");
    }

    #[test]
    fn scratch_state_is_released_on_failure() {
        // A parse failure must not leave scratch files behind; TempDir is
        // scoped to the call, so the error path exercises the cleanup.
        let err = Transformer::new().transform("def broken(:").unwrap_err();
        assert!(matches!(err, TransformError::Parse(_)));
    }
}
