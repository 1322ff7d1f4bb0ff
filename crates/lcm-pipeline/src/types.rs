//! Data model for one migration run
//!
//! Every type here is created fresh per request and never cached; stages
//! hand each other new artifacts instead of mutating earlier ones.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One inbound migration call
///
/// Immutable; owned by the orchestrator for the call's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationRequest {
    /// Legacy source text to migrate
    pub source_text: String,
    /// Filename reported back on security issues
    pub filename: String,
    /// Model identifier override; `None` uses the pipeline default
    pub model: Option<String>,
}

impl MigrationRequest {
    /// Create a request with the default model
    #[inline]
    #[must_use]
    pub fn new(source_text: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            source_text: source_text.into(),
            filename: filename.into(),
            model: None,
        }
    }

    /// With an explicit model identifier
    #[inline]
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// Issue severity, closed set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational / hardening
    Low,
    /// Should be fixed
    Medium,
    /// Exploitable or policy-breaking
    High,
}

impl Severity {
    /// Normalize the model's free-form risk vocabulary
    ///
    /// Unrecognized values fall back to `Low`.
    #[must_use]
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "high" => Self::High,
            "medium" => Self::Medium,
            "low" => Self::Low,
            _ => Self::Low,
        }
    }
}

/// Compliance category, closed set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComplianceStandard {
    /// Health-data handling
    #[serde(rename = "HIPAA")]
    Hipaa,
    /// Information-security management controls
    #[serde(rename = "ISO27001")]
    Iso27001,
    /// Everything else
    General,
}

impl ComplianceStandard {
    /// Normalize the model's free-form category vocabulary
    ///
    /// Whitespace and casing variants (`"ISO 27001"`, `"iso27001"`)
    /// collapse onto the canonical value; unrecognized categories fall
    /// back to `General`.
    #[must_use]
    pub fn from_raw(raw: &str) -> Self {
        let canonical: String = raw
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_uppercase();
        match canonical.as_str() {
            "HIPAA" => Self::Hipaa,
            "ISO27001" => Self::Iso27001,
            "GENERAL" | "GENERALSECURITYISSUE" => Self::General,
            _ => Self::General,
        }
    }
}

/// One normalized security finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityIssue {
    /// Unique per call, never derived from content
    pub id: Uuid,
    /// Filename from the request
    pub file: String,
    /// Best-effort 1-based line of the flagged snippet
    pub line: usize,
    /// Normalized severity
    pub severity: Severity,
    /// Normalized compliance category
    pub standard: ComplianceStandard,
    /// 2-4 word issue title
    pub title: String,
    /// One-sentence description
    pub description: String,
    /// Suggested fix
    pub recommendation: String,
    /// Snippet that triggered the issue
    pub flagged_code: String,
    /// Corrected version of the snippet
    pub recommended_code: String,
}

/// Terminal artifact of one pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationResult {
    /// Modernized source text
    pub modernized_code: String,
    /// Prose explanation of the changes
    pub explanation: String,
    /// Security findings, in the auditor's order
    pub issues: Vec<SecurityIssue>,
}
