//! Security auditor
//!
//! Issues one structured-analysis exchange and normalizes the untrusted,
//! free-form response into the closed `SecurityIssue` schema. Audit is
//! advisory: every internal failure degrades to an empty issue list so a
//! broken audit can never fail the migration that produced the code.

use crate::prompts;
use crate::types::{ComplianceStandard, SecurityIssue, Severity};
use lcm_gateway::{ChatMessage, ModelGateway};
use serde::Deserialize;
use uuid::Uuid;

/// Issue object as the model reports it, before normalization
///
/// Every field is optional; the normalizer fills the gaps.
#[derive(Debug, Deserialize)]
struct RawIssue {
    #[serde(default)]
    risk_level: String,
    #[serde(default)]
    issue_title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    flagged_code: String,
    #[serde(default)]
    recommended_code: String,
    #[serde(default)]
    suggested_fix: String,
    #[serde(default)]
    compliance_category: String,
}

/// Model-backed security auditor
#[derive(Clone)]
pub struct SecurityAuditor {
    gateway: ModelGateway,
    model: String,
}

impl SecurityAuditor {
    /// Create an auditor issuing exchanges through `gateway`
    #[must_use]
    pub fn new(gateway: ModelGateway, model: impl Into<String>) -> Self {
        Self {
            gateway,
            model: model.into(),
        }
    }

    /// Audit `code`, attributing issues to `filename`
    ///
    /// Infallible by contract: model failures and unparsable responses
    /// are logged and yield an empty list.
    pub async fn audit(&self, code: &str, filename: &str) -> Vec<SecurityIssue> {
        let messages = [
            ChatMessage::system(prompts::AUDIT_SYSTEM),
            ChatMessage::user(prompts::audit_request(code)),
        ];

        let raw = match self
            .gateway
            .complete_with_retry(&self.model, &messages, 0.0)
            .await
        {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(%err, "security audit request failed, returning no issues");
                return Vec::new();
            }
        };

        let issues = parse_issues(&raw, code, filename);
        tracing::info!(count = issues.len(), "security audit complete");
        issues
    }
}

/// Normalize a raw audit response into the closed issue schema
fn parse_issues(raw: &str, code: &str, filename: &str) -> Vec<SecurityIssue> {
    let payload = extract_json_payload(raw);
    let raw_issues: Vec<RawIssue> = match serde_json::from_str(&payload) {
        Ok(issues) => issues,
        Err(err) => {
            tracing::warn!(%err, "audit response was not a json issue array");
            return Vec::new();
        }
    };

    raw_issues
        .into_iter()
        .map(|issue| SecurityIssue {
            id: Uuid::new_v4(),
            file: filename.to_string(),
            line: locate_line(code, &issue.flagged_code),
            severity: Severity::from_raw(&issue.risk_level),
            standard: ComplianceStandard::from_raw(&issue.compliance_category),
            title: if issue.issue_title.is_empty() {
                "Security Issue".to_string()
            } else {
                issue.issue_title
            },
            description: issue.description,
            recommendation: issue.suggested_fix,
            flagged_code: issue.flagged_code,
            recommended_code: issue.recommended_code,
        })
        .collect()
}

/// Pull the JSON body out of a possibly-fenced response
fn extract_json_payload(raw: &str) -> String {
    if let Some((_, rest)) = raw.split_once("```json") {
        return rest.split("```").next().unwrap_or("").trim().to_string();
    }
    if raw.contains("```") {
        return raw.split("```").nth(1).unwrap_or("").trim().to_string();
    }
    raw.trim().to_string()
}

/// Best-effort 1-based line of the first line containing the snippet
fn locate_line(code: &str, flagged: &str) -> usize {
    let needle = flagged.trim();
    if needle.is_empty() {
        return 1;
    }
    code.lines()
        .position(|line| line.contains(needle))
        .map_or(1, |idx| idx + 1)
}
