//! GitHub repository-commit integration
//!
//! A sequence of independent REST calls against the contents API: read
//! the existing blob SHA for each file, then create-or-update it on the
//! repository's default branch. Per-file failures are collected, not
//! propagated - one bad path must not abort the batch.

use base64::{engine::general_purpose, Engine};
use serde::{Deserialize, Serialize};
use serde_json::json;

const GITHUB_API: &str = "https://api.github.com";
const USER_AGENT: &str = "lcm-server";

/// One file in a commit batch
#[derive(Debug, Clone, Deserialize)]
pub struct CommitFile {
    /// Repository-relative path
    pub path: String,
    /// Full file content
    pub content: String,
}

/// Outcome for one file in the batch
#[derive(Debug, Clone, Serialize)]
pub struct FileCommitResult {
    /// Repository-relative path
    pub path: String,
    /// `"success"`, `"skipped"`, or `"error"`
    pub status: String,
    /// Failure detail, when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

fn github_request(http: &reqwest::Client, method: reqwest::Method, url: &str, token: &str) -> reqwest::RequestBuilder {
    http.request(method, url)
        .header(reqwest::header::AUTHORIZATION, format!("token {token}"))
        .header(reqwest::header::ACCEPT, "application/vnd.github+json")
        .header(reqwest::header::USER_AGENT, USER_AGENT)
}

/// Resolve the repository's default branch, falling back to `main`
pub async fn default_branch(http: &reqwest::Client, token: &str, repo: &str) -> String {
    let url = format!("{GITHUB_API}/repos/{repo}");
    let reply = github_request(http, reqwest::Method::GET, &url, token)
        .send()
        .await;
    match reply {
        Ok(response) if response.status().is_success() => response
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|v| v.get("default_branch")?.as_str().map(str::to_string))
            .unwrap_or_else(|| "main".to_string()),
        Ok(_) | Err(_) => "main".to_string(),
    }
}

/// Fetch the blob SHA of an existing file, if any
async fn existing_sha(
    http: &reqwest::Client,
    token: &str,
    repo: &str,
    path: &str,
) -> Option<String> {
    let url = format!("{GITHUB_API}/repos/{repo}/contents/{path}");
    let response = github_request(http, reqwest::Method::GET, &url, token)
        .send()
        .await
        .ok()?;
    if !response.status().is_success() {
        return None;
    }
    let body: serde_json::Value = response.json().await.ok()?;
    body.get("sha")?.as_str().map(str::to_string)
}

/// Commit a batch of files, one contents-API call per file
pub async fn commit_files(
    http: &reqwest::Client,
    token: &str,
    repo: &str,
    files: &[CommitFile],
    message: &str,
) -> Vec<FileCommitResult> {
    let branch = default_branch(http, token, repo).await;
    let mut results = Vec::with_capacity(files.len());

    for file in files {
        if file.path.is_empty() {
            results.push(FileCommitResult {
                path: file.path.clone(),
                status: "skipped".to_string(),
                details: Some("missing path".to_string()),
            });
            continue;
        }

        let sha = existing_sha(http, token, repo, &file.path).await;
        let mut payload = json!({
            "message": message,
            "content": general_purpose::STANDARD.encode(file.content.as_bytes()),
            "branch": branch,
        });
        if let Some(sha) = sha {
            payload["sha"] = json!(sha);
        }

        let url = format!("{GITHUB_API}/repos/{repo}/contents/{}", file.path);
        let outcome = github_request(http, reqwest::Method::PUT, &url, token)
            .json(&payload)
            .send()
            .await;

        let result = match outcome {
            Ok(response) if matches!(response.status().as_u16(), 200 | 201) => FileCommitResult {
                path: file.path.clone(),
                status: "success".to_string(),
                details: None,
            },
            Ok(response) => {
                let detail = response.text().await.unwrap_or_default();
                FileCommitResult {
                    path: file.path.clone(),
                    status: "error".to_string(),
                    details: Some(detail),
                }
            }
            Err(err) => FileCommitResult {
                path: file.path.clone(),
                status: "error".to_string(),
                details: Some(err.to_string()),
            },
        };
        tracing::debug!(path = %file.path, status = %result.status, "github commit step");
        results.push(result);
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_result_omits_empty_details() {
        let result = FileCommitResult {
            path: "a.py".to_string(),
            status: "success".to_string(),
            details: None,
        };
        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(json, r#"{"path":"a.py","status":"success"}"#);
    }

    #[test]
    fn content_is_base64_encoded() {
        let encoded = general_purpose::STANDARD.encode("print(1)\n".as_bytes());
        assert_eq!(encoded, "cHJpbnQoMSkK");
    }
}
