//! LCM Server - JSON boundary around the migration pipeline
//!
//! Routing, CORS, and marshaling only; every endpoint is a thin wrapper
//! over [`lcm_pipeline::Migrator`], the secret provider, or the GitHub
//! commit client. Pipeline errors map onto status codes by blame:
//! user-correctable input -> 400, model-service trouble -> 502,
//! everything else -> 500.

#![warn(unreachable_pub)]

pub mod github;

use github::CommitFile;
use lcm_pipeline::{MigrationError, MigrationRequest, Migrator};
use lcm_secrets::SecretProvider;
use serde::Deserialize;
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

/// Fallback filename when the request does not carry one
const DEFAULT_FILENAME: &str = "code.py";

/// Secret-provider name for the GitHub token
const GITHUB_PROVIDER: &str = "GitHub";

/// Shared, read-only application state
pub struct AppState {
    /// The migration pipeline
    pub migrator: Migrator,
    /// Credential lookup
    pub secrets: Arc<dyn SecretProvider>,
    /// Client for the GitHub REST calls
    pub http: reqwest::Client,
    /// Models advertised by `/api/status`
    pub available_models: Vec<String>,
}

impl AppState {
    /// Assemble state around a migrator and a secret provider
    #[must_use]
    pub fn new(migrator: Migrator, secrets: Arc<dyn SecretProvider>) -> Self {
        Self {
            migrator,
            secrets,
            http: reqwest::Client::new(),
            available_models: vec![
                "GPT-4.1".to_string(),
                "GPT-4o".to_string(),
                "GPT-3.5-turbo".to_string(),
            ],
        }
    }
}

#[derive(Debug, Deserialize)]
struct MigrateBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    filename: Option<String>,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SaveKeyBody {
    provider: String,
    api: String,
}

#[derive(Debug, Deserialize)]
struct SaveTokenBody {
    provider: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct ProviderBody {
    provider: String,
}

#[derive(Debug, Deserialize)]
struct GithubCommitBody {
    #[serde(default)]
    repo: String,
    #[serde(default)]
    files: Vec<CommitFile>,
    #[serde(default = "default_commit_message")]
    message: String,
}

fn default_commit_message() -> String {
    "Batch commit of converted files".to_string()
}

type JsonReply = warp::reply::WithStatus<warp::reply::Json>;

fn reply_json(status: StatusCode, value: &serde_json::Value) -> JsonReply {
    warp::reply::with_status(warp::reply::json(value), status)
}

fn with_state(
    state: Arc<AppState>,
) -> impl Filter<Extract = (Arc<AppState>,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

/// Build the full route tree with CORS for the given origins
pub fn routes(
    state: Arc<AppState>,
    origins: &[String],
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let cors = origins
        .iter()
        .fold(warp::cors(), |cors, origin| cors.allow_origin(origin.as_str()))
        .allow_methods(vec!["GET", "POST", "OPTIONS"])
        .allow_headers(vec!["content-type"])
        .allow_credentials(true);

    let migrate = warp::path("migrate")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and(with_state(state.clone()))
        .and_then(handle_migrate);

    let health = warp::path!("api" / "health")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(handle_health);

    let status = warp::path!("api" / "status")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(handle_status);

    let save = warp::path!("api" / "save")
        .and(warp::post())
        .and(warp::body::json())
        .and(with_state(state.clone()))
        .and_then(handle_save);

    let delete = warp::path!("api" / "delete")
        .and(warp::post())
        .and(warp::body::json())
        .and(with_state(state.clone()))
        .and_then(handle_delete);

    let git_save = warp::path!("api" / "gitsave")
        .and(warp::post())
        .and(warp::body::json())
        .and(with_state(state.clone()))
        .and_then(handle_git_save);

    let git_delete = warp::path!("api" / "gitdelete")
        .and(warp::post())
        .and(warp::body::json())
        .and(with_state(state.clone()))
        .and_then(handle_delete);

    let github_commit = warp::path!("github" / "commit")
        .and(warp::post())
        .and(warp::body::json())
        .and(with_state(state))
        .and_then(handle_github_commit);

    migrate
        .or(health)
        .or(status)
        .or(save)
        .or(delete)
        .or(git_save)
        .or(git_delete)
        .or(github_commit)
        .with(cors)
}

async fn handle_migrate(
    body: MigrateBody,
    state: Arc<AppState>,
) -> Result<JsonReply, Infallible> {
    let mut request = MigrationRequest::new(
        body.code,
        body.filename.unwrap_or_else(|| DEFAULT_FILENAME.to_string()),
    );
    if let Some(model) = body.model {
        request = request.with_model(model);
    }

    match state.migrator.migrate(request).await {
        Ok(result) => Ok(reply_json(
            StatusCode::OK,
            &json!({
                "status": "success",
                "result": result.modernized_code,
                "explain": result.explanation,
                "security_issues": result.issues,
            }),
        )),
        Err(err) => {
            tracing::error!(%err, "migration failed");
            let status = if err.is_user_error() {
                StatusCode::BAD_REQUEST
            } else if matches!(err, MigrationError::Model(_)) {
                StatusCode::BAD_GATEWAY
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            Ok(reply_json(
                status,
                &json!({"status": "error", "message": err.to_string()}),
            ))
        }
    }
}

async fn handle_health(state: Arc<AppState>) -> Result<JsonReply, Infallible> {
    let mut health = json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "server": "Legacy Code Modernizer API",
        "version": VERSION,
    });

    match state.secrets.fetch(lcm_gateway::KEY_PROVIDER).await {
        Ok(key) if !key.is_empty() => {
            health["openai_configured"] = json!(true);
        }
        Ok(_) => {
            health["openai_configured"] = json!(false);
            health["warning"] = json!("OpenAI API key not configured");
        }
        Err(err) => {
            health["openai_configured"] = json!(false);
            health["warning"] = json!(format!("OpenAI configuration error: {err}"));
        }
    }

    Ok(reply_json(StatusCode::OK, &health))
}

async fn handle_status(state: Arc<AppState>) -> Result<JsonReply, Infallible> {
    let api_key_configured = matches!(
        state.secrets.fetch(lcm_gateway::KEY_PROVIDER).await,
        Ok(key) if !key.is_empty()
    );
    let default_model = state.migrator.config().default_model.clone();

    Ok(reply_json(
        StatusCode::OK,
        &json!({
            "connected": true,
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "models": {
                "available": state.available_models,
                "current": default_model,
                "default": default_model,
            },
            "features": {
                "code_conversion": true,
                "security_scanning": true,
                "github_integration": true,
            },
            "api_key_configured": api_key_configured,
        }),
    ))
}

async fn handle_save(body: SaveKeyBody, state: Arc<AppState>) -> Result<JsonReply, Infallible> {
    Ok(secret_op_reply(
        state.secrets.store(&body.provider, &body.api).await,
    ))
}

async fn handle_git_save(
    body: SaveTokenBody,
    state: Arc<AppState>,
) -> Result<JsonReply, Infallible> {
    Ok(secret_op_reply(
        state.secrets.store(&body.provider, &body.token).await,
    ))
}

async fn handle_delete(body: ProviderBody, state: Arc<AppState>) -> Result<JsonReply, Infallible> {
    Ok(secret_op_reply(state.secrets.delete(&body.provider).await))
}

fn secret_op_reply(outcome: Result<(), lcm_secrets::SecretError>) -> JsonReply {
    match outcome {
        Ok(()) => reply_json(StatusCode::OK, &json!({"status": "success"})),
        Err(err) => {
            tracing::error!(%err, "secret operation failed");
            reply_json(
                StatusCode::INTERNAL_SERVER_ERROR,
                &json!({"status": "error", "message": err.to_string()}),
            )
        }
    }
}

async fn handle_github_commit(
    body: GithubCommitBody,
    state: Arc<AppState>,
) -> Result<JsonReply, Infallible> {
    let token = state
        .secrets
        .fetch(GITHUB_PROVIDER)
        .await
        .unwrap_or_default();

    if token.is_empty() || body.repo.is_empty() || body.files.is_empty() {
        return Ok(reply_json(
            StatusCode::BAD_REQUEST,
            &json!({"error": "Missing or invalid required fields"}),
        ));
    }

    let results = github::commit_files(
        &state.http,
        &token,
        &body.repo,
        &body.files,
        &body.message,
    )
    .await;

    Ok(reply_json(
        StatusCode::OK,
        &json!({"status": "done", "results": results}),
    ))
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
