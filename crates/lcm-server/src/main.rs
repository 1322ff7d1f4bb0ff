//! Legacy Code Modernizer backend server

use lcm_gateway::{ModelGateway, OpenAiClient};
use lcm_pipeline::Migrator;
use lcm_secrets::{HelperProcess, SecretProvider};
use lcm_server::{routes, AppState};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let secrets: Arc<dyn SecretProvider> = Arc::new(HelperProcess::from_env());
    let gateway = ModelGateway::new(Arc::new(OpenAiClient::new(secrets.clone())));
    let migrator = Migrator::new(gateway);
    let state = Arc::new(AppState::new(migrator, secrets));

    let addr: SocketAddr = std::env::var("LCM_BIND")
        .unwrap_or_else(|_| "127.0.0.1:5000".to_string())
        .parse()?;

    let origins: Vec<String> = std::env::var("FRONTEND_ORIGIN")
        .unwrap_or_else(|_| "http://localhost:8080".to_string())
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect();

    info!(%addr, ?origins, "starting Legacy Code Modernizer server");
    warp::serve(routes(state, &origins)).run(addr).await;

    Ok(())
}
