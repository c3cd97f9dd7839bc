use anyhow::Result;
use dotenvy::dotenv;
use std::env;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn check_env() {
    if env::var("SESSION_SECRET").is_err() {
        warn!("SESSION_SECRET is not set; export sessions will use a development-only key");
    }
    info!(
        "PORT is {}",
        env::var("PORT").unwrap_or_else(|_| "unset (defaulting to 8080)".to_string())
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    match dotenv() {
        Ok(path) => info!("Loaded environment from {:?}", path),
        Err(e) => warn!("No .env file loaded ({}) - relying on environment", e),
    }
    init_tracing();
    check_env();
    fencelink::app::run_server().await
}
