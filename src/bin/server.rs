//! Shiftboard HTTP Server Binary
//!
//! Entry point for the scheduling REST API server: initializes the
//! repository, wires up the router, and starts serving requests.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin shiftboard-server
//! ```
//!
//! # Environment Variables
//!
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 8080)
//! - `REPOSITORY_TYPE`: Storage backend (default: local)
//! - `SESSION_SECRET`: Secret for session token MACs
//! - `RUST_LOG`: Log filter (default: info)

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use shiftboard::auth::AuthService;
use shiftboard::db::RepositoryFactory;
use shiftboard::http::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("Starting Shiftboard HTTP Server");

    let repository = RepositoryFactory::from_default_config()
        .map_err(|e| anyhow::anyhow!("repository init failed: {}", e))?;
    info!("Repository initialized successfully");

    let auth = Arc::new(AuthService::from_env());
    let state = AppState::new(repository, auth);
    let app = create_router(state);

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080);
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
