//! To-Do Server Library
//!
//! A personal To-Do list behind a small REST API. Users register with a
//! username and password, log in for a time-limited bearer token, and manage
//! their own items. The same process serves the static web front end.

pub mod core;

use std::net::SocketAddr;
use std::sync::Arc;

use chrono::Duration;
use tracing::info;

use crate::core::auth::AuthManager;
use crate::core::items::ItemManager;
use crate::core::{store, AppState, ServerConfig};

/// Open storage and assemble the shared state handlers run against.
pub async fn build_state(config: ServerConfig) -> anyhow::Result<AppState> {
    let pool = store::connect(&config.database_url).await?;

    let auth = Arc::new(AuthManager::new(
        pool.clone(),
        &config.jwt_secret,
        Duration::hours(config.token_ttl_hours),
        config.bcrypt_cost,
    ));
    info!("Auth Manager initialized");

    let items = Arc::new(ItemManager::new(pool));
    info!("Item Manager initialized");

    Ok(AppState {
        config,
        auth,
        items,
    })
}

pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    info!("=== To-Do Server ===");

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Static front end: {:?}", config.static_dir);

    let state = build_state(config).await?;
    let app = crate::core::router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
