//! API Gateway Library
//!
//! The HTTP surface of the library auth service: axum routes for register,
//! verify, login and the authenticated profile, plus health and OpenAPI docs.

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use auth_service_lib::build_authenticator;
use common::{AppError, AppResult, Config};

use crate::routes::create_app;
use crate::state::AppState;

/// Build every component from configuration and serve HTTP until Ctrl-C.
pub async fn serve(config: Config) -> AppResult<()> {
    let store = account_service_lib::connect_store(&config.database).await?;
    let auth = Arc::new(build_authenticator(&config, store.clone())?);

    let state = AppState::new(auth, store);
    let app = create_app(
        state,
        Duration::from_secs(config.server.request_timeout_seconds),
    );

    let addr: SocketAddr = config
        .server
        .addr()
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid server address: {}", e)))?;
    info!("Gateway listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
