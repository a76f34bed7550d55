//! HTTP tier for ParcInfo.
//!
//! # Responsibility
//! - Serve the JSON API under `/api` and the HTML pages at the root.
//! - Own server configuration (`WebConfig`).
//!
//! # Invariants
//! - Handlers only talk to core services, never to SQL directly.

use axum::Router;
use log::info;
use std::net::SocketAddr;

pub mod api;
pub mod config;
pub mod error;
pub mod pages;
pub mod state;

pub use config::{ConfigError, LoggingConfig, WebConfig};
pub use error::ApiError;
pub use state::AppState;

/// Builds the full application router over `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/api", api::routes())
        .merge(pages::routes())
        .with_state(state)
}

/// Binds `addr` and serves until Ctrl-C.
pub async fn serve(state: AppState, addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        "event=web_listen module=web status=ok addr={}",
        listener.local_addr()?
    );
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("event=web_stop module=web status=ok");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler available; serve until the process is killed.
        std::future::pending::<()>().await;
    }
}
