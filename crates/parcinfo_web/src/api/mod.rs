//! JSON REST API mounted under `/api`.
//!
//! # Invariants
//! - Creation answers `201`, deletion answers `204`.
//! - Failures go through `ApiError`, so bodies are always `{"error": ...}`,
//!   including extractor rejections and unknown paths.

use crate::error::ApiError;
use crate::state::AppState;
use axum::http::Uri;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

mod appareils;
mod extract;
mod peripheriques;
mod personnes;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .merge(appareils::routes())
        .merge(personnes::routes())
        .merge(peripheriques::routes())
        .fallback(unknown_route)
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": parcinfo_core::core_version(),
    }))
}

async fn unknown_route(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("no route for {}", uri.path()))
}
