use crate::error::ApiError;
use crate::state::AppState;
use super::extract::{ApiJson, ApiPath, ApiQuery};
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use parcinfo_core::{Appareil, AppareilCategorie, AppareilId, AppareilInput};
use serde::Deserialize;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/appareils", get(list))
        .route("/appareil", post(create))
        .route("/appareil/:id", get(show).put(update).delete(remove))
}

#[derive(Debug, Default, Deserialize)]
struct ListParams {
    categorie: Option<String>,
}

async fn list(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ListParams>,
) -> Result<Json<Vec<Appareil>>, ApiError> {
    let categorie = match params.categorie.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(AppareilCategorie::parse_db(raw).ok_or_else(|| {
            ApiError::Validation(format!("unknown categorie `{raw}`"))
        })?),
    };
    let appareils = state.appareils(|service| service.list_appareils(categorie))?;
    Ok(Json(appareils))
}

async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<AppareilId>,
) -> Result<Json<Appareil>, ApiError> {
    state
        .appareils(|service| service.get_appareil(id))?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("appareil not found: {id}")))
}

async fn create(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<AppareilInput>,
) -> Result<(StatusCode, Json<Appareil>), ApiError> {
    let appareil = state.appareils(|service| service.create_appareil(&input))?;
    Ok((StatusCode::CREATED, Json(appareil)))
}

async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<AppareilId>,
    ApiJson(input): ApiJson<AppareilInput>,
) -> Result<Json<Appareil>, ApiError> {
    let appareil = state.appareils(|service| service.update_appareil(id, &input))?;
    Ok(Json(appareil))
}

async fn remove(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<AppareilId>,
) -> Result<StatusCode, ApiError> {
    state.appareils(|service| service.delete_appareil(id))?;
    Ok(StatusCode::NO_CONTENT)
}
