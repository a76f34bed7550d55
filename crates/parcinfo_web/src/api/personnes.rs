use crate::error::ApiError;
use crate::state::AppState;
use super::extract::{ApiJson, ApiPath};
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use parcinfo_core::{Appareil, AppareilId, Personne, PersonneId, PersonneInput};
use serde::Deserialize;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/personnes", get(list))
        .route("/personne", post(create))
        .route("/personne/:id", get(show).put(update).delete(remove))
        .route("/personne/:id/appareils", get(appareils).put(affect))
}

#[derive(Debug, Deserialize)]
struct AffectBody {
    appareils: Vec<AppareilId>,
}

async fn list(State(state): State<AppState>) -> Result<Json<Vec<Personne>>, ApiError> {
    Ok(Json(state.personnes(|service| service.list_personnes())?))
}

async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<PersonneId>,
) -> Result<Json<Personne>, ApiError> {
    Ok(Json(state.personnes(|service| service.get_personne(id))?))
}

async fn create(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<PersonneInput>,
) -> Result<(StatusCode, Json<Personne>), ApiError> {
    let personne = state.personnes(|service| service.create_personne(&input))?;
    Ok((StatusCode::CREATED, Json(personne)))
}

async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<PersonneId>,
    ApiJson(input): ApiJson<PersonneInput>,
) -> Result<Json<Personne>, ApiError> {
    Ok(Json(
        state.personnes(|service| service.update_personne(id, &input))?,
    ))
}

async fn remove(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<PersonneId>,
) -> Result<StatusCode, ApiError> {
    state.personnes(|service| service.delete_personne(id))?;
    Ok(StatusCode::NO_CONTENT)
}

/// Devices currently assigned to one person.
async fn appareils(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<PersonneId>,
) -> Result<Json<Vec<Appareil>>, ApiError> {
    let personne = state.personnes(|service| service.get_personne(id))?;
    let appareils = state.appareils(|service| service.list_appareils(None))?;
    Ok(Json(
        appareils
            .into_iter()
            .filter(|appareil| personne.owns(appareil.id))
            .collect(),
    ))
}

async fn affect(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<PersonneId>,
    ApiJson(body): ApiJson<AffectBody>,
) -> Result<Json<Personne>, ApiError> {
    Ok(Json(
        state.personnes(|service| service.affect_appareils(id, &body.appareils))?,
    ))
}
