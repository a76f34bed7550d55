use crate::error::ApiError;
use crate::state::AppState;
use super::extract::{ApiJson, ApiPath, ApiQuery};
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use parcinfo_core::{
    NewPeripherique, Peripherique, PeripheriqueId, PeripheriqueListQuery, PeripheriqueUpdate,
    Rattachement, TypePeripherique,
};
use serde::Deserialize;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/peripheriques", get(list))
        .route("/peripherique", post(create))
        .route("/peripherique/:id", get(show).put(update).delete(remove))
        .route(
            "/peripherique/:id/commentaires",
            post(add_commentaire).delete(remove_commentaire),
        )
        .route("/peripherique/:id/rattachement", put(rattacher))
        .route("/peripherique/:id/actif", put(set_actif))
}

#[derive(Debug, Default, Deserialize)]
struct ListParams {
    #[serde(rename = "type")]
    kind: Option<String>,
    actif: Option<bool>,
    disponible: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct CommentaireBody {
    commentaire: String,
}

#[derive(Debug, Deserialize)]
struct RattachementBody {
    rattachement: Rattachement,
    #[serde(default)]
    commentaire: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ActifBody {
    actif: bool,
}

async fn list(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ListParams>,
) -> Result<Json<Vec<Peripherique>>, ApiError> {
    let kind = match params.kind.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(raw.parse::<TypePeripherique>()?),
    };
    let query = PeripheriqueListQuery {
        kind,
        actif: params.actif,
        disponible: params.disponible,
        appareil_id: None,
    };
    Ok(Json(
        state.peripheriques(|service| service.list_peripheriques(&query))?,
    ))
}

async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<PeripheriqueId>,
) -> Result<Json<Peripherique>, ApiError> {
    Ok(Json(
        state.peripheriques(|service| service.get_peripherique(id))?,
    ))
}

async fn create(
    State(state): State<AppState>,
    ApiJson(new): ApiJson<NewPeripherique>,
) -> Result<(StatusCode, Json<Peripherique>), ApiError> {
    let peripherique = state.peripheriques(|service| service.create_peripherique(&new))?;
    Ok((StatusCode::CREATED, Json(peripherique)))
}

async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<PeripheriqueId>,
    ApiJson(update): ApiJson<PeripheriqueUpdate>,
) -> Result<Json<Peripherique>, ApiError> {
    Ok(Json(
        state.peripheriques(|service| service.update_peripherique(id, &update))?,
    ))
}

async fn remove(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<PeripheriqueId>,
) -> Result<StatusCode, ApiError> {
    state.peripheriques(|service| service.delete_peripherique(id))?;
    Ok(StatusCode::NO_CONTENT)
}

async fn add_commentaire(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<PeripheriqueId>,
    ApiJson(body): ApiJson<CommentaireBody>,
) -> Result<Json<Peripherique>, ApiError> {
    Ok(Json(state.peripheriques(|service| {
        service.add_commentaire(id, &body.commentaire)
    })?))
}

async fn remove_commentaire(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<PeripheriqueId>,
    ApiJson(body): ApiJson<CommentaireBody>,
) -> Result<Json<Peripherique>, ApiError> {
    Ok(Json(state.peripheriques(|service| {
        service.remove_commentaire(id, &body.commentaire)
    })?))
}

async fn rattacher(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<PeripheriqueId>,
    ApiJson(body): ApiJson<RattachementBody>,
) -> Result<Json<Peripherique>, ApiError> {
    Ok(Json(state.peripheriques(|service| {
        service.attach(id, body.rattachement, body.commentaire.as_deref())
    })?))
}

async fn set_actif(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<PeripheriqueId>,
    ApiJson(body): ApiJson<ActifBody>,
) -> Result<Json<Peripherique>, ApiError> {
    Ok(Json(
        state.peripheriques(|service| service.set_actif(id, body.actif))?,
    ))
}
