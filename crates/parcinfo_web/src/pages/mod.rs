//! Server-rendered HTML pages.
//!
//! # Responsibility
//! - Render list and form pages for persons and peripherals.
//! - Handle form posts with redirect-after-post (`303 See Other`).
//!
//! # Invariants
//! - Every user-provided string is escaped before it reaches markup.
//! - POST handlers never render; they redirect with a flash code.

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::rejection::FormRejection;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Form, Router};
use log::{error, warn};
use parcinfo_core::{PeripheriqueServiceError, PersonneServiceError, RepoError};
use serde::Deserialize;

pub mod flash;
pub mod layout;
mod peripheriques;
mod personnes;

use flash::Flash;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .merge(personnes::routes())
        .merge(peripheriques::routes())
}

/// `?flash=<code>` carried by every list and form page.
#[derive(Debug, Default, Deserialize)]
struct FlashParams {
    flash: Option<String>,
}

impl FlashParams {
    fn flash(&self) -> Option<Flash> {
        self.flash.as_deref().and_then(Flash::from_code)
    }
}

async fn home() -> Html<String> {
    layout::page(
        "Accueil",
        None,
        r#"<h1>Bienvenue sur Parcinfo</h1>
<p>Gestion du parc informatique : appareils, périphériques et personnes.</p>
<ul>
<li><a href="/personnes">Gérer les personnes</a></li>
<li><a href="/peripheriques">Gérer les périphériques</a></li>
</ul>"#,
    )
}

fn redirect(path: &str, flash: Flash) -> Redirect {
    Redirect::to(&format!("{path}?flash={}", flash.code()))
}

/// Logs a rejected form post without echoing field values.
fn log_rejected(action: &'static str, err: impl Into<ApiError>) {
    let err = err.into();
    match &err {
        ApiError::Internal(detail) => {
            error!("event=page_post module=web status=error action={action} error={detail}");
        }
        _ => warn!(
            "event=page_post module=web status=rejected action={} http_status={}",
            action,
            err.status().as_u16()
        ),
    }
}

/// Decoded form body, or `None` (logged) when fields are missing or malformed.
fn accept_form<T>(action: &'static str, form: Result<Form<T>, FormRejection>) -> Option<T> {
    match form {
        Ok(Form(value)) => Some(value),
        Err(rejection) => {
            log_rejected(action, ApiError::BadRequest(rejection.body_text()));
            None
        }
    }
}

/// GET-side failure rendered as a full page.
#[derive(Debug)]
struct PageError(ApiError);

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let status = self.0.status();
        if let ApiError::Internal(detail) = &self.0 {
            error!("event=page_error module=web status=error error={detail}");
        }
        let title = if status == StatusCode::NOT_FOUND {
            "Introuvable"
        } else {
            "Erreur"
        };
        (status, layout::page(title, Some(Flash::Error), "")).into_response()
    }
}

impl From<RepoError> for PageError {
    fn from(value: RepoError) -> Self {
        Self(value.into())
    }
}

impl From<PersonneServiceError> for PageError {
    fn from(value: PersonneServiceError) -> Self {
        Self(value.into())
    }
}

impl From<PeripheriqueServiceError> for PageError {
    fn from(value: PeripheriqueServiceError) -> Self {
        Self(value.into())
    }
}

type PageResult = Result<Html<String>, PageError>;
