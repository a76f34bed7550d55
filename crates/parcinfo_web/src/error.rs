//! HTTP error mapping for the JSON API.
//!
//! # Invariants
//! - Every error response body is `{"error": "<message>"}`.
//! - Storage failures are logged here and answered with a generic 500.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::error;
use parcinfo_core::{
    PeripheriqueServiceError, PersonneServiceError, RepoError, ValidationError,
};
use serde_json::json;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    /// Request parsed but failed field validation.
    Validation(String),
    /// Association conflict or entity still referenced.
    Conflict(String),
    /// Body, path or query that could not be decoded, or a form post with
    /// missing fields.
    BadRequest(String),
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing text. Internal details stay in the log.
    pub fn message(&self) -> &str {
        match self {
            Self::NotFound(message)
            | Self::Validation(message)
            | Self::Conflict(message)
            | Self::BadRequest(message) => message,
            Self::Internal(_) => "internal storage error",
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Internal(detail) => write!(f, "internal error: {detail}"),
            other => f.write_str(other.message()),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(detail) = &self {
            error!("event=api_error module=web status=error error={detail}");
        }
        (self.status(), Json(json!({ "error": self.message() }))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        match value {
            // Well-formed JSON whose fields do not fit the payload type.
            JsonRejection::JsonDataError(err) => Self::Validation(err.body_text()),
            other => Self::BadRequest(other.body_text()),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(value: PathRejection) -> Self {
        match value {
            PathRejection::FailedToDeserializePathParams(err) => Self::BadRequest(err.body_text()),
            other => Self::Internal(other.body_text()),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(value: QueryRejection) -> Self {
        Self::BadRequest(value.body_text())
    }
}

impl From<ValidationError> for ApiError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<RepoError> for ApiError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => err.into(),
            RepoError::NotFound { .. } => Self::NotFound(value.to_string()),
            RepoError::InUse { .. } => Self::Conflict(value.to_string()),
            RepoError::Db(_) | RepoError::InvalidData(_) => Self::Internal(value.to_string()),
        }
    }
}

impl From<PersonneServiceError> for ApiError {
    fn from(value: PersonneServiceError) -> Self {
        match value {
            PersonneServiceError::Validation(err) => err.into(),
            PersonneServiceError::PersonneNotFound(_)
            | PersonneServiceError::AppareilNotFound(_) => Self::NotFound(value.to_string()),
            PersonneServiceError::Repo(err) => err.into(),
        }
    }
}

impl From<PeripheriqueServiceError> for ApiError {
    fn from(value: PeripheriqueServiceError) -> Self {
        match value {
            PeripheriqueServiceError::Validation(err) => err.into(),
            PeripheriqueServiceError::PeripheriqueNotFound(_)
            | PeripheriqueServiceError::AppareilNotFound(_) => Self::NotFound(value.to_string()),
            PeripheriqueServiceError::WrongCategorie { .. }
            | PeripheriqueServiceError::Attachment(_)
            | PeripheriqueServiceError::ReassignmentRequiresComment(_) => {
                Self::Conflict(value.to_string())
            }
            PeripheriqueServiceError::Repo(err) => err.into(),
        }
    }
}
