//! Extractors whose rejections answer with the `ApiError` JSON body.

use crate::error::ApiError;
use axum::extract::{FromRequest, FromRequestParts, Path, Query};
use axum::Json;

#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub(super) struct ApiJson<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(Path), rejection(ApiError))]
pub(super) struct ApiPath<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(Query), rejection(ApiError))]
pub(super) struct ApiQuery<T>(pub T);
