// src/presentation/http/extractors.rs
//! Axum extractors whose rejections go through the error envelope.
use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, Query},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use super::error::HttpError;

#[derive(Debug, Clone, FromRequest)]
#[from_request(via(Json), rejection(HttpError))]
pub struct ApiJson<T>(pub T);

impl<T: Serialize> IntoResponse for ApiJson<T> {
    fn into_response(self) -> Response {
        Json(self.0).into_response()
    }
}

#[derive(Debug, Clone, FromRequestParts)]
#[from_request(via(Path), rejection(HttpError))]
pub struct ApiPath<T>(pub T);

#[derive(Debug, Clone, FromRequestParts)]
#[from_request(via(Query), rejection(HttpError))]
pub struct ApiQuery<T>(pub T);
