use axum::Json;

use crate::{api::response::EmptyEnvelope, error::AppError};

#[utoipa::path(
    get,
    tag = "system",
    path = "/",
    responses((status = 200, description = "Service is up", body = EmptyEnvelope))
)]
pub async fn liveness() -> Json<EmptyEnvelope> {
    Json(EmptyEnvelope::success())
}

pub async fn route_not_found() -> AppError {
    AppError::RouteNotFound
}

pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
