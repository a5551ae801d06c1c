use axum::{
    extract::rejection::{FormRejection, JsonRejection, PathRejection, QueryRejection},
    extract::multipart::{MultipartError, MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::api::response::{ErrorEnvelope, FailEnvelope};

#[derive(Debug, Error)]
pub enum AppError {
    // 404
    #[error("Contact not found")]
    ContactNotFound,
    #[error("Resource not found")]
    RouteNotFound,

    // 400
    #[error("{0}")]
    Validation(String),

    // 405
    #[error("Method not allowed")]
    MethodNotAllowed,

    // Storage errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("File storage error: {0}")]
    Io(#[from] std::io::Error),

    // Internal errors
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

/// Detailed message of a server fault, attached to the response so a
/// development-only middleware can surface it.
#[derive(Debug, Clone)]
pub struct FaultDetail(pub String);

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ContactNotFound | AppError::RouteNotFound => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Database(_) | AppError::Io(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_client_error() {
            return (status, Json(FailEnvelope::new(self.to_string()))).into_response();
        }

        let detail = match &self {
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                self.to_string()
            }
            AppError::Io(e) => {
                tracing::error!("File storage error: {}", e);
                self.to_string()
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {:#}", e);
                format!("{:#}", e)
            }
            _ => self.to_string(),
        };

        let mut response = (
            status,
            Json(ErrorEnvelope::new("Internal server error")),
        )
            .into_response();
        response.extensions_mut().insert(FaultDetail(detail));
        response
    }
}

impl From<PathRejection> for AppError {
    fn from(_: PathRejection) -> Self {
        AppError::validation("Invalid contact id")
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<FormRejection> for AppError {
    fn from(rejection: FormRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<MultipartError> for AppError {
    fn from(e: MultipartError) -> Self {
        AppError::Validation(format!("Failed to read multipart body: {}", e.body_text()))
    }
}

pub type AppResult<T> = Result<T, AppError>;
