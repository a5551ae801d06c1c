use axum::{extract::Request, middleware::Next, response::IntoResponse, response::Response, Json};

use super::response::ErrorEnvelope;
use crate::error::FaultDetail;

/// Replaces the generic server fault message with the underlying error.
/// Only installed outside production.
pub async fn expose_fault_detail(request: Request, next: Next) -> Response {
    let response = next.run(request).await;

    match response.extensions().get::<FaultDetail>() {
        Some(FaultDetail(detail)) => {
            let status = response.status();
            (status, Json(ErrorEnvelope::new(detail.clone()))).into_response()
        }
        None => response,
    }
}
