pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod router;
pub mod upload;

use axum::{extract::DefaultBodyLimit, routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{storage::uploads::PUBLIC_URL_PREFIX, AppState};

/// Assemble the full application: API routes, static files, docs and the
/// terminal 404 handler.
pub fn build_app(state: AppState) -> Router {
    let body_limit = state.config.upload.body_limit();
    let production = state.config.server.is_production();
    let public_dir = state.avatars.public_dir().to_path_buf();

    let mut app = Router::new()
        .route("/", get(handlers::system::liveness))
        .nest("/api/v1", router::create_router())
        .fallback(handlers::system::route_not_found)
        .with_state(state)
        .nest_service(PUBLIC_URL_PREFIX, ServeDir::new(public_dir))
        .merge(SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .layer(DefaultBodyLimit::max(body_limit));

    if !production {
        app = app.layer(axum::middleware::from_fn(middleware::expose_fault_detail));
    }

    app.layer(
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    )
    .layer(TraceLayer::new_for_http())
}
