use axum::{
    routing::{get, MethodRouter},
    Router,
};

use super::handlers;
use crate::AppState;

/// Any verb not bound on a path gets the 405 envelope.
fn guarded(routes: MethodRouter<AppState>) -> MethodRouter<AppState> {
    routes.fallback(handlers::system::method_not_allowed)
}

/// Routes mounted under the versioned API prefix.
pub fn create_router() -> Router<AppState> {
    let contact_routes = Router::new()
        .route(
            "/",
            guarded(
                get(handlers::contacts::get_contacts)
                    .post(handlers::contacts::create_contact)
                    .delete(handlers::contacts::delete_all_contacts),
            ),
        )
        .route(
            "/:id",
            guarded(
                get(handlers::contacts::get_contact)
                    .put(handlers::contacts::update_contact)
                    .delete(handlers::contacts::delete_contact),
            ),
        );

    Router::new().nest("/contacts", contact_routes)
}
