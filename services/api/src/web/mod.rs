pub mod auth;
pub mod middleware;
pub mod rest;
pub mod state;

use axum::{
    middleware as axum_middleware,
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;

pub use middleware::require_auth;
pub use rest::{
    create_material_handler, create_notebook_handler, delete_notebook_handler,
    list_notebooks_handler, update_notebook_handler,
};
use state::AppState;

/// Builds the API router: public auth routes plus the session-protected notebook routes.
pub fn router(app_state: Arc<AppState>) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/auth/signup", post(auth::signup_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/logout", post(auth::logout_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route(
            "/notebooks",
            get(list_notebooks_handler).post(create_notebook_handler),
        )
        .route(
            "/notebooks/{id}",
            patch(update_notebook_handler).delete(delete_notebook_handler),
        )
        .route("/notebooks/{id}/materials", post(create_material_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(app_state)
}
