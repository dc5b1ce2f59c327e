//! Route definitions for the Starry console API.
//!
//! Routes are organized by domain and nested under the configured base
//! path (`/console/api` by default). The router receives `AppState` and
//! passes it to all handlers via Axum's `State` extractor.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.server.body_limit_bytes;
    let base_path = state.config.server.base_path.clone();
    let cors = middleware::cors::build_cors_layer(&state.config.server.cors);

    let api_routes = Router::new()
        .merge(directory_routes())
        .merge(binding_routes())
        .merge(health_routes());

    let app = if base_path.is_empty() || base_path == "/" {
        api_routes
    } else {
        Router::new().nest(&base_path, api_routes)
    };

    app.layer(DefaultBodyLimit::max(body_limit))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(
            middleware::logging::request_logging,
        ))
        .with_state(state)
}

/// Directory tree CRUD
fn directory_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/directory",
            get(handlers::directory::get_directory_tree).post(handlers::directory::create_directory),
        )
        .route(
            "/directory/{id}",
            get(handlers::directory::get_directory_sub)
                .patch(handlers::directory::update_directory)
                .put(handlers::directory::move_directory)
                .delete(handlers::directory::delete_directory),
        )
        .route(
            "/directory/{id}/bindings",
            get(handlers::directory::list_directory_bindings),
        )
}

/// Target bindings
fn binding_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/directory-bindings/create",
            post(handlers::binding::create_bindings),
        )
        .route(
            "/directory-bindings/remove",
            post(handlers::binding::remove_bindings),
        )
}

/// Liveness
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
