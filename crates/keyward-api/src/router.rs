//! Route definitions for the Keyward HTTP API.
//!
//! All routes are mounted under `/api`.

use axum::Router;
use axum::middleware as axum_middleware;
use axum::routing::{get, post};

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the router with every route and the request logger.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new().merge(auth_routes()).merge(health_routes());

    Router::new()
        .nest("/api", api_routes)
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Auth endpoints: register, login, logout, validate
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/validate", post(handlers::auth::validate))
}

/// Health probe
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
