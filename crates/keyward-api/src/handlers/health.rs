//! Health check handler.

use axum::Json;
use axum::extract::State;

use keyward_core::traits::{CacheProvider, MessageBroker};

use crate::dto::response::HealthResponse;
use crate::state::AppState;

fn probe(result: Result<bool, impl std::fmt::Display>, name: &str) -> &'static str {
    match result {
        Ok(true) => "up",
        Ok(false) => "down",
        Err(e) => {
            tracing::warn!(dependency = name, error = %e, "Health probe failed");
            "down"
        }
    }
}

/// GET /api/health
///
/// Always answers 200; a failing dependency is reported in the body.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let (cache, broker) = tokio::join!(state.cache.health_check(), state.broker.health_check());
    let cache = probe(cache, "cache");
    let broker = probe(broker, "broker");

    let status = if cache == "up" && broker == "up" {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        cache: cache.to_string(),
        broker: broker.to_string(),
    })
}
