//! Application state shared across all handlers.

use tokio_util::sync::CancellationToken;

use keyward_cache::CacheManager;
use keyward_events::BrokerManager;
use keyward_service::AuthService;

/// Application state passed to every handler via `State<AppState>`.
///
/// Every field is cheap to clone.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Authentication orchestrator.
    pub auth: AuthService,
    /// Session cache, probed by the health check.
    pub cache: CacheManager,
    /// Event broker, probed by the health check.
    pub broker: BrokerManager,
    /// Server-wide shutdown token. Each request context is a child of it.
    pub shutdown: CancellationToken,
}
