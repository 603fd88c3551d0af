//! Keyward server: credential issuance over HTTP.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, fmt};

use keyward_api::{AppState, build_app};
use keyward_auth::{CredentialVerifier, SessionCache, TokenService};
use keyward_cache::CacheManager;
use keyward_core::config::AppConfig;
use keyward_core::error::AppError;
use keyward_database::{DatabasePool, MemoryUserStore, PgUserStore};
use keyward_events::{BrokerManager, EventPublisher};
use keyward_service::{AuthService, DynUserStore};

/// Keyward credential-issuance server.
#[derive(Debug, Parser)]
#[command(name = "keyward-server", version, about)]
struct Args {
    /// Directory holding `default.toml` and the per-environment overlay.
    #[arg(long, env = "KEYWARD_CONFIG_DIR", default_value = "config")]
    config_dir: String,

    /// Environment name; selects `<config-dir>/<env>.toml`.
    #[arg(long, env = "KEYWARD_ENV", default_value = "development")]
    env: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = match AppConfig::load(&args.config_dir, &args.env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(
        config_dir = %args.config_dir,
        env = %args.env,
        "Configuration loaded"
    );

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Builds the user store selected by `database.provider`.
///
/// Returns the pool too when one was opened, so it can be closed on exit.
async fn open_user_store(
    config: &AppConfig,
) -> Result<(DynUserStore, Option<DatabasePool>), AppError> {
    match config.database.provider.as_str() {
        "postgres" => {
            tracing::info!("Connecting to database...");
            let pool = DatabasePool::connect(&config.database).await?;

            tracing::info!("Running database migrations...");
            keyward_database::migration::run_migrations(pool.pool()).await?;
            tracing::info!("Database migrations complete");

            let store: DynUserStore = Arc::new(PgUserStore::new(pool.pool().clone()));
            Ok((store, Some(pool)))
        }
        "memory" => {
            tracing::warn!("Using in-memory user store; users are lost on restart");
            Ok((Arc::new(MemoryUserStore::new()), None))
        }
        other => Err(AppError::configuration(format!(
            "Unknown database provider: '{other}'. Supported: postgres, memory"
        ))),
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Keyward v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: User store ───────────────────────────────────────
    let (users, db_pool) = open_user_store(&config).await?;

    // ── Step 2: Session cache ────────────────────────────────────
    tracing::info!(
        "Initializing cache (provider: {})...",
        config.cache.provider
    );
    let cache = CacheManager::new(&config.cache).await?;

    // ── Step 3: Event broker, publisher, and worker ──────────────
    tracing::info!(
        "Initializing event broker (backend: {}, topic: {})...",
        config.events.broker,
        config.events.topic
    );
    let broker = BrokerManager::new(&config.events).await?;
    let (publisher, worker) = EventPublisher::new(&config.events, Arc::new(broker.clone()));
    let worker_cancel = CancellationToken::new();
    let worker_handle = worker.spawn(worker_cancel.clone());

    // ── Step 4: Auth system ──────────────────────────────────────
    tracing::info!("Initializing authentication system...");
    let verifier = CredentialVerifier::new(&config.password)?;
    let tokens = Arc::new(TokenService::new(&config.auth)?);
    let sessions = SessionCache::new(cache.clone());
    let auth = AuthService::new(users, verifier, tokens, sessions, publisher, &config.auth);

    // ── Step 5: Build and start HTTP server ──────────────────────
    let shutdown = CancellationToken::new();
    let state = AppState {
        auth,
        cache,
        broker,
        shutdown: shutdown.clone(),
    };
    let app = build_app(state, &config.server);

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("Keyward server listening on {}", addr);

    // ── Step 6: Graceful shutdown ────────────────────────────────
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, starting graceful shutdown...");
        shutdown.cancel();
    });

    server
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    // ── Step 7: Drain events and release resources ───────────────
    tracing::info!("Draining queued events...");
    worker_cancel.cancel();
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    if tokio::time::timeout(grace, worker_handle).await.is_err() {
        tracing::warn!("Publish worker did not finish within {}s", grace.as_secs());
    }

    if let Some(pool) = db_pool {
        pool.close().await;
    }

    tracing::info!("Keyward server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
