//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section, and every field carries a default so an empty file is valid.

pub mod app;
pub mod auth;
pub mod cache;
pub mod database;
pub mod events;
pub mod logging;

use serde::{Deserialize, Serialize};

pub use self::app::ServerConfig;
pub use self::auth::{AuthConfig, PasswordConfig};
pub use self::cache::CacheConfig;
pub use self::database::DatabaseConfig;
pub use self::events::EventsConfig;
pub use self::logging::LoggingConfig;

use crate::error::AppError;

/// Prefix for environment variable overrides, e.g. `KEYWARD__AUTH__JWT_SECRET`.
const ENV_PREFIX: &str = "KEYWARD";

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// User store settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Session cache settings.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Token issuance and dependency-call settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Password hashing cost settings.
    #[serde(default)]
    pub password: PasswordConfig,
    /// Event publishing settings.
    #[serde(default)]
    pub events: EventsConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges `<dir>/default.toml` with an environment-specific overlay
    /// `<dir>/<env>.toml` and environment variables prefixed with
    /// `KEYWARD__`. Both files are optional. The result is validated for
    /// `env`; see [`AppConfig::validate`].
    pub fn load(config_dir: &str, env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(&format!("{config_dir}/default")).required(false))
            .add_source(config::File::with_name(&format!("{config_dir}/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let loaded: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        loaded.validate(env)?;
        Ok(loaded)
    }

    /// Check cross-field constraints that serde defaults cannot express.
    ///
    /// `env` selects how strict secret checks are: only `development` and
    /// `test` may run with the placeholder signing secret.
    pub fn validate(&self, env: &str) -> Result<(), AppError> {
        self.auth.validate(env)?;
        self.password.validate()?;
        self.events.validate()?;
        Ok(())
    }
}
