//! Unified application error types for Keyward.
//!
//! Every crate maps its internal failures into [`AppError`]. The
//! authentication core reclassifies infrastructure kinds (database, cache,
//! broker, timeout) into the public taxonomy before returning to callers.

use std::fmt;
use thiserror::Error;

/// Error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// Malformed input rejected at the transport boundary.
    InvalidArgument,
    /// Login failed: unknown email or wrong password, indistinguishably.
    InvalidCredentials,
    /// The requested record does not exist. Never surfaced from login.
    NotFound,
    /// A user with this email already exists.
    EmailExists,
    /// A user with this username already exists.
    UsernameExists,
    /// A bearer token failed signature, algorithm, expiry, or shape checks.
    InvalidToken,
    /// An internal error occurred.
    Internal,
    /// The relational store failed.
    Database,
    /// The cache backend failed.
    Cache,
    /// The message broker failed.
    Broker,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// A dependency call exceeded its deadline.
    Timeout,
    /// The operation was cancelled by its caller.
    Cancelled,
}

impl ErrorKind {
    /// Whether this kind belongs to the infrastructure layer and must be
    /// reclassified before it crosses the orchestrator boundary.
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            Self::Database
                | Self::Cache
                | Self::Broker
                | Self::Configuration
                | Self::Serialization
                | Self::Timeout
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument => write!(f, "INVALID_ARGUMENT"),
            Self::InvalidCredentials => write!(f, "INVALID_CREDENTIALS"),
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::EmailExists => write!(f, "EMAIL_EXISTS"),
            Self::UsernameExists => write!(f, "USERNAME_EXISTS"),
            Self::InvalidToken => write!(f, "INVALID_TOKEN"),
            Self::Internal => write!(f, "INTERNAL"),
            Self::Database => write!(f, "DATABASE"),
            Self::Cache => write!(f, "CACHE"),
            Self::Broker => write!(f, "BROKER"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Timeout => write!(f, "TIMEOUT"),
            Self::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// The unified application error used throughout Keyward.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Returns `true` if the error is of the given kind.
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }

    /// Create an invalid-argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, message)
    }

    /// Create the credential-mismatch error. The message is fixed so that
    /// unknown-account and wrong-password failures read identically.
    pub fn invalid_credentials() -> Self {
        Self::new(ErrorKind::InvalidCredentials, "invalid login or password")
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create an email-exists error.
    pub fn email_exists() -> Self {
        Self::new(ErrorKind::EmailExists, "user with this email already exists")
    }

    /// Create a username-exists error.
    pub fn username_exists() -> Self {
        Self::new(
            ErrorKind::UsernameExists,
            "user with this username already exists",
        )
    }

    /// Create an invalid-token error.
    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidToken, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    /// Create a cache error.
    pub fn cache(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Cache, message)
    }

    /// Create a broker error.
    pub fn broker(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Broker, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create a timeout error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message)
    }

    /// Create a cancellation error.
    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Cancelled, message)
    }

    /// Wrap this error as the source of an internal error with the given
    /// operation context.
    pub fn into_internal(self, context: impl Into<String>) -> Self {
        Self::with_source(ErrorKind::Internal, context, self)
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}
