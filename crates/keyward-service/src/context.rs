//! Per-request context carried into every service call.

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use keyward_core::error::AppError;
use keyward_core::result::AppResult;

/// Context for the current request.
///
/// Built by the transport for each request so that every operation can
/// tell when its caller has gone away.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Correlation ID for logs.
    pub request_id: Uuid,
    /// Fires when the caller aborts or the server shuts down.
    pub cancel: CancellationToken,
}

impl RequestContext {
    /// Creates a context bound to `cancel`.
    pub fn new(cancel: CancellationToken) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            cancel,
        }
    }

    /// Creates a context cancelled together with `parent`, and also on its own.
    pub fn child_of(parent: &CancellationToken) -> Self {
        Self::new(parent.child_token())
    }

    /// A context that is never cancelled from outside.
    pub fn background() -> Self {
        Self::new(CancellationToken::new())
    }

    /// Returns `true` once cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Fails with `Cancelled` if cancellation was requested.
    pub fn ensure_active(&self) -> AppResult<()> {
        if self.is_cancelled() {
            return Err(AppError::cancelled("request was cancelled"));
        }
        Ok(())
    }
}
