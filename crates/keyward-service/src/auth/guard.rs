//! Deadlines and cancellation for dependency calls.

use std::future::Future;
use std::time::Duration;

use keyward_core::error::{AppError, ErrorKind};
use keyward_core::result::AppResult;

use crate::context::RequestContext;

/// Runs `fut` until it completes, `ctx` is cancelled, or `limit` passes.
pub(crate) async fn bounded<T, F>(
    ctx: &RequestContext,
    limit: Duration,
    operation: &str,
    fut: F,
) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    ctx.ensure_active()?;

    tokio::select! {
        biased;
        _ = ctx.cancel.cancelled() => Err(AppError::cancelled(format!("{operation} cancelled"))),
        res = tokio::time::timeout(limit, fut) => match res {
            Ok(result) => result,
            Err(_) => Err(AppError::timeout(format!(
                "{operation} timed out after {}ms",
                limit.as_millis()
            ))),
        },
    }
}

/// Runs `fut` until it completes or `ctx` is cancelled. For CPU-bound work
/// that already runs on the blocking pool and has no natural deadline.
pub(crate) async fn cancellable<T, F>(ctx: &RequestContext, operation: &str, fut: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    ctx.ensure_active()?;

    tokio::select! {
        biased;
        _ = ctx.cancel.cancelled() => Err(AppError::cancelled(format!("{operation} cancelled"))),
        res = fut => res,
    }
}

/// Maps infrastructure failures to `Internal` with `context`; everything
/// else, including `Cancelled`, passes through.
pub(crate) fn reclassify(err: AppError, context: &str) -> AppError {
    if err.kind.is_infrastructure() {
        err.into_internal(context)
    } else {
        err
    }
}

/// Like [`reclassify`], but only the listed kinds and `Cancelled` survive.
pub(crate) fn reclassify_except(err: AppError, keep: &[ErrorKind], context: &str) -> AppError {
    if err.is(ErrorKind::Cancelled) || keep.contains(&err.kind) {
        err
    } else {
        err.into_internal(context)
    }
}

#[cfg(test)]
mod tests {
    use tokio_util::sync::CancellationToken;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_bounded_times_out() {
        let ctx = RequestContext::background();
        let err = bounded(&ctx, Duration::from_millis(50), "slow call", async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(())
        })
        .await
        .unwrap_err();
        assert!(err.is(ErrorKind::Timeout));
        assert!(err.message.contains("slow call"));
    }

    #[tokio::test]
    async fn test_bounded_honors_cancellation_mid_call() {
        let cancel = CancellationToken::new();
        let ctx = RequestContext::new(cancel.clone());

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let err = bounded(&ctx, Duration::from_secs(30), "hung call", async {
            std::future::pending::<AppResult<()>>().await
        })
        .await
        .unwrap_err();
        assert!(err.is(ErrorKind::Cancelled));
    }

    #[tokio::test]
    async fn test_cancelled_context_never_starts_call() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let ctx = RequestContext::new(cancel);

        let mut ran = false;
        let err = cancellable(&ctx, "call", async {
            ran = true;
            Ok::<(), AppError>(())
        })
        .await
        .unwrap_err();
        assert!(err.is(ErrorKind::Cancelled));
        assert!(!ran);
    }

    #[test]
    fn test_reclassify() {
        let err = reclassify(AppError::cache("down"), "failed to revoke session");
        assert!(err.is(ErrorKind::Internal));
        assert_eq!(err.message, "failed to revoke session");

        let err = reclassify(AppError::cancelled("gone"), "ctx");
        assert!(err.is(ErrorKind::Cancelled));

        let err = reclassify_except(AppError::not_found("x"), &[ErrorKind::EmailExists], "ctx");
        assert!(err.is(ErrorKind::Internal));

        let err = reclassify_except(AppError::email_exists(), &[ErrorKind::EmailExists], "ctx");
        assert!(err.is(ErrorKind::EmailExists));
    }
}
