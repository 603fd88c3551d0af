//! Session records: `token:<token>` → user id, expiring with the token.

use std::time::Duration;

use tracing::{debug, warn};

use keyward_cache::CacheManager;
use keyward_cache::keys;
use keyward_core::result::AppResult;
use keyward_core::traits::CacheProvider;
use keyward_core::types::UserId;

/// Tracks live sessions in the cache so tokens can be revoked.
#[derive(Debug, Clone)]
pub struct SessionCache {
    cache: CacheManager,
}

impl SessionCache {
    /// Creates a session cache over the given cache manager.
    pub fn new(cache: CacheManager) -> Self {
        Self { cache }
    }

    /// Records a session. Best-effort: cache failures are logged and
    /// swallowed, leaving the token valid but not revocable. A zero `ttl`
    /// means the token is already expired and nothing is written.
    pub async fn store(&self, token: &str, user_id: UserId, ttl: Duration) {
        if ttl.is_zero() {
            debug!(user_id = %user_id, "Skipping session record for expired token");
            return;
        }

        let key = keys::session_token(token);
        if let Err(e) = self.cache.set(&key, &user_id.to_string(), ttl).await {
            warn!(
                user_id = %user_id,
                error = %e,
                "Failed to record session; token is not revocable until it expires"
            );
        }
    }

    /// Deletes a session record. Removing a missing record succeeds.
    pub async fn remove(&self, token: &str) -> AppResult<()> {
        self.cache.delete(&keys::session_token(token)).await
    }

    /// Returns `true` while a session record exists for `token`.
    pub async fn contains(&self, token: &str) -> AppResult<bool> {
        self.cache.exists(&keys::session_token(token)).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use keyward_cache::memory::MemoryCacheProvider;
    use keyward_core::config::cache::MemoryCacheConfig;
    use keyward_core::error::{AppError, ErrorKind};

    use super::*;

    #[derive(Debug)]
    struct DownCache;

    #[async_trait]
    impl CacheProvider for DownCache {
        async fn get(&self, _key: &str) -> AppResult<Option<String>> {
            Err(AppError::cache("connection refused"))
        }
        async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> AppResult<()> {
            Err(AppError::cache("connection refused"))
        }
        async fn delete(&self, _key: &str) -> AppResult<()> {
            Err(AppError::cache("connection refused"))
        }
        async fn exists(&self, _key: &str) -> AppResult<bool> {
            Err(AppError::cache("connection refused"))
        }
        async fn health_check(&self) -> AppResult<bool> {
            Ok(false)
        }
    }

    fn memory() -> (SessionCache, CacheManager) {
        let manager = CacheManager::from_provider(Arc::new(MemoryCacheProvider::new(
            &MemoryCacheConfig { max_capacity: 100 },
        )));
        (SessionCache::new(manager.clone()), manager)
    }

    #[tokio::test]
    async fn test_store_writes_token_key() {
        let (sessions, cache) = memory();
        let id = UserId::new();
        sessions.store("tok", id, Duration::from_secs(60)).await;

        assert_eq!(cache.get("token:tok").await.unwrap(), Some(id.to_string()));
        assert!(sessions.contains("tok").await.unwrap());
    }

    #[tokio::test]
    async fn test_zero_ttl_skips_write() {
        let (sessions, cache) = memory();
        sessions.store("tok", UserId::new(), Duration::ZERO).await;
        assert!(!cache.exists("token:tok").await.unwrap());
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let (sessions, _) = memory();
        sessions
            .store("tok", UserId::new(), Duration::from_secs(60))
            .await;
        sessions.remove("tok").await.unwrap();
        assert!(!sessions.contains("tok").await.unwrap());
        sessions.remove("tok").await.unwrap();
    }

    #[tokio::test]
    async fn test_store_swallows_outage_but_remove_surfaces_it() {
        let sessions = SessionCache::new(CacheManager::from_provider(Arc::new(DownCache)));
        sessions
            .store("tok", UserId::new(), Duration::from_secs(60))
            .await;

        let err = sessions.remove("tok").await.unwrap_err();
        assert!(err.is(ErrorKind::Cache));
    }
}
