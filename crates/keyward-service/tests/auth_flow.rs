//! End-to-end flows through `AuthService` with in-memory collaborators.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use keyward_auth::{CredentialVerifier, SessionCache, TokenService};
use keyward_cache::CacheManager;
use keyward_cache::memory::MemoryCacheProvider;
use keyward_core::config::cache::MemoryCacheConfig;
use keyward_core::config::{AuthConfig, EventsConfig, PasswordConfig};
use keyward_core::error::{AppError, ErrorKind};
use keyward_core::events::UserCreatedEvent;
use keyward_core::result::AppResult;
use keyward_core::traits::{CacheProvider, UserStore};
use keyward_core::types::UserId;
use keyward_database::MemoryUserStore;
use keyward_entity::user::{NewUser, User, UserProfile};
use keyward_events::broker::MemoryBroker;
use keyward_events::{DeliveryOutcome, EventPublisher, PublishWorker};
use keyward_service::{AuthService, DynUserStore, RequestContext};

// ── Collaborator doubles ───────────────────────────────────

/// Memory cache that also records every write.
#[derive(Debug)]
struct RecordingCache {
    inner: MemoryCacheProvider,
    writes: Mutex<Vec<(String, String, Duration)>>,
}

impl RecordingCache {
    fn new() -> Self {
        Self {
            inner: MemoryCacheProvider::new(&MemoryCacheConfig { max_capacity: 1000 }),
            writes: Mutex::new(Vec::new()),
        }
    }

    fn writes(&self) -> Vec<(String, String, Duration)> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl CacheProvider for RecordingCache {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        self.inner.get(key).await
    }
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        self.writes
            .lock()
            .unwrap()
            .push((key.to_string(), value.to_string(), ttl));
        self.inner.set(key, value, ttl).await
    }
    async fn delete(&self, key: &str) -> AppResult<()> {
        self.inner.delete(key).await
    }
    async fn exists(&self, key: &str) -> AppResult<bool> {
        self.inner.exists(key).await
    }
    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}

/// Cache whose backend is unreachable.
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

/// User store that fails every call with a database error.
#[derive(Debug)]
struct BrokenStore;

#[async_trait]
impl UserStore for BrokenStore {
    type User = User;
    type NewUser = NewUser;

    async fn save(&self, _user: &NewUser) -> AppResult<UserId> {
        Err(AppError::database("connection reset"))
    }
    async fn find_by_email(&self, _email: &str) -> AppResult<User> {
        Err(AppError::database("connection reset"))
    }
}

/// User store holding one account whose stored hash is not a PHC string.
#[derive(Debug)]
struct CorruptHashStore {
    user: User,
}

impl CorruptHashStore {
    fn new(email: &str) -> Self {
        Self {
            user: User {
                id: UserId::new(),
                email: email.to_string(),
                username: None,
                first_name: None,
                last_name: None,
                password_hash: "plaintext-left-by-a-bad-import".to_string(),
                created_at: chrono::Utc::now(),
            },
        }
    }
}

#[async_trait]
impl UserStore for CorruptHashStore {
    type User = User;
    type NewUser = NewUser;

    async fn save(&self, _user: &NewUser) -> AppResult<UserId> {
        Err(AppError::database("read-only"))
    }
    async fn find_by_email(&self, email: &str) -> AppResult<User> {
        if email == self.user.email {
            Ok(self.user.clone())
        } else {
            Err(AppError::not_found("user not found"))
        }
    }
}

/// User store that never answers.
#[derive(Debug)]
struct HungStore;

#[async_trait]
impl UserStore for HungStore {
    type User = User;
    type NewUser = NewUser;

    async fn save(&self, _user: &NewUser) -> AppResult<UserId> {
        std::future::pending().await
    }
    async fn find_by_email(&self, _email: &str) -> AppResult<User> {
        std::future::pending().await
    }
}

// ── Harness ────────────────────────────────────────────────

struct Harness {
    service: AuthService,
    cache: CacheManager,
    broker: Arc<MemoryBroker>,
    publisher: EventPublisher,
    /// Held but never run when the worker is not spawned.
    _idle_worker: Option<PublishWorker>,
    _worker_cancel: CancellationToken,
}

struct Options {
    users: DynUserStore,
    cache: Arc<dyn CacheProvider>,
    events: EventsConfig,
    auth: AuthConfig,
    spawn_worker: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            users: Arc::new(MemoryUserStore::new()),
            cache: Arc::new(MemoryCacheProvider::new(&MemoryCacheConfig {
                max_capacity: 1000,
            })),
            events: EventsConfig::default(),
            auth: AuthConfig {
                jwt_secret: "integration-secret".into(),
                dependency_timeout_ms: 500,
                ..AuthConfig::default()
            },
            spawn_worker: true,
        }
    }
}

fn fast_password_config() -> PasswordConfig {
    PasswordConfig {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    }
}

fn harness(opts: Options) -> Harness {
    let cache = CacheManager::from_provider(opts.cache);
    let broker = Arc::new(MemoryBroker::new());
    let (publisher, worker) = EventPublisher::new(&opts.events, broker.clone());
    let worker_cancel = CancellationToken::new();
    let idle_worker = if opts.spawn_worker {
        worker.spawn(worker_cancel.clone());
        None
    } else {
        Some(worker)
    };

    let service = AuthService::new(
        opts.users,
        CredentialVerifier::new(&fast_password_config()).unwrap(),
        Arc::new(TokenService::new(&opts.auth).unwrap()),
        SessionCache::new(cache.clone()),
        publisher.clone(),
        &opts.auth,
    );

    Harness {
        service,
        cache,
        broker,
        publisher,
        _idle_worker: idle_worker,
        _worker_cancel: worker_cancel,
    }
}

fn ctx() -> RequestContext {
    RequestContext::background()
}

// ── Register ───────────────────────────────────────────────

#[tokio::test]
async fn test_register_returns_unique_ids() {
    let h = harness(Options::default());

    let a = h
        .service
        .register(&ctx(), "a@test.com", "secret", UserProfile::default())
        .await
        .unwrap();
    let b = h
        .service
        .register(&ctx(), "b@test.com", "secret", UserProfile::default())
        .await
        .unwrap();

    assert_ne!(a, b);
}

#[tokio::test]
async fn test_register_same_email_twice_fails_with_email_exists() {
    let h = harness(Options::default());
    h.service
        .register(&ctx(), "a@test.com", "secret", UserProfile::default())
        .await
        .unwrap();

    let err = h
        .service
        .register(&ctx(), "  A@TEST.com", "other", UserProfile::default())
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::EmailExists));
}

#[tokio::test]
async fn test_register_taken_username_fails_with_username_exists() {
    let h = harness(Options::default());
    let profile = UserProfile {
        username: Some("alice".into()),
        ..UserProfile::default()
    };
    h.service
        .register(&ctx(), "a@test.com", "secret", profile.clone())
        .await
        .unwrap();

    let err = h
        .service
        .register(&ctx(), "b@test.com", "secret", profile)
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::UsernameExists));
}

#[tokio::test]
async fn test_register_store_failure_is_internal() {
    let h = harness(Options {
        users: Arc::new(BrokenStore),
        ..Options::default()
    });

    let err = h
        .service
        .register(&ctx(), "a@test.com", "secret", UserProfile::default())
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::Internal));
}

#[tokio::test]
async fn test_register_publishes_user_created_event() {
    let h = harness(Options::default());
    let mut reports = h.publisher.subscribe_reports();

    let profile = UserProfile {
        username: Some("alice".into()),
        ..UserProfile::default()
    };
    let id = h
        .service
        .register(&ctx(), "alice@test.com", "secret", profile)
        .await
        .unwrap();

    let report = tokio::time::timeout(Duration::from_secs(5), reports.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(report.outcome, DeliveryOutcome::Delivered);
    assert_eq!(report.topic, "user-created");

    let messages = h.broker.messages().await;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].key, "alice");
    let event: UserCreatedEvent = serde_json::from_slice(&messages[0].payload).unwrap();
    assert_eq!(event.user_id, id);
    assert_eq!(event.email, "alice@test.com");
    assert_eq!(event.event_id, report.event_id);
}

#[tokio::test]
async fn test_register_succeeds_when_event_queue_is_full() {
    let h = harness(Options {
        events: EventsConfig {
            queue_capacity: 1,
            ..EventsConfig::default()
        },
        spawn_worker: false,
        ..Options::default()
    });

    for email in ["a@test.com", "b@test.com", "c@test.com"] {
        h.service
            .register(&ctx(), email, "secret", UserProfile::default())
            .await
            .unwrap();
    }
    assert!(h.broker.messages().await.is_empty());
}

#[tokio::test]
async fn test_failed_registration_publishes_nothing() {
    let h = harness(Options::default());
    h.service
        .register(&ctx(), "a@test.com", "secret", UserProfile::default())
        .await
        .unwrap();
    let _ = h
        .service
        .register(&ctx(), "a@test.com", "secret", UserProfile::default())
        .await;

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(h.broker.messages().await.len(), 1);
}

// ── Login ──────────────────────────────────────────────────

#[tokio::test]
async fn test_login_issues_token_for_registered_user() {
    let recorder = Arc::new(RecordingCache::new());
    let h = harness(Options {
        cache: recorder.clone(),
        ..Options::default()
    });
    let id = h
        .service
        .register(&ctx(), "a@test.com", "secret", UserProfile::default())
        .await
        .unwrap();

    let before_login_ms = chrono::Utc::now().timestamp_millis();
    let issued = h
        .service
        .login(&ctx(), "A@test.com ", "secret")
        .await
        .unwrap();

    assert_eq!(issued.user_id, id);
    assert_eq!(h.service.validate_token(&issued.token), Some(id));

    let writes = recorder.writes();
    assert_eq!(writes.len(), 1);
    let (key, value, ttl) = &writes[0];
    assert_eq!(key, &format!("token:{}", issued.token));
    assert_eq!(value, &id.to_string());
    assert!(before_login_ms + ttl.as_millis() as i64 <= issued.expires_at.timestamp_millis());
    assert!(!ttl.is_zero());
}

#[tokio::test]
async fn test_login_wrong_password_is_invalid_credentials_without_cache_write() {
    let recorder = Arc::new(RecordingCache::new());
    let h = harness(Options {
        cache: recorder.clone(),
        ..Options::default()
    });
    h.service
        .register(&ctx(), "a@test.com", "secret", UserProfile::default())
        .await
        .unwrap();

    let err = h
        .service
        .login(&ctx(), "a@test.com", "wrong")
        .await
        .unwrap_err();

    assert!(err.is(ErrorKind::InvalidCredentials));
    assert!(recorder.writes().is_empty());
}

#[tokio::test]
async fn test_login_unknown_email_is_indistinguishable_from_wrong_password() {
    let h = harness(Options::default());
    h.service
        .register(&ctx(), "a@test.com", "secret", UserProfile::default())
        .await
        .unwrap();

    let unknown = h
        .service
        .login(&ctx(), "ghost@test.com", "secret")
        .await
        .unwrap_err();
    let wrong = h
        .service
        .login(&ctx(), "a@test.com", "nope")
        .await
        .unwrap_err();

    assert!(unknown.is(ErrorKind::InvalidCredentials));
    assert!(!unknown.is(ErrorKind::NotFound));
    assert_eq!(unknown.message, wrong.message);
}

#[tokio::test]
async fn test_login_succeeds_while_cache_is_down() {
    let users: DynUserStore = Arc::new(MemoryUserStore::new());
    let seeded = harness(Options {
        users: users.clone(),
        ..Options::default()
    });
    let id = seeded
        .service
        .register(&ctx(), "a@test.com", "secret", UserProfile::default())
        .await
        .unwrap();

    let h = harness(Options {
        users,
        cache: Arc::new(DownCache),
        ..Options::default()
    });
    let issued = h
        .service
        .login(&ctx(), "a@test.com", "secret")
        .await
        .unwrap();

    assert_eq!(h.service.validate_token(&issued.token), Some(id));
}

#[tokio::test]
async fn test_login_with_malformed_stored_hash_is_internal() {
    let recorder = Arc::new(RecordingCache::new());
    let h = harness(Options {
        users: Arc::new(CorruptHashStore::new("a@test.com")),
        cache: recorder.clone(),
        ..Options::default()
    });

    let err = h
        .service
        .login(&ctx(), "a@test.com", "secret")
        .await
        .unwrap_err();

    assert!(err.is(ErrorKind::Internal));
    assert!(recorder.writes().is_empty());
}

#[tokio::test]
async fn test_login_store_failure_is_internal() {
    let h = harness(Options {
        users: Arc::new(BrokenStore),
        ..Options::default()
    });
    let err = h
        .service
        .login(&ctx(), "a@test.com", "secret")
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::Internal));
}

#[tokio::test]
async fn test_hung_store_times_out_as_internal() {
    let h = harness(Options {
        users: Arc::new(HungStore),
        auth: AuthConfig {
            dependency_timeout_ms: 50,
            ..Options::default().auth
        },
        ..Options::default()
    });

    let err = h
        .service
        .login(&ctx(), "a@test.com", "secret")
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::Internal));
    let source = std::error::Error::source(&err).unwrap().to_string();
    assert!(source.contains("timed out"));
}

// ── Logout & validation ────────────────────────────────────

#[tokio::test]
async fn test_logout_revokes_session_but_token_stays_cryptographically_valid() {
    let h = harness(Options::default());
    let u1 = h
        .service
        .register(&ctx(), "a@test.com", "secret", UserProfile::default())
        .await
        .unwrap();
    let t = h
        .service
        .login(&ctx(), "a@test.com", "secret")
        .await
        .unwrap()
        .token;

    assert_eq!(h.service.validate_token(&t), Some(u1));
    assert_eq!(h.service.validate_session(&ctx(), &t).await.unwrap(), Some(u1));

    h.service.logout(&ctx(), &t).await.unwrap();

    // The session record is gone...
    assert_eq!(h.cache.get(&format!("token:{t}")).await.unwrap(), None);
    // ...and the revocation-aware check rejects the token...
    assert_eq!(h.service.validate_session(&ctx(), &t).await.unwrap(), None);
    // ...but the signed token itself remains valid until it expires.
    assert_eq!(h.service.validate_token(&t), Some(u1));
}

#[tokio::test]
async fn test_logout_is_idempotent() {
    let h = harness(Options::default());
    h.service
        .register(&ctx(), "a@test.com", "secret", UserProfile::default())
        .await
        .unwrap();
    let t = h
        .service
        .login(&ctx(), "a@test.com", "secret")
        .await
        .unwrap()
        .token;

    h.service.logout(&ctx(), &t).await.unwrap();
    h.service.logout(&ctx(), &t).await.unwrap();
    h.service.logout(&ctx(), "never-issued").await.unwrap();
}

#[tokio::test]
async fn test_logout_surfaces_cache_failure_as_internal() {
    let h = harness(Options {
        cache: Arc::new(DownCache),
        ..Options::default()
    });

    let err = h.service.logout(&ctx(), "some-token").await.unwrap_err();
    assert!(err.is(ErrorKind::Internal));
}

#[tokio::test]
async fn test_validate_token_rejects_garbage_and_foreign_tokens() {
    let h = harness(Options::default());
    assert_eq!(h.service.validate_token("not-a-token"), None);

    let foreign = TokenService::new(&AuthConfig {
        jwt_secret: "someone-else".into(),
        ..AuthConfig::default()
    })
    .unwrap()
    .issue(UserId::new(), "a@test.com")
    .unwrap();
    assert_eq!(h.service.validate_token(&foreign.token), None);
    assert_eq!(
        h.service
            .validate_session(&ctx(), &foreign.token)
            .await
            .unwrap(),
        None
    );
}

// ── Cancellation ───────────────────────────────────────────

#[tokio::test]
async fn test_cancelled_request_is_reported_as_cancelled() {
    let h = harness(Options::default());
    let cancel = CancellationToken::new();
    cancel.cancel();
    let cancelled = RequestContext::new(cancel);

    let err = h
        .service
        .register(&cancelled, "a@test.com", "secret", UserProfile::default())
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::Cancelled));

    let err = h
        .service
        .login(&cancelled, "a@test.com", "secret")
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::Cancelled));

    let err = h.service.logout(&cancelled, "t").await.unwrap_err();
    assert!(err.is(ErrorKind::Cancelled));
}

#[tokio::test]
async fn test_cancellation_interrupts_hung_dependency() {
    let h = harness(Options {
        users: Arc::new(HungStore),
        auth: AuthConfig {
            dependency_timeout_ms: 60_000,
            ..Options::default().auth
        },
        ..Options::default()
    });
    let cancel = CancellationToken::new();
    let request = RequestContext::new(cancel.clone());

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();
    });

    let err = h
        .service
        .login(&request, "a@test.com", "secret")
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::Cancelled));
}
