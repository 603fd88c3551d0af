//! Register, login, logout, and token validation.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use keyward_auth::jwt::{IssuedToken, TokenService};
use keyward_auth::password::CredentialVerifier;
use keyward_auth::session::SessionCache;
use keyward_core::config::AuthConfig;
use keyward_core::error::{AppError, ErrorKind};
use keyward_core::events::UserCreatedEvent;
use keyward_core::result::AppResult;
use keyward_core::traits::UserStore;
use keyward_core::types::UserId;
use keyward_entity::user::model::normalize_email;
use keyward_entity::user::{NewUser, User, UserProfile};
use keyward_events::EventPublisher;

use super::guard::{bounded, cancellable, reclassify, reclassify_except};
use crate::context::RequestContext;

/// Shared handle to the configured user store.
pub type DynUserStore = Arc<dyn UserStore<User = User, NewUser = NewUser>>;

/// The authentication orchestrator.
///
/// Holds no mutable state: all state lives in the user store and the
/// session cache, so clones can serve requests concurrently.
#[derive(Debug, Clone)]
pub struct AuthService {
    /// User store.
    users: DynUserStore,
    /// Password hasher.
    verifier: CredentialVerifier,
    /// Token issuer and validator.
    tokens: Arc<TokenService>,
    /// Session records for revocation.
    sessions: SessionCache,
    /// User-created event queue.
    events: EventPublisher,
    /// Deadline for each store and cache call.
    dependency_timeout: Duration,
}

impl AuthService {
    /// Creates a new auth service.
    pub fn new(
        users: DynUserStore,
        verifier: CredentialVerifier,
        tokens: Arc<TokenService>,
        sessions: SessionCache,
        events: EventPublisher,
        config: &AuthConfig,
    ) -> Self {
        Self {
            users,
            verifier,
            tokens,
            sessions,
            events,
            dependency_timeout: Duration::from_millis(config.dependency_timeout_ms),
        }
    }

    /// Registers a new user and returns its ID.
    ///
    /// Fails with `EmailExists` / `UsernameExists` on a uniqueness
    /// violation and `Internal` on any other store failure. The
    /// user-created event is enqueued after the user is saved; failing to
    /// enqueue it is logged and does not fail registration.
    pub async fn register(
        &self,
        ctx: &RequestContext,
        email: &str,
        password: &str,
        profile: UserProfile,
    ) -> AppResult<UserId> {
        let password_hash = cancellable(
            ctx,
            "password hashing",
            self.verifier.hash_blocking(password.to_string()),
        )
        .await
        .map_err(|e| reclassify(e, "failed to hash password"))?;

        let new_user = NewUser::new(email, password_hash, profile);

        let user_id = bounded(
            ctx,
            self.dependency_timeout,
            "user store save",
            self.users.save(&new_user),
        )
        .await
        .map_err(|e| {
            reclassify_except(
                e,
                &[ErrorKind::EmailExists, ErrorKind::UsernameExists],
                "failed to save user",
            )
        })?;

        info!(user_id = %user_id, request_id = %ctx.request_id, "User registered");

        let event = UserCreatedEvent::new(user_id, new_user.profile.username, new_user.email);
        if let Err(e) = self.events.publish(&event) {
            warn!(user_id = %user_id, error = %e, "Failed to enqueue user-created event");
        }

        Ok(user_id)
    }

    /// Authenticates a user and issues a token.
    ///
    /// Unknown email and wrong password both fail with
    /// `InvalidCredentials`, after comparable hashing work. The session
    /// record is written best-effort: a cache outage leaves the token
    /// valid but not revocable.
    pub async fn login(
        &self,
        ctx: &RequestContext,
        email: &str,
        password: &str,
    ) -> AppResult<IssuedToken> {
        let email = normalize_email(email);

        let lookup = bounded(
            ctx,
            self.dependency_timeout,
            "user lookup",
            self.users.find_by_email(&email),
        )
        .await;

        let user = match lookup {
            Ok(user) => user,
            Err(e) if e.is(ErrorKind::NotFound) => {
                cancellable(ctx, "password verification", async {
                    self.verifier
                        .verify_dummy_blocking(password.to_string())
                        .await;
                    Ok(())
                })
                .await?;
                debug!(request_id = %ctx.request_id, "Login rejected: unknown email");
                return Err(AppError::invalid_credentials());
            }
            Err(e) => return Err(reclassify_except(e, &[], "failed to look up user")),
        };

        let matched = cancellable(
            ctx,
            "password verification",
            self.verifier
                .verify_blocking(user.password_hash.clone(), password.to_string()),
        )
        .await
        .map_err(|e| reclassify(e, "failed to verify password"))?;

        if !matched {
            info!(user_id = %user.id, "Login rejected: wrong password");
            return Err(AppError::invalid_credentials());
        }

        let issued = self.tokens.issue(user.id, &user.email)?;

        let recorded = bounded(ctx, self.dependency_timeout, "session store", async {
            self.sessions
                .store(&issued.token, issued.user_id, issued.ttl)
                .await;
            Ok(())
        })
        .await;
        match recorded {
            Ok(()) => {}
            Err(e) if e.is(ErrorKind::Cancelled) => return Err(e),
            Err(e) => warn!(user_id = %user.id, error = %e, "Session record not written"),
        }

        info!(user_id = %user.id, expires_at = %issued.expires_at, "Login succeeded");
        Ok(issued)
    }

    /// Revokes the session recorded for `token`.
    ///
    /// Succeeds when no record exists. Fails with `Internal` if the cache
    /// cannot be updated, since the session would remain revocable but
    /// not revoked.
    pub async fn logout(&self, ctx: &RequestContext, token: &str) -> AppResult<()> {
        bounded(
            ctx,
            self.dependency_timeout,
            "session removal",
            self.sessions.remove(token.trim()),
        )
        .await
        .map_err(|e| reclassify_except(e, &[], "failed to revoke session"))?;

        debug!(request_id = %ctx.request_id, "Session revoked");
        Ok(())
    }

    /// Returns the subject of a validly signed, unexpired token.
    ///
    /// Purely cryptographic: the session cache is not consulted, so a
    /// logged-out token stays valid here until it expires.
    pub fn validate_token(&self, token: &str) -> Option<UserId> {
        self.tokens.validate(token)
    }

    /// Like [`validate_token`](Self::validate_token), but also requires a
    /// live session record, so logged-out tokens are rejected.
    pub async fn validate_session(
        &self,
        ctx: &RequestContext,
        token: &str,
    ) -> AppResult<Option<UserId>> {
        let Some(user_id) = self.tokens.validate(token) else {
            return Ok(None);
        };

        let live = bounded(
            ctx,
            self.dependency_timeout,
            "session lookup",
            self.sessions.contains(token.trim()),
        )
        .await
        .map_err(|e| reclassify_except(e, &[], "failed to check session"))?;

        Ok(live.then_some(user_id))
    }
}
