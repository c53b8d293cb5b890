//! Login Use Case
//!
//! Authenticates an identity and issues a token pair. The throttle gate
//! runs before anything touches the identity store; unknown-email and
//! wrong-password attempts are indistinguishable in both response and
//! timing.

use std::sync::Arc;

use chrono::Utc;
use platform::password::{ClearTextPassword, HashedPassword, dummy_hash};

use crate::application::config::SessionConfig;
use crate::domain::access_token::{self, AccessClaims};
use crate::domain::entity::{IdentityClaims, RefreshTokenEntry};
use crate::domain::repository::{IdentityStore, LockoutStore, RefreshTokenStore};
use crate::error::{SessionError, SessionResult};

/// Login input
pub struct LoginInput {
    /// Login email
    pub email: String,
    /// Clear-text password
    pub password: String,
    /// Throttle identifier (client IP or pre-auth identifier)
    pub throttle_key: String,
}

/// Login output
pub struct LoginOutput {
    /// Claims of the authenticated identity
    pub identity: IdentityClaims,
    /// Signed access token for the HttpOnly cookie
    pub access_token: String,
    /// Raw refresh token; this is the only copy outside the store
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub access_token_expires_in: u64,
}

/// Login use case
pub struct LoginUseCase<I, S>
where
    I: IdentityStore,
    S: RefreshTokenStore + LockoutStore,
{
    identities: Arc<I>,
    store: Arc<S>,
    config: Arc<SessionConfig>,
}

impl<I, S> LoginUseCase<I, S>
where
    I: IdentityStore,
    S: RefreshTokenStore + LockoutStore,
{
    pub fn new(identities: Arc<I>, store: Arc<S>, config: Arc<SessionConfig>) -> Self {
        Self {
            identities,
            store,
            config,
        }
    }

    pub async fn execute(&self, input: LoginInput) -> SessionResult<LoginOutput> {
        let now = Utc::now();

        // Throttle gate: short-circuit before the identity store is touched
        if let Some(entry) = LockoutStore::check(self.store.as_ref(), &input.throttle_key).await? {
            if entry.is_locked(now) {
                return Err(SessionError::AccountLocked {
                    retry_after_secs: entry.retry_after_secs(now),
                });
            }
        }

        let identity = self.identities.find_by_email(&input.email).await?;

        // Unknown emails verify against a fixed dummy hash so the Argon2
        // work (and therefore response timing) is identical either way.
        let (hash, known): (HashedPassword, bool) = match &identity {
            Some(identity) => (identity.password_hash.clone(), true),
            None => (dummy_hash().clone(), false),
        };

        let password = match ClearTextPassword::new(input.password) {
            Ok(p) => p,
            Err(_) => {
                return self.fail_attempt(&input.throttle_key, &input.email).await;
            }
        };

        let pepper = self.config.password_pepper.clone();
        let password_valid =
            tokio::task::spawn_blocking(move || hash.verify(&password, pepper.as_deref()))
                .await
                .map_err(|e| SessionError::Internal(format!("Password verify task: {e}")))?;

        if !known || !password_valid {
            return self.fail_attempt(&input.throttle_key, &input.email).await;
        }

        let Some(identity) = identity else {
            return Err(SessionError::InvalidCredentials);
        };

        if !identity.can_login() {
            return Err(SessionError::AccountDisabled);
        }

        // Success: clear the failure counter and record the login
        LockoutStore::reset(self.store.as_ref(), &input.throttle_key).await?;
        self.identities
            .update_last_login(&identity.identity_id)
            .await?;

        let claims = identity.claims();

        let access_claims = AccessClaims::new(
            &claims,
            &self.config.issuer,
            self.config.access_token_ttl_chrono(),
            now,
        );
        let access_token = access_token::sign(&access_claims, &self.config.token_secret)
            .map_err(|e| SessionError::Internal(format!("Access token signing: {e}")))?;

        let entry = RefreshTokenEntry::issue(
            claims.identity_id,
            self.config.refresh_token_ttl_chrono(),
        );
        let refresh_token = entry.token.clone();
        RefreshTokenStore::insert(self.store.as_ref(), entry).await?;

        tracing::info!(
            identity_id = %claims.identity_id,
            role = claims.role.code(),
            "Identity signed in"
        );

        Ok(LoginOutput {
            identity: claims,
            access_token,
            refresh_token,
            access_token_expires_in: self.config.access_token_ttl_secs(),
        })
    }

    /// Record a throttle failure and return the uniform credentials error
    async fn fail_attempt(&self, throttle_key: &str, email: &str) -> SessionResult<LoginOutput> {
        let entry = LockoutStore::record_failure(self.store.as_ref(), throttle_key).await?;

        if entry.locked_until.is_some() {
            tracing::warn!(
                throttle_key,
                attempts = entry.attempts,
                "Login throttle locked identifier"
            );
        } else {
            tracing::debug!(
                throttle_key,
                attempts = entry.attempts,
                email_domain = email.rsplit('@').next().unwrap_or(""),
                "Failed login attempt recorded"
            );
        }

        Err(SessionError::InvalidCredentials)
    }
}
