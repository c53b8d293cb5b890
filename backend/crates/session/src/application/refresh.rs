//! Refresh Use Case
//!
//! Rotates a refresh token: the presented value is consumed atomically and
//! a replacement bound to the same identity is issued together with a fresh
//! access token. A raw value rotates at most once; replaying an already
//! consumed value revokes every token of the identity.

use std::sync::Arc;

use chrono::Utc;

use crate::application::config::SessionConfig;
use crate::domain::access_token::{self, AccessClaims};
use crate::domain::entity::RefreshTokenEntry;
use crate::domain::repository::{ConsumeOutcome, IdentityStore, RefreshTokenStore};
use crate::error::{SessionError, SessionResult};

/// Refresh output
pub struct RefreshOutput {
    /// Fresh signed access token
    pub access_token: String,
    /// Replacement refresh token
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub access_token_expires_in: u64,
}

/// Refresh (rotation) use case
pub struct RefreshUseCase<I, S>
where
    I: IdentityStore,
    S: RefreshTokenStore,
{
    identities: Arc<I>,
    store: Arc<S>,
    config: Arc<SessionConfig>,
}

impl<I, S> RefreshUseCase<I, S>
where
    I: IdentityStore,
    S: RefreshTokenStore,
{
    pub fn new(identities: Arc<I>, store: Arc<S>, config: Arc<SessionConfig>) -> Self {
        Self {
            identities,
            store,
            config,
        }
    }

    pub async fn execute(&self, old_token: &str) -> SessionResult<RefreshOutput> {
        let entry = match self.store.consume(old_token).await? {
            ConsumeOutcome::Active(entry) => entry,
            ConsumeOutcome::Missing => return Err(SessionError::InvalidToken),
            ConsumeOutcome::Replayed { identity_id } => {
                // A consumed value coming back signals possible token theft:
                // invalidate the whole family.
                let revoked = self.store.revoke_all(&identity_id).await?;
                tracing::warn!(
                    identity_id = %identity_id,
                    revoked,
                    "Rotated refresh token replayed; revoked all tokens for identity"
                );
                return Err(SessionError::InvalidToken);
            }
        };

        // Re-load the identity so rotation picks up role changes and
        // catches accounts disabled since login.
        let identity = match self.identities.find_by_id(&entry.identity_id).await? {
            Some(identity) => identity,
            None => {
                self.store.revoke_all(&entry.identity_id).await?;
                return Err(SessionError::InvalidToken);
            }
        };

        if !identity.can_login() {
            self.store.revoke_all(&entry.identity_id).await?;
            return Err(SessionError::AccountDisabled);
        }

        let claims = identity.claims();

        let new_entry = RefreshTokenEntry::issue(
            claims.identity_id,
            self.config.refresh_token_ttl_chrono(),
        );
        let refresh_token = new_entry.token.clone();
        self.store.insert(new_entry).await?;

        let access_claims = AccessClaims::new(
            &claims,
            &self.config.issuer,
            self.config.access_token_ttl_chrono(),
            Utc::now(),
        );
        let access_token = access_token::sign(&access_claims, &self.config.token_secret)
            .map_err(|e| SessionError::Internal(format!("Access token signing: {e}")))?;

        tracing::debug!(identity_id = %claims.identity_id, "Refresh token rotated");

        Ok(RefreshOutput {
            access_token,
            refresh_token,
            access_token_expires_in: self.config.access_token_ttl_secs(),
        })
    }
}
