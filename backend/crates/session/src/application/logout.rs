//! Logout Use Case
//!
//! Revokes the presented refresh token, or every token of an identity for
//! the logout-everywhere case. Logout is idempotent: an already revoked or
//! unknown token is not an error.

use std::sync::Arc;

use kernel::id::IdentityId;

use crate::domain::repository::RefreshTokenStore;
use crate::error::SessionResult;

/// Logout use case
pub struct LogoutUseCase<S>
where
    S: RefreshTokenStore,
{
    store: Arc<S>,
}

impl<S> LogoutUseCase<S>
where
    S: RefreshTokenStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Revoke one refresh token (single-device logout)
    pub async fn execute(&self, refresh_token: &str) -> SessionResult<()> {
        self.store.revoke(refresh_token).await?;
        tracing::debug!("Refresh token revoked on logout");
        Ok(())
    }

    /// Revoke every refresh token for an identity (logout everywhere);
    /// returns how many live tokens were removed
    pub async fn execute_all(&self, identity_id: &IdentityId) -> SessionResult<u64> {
        let revoked = self.store.revoke_all(identity_id).await?;
        tracing::info!(
            identity_id = %identity_id,
            revoked,
            "All refresh tokens revoked for identity"
        );
        Ok(revoked)
    }
}
