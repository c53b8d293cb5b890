//! Store Traits
//!
//! Interfaces for the concurrent state this subsystem owns (refresh tokens,
//! CSRF token sets, lockout counters) and for the external identity store.
//! Every read-modify-write below is atomic per call, so an in-memory
//! implementation can be swapped for a distributed store without touching
//! call sites.

use chrono::{DateTime, Utc};
use kernel::id::IdentityId;

use crate::domain::entity::{Identity, LockoutEntry, RefreshTokenEntry};
use crate::error::SessionResult;

/// Result of consuming a refresh token for rotation
#[derive(Debug, Clone)]
pub enum ConsumeOutcome {
    /// The token was live; it has been removed and may be rotated
    Active(RefreshTokenEntry),
    /// The token was already consumed by an earlier rotation - a replay
    Replayed { identity_id: IdentityId },
    /// Unknown or expired token
    Missing,
}

/// Refresh token store trait
///
/// `consume` is the rotation primitive: it removes the live entry and
/// records a tombstone in one atomic step, so concurrent rotations of the
/// same value yield exactly one `Active`.
#[trait_variant::make(RefreshTokenStore: Send)]
pub trait LocalRefreshTokenStore {
    /// Insert a freshly issued entry
    async fn insert(&self, entry: RefreshTokenEntry) -> SessionResult<()>;

    /// Atomically consume a token for rotation
    async fn consume(&self, token: &str) -> SessionResult<ConsumeOutcome>;

    /// Remove one entry (logout); absent tokens are not an error
    async fn revoke(&self, token: &str) -> SessionResult<()>;

    /// Remove every entry for an identity (logout-all / password reset /
    /// replay response); returns the number of live entries removed
    async fn revoke_all(&self, identity_id: &IdentityId) -> SessionResult<u64>;

    /// Number of live entries for an identity
    async fn live_count(&self, identity_id: &IdentityId) -> SessionResult<usize>;

    /// Remove expired entries and tombstones
    async fn cleanup_expired(&self) -> SessionResult<u64>;
}

/// CSRF token store trait
///
/// Tokens are grouped by session key; each stored token carries its own
/// expiry matching the cookie lifetime.
#[trait_variant::make(CsrfTokenStore: Send)]
pub trait LocalCsrfTokenStore {
    /// Add a token to the set for `session_key`
    async fn insert(
        &self,
        session_key: &str,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> SessionResult<()>;

    /// Whether `token` is currently in the set for `session_key`;
    /// lazily drops it when expired
    async fn contains(&self, session_key: &str, token: &str) -> SessionResult<bool>;

    /// Remove expired tokens across all session keys
    async fn cleanup_expired(&self) -> SessionResult<u64>;
}

/// Lockout store trait
#[trait_variant::make(LockoutStore: Send)]
pub trait LocalLockoutStore {
    /// Atomically count one more failure for `key` and return the updated
    /// entry; two concurrent failures are both counted
    async fn record_failure(&self, key: &str) -> SessionResult<LockoutEntry>;

    /// Current entry for `key`, lazily clearing stale state
    async fn check(&self, key: &str) -> SessionResult<Option<LockoutEntry>>;

    /// Clear all state for `key`; called only on successful authentication
    async fn reset(&self, key: &str) -> SessionResult<()>;

    /// Remove stale entries to bound memory growth
    async fn cleanup_expired(&self) -> SessionResult<u64>;
}

/// External identity store (user lookup lives elsewhere)
#[trait_variant::make(IdentityStore: Send)]
pub trait LocalIdentityStore {
    /// Find an identity by login email
    async fn find_by_email(&self, email: &str) -> SessionResult<Option<Identity>>;

    /// Find an identity by id
    async fn find_by_id(&self, identity_id: &IdentityId) -> SessionResult<Option<Identity>>;

    /// Record a successful login
    async fn update_last_login(&self, identity_id: &IdentityId) -> SessionResult<()>;
}
