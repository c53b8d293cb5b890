//! In-Memory Session Store
//!
//! One process-local store backing all three session concerns: refresh
//! tokens, CSRF token sets and lockout counters. Each concern sits behind
//! its own async mutex, and every read-modify-write happens inside a
//! single lock acquisition, which is what makes `consume` and
//! `record_failure` atomic.
//!
//! Consumed refresh tokens leave a tombstone behind until the original
//! expiry, so a replayed rotation is distinguishable from a token that
//! never existed.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use kernel::id::IdentityId;
use tokio::sync::Mutex;

use crate::domain::entity::{LockoutEntry, LockoutPolicy, RefreshTokenEntry};
use crate::domain::repository::{
    ConsumeOutcome, CsrfTokenStore, LockoutStore, RefreshTokenStore,
};
use crate::error::SessionResult;

/// Record of a consumed refresh token, kept until the token would have
/// expired anyway
#[derive(Debug, Clone)]
struct Tombstone {
    identity_id: IdentityId,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct RefreshMaps {
    /// Live tokens by raw value
    active: HashMap<String, RefreshTokenEntry>,
    /// Consumed tokens by raw value
    consumed: HashMap<String, Tombstone>,
}

/// One issued CSRF token with its own expiry
#[derive(Debug, Clone)]
struct CsrfSlot {
    token: String,
    expires_at: DateTime<Utc>,
}

#[derive(Debug)]
struct Inner {
    refresh: Mutex<RefreshMaps>,
    csrf: Mutex<HashMap<String, Vec<CsrfSlot>>>,
    lockouts: Mutex<HashMap<String, LockoutEntry>>,
    lockout_policy: LockoutPolicy,
}

/// In-memory session store; cheap to clone, clones share state
#[derive(Debug, Clone)]
pub struct MemorySessionStore {
    inner: Arc<Inner>,
}

impl MemorySessionStore {
    pub fn new(lockout_policy: LockoutPolicy) -> Self {
        Self {
            inner: Arc::new(Inner {
                refresh: Mutex::new(RefreshMaps::default()),
                csrf: Mutex::new(HashMap::new()),
                lockouts: Mutex::new(HashMap::new()),
                lockout_policy,
            }),
        }
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new(LockoutPolicy::default())
    }
}

impl RefreshTokenStore for MemorySessionStore {
    async fn insert(&self, entry: RefreshTokenEntry) -> SessionResult<()> {
        let mut maps = self.inner.refresh.lock().await;
        maps.active.insert(entry.token.clone(), entry);
        Ok(())
    }

    async fn consume(&self, token: &str) -> SessionResult<ConsumeOutcome> {
        let now = Utc::now();
        let mut maps = self.inner.refresh.lock().await;

        if let Some(entry) = maps.active.remove(token) {
            if entry.is_expired(now) {
                return Ok(ConsumeOutcome::Missing);
            }
            maps.consumed.insert(
                token.to_string(),
                Tombstone {
                    identity_id: entry.identity_id,
                    expires_at: entry.expires_at,
                },
            );
            return Ok(ConsumeOutcome::Active(entry));
        }

        match maps.consumed.get(token) {
            Some(tombstone) if now <= tombstone.expires_at => Ok(ConsumeOutcome::Replayed {
                identity_id: tombstone.identity_id,
            }),
            Some(_) => {
                maps.consumed.remove(token);
                Ok(ConsumeOutcome::Missing)
            }
            None => Ok(ConsumeOutcome::Missing),
        }
    }

    async fn revoke(&self, token: &str) -> SessionResult<()> {
        let mut maps = self.inner.refresh.lock().await;
        maps.active.remove(token);
        Ok(())
    }

    async fn revoke_all(&self, identity_id: &IdentityId) -> SessionResult<u64> {
        let mut maps = self.inner.refresh.lock().await;
        let before = maps.active.len();
        maps.active.retain(|_, entry| entry.identity_id != *identity_id);
        let revoked = (before - maps.active.len()) as u64;

        // Drop the identity's tombstones too; with no live tokens left
        // there is nothing further for a replay to protect.
        maps.consumed
            .retain(|_, tombstone| tombstone.identity_id != *identity_id);

        Ok(revoked)
    }

    async fn live_count(&self, identity_id: &IdentityId) -> SessionResult<usize> {
        let now = Utc::now();
        let maps = self.inner.refresh.lock().await;
        Ok(maps
            .active
            .values()
            .filter(|entry| entry.identity_id == *identity_id && !entry.is_expired(now))
            .count())
    }

    async fn cleanup_expired(&self) -> SessionResult<u64> {
        let now = Utc::now();
        let mut maps = self.inner.refresh.lock().await;
        let before = maps.active.len() + maps.consumed.len();
        maps.active.retain(|_, entry| !entry.is_expired(now));
        maps.consumed.retain(|_, tombstone| now <= tombstone.expires_at);
        Ok((before - maps.active.len() - maps.consumed.len()) as u64)
    }
}

impl CsrfTokenStore for MemorySessionStore {
    async fn insert(
        &self,
        session_key: &str,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> SessionResult<()> {
        let mut csrf = self.inner.csrf.lock().await;
        csrf.entry(session_key.to_string())
            .or_default()
            .push(CsrfSlot {
                token: token.to_string(),
                expires_at,
            });
        Ok(())
    }

    async fn contains(&self, session_key: &str, token: &str) -> SessionResult<bool> {
        let now = Utc::now();
        let mut csrf = self.inner.csrf.lock().await;
        let Some(slots) = csrf.get_mut(session_key) else {
            return Ok(false);
        };
        // Lazily drop expired slots for this key while we are here
        slots.retain(|slot| now <= slot.expires_at);
        let found = slots.iter().any(|slot| slot.token == token);
        if slots.is_empty() {
            csrf.remove(session_key);
        }
        Ok(found)
    }

    async fn cleanup_expired(&self) -> SessionResult<u64> {
        let now = Utc::now();
        let mut csrf = self.inner.csrf.lock().await;
        let mut removed = 0u64;
        csrf.retain(|_, slots| {
            let before = slots.len();
            slots.retain(|slot| now <= slot.expires_at);
            removed += (before - slots.len()) as u64;
            !slots.is_empty()
        });
        Ok(removed)
    }
}

impl LockoutStore for MemorySessionStore {
    async fn record_failure(&self, key: &str) -> SessionResult<LockoutEntry> {
        let now = Utc::now();
        let policy = &self.inner.lockout_policy;
        let mut lockouts = self.inner.lockouts.lock().await;

        let entry = lockouts
            .entry(key.to_string())
            .and_modify(|entry| {
                if entry.is_stale(policy, now) {
                    *entry = LockoutEntry::first_failure(now);
                } else {
                    entry.record_failure(policy, now);
                }
            })
            .or_insert_with(|| LockoutEntry::first_failure(now));

        Ok(entry.clone())
    }

    async fn check(&self, key: &str) -> SessionResult<Option<LockoutEntry>> {
        let now = Utc::now();
        let policy = &self.inner.lockout_policy;
        let mut lockouts = self.inner.lockouts.lock().await;

        match lockouts.get(key) {
            Some(entry) if entry.is_stale(policy, now) => {
                lockouts.remove(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.clone())),
            None => Ok(None),
        }
    }

    async fn reset(&self, key: &str) -> SessionResult<()> {
        let mut lockouts = self.inner.lockouts.lock().await;
        lockouts.remove(key);
        Ok(())
    }

    async fn cleanup_expired(&self) -> SessionResult<u64> {
        let now = Utc::now();
        let policy = &self.inner.lockout_policy;
        let mut lockouts = self.inner.lockouts.lock().await;
        let before = lockouts.len();
        lockouts.retain(|_, entry| !entry.is_stale(policy, now));
        Ok((before - lockouts.len()) as u64)
    }
}
