//! Background Maintenance
//!
//! Periodic sweeps that remove expired refresh tokens, CSRF tokens and
//! stale lockout entries. Expiry is already enforced lazily at every read;
//! the sweeps only bound memory growth from entries nobody touches again.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::domain::repository::{CsrfTokenStore, LockoutStore, RefreshTokenStore};

/// Sweep cadence per concern
#[derive(Debug, Clone)]
pub struct SweepIntervals {
    pub refresh: Duration,
    pub csrf: Duration,
    pub lockout: Duration,
}

impl Default for SweepIntervals {
    fn default() -> Self {
        Self {
            refresh: Duration::from_secs(3600),
            csrf: Duration::from_secs(3600),
            lockout: Duration::from_secs(15 * 60),
        }
    }
}

/// Spawn one background sweeper per concern; the handles are returned so
/// a server can abort them on shutdown.
pub fn spawn_sweepers<S>(store: Arc<S>, intervals: SweepIntervals) -> Vec<JoinHandle<()>>
where
    S: RefreshTokenStore + CsrfTokenStore + LockoutStore + Send + Sync + 'static,
{
    let refresh_store = Arc::clone(&store);
    let refresh_handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(intervals.refresh);
        ticker.tick().await; // first tick fires immediately
        loop {
            ticker.tick().await;
            match RefreshTokenStore::cleanup_expired(refresh_store.as_ref()).await {
                Ok(deleted) if deleted > 0 => {
                    tracing::debug!(deleted, "Swept expired refresh tokens");
                }
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "Refresh token sweep failed"),
            }
        }
    });

    let csrf_store = Arc::clone(&store);
    let csrf_handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(intervals.csrf);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match CsrfTokenStore::cleanup_expired(csrf_store.as_ref()).await {
                Ok(deleted) if deleted > 0 => {
                    tracing::debug!(deleted, "Swept expired CSRF tokens");
                }
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "CSRF token sweep failed"),
            }
        }
    });

    let lockout_handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(intervals.lockout);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match LockoutStore::cleanup_expired(store.as_ref()).await {
                Ok(deleted) if deleted > 0 => {
                    tracing::debug!(deleted, "Swept stale lockout entries");
                }
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "Lockout sweep failed"),
            }
        }
    });

    vec![refresh_handle, csrf_handle, lockout_handle]
}
