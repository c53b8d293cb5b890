//! CSRF Guard
//!
//! Stateful double-submit protection. Safe requests are handed a random
//! token that lands in a client-readable cookie; unsafe requests must echo
//! it back in a header, and the echo must both match the cookie copy
//! (constant time) and still be registered server-side for the same
//! session key.

use std::sync::Arc;

use chrono::Utc;
use platform::crypto;

use crate::application::config::SessionConfig;
use crate::domain::repository::CsrfTokenStore;
use crate::error::{SessionError, SessionResult};

/// Bytes of entropy per CSRF token; hex-encoded to 64 characters
const CSRF_TOKEN_BYTES: usize = 32;

/// CSRF double-submit guard
///
/// The store bound lives on the impl block so wrappers holding a
/// `CsrfGuard<C>` do not have to repeat it.
pub struct CsrfGuard<C> {
    store: Arc<C>,
    config: Arc<SessionConfig>,
}

impl<C> CsrfGuard<C>
where
    C: CsrfTokenStore,
{
    pub fn new(store: Arc<C>, config: Arc<SessionConfig>) -> Self {
        Self { store, config }
    }

    /// Mint a fresh token for `session_key` and register it server-side.
    /// The returned value goes into the client-readable cookie.
    pub async fn issue(&self, session_key: &str) -> SessionResult<String> {
        let token = crypto::random_token_hex(CSRF_TOKEN_BYTES);
        let expires_at = Utc::now() + self.config.csrf_token_ttl_chrono();
        self.store.insert(session_key, &token, expires_at).await?;
        Ok(token)
    }

    /// Validate a state-changing request.
    ///
    /// `submitted` is the header value, `cookie` the double-submit cookie.
    /// The three failure variants are distinct for logging; the response
    /// layer collapses them into one uniform 403.
    pub async fn validate(
        &self,
        session_key: &str,
        submitted: Option<&str>,
        cookie: Option<&str>,
    ) -> SessionResult<()> {
        let submitted = match submitted {
            Some(s) if !s.is_empty() => s,
            _ => return Err(SessionError::CsrfMissing),
        };
        let cookie = match cookie {
            Some(c) if !c.is_empty() => c,
            _ => return Err(SessionError::CsrfMissing),
        };

        if !crypto::constant_time_eq(submitted.as_bytes(), cookie.as_bytes()) {
            return Err(SessionError::CsrfMismatch);
        }

        if !self.store.contains(session_key, submitted).await? {
            return Err(SessionError::CsrfInvalid);
        }

        Ok(())
    }
}
