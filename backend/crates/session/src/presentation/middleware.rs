//! HTTP Middleware
//!
//! `require_auth` verifies the access-token cookie statelessly and exposes
//! the caller's claims as a request extension. `csrf_guard` implements
//! stateful double-submit protection: safe requests are handed a token,
//! unsafe requests must echo it back.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderValue, Method, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use kernel::id::IdentityId;
use platform::cookie::{CookieConfig, extract_cookie, set_cookie_header};
use platform::crypto;

use crate::application::config::SessionConfig;
use crate::application::csrf::CsrfGuard;
use crate::domain::access_token;
use crate::domain::entity::IdentityRole;
use crate::domain::repository::CsrfTokenStore;
use crate::error::SessionError;

/// Entropy of the anonymous CSRF session key in bytes
const CSRF_KEY_BYTES: usize = 16;

/// Verified caller identity, inserted by [`require_auth`]
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub identity_id: IdentityId,
    pub email: String,
    pub role: IdentityRole,
}

/// Authentication middleware
///
/// Verifies the access-token cookie without touching any store. All
/// failure modes collapse into the same 401.
pub async fn require_auth(
    State(config): State<Arc<SessionConfig>>,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(token) = extract_cookie(req.headers(), &config.access_cookie_name) else {
        return SessionError::InvalidToken.into_response();
    };

    let claims =
        match access_token::verify(&token, &config.token_secret, &config.issuer, Utc::now()) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::debug!(reason = %e, "Access token rejected");
                return SessionError::InvalidToken.into_response();
            }
        };

    let (Ok(identity_id), Ok(role)) = (
        claims.sub.parse::<IdentityId>(),
        claims.role.parse::<IdentityRole>(),
    ) else {
        return SessionError::InvalidToken.into_response();
    };

    req.extensions_mut().insert(AuthContext {
        identity_id,
        email: claims.email,
        role,
    });

    next.run(req).await
}

/// State for the CSRF middleware
pub struct CsrfState<C> {
    guard: Arc<CsrfGuard<C>>,
    config: Arc<SessionConfig>,
}

impl<C> Clone for CsrfState<C> {
    fn clone(&self) -> Self {
        Self {
            guard: Arc::clone(&self.guard),
            config: Arc::clone(&self.config),
        }
    }
}

impl<C> CsrfState<C>
where
    C: CsrfTokenStore,
{
    pub fn new(store: Arc<C>, config: Arc<SessionConfig>) -> Self {
        Self {
            guard: Arc::new(CsrfGuard::new(store, Arc::clone(&config))),
            config,
        }
    }
}

/// The session key tokens are bound to: the verified access-token subject
/// for authenticated clients, the anonymous key cookie otherwise.
fn csrf_session_key(headers: &HeaderMap, config: &SessionConfig) -> Option<String> {
    if let Some(token) = extract_cookie(headers, &config.access_cookie_name) {
        if let Ok(claims) =
            access_token::verify(&token, &config.token_secret, &config.issuer, Utc::now())
        {
            return Some(claims.sub);
        }
    }
    extract_cookie(headers, &config.csrf_key_cookie_name)
}

fn csrf_cookie(config: &SessionConfig) -> CookieConfig {
    CookieConfig {
        name: config.csrf_cookie_name.clone(),
        secure: config.cookie_secure,
        // The browser-side code must read this back into the header
        http_only: false,
        same_site: config.cookie_same_site,
        path: "/".to_string(),
        max_age_secs: Some(config.csrf_token_ttl.as_secs() as i64),
    }
}

fn csrf_key_cookie(config: &SessionConfig) -> CookieConfig {
    CookieConfig {
        name: config.csrf_key_cookie_name.clone(),
        secure: config.cookie_secure,
        http_only: true,
        same_site: config.cookie_same_site,
        path: "/".to_string(),
        max_age_secs: Some(config.csrf_token_ttl.as_secs() as i64),
    }
}

/// CSRF double-submit middleware
///
/// Safe methods pass through and pick up a fresh token cookie on the way
/// out; state-changing methods are validated and rejected with a uniform
/// 403 on any failure.
pub async fn csrf_guard<C>(
    State(state): State<CsrfState<C>>,
    req: Request,
    next: Next,
) -> Response
where
    C: CsrfTokenStore + Send + Sync + 'static,
{
    let method = req.method();
    let safe = method == Method::GET
        || method == Method::HEAD
        || method == Method::OPTIONS
        || method == Method::TRACE;

    if safe {
        let existing_key = csrf_session_key(req.headers(), &state.config);
        // Anonymous clients get a per-client random key so two browsers
        // never share a token set
        let minted_key = existing_key
            .is_none()
            .then(|| crypto::random_token_hex(CSRF_KEY_BYTES));
        let key = existing_key
            .or_else(|| minted_key.clone())
            .unwrap_or_default();

        let token = match state.guard.issue(&key).await {
            Ok(token) => Some(token),
            Err(e) => {
                tracing::warn!(error = %e, "CSRF token mint failed");
                None
            }
        };

        let mut response = next.run(req).await;

        if let Some(token) = token {
            append_cookie(
                &mut response,
                set_cookie_header(&csrf_cookie(&state.config), &token),
            );
            if let Some(key) = minted_key {
                append_cookie(
                    &mut response,
                    set_cookie_header(&csrf_key_cookie(&state.config), &key),
                );
            }
        }

        return response;
    }

    let Some(key) = csrf_session_key(req.headers(), &state.config) else {
        return SessionError::CsrfMissing.into_response();
    };

    let submitted = req
        .headers()
        .get(state.config.csrf_header_name.as_str())
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let cookie = extract_cookie(req.headers(), &state.config.csrf_cookie_name);

    if let Err(e) = state
        .guard
        .validate(&key, submitted.as_deref(), cookie.as_deref())
        .await
    {
        return e.into_response();
    }

    next.run(req).await
}

fn append_cookie(response: &mut Response, value: HeaderValue) {
    response.headers_mut().append(header::SET_COOKIE, value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::memory::MemorySessionStore;

    fn state() -> CsrfState<MemorySessionStore> {
        CsrfState::new(
            Arc::new(MemorySessionStore::default()),
            Arc::new(SessionConfig::development()),
        )
    }

    #[tokio::test]
    async fn test_csrf_state_clones_share_token_store() {
        let state = state();
        let cloned = state.clone();

        let token = state.guard.issue("session-a").await.unwrap();
        assert!(
            cloned
                .guard
                .validate("session-a", Some(&token), Some(&token))
                .await
                .is_ok()
        );
    }

    #[test]
    fn test_session_key_falls_back_to_key_cookie() {
        let config = SessionConfig::development();

        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            axum::http::HeaderValue::from_static("XSRF-KEY=abc123"),
        );
        assert_eq!(
            csrf_session_key(&headers, &config),
            Some("abc123".to_string())
        );

        // No access token and no key cookie: no session key at all
        assert_eq!(csrf_session_key(&HeaderMap::new(), &config), None);
    }
}
