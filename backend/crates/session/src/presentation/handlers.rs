//! HTTP Handlers
//!
//! Token material travels only in cookies: the access token in an HttpOnly
//! cookie on `/`, the refresh token in an HttpOnly cookie scoped to the
//! auth path so it is never sent with ordinary API calls.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Json;
use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{AppendHeaders, IntoResponse, Response};
use platform::client::{extract_client_ip, throttle_key};
use platform::cookie::{CookieConfig, extract_cookie, set_cookie_header};

use crate::application::config::SessionConfig;
use crate::application::login::{LoginInput, LoginUseCase};
use crate::application::logout::LogoutUseCase;
use crate::application::refresh::RefreshUseCase;
use crate::domain::repository::{IdentityStore, LockoutStore, RefreshTokenStore};
use crate::error::SessionError;
use crate::presentation::dto::{LoginRequest, LoginResponse, LogoutAllResponse, RefreshResponse};
use crate::presentation::middleware::AuthContext;

/// Shared state for the auth endpoints
pub struct SessionAppState<I, S> {
    pub identities: Arc<I>,
    pub store: Arc<S>,
    pub config: Arc<SessionConfig>,
}

// Manual impl: Clone must not require I: Clone / S: Clone
impl<I, S> Clone for SessionAppState<I, S> {
    fn clone(&self) -> Self {
        Self {
            identities: Arc::clone(&self.identities),
            store: Arc::clone(&self.store),
            config: Arc::clone(&self.config),
        }
    }
}

impl<I, S> SessionAppState<I, S> {
    pub fn new(identities: Arc<I>, store: Arc<S>, config: Arc<SessionConfig>) -> Self {
        Self {
            identities,
            store,
            config,
        }
    }
}

fn access_cookie(config: &SessionConfig) -> CookieConfig {
    CookieConfig {
        name: config.access_cookie_name.clone(),
        secure: config.cookie_secure,
        http_only: true,
        same_site: config.cookie_same_site,
        path: "/".to_string(),
        max_age_secs: Some(config.access_token_ttl.as_secs() as i64),
    }
}

fn refresh_cookie(config: &SessionConfig) -> CookieConfig {
    CookieConfig {
        name: config.refresh_cookie_name.clone(),
        secure: config.cookie_secure,
        http_only: true,
        same_site: config.cookie_same_site,
        path: config.refresh_cookie_path.clone(),
        max_age_secs: Some(config.refresh_token_ttl.as_secs() as i64),
    }
}

/// Set-Cookie headers installing a token pair
fn set_session_cookies(
    config: &SessionConfig,
    access_token: &str,
    refresh_token: &str,
) -> AppendHeaders<[(header::HeaderName, HeaderValue); 2]> {
    AppendHeaders([
        (
            header::SET_COOKIE,
            set_cookie_header(&access_cookie(config), access_token),
        ),
        (
            header::SET_COOKIE,
            set_cookie_header(&refresh_cookie(config), refresh_token),
        ),
    ])
}

/// Set-Cookie headers deleting both token cookies
fn clear_session_cookies(
    config: &SessionConfig,
) -> AppendHeaders<[(header::HeaderName, HeaderValue); 2]> {
    AppendHeaders([
        (
            header::SET_COOKIE,
            platform::cookie::delete_cookie_header(&access_cookie(config)),
        ),
        (
            header::SET_COOKIE,
            platform::cookie::delete_cookie_header(&refresh_cookie(config)),
        ),
    ])
}

/// POST /login
pub async fn login<I, S>(
    State(state): State<SessionAppState<I, S>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(request): Json<LoginRequest>,
) -> Result<Response, SessionError>
where
    I: IdentityStore + Send + Sync + 'static,
    S: RefreshTokenStore + LockoutStore + Send + Sync + 'static,
{
    let client_ip = extract_client_ip(&headers, Some(addr.ip()));

    let use_case = LoginUseCase::new(
        Arc::clone(&state.identities),
        Arc::clone(&state.store),
        Arc::clone(&state.config),
    );

    let output = use_case
        .execute(LoginInput {
            email: request.email,
            password: request.password,
            throttle_key: throttle_key(client_ip),
        })
        .await?;

    let cookies = set_session_cookies(&state.config, &output.access_token, &output.refresh_token);
    Ok((cookies, Json(LoginResponse::from(&output))).into_response())
}

/// POST /refresh
///
/// An invalid or replayed token clears both cookies along with the 401,
/// so a browser stuck with a dead session drops it instead of retrying.
pub async fn refresh<I, S>(
    State(state): State<SessionAppState<I, S>>,
    headers: HeaderMap,
) -> Response
where
    I: IdentityStore + Send + Sync + 'static,
    S: RefreshTokenStore + Send + Sync + 'static,
{
    let Some(old_token) = extract_cookie(&headers, &state.config.refresh_cookie_name) else {
        return (
            clear_session_cookies(&state.config),
            SessionError::InvalidToken,
        )
            .into_response();
    };

    let use_case = RefreshUseCase::new(
        Arc::clone(&state.identities),
        Arc::clone(&state.store),
        Arc::clone(&state.config),
    );

    match use_case.execute(&old_token).await {
        Ok(output) => {
            let cookies =
                set_session_cookies(&state.config, &output.access_token, &output.refresh_token);
            let body = RefreshResponse {
                access_token_expires_in: output.access_token_expires_in,
            };
            (cookies, Json(body)).into_response()
        }
        Err(e @ (SessionError::InvalidToken | SessionError::AccountDisabled)) => {
            (clear_session_cookies(&state.config), e).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// POST /logout
///
/// Idempotent: succeeds and clears cookies whether or not a live refresh
/// token was presented.
pub async fn logout<I, S>(
    State(state): State<SessionAppState<I, S>>,
    headers: HeaderMap,
) -> Result<Response, SessionError>
where
    I: Send + Sync + 'static,
    S: RefreshTokenStore + Send + Sync + 'static,
{
    if let Some(token) = extract_cookie(&headers, &state.config.refresh_cookie_name) {
        LogoutUseCase::new(Arc::clone(&state.store))
            .execute(&token)
            .await?;
    }

    Ok((StatusCode::OK, clear_session_cookies(&state.config)).into_response())
}

/// POST /logout-all (requires authentication)
pub async fn logout_all<I, S>(
    State(state): State<SessionAppState<I, S>>,
    auth: axum::Extension<AuthContext>,
) -> Result<Response, SessionError>
where
    I: Send + Sync + 'static,
    S: RefreshTokenStore + Send + Sync + 'static,
{
    let revoked = LogoutUseCase::new(Arc::clone(&state.store))
        .execute_all(&auth.identity_id)
        .await?;

    Ok((
        clear_session_cookies(&state.config),
        Json(LogoutAllResponse {
            revoked_sessions: revoked,
        }),
    )
        .into_response())
}
