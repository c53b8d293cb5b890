//! Session Router

use std::sync::Arc;

use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::post;

use crate::domain::repository::{IdentityStore, LockoutStore, RefreshTokenStore};
use crate::presentation::handlers::{self, SessionAppState};
use crate::presentation::middleware::require_auth;

/// Build the auth router
///
/// Mounted under `/api/auth`; only `/logout-all` requires a verified
/// access token, the other endpoints authenticate by what they carry.
pub fn session_router<I, S>(state: SessionAppState<I, S>) -> Router
where
    I: IdentityStore + Send + Sync + 'static,
    S: RefreshTokenStore + LockoutStore + Send + Sync + 'static,
{
    let config = Arc::clone(&state.config);

    Router::new()
        .route("/logout-all", post(handlers::logout_all::<I, S>))
        .route_layer(from_fn_with_state(config, require_auth))
        .route("/login", post(handlers::login::<I, S>))
        .route("/refresh", post(handlers::refresh::<I, S>))
        .route("/logout", post(handlers::logout::<I, S>))
        .with_state(state)
}
