//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

use axum::{
    Router, http,
    http::{Method, header},
    middleware::from_fn_with_state,
};
use base64::Engine;
use base64::engine::general_purpose;
use session::application::maintenance::{SweepIntervals, spawn_sweepers};
use session::domain::repository::{CsrfTokenStore, LockoutStore, RefreshTokenStore};
use session::presentation::middleware::{CsrfState, csrf_guard};
use session::{MemorySessionStore, PgIdentityStore, SessionConfig, session_router};
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,session=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database connection
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    // Session configuration
    let session_config = if cfg!(debug_assertions) {
        SessionConfig::development()
    } else {
        // In production, load the token secret from the environment
        let secret_b64 =
            env::var("SESSION_SECRET").expect("SESSION_SECRET must be set in production");
        let secret_bytes = Engine::decode(&general_purpose::STANDARD, &secret_b64)?;
        anyhow::ensure!(
            secret_bytes.len() == 32,
            "SESSION_SECRET must decode to exactly 32 bytes"
        );
        let mut secret = [0u8; 32];
        secret.copy_from_slice(&secret_bytes);
        SessionConfig {
            token_secret: secret,
            ..SessionConfig::default()
        }
    };
    let session_config = Arc::new(session_config);

    let session_store = Arc::new(MemorySessionStore::new(session_config.lockout.clone()));
    let identity_store = Arc::new(PgIdentityStore::new(pool.clone()));

    // Startup cleanup, then periodic sweeps
    // Errors here should not prevent server startup
    match RefreshTokenStore::cleanup_expired(session_store.as_ref()).await {
        Ok(deleted) => tracing::info!(deleted, "Refresh token cleanup completed"),
        Err(e) => tracing::warn!(error = %e, "Refresh token cleanup failed, continuing anyway"),
    }
    match CsrfTokenStore::cleanup_expired(session_store.as_ref()).await {
        Ok(deleted) => tracing::info!(deleted, "CSRF token cleanup completed"),
        Err(e) => tracing::warn!(error = %e, "CSRF token cleanup failed, continuing anyway"),
    }
    match LockoutStore::cleanup_expired(session_store.as_ref()).await {
        Ok(deleted) => tracing::info!(deleted, "Lockout cleanup completed"),
        Err(e) => tracing::warn!(error = %e, "Lockout cleanup failed, continuing anyway"),
    }

    let _sweepers = spawn_sweepers(Arc::clone(&session_store), SweepIntervals::default());

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:40922,http://127.0.0.1:40922".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::HeaderName::from_static("x-xsrf-token"),
        ]))
        .allow_credentials(true);

    let session_state = session::presentation::handlers::SessionAppState::new(
        identity_store,
        Arc::clone(&session_store),
        Arc::clone(&session_config),
    );
    let csrf_state = CsrfState::new(Arc::clone(&session_store), Arc::clone(&session_config));

    // Build router; the CSRF guard wraps every route
    let app = Router::new()
        .nest("/api/auth", session_router(session_state))
        .layer(from_fn_with_state(csrf_state, csrf_guard::<MemorySessionStore>))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], 31113));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
