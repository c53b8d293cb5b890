//! Session (Session & Credential Security) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, token signing, store traits
//! - `application/` - Use cases and application services
//! - `infra/` - In-memory stores and the Postgres identity store
//! - `presentation/` - HTTP handlers, DTOs, router, middleware
//!
//! ## Features
//! - Stateless HMAC-signed access tokens (15 minute TTL)
//! - Stateful, single-use rotating refresh tokens (7 day TTL)
//! - Double-submit CSRF protection with server-side token sets
//! - Login throttling with temporary lockout (5 failures / 30 minutes)
//!
//! ## Security Model
//! - Password hashes verified with Argon2id off the request pool
//! - Unknown emails and wrong passwords are indistinguishable by
//!   response content and timing
//! - Refresh token rotation is linearizable per token value; replay of a
//!   consumed token revokes every token of the identity
//! - Access tokens cannot be revoked before expiry; revocation is
//!   enforced at the refresh layer only

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::config::SessionConfig;
pub use error::{SessionError, SessionResult};
pub use infra::memory::MemorySessionStore;
pub use infra::postgres::PgIdentityStore;
pub use presentation::router::session_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::access_token::*;
    pub use crate::domain::entity::*;
    pub use crate::presentation::dto::*;
}

pub mod handlers {
    pub use crate::presentation::handlers::*;
}

pub mod store {
    pub use crate::domain::repository::*;
    pub use crate::infra::memory::MemorySessionStore;
}

pub mod router {
    pub use crate::presentation::router::*;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}
