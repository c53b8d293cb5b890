//! Presentation Layer - HTTP surface

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use dto::{LoginRequest, LoginResponse, LogoutAllResponse, RefreshResponse};
pub use handlers::SessionAppState;
pub use middleware::{AuthContext, CsrfState, csrf_guard, require_auth};
pub use router::session_router;
