//! Session Error Types
//!
//! This module provides session-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Session-specific result type alias
pub type SessionResult<T> = Result<T, SessionError>;

/// Session-specific error variants
///
/// External responses never distinguish the cause of a credential or CSRF
/// failure; the internal variants exist for logging and tests.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Bad email or password; never reveals which
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Client identifier is locked out after repeated failures
    #[error("Too many failed attempts; try again later")]
    AccountLocked { retry_after_secs: u64 },

    /// Account exists but may not sign in
    #[error("Account is disabled")]
    AccountDisabled,

    /// Refresh or access token is missing, expired, malformed or consumed
    #[error("Invalid or expired token")]
    InvalidToken,

    /// CSRF token absent from header or cookie
    #[error("CSRF token missing")]
    CsrfMissing,

    /// Submitted CSRF token does not equal the cookie token
    #[error("CSRF token mismatch")]
    CsrfMismatch,

    /// CSRF token pair matches but is unknown server-side
    #[error("CSRF token not recognized")]
    CsrfInvalid,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SessionError {
    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionError::InvalidCredentials | SessionError::InvalidToken => {
                ErrorKind::Unauthorized
            }
            SessionError::AccountLocked { .. } => ErrorKind::TooManyRequests,
            SessionError::AccountDisabled
            | SessionError::CsrfMissing
            | SessionError::CsrfMismatch
            | SessionError::CsrfInvalid => ErrorKind::Forbidden,
            SessionError::Database(_) | SessionError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Convert to AppError
    ///
    /// The three CSRF variants collapse into one external message; stateful
    /// store errors surface as a generic 500.
    pub fn to_app_error(&self) -> AppError {
        match self {
            SessionError::AccountLocked { retry_after_secs } => {
                AppError::too_many_requests("Too many failed attempts; try again later")
                    .with_retry_after(*retry_after_secs)
            }
            SessionError::CsrfMissing | SessionError::CsrfMismatch | SessionError::CsrfInvalid => {
                AppError::forbidden("CSRF validation failed")
            }
            SessionError::Database(_) | SessionError::Internal(_) => {
                AppError::internal("Internal server error")
            }
            other => AppError::new(other.kind(), other.to_string()),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            SessionError::Database(e) => {
                tracing::error!(error = %e, "Session database error");
            }
            SessionError::Internal(msg) => {
                tracing::error!(message = %msg, "Session internal error");
            }
            SessionError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            SessionError::AccountLocked { retry_after_secs } => {
                tracing::warn!(retry_after_secs, "Login attempt while locked out");
            }
            SessionError::InvalidToken => {
                tracing::warn!("Invalid or expired token presented");
            }
            SessionError::CsrfMissing | SessionError::CsrfMismatch | SessionError::CsrfInvalid => {
                tracing::warn!(reason = %self, "CSRF validation rejected request");
            }
            #[allow(unreachable_patterns)]
            _ => {
                tracing::debug!(error = %self, "Session error");
            }
        }
    }
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AppError> for SessionError {
    fn from(err: AppError) -> Self {
        SessionError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(SessionError::InvalidCredentials.kind(), ErrorKind::Unauthorized);
        assert_eq!(SessionError::InvalidToken.kind(), ErrorKind::Unauthorized);
        assert_eq!(
            SessionError::AccountLocked {
                retry_after_secs: 60
            }
            .kind(),
            ErrorKind::TooManyRequests
        );
        assert_eq!(SessionError::AccountDisabled.kind(), ErrorKind::Forbidden);
        assert_eq!(SessionError::CsrfMissing.kind(), ErrorKind::Forbidden);
        assert_eq!(SessionError::CsrfMismatch.kind(), ErrorKind::Forbidden);
        assert_eq!(SessionError::CsrfInvalid.kind(), ErrorKind::Forbidden);
    }

    #[test]
    fn test_csrf_variants_share_external_message() {
        let missing = SessionError::CsrfMissing.to_app_error();
        let mismatch = SessionError::CsrfMismatch.to_app_error();
        let invalid = SessionError::CsrfInvalid.to_app_error();

        assert_eq!(missing.message(), mismatch.message());
        assert_eq!(mismatch.message(), invalid.message());
    }

    #[test]
    fn test_locked_carries_retry_after() {
        let err = SessionError::AccountLocked {
            retry_after_secs: 1800,
        }
        .to_app_error();
        assert_eq!(err.status_code(), 429);
        assert_eq!(err.retry_after_secs(), Some(1800));
    }

    #[test]
    fn test_internal_error_is_opaque() {
        let err = SessionError::Internal("secret detail".to_string()).to_app_error();
        assert!(!err.message().contains("secret detail"));
    }
}
