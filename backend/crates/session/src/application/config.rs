//! Application Configuration
//!
//! Configuration for the session application layer.

use std::time::Duration;

use crate::domain::entity::LockoutPolicy;

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;

/// Session application configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Secret key for HMAC signing of access tokens (32 bytes)
    pub token_secret: [u8; 32],
    /// Issuer claim stamped into and required from access tokens
    pub issuer: String,
    /// Access token TTL (15 minutes)
    pub access_token_ttl: Duration,
    /// Refresh token TTL (7 days)
    pub refresh_token_ttl: Duration,
    /// Server-side CSRF token TTL; matches the cookie max-age (1 hour)
    pub csrf_token_ttl: Duration,
    /// Access token cookie name (HttpOnly)
    pub access_cookie_name: String,
    /// Refresh token cookie name (HttpOnly, path-scoped)
    pub refresh_cookie_name: String,
    /// Path the refresh cookie is scoped to
    pub refresh_cookie_path: String,
    /// CSRF double-submit cookie name (client-readable)
    pub csrf_cookie_name: String,
    /// Anonymous CSRF session-key cookie name (HttpOnly)
    pub csrf_key_cookie_name: String,
    /// Header carrying the submitted CSRF token
    pub csrf_header_name: String,
    /// Whether to require Secure cookies
    pub cookie_secure: bool,
    /// SameSite policy
    pub cookie_same_site: SameSite,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
    /// Login throttle policy (5 failures / 30 minute lockout)
    pub lockout: LockoutPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token_secret: [0u8; 32],
            issuer: "vh-portal".to_string(),
            access_token_ttl: Duration::from_secs(15 * 60),
            refresh_token_ttl: Duration::from_secs(7 * 24 * 3600),
            csrf_token_ttl: Duration::from_secs(3600),
            access_cookie_name: "access_token".to_string(),
            refresh_cookie_name: "refresh_token".to_string(),
            refresh_cookie_path: "/api/auth".to_string(),
            csrf_cookie_name: "XSRF-TOKEN".to_string(),
            csrf_key_cookie_name: "XSRF-KEY".to_string(),
            csrf_header_name: "x-xsrf-token".to_string(),
            cookie_secure: true,
            cookie_same_site: SameSite::Lax,
            password_pepper: None,
            lockout: LockoutPolicy::default(),
        }
    }
}

impl SessionConfig {
    /// Create config with a random token secret (for development)
    pub fn with_random_secret() -> Self {
        use rand::RngCore;
        let mut secret = [0u8; 32];
        rand::rngs::OsRng.fill_bytes(&mut secret);
        Self {
            token_secret: secret,
            ..Default::default()
        }
    }

    /// Create config for development (insecure cookie)
    pub fn development() -> Self {
        Self {
            cookie_secure: false,
            ..Self::with_random_secret()
        }
    }

    /// Access token TTL in whole seconds (for `accessTokenExpiresIn`)
    pub fn access_token_ttl_secs(&self) -> u64 {
        self.access_token_ttl.as_secs()
    }

    /// Access token TTL as a chrono duration
    pub fn access_token_ttl_chrono(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.access_token_ttl.as_secs() as i64)
    }

    /// Refresh token TTL as a chrono duration
    pub fn refresh_token_ttl_chrono(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.refresh_token_ttl.as_secs() as i64)
    }

    /// CSRF token TTL as a chrono duration
    pub fn csrf_token_ttl_chrono(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.csrf_token_ttl.as_secs() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ttls() {
        let config = SessionConfig::default();
        assert_eq!(config.access_token_ttl_secs(), 900);
        assert_eq!(config.refresh_token_ttl.as_secs(), 7 * 24 * 3600);
        assert_eq!(config.csrf_token_ttl.as_secs(), 3600);
        assert_eq!(config.lockout.max_failures, 5);
    }

    #[test]
    fn test_random_secret_differs() {
        let a = SessionConfig::with_random_secret();
        let b = SessionConfig::with_random_secret();
        assert_ne!(a.token_secret, b.token_secret);
    }

    #[test]
    fn test_development_is_insecure_cookie_only() {
        let config = SessionConfig::development();
        assert!(!config.cookie_secure);
        assert_ne!(config.token_secret, [0u8; 32]);
    }
}
