//! Refresh Token Entity
//!
//! A long-lived, opaque, server-side credential. One entry per live token;
//! a token value is consumed exactly once by rotation.

use chrono::{DateTime, Duration, Utc};
use kernel::id::IdentityId;
use platform::crypto::random_token_b64;

/// Entropy of the opaque token value in bytes (256 bits)
const TOKEN_BYTES: usize = 32;

/// Refresh token entry
#[derive(Debug, Clone)]
pub struct RefreshTokenEntry {
    /// Opaque token value; the raw string returned to the caller is the
    /// only copy outside this entry
    pub token: String,
    /// Identity this token is bound to
    pub identity_id: IdentityId,
    /// Issued timestamp
    pub issued_at: DateTime<Utc>,
    /// Expiration timestamp
    pub expires_at: DateTime<Utc>,
}

impl RefreshTokenEntry {
    /// Mint a new entry with a cryptographically random 256-bit token
    ///
    /// TTL is provided by the application layer (config), not hard-coded here.
    pub fn issue(identity_id: IdentityId, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            token: random_token_b64(TOKEN_BYTES),
            identity_id,
            issued_at: now,
            expires_at: now + ttl,
        }
    }

    /// Check if this entry has expired
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_sets_expiry() {
        let entry = RefreshTokenEntry::issue(IdentityId::new(), Duration::days(7));
        assert!(entry.expires_at > entry.issued_at);
        assert!(!entry.is_expired(Utc::now()));
        assert!(entry.is_expired(entry.expires_at + Duration::seconds(1)));
    }

    #[test]
    fn test_tokens_are_unique_and_opaque() {
        let id = IdentityId::new();
        let a = RefreshTokenEntry::issue(id, Duration::days(7));
        let b = RefreshTokenEntry::issue(id, Duration::days(7));

        assert_ne!(a.token, b.token);
        // 32 bytes -> 43 chars of URL-safe base64, no padding
        assert_eq!(a.token.len(), 43);
        assert!(!a.token.contains(id.to_string().as_str()));
    }
}
