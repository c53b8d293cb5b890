//! Access Token - stateless signed claims
//!
//! A short-lived, self-contained credential: `base64url(claims JSON)` plus
//! an HMAC-SHA256 signature over that payload, joined with `.`. Verifiable
//! without any server-side lookup.
//!
//! Access tokens cannot be revoked before their natural expiry; the short
//! TTL bounds the exposure and revocation is enforced at the refresh layer.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

use crate::domain::entity::IdentityClaims;

/// Tolerated clock skew when checking expiry
pub const CLOCK_SKEW_LEEWAY_SECS: i64 = 60;

/// Why verification rejected a token
///
/// Internal only; callers collapse all variants into a generic 401.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessTokenError {
    #[error("Malformed token")]
    Malformed,
    #[error("Signature verification failed")]
    BadSignature,
    #[error("Unexpected issuer")]
    WrongIssuer,
    #[error("Token expired")]
    Expired,
}

/// Claims carried by an access token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject: identity id (UUID)
    pub sub: String,
    /// Login email
    pub email: String,
    /// Role code
    pub role: String,
    /// Issuer
    pub iss: String,
    /// Issued at (unix timestamp)
    pub iat: i64,
    /// Expiration (unix timestamp)
    pub exp: i64,
}

impl AccessClaims {
    /// Build claims for an identity
    pub fn new(identity: &IdentityClaims, issuer: &str, ttl: Duration, now: DateTime<Utc>) -> Self {
        Self {
            sub: identity.identity_id.to_string(),
            email: identity.email.clone(),
            role: identity.role.code().to_string(),
            iss: issuer.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }
}

/// Sign claims into a token string
pub fn sign(claims: &AccessClaims, secret: &[u8; 32]) -> Result<String, AccessTokenError> {
    let payload = URL_SAFE_NO_PAD.encode(
        serde_json::to_vec(claims).map_err(|_| AccessTokenError::Malformed)?,
    );

    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(payload.as_bytes());
    let signature = mac.finalize().into_bytes();

    Ok(format!("{}.{}", payload, URL_SAFE_NO_PAD.encode(signature)))
}

/// Verify a token string and return its claims
///
/// Rejects tokens with a bad signature, a different issuer, or an expiry
/// more than [`CLOCK_SKEW_LEEWAY_SECS`] in the past.
pub fn verify(
    token: &str,
    secret: &[u8; 32],
    issuer: &str,
    now: DateTime<Utc>,
) -> Result<AccessClaims, AccessTokenError> {
    let (payload, signature_b64) = token
        .split_once('.')
        .ok_or(AccessTokenError::Malformed)?;

    // Signature first: nothing else about the token is trusted before this
    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(payload.as_bytes());

    let signature = URL_SAFE_NO_PAD
        .decode(signature_b64)
        .map_err(|_| AccessTokenError::Malformed)?;

    mac.verify_slice(&signature)
        .map_err(|_| AccessTokenError::BadSignature)?;

    let claims_bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| AccessTokenError::Malformed)?;

    let claims: AccessClaims =
        serde_json::from_slice(&claims_bytes).map_err(|_| AccessTokenError::Malformed)?;

    if claims.iss != issuer {
        return Err(AccessTokenError::WrongIssuer);
    }

    if now.timestamp() > claims.exp + CLOCK_SKEW_LEEWAY_SECS {
        return Err(AccessTokenError::Expired);
    }

    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::IdentityRole;
    use kernel::id::IdentityId;

    const SECRET: [u8; 32] = [7u8; 32];
    const ISSUER: &str = "vh-portal";

    fn claims_for(ttl_secs: i64) -> AccessClaims {
        let identity = IdentityClaims {
            identity_id: IdentityId::new(),
            email: "admin@example.com".to_string(),
            role: IdentityRole::Admin,
        };
        AccessClaims::new(&identity, ISSUER, Duration::seconds(ttl_secs), Utc::now())
    }

    #[test]
    fn test_sign_verify_roundtrip() {
        let claims = claims_for(900);
        let token = sign(&claims, &SECRET).unwrap();

        let verified = verify(&token, &SECRET, ISSUER, Utc::now()).unwrap();
        assert_eq!(verified.sub, claims.sub);
        assert_eq!(verified.email, claims.email);
        assert_eq!(verified.role, "admin");
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = sign(&claims_for(900), &SECRET).unwrap();
        let other_secret = [8u8; 32];

        assert_eq!(
            verify(&token, &other_secret, ISSUER, Utc::now()),
            Err(AccessTokenError::BadSignature)
        );
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let token = sign(&claims_for(900), &SECRET).unwrap();
        let (payload, sig) = token.split_once('.').unwrap();

        // Swap the payload for a forged one, keep the original signature
        let mut forged = claims_for(900);
        forged.role = "superuser".to_string();
        let forged_payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&forged).unwrap());
        assert_ne!(payload, forged_payload);

        let tampered = format!("{}.{}", forged_payload, sig);
        assert_eq!(
            verify(&tampered, &SECRET, ISSUER, Utc::now()),
            Err(AccessTokenError::BadSignature)
        );
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        let token = sign(&claims_for(900), &SECRET).unwrap();
        assert_eq!(
            verify(&token, &SECRET, "someone-else", Utc::now()),
            Err(AccessTokenError::WrongIssuer)
        );
    }

    #[test]
    fn test_expired_rejected_with_leeway() {
        let token = sign(&claims_for(900), &SECRET).unwrap();

        // Just past expiry but within leeway: accepted
        let now = Utc::now() + Duration::seconds(900 + CLOCK_SKEW_LEEWAY_SECS - 5);
        assert!(verify(&token, &SECRET, ISSUER, now).is_ok());

        // Past expiry plus leeway: rejected
        let now = Utc::now() + Duration::seconds(900 + CLOCK_SKEW_LEEWAY_SECS + 5);
        assert_eq!(
            verify(&token, &SECRET, ISSUER, now),
            Err(AccessTokenError::Expired)
        );
    }

    #[test]
    fn test_garbage_rejected() {
        assert_eq!(
            verify("not-a-token", &SECRET, ISSUER, Utc::now()),
            Err(AccessTokenError::Malformed)
        );
        assert_eq!(
            verify("a.b.c", &SECRET, ISSUER, Utc::now()),
            Err(AccessTokenError::Malformed)
        );
    }
}
