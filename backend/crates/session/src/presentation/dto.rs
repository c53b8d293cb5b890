//! Data Transfer Objects
//!
//! Wire shapes for the auth endpoints. Token values never appear in JSON
//! bodies; they travel exclusively in HttpOnly cookies.

use serde::{Deserialize, Serialize};

use crate::application::login::LoginOutput;
use crate::domain::entity::{IdentityClaims, IdentityRole};

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Identity summary returned to the client
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentitySummary {
    pub id: String,
    pub email: String,
    pub role: IdentityRole,
}

impl From<&IdentityClaims> for IdentitySummary {
    fn from(claims: &IdentityClaims) -> Self {
        Self {
            id: claims.identity_id.to_string(),
            email: claims.email.clone(),
            role: claims.role,
        }
    }
}

/// Login response body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub identity: IdentitySummary,
    /// Seconds until the access token expires; lets the client schedule
    /// its refresh without parsing the cookie
    pub access_token_expires_in: u64,
}

impl From<&LoginOutput> for LoginResponse {
    fn from(output: &LoginOutput) -> Self {
        Self {
            identity: IdentitySummary::from(&output.identity),
            access_token_expires_in: output.access_token_expires_in,
        }
    }
}

/// Refresh response body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token_expires_in: u64,
}

/// Logout-everywhere response body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutAllResponse {
    /// Number of refresh tokens revoked
    pub revoked_sessions: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel::id::IdentityId;

    #[test]
    fn test_login_response_shape() {
        let claims = IdentityClaims {
            identity_id: IdentityId::new(),
            email: "op@example.com".to_string(),
            role: IdentityRole::Operator,
        };
        let response = LoginResponse {
            identity: IdentitySummary::from(&claims),
            access_token_expires_in: 900,
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["identity"]["email"], "op@example.com");
        assert_eq!(json["identity"]["role"], "operator");
        assert_eq!(json["accessTokenExpiresIn"], 900);
        // No token material in the body
        assert!(json.get("accessToken").is_none());
        assert!(json.get("refreshToken").is_none());
    }

    #[test]
    fn test_logout_all_response_shape() {
        let json = serde_json::to_value(LogoutAllResponse { revoked_sessions: 3 }).unwrap();
        assert_eq!(json["revokedSessions"], 3);
    }
}
