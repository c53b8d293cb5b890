//! Identity Entity
//!
//! A read-only projection of an account in the external identity store.
//! This subsystem never creates or mutates identities beyond the
//! last-login timestamp; it only derives claims from them.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use kernel::id::IdentityId;
use platform::password::HashedPassword;
use serde::Serialize;

/// Role claim carried in issued tokens
///
/// Authorization policy is enforced elsewhere; this subsystem only
/// transports the claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityRole {
    Operator,
    Admin,
}

impl IdentityRole {
    pub fn code(&self) -> &'static str {
        match self {
            IdentityRole::Operator => "operator",
            IdentityRole::Admin => "admin",
        }
    }
}

impl FromStr for IdentityRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "operator" => Ok(IdentityRole::Operator),
            "admin" => Ok(IdentityRole::Admin),
            other => Err(format!("Unknown role: {other}")),
        }
    }
}

/// Account status as recorded in the identity store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityStatus {
    Active,
    Disabled,
}

impl FromStr for IdentityStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(IdentityStatus::Active),
            "disabled" => Ok(IdentityStatus::Disabled),
            other => Err(format!("Unknown status: {other}")),
        }
    }
}

/// Identity entity (read model)
#[derive(Debug, Clone)]
pub struct Identity {
    /// Identity ID (UUID v4, owned by the identity store)
    pub identity_id: IdentityId,
    /// Login email
    pub email: String,
    /// Role claim
    pub role: IdentityRole,
    /// Account status
    pub status: IdentityStatus,
    /// Argon2id password hash (PHC format)
    pub password_hash: HashedPassword,
    /// Last successful login
    pub last_login_at: Option<DateTime<Utc>>,
}

impl Identity {
    /// Whether this account may sign in
    pub fn can_login(&self) -> bool {
        self.status == IdentityStatus::Active
    }

    /// Project the claims issued tokens carry
    pub fn claims(&self) -> IdentityClaims {
        IdentityClaims {
            identity_id: self.identity_id,
            email: self.email.clone(),
            role: self.role,
        }
    }
}

/// Derived claims (id, email, role) - the only identity data this
/// subsystem hands out
#[derive(Debug, Clone)]
pub struct IdentityClaims {
    pub identity_id: IdentityId,
    pub email: String,
    pub role: IdentityRole,
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform::password::ClearTextPassword;

    fn sample_identity(status: IdentityStatus) -> Identity {
        let hash = ClearTextPassword::new("CorrectPass1!".to_string())
            .unwrap()
            .hash(None)
            .unwrap();
        Identity {
            identity_id: IdentityId::new(),
            email: "admin@example.com".to_string(),
            role: IdentityRole::Admin,
            status,
            password_hash: hash,
            last_login_at: None,
        }
    }

    #[test]
    fn test_role_roundtrip() {
        assert_eq!("admin".parse::<IdentityRole>().unwrap(), IdentityRole::Admin);
        assert_eq!(
            "operator".parse::<IdentityRole>().unwrap(),
            IdentityRole::Operator
        );
        assert!("root".parse::<IdentityRole>().is_err());
        assert_eq!(IdentityRole::Admin.code(), "admin");
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(
            "active".parse::<IdentityStatus>().unwrap(),
            IdentityStatus::Active
        );
        assert!("frozen".parse::<IdentityStatus>().is_err());
    }

    #[test]
    fn test_can_login() {
        assert!(sample_identity(IdentityStatus::Active).can_login());
        assert!(!sample_identity(IdentityStatus::Disabled).can_login());
    }

    #[test]
    fn test_claims_projection() {
        let identity = sample_identity(IdentityStatus::Active);
        let claims = identity.claims();
        assert_eq!(claims.identity_id, identity.identity_id);
        assert_eq!(claims.email, identity.email);
        assert_eq!(claims.role, identity.role);
    }
}
