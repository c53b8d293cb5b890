//! Postgres Identity Store
//!
//! Read-mostly adapter over the `identities` table owned by the account
//! management subsystem. Lookups are case-insensitive on email; the only
//! write this subsystem performs is the last-login timestamp.

use chrono::{DateTime, Utc};
use kernel::id::IdentityId;
use platform::password::HashedPassword;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::Identity;
use crate::domain::repository::IdentityStore;
use crate::error::{SessionError, SessionResult};

/// Database row for an identity
#[derive(Debug, sqlx::FromRow)]
struct IdentityRow {
    identity_id: Uuid,
    email: String,
    role: String,
    status: String,
    password_hash: String,
    last_login_at: Option<DateTime<Utc>>,
}

impl IdentityRow {
    fn into_entity(self) -> SessionResult<Identity> {
        let role = self
            .role
            .parse()
            .map_err(|e: String| SessionError::Internal(format!("Identity row: {e}")))?;
        let status = self
            .status
            .parse()
            .map_err(|e: String| SessionError::Internal(format!("Identity row: {e}")))?;
        let password_hash = HashedPassword::from_phc_string(&self.password_hash)
            .map_err(|e| SessionError::Internal(format!("Identity row: {e}")))?;

        Ok(Identity {
            identity_id: IdentityId::from_uuid(self.identity_id),
            email: self.email,
            role,
            status,
            password_hash,
            last_login_at: self.last_login_at,
        })
    }
}

/// Postgres-backed identity store
#[derive(Debug, Clone)]
pub struct PgIdentityStore {
    pool: PgPool,
}

impl PgIdentityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl IdentityStore for PgIdentityStore {
    async fn find_by_email(&self, email: &str) -> SessionResult<Option<Identity>> {
        let row: Option<IdentityRow> = sqlx::query_as(
            r#"
            SELECT identity_id, email, role, status, password_hash, last_login_at
            FROM identities
            WHERE lower(email) = lower($1)
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(IdentityRow::into_entity).transpose()
    }

    async fn find_by_id(&self, identity_id: &IdentityId) -> SessionResult<Option<Identity>> {
        let row: Option<IdentityRow> = sqlx::query_as(
            r#"
            SELECT identity_id, email, role, status, password_hash, last_login_at
            FROM identities
            WHERE identity_id = $1
            "#,
        )
        .bind(identity_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(IdentityRow::into_entity).transpose()
    }

    async fn update_last_login(&self, identity_id: &IdentityId) -> SessionResult<()> {
        sqlx::query(
            r#"
            UPDATE identities
            SET last_login_at = now()
            WHERE identity_id = $1
            "#,
        )
        .bind(identity_id.as_uuid())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
