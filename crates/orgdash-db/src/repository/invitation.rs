//! SurrealDB implementation of [`InvitationRepository`].

use chrono::{DateTime, Utc};
use orgdash_core::error::OrgResult;
use orgdash_core::models::invitation::{self, CreateInvitation, Invitation};
use orgdash_core::repository::InvitationRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct InvitationRow {
    org_id: String,
    email: String,
    secret: String,
    role: String,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl InvitationRow {
    fn into_invitation(self, id: Uuid) -> Result<Invitation, DbError> {
        let org_id = Uuid::parse_str(&self.org_id)
            .map_err(|e| DbError::Query(format!("invalid org UUID: {e}")))?;
        Ok(Invitation {
            id,
            org_id,
            email: self.email,
            secret: self.secret,
            role: self.role,
            is_active: self.is_active,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct InvitationRowWithId {
    record_id: String,
    org_id: String,
    email: String,
    secret: String,
    role: String,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl InvitationRowWithId {
    fn try_into_invitation(self) -> Result<Invitation, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Query(format!("invalid UUID: {e}")))?;
        let org_id = Uuid::parse_str(&self.org_id)
            .map_err(|e| DbError::Query(format!("invalid org UUID: {e}")))?;
        Ok(Invitation {
            id,
            org_id,
            email: self.email,
            secret: self.secret,
            role: self.role,
            is_active: self.is_active,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the Invitation repository.
#[derive(Clone)]
pub struct SurrealInvitationRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealInvitationRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn secret_taken(&self, secret: &str) -> Result<bool, DbError> {
        let mut result = self
            .db
            .query("SELECT count() AS total FROM invitation WHERE secret = $secret GROUP ALL")
            .bind(("secret", secret.to_string()))
            .await?;

        let rows: Vec<CountRow> = result.take(0)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0) > 0)
    }
}

impl<C: Connection> InvitationRepository for SurrealInvitationRepository<C> {
    async fn create(&self, input: CreateInvitation) -> OrgResult<Invitation> {
        // Regenerate until unused; the UNIQUE index on `secret` is the
        // backstop for a concurrent writer picking the same one.
        let mut secret = invitation::generate_secret();
        while self.secret_taken(&secret).await? {
            secret = invitation::generate_secret();
        }

        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('invitation', $id) SET \
                 org_id = $org_id, email = $email, secret = $secret, \
                 role = $role, is_active = true",
            )
            .bind(("id", id_str.clone()))
            .bind(("org_id", input.org_id.to_string()))
            .bind(("email", input.email))
            .bind(("secret", secret))
            .bind(("role", input.role))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<InvitationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "invitation".into(),
            id: id_str,
        })?;

        Ok(row.into_invitation(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> OrgResult<Invitation> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('invitation', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<InvitationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "invitation".into(),
            id: id_str,
        })?;

        Ok(row.into_invitation(id)?)
    }

    async fn get_by_secret(&self, secret: &str) -> OrgResult<Invitation> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM invitation \
                 WHERE secret = $secret",
            )
            .bind(("secret", secret.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<InvitationRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "invitation".into(),
            id: "secret=<redacted>".into(),
        })?;

        Ok(row.try_into_invitation()?)
    }

    async fn deactivate(&self, id: Uuid) -> OrgResult<()> {
        self.db
            .query("UPDATE type::record('invitation', $id) SET is_active = false")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list_by_org(&self, org_id: Uuid) -> OrgResult<Vec<Invitation>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM invitation \
                 WHERE org_id = $org_id \
                 ORDER BY created_at ASC",
            )
            .bind(("org_id", org_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<InvitationRowWithId> = result.take(0).map_err(DbError::from)?;

        let invitations = rows
            .into_iter()
            .map(|row| row.try_into_invitation())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(invitations)
    }
}
