//! SurrealDB implementation of [`RoleAssignmentRepository`].

use std::collections::HashSet;

use orgdash_core::error::OrgResult;
use orgdash_core::repository::RoleAssignmentRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the role assignment repository.
///
/// The `(org_id, user_id, role)` triple carries a UNIQUE index, so a
/// duplicate slipping past the existence check is rejected by the
/// database rather than stored twice.
#[derive(Clone)]
pub struct SurrealRoleAssignmentRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealRoleAssignmentRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn assignment_exists(
        &self,
        org_id: Uuid,
        user_id: Uuid,
        role: &str,
    ) -> Result<bool, DbError> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM user_role \
                 WHERE org_id = $org_id AND user_id = $user_id \
                 AND role = $role GROUP ALL",
            )
            .bind(("org_id", org_id.to_string()))
            .bind(("user_id", user_id.to_string()))
            .bind(("role", role.to_string()))
            .await?;

        let rows: Vec<CountRow> = result.take(0)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0) > 0)
    }
}

impl<C: Connection> RoleAssignmentRepository for SurrealRoleAssignmentRepository<C> {
    async fn grant(&self, org_id: Uuid, user_id: Uuid, role: &str) -> OrgResult<()> {
        if self.assignment_exists(org_id, user_id, role).await? {
            return Ok(());
        }

        let result = self
            .db
            .query(
                "CREATE type::record('user_role', $id) SET \
                 org_id = $org_id, user_id = $user_id, role = $role",
            )
            .bind(("id", Uuid::new_v4().to_string()))
            .bind(("org_id", org_id.to_string()))
            .bind(("user_id", user_id.to_string()))
            .bind(("role", role.to_string()))
            .await
            .map_err(DbError::from)?;

        result.check().map_err(|e| DbError::Query(e.to_string()))?;

        Ok(())
    }

    async fn revoke(&self, org_id: Uuid, user_id: Uuid, role: &str) -> OrgResult<()> {
        self.db
            .query(
                "DELETE user_role \
                 WHERE org_id = $org_id AND user_id = $user_id \
                 AND role = $role",
            )
            .bind(("org_id", org_id.to_string()))
            .bind(("user_id", user_id.to_string()))
            .bind(("role", role.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn roles_for_user(&self, org_id: Uuid, user_id: Uuid) -> OrgResult<Vec<String>> {
        let mut result = self
            .db
            .query(
                "SELECT VALUE role FROM user_role \
                 WHERE org_id = $org_id AND user_id = $user_id",
            )
            .bind(("org_id", org_id.to_string()))
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let roles: Vec<String> = result.take(0).map_err(DbError::from)?;
        Ok(roles)
    }

    async fn users_with_role(&self, org_id: Uuid, role: &str) -> OrgResult<Vec<Uuid>> {
        let mut result = self
            .db
            .query(
                "SELECT VALUE user_id FROM user_role \
                 WHERE org_id = $org_id AND role = $role",
            )
            .bind(("org_id", org_id.to_string()))
            .bind(("role", role.to_string()))
            .await
            .map_err(DbError::from)?;

        let ids: Vec<String> = result.take(0).map_err(DbError::from)?;
        let users = ids
            .iter()
            .map(|id| {
                Uuid::parse_str(id).map_err(|e| DbError::Query(format!("invalid user UUID: {e}")))
            })
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(users)
    }

    async fn users_in_org(&self, org_id: Uuid) -> OrgResult<Vec<Uuid>> {
        let mut result = self
            .db
            .query("SELECT VALUE user_id FROM user_role WHERE org_id = $org_id")
            .bind(("org_id", org_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let ids: Vec<String> = result.take(0).map_err(DbError::from)?;

        // A user may hold several roles; report each user once.
        let mut seen = HashSet::new();
        let mut users = Vec::new();
        for id in ids {
            let user =
                Uuid::parse_str(&id).map_err(|e| DbError::Query(format!("invalid user UUID: {e}")))?;
            if seen.insert(user) {
                users.push(user);
            }
        }

        Ok(users)
    }
}
