//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs are stored as strings. Org subdomain/domain uniqueness is
//! enforced in the repository (both fields are optional, and multiple
//! absent values must coexist), so those columns carry no index here.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1 — initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Orgs (global scope)
-- =======================================================================
DEFINE TABLE org SCHEMAFULL;
DEFINE FIELD name ON TABLE org TYPE string;
DEFINE FIELD language ON TABLE org TYPE option<string>;
DEFINE FIELD subdomain ON TABLE org TYPE option<string>;
DEFINE FIELD domain ON TABLE org TYPE option<string>;
DEFINE FIELD timezone ON TABLE org TYPE string DEFAULT 'UTC';
DEFINE FIELD api_token ON TABLE org TYPE option<string>;
DEFINE FIELD config ON TABLE org TYPE object FLEXIBLE DEFAULT {};
DEFINE FIELD is_active ON TABLE org TYPE bool DEFAULT true;
DEFINE FIELD created_at ON TABLE org TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE org TYPE datetime \
    DEFAULT time::now();

-- =======================================================================
-- Role assignments (org scope)
-- =======================================================================
DEFINE TABLE user_role SCHEMAFULL;
DEFINE FIELD org_id ON TABLE user_role TYPE string;
DEFINE FIELD user_id ON TABLE user_role TYPE string;
DEFINE FIELD role ON TABLE user_role TYPE string;
DEFINE INDEX idx_user_role_triple ON TABLE user_role \
    COLUMNS org_id, user_id, role UNIQUE;
DEFINE INDEX idx_user_role_org ON TABLE user_role COLUMNS org_id;

-- =======================================================================
-- Invitations (org scope)
-- =======================================================================
DEFINE TABLE invitation SCHEMAFULL;
DEFINE FIELD org_id ON TABLE invitation TYPE string;
DEFINE FIELD email ON TABLE invitation TYPE string;
DEFINE FIELD secret ON TABLE invitation TYPE string;
DEFINE FIELD role ON TABLE invitation TYPE string;
DEFINE FIELD is_active ON TABLE invitation TYPE bool DEFAULT true;
DEFINE FIELD created_at ON TABLE invitation TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_invitation_secret ON TABLE invitation \
    COLUMNS secret UNIQUE;
DEFINE INDEX idx_invitation_org ON TABLE invitation COLUMNS org_id;

-- =======================================================================
-- Task states (org scope)
-- =======================================================================
DEFINE TABLE task_state SCHEMAFULL;
DEFINE FIELD org_id ON TABLE task_state TYPE string;
DEFINE FIELD task_key ON TABLE task_state TYPE string;
DEFINE FIELD started_on ON TABLE task_state TYPE option<datetime>;
DEFINE FIELD ended_on ON TABLE task_state TYPE option<datetime>;
DEFINE FIELD last_successfully_started_on ON TABLE task_state \
    TYPE option<datetime>;
DEFINE FIELD last_results ON TABLE task_state TYPE option<string>;
DEFINE FIELD is_failing ON TABLE task_state TYPE bool DEFAULT false;
DEFINE FIELD is_disabled ON TABLE task_state TYPE bool DEFAULT false;
DEFINE INDEX idx_task_state_org_key ON TABLE task_state \
    COLUMNS org_id, task_key UNIQUE;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
/// All DEFINE statements are idempotent so re-running is safe.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    // Ensure migration tracking table exists (idempotent).
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    // Determine current schema version.
    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            // Record the applied migration.
            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(
                version = migration.version,
                "Migration applied successfully"
            );
        }
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
///
/// Exposed for testing with in-memory SurrealDB instances that
/// bypass the migration runner.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_v1_is_nonempty() {
        assert!(!SCHEMA_V1.is_empty());
    }

    #[test]
    fn migrations_are_ordered() {
        for window in MIGRATIONS.windows(2) {
            assert!(
                window[0].version < window[1].version,
                "Migrations must be in ascending version order"
            );
        }
    }
}
