//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode. UUIDs are stored as
//! strings; permission sets are stored as string arrays where `"*"`
//! is the wildcard grant.

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
// Schema v1 — roles, tenant permission overrides, users
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Roles (global rows have no tenant_id; record id derives from scope+slug)
-- =======================================================================
DEFINE TABLE role SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE role TYPE option<string>;
DEFINE FIELD name ON TABLE role TYPE string;
DEFINE FIELD slug ON TABLE role TYPE string;
DEFINE FIELD description ON TABLE role TYPE string DEFAULT '';
DEFINE FIELD is_system ON TABLE role TYPE bool DEFAULT false;
DEFINE FIELD is_default ON TABLE role TYPE bool DEFAULT false;
DEFINE FIELD permissions ON TABLE role TYPE array<string> DEFAULT [];
DEFINE FIELD module_access ON TABLE role TYPE array<string> DEFAULT [];
DEFINE FIELD is_active ON TABLE role TYPE bool DEFAULT true;
DEFINE FIELD created_at ON TABLE role TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE role TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD deleted_at ON TABLE role TYPE option<datetime>;
DEFINE INDEX idx_role_scope_slug ON TABLE role \
    COLUMNS tenant_id, slug UNIQUE;

-- =======================================================================
-- Tenant permission overrides (one row per tenant + role slug)
-- =======================================================================
DEFINE TABLE tenant_permission SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE tenant_permission TYPE string;
DEFINE FIELD role_slug ON TABLE tenant_permission TYPE string;
DEFINE FIELD permissions ON TABLE tenant_permission TYPE array<string> \
    DEFAULT [];
DEFINE FIELD module_access ON TABLE tenant_permission \
    TYPE array<string> DEFAULT [];
DEFINE FIELD custom_permissions ON TABLE tenant_permission \
    TYPE array<string> DEFAULT [];
DEFINE FIELD is_active ON TABLE tenant_permission TYPE bool \
    DEFAULT true;
DEFINE FIELD created_at ON TABLE tenant_permission TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE tenant_permission TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_tenant_permission_key ON TABLE tenant_permission \
    COLUMNS tenant_id, role_slug UNIQUE;

-- =======================================================================
-- Users (authorization projection)
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE user TYPE option<string>;
DEFINE FIELD name ON TABLE user TYPE string;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD role ON TABLE user TYPE string;
DEFINE FIELD is_active ON TABLE user TYPE bool DEFAULT true;
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_email ON TABLE user COLUMNS email UNIQUE;
DEFINE INDEX idx_user_tenant_role ON TABLE user \
    COLUMNS tenant_id, role;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Highest applied migration version, `0` on a fresh database.
async fn current_version<C: Connection>(db: &Surreal<C>) -> Result<u32, DbError> {
    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    Ok(records.first().map_or(0, |m| m.version))
}

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates the `_migration` tracking table on first run, then applies
/// each migration newer than the recorded version together with its
/// tracking row. Returns how many migrations were applied.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<usize, DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let current = current_version(db).await?;
    let pending: Vec<&Migration> = MIGRATIONS.iter().filter(|m| m.version > current).collect();

    if pending.is_empty() {
        info!(version = current, "Schema is up to date");
        return Ok(0);
    }

    for migration in &pending {
        info!(
            version = migration.version,
            name = migration.name,
            "Applying migration"
        );

        let statement = format!(
            "{}\nCREATE _migration SET version = $version, name = $name;",
            migration.sql
        );
        db.query(statement)
            .bind(("version", migration.version))
            .bind(("name", migration.name.to_string()))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;
    }

    info!(applied = pending.len(), "Migrations applied");
    Ok(pending.len())
}

/// Returns the raw schema DDL for version 1.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_v1_defines_every_table() {
        for table in ["role", "tenant_permission", "user"] {
            assert!(
                SCHEMA_V1.contains(&format!("DEFINE TABLE {table} SCHEMAFULL")),
                "missing table {table}"
            );
        }
    }

    #[test]
    fn natural_keys_are_unique() {
        assert!(SCHEMA_V1.contains("COLUMNS tenant_id, slug UNIQUE"));
        assert!(SCHEMA_V1.contains("COLUMNS tenant_id, role_slug UNIQUE"));
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
