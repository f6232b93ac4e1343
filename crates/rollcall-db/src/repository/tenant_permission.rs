//! SurrealDB implementation of [`TenantPermissionRepository`].
//!
//! Each `(tenant_id, role_slug)` pair maps to one deterministic record.
//! Every mutation is a single statement on that record: `UPSERT` for the
//! keyed write, `array::union` / `array::complement` for entry edits.

use chrono::{DateTime, Utc};
use rollcall_core::error::RollcallResult;
use rollcall_core::models::permission::{PermissionSet, WILDCARD};
use rollcall_core::models::tenant_permission::{OverrideField, TenantPermission};
use rollcall_core::repository::TenantPermissionRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::keys::{parse_uuid, tenant_permission_record_id};

#[derive(Debug, SurrealValue)]
struct TenantPermissionRow {
    tenant_id: String,
    role_slug: String,
    permissions: Vec<String>,
    module_access: Vec<String>,
    custom_permissions: Vec<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TenantPermissionRow {
    fn into_tenant_permission(self, id: Uuid) -> Result<TenantPermission, DbError> {
        Ok(TenantPermission {
            id,
            tenant_id: parse_uuid(&self.tenant_id, "tenant")?,
            role_slug: self.role_slug,
            permissions: self.permissions.into(),
            module_access: self.module_access.into(),
            custom_permissions: self.custom_permissions.into(),
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct TenantPermissionRowWithId {
    record_id: String,
    tenant_id: String,
    role_slug: String,
    permissions: Vec<String>,
    module_access: Vec<String>,
    custom_permissions: Vec<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TenantPermissionRowWithId {
    fn try_into_tenant_permission(self) -> Result<TenantPermission, DbError> {
        let id = parse_uuid(&self.record_id, "tenant permission")?;
        TenantPermissionRow {
            tenant_id: self.tenant_id,
            role_slug: self.role_slug,
            permissions: self.permissions,
            module_access: self.module_access,
            custom_permissions: self.custom_permissions,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_tenant_permission(id)
    }
}

/// `SET` assignment that adds or removes `$entry` on `column`.
///
/// The wildcard replaces the whole list: adding it stores `["*"]`,
/// removing it empties the list.
fn entry_assignment(column: &str, entry: &str, add: bool) -> String {
    match (add, entry == WILDCARD) {
        (true, true) => format!("{column} = ['{WILDCARD}']"),
        (true, false) => format!("{column} = array::union({column}, [$entry])"),
        (false, true) => format!("{column} = []"),
        (false, false) => format!("{column} = array::complement({column}, [$entry])"),
    }
}

/// SurrealDB implementation of the tenant permission override store.
#[derive(Clone)]
pub struct SurrealTenantPermissionRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealTenantPermissionRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    /// Run an `UPDATE` on an existing keyed row and return the result.
    async fn update_existing(
        &self,
        tenant_id: Uuid,
        role_slug: &str,
        assignments: &str,
        entry: Option<&str>,
        permissions: Option<PermissionSet>,
        module_access: Option<PermissionSet>,
    ) -> RollcallResult<TenantPermission> {
        let id = tenant_permission_record_id(tenant_id, role_slug);
        let id_str = id.to_string();

        let query = format!(
            "UPDATE type::record('tenant_permission', $id) SET \
             {assignments}, updated_at = time::now()"
        );

        let mut builder = self.db.query(query).bind(("id", id_str.clone()));
        if let Some(entry) = entry {
            builder = builder.bind(("entry", entry.to_string()));
        }
        if let Some(permissions) = permissions {
            builder = builder.bind(("permissions", permissions.to_vec()));
        }
        if let Some(module_access) = module_access {
            builder = builder.bind(("module_access", module_access.to_vec()));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<TenantPermissionRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tenant_permission".into(),
            id: format!("tenant={tenant_id},role={role_slug}"),
        })?;

        Ok(row.into_tenant_permission(id)?)
    }
}

impl<C: Connection> TenantPermissionRepository for SurrealTenantPermissionRepository<C> {
    async fn find(
        &self,
        tenant_id: Uuid,
        role_slug: &str,
    ) -> RollcallResult<Option<TenantPermission>> {
        let id = tenant_permission_record_id(tenant_id, role_slug);

        let mut result = self
            .db
            .query("SELECT * FROM type::record('tenant_permission', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TenantPermissionRow> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.into_tenant_permission(id)?)),
            None => Ok(None),
        }
    }

    async fn upsert(
        &self,
        tenant_id: Uuid,
        role_slug: &str,
        permissions: PermissionSet,
        module_access: PermissionSet,
    ) -> RollcallResult<TenantPermission> {
        let id = tenant_permission_record_id(tenant_id, role_slug);
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "UPSERT type::record('tenant_permission', $id) SET \
                 tenant_id = $tenant_id, role_slug = $role_slug, \
                 permissions = $permissions, module_access = $module_access, \
                 is_active = true, updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("role_slug", role_slug.to_string()))
            .bind(("permissions", permissions.to_vec()))
            .bind(("module_access", module_access.to_vec()))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<TenantPermissionRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tenant_permission".into(),
            id: id_str,
        })?;

        Ok(row.into_tenant_permission(id)?)
    }

    async fn add_entry(
        &self,
        tenant_id: Uuid,
        role_slug: &str,
        field: OverrideField,
        entry: &str,
    ) -> RollcallResult<TenantPermission> {
        let assignment = entry_assignment(field.column(), entry, true);
        self.update_existing(tenant_id, role_slug, &assignment, Some(entry), None, None)
            .await
    }

    async fn remove_entry(
        &self,
        tenant_id: Uuid,
        role_slug: &str,
        field: OverrideField,
        entry: &str,
    ) -> RollcallResult<TenantPermission> {
        let assignment = entry_assignment(field.column(), entry, false);
        self.update_existing(tenant_id, role_slug, &assignment, Some(entry), None, None)
            .await
    }

    async fn replace_with_defaults(
        &self,
        tenant_id: Uuid,
        role_slug: &str,
        permissions: PermissionSet,
        module_access: PermissionSet,
    ) -> RollcallResult<TenantPermission> {
        self.update_existing(
            tenant_id,
            role_slug,
            "permissions = $permissions, module_access = $module_access, \
             custom_permissions = []",
            None,
            Some(permissions),
            Some(module_access),
        )
        .await
    }

    async fn set_active(
        &self,
        tenant_id: Uuid,
        role_slug: &str,
        is_active: bool,
    ) -> RollcallResult<TenantPermission> {
        let assignment = if is_active {
            "is_active = true"
        } else {
            "is_active = false"
        };
        self.update_existing(tenant_id, role_slug, assignment, None, None, None)
            .await
    }

    async fn list_for_tenant(&self, tenant_id: Uuid) -> RollcallResult<Vec<TenantPermission>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM tenant_permission \
                 WHERE tenant_id = $tenant_id \
                 ORDER BY role_slug ASC",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TenantPermissionRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_tenant_permission())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(items)
    }
}
