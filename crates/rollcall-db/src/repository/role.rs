//! SurrealDB implementation of [`RoleRepository`].
//!
//! Role record ids are derived from `(tenant_id, slug)` (see
//! [`crate::keys`]), so there is at most one row per slug and scope.
//! Deleted roles keep their row with `deleted_at` set.

use chrono::{DateTime, Utc};
use rollcall_core::error::{RollcallError, RollcallResult};
use rollcall_core::models::role::{CreateRole, Role, UpdateRole};
use rollcall_core::repository::{PaginatedResult, Pagination, RoleRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbError;
use crate::keys::{parse_uuid, role_record_id};

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct RoleRow {
    tenant_id: Option<String>,
    name: String,
    slug: String,
    description: String,
    is_system: bool,
    is_default: bool,
    permissions: Vec<String>,
    module_access: Vec<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl RoleRow {
    fn into_role(self, id: Uuid) -> Result<Role, DbError> {
        let tenant_id = self
            .tenant_id
            .as_deref()
            .map(|t| parse_uuid(t, "tenant"))
            .transpose()?;
        Ok(Role {
            id,
            tenant_id,
            name: self.name,
            slug: self.slug,
            description: self.description,
            is_system: self.is_system,
            is_default: self.is_default,
            permissions: self.permissions.into(),
            module_access: self.module_access.into(),
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
            deleted_at: self.deleted_at,
        })
    }
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct RoleRowWithId {
    record_id: String,
    tenant_id: Option<String>,
    name: String,
    slug: String,
    description: String,
    is_system: bool,
    is_default: bool,
    permissions: Vec<String>,
    module_access: Vec<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl RoleRowWithId {
    fn try_into_role(self) -> Result<Role, DbError> {
        let id = parse_uuid(&self.record_id, "role")?;
        RoleRow {
            tenant_id: self.tenant_id,
            name: self.name,
            slug: self.slug,
            description: self.description,
            is_system: self.is_system,
            is_default: self.is_default,
            permissions: self.permissions,
            module_access: self.module_access,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
            deleted_at: self.deleted_at,
        }
        .into_role(id)
    }
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// `WHERE` fragment selecting one tenant scope; `$tenant_id` must be
/// bound when a tenant is given.
fn scope_filter(tenant_id: Option<Uuid>) -> &'static str {
    if tenant_id.is_some() {
        "tenant_id = $tenant_id"
    } else {
        "tenant_id = NONE"
    }
}

/// `SET` assignments shared by every keyed role write.
const ROLE_FIELDS: &str = "tenant_id = $tenant_id, \
     name = $name, slug = $slug, description = $description, \
     is_system = $is_system, is_default = $is_default, \
     permissions = $permissions, module_access = $module_access, \
     is_active = true, deleted_at = NONE, updated_at = time::now()";

/// Fails with a record-id collision when the key is already taken.
fn create_statement() -> String {
    format!(
        "CREATE type::record('role', $id) SET {ROLE_FIELDS}, \
         created_at = time::now()"
    )
}

/// Rewrites the row only if it was soft-deleted.
fn revive_statement() -> String {
    format!(
        "UPDATE type::record('role', $id) SET {ROLE_FIELDS}, \
         created_at = time::now() WHERE deleted_at != NONE"
    )
}

fn upsert_statement() -> String {
    format!("UPSERT type::record('role', $id) SET {ROLE_FIELDS}")
}

/// SurrealDB implementation of the Role repository.
#[derive(Clone)]
pub struct SurrealRoleRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealRoleRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    /// Run one keyed write statement carrying every field of `input`.
    ///
    /// `statement` must address `type::record('role', $id)` and end in a
    /// `SET` list built from [`ROLE_FIELDS`]. Returns `None` when the
    /// statement's `WHERE` clause matched nothing.
    async fn write_keyed(
        &self,
        statement: &str,
        input: CreateRole,
    ) -> RollcallResult<Option<Role>> {
        let id = role_record_id(input.tenant_id, &input.slug);

        let result = self
            .db
            .query(statement)
            .bind(("id", id.to_string()))
            .bind(("tenant_id", input.tenant_id.map(|t| t.to_string())))
            .bind(("name", input.name))
            .bind(("slug", input.slug))
            .bind(("description", input.description))
            .bind(("is_system", input.is_system))
            .bind(("is_default", input.is_default))
            .bind(("permissions", input.permissions.to_vec()))
            .bind(("module_access", input.module_access.to_vec()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement(e, "role"))?;

        let rows: Vec<RoleRow> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.into_role(id)?)),
            None => Ok(None),
        }
    }

    async fn fetch_live(&self, id: Uuid) -> RollcallResult<Option<Role>> {
        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('role', $id) \
                 WHERE deleted_at = NONE",
            )
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RoleRow> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.into_role(id)?)),
            None => Ok(None),
        }
    }
}

impl<C: Connection> RoleRepository for SurrealRoleRepository<C> {
    async fn create(&self, input: CreateRole) -> RollcallResult<Role> {
        let entity = format!("role {}", input.slug);

        match self.write_keyed(&create_statement(), input.clone()).await {
            Ok(Some(role)) => return Ok(role),
            Ok(None) => {}
            Err(RollcallError::AlreadyExists { .. }) => {}
            Err(e) => return Err(e),
        }

        // The key is taken. Only a soft-deleted row may be revived.
        self.write_keyed(&revive_statement(), input)
            .await?
            .ok_or(RollcallError::AlreadyExists { entity })
    }

    async fn get_by_id(&self, id: Uuid) -> RollcallResult<Role> {
        self.fetch_live(id).await?.ok_or_else(|| {
            DbError::NotFound {
                entity: "role".into(),
                id: id.to_string(),
            }
            .into()
        })
    }

    async fn find_by_slug(
        &self,
        tenant_id: Option<Uuid>,
        slug: &str,
    ) -> RollcallResult<Option<Role>> {
        debug!(?tenant_id, slug, "Looking up role by slug");
        self.fetch_live(role_record_id(tenant_id, slug)).await
    }

    async fn update(&self, id: Uuid, input: UpdateRole) -> RollcallResult<Role> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.description.is_some() {
            sets.push("description = $description");
        }
        if input.is_default.is_some() {
            sets.push("is_default = $is_default");
        }
        if input.permissions.is_some() {
            sets.push("permissions = $permissions");
        }
        if input.module_access.is_some() {
            sets.push("module_access = $module_access");
        }
        if input.is_active.is_some() {
            sets.push("is_active = $is_active");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('role', $id) SET {} \
             WHERE deleted_at = NONE",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(description) = input.description {
            builder = builder.bind(("description", description));
        }
        if let Some(is_default) = input.is_default {
            builder = builder.bind(("is_default", is_default));
        }
        if let Some(permissions) = input.permissions {
            builder = builder.bind(("permissions", permissions.to_vec()));
        }
        if let Some(module_access) = input.module_access {
            builder = builder.bind(("module_access", module_access.to_vec()));
        }
        if let Some(is_active) = input.is_active {
            builder = builder.bind(("is_active", is_active));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<RoleRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "role".into(),
            id: id_str,
        })?;

        Ok(row.into_role(id)?)
    }

    async fn soft_delete(&self, id: Uuid) -> RollcallResult<()> {
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "UPDATE type::record('role', $id) SET \
                 deleted_at = time::now(), is_active = false, \
                 updated_at = time::now() \
                 WHERE deleted_at = NONE",
            )
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;
        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<RoleRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(DbError::NotFound {
                entity: "role".into(),
                id: id_str,
            }
            .into());
        }

        Ok(())
    }

    async fn upsert_by_slug(&self, input: CreateRole) -> RollcallResult<Role> {
        let id = role_record_id(input.tenant_id, &input.slug);
        self.write_keyed(&upsert_statement(), input)
            .await?
            .ok_or_else(|| {
                DbError::NotFound {
                    entity: "role".into(),
                    id: id.to_string(),
                }
                .into()
            })
    }

    async fn list(
        &self,
        tenant_id: Option<Uuid>,
        pagination: Pagination,
    ) -> RollcallResult<PaginatedResult<Role>> {
        let tenant_id_str = tenant_id.map(|t| t.to_string());
        let scope = scope_filter(tenant_id);

        let mut count_result = self
            .db
            .query(format!(
                "SELECT count() AS total FROM role \
                 WHERE {scope} AND deleted_at = NONE GROUP ALL"
            ))
            .bind(("tenant_id", tenant_id_str.clone()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(format!(
                "SELECT meta::id(id) AS record_id, * FROM role \
                 WHERE {scope} AND deleted_at = NONE \
                 ORDER BY created_at ASC, slug ASC \
                 LIMIT $limit START $offset"
            ))
            .bind(("tenant_id", tenant_id_str))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RoleRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_role())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
