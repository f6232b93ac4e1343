//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Role rows are addressed by
//! `(tenant_id, slug)` where `tenant_id = None` is the global scope;
//! tenant permission rows are addressed by `(tenant_id, role_slug)`.

use uuid::Uuid;

use crate::error::RollcallResult;
use crate::models::{
    permission::PermissionSet,
    role::{CreateRole, Role, UpdateRole},
    tenant_permission::{OverrideField, TenantPermission},
    user::{CreateUser, UpdateUser, User},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

pub trait RoleRepository: Send + Sync {
    /// Insert a new role. Fails with `AlreadyExists` if a live role with
    /// the same slug exists in the same scope.
    fn create(&self, input: CreateRole) -> impl Future<Output = RollcallResult<Role>> + Send;

    fn get_by_id(&self, id: Uuid) -> impl Future<Output = RollcallResult<Role>> + Send;

    /// Live (not soft-deleted) role with `slug` in exactly this scope.
    fn find_by_slug(
        &self,
        tenant_id: Option<Uuid>,
        slug: &str,
    ) -> impl Future<Output = RollcallResult<Option<Role>>> + Send;

    fn update(
        &self,
        id: Uuid,
        input: UpdateRole,
    ) -> impl Future<Output = RollcallResult<Role>> + Send;

    /// Soft-delete: stamps `deleted_at` and deactivates the row.
    fn soft_delete(&self, id: Uuid) -> impl Future<Output = RollcallResult<()>> + Send;

    /// Atomic insert-or-update keyed by `(tenant_id, slug)`. Revives a
    /// soft-deleted row.
    fn upsert_by_slug(&self, input: CreateRole)
    -> impl Future<Output = RollcallResult<Role>> + Send;

    /// Live roles in one scope, oldest first.
    fn list(
        &self,
        tenant_id: Option<Uuid>,
        pagination: Pagination,
    ) -> impl Future<Output = RollcallResult<PaginatedResult<Role>>> + Send;
}

// ---------------------------------------------------------------------------
// Tenant permission overrides
// ---------------------------------------------------------------------------

pub trait TenantPermissionRepository: Send + Sync {
    /// Row for `(tenant_id, role_slug)`, active or not.
    fn find(
        &self,
        tenant_id: Uuid,
        role_slug: &str,
    ) -> impl Future<Output = RollcallResult<Option<TenantPermission>>> + Send;

    /// Atomic keyed upsert of the base grant. Marks the row active and
    /// leaves `custom_permissions` as it was (empty for new rows).
    fn upsert(
        &self,
        tenant_id: Uuid,
        role_slug: &str,
        permissions: PermissionSet,
        module_access: PermissionSet,
    ) -> impl Future<Output = RollcallResult<TenantPermission>> + Send;

    /// Add one entry to the selected list in a single statement.
    /// Fails with `NotFound` if the row does not exist.
    fn add_entry(
        &self,
        tenant_id: Uuid,
        role_slug: &str,
        field: OverrideField,
        entry: &str,
    ) -> impl Future<Output = RollcallResult<TenantPermission>> + Send;

    /// Remove one entry from the selected list in a single statement.
    /// Fails with `NotFound` if the row does not exist.
    fn remove_entry(
        &self,
        tenant_id: Uuid,
        role_slug: &str,
        field: OverrideField,
        entry: &str,
    ) -> impl Future<Output = RollcallResult<TenantPermission>> + Send;

    /// Overwrite the base grant and clear custom permissions on an
    /// existing row. Fails with `NotFound` if the row does not exist.
    fn replace_with_defaults(
        &self,
        tenant_id: Uuid,
        role_slug: &str,
        permissions: PermissionSet,
        module_access: PermissionSet,
    ) -> impl Future<Output = RollcallResult<TenantPermission>> + Send;

    fn set_active(
        &self,
        tenant_id: Uuid,
        role_slug: &str,
        is_active: bool,
    ) -> impl Future<Output = RollcallResult<TenantPermission>> + Send;

    /// Every row of a tenant, ordered by role slug.
    fn list_for_tenant(
        &self,
        tenant_id: Uuid,
    ) -> impl Future<Output = RollcallResult<Vec<TenantPermission>>> + Send;
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

pub trait UserRepository: Send + Sync {
    fn create(&self, input: CreateUser) -> impl Future<Output = RollcallResult<User>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = RollcallResult<User>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateUser,
    ) -> impl Future<Output = RollcallResult<User>> + Send;
    /// Soft-delete: sets `is_active` to false.
    fn deactivate(&self, id: Uuid) -> impl Future<Output = RollcallResult<()>> + Send;

    /// Number of active users holding `role_slug`. With a tenant, only
    /// that tenant's users are counted.
    fn count_active_with_role(
        &self,
        tenant_id: Option<Uuid>,
        role_slug: &str,
    ) -> impl Future<Output = RollcallResult<u64>> + Send;

    fn list(
        &self,
        tenant_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = RollcallResult<PaginatedResult<User>>> + Send;
}
