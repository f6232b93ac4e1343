//! Tenant permission override service.
//!
//! A tenant's override row is an independent copy of a system role's
//! grants plus extra custom permissions. Entry edits go straight to the
//! store as single atomic statements; the caller's in-memory row is only
//! used to locate the record.

use rollcall_core::error::RollcallResult;
use rollcall_core::models::permission::PermissionSet;
use rollcall_core::models::role::Role;
use rollcall_core::models::tenant_permission::{OverrideField, TenantPermission};
use rollcall_core::repository::{Pagination, RoleRepository, TenantPermissionRepository};
use tracing::{debug, info};
use uuid::Uuid;

use crate::validation::{validate_entry, validate_slug};

const SYSTEM_ROLE_PAGE: u64 = 100;

pub struct TenantPermissionService<T: TenantPermissionRepository, R: RoleRepository> {
    overrides: T,
    roles: R,
}

impl<T: TenantPermissionRepository, R: RoleRepository> TenantPermissionService<T, R> {
    pub fn new(overrides: T, roles: R) -> Self {
        Self { overrides, roles }
    }

    /// Active override for `(tenant_id, role_slug)`.
    pub async fn get_for_tenant_and_role(
        &self,
        tenant_id: Uuid,
        role_slug: &str,
    ) -> RollcallResult<Option<TenantPermission>> {
        Ok(self
            .overrides
            .find(tenant_id, role_slug)
            .await?
            .filter(|tp| tp.is_active))
    }

    /// Create or overwrite the override's base grants. Custom
    /// permissions are left as they are.
    pub async fn upsert(
        &self,
        tenant_id: Uuid,
        role_slug: &str,
        permissions: PermissionSet,
        module_access: PermissionSet,
    ) -> RollcallResult<TenantPermission> {
        validate_slug(role_slug)?;
        let tp = self
            .overrides
            .upsert(tenant_id, role_slug, permissions, module_access)
            .await?;
        info!(%tenant_id, role_slug, "Tenant permissions upserted");
        Ok(tp)
    }

    pub async fn add_permission(
        &self,
        tp: &TenantPermission,
        permission: &str,
        is_custom: bool,
    ) -> RollcallResult<TenantPermission> {
        self.edit(tp, OverrideField::permissions(is_custom), permission, true)
            .await
    }

    pub async fn remove_permission(
        &self,
        tp: &TenantPermission,
        permission: &str,
        is_custom: bool,
    ) -> RollcallResult<TenantPermission> {
        self.edit(tp, OverrideField::permissions(is_custom), permission, false)
            .await
    }

    pub async fn add_module_access(
        &self,
        tp: &TenantPermission,
        module: &str,
    ) -> RollcallResult<TenantPermission> {
        self.edit(tp, OverrideField::ModuleAccess, module, true)
            .await
    }

    pub async fn remove_module_access(
        &self,
        tp: &TenantPermission,
        module: &str,
    ) -> RollcallResult<TenantPermission> {
        self.edit(tp, OverrideField::ModuleAccess, module, false)
            .await
    }

    async fn edit(
        &self,
        tp: &TenantPermission,
        field: OverrideField,
        entry: &str,
        add: bool,
    ) -> RollcallResult<TenantPermission> {
        validate_entry(entry)?;
        let updated = if add {
            self.overrides
                .add_entry(tp.tenant_id, &tp.role_slug, field, entry)
                .await?
        } else {
            self.overrides
                .remove_entry(tp.tenant_id, &tp.role_slug, field, entry)
                .await?
        };
        info!(
            tenant_id = %tp.tenant_id,
            role_slug = %tp.role_slug,
            field = field.column(),
            entry,
            add,
            "Tenant permission entry changed"
        );
        Ok(updated)
    }

    pub fn effective_permissions(&self, tp: &TenantPermission) -> PermissionSet {
        tp.effective_permissions()
    }

    /// Copy the system role's grants into the tenant's override.
    ///
    /// Writes nothing and returns `None` when no system role has that
    /// slug.
    pub async fn copy_from_default_role(
        &self,
        tenant_id: Uuid,
        role_slug: &str,
    ) -> RollcallResult<Option<TenantPermission>> {
        let Some(role) = self.system_role(role_slug).await? else {
            debug!(%tenant_id, role_slug, "No system role to copy from");
            return Ok(None);
        };
        let tp = self
            .overrides
            .upsert(tenant_id, role_slug, role.permissions, role.module_access)
            .await?;
        info!(%tenant_id, role_slug, "Tenant permissions copied from system role");
        Ok(Some(tp))
    }

    /// Restore the override to the system role's grants and drop every
    /// custom permission.
    ///
    /// Returns `None` without writing when the tenant has no row. When
    /// the system role is gone the existing row is returned unchanged.
    pub async fn reset_to_default(
        &self,
        tenant_id: Uuid,
        role_slug: &str,
    ) -> RollcallResult<Option<TenantPermission>> {
        let Some(existing) = self.overrides.find(tenant_id, role_slug).await? else {
            debug!(%tenant_id, role_slug, "Nothing to reset");
            return Ok(None);
        };
        let Some(role) = self.system_role(role_slug).await? else {
            debug!(%tenant_id, role_slug, "System role missing, override kept");
            return Ok(Some(existing));
        };
        let tp = self
            .overrides
            .replace_with_defaults(tenant_id, role_slug, role.permissions, role.module_access)
            .await?;
        info!(%tenant_id, role_slug, "Tenant permissions reset to default");
        Ok(Some(tp))
    }

    /// Global row for `role_slug`, provided it is a system role.
    async fn system_role(&self, role_slug: &str) -> RollcallResult<Option<Role>> {
        Ok(self
            .roles
            .find_by_slug(None, role_slug)
            .await?
            .filter(|r| r.is_system))
    }

    /// Copy every live system role into the tenant's override table.
    pub async fn initialize_tenant(&self, tenant_id: Uuid) -> RollcallResult<Vec<TenantPermission>> {
        let mut copied = Vec::new();
        let mut offset = 0;
        loop {
            let page = self
                .roles
                .list(
                    None,
                    Pagination {
                        offset,
                        limit: SYSTEM_ROLE_PAGE,
                    },
                )
                .await?;
            let fetched = page.items.len() as u64;
            for role in page.items.into_iter().filter(|r| r.is_system) {
                copied.push(
                    self.overrides
                        .upsert(tenant_id, &role.slug, role.permissions, role.module_access)
                        .await?,
                );
            }
            offset += fetched;
            if fetched == 0 || offset >= page.total {
                break;
            }
        }
        info!(%tenant_id, count = copied.len(), "Tenant permissions initialized");
        Ok(copied)
    }

    /// Every override row of a tenant, active or not.
    pub async fn list_for_tenant(&self, tenant_id: Uuid) -> RollcallResult<Vec<TenantPermission>> {
        self.overrides.list_for_tenant(tenant_id).await
    }

    /// Stop an override from applying without deleting it.
    pub async fn deactivate(
        &self,
        tenant_id: Uuid,
        role_slug: &str,
    ) -> RollcallResult<TenantPermission> {
        let tp = self
            .overrides
            .set_active(tenant_id, role_slug, false)
            .await?;
        info!(%tenant_id, role_slug, "Tenant permissions deactivated");
        Ok(tp)
    }
}
