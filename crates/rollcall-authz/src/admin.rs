//! Administrative operations on roles and tenant overrides.
//!
//! Every call carries a [`Caller`]. Super admins reach every scope;
//! anyone else may only touch their own tenant's roles and overrides.

use rollcall_core::catalog::PermissionCatalog;
use rollcall_core::error::{RollcallError, RollcallResult};
use rollcall_core::models::permission::PermissionSet;
use rollcall_core::models::role::{CreateRole, Role, UpdateRole};
use rollcall_core::models::tenant_permission::TenantPermission;
use rollcall_core::repository::{
    PaginatedResult, Pagination, RoleRepository, TenantPermissionRepository, UserRepository,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::caller::Caller;
use crate::defaults::RoleTemplate;
use crate::overrides::TenantPermissionService;
use crate::roles::RoleService;

/// Body of an override upsert.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverrideRequest {
    #[serde(default)]
    pub permissions: PermissionSet,
    #[serde(default)]
    pub module_access: PermissionSet,
}

/// Body of a permission grant or revoke.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionChange {
    pub permission: String,
    /// Target the custom list instead of the base grant.
    #[serde(default)]
    pub is_custom: bool,
}

pub struct AdminService<R, T, U>
where
    R: RoleRepository,
    T: TenantPermissionRepository,
    U: UserRepository,
{
    roles: RoleService<R, U>,
    overrides: TenantPermissionService<T, R>,
    catalog: PermissionCatalog,
}

impl<R, T, U> AdminService<R, T, U>
where
    R: RoleRepository,
    T: TenantPermissionRepository,
    U: UserRepository,
{
    pub fn new(
        roles: RoleService<R, U>,
        overrides: TenantPermissionService<T, R>,
        catalog: PermissionCatalog,
    ) -> Self {
        Self {
            roles,
            overrides,
            catalog,
        }
    }

    pub fn catalog(&self) -> &PermissionCatalog {
        &self.catalog
    }

    pub fn list_defaults(&self) -> Vec<RoleTemplate> {
        self.roles.list_defaults()
    }

    // -- roles ------------------------------------------------------------

    /// Roles of one scope. Global roles are readable by every caller.
    pub async fn list_roles(
        &self,
        caller: &Caller,
        tenant_id: Option<Uuid>,
        pagination: Pagination,
    ) -> RollcallResult<PaginatedResult<Role>> {
        if tenant_id.is_some() {
            caller.ensure_tenant(tenant_id)?;
        }
        self.roles.list(tenant_id, pagination).await
    }

    pub async fn get_role(
        &self,
        caller: &Caller,
        slug: &str,
        tenant_id: Option<Uuid>,
    ) -> RollcallResult<Role> {
        if tenant_id.is_some() {
            caller.ensure_tenant(tenant_id)?;
        }
        self.roles
            .get(slug, tenant_id)
            .await?
            .ok_or_else(|| RollcallError::NotFound {
                entity: "role".into(),
                id: slug.to_string(),
            })
    }

    pub async fn create_role(&self, caller: &Caller, input: CreateRole) -> RollcallResult<Role> {
        if !input.is_system {
            caller.ensure_tenant(input.tenant_id)?;
        }
        self.roles.create(input, caller).await
    }

    pub async fn update_role(
        &self,
        caller: &Caller,
        id: Uuid,
        input: UpdateRole,
    ) -> RollcallResult<Role> {
        let role = self.roles.get_by_id(id).await?;
        if !role.is_system {
            caller.ensure_tenant(role.tenant_id)?;
        }
        self.roles.update(id, input, caller).await
    }

    pub async fn delete_role(&self, caller: &Caller, id: Uuid) -> RollcallResult<()> {
        let role = self.roles.get_by_id(id).await?;
        if !role.is_system {
            caller.ensure_tenant(role.tenant_id)?;
        }
        self.roles.delete(id).await
    }

    // -- tenant overrides -------------------------------------------------

    pub async fn get_override(
        &self,
        caller: &Caller,
        tenant_id: Uuid,
        role_slug: &str,
    ) -> RollcallResult<Option<TenantPermission>> {
        caller.ensure_tenant(Some(tenant_id))?;
        self.overrides
            .get_for_tenant_and_role(tenant_id, role_slug)
            .await
    }

    pub async fn upsert_override(
        &self,
        caller: &Caller,
        tenant_id: Uuid,
        role_slug: &str,
        body: OverrideRequest,
    ) -> RollcallResult<TenantPermission> {
        caller.ensure_tenant(Some(tenant_id))?;
        self.overrides
            .upsert(tenant_id, role_slug, body.permissions, body.module_access)
            .await
    }

    pub async fn list_overrides(
        &self,
        caller: &Caller,
        tenant_id: Uuid,
    ) -> RollcallResult<Vec<TenantPermission>> {
        caller.ensure_tenant(Some(tenant_id))?;
        self.overrides.list_for_tenant(tenant_id).await
    }

    pub async fn grant_module_access(
        &self,
        caller: &Caller,
        tenant_id: Uuid,
        role_slug: &str,
        module: &str,
    ) -> RollcallResult<TenantPermission> {
        let tp = self.existing_override(caller, tenant_id, role_slug).await?;
        self.overrides.add_module_access(&tp, module).await
    }

    pub async fn revoke_module_access(
        &self,
        caller: &Caller,
        tenant_id: Uuid,
        role_slug: &str,
        module: &str,
    ) -> RollcallResult<TenantPermission> {
        let tp = self.existing_override(caller, tenant_id, role_slug).await?;
        self.overrides.remove_module_access(&tp, module).await
    }

    pub async fn grant_permission(
        &self,
        caller: &Caller,
        tenant_id: Uuid,
        role_slug: &str,
        change: PermissionChange,
    ) -> RollcallResult<TenantPermission> {
        let tp = self.existing_override(caller, tenant_id, role_slug).await?;
        self.overrides
            .add_permission(&tp, &change.permission, change.is_custom)
            .await
    }

    pub async fn revoke_permission(
        &self,
        caller: &Caller,
        tenant_id: Uuid,
        role_slug: &str,
        change: PermissionChange,
    ) -> RollcallResult<TenantPermission> {
        let tp = self.existing_override(caller, tenant_id, role_slug).await?;
        self.overrides
            .remove_permission(&tp, &change.permission, change.is_custom)
            .await
    }

    pub async fn reset_to_default(
        &self,
        caller: &Caller,
        tenant_id: Uuid,
        role_slug: &str,
    ) -> RollcallResult<Option<TenantPermission>> {
        caller.ensure_tenant(Some(tenant_id))?;
        self.overrides.reset_to_default(tenant_id, role_slug).await
    }

    async fn existing_override(
        &self,
        caller: &Caller,
        tenant_id: Uuid,
        role_slug: &str,
    ) -> RollcallResult<TenantPermission> {
        caller.ensure_tenant(Some(tenant_id))?;
        self.overrides
            .get_for_tenant_and_role(tenant_id, role_slug)
            .await?
            .ok_or_else(|| RollcallError::NotFound {
                entity: "tenant_permission".into(),
                id: format!("tenant={tenant_id},role={role_slug}"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_request_reads_wildcard() {
        let body: OverrideRequest = serde_json::from_str(
            r#"{"permissions": ["fees.view", "*"], "module_access": ["fees"]}"#,
        )
        .unwrap();
        assert!(body.permissions.is_all());
        assert!(body.module_access.grants("fees"));
    }

    #[test]
    fn override_request_fields_default_to_empty() {
        let body: OverrideRequest = serde_json::from_str("{}").unwrap();
        assert!(body.permissions.is_empty());
        assert!(body.module_access.is_empty());
    }

    #[test]
    fn permission_change_defaults_to_base_list() {
        let change: PermissionChange =
            serde_json::from_str(r#"{"permission": "fees.manage"}"#).unwrap();
        assert!(!change.is_custom);
    }
}
