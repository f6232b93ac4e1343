//! Permission resolver.
//!
//! Order of evaluation for a user and an identifier:
//!
//! 1. `SuperAdmin` is granted everything.
//! 2. The global role with the user's slug; missing, inactive or deleted
//!    roles grant nothing.
//! 3. The wildcard or a literal match on that role grants.
//! 4. Otherwise the user's tenant override, if active, may grant.
//!
//! Overrides only add grants. Storage errors are returned as errors.

use rollcall_core::error::RollcallResult;
use rollcall_core::models::permission::PermissionSet;
use rollcall_core::models::role::Role;
use rollcall_core::models::tenant_permission::TenantPermission;
use rollcall_core::models::user::User;
use rollcall_core::repository::{RoleRepository, TenantPermissionRepository};
use serde::Serialize;
use tracing::debug;

/// What a check looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckKind {
    Permission,
    Module,
}

impl CheckKind {
    fn role_set(self, role: &Role) -> &PermissionSet {
        match self {
            CheckKind::Permission => &role.permissions,
            CheckKind::Module => &role.module_access,
        }
    }

    fn override_grants(self, tp: &TenantPermission, id: &str) -> bool {
        match self {
            CheckKind::Permission => tp.has_permission(id),
            CheckKind::Module => tp.has_module_access(id),
        }
    }
}

/// Everything a user is granted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedPermissions {
    pub permissions: PermissionSet,
    pub modules: PermissionSet,
}

pub struct PermissionResolver<R: RoleRepository, T: TenantPermissionRepository> {
    roles: R,
    overrides: T,
}

impl<R: RoleRepository, T: TenantPermissionRepository> PermissionResolver<R, T> {
    pub fn new(roles: R, overrides: T) -> Self {
        Self { roles, overrides }
    }

    pub async fn check_permission(&self, user: &User, permission: &str) -> RollcallResult<bool> {
        self.check(user, CheckKind::Permission, permission).await
    }

    pub async fn check_module(&self, user: &User, module: &str) -> RollcallResult<bool> {
        self.check(user, CheckKind::Module, module).await
    }

    pub async fn check(&self, user: &User, kind: CheckKind, id: &str) -> RollcallResult<bool> {
        if user.is_super_admin() {
            return Ok(true);
        }

        let role_grants = self
            .base_role(user)
            .await?
            .is_some_and(|role| kind.role_set(&role).grants(id));
        if role_grants {
            debug!(user_id = %user.id, ?kind, id, "Granted by role");
            return Ok(true);
        }

        let granted = match self.tenant_override(user).await? {
            Some(tp) => kind.override_grants(&tp, id),
            None => false,
        };
        debug!(user_id = %user.id, ?kind, id, granted, "Resolved through tenant override");
        Ok(granted)
    }

    /// Merge the role's sets with the tenant override.
    pub async fn resolve(&self, user: &User) -> RollcallResult<ResolvedPermissions> {
        if user.is_super_admin() {
            return Ok(ResolvedPermissions {
                permissions: PermissionSet::All,
                modules: PermissionSet::All,
            });
        }

        let (mut permissions, mut modules) = match self.base_role(user).await? {
            Some(role) => (role.permissions, role.module_access),
            None => (PermissionSet::empty(), PermissionSet::empty()),
        };
        if let Some(tp) = self.tenant_override(user).await? {
            permissions = permissions.union(&tp.effective_permissions());
            modules = modules.union(&tp.module_access);
        }

        Ok(ResolvedPermissions {
            permissions,
            modules,
        })
    }

    async fn base_role(&self, user: &User) -> RollcallResult<Option<Role>> {
        let role = self.roles.find_by_slug(None, user.role.slug()).await?;
        if role.is_none() {
            debug!(user_id = %user.id, role = %user.role, "No system role for user");
        }
        Ok(role.filter(|r| r.is_active && r.deleted_at.is_none()))
    }

    async fn tenant_override(&self, user: &User) -> RollcallResult<Option<TenantPermission>> {
        let Some(tenant_id) = user.tenant_id else {
            return Ok(None);
        };
        Ok(self
            .overrides
            .find(tenant_id, user.role.slug())
            .await?
            .filter(|tp| tp.is_active))
    }
}
