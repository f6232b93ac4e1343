//! Role definition service: lookup with system fallback, guarded
//! create/update/delete, and seeding from the default table.

use rollcall_core::error::{RollcallError, RollcallResult};
use rollcall_core::models::role::{CreateRole, Role, UpdateRole};
use rollcall_core::repository::{PaginatedResult, Pagination, RoleRepository, UserRepository};
use tracing::{info, warn};
use uuid::Uuid;

use crate::caller::Caller;
use crate::defaults::{DefaultRoleTable, RoleTemplate};
use crate::error::AuthzError;
use crate::validation::{validate_set, validate_slug};

/// Role definition service.
///
/// Generic over repository implementations so that the authorization
/// layer has no dependency on the database crate.
pub struct RoleService<R: RoleRepository, U: UserRepository> {
    roles: R,
    users: U,
    defaults: DefaultRoleTable,
}

impl<R: RoleRepository, U: UserRepository> RoleService<R, U> {
    pub fn new(roles: R, users: U, defaults: DefaultRoleTable) -> Self {
        Self {
            roles,
            users,
            defaults,
        }
    }

    /// Tenant-scoped role if one exists, otherwise the global row with
    /// the same slug.
    pub async fn get(&self, slug: &str, tenant_id: Option<Uuid>) -> RollcallResult<Option<Role>> {
        let scoped = match tenant_id {
            Some(tenant_id) => self.roles.find_by_slug(Some(tenant_id), slug).await?,
            None => None,
        };
        match scoped {
            Some(role) => Ok(Some(role)),
            None => self.roles.find_by_slug(None, slug).await,
        }
    }

    pub async fn get_by_id(&self, id: Uuid) -> RollcallResult<Role> {
        self.roles.get_by_id(id).await
    }

    pub async fn create(&self, input: CreateRole, caller: &Caller) -> RollcallResult<Role> {
        validate_slug(&input.slug)?;
        validate_set(&input.permissions)?;
        validate_set(&input.module_access)?;

        if input.is_system && !caller.is_super_admin {
            warn!(slug = %input.slug, "Refused system role creation by non-super-admin");
            return Err(AuthzError::SystemRoleProtected.into());
        }

        let role = self.roles.create(input).await?;
        info!(
            role_id = %role.id,
            slug = %role.slug,
            tenant_id = ?role.tenant_id,
            "Role created"
        );
        Ok(role)
    }

    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateRole,
        caller: &Caller,
    ) -> RollcallResult<Role> {
        if let Some(permissions) = &input.permissions {
            validate_set(permissions)?;
        }
        if let Some(module_access) = &input.module_access {
            validate_set(module_access)?;
        }

        let existing = self.roles.get_by_id(id).await?;
        if existing.is_system && !caller.is_super_admin {
            warn!(slug = %existing.slug, "Refused system role update by non-super-admin");
            return Err(AuthzError::SystemRoleProtected.into());
        }

        let changes_grants = input.changes_grants();
        let role = self.roles.update(id, input).await?;
        info!(
            role_id = %role.id,
            slug = %role.slug,
            changes_grants,
            "Role updated"
        );
        Ok(role)
    }

    /// Soft-delete a role.
    ///
    /// System roles are never deletable. A role still assigned to an
    /// active user (within its tenant, or anywhere for global rows) is
    /// rejected with a conflict.
    pub async fn delete(&self, id: Uuid) -> RollcallResult<()> {
        let role = self.roles.get_by_id(id).await?;
        if role.is_system {
            warn!(slug = %role.slug, "Refused deletion of system role");
            return Err(AuthzError::SystemRoleUndeletable.into());
        }

        let count = self
            .users
            .count_active_with_role(role.tenant_id, &role.slug)
            .await?;
        if count > 0 {
            warn!(slug = %role.slug, count, "Refused deletion of role in use");
            return Err(AuthzError::RoleInUse {
                slug: role.slug,
                count,
            }
            .into());
        }

        self.roles.soft_delete(id).await?;
        info!(role_id = %id, slug = %role.slug, "Role deleted");
        Ok(())
    }

    pub fn list_defaults(&self) -> Vec<RoleTemplate> {
        self.defaults.list_defaults()
    }

    /// Upsert every default template as a role of `tenant_id`.
    /// Running it again rewrites the same rows.
    pub async fn clone_defaults_for_tenant(&self, tenant_id: Uuid) -> RollcallResult<Vec<Role>> {
        let mut roles = Vec::new();
        for template in self.defaults.list_defaults() {
            roles.push(
                self.roles
                    .upsert_by_slug(template.to_create_role(Some(tenant_id)))
                    .await?,
            );
        }
        info!(%tenant_id, count = roles.len(), "Default roles cloned for tenant");
        Ok(roles)
    }

    /// Insert every default template that has no global system row yet.
    /// Rows already present keep their stored grants and flags.
    pub async fn seed_system_roles(&self) -> RollcallResult<Vec<Role>> {
        let mut roles = Vec::new();
        let mut inserted = 0;
        for template in self.defaults.list_defaults() {
            let role = match self.roles.create(template.to_create_role(None)).await {
                Ok(role) => {
                    inserted += 1;
                    role
                }
                Err(RollcallError::AlreadyExists { entity }) => self
                    .roles
                    .find_by_slug(None, &template.slug)
                    .await?
                    .ok_or(RollcallError::AlreadyExists { entity })?,
                Err(e) => return Err(e),
            };
            roles.push(role);
        }
        info!(count = roles.len(), inserted, "System roles seeded");
        Ok(roles)
    }

    pub async fn list(
        &self,
        tenant_id: Option<Uuid>,
        pagination: Pagination,
    ) -> RollcallResult<PaginatedResult<Role>> {
        self.roles.list(tenant_id, pagination).await
    }
}
