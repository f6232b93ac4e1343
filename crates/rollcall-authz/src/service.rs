//! Authorization entry points keyed by user id.

use rollcall_core::error::RollcallResult;
use rollcall_core::models::permission::PermissionSet;
use rollcall_core::repository::{RoleRepository, TenantPermissionRepository, UserRepository};
use tracing::debug;
use uuid::Uuid;

use crate::gate::Gate;
use crate::resolver::ResolvedPermissions;

/// Authorization service.
///
/// Loads the user and delegates to the gate. Unknown users surface as
/// `NotFound`; inactive users are granted nothing.
pub struct AuthorizationService<U: UserRepository, R: RoleRepository, T: TenantPermissionRepository>
{
    users: U,
    gate: Gate<R, T>,
}

impl<U, R, T> AuthorizationService<U, R, T>
where
    U: UserRepository,
    R: RoleRepository,
    T: TenantPermissionRepository,
{
    pub fn new(users: U, gate: Gate<R, T>) -> Self {
        Self { users, gate }
    }

    pub fn gate(&self) -> &Gate<R, T> {
        &self.gate
    }

    pub async fn resolve_permissions(&self, user_id: Uuid) -> RollcallResult<ResolvedPermissions> {
        let user = self.users.get_by_id(user_id).await?;
        if !user.is_active {
            debug!(%user_id, "Inactive user resolves to nothing");
            return Ok(ResolvedPermissions {
                permissions: PermissionSet::empty(),
                modules: PermissionSet::empty(),
            });
        }
        self.gate.resolver().resolve(&user).await
    }

    pub async fn authorize(&self, user_id: Uuid, permission: &str) -> RollcallResult<bool> {
        let user = self.users.get_by_id(user_id).await?;
        if !user.is_active {
            debug!(%user_id, permission, "Inactive user denied");
            return Ok(false);
        }
        self.gate.can(&user, permission).await
    }

    pub async fn authorize_module(&self, user_id: Uuid, module: &str) -> RollcallResult<bool> {
        let user = self.users.get_by_id(user_id).await?;
        if !user.is_active {
            return Ok(false);
        }
        self.gate.can_access_module(&user, module).await
    }
}
