//! Identity of whoever invokes an administrative operation.

use rollcall_core::models::user::User;
use uuid::Uuid;

use crate::error::AuthzError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    /// Platform operator; may touch system roles and every tenant.
    pub is_super_admin: bool,
    /// Tenant the caller administers, if any.
    pub tenant_id: Option<Uuid>,
}

impl Caller {
    pub fn super_admin() -> Self {
        Self {
            is_super_admin: true,
            tenant_id: None,
        }
    }

    pub fn tenant(tenant_id: Uuid) -> Self {
        Self {
            is_super_admin: false,
            tenant_id: Some(tenant_id),
        }
    }

    pub fn from_user(user: &User) -> Self {
        Self {
            is_super_admin: user.is_super_admin(),
            tenant_id: user.tenant_id,
        }
    }

    /// Fail unless the caller may act on `tenant_id` (`None` = global rows).
    pub fn ensure_tenant(&self, tenant_id: Option<Uuid>) -> Result<(), AuthzError> {
        if self.is_super_admin {
            return Ok(());
        }
        match (self.tenant_id, tenant_id) {
            (Some(own), Some(target)) if own == target => Ok(()),
            _ => Err(AuthzError::TenantMismatch),
        }
    }
}
