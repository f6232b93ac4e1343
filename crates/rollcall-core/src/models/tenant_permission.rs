//! Per-tenant permission override model.
//!
//! A tenant permission row is keyed by `(tenant_id, role_slug)` and holds
//! the tenant's own copy of a role's grants plus additional custom
//! permissions layered on top.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::permission::PermissionSet;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantPermission {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub role_slug: String,
    /// Tenant's base grant, an independent copy rather than a diff.
    pub permissions: PermissionSet,
    pub module_access: PermissionSet,
    /// Extra permissions added on top of `permissions`.
    pub custom_permissions: PermissionSet,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TenantPermission {
    /// `permissions ∪ custom_permissions`.
    pub fn effective_permissions(&self) -> PermissionSet {
        self.permissions.union(&self.custom_permissions)
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.grants(permission) || self.custom_permissions.grants(permission)
    }

    pub fn has_module_access(&self, module: &str) -> bool {
        self.module_access.grants(module)
    }

    /// The list selected by `field`.
    pub fn set(&self, field: OverrideField) -> &PermissionSet {
        match field {
            OverrideField::Permissions => &self.permissions,
            OverrideField::CustomPermissions => &self.custom_permissions,
            OverrideField::ModuleAccess => &self.module_access,
        }
    }
}

/// Which list of a tenant permission row a mutation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideField {
    Permissions,
    CustomPermissions,
    ModuleAccess,
}

impl OverrideField {
    /// Select between the base and custom permission lists.
    pub fn permissions(is_custom: bool) -> Self {
        if is_custom {
            OverrideField::CustomPermissions
        } else {
            OverrideField::Permissions
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            OverrideField::Permissions => "permissions",
            OverrideField::CustomPermissions => "custom_permissions",
            OverrideField::ModuleAccess => "module_access",
        }
    }
}
