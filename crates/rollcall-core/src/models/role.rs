//! Role domain model.
//!
//! A role is a named bundle of permissions and module access. Rows with
//! `tenant_id = None` are global; system roles are global rows seeded from
//! the built-in defaults and can never be deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::permission::PermissionSet;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    pub id: Uuid,
    /// Owning tenant; `None` for global rows.
    pub tenant_id: Option<Uuid>,
    pub name: String,
    /// Unique within the tenant scope (e.g. `Teacher`).
    pub slug: String,
    pub description: String,
    /// Built-in role; only a super-admin may modify it.
    pub is_system: bool,
    /// Copied into every new tenant at provisioning.
    pub is_default: bool,
    pub permissions: PermissionSet,
    pub module_access: PermissionSet,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Set when the role is soft-deleted.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Role {
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.grants(permission)
    }

    pub fn has_module_access(&self, module: &str) -> bool {
        self.module_access.grants(module)
    }

    /// Add a permission to the in-memory value. Returns `true` if it was
    /// not already granted.
    pub fn give_permission(&mut self, permission: &str) -> bool {
        self.permissions.insert(permission)
    }

    pub fn revoke_permission(&mut self, permission: &str) -> bool {
        self.permissions.remove(permission)
    }

    pub fn is_tenant_scoped(&self) -> bool {
        self.tenant_id.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRole {
    pub tenant_id: Option<Uuid>,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub is_system: bool,
    pub is_default: bool,
    pub permissions: PermissionSet,
    pub module_access: PermissionSet,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateRole {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_default: Option<bool>,
    pub permissions: Option<PermissionSet>,
    pub module_access: Option<PermissionSet>,
    pub is_active: Option<bool>,
}

impl UpdateRole {
    /// Whether the update touches the permission bundle itself.
    pub fn changes_grants(&self) -> bool {
        self.permissions.is_some() || self.module_access.is_some()
    }
}
