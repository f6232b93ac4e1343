//! Authorization configuration.

use rollcall_core::catalog::PermissionCatalog;
use serde::Deserialize;

use crate::defaults::DefaultRoleTable;

/// Configuration for the authorization services.
///
/// Both tables are immutable once built; services receive them by value
/// at construction.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthzConfig {
    /// Built-in role bundles used for seeding and tenant provisioning.
    pub default_roles: DefaultRoleTable,
    /// Permission catalog exposed to role editors.
    pub catalog: PermissionCatalog,
}
