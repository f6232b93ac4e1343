//! Rollcall Authz — permission resolution, the authorization gate and
//! role / tenant override administration.

pub mod admin;
pub mod caller;
pub mod config;
pub mod defaults;
pub mod error;
pub mod gate;
pub mod overrides;
pub mod resolver;
pub mod roles;
pub mod service;
mod validation;

pub use admin::AdminService;
pub use caller::Caller;
pub use config::AuthzConfig;
pub use defaults::{DefaultRoleTable, RoleTemplate};
pub use error::AuthzError;
pub use gate::{Gate, RequestGate};
pub use overrides::TenantPermissionService;
pub use resolver::{PermissionResolver, ResolvedPermissions};
pub use roles::RoleService;
pub use service::AuthorizationService;
