//! SurrealDB repository implementations.

mod role;
mod tenant_permission;
mod user;

pub use role::SurrealRoleRepository;
pub use tenant_permission::SurrealTenantPermissionRepository;
pub use user::SurrealUserRepository;
