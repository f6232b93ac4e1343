//! Authorization error types.

use rollcall_core::error::RollcallError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthzError {
    #[error("system roles can only be changed by a super admin")]
    SystemRoleProtected,

    #[error("system roles cannot be deleted")]
    SystemRoleUndeletable,

    #[error("role {slug} is still assigned to {count} active user(s)")]
    RoleInUse { slug: String, count: u64 },

    #[error("caller may only act within its own tenant")]
    TenantMismatch,

    #[error("invalid role slug {0:?}: must be non-empty without whitespace")]
    InvalidSlug(String),

    #[error("permission identifiers must be non-empty")]
    EmptyPermission,
}

impl From<AuthzError> for RollcallError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::SystemRoleProtected | AuthzError::TenantMismatch => {
                RollcallError::PermissionDenied {
                    reason: err.to_string(),
                }
            }
            AuthzError::SystemRoleUndeletable => RollcallError::InvalidOperation {
                reason: err.to_string(),
            },
            AuthzError::RoleInUse { .. } => RollcallError::Conflict {
                reason: err.to_string(),
            },
            AuthzError::InvalidSlug(_) | AuthzError::EmptyPermission => {
                RollcallError::Validation {
                    message: err.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_onto_core_errors() {
        assert_eq!(
            RollcallError::from(AuthzError::SystemRoleProtected).http_status(),
            403
        );
        assert_eq!(
            RollcallError::from(AuthzError::SystemRoleUndeletable).http_status(),
            400
        );
        assert_eq!(
            RollcallError::from(AuthzError::RoleInUse {
                slug: "Librarian".into(),
                count: 2,
            })
            .http_status(),
            409
        );
        assert_eq!(
            RollcallError::from(AuthzError::InvalidSlug("a b".into())).http_status(),
            422
        );
    }
}
