//! Input rules shared by the role and override services.

use rollcall_core::models::permission::PermissionSet;

use crate::error::AuthzError;

/// Role slugs must be non-empty and contain no whitespace.
pub(crate) fn validate_slug(slug: &str) -> Result<(), AuthzError> {
    if slug.is_empty() || slug.chars().any(char::is_whitespace) {
        return Err(AuthzError::InvalidSlug(slug.to_string()));
    }
    Ok(())
}

pub(crate) fn validate_entry(entry: &str) -> Result<(), AuthzError> {
    if entry.trim().is_empty() {
        return Err(AuthzError::EmptyPermission);
    }
    Ok(())
}

pub(crate) fn validate_set(set: &PermissionSet) -> Result<(), AuthzError> {
    set.literals().try_for_each(validate_entry)
}
