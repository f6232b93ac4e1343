//! Deterministic record keys.
//!
//! Roles and tenant permission rows are unique per natural key, so their
//! record ids are UUIDv5 digests of that key. Every write then targets a
//! single, predictable record and `UPSERT` stays atomic.

use uuid::Uuid;

use crate::error::DbError;

const ROLLCALL_NAMESPACE: Uuid = Uuid::from_u128(0x6f1c_2d0e_4b7a_5c39_9e21_7d4a_0b3f_58c6);

/// Record id of the role `slug` in the given scope (`None` = global).
pub fn role_record_id(tenant_id: Option<Uuid>, slug: &str) -> Uuid {
    let scope = tenant_id.map_or_else(|| "global".to_string(), |t| t.to_string());
    Uuid::new_v5(&ROLLCALL_NAMESPACE, format!("role/{scope}/{slug}").as_bytes())
}

/// Record id of the tenant permission row for `(tenant_id, role_slug)`.
pub fn tenant_permission_record_id(tenant_id: Uuid, role_slug: &str) -> Uuid {
    Uuid::new_v5(
        &ROLLCALL_NAMESPACE,
        format!("tenant_permission/{tenant_id}/{role_slug}").as_bytes(),
    )
}

pub(crate) fn parse_uuid(raw: &str, what: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(raw).map_err(|e| DbError::InvalidRecord(format!("invalid {what} UUID: {e}")))
}
