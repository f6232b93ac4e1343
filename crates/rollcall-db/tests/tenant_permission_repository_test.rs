//! Integration tests for the tenant permission override repository.

use rollcall_core::error::RollcallError;
use rollcall_core::models::permission::PermissionSet;
use rollcall_core::models::tenant_permission::OverrideField;
use rollcall_core::repository::TenantPermissionRepository;
use rollcall_db::repository::SurrealTenantPermissionRepository;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

async fn setup() -> SurrealTenantPermissionRepository<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    rollcall_db::run_migrations(&db).await.unwrap();
    SurrealTenantPermissionRepository::new(db)
}

fn set(entries: &[&str]) -> PermissionSet {
    entries.iter().copied().collect()
}

#[tokio::test]
async fn find_missing_returns_none() {
    let repo = setup().await;
    let found = repo.find(Uuid::new_v4(), "Teacher").await.unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn upsert_creates_then_replaces_one_row() {
    let repo = setup().await;
    let tenant = Uuid::new_v4();

    let first = repo
        .upsert(tenant, "Teacher", set(&["exams.manage"]), set(&["exams"]))
        .await
        .unwrap();
    assert!(first.is_active);
    assert!(first.custom_permissions.is_empty());

    let second = repo
        .upsert(
            tenant,
            "Teacher",
            set(&["fees.view"]),
            set(&["fees", "reports"]),
        )
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    assert!(second.has_permission("fees.view"));
    assert!(!second.has_permission("exams.manage"));
    assert!(second.has_module_access("reports"));

    let all = repo.list_for_tenant(tenant).await.unwrap();
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn upsert_keeps_custom_permissions() {
    let repo = setup().await;
    let tenant = Uuid::new_v4();

    repo.upsert(tenant, "Accountant", set(&["fees.view"]), set(&["fees"]))
        .await
        .unwrap();
    repo.add_entry(
        tenant,
        "Accountant",
        OverrideField::CustomPermissions,
        "reports.view",
    )
    .await
    .unwrap();

    let replaced = repo
        .upsert(tenant, "Accountant", set(&["fees.manage"]), set(&["fees"]))
        .await
        .unwrap();

    assert!(replaced.custom_permissions.grants("reports.view"));
    assert!(replaced.has_permission("reports.view"));
}

#[tokio::test]
async fn add_entry_is_set_like() {
    let repo = setup().await;
    let tenant = Uuid::new_v4();
    repo.upsert(tenant, "Teacher", set(&[]), set(&[]))
        .await
        .unwrap();

    for _ in 0..2 {
        repo.add_entry(tenant, "Teacher", OverrideField::Permissions, "fees.view")
            .await
            .unwrap();
    }

    let row = repo.find(tenant, "Teacher").await.unwrap().unwrap();
    assert_eq!(row.permissions.to_vec(), vec!["fees.view".to_string()]);
}

#[tokio::test]
async fn remove_entry_drops_only_that_entry() {
    let repo = setup().await;
    let tenant = Uuid::new_v4();
    repo.upsert(
        tenant,
        "Teacher",
        set(&[]),
        set(&["attendance", "exams", "classes"]),
    )
    .await
    .unwrap();

    let row = repo
        .remove_entry(tenant, "Teacher", OverrideField::ModuleAccess, "exams")
        .await
        .unwrap();

    assert!(!row.has_module_access("exams"));
    assert!(row.has_module_access("attendance"));
    assert!(row.has_module_access("classes"));

    // Removing an absent entry leaves the list alone.
    let row = repo
        .remove_entry(tenant, "Teacher", OverrideField::ModuleAccess, "exams")
        .await
        .unwrap();
    assert_eq!(row.module_access.to_vec().len(), 2);
}

#[tokio::test]
async fn wildcard_entry_replaces_the_list() {
    let repo = setup().await;
    let tenant = Uuid::new_v4();
    repo.upsert(tenant, "Admin", set(&["users.view"]), set(&[]))
        .await
        .unwrap();

    let row = repo
        .add_entry(tenant, "Admin", OverrideField::Permissions, "*")
        .await
        .unwrap();
    assert!(row.permissions.is_all());

    let row = repo
        .remove_entry(tenant, "Admin", OverrideField::Permissions, "*")
        .await
        .unwrap();
    assert!(row.permissions.is_empty());
}

#[tokio::test]
async fn entry_edits_require_an_existing_row() {
    let repo = setup().await;

    let result = repo
        .add_entry(
            Uuid::new_v4(),
            "Teacher",
            OverrideField::Permissions,
            "fees.view",
        )
        .await;

    assert!(matches!(result, Err(RollcallError::NotFound { .. })));
}

#[tokio::test]
async fn replace_with_defaults_clears_custom_permissions() {
    let repo = setup().await;
    let tenant = Uuid::new_v4();
    repo.upsert(tenant, "Teacher", set(&["fees.view"]), set(&["fees"]))
        .await
        .unwrap();
    repo.add_entry(
        tenant,
        "Teacher",
        OverrideField::CustomPermissions,
        "library.manage",
    )
    .await
    .unwrap();

    let row = repo
        .replace_with_defaults(
            tenant,
            "Teacher",
            set(&["attendance.manage"]),
            set(&["attendance"]),
        )
        .await
        .unwrap();

    assert!(row.custom_permissions.is_empty());
    assert!(row.has_permission("attendance.manage"));
    assert!(!row.has_permission("fees.view"));
    assert!(!row.has_permission("library.manage"));

    let missing = repo
        .replace_with_defaults(Uuid::new_v4(), "Teacher", set(&[]), set(&[]))
        .await;
    assert!(matches!(missing, Err(RollcallError::NotFound { .. })));
}

#[tokio::test]
async fn deactivated_row_is_still_found_and_upsert_reactivates() {
    let repo = setup().await;
    let tenant = Uuid::new_v4();
    repo.upsert(tenant, "Parent", set(&["students.view"]), set(&[]))
        .await
        .unwrap();

    let row = repo.set_active(tenant, "Parent", false).await.unwrap();
    assert!(!row.is_active);

    let found = repo.find(tenant, "Parent").await.unwrap().unwrap();
    assert!(!found.is_active);

    let row = repo
        .upsert(tenant, "Parent", set(&["students.view"]), set(&[]))
        .await
        .unwrap();
    assert!(row.is_active);
}

#[tokio::test]
async fn list_is_tenant_scoped_and_ordered() {
    let repo = setup().await;
    let tenant = Uuid::new_v4();
    let other = Uuid::new_v4();

    for slug in ["Teacher", "Accountant", "Parent"] {
        repo.upsert(tenant, slug, set(&[]), set(&[])).await.unwrap();
    }
    repo.upsert(other, "Teacher", set(&[]), set(&[]))
        .await
        .unwrap();

    let rows = repo.list_for_tenant(tenant).await.unwrap();
    let slugs: Vec<_> = rows.iter().map(|r| r.role_slug.as_str()).collect();
    assert_eq!(slugs, vec!["Accountant", "Parent", "Teacher"]);
    assert!(rows.iter().all(|r| r.tenant_id == tenant));
}
