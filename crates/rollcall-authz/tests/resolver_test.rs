//! Integration tests for permission resolution.

use chrono::Utc;
use rollcall_authz::resolver::PermissionResolver;
use rollcall_core::catalog::PermissionCatalog;
use rollcall_core::models::permission::PermissionSet;
use rollcall_core::models::role::{CreateRole, UpdateRole};
use rollcall_core::models::tenant_permission::OverrideField;
use rollcall_core::models::user::{User, UserRole};
use rollcall_core::repository::{RoleRepository, TenantPermissionRepository};
use rollcall_db::repository::{SurrealRoleRepository, SurrealTenantPermissionRepository};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

type Resolver = PermissionResolver<SurrealRoleRepository<Db>, SurrealTenantPermissionRepository<Db>>;

struct Fixture {
    roles: SurrealRoleRepository<Db>,
    overrides: SurrealTenantPermissionRepository<Db>,
    resolver: Resolver,
}

async fn setup() -> Fixture {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    rollcall_db::run_migrations(&db).await.unwrap();

    let roles = SurrealRoleRepository::new(db.clone());
    let overrides = SurrealTenantPermissionRepository::new(db.clone());
    let resolver = PermissionResolver::new(roles.clone(), overrides.clone());
    Fixture {
        roles,
        overrides,
        resolver,
    }
}

fn system_role(slug: &str, permissions: PermissionSet, modules: PermissionSet) -> CreateRole {
    CreateRole {
        tenant_id: None,
        name: slug.into(),
        slug: slug.into(),
        description: String::new(),
        is_system: true,
        is_default: true,
        permissions,
        module_access: modules,
    }
}

fn user(role: UserRole, tenant_id: Option<Uuid>) -> User {
    let now = Utc::now();
    User {
        id: Uuid::new_v4(),
        tenant_id,
        name: "Test".into(),
        email: "test@school.test".into(),
        role,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

fn set(entries: &[&str]) -> PermissionSet {
    entries.iter().copied().collect()
}

#[tokio::test]
async fn super_admin_is_granted_anything() {
    let fx = setup().await;
    let root = user(UserRole::SuperAdmin, None);

    // No role rows exist at all.
    for id in ["students.manage", "does.not.exist", ""] {
        assert!(fx.resolver.check_permission(&root, id).await.unwrap());
    }
    assert!(fx.resolver.check_module(&root, "anything").await.unwrap());

    let resolved = fx.resolver.resolve(&root).await.unwrap();
    assert!(resolved.permissions.is_all());
    assert!(resolved.modules.is_all());
}

#[tokio::test]
async fn wildcard_role_grants_every_catalog_id() {
    let fx = setup().await;
    fx.roles
        .create(system_role(
            "Principal",
            PermissionSet::All,
            PermissionSet::All,
        ))
        .await
        .unwrap();
    let principal = user(UserRole::Custom("Principal".into()), Some(Uuid::new_v4()));

    let catalog = PermissionCatalog::default().with_permission("hostel", "hostel.manage", "Manage hostel");
    for id in catalog.all_permission_ids() {
        assert!(
            fx.resolver.check_permission(&principal, id).await.unwrap(),
            "{id} not granted"
        );
    }
    for module in catalog.list_modules() {
        assert!(fx.resolver.check_module(&principal, module).await.unwrap());
    }
}

#[tokio::test]
async fn unknown_role_denies_everything() {
    let fx = setup().await;
    let ghost = user(UserRole::Custom("Ghost".into()), Some(Uuid::new_v4()));

    assert!(!fx.resolver.check_permission(&ghost, "dashboard.view").await.unwrap());
    assert!(!fx.resolver.check_module(&ghost, "dashboard").await.unwrap());

    let resolved = fx.resolver.resolve(&ghost).await.unwrap();
    assert!(resolved.permissions.is_empty());
    assert!(resolved.modules.is_empty());
}

#[tokio::test]
async fn literal_role_grants_only_listed_ids() {
    let fx = setup().await;
    fx.roles
        .create(system_role(
            "Teacher",
            set(&["attendance.manage", "exams.manage"]),
            set(&["attendance", "exams"]),
        ))
        .await
        .unwrap();
    let teacher = user(UserRole::Teacher, Some(Uuid::new_v4()));

    assert!(fx.resolver.check_permission(&teacher, "exams.manage").await.unwrap());
    assert!(!fx.resolver.check_permission(&teacher, "fees.manage").await.unwrap());
    assert!(fx.resolver.check_module(&teacher, "attendance").await.unwrap());
    assert!(!fx.resolver.check_module(&teacher, "fees").await.unwrap());
}

#[tokio::test]
async fn inactive_or_deleted_role_grants_nothing() {
    let fx = setup().await;
    let created = fx
        .roles
        .create(system_role("Parent", set(&["fees.view"]), set(&["fees"])))
        .await
        .unwrap();
    let parent = user(UserRole::Parent, None);

    fx.roles
        .update(
            created.id,
            UpdateRole {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(!fx.resolver.check_permission(&parent, "fees.view").await.unwrap());

    fx.roles.soft_delete(created.id).await.unwrap();
    assert!(!fx.resolver.check_module(&parent, "fees").await.unwrap());
}

#[tokio::test]
async fn overrides_add_and_remove_custom_grants() {
    let fx = setup().await;
    let tenant = Uuid::new_v4();
    fx.roles
        .create(system_role("Teacher", set(&["exams.manage"]), set(&["exams"])))
        .await
        .unwrap();
    let teacher = user(UserRole::Teacher, Some(tenant));

    fx.overrides
        .upsert(tenant, "Teacher", set(&[]), set(&[]))
        .await
        .unwrap();
    fx.overrides
        .add_entry(tenant, "Teacher", OverrideField::CustomPermissions, "fees.manage")
        .await
        .unwrap();
    assert!(fx.resolver.check_permission(&teacher, "fees.manage").await.unwrap());

    fx.overrides
        .remove_entry(tenant, "Teacher", OverrideField::CustomPermissions, "fees.manage")
        .await
        .unwrap();
    assert!(!fx.resolver.check_permission(&teacher, "fees.manage").await.unwrap());

    // An empty override never takes away what the role grants.
    assert!(fx.resolver.check_permission(&teacher, "exams.manage").await.unwrap());
}

#[tokio::test]
async fn override_module_access_and_wildcard() {
    let fx = setup().await;
    let tenant = Uuid::new_v4();
    fx.roles
        .create(system_role("Accountant", set(&["fees.view"]), set(&["fees"])))
        .await
        .unwrap();
    let accountant = user(UserRole::Accountant, Some(tenant));

    fx.overrides
        .upsert(tenant, "Accountant", PermissionSet::All, set(&["reports"]))
        .await
        .unwrap();

    assert!(fx.resolver.check_permission(&accountant, "hr.manage").await.unwrap());
    assert!(fx.resolver.check_module(&accountant, "reports").await.unwrap());
    assert!(!fx.resolver.check_module(&accountant, "hr").await.unwrap());

    let resolved = fx.resolver.resolve(&accountant).await.unwrap();
    assert!(resolved.permissions.is_all());
    assert_eq!(resolved.modules, set(&["fees", "reports"]));
}

#[tokio::test]
async fn inactive_override_is_ignored() {
    let fx = setup().await;
    let tenant = Uuid::new_v4();
    let student = user(UserRole::Student, Some(tenant));

    fx.overrides
        .upsert(tenant, "Student", set(&["library.view"]), set(&[]))
        .await
        .unwrap();
    assert!(fx.resolver.check_permission(&student, "library.view").await.unwrap());

    fx.overrides.set_active(tenant, "Student", false).await.unwrap();
    assert!(!fx.resolver.check_permission(&student, "library.view").await.unwrap());
}

#[tokio::test]
async fn user_without_tenant_skips_overrides() {
    let fx = setup().await;
    fx.roles
        .create(system_role("Admin", set(&["users.view"]), set(&[])))
        .await
        .unwrap();
    let platform_admin = user(UserRole::Admin, None);

    assert!(fx.resolver.check_permission(&platform_admin, "users.view").await.unwrap());
    assert!(!fx.resolver.check_permission(&platform_admin, "users.manage").await.unwrap());
}

#[tokio::test]
async fn resolve_merges_role_and_override() {
    let fx = setup().await;
    let tenant = Uuid::new_v4();
    fx.roles
        .create(system_role(
            "Teacher",
            set(&["attendance.manage"]),
            set(&["attendance"]),
        ))
        .await
        .unwrap();
    fx.overrides
        .upsert(tenant, "Teacher", set(&["exams.manage"]), set(&["exams"]))
        .await
        .unwrap();
    fx.overrides
        .add_entry(tenant, "Teacher", OverrideField::CustomPermissions, "fees.view")
        .await
        .unwrap();

    let resolved = fx
        .resolver
        .resolve(&user(UserRole::Teacher, Some(tenant)))
        .await
        .unwrap();

    assert_eq!(
        resolved.permissions,
        set(&["attendance.manage", "exams.manage", "fees.view"])
    );
    assert_eq!(resolved.modules, set(&["attendance", "exams"]));
}
