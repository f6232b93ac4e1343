//! End-to-end tests for the authorization service.

use rollcall_authz::gate::Gate;
use rollcall_authz::overrides::TenantPermissionService;
use rollcall_authz::resolver::PermissionResolver;
use rollcall_authz::service::AuthorizationService;
use rollcall_core::error::RollcallError;
use rollcall_core::models::permission::PermissionSet;
use rollcall_core::models::role::CreateRole;
use rollcall_core::models::user::{CreateUser, UserRole};
use rollcall_core::repository::{RoleRepository, UserRepository};
use rollcall_db::repository::{
    SurrealRoleRepository, SurrealTenantPermissionRepository, SurrealUserRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

type Authz = AuthorizationService<
    SurrealUserRepository<Db>,
    SurrealRoleRepository<Db>,
    SurrealTenantPermissionRepository<Db>,
>;

struct Fixture {
    authz: Authz,
    overrides: TenantPermissionService<SurrealTenantPermissionRepository<Db>, SurrealRoleRepository<Db>>,
    roles: SurrealRoleRepository<Db>,
    users: SurrealUserRepository<Db>,
}

async fn setup() -> Fixture {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    rollcall_db::run_migrations(&db).await.unwrap();

    let roles = SurrealRoleRepository::new(db.clone());
    let tenant_permissions = SurrealTenantPermissionRepository::new(db.clone());
    let users = SurrealUserRepository::new(db);

    let gate = Gate::new(PermissionResolver::new(
        roles.clone(),
        tenant_permissions.clone(),
    ));
    Fixture {
        authz: AuthorizationService::new(users.clone(), gate),
        overrides: TenantPermissionService::new(tenant_permissions, roles.clone()),
        roles,
        users,
    }
}

async fn seed_teacher_role(roles: &SurrealRoleRepository<Db>) {
    roles
        .create(CreateRole {
            tenant_id: None,
            name: "Teacher".into(),
            slug: "Teacher".into(),
            description: String::new(),
            is_system: true,
            is_default: true,
            permissions: ["attendance.manage", "exams.manage"].into_iter().collect(),
            module_access: ["attendance", "exams"].into_iter().collect(),
        })
        .await
        .unwrap();
}

async fn create_user(
    users: &SurrealUserRepository<Db>,
    tenant_id: Option<Uuid>,
    email: &str,
    role: UserRole,
) -> Uuid {
    users
        .create(CreateUser {
            tenant_id,
            name: email.into(),
            email: email.into(),
            role,
        })
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn teacher_override_stays_inside_its_tenant() {
    let fx = setup().await;
    seed_teacher_role(&fx.roles).await;
    let tenant_7 = Uuid::new_v4();
    let tenant_9 = Uuid::new_v4();
    let teacher_7 = create_user(&fx.users, Some(tenant_7), "t7@school.test", UserRole::Teacher).await;
    let teacher_9 = create_user(&fx.users, Some(tenant_9), "t9@school.test", UserRole::Teacher).await;

    assert!(!fx.authz.authorize(teacher_7, "fees.manage").await.unwrap());

    let tp = fx
        .overrides
        .upsert(
            tenant_7,
            "Teacher",
            PermissionSet::empty(),
            PermissionSet::empty(),
        )
        .await
        .unwrap();
    fx.overrides
        .add_permission(&tp, "fees.manage", true)
        .await
        .unwrap();

    assert!(fx.authz.authorize(teacher_7, "fees.manage").await.unwrap());
    assert!(!fx.authz.authorize(teacher_9, "fees.manage").await.unwrap());

    // Base role grants still apply in both tenants.
    assert!(fx.authz.authorize(teacher_7, "exams.manage").await.unwrap());
    assert!(fx.authz.authorize(teacher_9, "exams.manage").await.unwrap());
}

#[tokio::test]
async fn unknown_user_is_not_found() {
    let fx = setup().await;

    let result = fx.authz.authorize(Uuid::new_v4(), "exams.manage").await;
    assert!(matches!(result, Err(RollcallError::NotFound { .. })));

    let result = fx.authz.resolve_permissions(Uuid::new_v4()).await;
    assert!(matches!(result, Err(RollcallError::NotFound { .. })));
}

#[tokio::test]
async fn inactive_user_is_denied() {
    let fx = setup().await;
    seed_teacher_role(&fx.roles).await;
    let teacher = create_user(
        &fx.users,
        Some(Uuid::new_v4()),
        "gone@school.test",
        UserRole::Teacher,
    )
    .await;
    fx.users.deactivate(teacher).await.unwrap();

    assert!(!fx.authz.authorize(teacher, "exams.manage").await.unwrap());
    assert!(!fx.authz.authorize_module(teacher, "exams").await.unwrap());
    let resolved = fx.authz.resolve_permissions(teacher).await.unwrap();
    assert!(resolved.permissions.is_empty());
}

#[tokio::test]
async fn resolve_permissions_reports_role_and_override() {
    let fx = setup().await;
    seed_teacher_role(&fx.roles).await;
    let tenant = Uuid::new_v4();
    let teacher = create_user(&fx.users, Some(tenant), "t@school.test", UserRole::Teacher).await;
    let root = create_user(&fx.users, None, "root@platform.test", UserRole::SuperAdmin).await;

    let tp = fx
        .overrides
        .upsert(
            tenant,
            "Teacher",
            PermissionSet::empty(),
            ["reports"].into_iter().collect(),
        )
        .await
        .unwrap();
    fx.overrides
        .add_permission(&tp, "reports.view", true)
        .await
        .unwrap();

    let resolved = fx.authz.resolve_permissions(teacher).await.unwrap();
    assert!(resolved.permissions.grants("exams.manage"));
    assert!(resolved.permissions.grants("reports.view"));
    assert!(resolved.modules.grants("reports"));
    assert!(!resolved.modules.grants("fees"));

    let json = serde_json::to_value(&resolved).unwrap();
    assert!(json["permissions"].as_array().unwrap().len() == 3);

    let root_resolved = fx.authz.resolve_permissions(root).await.unwrap();
    assert_eq!(
        serde_json::to_value(&root_resolved).unwrap(),
        serde_json::json!({"permissions": ["*"], "modules": ["*"]})
    );
}

#[tokio::test]
async fn super_admin_authorized_for_unknown_ids() {
    let fx = setup().await;
    let root = create_user(&fx.users, None, "root@platform.test", UserRole::SuperAdmin).await;

    assert!(fx.authz.authorize(root, "not.in.catalog").await.unwrap());
    assert!(fx.authz.authorize_module(root, "nowhere").await.unwrap());
}
