//! Integration tests for the User repository using in-memory SurrealDB.

use rollcall_core::error::RollcallError;
use rollcall_core::models::user::{CreateUser, UpdateUser, UserRole};
use rollcall_core::repository::{Pagination, UserRepository};
use rollcall_db::repository::SurrealUserRepository;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

async fn setup() -> SurrealUserRepository<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    rollcall_db::run_migrations(&db).await.unwrap();
    SurrealUserRepository::new(db)
}

fn user(tenant_id: Option<Uuid>, email: &str, role: UserRole) -> CreateUser {
    CreateUser {
        tenant_id,
        name: email.split('@').next().unwrap_or(email).into(),
        email: email.into(),
        role,
    }
}

#[tokio::test]
async fn create_and_get_user() {
    let repo = setup().await;
    let tenant = Uuid::new_v4();

    let created = repo
        .create(user(Some(tenant), "ada@school.test", UserRole::Teacher))
        .await
        .unwrap();

    assert_eq!(created.tenant_id, Some(tenant));
    assert_eq!(created.role, UserRole::Teacher);
    assert!(created.is_active);

    let fetched = repo.get_by_id(created.id).await.unwrap();
    assert_eq!(fetched.email, "ada@school.test");
    assert_eq!(fetched.role, UserRole::Teacher);
}

#[tokio::test]
async fn custom_role_slug_round_trips() {
    let repo = setup().await;

    let created = repo
        .create(user(
            Some(Uuid::new_v4()),
            "lib@school.test",
            UserRole::Custom("Librarian".into()),
        ))
        .await
        .unwrap();

    let fetched = repo.get_by_id(created.id).await.unwrap();
    assert_eq!(fetched.role, UserRole::Custom("Librarian".into()));
}

#[tokio::test]
async fn platform_user_has_no_tenant() {
    let repo = setup().await;

    let created = repo
        .create(user(None, "root@platform.test", UserRole::SuperAdmin))
        .await
        .unwrap();

    let fetched = repo.get_by_id(created.id).await.unwrap();
    assert!(fetched.tenant_id.is_none());
    assert!(fetched.is_super_admin());
}

#[tokio::test]
async fn get_missing_user_is_not_found() {
    let repo = setup().await;
    let result = repo.get_by_id(Uuid::new_v4()).await;
    assert!(matches!(result, Err(RollcallError::NotFound { .. })));
}

#[tokio::test]
async fn update_role_and_deactivate() {
    let repo = setup().await;
    let created = repo
        .create(user(
            Some(Uuid::new_v4()),
            "sam@school.test",
            UserRole::Student,
        ))
        .await
        .unwrap();

    let updated = repo
        .update(
            created.id,
            UpdateUser {
                role: Some(UserRole::Parent),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.role, UserRole::Parent);
    assert_eq!(updated.name, created.name);

    repo.deactivate(created.id).await.unwrap();
    let fetched = repo.get_by_id(created.id).await.unwrap();
    assert!(!fetched.is_active);
}

#[tokio::test]
async fn count_active_with_role_respects_scope_and_activity() {
    let repo = setup().await;
    let tenant = Uuid::new_v4();
    let other = Uuid::new_v4();

    let librarian = || UserRole::Custom("Librarian".into());
    repo.create(user(Some(tenant), "a@school.test", librarian()))
        .await
        .unwrap();
    let inactive = repo
        .create(user(Some(tenant), "b@school.test", librarian()))
        .await
        .unwrap();
    repo.create(user(Some(other), "c@school.test", librarian()))
        .await
        .unwrap();
    repo.create(user(Some(tenant), "d@school.test", UserRole::Teacher))
        .await
        .unwrap();
    repo.deactivate(inactive.id).await.unwrap();

    assert_eq!(
        repo.count_active_with_role(Some(tenant), "Librarian")
            .await
            .unwrap(),
        1
    );
    assert_eq!(
        repo.count_active_with_role(None, "Librarian").await.unwrap(),
        2
    );
    assert_eq!(
        repo.count_active_with_role(Some(tenant), "Accountant")
            .await
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn list_users_for_tenant() {
    let repo = setup().await;
    let tenant = Uuid::new_v4();

    for i in 0..4 {
        repo.create(user(
            Some(tenant),
            &format!("user{i}@school.test"),
            UserRole::Student,
        ))
        .await
        .unwrap();
    }
    repo.create(user(
        Some(Uuid::new_v4()),
        "elsewhere@school.test",
        UserRole::Student,
    ))
    .await
    .unwrap();

    let page = repo
        .list(
            tenant,
            Pagination {
                offset: 0,
                limit: 3,
            },
        )
        .await
        .unwrap();

    assert_eq!(page.total, 4);
    assert_eq!(page.items.len(), 3);
    assert!(page.items.iter().all(|u| u.tenant_id == Some(tenant)));
}

#[tokio::test]
async fn duplicate_email_rejected() {
    let repo = setup().await;
    let tenant = Uuid::new_v4();

    repo.create(user(Some(tenant), "dup@school.test", UserRole::Teacher))
        .await
        .unwrap();
    let result = repo
        .create(user(Some(tenant), "dup@school.test", UserRole::Parent))
        .await;

    assert!(matches!(result, Err(RollcallError::AlreadyExists { .. })));
}
