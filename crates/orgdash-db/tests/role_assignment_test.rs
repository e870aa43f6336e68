//! Integration tests for role assignments using in-memory SurrealDB.

use orgdash_core::models::org::CreateOrg;
use orgdash_core::repository::{OrgRepository, RoleAssignmentRepository};
use orgdash_db::repository::{SurrealOrgRepository, SurrealRoleAssignmentRepository};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

/// Helper: spin up in-memory DB, run migrations, create two orgs.
async fn setup() -> (
    Surreal<surrealdb::engine::local::Db>,
    Uuid, // org_a
    Uuid, // org_b
) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    orgdash_db::run_migrations(&db).await.unwrap();

    let org_repo = SurrealOrgRepository::new(db.clone());
    let mut ids = Vec::new();
    for (name, subdomain) in [("Org A", "org-a"), ("Org B", "org-b")] {
        let org = org_repo
            .create(CreateOrg {
                name: name.into(),
                language: None,
                subdomain: Some(subdomain.into()),
                domain: None,
                timezone: None,
                api_token: None,
                config: None,
            })
            .await
            .unwrap();
        ids.push(org.id);
    }

    (db, ids[0], ids[1])
}

#[tokio::test]
async fn grant_and_list_roles() {
    let (db, org_a, _) = setup().await;
    let repo = SurrealRoleAssignmentRepository::new(db);

    let user = Uuid::new_v4();
    repo.grant(org_a, user, "Editors").await.unwrap();
    repo.grant(org_a, user, "Viewers").await.unwrap();

    let mut roles = repo.roles_for_user(org_a, user).await.unwrap();
    roles.sort();
    assert_eq!(roles, vec!["Editors", "Viewers"]);
}

#[tokio::test]
async fn grant_is_idempotent() {
    let (db, org_a, _) = setup().await;
    let repo = SurrealRoleAssignmentRepository::new(db);

    let user = Uuid::new_v4();
    repo.grant(org_a, user, "Administrators").await.unwrap();
    repo.grant(org_a, user, "Administrators").await.unwrap();

    let roles = repo.roles_for_user(org_a, user).await.unwrap();
    assert_eq!(roles.len(), 1);
}

#[tokio::test]
async fn revoke_removes_only_that_role() {
    let (db, org_a, _) = setup().await;
    let repo = SurrealRoleAssignmentRepository::new(db);

    let user = Uuid::new_v4();
    repo.grant(org_a, user, "Editors").await.unwrap();
    repo.grant(org_a, user, "Viewers").await.unwrap();

    repo.revoke(org_a, user, "Editors").await.unwrap();

    let roles = repo.roles_for_user(org_a, user).await.unwrap();
    assert_eq!(roles, vec!["Viewers"]);

    // Revoking an absent assignment is a no-op.
    repo.revoke(org_a, user, "Editors").await.unwrap();
}

#[tokio::test]
async fn users_with_role() {
    let (db, org_a, _) = setup().await;
    let repo = SurrealRoleAssignmentRepository::new(db);

    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    repo.grant(org_a, alice, "Editors").await.unwrap();
    repo.grant(org_a, bob, "Editors").await.unwrap();
    repo.grant(org_a, bob, "Viewers").await.unwrap();

    let editors = repo.users_with_role(org_a, "Editors").await.unwrap();
    assert_eq!(editors.len(), 2);
    assert!(editors.contains(&alice));
    assert!(editors.contains(&bob));

    let viewers = repo.users_with_role(org_a, "Viewers").await.unwrap();
    assert_eq!(viewers, vec![bob]);
}

#[tokio::test]
async fn users_in_org_reports_each_user_once() {
    let (db, org_a, _) = setup().await;
    let repo = SurrealRoleAssignmentRepository::new(db);

    let user = Uuid::new_v4();
    repo.grant(org_a, user, "Administrators").await.unwrap();
    repo.grant(org_a, user, "Editors").await.unwrap();

    let users = repo.users_in_org(org_a).await.unwrap();
    assert_eq!(users, vec![user]);
}

#[tokio::test]
async fn org_isolation() {
    let (db, org_a, org_b) = setup().await;
    let repo = SurrealRoleAssignmentRepository::new(db);

    let user = Uuid::new_v4();
    repo.grant(org_a, user, "Editors").await.unwrap();

    // The grant in org A must not be visible from org B.
    assert!(repo.roles_for_user(org_b, user).await.unwrap().is_empty());
    assert!(repo.users_in_org(org_b).await.unwrap().is_empty());
}
