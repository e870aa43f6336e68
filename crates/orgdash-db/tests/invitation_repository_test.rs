//! Integration tests for invitations using in-memory SurrealDB.

use orgdash_core::models::invitation::{CreateInvitation, SECRET_ALPHABET, SECRET_LEN};
use orgdash_core::models::org::CreateOrg;
use orgdash_core::repository::{InvitationRepository, OrgRepository};
use orgdash_core::OrgError;
use orgdash_db::repository::{SurrealInvitationRepository, SurrealOrgRepository};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

/// Helper: spin up in-memory DB, run migrations, create an org.
async fn setup() -> (Surreal<surrealdb::engine::local::Db>, Uuid) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    orgdash_db::run_migrations(&db).await.unwrap();

    let org_repo = SurrealOrgRepository::new(db.clone());
    let org = org_repo
        .create(CreateOrg {
            name: "Test Org".into(),
            language: None,
            subdomain: Some("test".into()),
            domain: None,
            timezone: None,
            api_token: None,
            config: None,
        })
        .await
        .unwrap();

    (db, org.id)
}

fn invite(org_id: Uuid, email: &str) -> CreateInvitation {
    CreateInvitation {
        org_id,
        email: email.into(),
        role: "Editors".into(),
    }
}

#[tokio::test]
async fn create_generates_secret() {
    let (db, org_id) = setup().await;
    let repo = SurrealInvitationRepository::new(db);

    let invitation = repo
        .create(invite(org_id, "alice@example.com"))
        .await
        .unwrap();

    assert_eq!(invitation.org_id, org_id);
    assert_eq!(invitation.email, "alice@example.com");
    assert_eq!(invitation.role, "Editors");
    assert!(invitation.is_active);
    assert_eq!(invitation.secret.len(), SECRET_LEN);
    assert!(
        invitation
            .secret
            .chars()
            .all(|c| SECRET_ALPHABET.contains(c))
    );
}

#[tokio::test]
async fn secrets_are_unique_per_invitation() {
    let (db, org_id) = setup().await;
    let repo = SurrealInvitationRepository::new(db);

    let a = repo.create(invite(org_id, "a@example.com")).await.unwrap();
    let b = repo.create(invite(org_id, "b@example.com")).await.unwrap();

    assert_ne!(a.secret, b.secret);
}

#[tokio::test]
async fn get_by_id_and_secret() {
    let (db, org_id) = setup().await;
    let repo = SurrealInvitationRepository::new(db);

    let created = repo
        .create(invite(org_id, "carol@example.com"))
        .await
        .unwrap();

    let by_id = repo.get_by_id(created.id).await.unwrap();
    assert_eq!(by_id.email, "carol@example.com");

    let by_secret = repo.get_by_secret(&created.secret).await.unwrap();
    assert_eq!(by_secret.id, created.id);

    let missing = repo.get_by_secret("NOSUCHSECRET").await;
    assert!(matches!(missing, Err(OrgError::NotFound { .. })));
}

#[tokio::test]
async fn deactivate_marks_redeemed() {
    let (db, org_id) = setup().await;
    let repo = SurrealInvitationRepository::new(db);

    let created = repo
        .create(invite(org_id, "dave@example.com"))
        .await
        .unwrap();

    repo.deactivate(created.id).await.unwrap();

    // Still fetchable; the caller decides what inactive means.
    let fetched = repo.get_by_id(created.id).await.unwrap();
    assert!(!fetched.is_active);
}

#[tokio::test]
async fn list_by_org_is_scoped() {
    let (db, org_a) = setup().await;
    let org_repo = SurrealOrgRepository::new(db.clone());
    let org_b = org_repo
        .create(CreateOrg {
            name: "Other Org".into(),
            language: None,
            subdomain: Some("other".into()),
            domain: None,
            timezone: None,
            api_token: None,
            config: None,
        })
        .await
        .unwrap()
        .id;

    let repo = SurrealInvitationRepository::new(db);
    repo.create(invite(org_a, "one@example.com")).await.unwrap();
    repo.create(invite(org_a, "two@example.com")).await.unwrap();
    repo.create(invite(org_b, "three@example.com"))
        .await
        .unwrap();

    let for_a = repo.list_by_org(org_a).await.unwrap();
    assert_eq!(for_a.len(), 2);
    assert!(for_a.iter().all(|i| i.org_id == org_a));

    let for_b = repo.list_by_org(org_b).await.unwrap();
    assert_eq!(for_b.len(), 1);
    assert_eq!(for_b[0].email, "three@example.com");
}
