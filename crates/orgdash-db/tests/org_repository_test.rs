//! Integration tests for the Org repository using in-memory SurrealDB.

use orgdash_core::models::org::{ConfigValue, CreateOrg, OrgConfig, UpdateOrg};
use orgdash_core::repository::{OrgRepository, RoleAssignmentRepository};
use orgdash_core::OrgError;
use orgdash_db::repository::{SurrealOrgRepository, SurrealRoleAssignmentRepository};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

/// Helper: spin up in-memory DB and run migrations.
async fn setup() -> Surreal<surrealdb::engine::local::Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    orgdash_db::run_migrations(&db).await.unwrap();
    db
}

fn create_input(name: &str, subdomain: &str) -> CreateOrg {
    CreateOrg {
        name: name.into(),
        language: Some("en".into()),
        subdomain: Some(subdomain.into()),
        domain: None,
        timezone: None,
        api_token: Some("token-123".into()),
        config: None,
    }
}

#[tokio::test]
async fn create_and_get_org() {
    let db = setup().await;
    let repo = SurrealOrgRepository::new(db);

    let org = repo.create(create_input("Uganda", "uganda")).await.unwrap();

    assert_eq!(org.name, "Uganda");
    assert_eq!(org.subdomain.as_deref(), Some("uganda"));
    assert_eq!(org.timezone, "UTC"); // default when not given
    assert!(org.is_active);

    let fetched = repo.get_by_id(org.id).await.unwrap();
    assert_eq!(fetched.id, org.id);
    assert_eq!(fetched.name, "Uganda");
    assert_eq!(fetched.api_token.as_deref(), Some("token-123"));
}

#[tokio::test]
async fn get_by_subdomain_and_domain() {
    let db = setup().await;
    let repo = SurrealOrgRepository::new(db);

    let mut input = create_input("Kenya", "kenya");
    input.domain = Some("dashboard.ke".into());
    let org = repo.create(input).await.unwrap();

    let by_sub = repo.get_by_subdomain("kenya").await.unwrap();
    assert_eq!(by_sub.id, org.id);

    let by_domain = repo.get_by_domain("dashboard.ke").await.unwrap();
    assert_eq!(by_domain.id, org.id);

    let missing = repo.get_by_subdomain("nowhere").await;
    assert!(matches!(missing, Err(OrgError::NotFound { .. })));
}

#[tokio::test]
async fn duplicate_subdomain_rejected() {
    let db = setup().await;
    let repo = SurrealOrgRepository::new(db);

    repo.create(create_input("First", "shared")).await.unwrap();
    let result = repo.create(create_input("Second", "shared")).await;

    assert!(
        matches!(result, Err(OrgError::Validation { .. })),
        "duplicate subdomain should be a validation error"
    );
}

#[tokio::test]
async fn orgs_without_subdomain_can_coexist() {
    let db = setup().await;
    let repo = SurrealOrgRepository::new(db);

    let bare = |name: &str| CreateOrg {
        name: name.into(),
        language: None,
        subdomain: None,
        domain: None,
        timezone: None,
        api_token: None,
        config: None,
    };

    repo.create(bare("One")).await.unwrap();
    repo.create(bare("Two")).await.unwrap();

    assert_eq!(repo.list_active().await.unwrap().len(), 2);
}

#[tokio::test]
async fn update_org() {
    let db = setup().await;
    let repo = SurrealOrgRepository::new(db);

    let org = repo.create(create_input("Original", "orig")).await.unwrap();

    let updated = repo
        .update(
            org.id,
            UpdateOrg {
                name: Some("Renamed".into()),
                timezone: Some("Africa/Kampala".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.name, "Renamed");
    assert_eq!(updated.timezone, "Africa/Kampala");
    assert_eq!(updated.subdomain.as_deref(), Some("orig")); // unchanged
}

#[tokio::test]
async fn update_keeps_own_subdomain() {
    let db = setup().await;
    let repo = SurrealOrgRepository::new(db);

    let org = repo.create(create_input("Self", "self")).await.unwrap();

    // Re-asserting the org's own subdomain must not count as a
    // conflict with itself.
    let updated = repo
        .update(
            org.id,
            UpdateOrg {
                subdomain: Some("self".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.subdomain.as_deref(), Some("self"));
}

#[tokio::test]
async fn update_to_taken_subdomain_rejected() {
    let db = setup().await;
    let repo = SurrealOrgRepository::new(db);

    repo.create(create_input("Holder", "taken")).await.unwrap();
    let org = repo.create(create_input("Mover", "mover")).await.unwrap();

    let result = repo
        .update(
            org.id,
            UpdateOrg {
                subdomain: Some("taken".into()),
                ..Default::default()
            },
        )
        .await;

    assert!(matches!(result, Err(OrgError::Validation { .. })));
}

#[tokio::test]
async fn deactivate_excludes_from_active_listing() {
    let db = setup().await;
    let repo = SurrealOrgRepository::new(db);

    let a = repo.create(create_input("Alpha", "alpha")).await.unwrap();
    let b = repo.create(create_input("Beta", "beta")).await.unwrap();

    repo.deactivate(a.id).await.unwrap();

    let active = repo.list_active().await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, b.id);

    // Deactivated orgs remain fetchable by id.
    let fetched = repo.get_by_id(a.id).await.unwrap();
    assert!(!fetched.is_active);
}

#[tokio::test]
async fn list_for_user_only_returns_member_orgs() {
    let db = setup().await;
    let org_repo = SurrealOrgRepository::new(db.clone());
    let role_repo = SurrealRoleAssignmentRepository::new(db);

    let a = org_repo.create(create_input("A", "a")).await.unwrap();
    let _b = org_repo.create(create_input("B", "b")).await.unwrap();

    let user = Uuid::new_v4();
    role_repo.grant(a.id, user, "Editors").await.unwrap();

    let orgs = org_repo.list_for_user(user).await.unwrap();
    assert_eq!(orgs.len(), 1);
    assert_eq!(orgs[0].id, a.id);
}

#[tokio::test]
async fn set_config_persists_typed_values() {
    let db = setup().await;
    let repo = SurrealOrgRepository::new(db);

    let org = repo.create(create_input("Cfg", "cfg")).await.unwrap();

    repo.set_config(org.id, "featured_state", ConfigValue::from("Kampala"))
        .await
        .unwrap();
    let updated = repo
        .set_config(org.id, "show_maps", ConfigValue::from(true))
        .await
        .unwrap();

    assert_eq!(updated.config.get_str("featured_state"), Some("Kampala"));
    assert_eq!(updated.config.get_bool("show_maps"), Some(true));

    let fetched = repo.get_by_id(org.id).await.unwrap();
    assert_eq!(fetched.config.get_str("featured_state"), Some("Kampala"));
}

#[tokio::test]
async fn create_with_initial_config() {
    let db = setup().await;
    let repo = SurrealOrgRepository::new(db);

    let mut config = OrgConfig::new();
    config.set("chart_limit", 25.0);

    let mut input = create_input("WithCfg", "withcfg");
    input.config = Some(config);

    let org = repo.create(input).await.unwrap();
    assert_eq!(org.config.get_number("chart_limit"), Some(25.0));
}
