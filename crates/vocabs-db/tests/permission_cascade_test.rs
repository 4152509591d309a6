//! Integration tests for the permission cascade.
//!
//! Validates:
//! - Creator grants on scheme and child-object creation
//! - Curator fan-out on membership changes
//! - The redundant scheme-creator re-grant on curated schemes
//! - The asymmetry of curator removal (scheme delete is kept)
//! - Idempotence of repeated grants and revocations

use uuid::Uuid;

use vocabs_core::{Permission, PermissionTarget, ALL_PERMISSIONS};
use vocabs_db::test_fixtures::{
    create_test_concept, create_test_scheme, create_test_user, test_database,
};
use vocabs_db::{ConceptSchemeRepository, Database, PermissionStore};

async fn holds_all(
    db: &Database,
    user_id: Uuid,
    target: PermissionTarget,
    object_id: Uuid,
) -> bool {
    for perm in ALL_PERMISSIONS {
        if !db
            .permissions
            .has_permission(perm, user_id, target, object_id)
            .await
            .expect("permission check failed")
        {
            return false;
        }
    }
    true
}

#[tokio::test]
async fn scheme_creation_grants_creator_all_permissions() {
    let db = test_database().await;
    let alice = create_test_user(&db, "alice").await;
    let scheme = create_test_scheme(&db, "Monuments", Some(alice.id)).await;

    assert!(holds_all(&db, alice.id, PermissionTarget::ConceptScheme, scheme.id).await);
}

#[tokio::test]
async fn scheme_without_creator_gets_no_grants() {
    let db = test_database().await;
    let scheme = create_test_scheme(&db, "Orphan", None).await;

    let grants = db
        .permissions
        .grants_for_object(PermissionTarget::ConceptScheme, scheme.id)
        .await
        .unwrap();
    assert!(grants.is_empty());
}

#[tokio::test]
async fn concept_creation_grants_creator() {
    let db = test_database().await;
    let alice = create_test_user(&db, "alice").await;
    let scheme = create_test_scheme(&db, "Periods", Some(alice.id)).await;
    let concept = create_test_concept(&db, scheme.id, "Iron Age", None, Some(alice.id)).await;

    assert!(holds_all(&db, alice.id, PermissionTarget::Concept, concept.id).await);
}

#[tokio::test]
async fn object_created_under_curated_scheme_regrants_scheme_creator() {
    let db = test_database().await;
    let alice = create_test_user(&db, "alice").await;
    let bob = create_test_user(&db, "bob").await;

    let scheme = create_test_scheme(&db, "Materials", Some(alice.id)).await;
    db.schemes
        .add_curators(scheme.id, &[bob.id])
        .await
        .unwrap();

    // Bob, a curator but not the scheme creator, adds a concept.
    let concept = create_test_concept(&db, scheme.id, "Bronze", None, Some(bob.id)).await;

    assert!(holds_all(&db, bob.id, PermissionTarget::Concept, concept.id).await);
    // Alice gets all three even though she neither created the concept nor
    // is listed as curator.
    assert!(holds_all(&db, alice.id, PermissionTarget::Concept, concept.id).await);
}

#[tokio::test]
async fn adding_curator_grants_scheme_and_existing_children() {
    let db = test_database().await;
    let alice = create_test_user(&db, "alice").await;
    let bob = create_test_user(&db, "bob").await;

    let scheme = create_test_scheme(&db, "Finds", Some(alice.id)).await;
    let concept = create_test_concept(&db, scheme.id, "Coin", None, Some(alice.id)).await;

    assert!(!holds_all(&db, bob.id, PermissionTarget::Concept, concept.id).await);

    db.schemes
        .add_curators(scheme.id, &[bob.id])
        .await
        .unwrap();

    assert!(holds_all(&db, bob.id, PermissionTarget::ConceptScheme, scheme.id).await);
    assert!(holds_all(&db, bob.id, PermissionTarget::Concept, concept.id).await);
}

#[tokio::test]
async fn removing_curator_keeps_scheme_delete() {
    let db = test_database().await;
    let alice = create_test_user(&db, "alice").await;
    let bob = create_test_user(&db, "bob").await;

    let scheme = create_test_scheme(&db, "Sites", Some(alice.id)).await;
    let concept = create_test_concept(&db, scheme.id, "Hillfort", None, Some(alice.id)).await;

    db.schemes
        .add_curators(scheme.id, &[bob.id])
        .await
        .unwrap();
    db.schemes
        .remove_curators(scheme.id, &[bob.id])
        .await
        .unwrap();

    // View and change on the scheme are gone, delete survives.
    assert!(!db
        .permissions
        .has_permission(
            Permission::View,
            bob.id,
            PermissionTarget::ConceptScheme,
            scheme.id
        )
        .await
        .unwrap());
    assert!(!db
        .permissions
        .has_permission(
            Permission::Change,
            bob.id,
            PermissionTarget::ConceptScheme,
            scheme.id
        )
        .await
        .unwrap());
    assert!(db
        .permissions
        .has_permission(
            Permission::Delete,
            bob.id,
            PermissionTarget::ConceptScheme,
            scheme.id
        )
        .await
        .unwrap());

    // Child objects lose everything.
    for perm in ALL_PERMISSIONS {
        assert!(!db
            .permissions
            .has_permission(perm, bob.id, PermissionTarget::Concept, concept.id)
            .await
            .unwrap());
    }
}

#[tokio::test]
async fn repeated_grants_and_revocations_are_idempotent() {
    let db = test_database().await;
    let alice = create_test_user(&db, "alice").await;
    let bob = create_test_user(&db, "bob").await;

    let scheme = create_test_scheme(&db, "Tools", Some(alice.id)).await;

    // Adding the same curator twice must not fail or duplicate grants.
    db.schemes
        .add_curators(scheme.id, &[bob.id])
        .await
        .unwrap();
    db.schemes
        .add_curators(scheme.id, &[bob.id])
        .await
        .unwrap();

    let grants = db
        .permissions
        .grants_for_object(PermissionTarget::ConceptScheme, scheme.id)
        .await
        .unwrap();
    let bob_grants = grants.iter().filter(|g| g.user_id == bob.id).count();
    assert_eq!(bob_grants, 3);

    // Removing twice is a no-op the second time.
    db.schemes
        .remove_curators(scheme.id, &[bob.id])
        .await
        .unwrap();
    db.schemes
        .remove_curators(scheme.id, &[bob.id])
        .await
        .unwrap();
}

#[tokio::test]
async fn objects_with_permission_lists_visible_concepts() {
    let db = test_database().await;
    let alice = create_test_user(&db, "alice").await;
    let scheme = create_test_scheme(&db, "Eras", Some(alice.id)).await;
    let c1 = create_test_concept(&db, scheme.id, "Neolithic", None, Some(alice.id)).await;
    let c2 = create_test_concept(&db, scheme.id, "Mesolithic", None, Some(alice.id)).await;

    let visible = db
        .permissions
        .objects_with_permission(alice.id, Permission::View, PermissionTarget::Concept)
        .await
        .unwrap();

    assert!(visible.contains(&c1.id));
    assert!(visible.contains(&c2.id));
}
