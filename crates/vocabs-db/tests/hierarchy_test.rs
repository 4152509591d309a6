//! Integration tests for display-hierarchy resolution and concept
//! repository behavior.
//!
//! Validates:
//! - Label path rendering along the broader chain
//! - Descendant closures (self included)
//! - Cycle detection failing fast instead of looping
//! - Notation slugging with numeric de-duplication
//! - The union semantics of the broader/narrower relation edges

use vocabs_core::{ConceptRelation, Error, UpdateConceptRequest};
use vocabs_db::test_fixtures::{
    create_test_concept, create_test_scheme, create_test_user, test_database,
};
use vocabs_db::ConceptRepository;

#[tokio::test]
async fn label_path_joins_ancestor_chain() {
    let db = test_database().await;
    let alice = create_test_user(&db, "alice").await;
    let scheme = create_test_scheme(&db, "Taxa", Some(alice.id)).await;

    let animal = create_test_concept(&db, scheme.id, "Animal", None, Some(alice.id)).await;
    let mammal =
        create_test_concept(&db, scheme.id, "Mammal", Some(animal.id), Some(alice.id)).await;
    let dog = create_test_concept(&db, scheme.id, "Dog", Some(mammal.id), Some(alice.id)).await;

    let path = db.hierarchy.label_path(dog.id).await.unwrap();
    assert_eq!(path.as_str(), "Animal >> Mammal >> Dog");

    let root_path = db.hierarchy.label_path(animal.id).await.unwrap();
    assert_eq!(root_path.as_str(), "Animal");
}

#[tokio::test]
async fn ancestors_are_root_first_excluding_self() {
    let db = test_database().await;
    let alice = create_test_user(&db, "alice").await;
    let scheme = create_test_scheme(&db, "Taxa", Some(alice.id)).await;

    let animal = create_test_concept(&db, scheme.id, "Animal", None, Some(alice.id)).await;
    let mammal =
        create_test_concept(&db, scheme.id, "Mammal", Some(animal.id), Some(alice.id)).await;
    let dog = create_test_concept(&db, scheme.id, "Dog", Some(mammal.id), Some(alice.id)).await;

    let ancestors = db.hierarchy.ancestors(dog.id).await.unwrap();
    let ids: Vec<_> = ancestors.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![animal.id, mammal.id]);
}

#[tokio::test]
async fn descendants_include_self_and_whole_subtree() {
    let db = test_database().await;
    let alice = create_test_user(&db, "alice").await;
    let scheme = create_test_scheme(&db, "Taxa", Some(alice.id)).await;

    let animal = create_test_concept(&db, scheme.id, "Animal", None, Some(alice.id)).await;
    let mammal =
        create_test_concept(&db, scheme.id, "Mammal", Some(animal.id), Some(alice.id)).await;
    let bird = create_test_concept(&db, scheme.id, "Bird", Some(animal.id), Some(alice.id)).await;
    let dog = create_test_concept(&db, scheme.id, "Dog", Some(mammal.id), Some(alice.id)).await;

    let closure = db.hierarchy.descendants(animal.id).await.unwrap();
    let ids: Vec<_> = closure.iter().map(|c| c.id).collect();

    assert_eq!(ids[0], animal.id, "closure starts with the concept itself");
    assert!(ids.contains(&mammal.id));
    assert!(ids.contains(&bird.id));
    assert!(ids.contains(&dog.id));
    assert_eq!(ids.len(), 4);
}

#[tokio::test]
async fn broader_cycle_is_detected() {
    let db = test_database().await;
    let alice = create_test_user(&db, "alice").await;
    let scheme = create_test_scheme(&db, "Cyclic", Some(alice.id)).await;

    let a = create_test_concept(&db, scheme.id, "A", None, Some(alice.id)).await;
    let b = create_test_concept(&db, scheme.id, "B", Some(a.id), Some(alice.id)).await;

    // Point the root back at its child.
    db.concepts
        .update(
            a.id,
            UpdateConceptRequest {
                broader_concept_id: Some(Some(b.id)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let err = db.hierarchy.label_path(a.id).await.unwrap_err();
    assert!(matches!(err, Error::CycleDetected(_)));

    let err = db.hierarchy.descendants(a.id).await.unwrap_err();
    assert!(matches!(err, Error::CycleDetected(_)));
}

#[tokio::test]
async fn blank_notation_is_slugged_and_deduplicated() {
    let db = test_database().await;
    let alice = create_test_user(&db, "alice").await;
    let scheme = create_test_scheme(&db, "Slugs", Some(alice.id)).await;

    let first =
        create_test_concept(&db, scheme.id, "Maritime Archaeology", None, Some(alice.id)).await;
    let second =
        create_test_concept(&db, scheme.id, "Maritime Archaeology", None, Some(alice.id)).await;
    let third =
        create_test_concept(&db, scheme.id, "Maritime Archaeology", None, Some(alice.id)).await;

    assert_eq!(first.notation, "maritime-archaeology");
    assert_eq!(second.notation, "maritime-archaeology-2");
    assert_eq!(third.notation, "maritime-archaeology-3");
}

#[tokio::test]
async fn explicit_notation_is_kept_verbatim() {
    let db = test_database().await;
    let alice = create_test_user(&db, "alice").await;
    let scheme = create_test_scheme(&db, "Slugs", Some(alice.id)).await;

    let concept = db
        .concepts
        .create(
            vocabs_core::CreateConceptRequest {
                scheme_id: scheme.id,
                pref_label: "Burial Mound".to_string(),
                pref_label_lang: None,
                definition: None,
                definition_lang: None,
                notation: Some("BM-001".to_string()),
                broader_concept_id: None,
                top_concept: true,
                same_as_external: None,
                source_description: None,
                creator: None,
                legacy_id: None,
            },
            Some(alice.id),
        )
        .await
        .unwrap();

    assert_eq!(concept.notation, "BM-001");
}

#[tokio::test]
async fn broader_and_narrower_union_reverse_edges() {
    let db = test_database().await;
    let alice = create_test_user(&db, "alice").await;
    let scheme = create_test_scheme(&db, "Edges", Some(alice.id)).await;

    let a = create_test_concept(&db, scheme.id, "EdgeA", None, Some(alice.id)).await;
    let b = create_test_concept(&db, scheme.id, "EdgeB", None, Some(alice.id)).await;
    let c = create_test_concept(&db, scheme.id, "EdgeC", None, Some(alice.id)).await;

    // a --broader--> b: b is broader than a.
    db.concepts
        .add_relation(a.id, b.id, ConceptRelation::Broader)
        .await
        .unwrap();
    // c --narrower--> a: a is broader than c.
    db.concepts
        .add_relation(c.id, a.id, ConceptRelation::Narrower)
        .await
        .unwrap();

    let broader_of_a: Vec<_> = db
        .concepts
        .get_broader(a.id)
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(broader_of_a, vec![b.id]);

    // a's narrower set comes from the reverse direction of both edge kinds.
    let narrower_of_a: Vec<_> = db
        .concepts
        .get_narrower(a.id)
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(narrower_of_a, vec![c.id]);

    let narrower_of_b: Vec<_> = db
        .concepts
        .get_narrower(b.id)
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(narrower_of_b, vec![a.id]);
}

#[tokio::test]
async fn self_relation_is_rejected() {
    let db = test_database().await;
    let alice = create_test_user(&db, "alice").await;
    let scheme = create_test_scheme(&db, "Edges", Some(alice.id)).await;
    let a = create_test_concept(&db, scheme.id, "Selfish", None, Some(alice.id)).await;

    let err = db
        .concepts
        .add_relation(a.id, a.id, ConceptRelation::Related)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}

#[tokio::test]
async fn deleting_parent_clears_child_pointer() {
    let db = test_database().await;
    let alice = create_test_user(&db, "alice").await;
    let scheme = create_test_scheme(&db, "Orphaning", Some(alice.id)).await;

    let parent = create_test_concept(&db, scheme.id, "Parent", None, Some(alice.id)).await;
    let child =
        create_test_concept(&db, scheme.id, "Child", Some(parent.id), Some(alice.id)).await;

    db.concepts.delete(parent.id).await.unwrap();

    let reloaded = db.concepts.get(child.id).await.unwrap().unwrap();
    assert_eq!(reloaded.broader_concept_id, None);

    let path = db.hierarchy.label_path(child.id).await.unwrap();
    assert_eq!(path.as_str(), "Child");
}
