//! Integration tests for the autocomplete queries.
//!
//! Validates:
//! - Permission scoping: users only see concepts they hold view on
//! - The narrower expansion of direct label matches
//! - The silent scheme fallback of the unscoped constraint lookup
//! - Scheme inclusion/exclusion for the picker variants
//! - Wildcard escaping of user input

use vocabs_db::test_fixtures::{
    create_test_concept, create_test_scheme, create_test_user, test_database, unique_suffix,
};
use vocabs_db::{AutocompleteRepository, ConceptSchemeRepository};

#[tokio::test]
async fn concepts_are_scoped_to_viewable_objects() {
    let db = test_database().await;
    let alice = create_test_user(&db, "alice").await;
    let mallory = create_test_user(&db, "mallory").await;

    let scheme = create_test_scheme(&db, "Scoped", Some(alice.id)).await;
    let tag = format!("scoped-{}", unique_suffix());
    create_test_concept(&db, scheme.id, &tag, None, Some(alice.id)).await;

    let for_alice = db.autocomplete.concepts(alice.id, Some(&tag)).await.unwrap();
    assert_eq!(for_alice.len(), 1);

    let for_mallory = db
        .autocomplete
        .concepts(mallory.id, Some(&tag))
        .await
        .unwrap();
    assert!(for_mallory.is_empty());
}

#[tokio::test]
async fn direct_matches_expand_with_immediate_narrower_concepts() {
    let db = test_database().await;
    let alice = create_test_user(&db, "alice").await;
    let scheme = create_test_scheme(&db, "Expansion", Some(alice.id)).await;

    let suffix = unique_suffix();
    let parent_label = format!("mammal-{}", suffix);
    let parent = create_test_concept(&db, scheme.id, &parent_label, None, Some(alice.id)).await;
    let child = create_test_concept(
        &db,
        scheme.id,
        &format!("dog-{}", suffix),
        Some(parent.id),
        Some(alice.id),
    )
    .await;

    let hits = db
        .autocomplete
        .concepts(alice.id, Some(&parent_label))
        .await
        .unwrap();
    let ids: Vec<_> = hits.iter().map(|h| h.id).collect();

    assert!(ids.contains(&parent.id));
    assert!(ids.contains(&child.id), "child of a direct match is included");
}

#[tokio::test]
async fn specific_concepts_require_a_query_string() {
    let db = test_database().await;
    let alice = create_test_user(&db, "alice").await;
    let scheme = create_test_scheme(&db, "Silent", Some(alice.id)).await;
    create_test_concept(&db, scheme.id, "quiet", None, Some(alice.id)).await;

    let hits = db
        .autocomplete
        .specific_concepts(alice.id, Some(&scheme.title), None)
        .await
        .unwrap();
    assert!(hits.is_empty());
}

#[tokio::test]
async fn constraint_lookup_falls_back_on_unknown_scheme_title() {
    let db = test_database().await;
    let alice = create_test_user(&db, "alice").await;
    let scheme = create_test_scheme(&db, "Constraint", Some(alice.id)).await;

    let tag = format!("constraint-{}", unique_suffix());
    create_test_concept(&db, scheme.id, &tag, None, Some(alice.id)).await;

    let resolved = db.schemes.get_by_title(&scheme.title).await.unwrap();
    assert_eq!(resolved.map(|s| s.id), Some(scheme.id));

    // Exact title restricts to that scheme.
    let scoped = db
        .autocomplete
        .constraint_concepts(Some(&scheme.title), Some(&tag))
        .await
        .unwrap();
    assert_eq!(scoped.len(), 1);

    // A title that matches no scheme silently widens to all concepts.
    let fallback = db
        .autocomplete
        .constraint_concepts(Some("no such scheme title"), Some(&tag))
        .await
        .unwrap();
    assert_eq!(fallback.len(), 1);
}

#[tokio::test]
async fn external_match_excludes_the_given_scheme() {
    let db = test_database().await;
    let alice = create_test_user(&db, "alice").await;
    let home = create_test_scheme(&db, "Home", Some(alice.id)).await;
    let other = create_test_scheme(&db, "Other", Some(alice.id)).await;

    let suffix = unique_suffix();
    let local =
        create_test_concept(&db, home.id, &format!("local-{}", suffix), None, Some(alice.id))
            .await;
    let foreign = create_test_concept(
        &db,
        other.id,
        &format!("local-{}", suffix),
        None,
        Some(alice.id),
    )
    .await;

    let hits = db
        .autocomplete
        .external_match_candidates(alice.id, Some(home.id), Some(&suffix))
        .await
        .unwrap();
    let ids: Vec<_> = hits.iter().map(|h| h.id).collect();
    assert!(ids.contains(&foreign.id));
    assert!(!ids.contains(&local.id));

    // The broader picker filters the other way around.
    let hits = db
        .autocomplete
        .broader_candidates(alice.id, Some(home.id), Some(&suffix))
        .await
        .unwrap();
    let ids: Vec<_> = hits.iter().map(|h| h.id).collect();
    assert!(ids.contains(&local.id));
    assert!(!ids.contains(&foreign.id));
}

#[tokio::test]
async fn pref_labels_are_distinct() {
    let db = test_database().await;
    let alice = create_test_user(&db, "alice").await;
    let s1 = create_test_scheme(&db, "LabelsA", Some(alice.id)).await;
    let s2 = create_test_scheme(&db, "LabelsB", Some(alice.id)).await;

    let label = format!("shared-{}", unique_suffix());
    create_test_concept(&db, s1.id, &label, None, Some(alice.id)).await;
    create_test_concept(&db, s2.id, &label, None, Some(alice.id)).await;

    let labels = db.autocomplete.pref_labels(&label).await.unwrap();
    assert_eq!(labels, vec![label]);
}

#[tokio::test]
async fn schemes_lookup_is_scoped_and_filtered() {
    let db = test_database().await;
    let alice = create_test_user(&db, "alice").await;
    let mallory = create_test_user(&db, "mallory").await;
    let scheme = create_test_scheme(&db, "Findable", Some(alice.id)).await;

    let for_alice = db
        .autocomplete
        .schemes(alice.id, Some(&scheme.title))
        .await
        .unwrap();
    assert_eq!(for_alice.len(), 1);
    assert_eq!(for_alice[0].id, scheme.id);

    let for_mallory = db
        .autocomplete
        .schemes(mallory.id, Some(&scheme.title))
        .await
        .unwrap();
    assert!(for_mallory.is_empty());
}

#[tokio::test]
async fn curator_sees_scheme_in_autocomplete_after_addition() {
    let db = test_database().await;
    let alice = create_test_user(&db, "alice").await;
    let bob = create_test_user(&db, "bob").await;
    let scheme = create_test_scheme(&db, "Granted", Some(alice.id)).await;

    db.schemes.add_curators(scheme.id, &[bob.id]).await.unwrap();

    let for_bob = db
        .autocomplete
        .schemes(bob.id, Some(&scheme.title))
        .await
        .unwrap();
    assert_eq!(for_bob.len(), 1);
}

#[tokio::test]
async fn users_lookup_excludes_requester() {
    let db = test_database().await;
    let alice = create_test_user(&db, "ac-alice").await;
    let bob = create_test_user(&db, "ac-bob").await;

    let hits = db
        .autocomplete
        .users(alice.id, Some(&bob.username))
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, bob.id);

    let self_hits = db
        .autocomplete
        .users(alice.id, Some(&alice.username))
        .await
        .unwrap();
    assert!(self_hits.is_empty());
}

#[tokio::test]
async fn like_wildcards_in_queries_are_escaped() {
    let db = test_database().await;
    let alice = create_test_user(&db, "alice").await;
    let scheme = create_test_scheme(&db, "Escaping", Some(alice.id)).await;

    let suffix = unique_suffix();
    create_test_concept(
        &db,
        scheme.id,
        &format!("100% organic {}", suffix),
        None,
        Some(alice.id),
    )
    .await;
    create_test_concept(
        &db,
        scheme.id,
        &format!("100 percent {}", suffix),
        None,
        Some(alice.id),
    )
    .await;

    // "100%" must not behave as "100<anything>".
    let hits = db
        .autocomplete
        .concepts(alice.id, Some("100% organic"))
        .await
        .unwrap();
    assert!(hits.iter().all(|h| h.pref_label.contains("100% organic")));
}
