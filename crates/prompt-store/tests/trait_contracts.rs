//! Trait contract tests for PromptStore.
//!
//! These tests verify the behavioral contract of the store trait using the
//! in-memory fake. Any conforming implementation must pass these.

use prompt_store::fakes::MemoryPromptStore;
use prompt_store::store_traits::*;
use prompt_store::StoreError;

fn seeded() -> MemoryPromptStore {
    MemoryPromptStore::with_documents([("a", "alpha"), ("b", "beta"), ("nested/c", "gamma")])
}

#[tokio::test]
async fn list_live_returns_every_path() {
    let store = seeded();
    let paths: Vec<String> = store
        .list_documents(&Target::Live)
        .await
        .unwrap()
        .into_iter()
        .map(|d| d.path)
        .collect();

    assert_eq!(paths, vec!["a", "b", "nested/c"]);
    assert_eq!(store.list_calls(), 1);
}

#[tokio::test]
async fn get_returns_full_content_and_version() {
    let store = seeded();
    let doc = store.get_document("nested/c", &Target::Live).await.unwrap();

    assert_eq!(doc.content, "gamma");
    assert!(doc.version_uuid.is_some());
}

#[tokio::test]
async fn get_missing_is_not_found() {
    let store = seeded();
    let err = store
        .get_document("nope", &Target::Live)
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::NotFound { .. }));
}

#[tokio::test]
async fn deploy_publishes_one_version_for_all_changes() {
    let store = seeded();
    let changes = vec![
        DocumentChange::deleted("b"),
        DocumentChange::modified("a", "ALPHA"),
        DocumentChange::added("d", "delta"),
    ];

    let version = store.deploy_to_live(&changes, "batch").await.unwrap();

    assert_eq!(store.live_paths(), vec!["a", "d", "nested/c"]);
    assert_eq!(store.live_content("a").as_deref(), Some("ALPHA"));
    assert_eq!(store.versions(), vec![version.clone()]);
    assert_eq!(version.title.as_deref(), Some("batch"));

    let doc = store.get_document("d", &Target::Live).await.unwrap();
    assert_eq!(doc.version_uuid, Some(version.uuid));
}

#[tokio::test]
async fn added_over_existing_path_replaces_content() {
    let store = seeded();
    store
        .deploy_to_live(&[DocumentChange::added("a", "again")], "readd")
        .await
        .unwrap();

    assert_eq!(store.live_content("a").as_deref(), Some("again"));
}

#[tokio::test]
async fn rejected_deploy_leaves_live_untouched() {
    let store = seeded();
    let changes = vec![
        DocumentChange::added("z", "zeta"),
        DocumentChange::deleted("ghost"),
    ];

    let err = store.deploy_to_live(&changes, "stale").await.unwrap_err();

    assert!(matches!(err, StoreError::Conflict { ref path, .. } if path == "ghost"));
    assert_eq!(store.live_paths(), vec!["a", "b", "nested/c"]);
    assert!(store.versions().is_empty());
}

#[tokio::test]
async fn injected_list_failure_is_consumed_once() {
    let store = seeded();
    store.fail_lists(1);

    assert!(store.list_documents(&Target::Live).await.is_err());
    assert!(store.list_documents(&Target::Live).await.is_ok());
    assert_eq!(store.list_calls(), 2);
}

#[tokio::test]
async fn injected_deploy_failure_surfaces_api_error() {
    let store = seeded();
    store.fail_deploys(1);

    let err = store
        .deploy_to_live(&[DocumentChange::added("x", "y")], "fails")
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::Api { status: 500, .. }));
    assert_eq!(store.live_content("x"), None);
}

#[tokio::test]
async fn run_relays_parameters() {
    let store = seeded();
    let params = serde_json::json!({"user": "ada"});
    let outcome = store.run_document("a", &params).await.unwrap();

    assert!(outcome.uuid.is_some());
    assert_eq!(outcome.extra.get("parameters"), Some(&params));
    assert_eq!(
        outcome.response.and_then(|r| r.text).as_deref(),
        Some("alpha")
    );
}

#[tokio::test]
async fn version_target_lists_the_published_snapshot() {
    let store = seeded();
    let first = store
        .deploy_to_live(&[DocumentChange::deleted("b")], "drop-b")
        .await
        .unwrap();
    store
        .deploy_to_live(&[DocumentChange::added("d", "delta")], "add-d")
        .await
        .unwrap();

    let paths: Vec<String> = store
        .list_documents(&Target::Version(first.uuid.clone()))
        .await
        .unwrap()
        .into_iter()
        .map(|d| d.path)
        .collect();
    assert_eq!(paths, vec!["a", "nested/c"]);

    let doc = store
        .get_document("a", &Target::Version(first.uuid.clone()))
        .await
        .unwrap();
    assert_eq!(doc.content, "alpha");
    assert_eq!(doc.version_uuid, Some(first.uuid));
}

#[tokio::test]
async fn version_target_keeps_content_from_before_later_changes() {
    let store = seeded();
    store
        .deploy_to_live(&[DocumentChange::modified("a", "ALPHA")], "edit-a")
        .await
        .unwrap();

    let seed = store
        .get_document("a", &Target::Version("seed".to_string()))
        .await
        .unwrap();
    assert_eq!(seed.content, "alpha");
    assert_eq!(store.live_content("a").as_deref(), Some("ALPHA"));
}

#[tokio::test]
async fn unknown_version_target_is_an_api_not_found() {
    let store = seeded();

    let err = store
        .list_documents(&Target::Version("missing".to_string()))
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::Api { status: 404, .. }));
}
