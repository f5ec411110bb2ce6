//! Store and gateway behaviour over real HTTP

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use super::common::backend::{SUBMODULE_DELETE, SUBMODULE_UPDATE};
use super::common::{control_family_row, submodule_row, MockBackend};
use admin_records::{
    FailureKind, HttpTransport, MutationGateway, QueryState, RecordId, RecordPatch, RecordStore,
    Resource, RetryPolicy,
};

fn transport(backend: &MockBackend) -> Arc<HttpTransport> {
    Arc::new(
        HttpTransport::new(backend.base_url(), Duration::from_secs(5))
            .expect("Failed to build HTTP client"),
    )
}

fn store(backend: &MockBackend) -> RecordStore {
    RecordStore::new(transport(backend), RetryPolicy::immediate(3))
}

async fn risk_backend() -> MockBackend {
    MockBackend::start().await.with_submodules(vec![
        submodule_row(1, "Risk", "Risk Mgmt", "desc"),
        submodule_row(2, "Audit", "Audit Trail", "Who did what"),
    ])
}

#[tokio::test]
async fn test_list_decodes_submodule_columns() {
    let backend = risk_backend().await;

    let collection = store(&backend)
        .fetch(&Resource::sub_modules())
        .await
        .expect("fetch should succeed");

    assert_eq!(collection.len(), 2);
    let risk = collection.get(RecordId(1)).expect("record 1 present");
    assert_eq!(risk.name, "Risk");
    assert_eq!(risk.display_name, "Risk Mgmt");
    assert_eq!(risk.description, "desc");
}

#[tokio::test]
async fn test_list_decodes_control_family_columns() {
    let backend = MockBackend::start()
        .await
        .with_control_families(vec![control_family_row(7, "AC", "Access Control")]);

    let collection = store(&backend)
        .fetch(&Resource::control_families())
        .await
        .expect("fetch should succeed");

    let family = collection.get(RecordId(7)).expect("record 7 present");
    assert_eq!(family.name, "AC");
    // No display column: falls back to the name
    assert_eq!(family.display_name, "AC");
    assert_eq!(family.description, "Access Control");
}

#[tokio::test]
async fn test_fetch_is_cached() {
    let backend = risk_backend().await;
    let store = store(&backend);
    let resource = Resource::sub_modules();

    store.fetch(&resource).await.expect("first fetch");
    store.fetch(&resource).await.expect("second fetch");

    assert_eq!(backend.list_calls(), 1);
}

#[tokio::test]
async fn test_outage_is_retried() {
    let backend = risk_backend().await;
    backend.fail_next_lists(2);

    let collection = store(&backend)
        .fetch(&Resource::sub_modules())
        .await
        .expect("third attempt should succeed");

    assert_eq!(collection.len(), 2);
    assert_eq!(backend.list_calls(), 3);
}

#[tokio::test]
async fn test_outage_exhausts_retries() {
    let backend = risk_backend().await;
    backend.fail_next_lists(10);

    let failure = store(&backend)
        .fetch(&Resource::sub_modules())
        .await
        .expect_err("every attempt fails");

    assert_eq!(failure.kind, FailureKind::NetworkError);
    assert_eq!(failure.status, Some(503));
    assert_eq!(failure.message, "Service unavailable");
    // One initial attempt plus three retries
    assert_eq!(backend.list_calls(), 4);
}

#[tokio::test]
async fn test_business_status_is_not_retried() {
    let backend = risk_backend().await;
    backend.set_envelope_status(500);
    let store = store(&backend);
    let resource = Resource::sub_modules();

    let failure = store.fetch(&resource).await.expect_err("status 500");

    assert_eq!(failure.kind, FailureKind::BusinessError);
    assert_eq!(failure.status, Some(500));
    assert_eq!(backend.list_calls(), 1);
    assert!(matches!(
        store.snapshot(&resource.cache_key),
        QueryState::Failed(_)
    ));
}

#[tokio::test]
async fn test_update_sends_customer_scoped_body() {
    let backend = risk_backend().await;
    let gateway = MutationGateway::new(transport(&backend), 42);
    let patch = RecordPatch {
        id: RecordId(1),
        name: "Risk 2".to_string(),
        display_name: Some("Risk Management".to_string()),
        description: "updated".to_string(),
    };

    let success = gateway
        .update(&Resource::sub_modules(), &patch)
        .await
        .expect("update should succeed");

    assert_eq!(success.message.as_deref(), Some("Updated"));
    let mutations = backend.mutations();
    assert_eq!(mutations.len(), 1);
    assert_eq!(mutations[0].path, SUBMODULE_UPDATE);
    assert_eq!(
        mutations[0].body,
        json!({
            "id": 1,
            "submodule_name": "Risk 2",
            "display_submodule_name": "Risk Management",
            "submodule_desc": "updated",
            "customer_id": 42,
        })
    );
    assert_eq!(backend.submodules()[0]["SUBMODULE_NAME"], "Risk 2");
}

#[tokio::test]
async fn test_rejected_delete_surfaces_backend_message() {
    let backend = risk_backend().await;
    backend.set_envelope_status(409);
    let gateway = MutationGateway::new(transport(&backend), 1);

    let failure = gateway
        .delete(&Resource::sub_modules(), RecordId(2))
        .await
        .expect_err("delete is rejected");

    assert_eq!(failure.kind, FailureKind::BusinessError);
    assert_eq!(failure.message, "Record is in use");
    assert_eq!(backend.submodules().len(), 2);
}

#[tokio::test]
async fn test_invalidate_refetches_for_subscribers() {
    let backend = risk_backend().await;
    let transport = transport(&backend);
    let store = RecordStore::new(transport.clone(), RetryPolicy::immediate(0));
    let gateway = MutationGateway::new(transport, 1);
    let resource = Resource::sub_modules();

    let _subscription = store.subscribe(&resource);
    store.fetch(&resource).await.expect("initial fetch");
    gateway
        .delete(&resource, RecordId(2))
        .await
        .expect("delete should succeed");
    store.invalidate(&resource.cache_key).await;

    assert_eq!(backend.mutations()[0].path, SUBMODULE_DELETE);
    assert_eq!(backend.list_calls(), 2);
    let snapshot = store.snapshot(&resource.cache_key);
    let collection = snapshot.collection().expect("refetched collection");
    assert_eq!(collection.len(), 1);
    assert!(!collection.contains(RecordId(2)));
}
