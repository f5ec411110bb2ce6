//! Master/detail screen flows driven end to end over HTTP

use std::sync::Arc;
use std::time::Duration;

use super::common::backend::SUBMODULE_DELETE;
use super::common::{control_family_row, submodule_row, MockBackend};
use admin_records::screen::{
    AutoConfirmer, Confirmation, Field, LayoutState, NotificationLog, NotifyPhase,
};
use admin_records::{
    FailureKind, HttpTransport, MutationGateway, RecordId, RecordScreen, RecordStore, Resource,
    RetryPolicy, ScreenEvent, ScreenServices, ScreenView,
};

struct Harness {
    screen: RecordScreen,
    log: Arc<NotificationLog>,
}

async fn open(backend: &MockBackend, resource: Resource, answer: Confirmation) -> Harness {
    let transport = Arc::new(
        HttpTransport::new(backend.base_url(), Duration::from_secs(5))
            .expect("Failed to build HTTP client"),
    );
    let log = Arc::new(NotificationLog::new());
    let services = ScreenServices {
        store: RecordStore::new(transport.clone(), RetryPolicy::immediate(1)),
        gateway: MutationGateway::new(transport, 1),
        notifier: log.clone(),
        confirmer: Arc::new(AutoConfirmer(answer)),
    };
    let mut screen = RecordScreen::new(resource, services);
    screen.load().await;
    Harness { screen, log }
}

async fn risk_backend() -> MockBackend {
    MockBackend::start()
        .await
        .with_submodules(vec![submodule_row(1, "Risk", "Risk Mgmt", "desc")])
}

#[tokio::test]
async fn test_select_opens_split_panel() {
    let backend = risk_backend().await;
    let Harness { mut screen, .. } =
        open(&backend, Resource::sub_modules(), Confirmation::Cancelled).await;

    screen.dispatch(ScreenEvent::Select(RecordId(1)));

    let ScreenView::Records(view) = screen.view() else {
        panic!("expected the record list");
    };
    assert_eq!(view.layout.state, LayoutState::SplitExpanded);
    assert_eq!(view.selected.map(|r| r.name.as_str()), Some("Risk"));
}

#[tokio::test]
async fn test_blank_name_blocks_submission() {
    let backend = risk_backend().await;
    let Harness { mut screen, log } =
        open(&backend, Resource::sub_modules(), Confirmation::Cancelled).await;

    screen.dispatch(ScreenEvent::Select(RecordId(1)));
    screen.dispatch(ScreenEvent::ToggleEdit);
    screen.dispatch(ScreenEvent::EditField {
        field: Field::Name,
        value: "   ".to_string(),
    });
    screen.dispatch(ScreenEvent::Submit);
    screen.settle().await;

    let form = screen.state().form().expect("form stays open");
    assert_eq!(form.errors().get(Field::Name), Some("Name is required"));
    assert!(!form.is_submitting());
    assert!(backend.mutations().is_empty());
    assert!(log.entries().is_empty());
}

#[tokio::test]
async fn test_update_refreshes_the_list() {
    let backend = risk_backend().await;
    let Harness { mut screen, log } =
        open(&backend, Resource::sub_modules(), Confirmation::Cancelled).await;

    screen.dispatch(ScreenEvent::Select(RecordId(1)));
    screen.dispatch(ScreenEvent::ToggleEdit);
    screen.dispatch(ScreenEvent::EditField {
        field: Field::DisplayName,
        value: "  Risk Management ".to_string(),
    });
    screen.dispatch(ScreenEvent::Submit);
    screen.settle().await;

    assert_eq!(
        log.messages(),
        vec![
            "Updating sub-module...".to_string(),
            "Sub-Module updated successfully!".to_string(),
        ]
    );
    assert!(screen.state().form().is_none());
    assert_eq!(screen.state().layout().state, LayoutState::Collapsed);
    assert_eq!(backend.list_calls(), 2);
    let record = screen.state().selected().expect("selection survives an update");
    assert_eq!(record.display_name, "Risk Management");
}

#[tokio::test]
async fn test_rejected_update_keeps_form_open() {
    let backend = MockBackend::start()
        .await
        .with_control_families(vec![control_family_row(3, "AC", "Access")]);
    let Harness { mut screen, log } =
        open(&backend, Resource::control_families(), Confirmation::Cancelled).await;
    backend.set_envelope_status(400);

    screen.dispatch(ScreenEvent::Select(RecordId(3)));
    screen.dispatch(ScreenEvent::ToggleEdit);
    screen.dispatch(ScreenEvent::Submit);
    screen.settle().await;

    let entries = log.entries();
    assert_eq!(entries.last().map(|n| n.phase), Some(NotifyPhase::Error));
    assert_eq!(
        entries.last().map(|n| n.message.as_str()),
        Some("Failed to update control: Record is in use")
    );
    let form = screen.state().form().expect("form stays open");
    assert!(!form.is_submitting());
    assert_eq!(backend.list_calls(), 1, "no refetch after a failed update");
}

#[tokio::test]
async fn test_confirmed_delete_collapses_and_refetches() {
    let backend = risk_backend().await;
    let Harness { mut screen, log } =
        open(&backend, Resource::sub_modules(), Confirmation::Confirmed).await;

    screen.dispatch(ScreenEvent::Select(RecordId(1)));
    screen.dispatch(ScreenEvent::RequestDelete);
    screen.settle().await;

    let mutations = backend.mutations();
    assert_eq!(mutations.len(), 1);
    assert_eq!(mutations[0].path, SUBMODULE_DELETE);
    assert_eq!(mutations[0].body["id"], 1);
    assert!(!screen.state().selection().is_some());
    assert_eq!(screen.state().layout().state, LayoutState::Collapsed);
    assert!(matches!(screen.view(), ScreenView::Empty));
    assert_eq!(
        log.messages().last().map(String::as_str),
        Some("Sub-Module deleted successfully!")
    );
}

#[tokio::test]
async fn test_business_error_renders_error_view() {
    let backend = risk_backend().await;
    backend.set_envelope_status(500);
    let Harness { screen, .. } =
        open(&backend, Resource::sub_modules(), Confirmation::Cancelled).await;

    match screen.view() {
        ScreenView::Error(failure) => assert_eq!(failure.kind, FailureKind::BusinessError),
        other => panic!("expected error view, got {:?}", other),
    }
}

#[tokio::test]
async fn test_empty_collection_renders_empty_view() {
    let backend = MockBackend::start().await;
    let Harness { screen, .. } =
        open(&backend, Resource::sub_modules(), Confirmation::Cancelled).await;

    assert!(matches!(screen.view(), ScreenView::Empty));
}
