//! In-process backend for HTTP contract tests
//!
//! Serves the list/update/delete endpoints for both resources on an
//! ephemeral loopback port. Rows are kept in the backend's column naming so
//! the alias handling in `Record` is exercised end to end.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub const SUBMODULE_LIST: &str = "/submodule-master/get-all-submodules";
pub const SUBMODULE_UPDATE: &str = "/submodule-master/update-submodule";
pub const SUBMODULE_DELETE: &str = "/submodule-master/delete-submodule";
pub const CONTROL_FAMILY_LIST: &str = "/control-family-master/get-all-control-families";
pub const CONTROL_FAMILY_UPDATE: &str = "/control-family-master/update-control-family";
pub const CONTROL_FAMILY_DELETE: &str = "/control-family-master/delete-control-family";

pub fn submodule_row(id: i64, name: &str, display_name: &str, description: &str) -> Value {
    json!({
        "ID": id,
        "SUBMODULE_NAME": name,
        "DISPLAY_SUBMODULE_NAME": display_name,
        "SUBMODULE_DESC": description,
    })
}

pub fn control_family_row(id: i64, name: &str, description: &str) -> Value {
    json!({
        "ID": id,
        "CONTROL_FAMILY_NAME": name,
        "CONTROL_FAMILY_DESC": description,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Table {
    SubModules,
    ControlFamilies,
}

/// A mutation request as the backend received it
#[derive(Debug, Clone, PartialEq)]
pub struct ReceivedMutation {
    pub path: &'static str,
    pub body: Value,
}

struct BackendState {
    submodules: Mutex<Vec<Value>>,
    control_families: Mutex<Vec<Value>>,
    /// Upcoming list calls answered with HTTP 503
    list_outages: AtomicUsize,
    /// `statuscode` placed in every envelope (200 means success)
    envelope_status: AtomicI64,
    list_calls: AtomicUsize,
    mutations: Mutex<Vec<ReceivedMutation>>,
}

impl BackendState {
    fn table(&self, table: Table) -> &Mutex<Vec<Value>> {
        match table {
            Table::SubModules => &self.submodules,
            Table::ControlFamilies => &self.control_families,
        }
    }

    /// Envelope for a non-200 `envelope_status`. Reads carry no message so
    /// the client falls back to its generic text.
    fn rejected(&self, message: Option<&str>) -> Option<(StatusCode, Json<Value>)> {
        let status = self.envelope_status.load(Ordering::SeqCst);
        (status != 200).then(|| {
            let body = match message {
                Some(message) => json!({ "statuscode": status, "message": message }),
                None => json!({ "statuscode": status }),
            };
            (StatusCode::OK, Json(body))
        })
    }

    fn list(&self, table: Table) -> (StatusCode, Json<Value>) {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let outage = self
            .list_outages
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if outage {
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "message": "Service unavailable" })),
            );
        }
        if let Some(rejection) = self.rejected(None) {
            return rejection;
        }
        let rows = self.table(table).lock().clone();
        (StatusCode::OK, Json(json!({ "statuscode": 200, "data": rows })))
    }

    fn update(&self, table: Table, path: &'static str, body: Value) -> (StatusCode, Json<Value>) {
        self.record(path, body.clone());
        if let Some(rejection) = self.rejected(Some("Record is in use")) {
            return rejection;
        }
        let mut rows = self.table(table).lock();
        let Some(row) = rows.iter_mut().find(|row| row["ID"] == body["id"]) else {
            return (
                StatusCode::OK,
                Json(json!({ "statuscode": 404, "message": "Record not found" })),
            );
        };
        match table {
            Table::SubModules => {
                row["SUBMODULE_NAME"] = body["submodule_name"].clone();
                row["DISPLAY_SUBMODULE_NAME"] = body["display_submodule_name"].clone();
                row["SUBMODULE_DESC"] = body["submodule_desc"].clone();
            }
            Table::ControlFamilies => {
                row["CONTROL_FAMILY_NAME"] = body["control_family_name"].clone();
                row["CONTROL_FAMILY_DESC"] = body["control_family_desc"].clone();
            }
        }
        (
            StatusCode::OK,
            Json(json!({ "statuscode": 200, "data": {}, "message": "Updated" })),
        )
    }

    fn delete(&self, table: Table, path: &'static str, body: Value) -> (StatusCode, Json<Value>) {
        self.record(path, body.clone());
        if let Some(rejection) = self.rejected(Some("Record is in use")) {
            return rejection;
        }
        self.table(table).lock().retain(|row| row["ID"] != body["id"]);
        (
            StatusCode::OK,
            Json(json!({ "statuscode": 200, "data": {}, "message": "Deleted" })),
        )
    }

    fn record(&self, path: &'static str, body: Value) {
        self.mutations.lock().push(ReceivedMutation { path, body });
    }
}

type Shared = State<Arc<BackendState>>;

async fn list_submodules(State(state): Shared) -> (StatusCode, Json<Value>) {
    state.list(Table::SubModules)
}

async fn update_submodule(
    State(state): Shared,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.update(Table::SubModules, SUBMODULE_UPDATE, body)
}

async fn delete_submodule(
    State(state): Shared,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.delete(Table::SubModules, SUBMODULE_DELETE, body)
}

async fn list_control_families(State(state): Shared) -> (StatusCode, Json<Value>) {
    state.list(Table::ControlFamilies)
}

async fn update_control_family(
    State(state): Shared,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.update(Table::ControlFamilies, CONTROL_FAMILY_UPDATE, body)
}

async fn delete_control_family(
    State(state): Shared,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.delete(Table::ControlFamilies, CONTROL_FAMILY_DELETE, body)
}

/// Running backend; the server task is aborted on drop
pub struct MockBackend {
    addr: SocketAddr,
    state: Arc<BackendState>,
    server: JoinHandle<()>,
}

impl MockBackend {
    pub async fn start() -> Self {
        let state = Arc::new(BackendState {
            submodules: Mutex::new(Vec::new()),
            control_families: Mutex::new(Vec::new()),
            list_outages: AtomicUsize::new(0),
            envelope_status: AtomicI64::new(200),
            list_calls: AtomicUsize::new(0),
            mutations: Mutex::new(Vec::new()),
        });

        let router = Router::new()
            .route(SUBMODULE_LIST, get(list_submodules))
            .route(SUBMODULE_UPDATE, patch(update_submodule))
            .route(SUBMODULE_DELETE, patch(delete_submodule))
            .route(CONTROL_FAMILY_LIST, get(list_control_families))
            .route(CONTROL_FAMILY_UPDATE, patch(update_control_family))
            .route(CONTROL_FAMILY_DELETE, patch(delete_control_family))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock backend");
        let addr = listener.local_addr().expect("Mock backend has no address");
        let server = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                eprintln!("mock backend stopped: {}", e);
            }
        });

        Self {
            addr,
            state,
            server,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn with_submodules(self, rows: Vec<Value>) -> Self {
        *self.state.submodules.lock() = rows;
        self
    }

    pub fn with_control_families(self, rows: Vec<Value>) -> Self {
        *self.state.control_families.lock() = rows;
        self
    }

    /// Answer the next `count` list calls with HTTP 503
    pub fn fail_next_lists(&self, count: usize) {
        self.state.list_outages.store(count, Ordering::SeqCst);
    }

    /// Wrap every response in an envelope carrying `status`
    pub fn set_envelope_status(&self, status: i64) {
        self.state.envelope_status.store(status, Ordering::SeqCst);
    }

    pub fn list_calls(&self) -> usize {
        self.state.list_calls.load(Ordering::SeqCst)
    }

    pub fn mutations(&self) -> Vec<ReceivedMutation> {
        self.state.mutations.lock().clone()
    }

    pub fn submodules(&self) -> Vec<Value> {
        self.state.submodules.lock().clone()
    }

    pub fn control_families(&self) -> Vec<Value> {
        self.state.control_families.lock().clone()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}
