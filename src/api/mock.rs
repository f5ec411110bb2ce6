//! Mock transport for deterministic testing
//!
//! Implements `Transport` with scripted replies per path, recording every
//! call. Use it in unit and integration tests that need to drive the store,
//! the gateway or a whole screen without a backend.
//!
//! # Example
//! ```no_run
//! use admin_records::api::mock::MockTransport;
//! use admin_records::api::{Envelope, Failure};
//! use serde_json::json;
//!
//! let transport = MockTransport::new();
//! transport.on_get(
//!     "/submodule-master/get-all-submodules",
//!     Ok(Envelope::ok(json!([{"ID": 1, "SUBMODULE_NAME": "Risk"}]))),
//! );
//! transport.on_patch("/submodule-master/delete-submodule", Err(Failure::network("down")));
//! ```

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use super::envelope::Envelope;
use super::error::Failure;
use super::transport::Transport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockMethod {
    Get,
    Patch,
}

/// A request observed by the mock
#[derive(Debug, Clone, PartialEq)]
pub struct MockCall {
    pub method: MockMethod,
    pub path: String,
    pub body: Option<Value>,
}

type Reply = Result<Envelope, Failure>;

/// Scripted `Transport`.
///
/// Replies for a route are consumed in order; the last one repeats forever.
/// Unscripted routes fail with a 404 network error.
#[derive(Default)]
pub struct MockTransport {
    replies: Mutex<HashMap<(MockMethod, String), VecDeque<Reply>>>,
    calls: Mutex<Vec<MockCall>>,
    latency: Mutex<Duration>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for `GET path`
    pub fn on_get(&self, path: &str, reply: Reply) -> &Self {
        self.push(MockMethod::Get, path, reply)
    }

    /// Queue a reply for `PATCH path`
    pub fn on_patch(&self, path: &str, reply: Reply) -> &Self {
        self.push(MockMethod::Patch, path, reply)
    }

    /// Delay every reply (simulates a slow backend)
    pub fn with_latency(self, latency: Duration) -> Self {
        *self.latency.lock() = latency;
        self
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().clone()
    }

    pub fn count(&self, method: MockMethod, path: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| call.method == method && call.path == path)
            .count()
    }

    fn push(&self, method: MockMethod, path: &str, reply: Reply) -> &Self {
        self.replies
            .lock()
            .entry((method, path.to_string()))
            .or_default()
            .push_back(reply);
        self
    }

    async fn reply(&self, method: MockMethod, path: &str, body: Option<Value>) -> Reply {
        self.calls.lock().push(MockCall {
            method,
            path: path.to_string(),
            body,
        });

        let reply = {
            let mut replies = self.replies.lock();
            match replies.get_mut(&(method, path.to_string())) {
                Some(queue) if queue.len() > 1 => queue
                    .pop_front()
                    .unwrap_or_else(|| Err(Failure::network("mock queue drained"))),
                Some(queue) => queue
                    .front()
                    .cloned()
                    .unwrap_or_else(|| Err(Failure::network("mock queue drained"))),
                None => {
                    Err(Failure::network(format!("No mock reply for {}", path)).with_status(404))
                }
            }
        };

        // Replies are bound at call time so call order decides who gets what,
        // whatever order the callers resume in.
        let latency = *self.latency.lock();
        if latency.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(latency).await;
        }
        reply
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, path: &str) -> Result<Envelope, Failure> {
        self.reply(MockMethod::Get, path, None).await
    }

    async fn patch(&self, path: &str, body: Value) -> Result<Envelope, Failure> {
        self.reply(MockMethod::Patch, path, Some(body)).await
    }
}
