//! Keyed collection cache
//!
//! One entry per `CacheKey`, shared by every screen showing that collection.
//! Reads are single-flight: concurrent fetches of the same key await one
//! request. Cached values are never written directly; `invalidate` marks an
//! entry stale and refetches it for active subscribers, who observe the result
//! through a `watch` channel.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use tokio::sync::watch;

use super::retry::RetryPolicy;
use crate::api::{Failure, Transport};
use crate::data::{CacheKey, Collection, Resource};

/// Observable state of one cached collection
#[derive(Debug, Clone, PartialEq)]
pub enum QueryState {
    /// Never fetched
    Idle,
    /// First fetch in flight, nothing to show yet
    Loading,
    Ready(Arc<Collection>),
    Failed(Failure),
}

impl QueryState {
    pub fn collection(&self) -> Option<&Arc<Collection>> {
        match self {
            QueryState::Ready(collection) => Some(collection),
            _ => None,
        }
    }
}

type FetchResult = Result<Arc<Collection>, Failure>;
type SharedFetch = Shared<BoxFuture<'static, FetchResult>>;

struct Entry {
    path: String,
    state: watch::Sender<QueryState>,
    stale: bool,
    /// Bumped on every fetch start and invalidation; completions from an
    /// older generation are discarded.
    generation: u64,
    in_flight: Option<SharedFetch>,
}

impl Entry {
    fn new(path: &str) -> Self {
        let (state, _) = watch::channel(QueryState::Idle);
        Self {
            path: path.to_string(),
            state,
            stale: false,
            generation: 0,
            in_flight: None,
        }
    }

    fn publish(&self, state: QueryState) {
        self.state.send_replace(state);
    }
}

struct StoreInner {
    transport: Arc<dyn Transport>,
    retry: RetryPolicy,
    entries: Mutex<HashMap<CacheKey, Entry>>,
}

impl StoreInner {
    fn complete(&self, key: &CacheKey, generation: u64, result: &FetchResult) {
        let mut entries = self.entries.lock();
        let Some(entry) = entries.get_mut(key) else {
            return;
        };
        if entry.generation != generation {
            tracing::debug!(key = %key, generation, "Discarding superseded fetch result");
            return;
        }
        entry.in_flight = None;
        match result {
            Ok(collection) => {
                entry.stale = false;
                tracing::debug!(key = %key, records = collection.len(), "Collection loaded");
                entry.publish(QueryState::Ready(collection.clone()));
            }
            Err(failure) => {
                tracing::error!(
                    key = %key,
                    kind = failure.kind.as_str(),
                    error = %failure,
                    "Collection fetch failed"
                );
                entry.publish(QueryState::Failed(failure.clone()));
            }
        }
    }
}

#[derive(Clone)]
pub struct RecordStore {
    inner: Arc<StoreInner>,
}

impl RecordStore {
    pub fn new(transport: Arc<dyn Transport>, retry: RetryPolicy) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                transport,
                retry,
                entries: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Return the cached collection, or fetch it (joining any fetch already
    /// in flight for the same key).
    pub async fn fetch(&self, resource: &Resource) -> FetchResult {
        let fetch = {
            let mut entries = self.inner.entries.lock();
            let entry = entries
                .entry(resource.cache_key.clone())
                .or_insert_with(|| Entry::new(resource.list_path));
            if !entry.stale {
                if let QueryState::Ready(collection) = &*entry.state.borrow() {
                    return Ok(collection.clone());
                }
            }
            match entry.in_flight.clone() {
                Some(fetch) => fetch,
                None => self.start(&resource.cache_key, entry),
            }
        };
        fetch.await
    }

    /// Mark `key` stale. Active subscribers get a refetch, which this call
    /// awaits; with no subscribers the refetch waits for the next `fetch`.
    pub async fn invalidate(&self, key: &CacheKey) {
        if let Some(refetch) = self.mark_stale(key) {
            refetch.await;
        }
    }

    /// Synchronous half of `invalidate`: the entry is stale as soon as this
    /// returns. A refetch for active subscribers runs on its own task, so it
    /// completes even if the returned future is dropped.
    pub fn mark_stale(&self, key: &CacheKey) -> Option<BoxFuture<'static, ()>> {
        let refetch = {
            let mut entries = self.inner.entries.lock();
            let Some(entry) = entries.get_mut(key) else {
                tracing::debug!(key = %key, "Invalidate on unknown key");
                return None;
            };
            entry.stale = true;
            entry.generation += 1;
            entry.in_flight = None;
            if entry.state.receiver_count() == 0 {
                tracing::debug!(key = %key, "Invalidated without subscribers, refetch deferred");
                return None;
            }
            tracing::debug!(
                key = %key,
                subscribers = entry.state.receiver_count(),
                "Invalidated, refetching"
            );
            self.start(key, entry)
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(refetch.clone());
            }
            Err(_) => tracing::debug!(key = %key, "No runtime, refetch runs when awaited"),
        }
        // The outcome is published through the watch channel.
        Some(refetch.map(|_| ()).boxed())
    }

    /// Observe the state of a collection. The receiver keeps the key "active"
    /// for invalidation refetches until it is dropped.
    pub fn subscribe(&self, resource: &Resource) -> watch::Receiver<QueryState> {
        let mut entries = self.inner.entries.lock();
        entries
            .entry(resource.cache_key.clone())
            .or_insert_with(|| Entry::new(resource.list_path))
            .state
            .subscribe()
    }

    /// Current state of `key` without subscribing
    pub fn snapshot(&self, key: &CacheKey) -> QueryState {
        self.inner
            .entries
            .lock()
            .get(key)
            .map(|entry| entry.state.borrow().clone())
            .unwrap_or(QueryState::Idle)
    }

    pub fn is_stale(&self, key: &CacheKey) -> bool {
        self.inner
            .entries
            .lock()
            .get(key)
            .map(|entry| entry.stale)
            .unwrap_or(false)
    }

    fn start(&self, key: &CacheKey, entry: &mut Entry) -> SharedFetch {
        entry.generation += 1;
        let generation = entry.generation;
        if entry.state.borrow().collection().is_none() {
            entry.state.send_replace(QueryState::Loading);
        }

        let transport = self.inner.transport.clone();
        let retry = self.inner.retry;
        let path = entry.path.clone();
        let key = key.clone();
        let store: Weak<StoreInner> = Arc::downgrade(&self.inner);

        let fetch = async move {
            let result = retry
                .run(|| load_collection(transport.as_ref(), &path))
                .await
                .map(Arc::new);
            if let Some(store) = store.upgrade() {
                store.complete(&key, generation, &result);
            }
            result
        }
        .boxed()
        .shared();

        entry.in_flight = Some(fetch.clone());
        fetch
    }
}

async fn load_collection(transport: &dyn Transport, path: &str) -> Result<Collection, Failure> {
    let data = transport.get(path).await?.into_data()?;
    if data.is_null() {
        return Err(Failure::business(
            None,
            Some("Response contained no records".to_string()),
        ));
    }
    Collection::decode(data)
        .map_err(|e| Failure::business(None, Some(format!("Malformed records: {}", e))))
}
