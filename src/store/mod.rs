//! Keyed, single-flight collection cache with read retries

mod record_store;
mod retry;

pub use record_store::{QueryState, RecordStore};
pub use retry::RetryPolicy;
