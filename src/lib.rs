pub mod api;
pub mod config;
pub mod data;
pub mod screen;
pub mod store;

pub use api::{Failure, FailureKind, HttpTransport, MutationGateway, Transport};
pub use config::Config;
pub use data::{CacheKey, Collection, Record, RecordId, RecordPatch, Resource, ResourceKind};
pub use screen::{RecordScreen, ScreenEvent, ScreenServices, ScreenState, ScreenView};
pub use store::{QueryState, RecordStore, RetryPolicy};
