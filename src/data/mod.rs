//! Record data model and per-resource endpoint tables

mod models;
mod resource;

pub use models::{Collection, Record, RecordId, RecordPatch};
pub use resource::{CacheKey, Resource, ResourceKind};
