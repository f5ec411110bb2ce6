use crate::data::{Collection, Record, RecordId};

/// Weak reference to the selected record, re-resolved against the latest
/// collection whenever it is read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection(Option<RecordId>);

impl Selection {
    /// Select `id` if it resolves in `collection`; otherwise leave the
    /// selection unchanged and return false.
    pub fn select(&mut self, id: RecordId, collection: &Collection) -> bool {
        if !collection.contains(id) {
            tracing::warn!(record_id = %id, "Ignoring selection of unknown record");
            return false;
        }
        self.0 = Some(id);
        true
    }

    pub fn clear(&mut self) {
        self.0 = None;
    }

    pub fn id(&self) -> Option<RecordId> {
        self.0
    }

    pub fn is_some(&self) -> bool {
        self.0.is_some()
    }

    pub fn resolve<'a>(&self, collection: &'a Collection) -> Option<&'a Record> {
        self.0.and_then(|id| collection.get(id))
    }
}
