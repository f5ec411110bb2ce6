use crate::data::{CacheKey, RecordId, RecordPatch};

use super::confirm::ConfirmPrompt;
use super::notify::{Notification, ToastId};

/// Side effects that should be executed outside the reducer.
///
/// Mutations and prompts carry the panel epoch they were issued under so the
/// completion can be matched against the state it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Notify(Notification),
    PromptDelete {
        epoch: u64,
        prompt: ConfirmPrompt,
    },
    Update {
        epoch: u64,
        toast: ToastId,
        patch: RecordPatch,
    },
    Delete {
        epoch: u64,
        toast: ToastId,
        id: RecordId,
    },
    /// Mark the collection stale; issued only after a mutation succeeded
    Invalidate(CacheKey),
}
