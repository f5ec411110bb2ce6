//! Delete confirmation: prompt model, the confirm/cancel collaborator, and
//! the pending-delete state the reducer keeps between prompt and answer.

use async_trait::async_trait;

use crate::data::{Record, RecordId, Resource};

/// What the user is asked to confirm
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmPrompt {
    pub title: String,
    pub message: String,
    pub record_id: RecordId,
    pub confirm_text: String,
    pub cancel_text: String,
}

impl ConfirmPrompt {
    pub fn delete(resource: &Resource, record: &Record) -> Self {
        Self {
            title: format!("Delete \"{}\"", record.display_name),
            message: format!("Are you sure you want to delete this {}?", resource.noun),
            record_id: record.id,
            confirm_text: "Delete".to_string(),
            cancel_text: "Cancel".to_string(),
        }
    }
}

/// The user's answer. Dismissing the prompt counts as `Cancelled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Cancelled,
}

impl Confirmation {
    pub fn from_bool(confirmed: bool) -> Self {
        if confirmed {
            Confirmation::Confirmed
        } else {
            Confirmation::Cancelled
        }
    }

    pub fn is_confirmed(self) -> bool {
        self == Confirmation::Confirmed
    }
}

/// Blocking confirm/cancel prompt supplied by the front end
#[async_trait]
pub trait Confirmer: Send + Sync {
    async fn confirm(&self, prompt: &ConfirmPrompt) -> Confirmation;
}

/// Answers every prompt the same way (`--yes`, tests)
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirmer(pub Confirmation);

#[async_trait]
impl Confirmer for AutoConfirmer {
    async fn confirm(&self, prompt: &ConfirmPrompt) -> Confirmation {
        tracing::debug!(record_id = %prompt.record_id, answer = ?self.0, "Auto-answering prompt");
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletePhase {
    /// Waiting for the user's answer
    Prompting,
    /// Confirmed; delete call in flight
    Deleting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingDelete {
    pub record_id: RecordId,
    pub epoch: u64,
    pub phase: DeletePhase,
}
