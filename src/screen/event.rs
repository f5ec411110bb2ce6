use crate::api::{Failure, MutationSuccess};
use crate::data::RecordId;
use crate::store::QueryState;

use super::confirm::Confirmation;
use super::form::Field;
use super::notify::ToastId;

/// Everything the screen reacts to: user input and completions of effects
#[derive(Debug, Clone, PartialEq)]
pub enum ScreenEvent {
    // ========== User input ==========
    /// A list item was clicked
    Select(RecordId),
    /// Close the detail panel
    Close,
    ToggleFullScreen,
    ToggleEdit,
    EditField {
        field: Field,
        value: String,
    },
    Submit,
    RequestDelete,

    // ========== Completions ==========
    /// The cached collection changed (fetch, refetch, failure)
    CollectionChanged(QueryState),
    DeleteAnswered {
        epoch: u64,
        confirmation: Confirmation,
    },
    UpdateFinished {
        epoch: u64,
        toast: ToastId,
        id: RecordId,
        result: Result<MutationSuccess, Failure>,
    },
    DeleteFinished {
        epoch: u64,
        toast: ToastId,
        id: RecordId,
        result: Result<MutationSuccess, Failure>,
    },
}
