//! Master/detail record screen: selection, layout state machine, edit form,
//! delete confirmation, and the runtime that ties them to the store and the
//! mutation gateway.

mod confirm;
mod effect;
mod event;
mod form;
mod layout;
mod notify;
mod runtime;
mod selection;
mod state;

pub use confirm::{
    AutoConfirmer, ConfirmPrompt, Confirmation, Confirmer, DeletePhase, PendingDelete,
};
pub use effect::Effect;
pub use event::ScreenEvent;
pub use form::{Field, FieldErrors, FieldRule, FieldValues, FormSchema, FormSession};
pub use layout::{Layout, LayoutEvent, LayoutState};
pub use notify::{Notification, NotificationLog, Notifier, NotifyPhase, ToastId, TracingNotifier};
pub use runtime::{RecordScreen, ScreenServices};
pub use selection::Selection;
pub use state::{RecordsView, ScreenState, ScreenView};
