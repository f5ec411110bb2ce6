//! Master/detail screen reducer
//!
//! `ScreenState::handle` is the only place state changes. It performs no
//! I/O: anything that needs the network, the prompt or the toast surface is
//! returned as an `Effect`, and its completion comes back as a
//! `ScreenEvent`.

use std::sync::Arc;

use crate::api::{Failure, MutationSuccess};
use crate::data::{Collection, Record, RecordId, Resource};
use crate::store::QueryState;

use super::confirm::{ConfirmPrompt, Confirmation, DeletePhase, PendingDelete};
use super::effect::Effect;
use super::event::ScreenEvent;
use super::form::{FormSchema, FormSession};
use super::layout::{Layout, LayoutEvent};
use super::notify::{Notification, NotifyPhase, ToastId};
use super::selection::Selection;

/// What the screen should render
#[derive(Debug, Clone, PartialEq)]
pub enum ScreenView<'a> {
    Loading,
    /// Full-panel error; the list is not rendered
    Error(&'a Failure),
    /// Full-panel empty state
    Empty,
    Records(RecordsView<'a>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordsView<'a> {
    pub records: &'a Collection,
    pub selected: Option<&'a Record>,
    pub layout: Layout,
    pub form: Option<&'a FormSession>,
    pub deleting: bool,
}

#[derive(Debug, Clone)]
pub struct ScreenState {
    resource: Resource,
    collection: QueryState,
    selection: Selection,
    layout: Layout,
    form: Option<FormSession>,
    pending_delete: Option<PendingDelete>,
    /// Toast of the update sent by the open form; a completion carrying any
    /// other toast belongs to a form that has since been closed.
    submission: Option<ToastId>,
    /// Identifies the current detail-panel session; bumped whenever the
    /// selection changes, the panel closes, or the screen is torn down.
    epoch: u64,
    next_toast: u64,
    active: bool,
}

impl ScreenState {
    pub fn new(resource: Resource) -> Self {
        Self {
            resource,
            collection: QueryState::Idle,
            selection: Selection::default(),
            layout: Layout::default(),
            form: None,
            pending_delete: None,
            submission: None,
            epoch: 0,
            next_toast: 0,
            active: true,
        }
    }

    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    pub fn collection(&self) -> &QueryState {
        &self.collection
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn selected(&self) -> Option<&Record> {
        let collection = self.collection.collection()?;
        self.selection.resolve(collection)
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn form(&self) -> Option<&FormSession> {
        self.form.as_ref()
    }

    pub fn pending_delete(&self) -> Option<&PendingDelete> {
        self.pending_delete.as_ref()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn view(&self) -> ScreenView<'_> {
        match &self.collection {
            QueryState::Idle | QueryState::Loading => ScreenView::Loading,
            QueryState::Failed(failure) => ScreenView::Error(failure),
            QueryState::Ready(collection) if collection.is_empty() => ScreenView::Empty,
            QueryState::Ready(collection) => ScreenView::Records(RecordsView {
                records: collection,
                selected: self.selection.resolve(collection),
                layout: self.layout,
                form: self.form.as_ref(),
                deleting: matches!(
                    self.pending_delete,
                    Some(PendingDelete {
                        phase: DeletePhase::Deleting,
                        ..
                    })
                ),
            }),
        }
    }

    /// The owning screen is gone. User input is ignored from now on and
    /// completions no longer touch selection, layout or form.
    pub fn deactivate(&mut self) {
        self.active = false;
        self.end_panel_session();
    }

    pub fn handle(&mut self, event: ScreenEvent) -> Vec<Effect> {
        match event {
            ScreenEvent::CollectionChanged(state) => {
                self.on_collection_changed(state);
                Vec::new()
            }
            ScreenEvent::UpdateFinished {
                epoch,
                toast,
                id,
                result,
            } => self.on_update_finished(epoch, toast, id, result),
            ScreenEvent::DeleteFinished {
                epoch,
                toast,
                id,
                result,
            } => self.on_delete_finished(epoch, toast, id, result),
            ScreenEvent::DeleteAnswered {
                epoch,
                confirmation,
            } => self.on_delete_answered(epoch, confirmation),
            _ if !self.active => {
                tracing::debug!(?event, "Ignoring input on inactive screen");
                Vec::new()
            }
            ScreenEvent::Select(id) => {
                self.on_select(id);
                Vec::new()
            }
            ScreenEvent::Close => {
                self.layout = self.layout.transition(LayoutEvent::Close);
                self.end_panel_session();
                Vec::new()
            }
            ScreenEvent::ToggleFullScreen => {
                self.layout = self.layout.transition(LayoutEvent::ToggleFullScreen);
                Vec::new()
            }
            ScreenEvent::ToggleEdit => {
                self.on_toggle_edit();
                Vec::new()
            }
            ScreenEvent::EditField { field, value } => {
                match self.form.as_mut() {
                    Some(form) => {
                        if !form.set_field(field, value) {
                            tracing::debug!(%field, "Field edit rejected");
                        }
                    }
                    None => tracing::debug!(%field, "Field edit outside edit mode"),
                }
                Vec::new()
            }
            ScreenEvent::Submit => self.on_submit(),
            ScreenEvent::RequestDelete => self.on_request_delete(),
        }
    }

    fn on_collection_changed(&mut self, state: QueryState) {
        self.collection = state;
        let Some(collection) = self.collection.collection() else {
            return;
        };
        if let Some(id) = self.selection.id() {
            if !collection.contains(id) {
                tracing::warn!(record_id = %id, "Selected record no longer exists, collapsing");
                self.selection.clear();
                self.layout = self.layout.transition(LayoutEvent::Close);
                self.end_panel_session();
            }
        }
    }

    fn on_select(&mut self, id: RecordId) {
        let Some(collection) = self.collection.collection().map(Arc::clone) else {
            tracing::warn!(record_id = %id, "Selection before collection loaded");
            return;
        };
        if !self.selection.select(id, &collection) {
            return;
        }
        tracing::debug!(record_id = %id, "Record selected");
        self.end_panel_session();
        self.layout = self.layout.transition(LayoutEvent::Select);
    }

    fn on_toggle_edit(&mut self) {
        if !self.layout.is_open() {
            return;
        }
        if self.layout.edit_mode {
            self.form = None;
            self.submission = None;
            self.layout = self.layout.transition(LayoutEvent::ToggleEdit);
            return;
        }
        let Some(record) = self.selected() else {
            tracing::warn!("Edit requested without a resolvable selection");
            return;
        };
        let form = FormSession::begin(record, FormSchema::for_resource(&self.resource));
        self.form = Some(form);
        self.layout = self.layout.transition(LayoutEvent::ToggleEdit);
    }

    fn on_submit(&mut self) -> Vec<Effect> {
        let Some(form) = self.form.as_mut() else {
            tracing::debug!("Submit outside edit mode");
            return Vec::new();
        };
        if form.is_submitting() {
            tracing::debug!("Submit while a submission is in flight");
            return Vec::new();
        }
        match form.begin_submit() {
            Ok(patch) => {
                let toast = self.next_toast();
                let loading = format!("Updating {}...", self.resource.noun);
                self.submission = Some(toast);
                vec![
                    notify(toast, NotifyPhase::Loading, loading),
                    Effect::Update {
                        epoch: self.epoch,
                        toast,
                        patch,
                    },
                ]
            }
            Err(errors) => {
                tracing::debug!(errors = %errors, "Submission blocked by validation");
                Vec::new()
            }
        }
    }

    fn on_update_finished(
        &mut self,
        epoch: u64,
        toast: ToastId,
        id: RecordId,
        result: Result<MutationSuccess, Failure>,
    ) -> Vec<Effect> {
        let current = self.active && epoch == self.epoch && self.submission == Some(toast);
        if current {
            self.submission = None;
        }
        match result {
            Ok(_) => {
                if current {
                    self.form = None;
                    self.layout = self.layout.transition(LayoutEvent::MutationSucceeded);
                } else {
                    tracing::warn!(record_id = %id, epoch, "Update finished for a closed panel");
                }
                vec![
                    notify(
                        toast,
                        NotifyPhase::Success,
                        format!("{} updated successfully!", self.resource.title),
                    ),
                    Effect::Invalidate(self.resource.cache_key.clone()),
                ]
            }
            Err(failure) => {
                if current {
                    if let Some(form) = self.form.as_mut().filter(|f| f.record_id() == id) {
                        form.submit_failed();
                    }
                }
                vec![notify(
                    toast,
                    NotifyPhase::Error,
                    format!("Failed to update {}: {}", self.resource.noun, failure),
                )]
            }
        }
    }

    fn on_request_delete(&mut self) -> Vec<Effect> {
        if self.pending_delete.is_some() {
            tracing::debug!("Delete already pending");
            return Vec::new();
        }
        if !self.layout.is_open() {
            return Vec::new();
        }
        let Some(record) = self.selected() else {
            tracing::warn!("Delete requested without a resolvable selection");
            return Vec::new();
        };
        let prompt = ConfirmPrompt::delete(&self.resource, record);
        let record_id = record.id;
        self.pending_delete = Some(PendingDelete {
            record_id,
            epoch: self.epoch,
            phase: DeletePhase::Prompting,
        });
        vec![Effect::PromptDelete {
            epoch: self.epoch,
            prompt,
        }]
    }

    fn on_delete_answered(&mut self, epoch: u64, confirmation: Confirmation) -> Vec<Effect> {
        let pending = match self.pending_delete {
            Some(pending)
                if self.active
                    && pending.epoch == epoch
                    && epoch == self.epoch
                    && pending.phase == DeletePhase::Prompting =>
            {
                pending
            }
            _ => {
                tracing::debug!(epoch, "Ignoring answer to a stale delete prompt");
                return Vec::new();
            }
        };

        if !confirmation.is_confirmed() {
            tracing::debug!(record_id = %pending.record_id, "Delete cancelled");
            self.pending_delete = None;
            return Vec::new();
        }

        let toast = self.next_toast();
        self.pending_delete = Some(PendingDelete {
            phase: DeletePhase::Deleting,
            ..pending
        });
        vec![
            notify(
                toast,
                NotifyPhase::Loading,
                format!("Deleting {}...", self.resource.noun),
            ),
            Effect::Delete {
                epoch,
                toast,
                id: pending.record_id,
            },
        ]
    }

    fn on_delete_finished(
        &mut self,
        epoch: u64,
        toast: ToastId,
        id: RecordId,
        result: Result<MutationSuccess, Failure>,
    ) -> Vec<Effect> {
        let current = self.active && epoch == self.epoch;
        match result {
            Ok(_) => {
                if current {
                    self.selection.clear();
                    self.layout = self.layout.transition(LayoutEvent::MutationSucceeded);
                    self.end_panel_session();
                } else {
                    tracing::warn!(record_id = %id, epoch, "Delete finished for a closed panel");
                }
                vec![
                    notify(
                        toast,
                        NotifyPhase::Success,
                        format!("{} deleted successfully!", self.resource.title),
                    ),
                    Effect::Invalidate(self.resource.cache_key.clone()),
                ]
            }
            Err(failure) => {
                if current {
                    self.pending_delete = None;
                }
                vec![notify(
                    toast,
                    NotifyPhase::Error,
                    format!("Failed to delete {}: {}", self.resource.noun, failure),
                )]
            }
        }
    }

    /// Drop everything tied to the current detail panel
    fn end_panel_session(&mut self) {
        self.form = None;
        self.submission = None;
        self.pending_delete = None;
        self.epoch += 1;
    }

    fn next_toast(&mut self) -> ToastId {
        self.next_toast += 1;
        ToastId(self.next_toast)
    }
}

fn notify(id: ToastId, phase: NotifyPhase, message: String) -> Effect {
    Effect::Notify(Notification { id, phase, message })
}
