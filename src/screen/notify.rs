//! Toast-style notification channel: every mutation reports
//! loading, then success or error, under one toast id.

use std::fmt;

use parking_lot::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotifyPhase {
    Loading,
    Success,
    Error,
}

impl NotifyPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            NotifyPhase::Loading => "loading",
            NotifyPhase::Success => "success",
            NotifyPhase::Error => "error",
        }
    }
}

/// Groups the phases of one mutation's status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ToastId(pub u64);

impl fmt::Display for ToastId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "toast-{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: ToastId,
    pub phase: NotifyPhase,
    pub message: String,
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &Notification);
}

/// Writes notifications to the tracing log
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: &Notification) {
        match notification.phase {
            NotifyPhase::Error => tracing::warn!(
                toast = %notification.id,
                phase = notification.phase.as_str(),
                "{}",
                notification.message
            ),
            _ => tracing::info!(
                toast = %notification.id,
                phase = notification.phase.as_str(),
                "{}",
                notification.message
            ),
        }
    }
}

/// Keeps every notification in memory, in order
#[derive(Debug, Default)]
pub struct NotificationLog {
    entries: Mutex<Vec<Notification>>,
}

impl NotificationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<Notification> {
        self.entries.lock().clone()
    }

    /// Messages only, in order
    pub fn messages(&self) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .map(|n| n.message.clone())
            .collect()
    }

    /// Latest phase reported for `id`
    pub fn last_phase(&self, id: ToastId) -> Option<NotifyPhase> {
        self.entries
            .lock()
            .iter()
            .rev()
            .find(|n| n.id == id)
            .map(|n| n.phase)
    }
}

impl Notifier for NotificationLog {
    fn notify(&self, notification: &Notification) {
        self.entries.lock().push(notification.clone());
    }
}
