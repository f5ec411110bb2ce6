//! Failure taxonomy shared by reads and mutations.

use thiserror::Error;

/// Status code the backend embeds in a successful envelope
pub const STATUS_OK: i64 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Transport failure: connection, timeout, non-2xx HTTP status.
    NetworkError,
    /// The transport succeeded but the envelope reports a non-200 status.
    BusinessError,
}

impl FailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::NetworkError => "network",
            FailureKind::BusinessError => "business",
        }
    }
}

/// A failed read or mutation, carrying a message fit for display.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
    /// HTTP status for network errors, envelope status for business errors
    pub status: Option<i64>,
}

impl Failure {
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::NetworkError,
            message: message.into(),
            status: None,
        }
    }

    /// Build a business failure from an envelope status, preferring the
    /// backend's own message when it sent one.
    pub fn business(status: Option<i64>, message: Option<String>) -> Self {
        let message = message
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| generic_message(status));
        Self {
            kind: FailureKind::BusinessError,
            message,
            status,
        }
    }

    pub fn with_status(mut self, status: i64) -> Self {
        self.status = Some(status);
        self
    }

    /// Whether a read that failed this way may be retried
    pub fn is_transient(&self) -> bool {
        self.kind == FailureKind::NetworkError
    }
}

pub(crate) fn generic_message(status: Option<i64>) -> String {
    match status {
        Some(status) => format!("Request failed with status code {}", status),
        None => "Something went wrong".to_string(),
    }
}

impl From<reqwest::Error> for Failure {
    fn from(err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            "Request timed out".to_string()
        } else if err.is_connect() {
            "Could not connect to the server".to_string()
        } else {
            err.to_string()
        };
        let failure = Failure::network(message);
        match err.status() {
            Some(status) => failure.with_status(i64::from(status.as_u16())),
            None => failure,
        }
    }
}
