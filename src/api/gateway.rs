//! Create/update/delete calls. Mutations are never retried and never touch
//! the record cache; callers invalidate explicitly after success.

use std::sync::Arc;

use super::error::Failure;
use super::transport::Transport;
use crate::data::{RecordId, RecordPatch, Resource};

/// Successful mutation response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationSuccess {
    pub message: Option<String>,
}

#[derive(Clone)]
pub struct MutationGateway {
    transport: Arc<dyn Transport>,
    customer_id: i64,
}

impl MutationGateway {
    pub fn new(transport: Arc<dyn Transport>, customer_id: i64) -> Self {
        Self {
            transport,
            customer_id,
        }
    }

    pub async fn update(
        &self,
        resource: &Resource,
        patch: &RecordPatch,
    ) -> Result<MutationSuccess, Failure> {
        let body = resource.update_body(patch, self.customer_id);
        tracing::debug!(resource = resource.noun, record_id = %patch.id, "Updating record");
        self.send(resource.update_path, body).await
    }

    pub async fn delete(
        &self,
        resource: &Resource,
        id: RecordId,
    ) -> Result<MutationSuccess, Failure> {
        let body = resource.delete_body(id, self.customer_id);
        tracing::debug!(resource = resource.noun, record_id = %id, "Deleting record");
        self.send(resource.delete_path, body).await
    }

    async fn send(&self, path: &str, body: serde_json::Value) -> Result<MutationSuccess, Failure> {
        let envelope = match self.transport.patch(path, body).await {
            Ok(envelope) => envelope,
            Err(failure) => {
                tracing::error!(path, error = %failure, "Mutation transport failed");
                return Err(failure);
            }
        };
        let message = envelope.message.clone();
        match envelope.into_data() {
            Ok(_) => Ok(MutationSuccess { message }),
            Err(failure) => {
                tracing::error!(
                    path,
                    status = ?failure.status,
                    error = %failure,
                    "Mutation rejected"
                );
                Err(failure)
            }
        }
    }
}
