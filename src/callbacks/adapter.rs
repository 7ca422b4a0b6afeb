//! The adapter contract implemented by every observability backend.

use async_trait::async_trait;
use thiserror::Error;

use super::payload::CallbackPayload;

/// Errors an adapter may hand back to the dispatcher.
#[derive(Debug, Error)]
pub enum CallbackError {
    /// The external backend rejected or failed the call.
    #[error("backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Anything else that went wrong inside the adapter.
    #[error("{0}")]
    Internal(String),
}

/// An external-backend integration.
///
/// Every hook defaults to a no-op so adapters implement only the events they record.
#[async_trait]
pub trait CallbackAdapter: Send + Sync {
    /// Stable name used in logs, metrics and dispatch reports.
    fn name(&self) -> &str;

    async fn log_pre_call(&self, _payload: &CallbackPayload) -> Result<(), CallbackError> {
        Ok(())
    }

    async fn log_success_event(&self, _payload: &CallbackPayload) -> Result<(), CallbackError> {
        Ok(())
    }

    async fn log_failure_event(&self, _payload: &CallbackPayload) -> Result<(), CallbackError> {
        Ok(())
    }
}
