//! Callback adapter that writes each event to the `tracing` pipeline.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::callbacks::{CallbackAdapter, CallbackError, CallbackPayload};
use crate::redaction::Redactor;

pub const ADAPTER_NAME: &str = "tracing";

/// Emits one structured event per callback with redacted metadata.
pub struct TracingLogger {
    redactor: Arc<Redactor>,
}

impl TracingLogger {
    pub fn new(redactor: Arc<Redactor>) -> Self {
        Self { redactor }
    }

    fn metadata(&self, payload: &CallbackPayload) -> String {
        payload
            .metadata()
            .map(|m| self.redactor.redact_value(&Value::Object(m.snapshot())))
            .unwrap_or(Value::Null)
            .to_string()
    }
}

impl Default for TracingLogger {
    fn default() -> Self {
        Self::new(Arc::new(Redactor::global().clone()))
    }
}

#[async_trait]
impl CallbackAdapter for TracingLogger {
    fn name(&self) -> &str {
        ADAPTER_NAME
    }

    async fn log_pre_call(&self, payload: &CallbackPayload) -> Result<(), CallbackError> {
        tracing::info!(
            call_id = %payload.call_id,
            model = %payload.model,
            call_type = %payload.call_type,
            stream = payload.stream,
            metadata = %self.metadata(payload),
            "Outbound call starting"
        );
        Ok(())
    }

    async fn log_success_event(&self, payload: &CallbackPayload) -> Result<(), CallbackError> {
        tracing::info!(
            call_id = %payload.call_id,
            model = %payload.model,
            call_type = %payload.call_type,
            latency_ms = ?payload.latency_ms(),
            metadata = %self.metadata(payload),
            "Outbound call succeeded"
        );
        Ok(())
    }

    async fn log_failure_event(&self, payload: &CallbackPayload) -> Result<(), CallbackError> {
        let exception = payload
            .exception
            .as_deref()
            .map(|e| self.redactor.redact(e))
            .unwrap_or_default();
        tracing::warn!(
            call_id = %payload.call_id,
            model = %payload.model,
            call_type = %payload.call_type,
            latency_ms = ?payload.latency_ms(),
            exception = %exception,
            metadata = %self.metadata(payload),
            "Outbound call failed"
        );
        Ok(())
    }
}
