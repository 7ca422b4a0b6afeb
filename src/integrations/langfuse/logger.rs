//! Callback adapter that records each call as a Langfuse trace plus generation.
//!
//! # Responsibilities
//! - Build trace and generation bodies from a dispatched payload
//! - Attach the call's metadata (including `raw_request`) to the generation
//! - Contain every failure: redact it, log it once, never propagate it
//!
//! # Metadata keys
//! `trace_id`, `trace_name`, `session_id`, `trace_user_id`, `tags`,
//! `generation_name`, `generation_id` override the defaults. `mask_input` /
//! `mask_output` replace the respective content with the policy placeholder.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::Instrument;

use crate::callbacks::{CallbackAdapter, CallbackError, CallbackEvent, CallbackPayload};
use crate::config::LangfuseConfig;
use crate::integrations::langfuse::client::{HttpLangfuseBackend, LangfuseBackend};
use crate::integrations::langfuse::credentials::LangfuseCredentials;
use crate::integrations::langfuse::types::{
    GenerationParams, LangfuseError, LangfuseIds, LangfuseResult, ObservationLevel, TraceParams,
    Usage,
};
use crate::observability::tracing::adapter_span;
use crate::redaction::{Redactor, RAW_REQUEST_REDACTED_PLACEHOLDER};

pub const ADAPTER_NAME: &str = "langfuse";

/// Langfuse callback adapter.
pub struct LangfuseLogger {
    backend: Arc<dyn LangfuseBackend>,
    redactor: Arc<Redactor>,
    release: Option<String>,
}

/// Trace and generation bodies for one event.
#[derive(Debug, Clone, PartialEq)]
pub struct LangfuseRecord {
    pub trace: TraceParams,
    pub generation: GenerationParams,
}

impl LangfuseLogger {
    /// Build the adapter with the HTTP backend.
    ///
    /// Fails when credentials cannot be resolved; this is a registration-time error.
    pub fn from_config(config: &LangfuseConfig) -> LangfuseResult<Self> {
        let credentials = LangfuseCredentials::resolve(config)?;
        let backend = HttpLangfuseBackend::new(
            credentials,
            Duration::from_secs(config.request_timeout_secs),
        )?;
        Ok(Self::with_backend(Arc::new(backend)).with_release(config.release.clone()))
    }

    pub fn with_backend(backend: Arc<dyn LangfuseBackend>) -> Self {
        Self {
            backend,
            redactor: Arc::new(Redactor::global().clone()),
            release: None,
        }
    }

    /// Redactor applied to every error message before it is logged.
    pub fn with_redactor(mut self, redactor: Arc<Redactor>) -> Self {
        self.redactor = redactor;
        self
    }

    pub fn with_release(mut self, release: Option<String>) -> Self {
        self.release = release;
        self
    }

    /// Record one payload. Failures are logged here and yield `None`.
    pub async fn log_event(&self, payload: &CallbackPayload) -> Option<LangfuseIds> {
        let record = match self.build_record(payload) {
            Ok(record) => record,
            Err(e) => {
                tracing::error!(
                    severity = "exception",
                    adapter = ADAPTER_NAME,
                    call_id = %payload.call_id,
                    error = %self.redactor.redact(&e.to_string()),
                    "Langfuse logging failed while building content"
                );
                return None;
            }
        };

        let span = adapter_span(ADAPTER_NAME, &payload.call_id);
        match self.send(record).instrument(span).await {
            Ok(ids) => {
                tracing::debug!(
                    call_id = %payload.call_id,
                    trace_id = %ids.trace_id,
                    generation_id = %ids.generation_id,
                    "Langfuse generation recorded"
                );
                Some(ids)
            }
            Err(e) => {
                let severity = if e.is_backend() { "error" } else { "exception" };
                tracing::error!(
                    severity,
                    adapter = ADAPTER_NAME,
                    call_id = %payload.call_id,
                    error = %self.redactor.redact(&e.to_string()),
                    "Langfuse logging failed"
                );
                None
            }
        }
    }

    /// Build the trace and generation bodies without contacting the backend.
    pub fn build_record(&self, payload: &CallbackPayload) -> LangfuseResult<LangfuseRecord> {
        let metadata = payload
            .metadata()
            .map(|m| m.snapshot())
            .unwrap_or_default();

        let generation_name = string_key(&metadata, "generation_name")?
            .unwrap_or_else(|| format!("litellm-{}", payload.call_type));
        let generation_id = string_key(&metadata, "generation_id")?
            .unwrap_or_else(|| payload.call_id.clone());
        let trace_id = string_key(&metadata, "trace_id")?.unwrap_or_else(|| payload.call_id.clone());
        let trace_name = string_key(&metadata, "trace_name")?.unwrap_or_else(|| generation_name.clone());
        let session_id = string_key(&metadata, "session_id")?;
        let user_id = string_key(&metadata, "trace_user_id")?;
        let tags = tags_key(&metadata)?;

        let input = if bool_key(&metadata, "mask_input")? {
            Value::String(RAW_REQUEST_REDACTED_PLACEHOLDER.to_string())
        } else {
            build_input(payload)?
        };
        let output = if bool_key(&metadata, "mask_output")? {
            Value::String(RAW_REQUEST_REDACTED_PLACEHOLDER.to_string())
        } else {
            build_output(payload)
        };

        let (level, status_message) = match payload.event {
            CallbackEvent::Failure => (ObservationLevel::Error, payload.exception.clone()),
            _ => (ObservationLevel::Default, None),
        };

        let trace = TraceParams {
            id: trace_id,
            name: trace_name,
            timestamp: payload.start_time,
            user_id,
            session_id,
            tags,
            release: self.release.clone(),
            input: input.clone(),
            output: output.clone(),
        };
        let generation = GenerationParams {
            id: generation_id,
            name: generation_name,
            model: payload.model.clone(),
            start_time: payload.start_time,
            end_time: payload.end_time,
            input,
            output,
            metadata,
            level,
            status_message,
            usage: payload.response.as_ref().and_then(usage_from_response),
        };

        Ok(LangfuseRecord { trace, generation })
    }

    async fn send(&self, record: LangfuseRecord) -> LangfuseResult<LangfuseIds> {
        let trace = self.backend.trace(record.trace).await?;
        let generation = self.backend.generation(&trace, record.generation).await?;
        Ok(LangfuseIds {
            trace_id: trace.id,
            generation_id: generation.id,
        })
    }
}

#[async_trait]
impl CallbackAdapter for LangfuseLogger {
    fn name(&self) -> &str {
        ADAPTER_NAME
    }

    async fn log_success_event(&self, payload: &CallbackPayload) -> Result<(), CallbackError> {
        self.log_event(payload).await;
        Ok(())
    }

    async fn log_failure_event(&self, payload: &CallbackPayload) -> Result<(), CallbackError> {
        self.log_event(payload).await;
        Ok(())
    }
}

fn describe(value: &Value) -> String {
    value.to_string()
}

fn string_key(metadata: &Map<String, Value>, key: &'static str) -> LangfuseResult<Option<String>> {
    match metadata.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(LangfuseError::InvalidMetadata {
            key,
            expected: "a string",
            actual: describe(other),
        }),
    }
}

fn bool_key(metadata: &Map<String, Value>, key: &'static str) -> LangfuseResult<bool> {
    match metadata.get(key) {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(other) => Err(LangfuseError::InvalidMetadata {
            key,
            expected: "a boolean",
            actual: describe(other),
        }),
    }
}

fn tags_key(metadata: &Map<String, Value>) -> LangfuseResult<Vec<String>> {
    let invalid = |actual: &Value| LangfuseError::InvalidMetadata {
        key: "tags",
        expected: "a list of strings",
        actual: describe(actual),
    };
    match metadata.get("tags") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string).ok_or_else(|| invalid(item)))
            .collect(),
        Some(other) => Err(invalid(other)),
    }
}

fn build_input(payload: &CallbackPayload) -> LangfuseResult<Value> {
    let messages = serde_json::to_value(&payload.messages)?;
    if payload.call_type.is_embedding() {
        return Ok(json!({ "input": messages }));
    }
    Ok(messages)
}

/// The assistant message for chat responses, the whole response otherwise.
fn build_output(payload: &CallbackPayload) -> Value {
    let Some(response) = &payload.response else {
        return Value::Null;
    };
    response
        .pointer("/choices/0/message")
        .cloned()
        .unwrap_or_else(|| response.clone())
}

fn usage_from_response(response: &Value) -> Option<Usage> {
    let usage = response.get("usage")?;
    let input = usage.get("prompt_tokens").and_then(Value::as_u64).unwrap_or(0);
    let output = usage
        .get("completion_tokens")
        .and_then(Value::as_u64)
        .unwrap_or(0);
    let total = usage
        .get("total_tokens")
        .and_then(Value::as_u64)
        .unwrap_or(input + output);
    Some(Usage {
        input,
        output,
        total,
    })
}
