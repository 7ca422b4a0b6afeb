//! Langfuse record types and errors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Result type for Langfuse operations.
pub type LangfuseResult<T> = Result<T, LangfuseError>;

/// Errors raised inside the Langfuse integration.
#[derive(Debug, Error)]
pub enum LangfuseError {
    /// A required key was found neither in config nor in the environment.
    #[error("Missing Langfuse credentials: {0} not set")]
    MissingCredentials(&'static str),

    #[error("Invalid Langfuse host '{host}': {source}")]
    InvalidHost {
        host: String,
        #[source]
        source: url::ParseError,
    },

    /// A metadata enrichment key had the wrong shape.
    #[error("Invalid metadata key '{key}': expected {expected}, got {actual}")]
    InvalidMetadata {
        key: &'static str,
        expected: &'static str,
        actual: String,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Transport failure talking to the ingestion API.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The ingestion API answered with a non-success status.
    #[error("Langfuse returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The ingestion API accepted the batch but rejected an event in it.
    #[error("Langfuse rejected event {event_id}: {message}")]
    Rejected { event_id: String, message: String },
}

impl LangfuseError {
    /// Failures talking to the backend, as opposed to failures inside this process.
    pub fn is_backend(&self) -> bool {
        matches!(
            self,
            LangfuseError::Http(_) | LangfuseError::Status { .. } | LangfuseError::Rejected { .. }
        )
    }
}

/// Langfuse observation level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObservationLevel {
    Debug,
    #[default]
    Default,
    Warning,
    Error,
}

/// Token usage reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
    pub input: u64,
    pub output: u64,
    pub total: u64,
}

/// Body of a trace-create call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceParams {
    pub id: String,
    pub name: String,
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release: Option<String>,
    pub input: Value,
    pub output: Value,
}

/// Body of a generation-create call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationParams {
    pub id: String,
    pub name: String,
    pub model: String,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub input: Value,
    pub output: Value,
    /// Copy of the call's metadata, `raw_request` included.
    pub metadata: Map<String, Value>,
    pub level: ObservationLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

/// A trace the backend has accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceHandle {
    pub id: String,
}

/// A generation the backend has accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationHandle {
    pub id: String,
    pub trace_id: String,
}

/// Ids of the records produced for one callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LangfuseIds {
    pub trace_id: String,
    pub generation_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn generation_serializes_camel_case() {
        let params = GenerationParams {
            id: "gen-1".into(),
            name: "litellm-completion".into(),
            model: "gpt-4".into(),
            start_time: None,
            end_time: None,
            input: json!([]),
            output: Value::Null,
            metadata: Map::new(),
            level: ObservationLevel::Error,
            status_message: Some("boom".into()),
            usage: None,
        };
        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(value["level"], "ERROR");
        assert_eq!(value["statusMessage"], "boom");
        assert!(value.get("usage").is_none());
        assert!(value.get("startTime").is_some());
    }

    #[test]
    fn backend_errors_are_classified() {
        let status = LangfuseError::Status {
            status: 500,
            body: String::new(),
        };
        assert!(status.is_backend());
        let shape = LangfuseError::InvalidMetadata {
            key: "tags",
            expected: "a list of strings",
            actual: "42".into(),
        };
        assert!(!shape.is_backend());
    }
}
