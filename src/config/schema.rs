//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the logging pipeline.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::redaction::SecretString;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct LoggingConfig {
    /// Content-logging policy applied to every call.
    pub policy: PolicyConfig,

    /// Extra secret patterns appended to the built-in families.
    pub redaction: RedactionConfig,

    /// Adapter registration and dispatch settings.
    pub callbacks: CallbacksConfig,

    /// Langfuse backend settings.
    pub langfuse: LangfuseConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Per-call content policy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct PolicyConfig {
    /// Replace message content and raw requests with a placeholder.
    pub turn_off_message_logging: bool,

    /// Capture the raw request into `metadata["raw_request"]`.
    pub log_raw_request_response: bool,
}

/// Custom redaction patterns.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RedactionConfig {
    pub extra_patterns: Vec<PatternConfig>,
}

/// A named regular expression. A `prefix` capture group is kept in the output.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PatternConfig {
    pub name: String,
    pub pattern: String,
}

/// Known adapter implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AdapterKind {
    Langfuse,
    Tracing,
}

/// Callback registration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CallbacksConfig {
    /// Adapters in invocation order.
    pub adapters: Vec<AdapterKind>,

    /// Per-adapter deadline in milliseconds.
    pub timeout_ms: u64,
}

impl Default for CallbacksConfig {
    fn default() -> Self {
        Self {
            adapters: vec![AdapterKind::Tracing],
            timeout_ms: 5_000,
        }
    }
}

/// Langfuse backend configuration.
///
/// Keys left unset here are read from `LANGFUSE_PUBLIC_KEY` / `LANGFUSE_SECRET_KEY`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LangfuseConfig {
    /// Base URL of the Langfuse instance.
    pub host: String,

    pub public_key: Option<SecretString>,

    pub secret_key: Option<SecretString>,

    /// Release tag attached to every trace.
    pub release: Option<String>,

    /// HTTP timeout for ingestion requests in seconds.
    pub request_timeout_secs: u64,
}

impl Default for LangfuseConfig {
    fn default() -> Self {
        Self {
            host: "https://cloud.langfuse.com".to_string(),
            public_key: None,
            secret_key: None,
            release: None,
            request_timeout_secs: 10,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
