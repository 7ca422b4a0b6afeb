//! Per-call logging context and redaction pipeline for outbound LLM API calls.

pub mod callbacks;
pub mod config;
pub mod integrations;
pub mod logging;
pub mod metadata;
pub mod observability;
pub mod redaction;
pub mod resilience;

pub use callbacks::{CallbackAdapter, CallbackDispatcher, CallbackEvent, DispatchReport};
pub use config::{LoggingConfig, RuntimeConfig};
pub use logging::LoggingContext;
pub use metadata::MetadataHandle;
pub use redaction::{redact, RedactionPolicy, Redactor};
