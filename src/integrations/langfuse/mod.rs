//! Langfuse integration.
//!
//! # Data Flow
//! ```text
//! LANGFUSE_* env vars / [langfuse] table
//!     → credentials.rs (resolve keys and host)
//!     → client.rs (HttpLangfuseBackend, ingestion API with timeouts)
//!     → logger.rs (payload → trace + generation, failures contained)
//! ```
//!
//! # Security Constraints
//! - Keys ONLY from config or environment, never logged
//! - Every error message is redacted before it reaches a log sink
//! - A failed record is dropped, not retried

pub mod client;
pub mod credentials;
pub mod logger;
pub mod types;

pub use client::{HttpLangfuseBackend, LangfuseBackend};
pub use credentials::LangfuseCredentials;
pub use logger::{LangfuseLogger, LangfuseRecord};
pub use types::{
    GenerationHandle, GenerationParams, LangfuseError, LangfuseIds, LangfuseResult,
    ObservationLevel, TraceHandle, TraceParams, Usage,
};
