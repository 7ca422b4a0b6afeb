//! Secret redaction subsystem.
//!
//! # Data Flow
//! ```text
//! free text (raw request, exception message, stack trace)
//!     → engine.rs (ordered pattern families, replace every match)
//!     → "[REDACTED_API_KEY]" markers
//!
//! structured metadata (serde_json::Value)
//!     → engine.rs::redact_value (sensitive keys wiped, string leaves scrubbed)
//! ```
//!
//! # Design Decisions
//! - The engine is immutable after construction and shared through `Arc`/`OnceLock`
//! - Built-in families run first, configured extras run after them
//! - Redaction never fails; no match means the input comes back unchanged
//! - Policy (`turn_off_message_logging`) is a separate value captured per call

pub mod engine;
pub mod patterns;
pub mod policy;
pub mod secret;

pub use engine::{mask_secret, redact, redact_value, Redactor, RedactorBuilder};
pub use patterns::{RedactionError, SecretPattern, PATTERN_SET_VERSION, REDACTED_MARKER};
pub use policy::{RedactionPolicy, RAW_REQUEST_REDACTED_PLACEHOLDER};
pub use secret::SecretString;
