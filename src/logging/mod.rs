//! Per-call logging context.
//!
//! # Data Flow
//! ```text
//! LoggingContext::new (identity, policy snapshot, caller metadata)
//!     → pre_call: additional args → raw_request.rs (curl-style string)
//!         → placeholder (message logging off) | redaction engine
//!         → metadata["raw_request"]
//!     → post_call: original response captured (scrubbed)
//!     → success / failure: end_time stamped → CallbackDispatcher
//! ```
//!
//! # Design Decisions
//! - `log_raw_request_response` and the policy are fixed at construction
//! - Hooks are pure functions of (context, input, policy) apart from metadata writes
//! - The context is owned by one call; no locking around it

pub mod context;
pub mod raw_request;
pub mod types;

pub use context::{LoggingContext, ModelCallDetails};
pub use raw_request::format_raw_request;
pub use types::{AdditionalArgs, CallType, Message};
