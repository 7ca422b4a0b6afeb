//! Callback dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! LoggingContext hook (pre_call / success / failure)
//!     → payload.rs (CallbackPayload sharing the call's metadata handle)
//!     → dispatcher.rs
//!         → one tokio task per adapter, started in registration order
//!         → each bounded by the configured timeout
//!         → errors / timeouts / panics captured and redacted
//!     → DispatchReport (ordered per-adapter outcomes)
//! ```
//!
//! # Design Decisions
//! - Dispatch never returns an error; observability cannot fail the primary call
//! - The adapter list is swapped atomically (arc-swap); in-flight dispatches keep theirs
//! - The dispatcher is generic over `CallbackAdapter` and special-cases no backend

pub mod adapter;
pub mod dispatcher;
pub mod payload;

pub use adapter::{CallbackAdapter, CallbackError};
pub use dispatcher::{AdapterFailure, AdapterOutcome, CallbackDispatcher, DispatchReport};
pub use payload::{CallbackEvent, CallbackPayload};
