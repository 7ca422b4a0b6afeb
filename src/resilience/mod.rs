//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Adapter invocation:
//!     → timeouts.rs (enforce per-adapter deadline)
//!     → on timeout: caller records the failure and moves on
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - No retries or backoff: adapters are fire-and-forget per call

pub mod timeouts;
