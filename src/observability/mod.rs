//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (adapter outcome counters, latency histograms)
//!     → tracing.rs (spans carrying call id, model and event)
//!
//! Consumers:
//!     → Log aggregation (stderr, pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured fields, never secrets: error text is redacted before it is logged
//! - Call ID flows through every span of a dispatch
//! - Metrics are cheap and recorded through the `metrics` facade

pub mod logging;
pub mod metrics;
pub mod tracing;
