//! Per-call metadata store.
//!
//! # Data Flow
//! ```text
//! caller supplies metadata: None | {} | {..caller keys..}
//!     → store.rs::ensure_metadata (attach empty map if None, never copy)
//!     → MetadataHandle shared by pre_call, payload, every adapter
//!     → store.rs::set_raw_request (only the reserved key is written)
//! ```
//!
//! # Design Decisions
//! - The handle is a reference (`Arc`), so later hooks observe earlier writes
//! - Caller keys are opaque and never overwritten
//! - `raw_request` is the only key owned by this crate

pub mod store;

pub use store::{ensure_metadata, set_raw_request, LitellmParams, MetadataHandle, RAW_REQUEST_KEY};
