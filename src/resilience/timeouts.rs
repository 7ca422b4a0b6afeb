//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap adapter calls with a deadline
//! - Report a timeout as its own error, distinct from adapter errors
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - The wrapped future is dropped on timeout; nothing is retried

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

/// The wrapped operation did not finish in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("deadline of {limit:?} exceeded")]
pub struct DeadlineExceeded {
    pub limit: Duration,
}

/// Run `fut` to completion or until `limit` elapses.
pub async fn with_deadline<F: Future>(limit: Duration, fut: F) -> Result<F::Output, DeadlineExceeded> {
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| DeadlineExceeded { limit })
}
