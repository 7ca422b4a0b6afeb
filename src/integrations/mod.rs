//! External-backend adapters.
//!
//! # Data Flow
//! ```text
//! [callbacks] adapters = [...]
//!     → build_adapters (one adapter per entry, in order)
//!     → CallbackDispatcher::replace_all
//! ```
//!
//! # Design Decisions
//! - Construction failures (missing credentials) are fatal at registration time
//! - Adapters share the redactor compiled from config

pub mod langfuse;
pub mod tracing_logger;

use std::sync::Arc;

use crate::callbacks::CallbackAdapter;
use crate::config::{AdapterKind, LoggingConfig};
use crate::redaction::Redactor;

pub use langfuse::{LangfuseError, LangfuseLogger};
pub use tracing_logger::TracingLogger;

/// Instantiate the configured adapters in registration order.
pub fn build_adapters(
    config: &LoggingConfig,
    redactor: Arc<Redactor>,
) -> Result<Vec<Arc<dyn CallbackAdapter>>, LangfuseError> {
    config
        .callbacks
        .adapters
        .iter()
        .map(|kind| -> Result<Arc<dyn CallbackAdapter>, LangfuseError> {
            let adapter: Arc<dyn CallbackAdapter> = match kind {
                AdapterKind::Langfuse => Arc::new(
                    LangfuseLogger::from_config(&config.langfuse)?
                        .with_redactor(Arc::clone(&redactor)),
                ),
                AdapterKind::Tracing => Arc::new(TracingLogger::new(Arc::clone(&redactor))),
            };
            tracing::info!(adapter = adapter.name(), "Callback adapter registered");
            Ok(adapter)
        })
        .collect()
}
