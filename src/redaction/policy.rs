//! Process-wide redaction policy.

use std::sync::Arc;

use super::engine::Redactor;

/// Written to `raw_request` (and message content) when message logging is disabled.
pub const RAW_REQUEST_REDACTED_PLACEHOLDER: &str =
    "redacted-by-policy: message logging is turned off";

/// Snapshot of the redaction policy captured by a logging context at construction.
#[derive(Debug, Clone)]
pub struct RedactionPolicy {
    /// Suppress message content entirely (not just secrets).
    pub turn_off_message_logging: bool,
    redactor: Arc<Redactor>,
}

impl RedactionPolicy {
    pub fn new(turn_off_message_logging: bool, redactor: Arc<Redactor>) -> Self {
        Self {
            turn_off_message_logging,
            redactor,
        }
    }

    /// Policy with message logging suppressed and the default patterns.
    pub fn suppress_messages() -> Self {
        Self {
            turn_off_message_logging: true,
            ..Self::default()
        }
    }

    pub fn redactor(&self) -> &Redactor {
        &self.redactor
    }

    /// Text as it may leave the process: placeholder when suppressed, scrubbed otherwise.
    pub fn scrub_content(&self, text: &str) -> String {
        if self.turn_off_message_logging {
            RAW_REQUEST_REDACTED_PLACEHOLDER.to_string()
        } else {
            self.redactor.redact(text)
        }
    }
}

impl Default for RedactionPolicy {
    fn default() -> Self {
        Self {
            turn_off_message_logging: false,
            redactor: Arc::new(Redactor::global().clone()),
        }
    }
}
