//! Data handed to adapters for one lifecycle event.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::logging::{CallType, Message};
use crate::metadata::{LitellmParams, MetadataHandle};

/// Lifecycle point at which adapters are invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallbackEvent {
    PreCall,
    Success,
    Failure,
}

impl CallbackEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallbackEvent::PreCall => "pre_call",
            CallbackEvent::Success => "success",
            CallbackEvent::Failure => "failure",
        }
    }
}

impl fmt::Display for CallbackEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Full call payload for one event.
#[derive(Debug, Clone, Serialize)]
pub struct CallbackPayload {
    pub event: CallbackEvent,
    pub model: String,
    pub messages: Vec<Message>,
    pub stream: bool,
    pub call_type: CallType,
    pub call_id: String,
    pub function_id: String,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub litellm_params: LitellmParams,
    /// Provider response (success events), already scrubbed.
    pub response: Option<Value>,
    /// Redacted error text (failure events).
    pub exception: Option<String>,
}

impl CallbackPayload {
    /// Metadata handle shared with the originating logging context.
    pub fn metadata(&self) -> Option<MetadataHandle> {
        self.litellm_params.metadata.clone()
    }

    /// Wall-clock duration of the call, when both ends are known.
    pub fn latency_ms(&self) -> Option<i64> {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => Some((end - start).num_milliseconds()),
            _ => None,
        }
    }
}
