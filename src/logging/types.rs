//! Value types carried by a logging context.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Kind of outbound call being logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CallType {
    #[default]
    Completion,
    Acompletion,
    TextCompletion,
    Embedding,
    Aembedding,
    ImageGeneration,
    Transcription,
    Speech,
    Moderation,
    Rerank,
}

impl CallType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallType::Completion => "completion",
            CallType::Acompletion => "acompletion",
            CallType::TextCompletion => "text_completion",
            CallType::Embedding => "embedding",
            CallType::Aembedding => "aembedding",
            CallType::ImageGeneration => "image_generation",
            CallType::Transcription => "transcription",
            CallType::Speech => "speech",
            CallType::Moderation => "moderation",
            CallType::Rerank => "rerank",
        }
    }

    /// Embedding calls have vectors, not text, as output.
    pub fn is_embedding(&self) -> bool {
        matches!(self, CallType::Embedding | CallType::Aembedding)
    }
}

impl fmt::Display for CallType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One chat message. `content` is a string or a multimodal array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    #[serde(default)]
    pub content: Value,
}

impl Message {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: Value::String(content.into()),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }
}

/// Per-attempt request details handed to `pre_call`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdditionalArgs {
    pub api_base: Option<String>,

    /// Outbound HTTP headers.
    pub headers: Map<String, Value>,

    /// Request body as sent to the provider.
    pub complete_input_dict: Value,
}
