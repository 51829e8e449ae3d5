use serde::{Deserialize, Serialize};

use crate::types::Message;

/// One line of a streamed `POST /api/chat` response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatChunk {
    /// Model that produced the chunk.
    #[serde(default)]
    pub model: String,

    /// Partial assistant message; absent on some terminal chunks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,

    /// True on the final chunk.
    #[serde(default)]
    pub done: bool,

    /// Why generation stopped, on the final chunk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub done_reason: Option<String>,

    /// Number of generated tokens, on the final chunk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eval_count: Option<u64>,
}

impl ChatChunk {
    /// Returns the text fragment carried by this chunk, if any.
    pub fn fragment(&self) -> Option<&str> {
        self.message
            .as_ref()
            .map(|m| m.content.as_str())
            .filter(|content| !content.is_empty())
    }
}
