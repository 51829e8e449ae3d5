use serde::{Deserialize, Serialize};

use crate::types::Message;

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Model tag to chat with.
    pub model: String,

    /// Full conversation so far.
    pub messages: Vec<Message>,

    /// Whether the daemon should stream fragments.
    pub stream: bool,
}

impl ChatRequest {
    /// Create a streaming chat request.
    pub fn streaming(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            stream: true,
        }
    }
}

/// Body of `POST /api/pull`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    /// Model tag to download.
    pub model: String,

    /// Whether the daemon should stream progress events.
    pub stream: bool,
}

impl PullRequest {
    /// Create a streaming pull request.
    pub fn streaming(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            stream: true,
        }
    }
}
