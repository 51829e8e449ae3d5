//! Conversation state: an append-only list of role-tagged messages.

use crate::types::{Message, MessageRole};

/// An ordered, append-only conversation.
///
/// Messages are never edited or removed. The whole conversation is resent to
/// the daemon on every turn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Creates a conversation, seeded with a system message when one is given.
    pub fn new(system_prompt: Option<&str>) -> Self {
        let mut conversation = Self::default();
        if let Some(prompt) = system_prompt {
            conversation.messages.push(Message::system(prompt));
        }
        conversation
    }

    /// Appends a user message.
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(Message::user(content));
    }

    /// Appends a complete assistant reply.
    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(Message::assistant(content));
    }

    /// All messages in the order they were appended.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of messages, including any system message.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// True when the conversation holds no messages at all.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The most recent message, if any.
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Counts messages with the given role.
    pub fn count_role(&self, role: MessageRole) -> usize {
        self.messages.iter().filter(|m| m.role == role).count()
    }
}
