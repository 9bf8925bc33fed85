//! Conversation owned by one research request

use crate::llm::{LlmMessage, MessageRole};
use serde::{Deserialize, Serialize};

/// Append-only, ordered message history of one request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    messages: Vec<LlmMessage>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a conversation from the user's query
    pub fn from_query<S: Into<String>>(query: S) -> Self {
        Self {
            messages: vec![LlmMessage::user(query)],
        }
    }

    pub fn push(&mut self, message: LlmMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[LlmMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&LlmMessage> {
        self.messages.last()
    }

    /// Text of the most recent user message
    pub fn latest_query(&self) -> Option<String> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::User)
            .and_then(|m| m.get_text())
    }

    pub fn into_messages(self) -> Vec<LlmMessage> {
        self.messages
    }
}

impl From<Vec<LlmMessage>> for Conversation {
    fn from(messages: Vec<LlmMessage>) -> Self {
        Self { messages }
    }
}
