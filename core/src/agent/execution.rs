//! Agent execution result structures

use super::conversation::Conversation;
use crate::llm::LlmMessage;
use crate::output::TokenUsage;
use serde::{Deserialize, Serialize};

/// Result of one research run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentExecution {
    /// Whether the run ended with a plain assistant answer
    pub success: bool,

    /// Final answer text, or the failure description
    pub final_result: String,

    /// Terminal assistant message, absent on failure
    pub final_message: Option<LlmMessage>,

    /// Conversation as extended by the run; partial on failure
    pub conversation: Conversation,

    pub model_invocations: usize,

    /// Number of completed tool-execution stages
    pub tool_turns: usize,

    /// Total execution time in milliseconds
    pub duration_ms: u64,

    pub token_usage: TokenUsage,

    /// Error text when the run failed
    pub error: Option<String>,
}

impl AgentExecution {
    /// Create a successful execution result
    pub fn success(final_message: LlmMessage, conversation: Conversation) -> Self {
        Self {
            success: true,
            final_result: final_message.get_text().unwrap_or_default(),
            final_message: Some(final_message),
            conversation,
            model_invocations: 0,
            tool_turns: 0,
            duration_ms: 0,
            token_usage: TokenUsage::default(),
            error: None,
        }
    }

    /// Create a failed execution result, keeping the partial conversation
    pub fn failure(error: String, conversation: Conversation) -> Self {
        Self {
            success: false,
            final_result: format!("Execution failed: {}", error),
            final_message: None,
            conversation,
            model_invocations: 0,
            tool_turns: 0,
            duration_ms: 0,
            token_usage: TokenUsage::default(),
            error: Some(error),
        }
    }

    pub fn with_counts(mut self, model_invocations: usize, tool_turns: usize) -> Self {
        self.model_invocations = model_invocations;
        self.tool_turns = tool_turns;
        self
    }

    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    pub fn with_token_usage(mut self, token_usage: TokenUsage) -> Self {
        self.token_usage = token_usage;
        self
    }
}
