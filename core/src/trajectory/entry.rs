//! Trajectory entry structures

use crate::llm::{LlmMessage, Usage};
use crate::tools::{ToolCall, ToolResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single entry in the execution trajectory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrajectoryEntry {
    pub id: String,

    pub timestamp: DateTime<Utc>,

    pub entry_type: EntryType,

    /// Model invocation this entry belongs to
    pub step: usize,
}

/// Type of trajectory entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntryType {
    /// Research run started
    TaskStart {
        task: String,
        agent_config: serde_json::Value,
    },

    /// Messages sent to the model, system prompt included
    LlmRequest {
        messages: Vec<LlmMessage>,
        model: String,
        provider: String,
        tools: Vec<String>,
    },

    /// Assistant message received
    LlmResponse {
        message: LlmMessage,
        usage: Option<Usage>,
        finish_reason: Option<String>,
    },

    ToolCall {
        call: ToolCall,
    },

    ToolResult {
        result: ToolResult,
    },

    /// A tool turn finished
    StepComplete {
        tool_calls: usize,
        failed_calls: usize,
    },

    /// Research run finished
    TaskComplete {
        success: bool,
        final_result: String,
        model_invocations: usize,
        tool_turns: usize,
        duration_ms: u64,
    },

    Error {
        error: String,
        context: Option<String>,
    },
}

impl TrajectoryEntry {
    pub fn new(entry_type: EntryType, step: usize) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            entry_type,
            step,
        }
    }

    pub fn task_start(task: String, agent_config: serde_json::Value) -> Self {
        Self::new(EntryType::TaskStart { task, agent_config }, 0)
    }

    pub fn llm_request(
        messages: Vec<LlmMessage>,
        model: String,
        provider: String,
        tools: Vec<String>,
        step: usize,
    ) -> Self {
        Self::new(
            EntryType::LlmRequest {
                messages,
                model,
                provider,
                tools,
            },
            step,
        )
    }

    pub fn llm_response(
        message: LlmMessage,
        usage: Option<Usage>,
        finish_reason: Option<String>,
        step: usize,
    ) -> Self {
        Self::new(
            EntryType::LlmResponse {
                message,
                usage,
                finish_reason,
            },
            step,
        )
    }

    pub fn tool_call(call: ToolCall, step: usize) -> Self {
        Self::new(EntryType::ToolCall { call }, step)
    }

    pub fn tool_result(result: ToolResult, step: usize) -> Self {
        Self::new(EntryType::ToolResult { result }, step)
    }

    pub fn step_complete(tool_calls: usize, failed_calls: usize, step: usize) -> Self {
        Self::new(
            EntryType::StepComplete {
                tool_calls,
                failed_calls,
            },
            step,
        )
    }

    pub fn task_complete(
        success: bool,
        final_result: String,
        model_invocations: usize,
        tool_turns: usize,
        duration_ms: u64,
    ) -> Self {
        Self::new(
            EntryType::TaskComplete {
                success,
                final_result,
                model_invocations,
                tool_turns,
                duration_ms,
            },
            model_invocations,
        )
    }

    pub fn error(error: String, context: Option<String>, step: usize) -> Self {
        Self::new(EntryType::Error { error, context }, step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entry_type_is_tagged() {
        let entry = TrajectoryEntry::step_complete(2, 1, 3);
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["entry_type"]["type"], "step_complete");
        assert_eq!(value["entry_type"]["failed_calls"], 1);
        assert_eq!(value["step"], 3);
    }

    #[test]
    fn test_task_start_is_step_zero() {
        let entry = TrajectoryEntry::task_start("query".to_string(), json!({"variant": "simple"}));
        assert_eq!(entry.step, 0);
        assert!(matches!(entry.entry_type, EntryType::TaskStart { .. }));
    }
}
