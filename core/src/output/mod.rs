//! Output abstraction layer for the research agent
//!
//! The agent reports progress as [`AgentEvent`]s through an [`AgentOutput`]
//! implementation, so the CLI, tests and library users can each render or
//! collect them their own way.

use crate::tools::{ToolCall, ToolResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

pub type OutputResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Null output handler that discards all events
pub struct NullOutput;

#[async_trait]
impl AgentOutput for NullOutput {
    async fn emit_event(&self, _event: AgentEvent) -> OutputResult {
        Ok(())
    }
}

/// Output handler that keeps every event in memory
#[derive(Default)]
pub struct MemoryOutput {
    events: Mutex<Vec<AgentEvent>>,
}

impl MemoryOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events emitted so far
    pub fn events(&self) -> Vec<AgentEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl AgentOutput for MemoryOutput {
    async fn emit_event(&self, event: AgentEvent) -> OutputResult {
        self.events
            .lock()
            .map_err(|e| e.to_string())?
            .push(event);
        Ok(())
    }
}

/// Status of tool execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToolExecutionStatus {
    Executing,
    Success,
    Error,
}

/// Tool execution information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolExecutionInfo {
    /// Id of the tool call
    pub execution_id: String,
    /// Tool name (e.g., "web_search", "scrape_pages")
    pub tool_name: String,
    /// Tool arguments
    pub parameters: HashMap<String, serde_json::Value>,
    pub status: ToolExecutionStatus,
    /// Tool result (if completed)
    pub result: Option<ToolResult>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl ToolExecutionInfo {
    pub fn from_call(
        tool_call: &ToolCall,
        status: ToolExecutionStatus,
        result: Option<&ToolResult>,
    ) -> Self {
        let parameters = if let serde_json::Value::Object(map) = &tool_call.parameters {
            map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
        } else {
            let mut map = HashMap::new();
            map.insert("raw_parameters".to_string(), tool_call.parameters.clone());
            map
        };

        Self {
            execution_id: tool_call.id.clone(),
            tool_name: tool_call.name.clone(),
            parameters,
            status,
            result: result.cloned(),
            timestamp: chrono::Utc::now(),
        }
    }
}

/// Token usage statistics
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub total_tokens: u32,
}

/// Agent execution context information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentExecutionContext {
    /// Agent variant name
    pub agent_id: String,
    /// Query being researched
    pub task: String,
    /// Step limit, if any
    pub max_steps: Option<usize>,
    /// Model invocations so far
    pub current_step: usize,
    /// Total execution time so far
    pub execution_time: std::time::Duration,
    pub token_usage: TokenUsage,
}

/// Events that can be emitted during agent execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AgentEvent {
    /// Agent execution started
    ExecutionStarted { context: AgentExecutionContext },
    /// Agent execution completed
    ExecutionCompleted {
        context: AgentExecutionContext,
        success: bool,
        summary: String,
    },
    /// Model is about to be invoked
    StepStarted { step_number: usize },
    /// Tool execution started
    ToolExecutionStarted { tool_info: ToolExecutionInfo },
    /// Tool execution completed
    ToolExecutionCompleted { tool_info: ToolExecutionInfo },
    /// Reflection recorded through the reasoning tool
    AgentThinking { step_number: usize, thinking: String },
    /// Token usage updated (emitted after each LLM call)
    TokenUsageUpdated { token_usage: TokenUsage },
    /// General message or log
    Message { level: MessageLevel, content: String },
}

/// Message severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageLevel {
    Debug,
    Info,
    Normal,
    Warning,
    Error,
}

/// Abstract output interface for agent execution
#[async_trait]
pub trait AgentOutput: Send + Sync {
    /// Emit an agent event
    async fn emit_event(&self, event: AgentEvent) -> OutputResult;

    /// Emit a message with specified level
    async fn emit_message(&self, level: MessageLevel, content: &str) -> OutputResult {
        self.emit_event(AgentEvent::Message {
            level,
            content: content.to_string(),
        })
        .await
    }

    async fn debug(&self, content: &str) -> OutputResult {
        self.emit_message(MessageLevel::Debug, content).await
    }

    async fn info(&self, content: &str) -> OutputResult {
        self.emit_message(MessageLevel::Info, content).await
    }

    async fn warning(&self, content: &str) -> OutputResult {
        self.emit_message(MessageLevel::Warning, content).await
    }

    async fn error(&self, content: &str) -> OutputResult {
        self.emit_message(MessageLevel::Error, content).await
    }

    async fn normal(&self, content: &str) -> OutputResult {
        self.emit_message(MessageLevel::Normal, content).await
    }

    /// Emit token usage update
    async fn emit_token_update(&self, token_usage: TokenUsage) -> OutputResult {
        self.emit_event(AgentEvent::TokenUsageUpdated { token_usage })
            .await
    }

    /// Flush any buffered output
    async fn flush(&self) -> OutputResult {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_info_from_call() {
        let call = ToolCall::with_id("c1", "web_search", json!({"queries": ["rust"]}));
        let info = ToolExecutionInfo::from_call(&call, ToolExecutionStatus::Executing, None);
        assert_eq!(info.execution_id, "c1");
        assert_eq!(info.parameters["queries"], json!(["rust"]));

        let raw = ToolCall::with_id("c2", "done", serde_json::Value::Null);
        let info = ToolExecutionInfo::from_call(&raw, ToolExecutionStatus::Success, None);
        assert!(info.parameters.contains_key("raw_parameters"));
    }

    #[tokio::test]
    async fn test_memory_output_collects_messages() {
        let output = MemoryOutput::new();
        output.info("starting").await.unwrap();
        output.warning("careful").await.unwrap();

        let events = output.events();
        assert_eq!(events.len(), 2);
        assert!(matches!(
            &events[1],
            AgentEvent::Message { level: MessageLevel::Warning, content } if content == "careful"
        ));
    }
}
