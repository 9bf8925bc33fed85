//! Base agent trait and structures

use super::config::AgentConfig;
use super::execution::AgentExecution;
use crate::error::Result;
use async_trait::async_trait;

/// Result type for agent operations
pub type AgentResult<T> = Result<T>;

/// Base trait for all agents
#[async_trait]
pub trait Agent: Send + Sync {
    /// Research a single query from scratch
    async fn execute_task(&self, task: &str) -> AgentResult<AgentExecution>;

    /// Get the agent's configuration
    fn config(&self) -> &AgentConfig;

    /// Get the agent's name/type
    fn agent_type(&self) -> &str;
}
