//! Executes the tool calls requested by one assistant message

use crate::error::ToolError;
use crate::llm::ToolDefinition;
use crate::tools::{ToolCall, ToolRegistry, ToolResult};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Instant;

/// Tool executor that runs calls against a shared registry
#[derive(Clone)]
pub struct ToolExecutor {
    registry: Arc<ToolRegistry>,
}

impl ToolExecutor {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// Get tool definitions for LLM function calling
    pub fn get_tool_definitions(&self) -> Vec<ToolDefinition> {
        self.registry.describe()
    }

    /// Execute a single call. Recoverable failures become error results.
    pub async fn execute(&self, call: &ToolCall) -> Result<ToolResult, ToolError> {
        let start_time = Instant::now();
        let outcome = self
            .registry
            .dispatch(&call.name, call.parameters.clone())
            .await;
        let duration = start_time.elapsed().as_millis() as u64;

        match outcome {
            Ok(output) => Ok(ToolResult::success(&call.id, output).with_duration(duration)),
            Err(e) if e.is_recoverable() => {
                tracing::warn!("Tool {} failed: {}", call.name, e);
                Ok(ToolResult::error(call.id.clone(), e.to_string()).with_duration(duration))
            }
            Err(e) => Err(e),
        }
    }

    /// Execute every call of one batch concurrently.
    ///
    /// All names are checked before anything runs, so an unknown tool fails
    /// the whole batch without side effects. Results come back in request order.
    pub async fn execute_batch(&self, calls: &[ToolCall]) -> Result<Vec<ToolResult>, ToolError> {
        if let Some(unknown) = calls.iter().find(|c| !self.registry.contains(&c.name)) {
            tracing::error!("Model requested unknown tool: {}", unknown.name);
            return Err(ToolError::NotFound {
                name: unknown.name.clone(),
            });
        }

        tracing::debug!("Executing {} tool calls", calls.len());
        join_all(calls.iter().map(|call| self.execute(call)))
            .await
            .into_iter()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentVariant;
    use crate::provider::testing::{hit, StaticProvider};
    use crate::provider::WebProvider;
    use crate::tools::builtin::WebLimits;
    use serde_json::json;

    fn executor(provider: StaticProvider) -> (ToolExecutor, Arc<StaticProvider>) {
        let provider = Arc::new(provider);
        let shared: Arc<dyn WebProvider> = provider.clone();
        let registry =
            ToolRegistry::for_variant(AgentVariant::Reasoning, shared, WebLimits::default())
                .unwrap();
        (ToolExecutor::new(Arc::new(registry)), provider)
    }

    #[tokio::test]
    async fn test_results_match_calls_in_order() {
        let (executor, _) = executor(
            StaticProvider::default()
                .with_hits("slow", vec![hit("Slow", "https://slow", "s")])
                .with_delay("slow", 30),
        );

        let calls = vec![
            ToolCall::with_id("c1", "web_search", json!({"queries": ["slow"]})),
            ToolCall::with_id("c2", "reasoning", json!({"reasoning": "next"})),
            ToolCall::with_id("c3", "done", json!({})),
        ];

        let results = executor.execute_batch(&calls).await.unwrap();
        let ids: Vec<_> = results.iter().map(|r| r.tool_call_id.as_str()).collect();
        assert_eq!(ids, vec!["c1", "c2", "c3"]);
        assert!(results.iter().all(|r| r.success && r.duration_ms.is_some()));
        assert_eq!(results[1].content, "next");
        assert_eq!(results[2].content, "Done");
    }

    #[tokio::test]
    async fn test_unknown_tool_fails_batch_before_execution() {
        let (executor, provider) =
            executor(StaticProvider::default().with_hits("q", vec![]));

        let calls = vec![
            ToolCall::with_id("c1", "web_search", json!({"queries": ["q"]})),
            ToolCall::with_id("c2", "bash", json!({"command": "ls"})),
        ];

        let err = executor.execute_batch(&calls).await.unwrap_err();
        assert_eq!(
            err,
            ToolError::NotFound {
                name: "bash".to_string()
            }
        );
        assert!(provider.seen().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_arguments_become_error_results() {
        let (executor, provider) = executor(StaticProvider::default());

        let calls = vec![
            ToolCall::with_id("c1", "web_search", json!({"queries": ["a", "b", "c", "d"]})),
            ToolCall::with_id("c2", "done", json!({})),
        ];

        let results = executor.execute_batch(&calls).await.unwrap();
        assert!(!results[0].success);
        assert!(results[0]
            .content
            .starts_with("Error: Invalid arguments for web_search"));
        assert!(results[1].success);
        assert!(provider.seen().is_empty());
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let (executor, _) = executor(StaticProvider::default());
        assert!(executor.execute_batch(&[]).await.unwrap().is_empty());
    }
}
