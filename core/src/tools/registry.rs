//! Tool registry for managing available tools

use crate::agent::AgentVariant;
use crate::error::ToolError;
use crate::llm::{FunctionDefinition, ToolDefinition};
use crate::provider::WebProvider;
use crate::tools::builtin::{
    DoneTool, ReasoningTool, ScrapePagesTool, WebLimits, WebSearchTool,
};
use crate::tools::{DynTool, Tool, ToolOutput};
use indexmap::IndexMap;
use serde_json::Value;
use std::sync::Arc;

/// Insertion-ordered, name-indexed set of tools.
///
/// Built once at startup and shared immutably afterwards.
#[derive(Default)]
pub struct ToolRegistry {
    tools: IndexMap<String, Arc<dyn DynTool>>,
}

impl ToolRegistry {
    /// Create an empty tool registry
    pub fn new() -> Self {
        Self {
            tools: IndexMap::new(),
        }
    }

    /// Build the tool set advertised by the given agent variant
    pub fn for_variant(
        variant: AgentVariant,
        provider: Arc<dyn WebProvider>,
        limits: WebLimits,
    ) -> Result<Self, ToolError> {
        let search =
            WebSearchTool::new(provider.clone()).with_max_results(limits.max_results);
        let scrape = ScrapePagesTool::new(provider).with_max_page_chars(limits.max_page_chars);

        let mut registry = Self::new();
        match variant {
            AgentVariant::Simple => {
                registry.register(search)?;
                registry.register(scrape)?;
            }
            AgentVariant::Reasoning => {
                registry.register(ReasoningTool::new())?;
                registry.register(search)?;
                registry.register(scrape)?;
                registry.register(DoneTool::new())?;
            }
        }
        Ok(registry)
    }

    /// Register a tool; names must be unique
    pub fn register<T>(&mut self, tool: T) -> Result<(), ToolError>
    where
        T: Tool + 'static,
    {
        self.register_arc(Arc::new(tool))
    }

    fn register_arc(&mut self, tool: Arc<dyn DynTool>) -> Result<(), ToolError> {
        let name = tool.name().to_string();
        if self.tools.contains_key(&name) {
            return Err(ToolError::DuplicateToolName { name });
        }
        tracing::debug!("Registered tool: {}", name);
        self.tools.insert(name, tool);
        Ok(())
    }

    /// Tool definitions for LLM function calling, in registration order
    pub fn describe(&self) -> Vec<ToolDefinition> {
        self.tools
            .values()
            .map(|tool| ToolDefinition {
                tool_type: "function".to_string(),
                function: FunctionDefinition {
                    name: tool.name().to_string(),
                    description: tool.description().to_string(),
                    parameters: tool.parameters_schema(),
                },
            })
            .collect()
    }

    /// Validate the raw arguments and run the named tool
    pub async fn dispatch(&self, name: &str, raw: Value) -> Result<ToolOutput, ToolError> {
        let tool = self.get(name).ok_or_else(|| ToolError::NotFound {
            name: name.to_string(),
        })?;
        tool.call(raw).await
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn DynTool>> {
        self.tools.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// List all available tool names, in registration order
    pub fn list_tools(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::tools::base::parse_arguments;
    use crate::provider::testing::StaticProvider;
    use async_trait::async_trait;
    use serde::Deserialize;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts executions so tests can prove a call never reached `execute`
    struct CountingTool {
        name: &'static str,
        calls: Arc<AtomicUsize>,
    }

    #[derive(Deserialize)]
    #[serde(deny_unknown_fields)]
    struct CountingInput {
        value: String,
    }

    #[async_trait]
    impl Tool for CountingTool {
        type Input = CountingInput;

        fn name(&self) -> &str {
            self.name
        }

        fn description(&self) -> &str {
            "Counts its executions"
        }

        fn parameters_schema(&self) -> Value {
            json!({
                "type": "object",
                "properties": { "value": { "type": "string" } },
                "required": ["value"]
            })
        }

        fn validate(&self, raw: Value) -> std::result::Result<CountingInput, String> {
            parse_arguments(raw)
        }

        async fn execute(&self, input: CountingInput) -> Result<ToolOutput> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if input.value == "fail" {
                return Err("tool blew up".into());
            }
            Ok(ToolOutput::text(input.value))
        }
    }

    fn counting(name: &'static str) -> (CountingTool, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            CountingTool {
                name,
                calls: calls.clone(),
            },
            calls,
        )
    }

    #[test]
    fn test_duplicate_name_is_rejected() {
        let mut registry = ToolRegistry::new();
        registry.register(counting("echo").0).unwrap();

        let err = registry.register(counting("echo").0).unwrap_err();
        assert_eq!(
            err,
            ToolError::DuplicateToolName {
                name: "echo".to_string()
            }
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_describe_is_stable_and_ordered() {
        let mut registry = ToolRegistry::new();
        for name in ["zeta", "alpha", "mid"] {
            registry.register(counting(name).0).unwrap();
        }

        let first = registry.describe();
        let second = registry.describe();
        assert_eq!(first, second);

        let names: Vec<_> = first.iter().map(|d| d.function.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
        assert!(first.iter().all(|d| d.tool_type == "function"));
    }

    #[tokio::test]
    async fn test_dispatch_unknown_never_executes() {
        let (tool, calls) = counting("echo");
        let mut registry = ToolRegistry::new();
        registry.register(tool).unwrap();

        let err = registry
            .dispatch("bash", json!({"value": "x"}))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ToolError::NotFound {
                name: "bash".to_string()
            }
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_dispatch_invalid_arguments_never_executes() {
        let (tool, calls) = counting("echo");
        let mut registry = ToolRegistry::new();
        registry.register(tool).unwrap();

        for raw in [json!({}), json!({"value": 3}), json!({"value": "x", "other": 1})] {
            let err = registry.dispatch("echo", raw).await.unwrap_err();
            assert!(matches!(err, ToolError::InvalidArguments { ref name, .. } if name == "echo"));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_dispatch_wraps_execution_failure() {
        let (tool, calls) = counting("echo");
        let mut registry = ToolRegistry::new();
        registry.register(tool).unwrap();

        let ok = registry
            .dispatch("echo", json!({"value": "hi"}))
            .await
            .unwrap();
        assert_eq!(ok.content, "hi");

        let err = registry
            .dispatch("echo", json!({"value": "fail"}))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ToolError::ExecutionFailed {
                name: "echo".to_string(),
                message: "tool blew up".to_string()
            }
        );
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_variant_tool_sets() {
        let provider: Arc<dyn WebProvider> = Arc::new(StaticProvider::default());

        let simple =
            ToolRegistry::for_variant(AgentVariant::Simple, provider.clone(), WebLimits::default())
                .unwrap();
        assert_eq!(simple.list_tools(), vec!["web_search", "scrape_pages"]);

        let reasoning =
            ToolRegistry::for_variant(AgentVariant::Reasoning, provider, WebLimits::default())
                .unwrap();
        assert_eq!(
            reasoning.list_tools(),
            vec!["reasoning", "web_search", "scrape_pages", "done"]
        );
        assert!(reasoning.contains("done"));
        assert!(!simple.contains("done"));
    }

    #[test]
    fn test_builtin_schemas_are_objects_with_examples() {
        let provider: Arc<dyn WebProvider> = Arc::new(StaticProvider::default());
        let registry =
            ToolRegistry::for_variant(AgentVariant::Reasoning, provider, WebLimits::default())
                .unwrap();

        for name in registry.list_tools() {
            let tool = registry.get(name).unwrap();
            let schema = tool.parameters_schema();
            assert_eq!(schema["type"], "object", "schema type for {}", name);
            assert!(!tool.description().is_empty());
            assert!(!tool.examples().is_empty(), "{} has no examples", name);
        }
    }
}
