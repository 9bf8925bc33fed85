//! Reasoning tool

use crate::error::Result;
use crate::tools::base::parse_arguments;
use crate::tools::{Tool, ToolExample, ToolOutput};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReasoningInput {
    pub reasoning: String,
}

/// Lets the model write down its reflection; the text is returned unchanged
pub struct ReasoningTool;

impl ReasoningTool {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ReasoningTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for ReasoningTool {
    type Input = ReasoningInput;

    fn name(&self) -> &str {
        "reasoning"
    }

    fn description(&self) -> &str {
        "Used to reflect on the research process and plan next steps"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "reasoning": {
                    "type": "string",
                    "minLength": 1,
                    "description": "The reasoning or reflection about the research process"
                }
            },
            "required": ["reasoning"],
            "additionalProperties": false
        })
    }

    fn validate(&self, raw: Value) -> std::result::Result<ReasoningInput, String> {
        let input: ReasoningInput = parse_arguments(raw)?;
        if input.reasoning.trim().is_empty() {
            return Err("`reasoning` must not be empty".to_string());
        }
        Ok(input)
    }

    async fn execute(&self, input: ReasoningInput) -> Result<ToolOutput> {
        Ok(ToolOutput::text(input.reasoning))
    }

    fn examples(&self) -> Vec<ToolExample> {
        vec![ToolExample {
            description: "Plan the next research step".to_string(),
            parameters: json!({
                "reasoning": "The overview results are thin on cost data; search for pricing reports next."
            }),
            expected_result: "The reasoning text, unchanged".to_string(),
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reasoning_is_echoed() {
        let tool = ReasoningTool::new();
        let input = tool
            .validate(json!({"reasoning": "Search for benchmarks next"}))
            .unwrap();
        let output = tool.execute(input).await.unwrap();
        assert_eq!(output.content, "Search for benchmarks next");
        assert!(output.data.is_none());
    }

    #[test]
    fn test_empty_reasoning_is_rejected() {
        let tool = ReasoningTool::new();
        assert!(tool.validate(json!({"reasoning": "   "})).is_err());
        assert!(tool.validate(json!({})).is_err());
        assert!(tool.validate(json!({"reasoning": 42})).is_err());
    }
}
