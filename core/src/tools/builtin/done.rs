//! Research completion signal

use crate::error::Result;
use crate::tools::base::parse_arguments;
use crate::tools::{Tool, ToolExample, ToolOutput};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DoneInput {}

/// Signals that research is finished and the model is moving on to writing.
/// The loop itself does not react to it; it still ends only on a plain answer.
pub struct DoneTool;

impl DoneTool {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DoneTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for DoneTool {
    type Input = DoneInput;

    fn name(&self) -> &str {
        "done"
    }

    fn description(&self) -> &str {
        "Indicates that the research is complete and you're moving to report writing"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {},
            "additionalProperties": false
        })
    }

    fn validate(&self, raw: Value) -> std::result::Result<DoneInput, String> {
        parse_arguments(raw)
    }

    async fn execute(&self, _input: DoneInput) -> Result<ToolOutput> {
        Ok(ToolOutput::text("Done").with_data(json!({ "research_completed": true })))
    }

    fn examples(&self) -> Vec<ToolExample> {
        vec![ToolExample {
            description: "Finish research before writing the report".to_string(),
            parameters: json!({}),
            expected_result: "Done".to_string(),
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_done_accepts_empty_or_null() {
        let tool = DoneTool::new();
        for raw in [json!({}), Value::Null] {
            let input = tool.validate(raw).unwrap();
            let output = tool.execute(input).await.unwrap();
            assert_eq!(output.content, "Done");
        }
    }

    #[test]
    fn test_done_rejects_arguments() {
        let tool = DoneTool::new();
        assert!(tool.validate(json!({"summary": "finished"})).is_err());
    }
}
