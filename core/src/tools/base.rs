//! Base tool traits and structures

use crate::error::{Result, ToolError};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Trait for all tools
///
/// Raw arguments coming from the model are first turned into the tool's typed
/// `Input` by [`Tool::validate`]; [`Tool::execute`] only ever sees input that
/// passed validation.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Typed, validated input of the tool
    type Input: Send + 'static;

    /// Get the name of the tool
    fn name(&self) -> &str;

    /// Get the description of the tool
    fn description(&self) -> &str;

    /// Get the JSON schema for the tool's parameters
    fn parameters_schema(&self) -> Value;

    /// Check raw arguments and convert them into the typed input.
    /// The error string is reported back to the model as diagnostics.
    fn validate(&self, raw: Value) -> std::result::Result<Self::Input, String>;

    /// Execute the tool with validated input
    async fn execute(&self, input: Self::Input) -> Result<ToolOutput>;

    /// Get examples of how to use this tool
    fn examples(&self) -> Vec<ToolExample> {
        Vec::new()
    }
}

/// Object-safe view of a [`Tool`], used by the registry to store tools with
/// different input types side by side
#[async_trait]
pub trait DynTool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn parameters_schema(&self) -> Value;

    fn examples(&self) -> Vec<ToolExample>;

    /// Validate then execute, mapping failures onto [`ToolError`]
    async fn call(&self, raw: Value) -> std::result::Result<ToolOutput, ToolError>;
}

#[async_trait]
impl<T> DynTool for T
where
    T: Tool,
{
    fn name(&self) -> &str {
        Tool::name(self)
    }

    fn description(&self) -> &str {
        Tool::description(self)
    }

    fn parameters_schema(&self) -> Value {
        Tool::parameters_schema(self)
    }

    fn examples(&self) -> Vec<ToolExample> {
        Tool::examples(self)
    }

    async fn call(&self, raw: Value) -> std::result::Result<ToolOutput, ToolError> {
        let input = self
            .validate(raw)
            .map_err(|diagnostics| ToolError::InvalidArguments {
                name: Tool::name(self).to_string(),
                diagnostics,
            })?;

        self.execute(input)
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                name: Tool::name(self).to_string(),
                message: e.to_string(),
            })
    }
}

/// Deserialize raw arguments into a typed input, treating `null` as `{}`
pub fn parse_arguments<T: DeserializeOwned>(raw: Value) -> std::result::Result<T, String> {
    let raw = match raw {
        Value::Null => Value::Object(Default::default()),
        other => other,
    };
    serde_json::from_value(raw).map_err(|e| e.to_string())
}

/// Check the item count and contents of a list argument
pub fn check_list(
    field: &str,
    items: &[String],
    max: usize,
) -> std::result::Result<(), String> {
    if items.is_empty() {
        return Err(format!("`{}` must contain at least one item", field));
    }
    if items.len() > max {
        return Err(format!(
            "`{}` accepts at most {} items, got {}",
            field,
            max,
            items.len()
        ));
    }
    if let Some(pos) = items.iter().position(|item| item.trim().is_empty()) {
        return Err(format!("`{}[{}]` must not be empty", field, pos));
    }
    Ok(())
}

/// A call to a tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier for this tool call
    pub id: String,

    /// Name of the tool to call
    pub name: String,

    /// Parameters to pass to the tool
    pub parameters: Value,
}

/// Output produced by a successful tool execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutput {
    /// Text fed back to the model
    pub content: String,

    /// Optional structured data
    pub data: Option<Value>,
}

/// Result of a tool execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// ID of the tool call this is a result for
    pub tool_call_id: String,

    /// Whether the execution was successful
    pub success: bool,

    /// Result content
    pub content: String,

    /// Optional structured data
    pub data: Option<Value>,

    /// Execution duration in milliseconds
    pub duration_ms: Option<u64>,
}

/// Example usage of a tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolExample {
    /// Description of what this example does
    pub description: String,

    /// Example parameters
    pub parameters: Value,

    /// Expected result description
    pub expected_result: String,
}

impl ToolCall {
    /// Create a new tool call with a fresh id
    pub fn new<S: Into<String>>(name: S, parameters: Value) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            parameters,
        }
    }

    /// Create a tool call with a known id
    pub fn with_id<S: Into<String>>(id: S, name: S, parameters: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parameters,
        }
    }
}

impl ToolOutput {
    /// Plain text output
    pub fn text<S: Into<String>>(content: S) -> Self {
        Self {
            content: content.into(),
            data: None,
        }
    }

    /// Set structured data
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

impl ToolResult {
    /// Create a successful result
    pub fn success<S: Into<String>>(tool_call_id: S, output: ToolOutput) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            success: true,
            content: output.content,
            data: output.data,
            duration_ms: None,
        }
    }

    /// Create an error result
    pub fn error<S: Into<String>>(tool_call_id: S, error: S) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            success: false,
            content: format!("Error: {}", error.into()),
            data: None,
            duration_ms: None,
        }
    }

    /// Set execution duration
    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    #[serde(deny_unknown_fields)]
    struct Sample {
        items: Vec<String>,
    }

    #[test]
    fn test_parse_arguments_rejects_unknown_fields() {
        let err = parse_arguments::<Sample>(json!({"items": ["a"], "extra": 1})).unwrap_err();
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn test_parse_arguments_null_is_empty_object() {
        #[derive(Deserialize)]
        #[serde(deny_unknown_fields)]
        struct Empty {}

        assert!(parse_arguments::<Empty>(Value::Null).is_ok());
        assert!(parse_arguments::<Sample>(Value::Null).is_err());
    }

    #[test]
    fn test_check_list_bounds() {
        let one = vec!["a".to_string()];
        let four = vec!["a".to_string(); 4];
        let blank = vec!["a".to_string(), "  ".to_string()];

        assert!(check_list("queries", &one, 3).is_ok());
        assert!(check_list("queries", &[], 3).is_err());
        assert!(check_list("queries", &four, 3)
            .unwrap_err()
            .contains("at most 3"));
        assert!(check_list("queries", &blank, 3)
            .unwrap_err()
            .contains("queries[1]"));
    }

    #[test]
    fn test_tool_result_constructors() {
        let ok = ToolResult::success("call_1", ToolOutput::text("Done")).with_duration(5);
        assert!(ok.success);
        assert_eq!(ok.content, "Done");
        assert_eq!(ok.duration_ms, Some(5));

        let err = ToolResult::error("call_2", "boom");
        assert!(!err.success);
        assert_eq!(err.content, "Error: boom");
    }
}
