//! CLI output handler implementation

use async_trait::async_trait;
use colored::Colorize;
use delve_core::output::{
    AgentEvent, AgentOutput, MessageLevel, OutputResult, ToolExecutionInfo, ToolExecutionStatus,
};
use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Tools whose progress lines are not shown; their content arrives as thinking
static SILENT_TOOLS: &[&str] = &["reasoning"];

fn is_silent_tool(tool_name: &str) -> bool {
    SILENT_TOOLS.contains(&tool_name)
}

/// CLI output configuration
#[derive(Debug, Clone)]
pub struct CliOutputConfig {
    /// Rewrite the "executing" line in place when a tool finishes
    pub realtime_updates: bool,
    /// Print run statistics after each answer
    pub show_stats: bool,
}

impl Default for CliOutputConfig {
    fn default() -> Self {
        Self {
            realtime_updates: true,
            show_stats: true,
        }
    }
}

/// CLI output handler that formats events for terminal display
pub struct CliOutputHandler {
    config: CliOutputConfig,
    /// Tools that are currently running, keyed by call id
    active_tools: Arc<Mutex<HashMap<String, ToolExecutionInfo>>>,
    /// Call id whose status line is the last line on screen
    last_line: Arc<Mutex<Option<String>>>,
}

impl CliOutputHandler {
    pub fn new(config: CliOutputConfig) -> Self {
        Self {
            config,
            active_tools: Arc::new(Mutex::new(HashMap::new())),
            last_line: Arc::new(Mutex::new(None)),
        }
    }
}

impl Default for CliOutputHandler {
    fn default() -> Self {
        Self::new(CliOutputConfig::default())
    }
}

/// One-line status such as `● web_search("rust async", "tokio")`
pub fn format_tool_status(tool_info: &ToolExecutionInfo) -> String {
    let dot = match tool_info.status {
        ToolExecutionStatus::Executing => "●".white(),
        ToolExecutionStatus::Success => "●".green(),
        ToolExecutionStatus::Error => "●".red(),
    };
    format!(
        "{} {}({})",
        dot,
        tool_info.tool_name.bold(),
        summarize_arguments(tool_info)
    )
}

/// Short result line under a finished tool, or None while it is running
pub fn format_tool_result(tool_info: &ToolExecutionInfo) -> Option<String> {
    let result = tool_info.result.as_ref()?;
    let line = if result.success {
        let chars = result.content.chars().count();
        match result.duration_ms {
            Some(ms) => format!("  ⎿  {} chars in {}ms", chars, ms),
            None => format!("  ⎿  {} chars", chars),
        }
    } else {
        let first_line = result.content.lines().next().unwrap_or_default();
        format!("  ⎿  {}", first_line)
    };
    Some(if result.success {
        line.dimmed().to_string()
    } else {
        line.red().to_string()
    })
}

/// Arguments rendered for display: the query or url lists when present
fn summarize_arguments(tool_info: &ToolExecutionInfo) -> String {
    let list = tool_info
        .parameters
        .get("queries")
        .or_else(|| tool_info.parameters.get("urls"));

    match list.and_then(|value| value.as_array()) {
        Some(items) => items
            .iter()
            .map(|item| match item.as_str() {
                Some(text) => format!("\"{}\"", text),
                None => item.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", "),
        None => String::new(),
    }
}

#[async_trait]
impl AgentOutput for CliOutputHandler {
    async fn emit_event(&self, event: AgentEvent) -> OutputResult {
        match event {
            AgentEvent::ExecutionStarted { context } => {
                debug!("Starting research: {}", context.task);
            }

            AgentEvent::ExecutionCompleted {
                context,
                success,
                summary,
            } => {
                if success {
                    debug!("Research completed");
                } else {
                    debug!("Research failed: {}", summary);
                }

                if self.config.show_stats {
                    let mut stats = format!(
                        "{} model calls in {:.2}s",
                        context.current_step,
                        context.execution_time.as_secs_f64()
                    );
                    let token_usage = &context.token_usage;
                    if token_usage.total_tokens > 0 {
                        stats.push_str(&format!(
                            ", {} input + {} output = {} tokens",
                            token_usage.input_tokens,
                            token_usage.output_tokens,
                            token_usage.total_tokens
                        ));
                    }
                    println!("{}", stats.dimmed());
                }
            }

            AgentEvent::StepStarted { step_number } => {
                debug!("Model call {}", step_number);
            }

            AgentEvent::ToolExecutionStarted { tool_info } => {
                if !is_silent_tool(&tool_info.tool_name) {
                    println!("{}", format_tool_status(&tool_info));
                    *self.last_line.lock().await = Some(tool_info.execution_id.clone());
                }
                let mut active_tools = self.active_tools.lock().await;
                active_tools.insert(tool_info.execution_id.clone(), tool_info);
            }

            AgentEvent::ToolExecutionCompleted { tool_info } => {
                self.active_tools
                    .lock()
                    .await
                    .remove(&tool_info.execution_id);

                if is_silent_tool(&tool_info.tool_name) {
                    return Ok(());
                }

                // Only the line printed last can be rewritten in place
                let mut last_line = self.last_line.lock().await;
                if self.config.realtime_updates
                    && last_line.as_deref() == Some(tool_info.execution_id.as_str())
                {
                    print!("\x1b[1A\x1b[2K\r");
                }
                *last_line = None;
                println!("{}", format_tool_status(&tool_info));
                if let Some(result_display) = format_tool_result(&tool_info) {
                    println!("{}", result_display);
                }
            }

            AgentEvent::AgentThinking {
                step_number: _,
                thinking,
            } => {
                println!("{}", thinking.bright_black());
            }

            AgentEvent::TokenUsageUpdated { token_usage } => {
                debug!("Tokens so far: {}", token_usage.total_tokens);
            }

            AgentEvent::Message { level, content } => match level {
                MessageLevel::Debug => debug!("{}", content),
                MessageLevel::Info => info!("{}", content),
                MessageLevel::Normal => println!("{}", content),
                MessageLevel::Warning => warn!("{}", content),
                MessageLevel::Error => error!("{}", content),
            },
        }

        Ok(())
    }

    async fn flush(&self) -> OutputResult {
        std::io::stdout().flush().map_err(|e| e.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use delve_core::tools::{ToolCall, ToolResult};
    use serde_json::json;

    fn info(call: &ToolCall, result: Option<&ToolResult>) -> ToolExecutionInfo {
        let status = match result {
            None => ToolExecutionStatus::Executing,
            Some(r) if r.success => ToolExecutionStatus::Success,
            Some(_) => ToolExecutionStatus::Error,
        };
        ToolExecutionInfo::from_call(call, status, result)
    }

    #[test]
    fn test_status_lists_queries() {
        colored::control::set_override(false);
        let call = ToolCall::with_id("1", "web_search", json!({"queries": ["a b", "c"]}));
        assert_eq!(format_tool_status(&info(&call, None)), "● web_search(\"a b\", \"c\")");

        let call = ToolCall::with_id("2", "done", json!({}));
        assert_eq!(format_tool_status(&info(&call, None)), "● done()");
    }

    #[test]
    fn test_result_lines() {
        colored::control::set_override(false);
        let call = ToolCall::with_id("1", "scrape_pages", json!({"urls": ["https://a.example"]}));
        assert!(format_tool_result(&info(&call, None)).is_none());

        let ok = ToolResult::success("1", delve_core::tools::ToolOutput::text("abcd")).with_duration(12);
        assert_eq!(
            format_tool_result(&info(&call, Some(&ok))).unwrap(),
            "  ⎿  4 chars in 12ms"
        );

        let failed = ToolResult::error("1", "invalid arguments\nmore");
        assert_eq!(
            format_tool_result(&info(&call, Some(&failed))).unwrap(),
            "  ⎿  Error: invalid arguments"
        );
    }

    #[tokio::test]
    async fn test_reasoning_calls_are_not_tracked_after_completion() {
        let handler = CliOutputHandler::new(CliOutputConfig {
            realtime_updates: false,
            show_stats: false,
        });
        let call = ToolCall::with_id("r", "reasoning", json!({"reasoning": "plan"}));
        let result = ToolResult::success("r", delve_core::tools::ToolOutput::text("plan"));

        handler
            .emit_event(AgentEvent::ToolExecutionStarted {
                tool_info: info(&call, None),
            })
            .await
            .unwrap();
        handler
            .emit_event(AgentEvent::ToolExecutionCompleted {
                tool_info: info(&call, Some(&result)),
            })
            .await
            .unwrap();

        assert!(handler.active_tools.lock().await.is_empty());
    }
}
