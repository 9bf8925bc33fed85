//! AgentCore implementation

use super::config::AgentConfig;
use super::conversation::Conversation;
use super::prompt::system_prompt_for;
use super::router::AgentState;
use crate::agent::{Agent, AgentExecution, AgentResult};
use crate::error::{AgentError, Error, Result};
use crate::llm::{ChatOptions, LlmClient, LlmMessage, LlmResponse};
use crate::output::{
    AgentEvent, AgentExecutionContext, AgentOutput, MessageLevel, TokenUsage, ToolExecutionInfo,
    ToolExecutionStatus,
};
use crate::tools::{ToolExecutor, ToolRegistry};
use crate::trajectory::{TrajectoryEntry, TrajectoryRecorder};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

/// Research agent: alternates model invocations and tool turns until the
/// model answers without requesting tools.
///
/// The agent holds no per-request state, so one instance can serve several
/// conversations; each run owns its [`Conversation`].
pub struct AgentCore {
    config: AgentConfig,
    llm_client: Arc<dyn LlmClient>,
    tool_executor: ToolExecutor,
    trajectory_recorder: Option<Arc<TrajectoryRecorder>>,
    output: Box<dyn AgentOutput>,
}

/// Counters of one run
#[derive(Default)]
struct RunStats {
    model_invocations: usize,
    tool_turns: usize,
    token_usage: TokenUsage,
}

impl AgentCore {
    pub fn new(
        config: AgentConfig,
        llm_client: Arc<dyn LlmClient>,
        registry: Arc<ToolRegistry>,
        output: Box<dyn AgentOutput>,
    ) -> Self {
        Self {
            config,
            llm_client,
            tool_executor: ToolExecutor::new(registry),
            trajectory_recorder: None,
            output,
        }
    }

    pub fn with_trajectory_recorder(mut self, recorder: Arc<TrajectoryRecorder>) -> Self {
        self.trajectory_recorder = Some(recorder);
        self
    }

    /// Get agent configuration
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn tool_executor(&self) -> &ToolExecutor {
        &self.tool_executor
    }

    pub fn trajectory_recorder(&self) -> Option<&Arc<TrajectoryRecorder>> {
        self.trajectory_recorder.as_ref()
    }

    /// System prompt sent with every model call
    pub fn system_prompt(&self) -> &str {
        self.config
            .system_prompt
            .as_deref()
            .unwrap_or_else(|| system_prompt_for(self.config.variant))
    }

    /// Send system prompt, history and tool descriptors to the model.
    /// The conversation is left untouched.
    pub async fn invoke_model(
        &self,
        conversation: &Conversation,
        step: usize,
    ) -> Result<LlmResponse> {
        let mut messages = Vec::with_capacity(conversation.len() + 1);
        messages.push(LlmMessage::system(self.system_prompt()));
        messages.extend(conversation.messages().iter().cloned());

        let tool_definitions = self.tool_executor.get_tool_definitions();

        self.record(TrajectoryEntry::llm_request(
            messages.clone(),
            self.llm_client.model_name().to_string(),
            self.llm_client.provider_name().to_string(),
            tool_definitions
                .iter()
                .map(|d| d.function.name.clone())
                .collect(),
            step,
        ))
        .await?;

        let options = Some(ChatOptions::from(&self.config.params));

        let response = self
            .llm_client
            .chat_completion(messages, Some(tool_definitions), options)
            .await
            .map_err(|e| {
                tracing::error!("LLM request failed for step {}: {}", step, e);
                AgentError::ModelInvocationFailed {
                    step,
                    message: e.to_string(),
                }
            })?;

        self.record(TrajectoryEntry::llm_response(
            response.message.clone(),
            response.usage.clone(),
            response.finish_reason.as_ref().map(|r| format!("{:?}", r)),
            step,
        ))
        .await?;

        Ok(response)
    }

    /// Run every tool call of `message` and build one tool message per call,
    /// in request order
    pub async fn execute_tools(&self, message: &LlmMessage, step: usize) -> Result<Vec<LlmMessage>> {
        let calls = message.tool_calls();

        for call in &calls {
            self.emit(AgentEvent::ToolExecutionStarted {
                tool_info: ToolExecutionInfo::from_call(call, ToolExecutionStatus::Executing, None),
            })
            .await;
            self.record(TrajectoryEntry::tool_call(call.clone(), step))
                .await?;
        }

        let results = self.tool_executor.execute_batch(&calls).await?;

        let mut failed = 0;
        let mut tool_messages = Vec::with_capacity(results.len());
        for (call, result) in calls.iter().zip(results) {
            let status = if result.success {
                ToolExecutionStatus::Success
            } else {
                failed += 1;
                ToolExecutionStatus::Error
            };
            self.emit(AgentEvent::ToolExecutionCompleted {
                tool_info: ToolExecutionInfo::from_call(call, status, Some(&result)),
            })
            .await;

            if call.name == "reasoning" && result.success {
                self.emit(AgentEvent::AgentThinking {
                    step_number: step,
                    thinking: result.content.clone(),
                })
                .await;
            }

            self.record(TrajectoryEntry::tool_result(result.clone(), step))
                .await?;
            tool_messages.push(LlmMessage::tool_result(
                result.tool_call_id,
                result.content,
                !result.success,
            ));
        }

        self.record(TrajectoryEntry::step_complete(calls.len(), failed, step))
            .await?;

        Ok(tool_messages)
    }

    /// Drive the loop on an existing conversation until the model answers
    /// without tool calls.
    ///
    /// Fatal step errors end the run with a failed [`AgentExecution`] that
    /// carries the partial conversation. `Err` is reserved for trajectory
    /// persistence failures and an empty conversation.
    pub async fn run(&self, mut conversation: Conversation) -> AgentResult<AgentExecution> {
        if conversation.is_empty() {
            return Err(AgentError::InvalidTask {
                message: "conversation has no messages".to_string(),
            }
            .into());
        }

        let start_time = Instant::now();
        let task = conversation.latest_query().unwrap_or_default();
        let mut stats = RunStats::default();

        self.emit(AgentEvent::ExecutionStarted {
            context: self.context(&task, &stats, start_time),
        })
        .await;
        self.record(TrajectoryEntry::task_start(
            task.clone(),
            serde_json::to_value(&self.config).unwrap_or_default(),
        ))
        .await?;

        let mut state = AgentState::AwaitingModel;
        let outcome: Result<LlmMessage> = loop {
            state = match state {
                AgentState::AwaitingModel => {
                    if let Some(max_steps) = self.config.max_steps {
                        if stats.model_invocations >= max_steps {
                            break Err(AgentError::MaxStepsExceeded { max_steps }.into());
                        }
                    }
                    stats.model_invocations += 1;
                    let step = stats.model_invocations;
                    self.emit(AgentEvent::StepStarted { step_number: step })
                        .await;

                    let response = match self.invoke_model(&conversation, step).await {
                        Ok(response) => response,
                        Err(e) => break Err(e),
                    };

                    if let Some(usage) = &response.usage {
                        stats.token_usage.input_tokens += usage.prompt_tokens;
                        stats.token_usage.output_tokens += usage.completion_tokens;
                        stats.token_usage.total_tokens += usage.total_tokens;
                        self.emit(AgentEvent::TokenUsageUpdated {
                            token_usage: stats.token_usage.clone(),
                        })
                        .await;
                    }

                    conversation.push(response.message.clone());
                    AgentState::after_model(response.message)
                }
                AgentState::ExecutingTools(message) => {
                    let step = stats.model_invocations;
                    match self.execute_tools(&message, step).await {
                        Ok(tool_messages) => {
                            for tool_message in tool_messages {
                                conversation.push(tool_message);
                            }
                            stats.tool_turns += 1;
                            AgentState::after_tools()
                        }
                        Err(e) => break Err(e),
                    }
                }
                AgentState::Terminated(message) => break Ok(message),
            };
        };

        self.finish(task, conversation, outcome, stats, start_time)
            .await
    }

    async fn finish(
        &self,
        task: String,
        conversation: Conversation,
        outcome: Result<LlmMessage>,
        stats: RunStats,
        start_time: Instant,
    ) -> AgentResult<AgentExecution> {
        let duration_ms = start_time.elapsed().as_millis() as u64;
        let context = self.context(&task, &stats, start_time);

        let execution = match outcome {
            Ok(final_message) => {
                if let Some(text) = final_message.get_text() {
                    if !text.trim().is_empty() {
                        self.emit(AgentEvent::Message {
                            level: MessageLevel::Normal,
                            content: text,
                        })
                        .await;
                    }
                }
                AgentExecution::success(final_message, conversation)
            }
            // Trajectory failures are not step failures
            Err(e @ Error::Trajectory(_)) => return Err(e),
            Err(e) => {
                tracing::error!("Research run failed: {}", e);
                self.record(TrajectoryEntry::error(
                    e.to_string(),
                    Some(format!("Step {}", stats.model_invocations)),
                    stats.model_invocations,
                ))
                .await?;
                AgentExecution::failure(e.to_string(), conversation)
            }
        }
        .with_counts(stats.model_invocations, stats.tool_turns)
        .with_duration(duration_ms)
        .with_token_usage(stats.token_usage.clone());

        self.record(TrajectoryEntry::task_complete(
            execution.success,
            execution.final_result.clone(),
            execution.model_invocations,
            execution.tool_turns,
            duration_ms,
        ))
        .await?;

        let summary = if execution.success {
            format!(
                "Research completed after {} model calls and {} tool turns",
                execution.model_invocations, execution.tool_turns
            )
        } else {
            execution.final_result.clone()
        };
        self.emit(AgentEvent::ExecutionCompleted {
            context,
            success: execution.success,
            summary,
        })
        .await;
        if let Err(e) = self.output.flush().await {
            tracing::debug!("Failed to flush agent output: {}", e);
        }

        Ok(execution)
    }

    fn context(&self, task: &str, stats: &RunStats, start_time: Instant) -> AgentExecutionContext {
        AgentExecutionContext {
            agent_id: self.config.variant.to_string(),
            task: task.to_string(),
            max_steps: self.config.max_steps,
            current_step: stats.model_invocations,
            execution_time: start_time.elapsed(),
            token_usage: stats.token_usage.clone(),
        }
    }

    async fn emit(&self, event: AgentEvent) {
        if let Err(e) = self.output.emit_event(event).await {
            tracing::debug!("Failed to emit agent event: {}", e);
        }
    }

    async fn record(&self, entry: TrajectoryEntry) -> Result<()> {
        if let Some(recorder) = &self.trajectory_recorder {
            recorder.record(entry).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Agent for AgentCore {
    async fn execute_task(&self, task: &str) -> AgentResult<AgentExecution> {
        if task.trim().is_empty() {
            return Err(AgentError::InvalidTask {
                message: "query is empty".to_string(),
            }
            .into());
        }
        self.run(Conversation::from_query(task)).await
    }

    fn config(&self) -> &AgentConfig {
        &self.config
    }

    fn agent_type(&self) -> &str {
        self.config.variant.as_str()
    }
}
