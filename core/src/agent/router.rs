//! Control-loop states and the routing rule between them

use crate::llm::LlmMessage;

/// What the loop does after a model invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutingDecision {
    /// The message requested at least one tool call
    ContinueWithTools,
    /// The message is a plain answer
    Terminate,
}

/// State of one research run
#[derive(Debug, Clone, PartialEq)]
pub enum AgentState {
    /// Next step is a model invocation
    AwaitingModel,
    /// The assistant message whose tool calls must run next
    ExecutingTools(LlmMessage),
    /// Final assistant message
    Terminated(LlmMessage),
}

/// Route on the latest assistant message. No tool is special-cased.
pub fn route(message: &LlmMessage) -> RoutingDecision {
    if message.has_tool_use() {
        RoutingDecision::ContinueWithTools
    } else {
        RoutingDecision::Terminate
    }
}

impl AgentState {
    /// State reached once the model has answered with `message`
    pub fn after_model(message: LlmMessage) -> Self {
        match route(&message) {
            RoutingDecision::ContinueWithTools => AgentState::ExecutingTools(message),
            RoutingDecision::Terminate => AgentState::Terminated(message),
        }
    }

    /// State reached once a tool turn has finished
    pub fn after_tools() -> Self {
        AgentState::AwaitingModel
    }
}
