//! Agent core logic and execution engine

pub mod base;
pub mod config;
pub mod conversation;
pub mod core;
pub mod execution;
pub mod prompt;
pub mod router;

pub use base::{Agent, AgentResult};
pub use config::{AgentBuilder, AgentConfig, AgentVariant};
pub use conversation::Conversation;
pub use core::AgentCore;
pub use execution::AgentExecution;
pub use prompt::{system_prompt_for, REASONING_SYSTEM_PROMPT, SIMPLE_SYSTEM_PROMPT};
pub use router::{route, AgentState, RoutingDecision};
