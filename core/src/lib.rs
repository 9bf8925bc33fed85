//! # Delve Core
//!
//! Core library for Delve, a tool-using web research agent.
//!
//! An [`AgentCore`] alternates between asking a language model for the next
//! step and running the tools it requested (web search, page scraping and,
//! for the reasoning variant, explicit reflection and completion signals)
//! until the model replies with a plain answer.

// Core modules
pub mod agent;
pub mod config;
pub mod error;
pub mod llm;
pub mod output;
pub mod provider;
pub mod tools;
pub mod trajectory;

// Re-export commonly used types
pub use agent::{
    Agent, AgentBuilder, AgentConfig, AgentCore, AgentExecution, AgentVariant, Conversation,
};
pub use config::{ModelParams, Protocol, ResolvedLlmConfig, ResolvedSearchConfig};
pub use error::{Error, Result};
pub use trajectory::TrajectoryRecorder;

/// Current version of the delve-core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize tracing for the library
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}

/// Initialize tracing with a specific debug mode
pub fn init_tracing_with_debug(debug: bool) {
    let filter = if debug { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .init();
}
