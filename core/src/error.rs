//! Error types and handling for Delve Core

use thiserror::Error;

/// Result type alias for Delve operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Delve Core
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// LLM client errors
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// Tool registration and dispatch errors
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    /// Search/scrape provider errors
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Agent execution errors
    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),

    /// Trajectory recording errors
    #[error("Trajectory error: {0}")]
    Trajectory(#[from] TrajectoryError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error with message
    #[error("{0}")]
    Generic(String),
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for field '{field}': {value}")]
    InvalidValue { field: String, value: String },
}

/// LLM client errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Unsupported protocol: {protocol}")]
    UnsupportedProtocol { protocol: String },
}

/// Tool registration, validation and execution errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolError {
    #[error("Duplicate tool name: {name}")]
    DuplicateToolName { name: String },

    #[error("Tool not found: {name}")]
    NotFound { name: String },

    #[error("Invalid arguments for {name}: {diagnostics}")]
    InvalidArguments { name: String, diagnostics: String },

    #[error("Tool execution failed: {name} - {message}")]
    ExecutionFailed { name: String, message: String },
}

impl ToolError {
    /// Whether the loop can continue by feeding this error back to the model
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ToolError::InvalidArguments { .. } | ToolError::ExecutionFailed { .. }
        )
    }
}

/// Search and scrape provider errors
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Request to {endpoint} failed: {message}")]
    Network { endpoint: String, message: String },

    #[error("{endpoint} returned {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("Unexpected response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },
}

/// Agent execution errors
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Maximum steps exceeded: {max_steps}")]
    MaxStepsExceeded { max_steps: usize },

    #[error("Model invocation failed at step {step}: {message}")]
    ModelInvocationFailed { step: usize, message: String },

    #[error("Invalid task: {message}")]
    InvalidTask { message: String },
}

/// Trajectory recording errors
#[derive(Error, Debug)]
pub enum TrajectoryError {
    #[error("Failed to record trajectory: {message}")]
    RecordingFailed { message: String },

    #[error("Failed to load trajectory: {path}")]
    LoadFailed { path: String },

    #[error("Invalid trajectory format")]
    InvalidFormat,
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Generic(msg)
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Generic(msg.to_string())
    }
}
