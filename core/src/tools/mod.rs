//! Tool system and built-in tools

pub mod base;
pub mod builtin;
pub mod executor;
pub mod registry;

pub use base::{DynTool, Tool, ToolCall, ToolExample, ToolOutput, ToolResult};
pub use builtin::WebLimits;
pub use executor::ToolExecutor;
pub use registry::ToolRegistry;
