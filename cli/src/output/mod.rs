//! CLI-specific output implementations
//!
//! Renders agent events for the terminal: tool progress lines, reasoning
//! text and run statistics.

pub mod cli_handler;

pub use cli_handler::{CliOutputConfig, CliOutputHandler};
