//! CLI command implementations

pub mod chat;
pub mod run;
pub mod tools;

pub use chat::chat_command;
pub use run::run_command;
pub use tools::tools_command;
