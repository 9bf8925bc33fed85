//! Interactive chat command
//!
//! Each line read from stdin is a new user turn on the same conversation, so
//! follow-up questions see earlier answers and tool results.

use super::run::build_agent;
use crate::config::CliConfigLoader;
use crate::output::CliOutputConfig;
use anyhow::Result;
use colored::Colorize;
use delve_core::llm::LlmMessage;
use delve_core::Conversation;
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

/// What to do with one line of input
#[derive(Debug, PartialEq, Eq)]
enum ChatInput<'a> {
    Empty,
    Exit,
    Clear,
    Query(&'a str),
}

fn parse_input(line: &str) -> ChatInput<'_> {
    match line.trim() {
        "" => ChatInput::Empty,
        "exit" | "quit" | "/exit" | "/quit" => ChatInput::Exit,
        "/clear" => ChatInput::Clear,
        query => ChatInput::Query(query),
    }
}

fn prompt() -> Result<()> {
    print!("{} ", ">".cyan().bold());
    std::io::stdout().flush()?;
    Ok(())
}

/// Run an interactive research session
pub async fn chat_command(
    config_loader: CliConfigLoader,
    trajectory_file: Option<PathBuf>,
) -> Result<()> {
    let loaded = config_loader.load().await?;
    let variant = loaded.agent.variant;
    let agent = build_agent(loaded, trajectory_file.as_ref(), CliOutputConfig::default())?;

    println!(
        "{}",
        format!(
            "delve {} ({} agent). Ask a question, /clear to start over, exit to quit.",
            delve_core::VERSION,
            variant
        )
        .dimmed()
    );

    let mut conversation = Conversation::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        prompt()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        let query = match parse_input(&line) {
            ChatInput::Empty => continue,
            ChatInput::Exit => break,
            ChatInput::Clear => {
                conversation = Conversation::new();
                println!("{}", "Conversation cleared".dimmed());
                continue;
            }
            ChatInput::Query(query) => query,
        };

        let mut turn = conversation.clone();
        turn.push(LlmMessage::user(query));

        let execution = agent.run(turn).await?;
        if execution.success {
            conversation = execution.conversation;
            debug!("Conversation now has {} messages", conversation.len());
        } else {
            // A failed turn may end in unanswered tool calls; keep the history
            // from before it.
            warn!("{}", execution.final_result);
            println!("{}", execution.final_result.red());
        }
        println!();
    }

    Ok(())
}
