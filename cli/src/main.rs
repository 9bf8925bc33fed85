//! # delve CLI
//!
//! Command-line interface for Delve, a web research agent.
//!
//! ## Usage
//!
//! - `delve` - Start an interactive research chat
//! - `delve "question"` - Research a single question
//! - `delve tools` - Show the tools of the selected variant

use anyhow::Result;
use clap::{Parser, Subcommand};
use delve_core::AgentVariant;
use std::path::PathBuf;

mod commands;
mod config;
mod output;

use commands::{chat_command, run_command, tools_command};
use config::CliConfigLoader;

/// delve - A web research agent
#[derive(Parser)]
#[command(name = "delve")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "A tool-using web research agent written in Rust")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file or directory path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Agent variant (simple, reasoning)
    #[arg(long)]
    variant: Option<AgentVariant>,

    /// Protocol to use (openai, azure_openai)
    #[arg(long)]
    protocol: Option<String>,

    /// Model API key override
    #[arg(long)]
    api_key: Option<String>,

    /// Base URL override
    #[arg(long)]
    base_url: Option<String>,

    /// Model name override
    #[arg(long)]
    model: Option<String>,

    /// Search provider API key override
    #[arg(long)]
    serper_api_key: Option<String>,

    /// Maximum number of model calls per question
    #[arg(long)]
    max_steps: Option<usize>,

    /// Output trajectory file
    #[arg(long)]
    trajectory_file: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug logging
    #[arg(short = 'd', long = "debug")]
    debug_output: bool,

    /// The question to research (if provided, runs in single-query mode)
    query: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show available tools
    Tools,
}

/// Build a configuration loader from CLI arguments
fn build_config_loader(cli: &Cli) -> CliConfigLoader {
    let mut loader = CliConfigLoader::new();

    if let Some(config_path) = &cli.config {
        loader = loader.with_config_override(config_path.clone());
    }
    if let Some(protocol) = &cli.protocol {
        loader = loader.with_protocol_override(protocol.clone());
    }
    if let Some(api_key) = &cli.api_key {
        loader = loader.with_api_key_override(api_key.clone());
    }
    if let Some(base_url) = &cli.base_url {
        loader = loader.with_base_url_override(base_url.clone());
    }
    if let Some(model) = &cli.model {
        loader = loader.with_model_override(model.clone());
    }
    if let Some(api_key) = &cli.serper_api_key {
        loader = loader.with_search_api_key_override(api_key.clone());
    }
    if let Some(variant) = cli.variant {
        loader = loader.with_variant_override(variant);
    }
    if let Some(max_steps) = cli.max_steps {
        loader = loader.with_max_steps_override(max_steps);
    }

    loader
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let filter = if cli.verbose || cli.debug_output {
        "debug"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    let config_loader = build_config_loader(&cli);

    match (cli.query, cli.command) {
        (Some(query), None) => run_command(query, config_loader, cli.trajectory_file).await,
        (Some(_), Some(_)) => {
            anyhow::bail!("Cannot specify both a query and a subcommand")
        }
        (None, Some(Commands::Tools)) => tools_command(cli.variant.unwrap_or_default()),
        (None, None) => chat_command(config_loader, cli.trajectory_file).await,
    }
}
