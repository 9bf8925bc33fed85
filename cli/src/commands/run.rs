//! Single query execution command

use crate::config::{CliConfigLoader, LoadedConfig};
use crate::output::{CliOutputConfig, CliOutputHandler};
use anyhow::{bail, Context, Result};
use delve_core::{Agent, AgentBuilder, AgentCore, TrajectoryRecorder};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Build an agent with terminal output from loaded configuration
pub fn build_agent(
    loaded: LoadedConfig,
    trajectory_file: Option<&PathBuf>,
    output_config: CliOutputConfig,
) -> Result<AgentCore> {
    debug!("Using protocol: {}", loaded.llm.protocol.as_str());
    debug!("Using model: {}", loaded.llm.model);
    debug!("Using variant: {}", loaded.agent.variant);

    let mut builder = AgentBuilder::new(loaded.llm, loaded.search).with_agent_config(loaded.agent);
    if let Some(path) = trajectory_file {
        info!("Trajectory file: {}", path.display());
        builder = builder.with_trajectory_recorder(Arc::new(TrajectoryRecorder::with_file(path)));
    }

    builder
        .build_with_output(Box::new(CliOutputHandler::new(output_config)))
        .context("Failed to build agent")
}

/// Research a single query and print the answer
pub async fn run_command(
    query: String,
    config_loader: CliConfigLoader,
    trajectory_file: Option<PathBuf>,
) -> Result<()> {
    debug!("Researching: {}", query);

    let loaded = config_loader.load().await?;
    let agent = build_agent(loaded, trajectory_file.as_ref(), CliOutputConfig::default())?;

    let execution = agent.execute_task(&query).await?;

    if let Some(path) = &trajectory_file {
        info!("Trajectory saved to: {}", path.display());
    }

    if !execution.success {
        bail!("{}", execution.final_result);
    }

    Ok(())
}
