//! Agent configuration structures

use crate::config::{ModelParams, ResolvedLlmConfig, ResolvedSearchConfig};
use crate::error::{ConfigError, Result};
use crate::output::{AgentOutput, NullOutput};
use crate::provider::{SerperClient, WebProvider};
use crate::tools::{ToolRegistry, WebLimits};
use crate::trajectory::TrajectoryRecorder;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Named tool set an agent advertises
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentVariant {
    /// `web_search` and `scrape_pages`
    #[default]
    Simple,
    /// `reasoning`, `web_search`, `scrape_pages` and `done`
    Reasoning,
}

impl AgentVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentVariant::Simple => "simple",
            AgentVariant::Reasoning => "reasoning",
        }
    }
}

impl fmt::Display for AgentVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentVariant {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "simple" => Ok(AgentVariant::Simple),
            "reasoning" => Ok(AgentVariant::Reasoning),
            other => Err(ConfigError::InvalidValue {
                field: "variant".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Configuration for an agent
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default)]
    pub variant: AgentVariant,

    /// Upper bound on model invocations per run; unbounded when absent
    #[serde(default)]
    pub max_steps: Option<usize>,

    /// Custom system prompt for the agent (optional)
    /// If not provided, the variant's default prompt is used
    #[serde(default)]
    pub system_prompt: Option<String>,

    /// Sampling parameters forwarded with every model call
    #[serde(default)]
    pub params: ModelParams,
}

/// Builder for creating agents from resolved configuration
pub struct AgentBuilder {
    llm_config: ResolvedLlmConfig,
    search_config: ResolvedSearchConfig,
    agent_config: AgentConfig,
    trajectory_recorder: Option<Arc<TrajectoryRecorder>>,
}

impl AgentBuilder {
    pub fn new(llm_config: ResolvedLlmConfig, search_config: ResolvedSearchConfig) -> Self {
        let agent_config = AgentConfig {
            params: llm_config.params.clone(),
            ..AgentConfig::default()
        };
        Self {
            llm_config,
            search_config,
            agent_config,
            trajectory_recorder: None,
        }
    }

    /// Set agent configuration
    pub fn with_agent_config(mut self, agent_config: AgentConfig) -> Self {
        self.agent_config = agent_config;
        self
    }

    pub fn with_variant(mut self, variant: AgentVariant) -> Self {
        self.agent_config.variant = variant;
        self
    }

    pub fn with_max_steps(mut self, max_steps: Option<usize>) -> Self {
        self.agent_config.max_steps = max_steps;
        self
    }

    pub fn with_system_prompt(mut self, system_prompt: Option<String>) -> Self {
        self.agent_config.system_prompt = system_prompt;
        self
    }

    pub fn with_trajectory_recorder(mut self, recorder: Arc<TrajectoryRecorder>) -> Self {
        self.trajectory_recorder = Some(recorder);
        self
    }

    /// Build the agent with the given output handler
    pub fn build_with_output(self, output: Box<dyn AgentOutput>) -> Result<super::AgentCore> {
        self.llm_config.validate()?;
        let llm_client = crate::llm::create_client(&self.llm_config)?;

        let provider: Arc<dyn WebProvider> = Arc::new(SerperClient::new(&self.search_config)?);
        let registry = ToolRegistry::for_variant(
            self.agent_config.variant,
            provider,
            WebLimits::from(&self.search_config),
        )?;

        let mut agent =
            super::AgentCore::new(self.agent_config, llm_client, Arc::new(registry), output);
        if let Some(recorder) = self.trajectory_recorder {
            agent = agent.with_trajectory_recorder(recorder);
        }
        Ok(agent)
    }

    /// Build the agent with null output
    pub fn build(self) -> Result<super::AgentCore> {
        self.build_with_output(Box::new(NullOutput))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Agent;
    use crate::config::Protocol;

    fn llm_config() -> ResolvedLlmConfig {
        ResolvedLlmConfig::new(
            Protocol::OpenAICompat,
            "https://api.openai.com/v1".to_string(),
            "sk-test".to_string(),
            "gpt-4.1-mini".to_string(),
        )
    }

    #[test]
    fn test_variant_parsing() {
        assert_eq!("simple".parse::<AgentVariant>().unwrap(), AgentVariant::Simple);
        assert_eq!(
            "Reasoning".parse::<AgentVariant>().unwrap(),
            AgentVariant::Reasoning
        );
        assert!("deep".parse::<AgentVariant>().is_err());
        assert_eq!(AgentVariant::Reasoning.to_string(), "reasoning");
    }

    #[test]
    fn test_config_defaults_and_serialization() {
        let config: AgentConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.variant, AgentVariant::Simple);
        assert_eq!(config.max_steps, None);
        assert_eq!(config.system_prompt, None);

        let config: AgentConfig =
            serde_json::from_str(r#"{"variant":"reasoning","max_steps":12}"#).unwrap();
        assert_eq!(config.variant, AgentVariant::Reasoning);
        assert_eq!(config.max_steps, Some(12));
    }

    #[test]
    fn test_builder_wires_variant_tools() {
        let agent = AgentBuilder::new(llm_config(), ResolvedSearchConfig::new("key".to_string()))
            .with_variant(AgentVariant::Reasoning)
            .with_max_steps(Some(8))
            .build()
            .unwrap();

        assert_eq!(agent.config().max_steps, Some(8));
        assert_eq!(agent.agent_type(), "reasoning");
        assert_eq!(
            agent.tool_executor().registry().list_tools(),
            vec!["reasoning", "web_search", "scrape_pages", "done"]
        );
    }

    #[test]
    fn test_builder_rejects_missing_search_key() {
        let result = AgentBuilder::new(llm_config(), ResolvedSearchConfig::new(String::new())).build();
        assert!(result.is_err());
    }
}
