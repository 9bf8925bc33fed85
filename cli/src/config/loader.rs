//! CLI configuration loader for delve
//!
//! Implements single-source priority loading with environment fallbacks and
//! flag overrides:
//! 1. --config file/dir (highest priority)
//! 2. Current working directory: ./delve.json or ./.delve/config.json
//! 3. Git repository root: <repo_root>/.delve/config.json
//! 4. XDG config: $XDG_CONFIG_HOME/delve/config.json or ~/.config/delve/config.json
//! 5. Environment variables only (no files)
//!
//! Fields a file leaves out are filled from `OPENAI_API_KEY`, `OPENAI_BASE_URL`,
//! `OPENAI_MODEL` and `SERPER_API_KEY`.

use anyhow::{anyhow, Context, Result};
use delve_core::config::DEFAULT_MODEL;
use delve_core::{
    AgentConfig, AgentVariant, ModelParams, Protocol, ResolvedLlmConfig, ResolvedSearchConfig,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Raw configuration file format
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawConfig {
    /// Protocol to use, `openai` when absent
    #[serde(default)]
    pub protocol: Option<String>,
    /// API key (can be "env:VAR_NAME" for environment variable)
    #[serde(default)]
    pub api_key: Option<String>,
    /// Base URL (optional, uses protocol default if not specified)
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub params: ModelParams,
    /// Additional headers (optional)
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Search/scrape provider section
    #[serde(default)]
    pub search: RawSearchConfig,
    /// Agent section
    #[serde(default)]
    pub agent: RawAgentConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawSearchConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub search_url: Option<String>,
    #[serde(default)]
    pub scrape_url: Option<String>,
    #[serde(default)]
    pub max_results: Option<usize>,
    #[serde(default)]
    pub max_page_chars: Option<usize>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawAgentConfig {
    #[serde(default)]
    pub variant: Option<AgentVariant>,
    #[serde(default)]
    pub max_steps: Option<usize>,
    #[serde(default)]
    pub system_prompt: Option<String>,
}

/// Everything the CLI needs to build an agent
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub llm: ResolvedLlmConfig,
    pub search: ResolvedSearchConfig,
    pub agent: AgentConfig,
}

/// CLI configuration loader
#[derive(Default)]
pub struct CliConfigLoader {
    /// Override config file/directory path
    config_override: Option<PathBuf>,
    /// Flag overrides
    protocol_override: Option<String>,
    api_key_override: Option<String>,
    base_url_override: Option<String>,
    model_override: Option<String>,
    search_api_key_override: Option<String>,
    variant_override: Option<AgentVariant>,
    max_steps_override: Option<usize>,
}

impl CliConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set config file/directory override
    pub fn with_config_override(mut self, path: PathBuf) -> Self {
        self.config_override = Some(path);
        self
    }

    pub fn with_protocol_override(mut self, protocol: String) -> Self {
        self.protocol_override = Some(protocol);
        self
    }

    pub fn with_api_key_override(mut self, api_key: String) -> Self {
        self.api_key_override = Some(api_key);
        self
    }

    pub fn with_base_url_override(mut self, base_url: String) -> Self {
        self.base_url_override = Some(base_url);
        self
    }

    pub fn with_model_override(mut self, model: String) -> Self {
        self.model_override = Some(model);
        self
    }

    pub fn with_search_api_key_override(mut self, api_key: String) -> Self {
        self.search_api_key_override = Some(api_key);
        self
    }

    pub fn with_variant_override(mut self, variant: AgentVariant) -> Self {
        self.variant_override = Some(variant);
        self
    }

    pub fn with_max_steps_override(mut self, max_steps: usize) -> Self {
        self.max_steps_override = Some(max_steps);
        self
    }

    /// Load and resolve configuration against the process environment
    pub async fn load(&self) -> Result<LoadedConfig> {
        self.load_with_env(&|name: &str| std::env::var(name).ok())
            .await
    }

    /// Load and resolve configuration with a custom environment lookup
    pub async fn load_with_env(
        &self,
        env: &(dyn Fn(&str) -> Option<String> + Sync),
    ) -> Result<LoadedConfig> {
        // Step 1: Find and load base configuration
        let config = if let Some(override_path) = &self.config_override {
            self.load_from_path(override_path).await.with_context(|| {
                format!(
                    "Failed to load config from override path: {}",
                    override_path.display()
                )
            })?
        } else {
            match self.search_and_load().await? {
                Some(config) => config,
                None => {
                    debug!("No config file found, using environment only");
                    RawConfig::default()
                }
            }
        };

        // Step 2: Environment fallbacks, then flag overrides
        let config = self.apply_overrides(fill_from_env(config, env));

        // Step 3: Resolve to final configs
        resolve_config(config, env)
    }

    fn apply_overrides(&self, mut config: RawConfig) -> RawConfig {
        if let Some(protocol) = &self.protocol_override {
            config.protocol = Some(protocol.clone());
        }
        if let Some(api_key) = &self.api_key_override {
            config.api_key = Some(api_key.clone());
        }
        if let Some(base_url) = &self.base_url_override {
            config.base_url = Some(base_url.clone());
        }
        if let Some(model) = &self.model_override {
            config.model = Some(model.clone());
        }
        if let Some(api_key) = &self.search_api_key_override {
            config.search.api_key = Some(api_key.clone());
        }
        if let Some(variant) = self.variant_override {
            config.agent.variant = Some(variant);
        }
        if let Some(max_steps) = self.max_steps_override {
            config.agent.max_steps = Some(max_steps);
        }
        config
    }

    /// Search for config in priority order
    async fn search_and_load(&self) -> Result<Option<RawConfig>> {
        let cwd = std::env::current_dir()?;

        // 1. Current working directory
        for candidate in [
            cwd.join("delve.json"),
            cwd.join(".delve").join("config.json"),
        ] {
            if candidate.exists() {
                return Ok(Some(load_file(&candidate).await?));
            }
        }

        // 2. Git repository root
        if let Some(git_root) = find_git_root(&cwd) {
            let config_path = git_root.join(".delve").join("config.json");
            if config_path.exists() {
                return Ok(Some(load_file(&config_path).await?));
            }
        }

        // 3. XDG config directory
        if let Some(config_dir) = xdg_config_dir() {
            let config_path = config_dir.join("delve").join("config.json");
            if config_path.exists() {
                return Ok(Some(load_file(&config_path).await?));
            }
        }

        Ok(None)
    }

    /// Load configuration from a specific path (file or directory)
    async fn load_from_path(&self, path: &Path) -> Result<RawConfig> {
        if path.is_file() {
            load_file(path).await
        } else if path.is_dir() {
            let config_file = path.join("config.json");
            if config_file.exists() {
                load_file(&config_file).await
            } else {
                Err(anyhow!(
                    "No config.json found in directory: {}",
                    path.display()
                ))
            }
        } else {
            Err(anyhow!("Config path does not exist: {}", path.display()))
        }
    }
}

/// Load a single config file
async fn load_file(path: &Path) -> Result<RawConfig> {
    debug!("Loading config from {}", path.display());
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Walk up from `start` to the first directory containing `.git`
fn find_git_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(".git").exists())
        .map(Path::to_path_buf)
}

fn xdg_config_dir() -> Option<PathBuf> {
    match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg_config) if !xdg_config.is_empty() => Some(PathBuf::from(xdg_config)),
        _ => dirs::home_dir().map(|home| home.join(".config")),
    }
}

fn fill_from_env(mut config: RawConfig, env: &dyn Fn(&str) -> Option<String>) -> RawConfig {
    if config.api_key.is_none() {
        config.api_key = env("OPENAI_API_KEY");
    }
    if config.base_url.is_none() {
        config.base_url = env("OPENAI_BASE_URL");
    }
    if config.model.is_none() {
        config.model = env("OPENAI_MODEL");
    }
    if config.search.api_key.is_none() {
        config.search.api_key = env("SERPER_API_KEY");
    }
    config
}

/// Expand an `env:VAR` reference
fn resolve_value(
    field: &str,
    value: String,
    env: &dyn Fn(&str) -> Option<String>,
) -> Result<String> {
    match value.strip_prefix("env:") {
        Some(var_name) => env(var_name).ok_or_else(|| {
            anyhow!(
                "Environment variable not found: {} (referenced by {})",
                var_name,
                field
            )
        }),
        None => Ok(value),
    }
}

/// Resolve raw config to the core's resolved types
fn resolve_config(
    config: RawConfig,
    env: &dyn Fn(&str) -> Option<String>,
) -> Result<LoadedConfig> {
    let protocol = Protocol::parse(config.protocol.as_deref().unwrap_or("openai"));

    let api_key = config.api_key.ok_or_else(|| {
        anyhow!("No model API key configured. Set OPENAI_API_KEY or add api_key to delve.json")
    })?;
    let api_key = resolve_value("api_key", api_key, env)?;

    let base_url = match config.base_url {
        Some(base_url) => resolve_value("base_url", base_url, env)?,
        None => protocol
            .default_base_url()
            .ok_or_else(|| anyhow!("Protocol '{}' requires a base_url", protocol.as_str()))?
            .to_string(),
    };

    let model = config.model.unwrap_or_else(|| DEFAULT_MODEL.to_string());

    let llm = ResolvedLlmConfig::new(protocol, base_url, api_key, model)
        .with_params(config.params.clone())
        .with_headers(config.headers);
    llm.validate()
        .map_err(|e| anyhow!("Configuration validation failed: {}", e))?;

    let search_key = config.search.api_key.ok_or_else(|| {
        anyhow!("No search API key configured. Set SERPER_API_KEY or add search.api_key")
    })?;
    let mut search = ResolvedSearchConfig::new(resolve_value("search.api_key", search_key, env)?);
    if let Some(url) = config.search.search_url {
        search.search_url = url;
    }
    if let Some(url) = config.search.scrape_url {
        search.scrape_url = url;
    }
    search.max_results = config.search.max_results;
    if let Some(max_page_chars) = config.search.max_page_chars {
        search.max_page_chars = max_page_chars;
    }
    if let Some(timeout_secs) = config.search.timeout_secs {
        search.timeout_secs = timeout_secs;
    }
    search
        .validate()
        .map_err(|e| anyhow!("Configuration validation failed: {}", e))?;

    let agent = AgentConfig {
        variant: config.agent.variant.unwrap_or_default(),
        max_steps: config.agent.max_steps,
        system_prompt: config.agent.system_prompt,
        params: config.params,
    };

    Ok(LoadedConfig { llm, search, agent })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn env_of(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> + Sync {
        move |name: &str| {
            pairs
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.to_string())
        }
    }

    fn write_config(json: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_env_only_defaults() {
        let dir = TempDir::new().unwrap();
        let loader = CliConfigLoader::new().with_config_override(dir.path().join("missing.json"));
        assert!(loader.load_with_env(&env_of(&[])).await.is_err());

        let config = fill_from_env(
            RawConfig::default(),
            &env_of(&[("OPENAI_API_KEY", "sk-env"), ("SERPER_API_KEY", "serper-env")]),
        );
        let loaded = resolve_config(config, &env_of(&[])).unwrap();

        assert_eq!(loaded.llm.protocol, Protocol::OpenAICompat);
        assert_eq!(loaded.llm.api_key, "sk-env");
        assert_eq!(loaded.llm.model, DEFAULT_MODEL);
        assert_eq!(loaded.llm.base_url, "https://api.openai.com/v1");
        assert_eq!(loaded.search.api_key, "serper-env");
        assert_eq!(loaded.agent.variant, AgentVariant::Simple);
        assert_eq!(loaded.agent.max_steps, None);
    }

    #[tokio::test]
    async fn test_file_with_env_references() {
        let file = write_config(
            r#"{
                "api_key": "env:MY_OPENAI",
                "model": "gpt-4o",
                "params": {"temperature": 0.2},
                "search": {"api_key": "env:MY_SERPER", "max_results": 5, "max_page_chars": 1000},
                "agent": {"variant": "reasoning", "max_steps": 12}
            }"#,
        );
        let loader = CliConfigLoader::new().with_config_override(file.path().to_path_buf());
        let env = env_of(&[("MY_OPENAI", "sk-file"), ("MY_SERPER", "serper-file")]);

        let loaded = loader.load_with_env(&env).await.unwrap();

        assert_eq!(loaded.llm.api_key, "sk-file");
        assert_eq!(loaded.llm.model, "gpt-4o");
        assert_eq!(loaded.llm.params.temperature, Some(0.2));
        assert_eq!(loaded.search.api_key, "serper-file");
        assert_eq!(loaded.search.max_results, Some(5));
        assert_eq!(loaded.search.max_page_chars, 1000);
        assert_eq!(loaded.agent.variant, AgentVariant::Reasoning);
        assert_eq!(loaded.agent.max_steps, Some(12));
        assert_eq!(loaded.agent.params.temperature, Some(0.2));
    }

    #[tokio::test]
    async fn test_flags_override_file() {
        let file = write_config(r#"{"api_key": "sk-file", "search": {"api_key": "s"}}"#);
        let loader = CliConfigLoader::new()
            .with_config_override(file.path().to_path_buf())
            .with_api_key_override("sk-flag".to_string())
            .with_model_override("gpt-4.1".to_string())
            .with_variant_override(AgentVariant::Reasoning)
            .with_max_steps_override(3);

        let loaded = loader.load_with_env(&env_of(&[])).await.unwrap();

        assert_eq!(loaded.llm.api_key, "sk-flag");
        assert_eq!(loaded.llm.model, "gpt-4.1");
        assert_eq!(loaded.agent.variant, AgentVariant::Reasoning);
        assert_eq!(loaded.agent.max_steps, Some(3));
    }

    #[tokio::test]
    async fn test_directory_override_reads_config_json() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("config.json"),
            r#"{"api_key": "sk-dir", "search": {"api_key": "s"}}"#,
        )
        .unwrap();
        let loader = CliConfigLoader::new().with_config_override(dir.path().to_path_buf());

        let loaded = loader.load_with_env(&env_of(&[])).await.unwrap();
        assert_eq!(loaded.llm.api_key, "sk-dir");
    }

    #[tokio::test]
    async fn test_missing_keys_are_reported() {
        let file = write_config(r#"{"api_key": "sk"}"#);
        let loader = CliConfigLoader::new().with_config_override(file.path().to_path_buf());
        let err = loader.load_with_env(&env_of(&[])).await.unwrap_err();
        assert!(err.to_string().contains("search API key"));

        let file = write_config(r#"{"api_key": "env:NOT_SET", "search": {"api_key": "s"}}"#);
        let loader = CliConfigLoader::new().with_config_override(file.path().to_path_buf());
        let err = loader.load_with_env(&env_of(&[])).await.unwrap_err();
        assert!(err.to_string().contains("NOT_SET"));
    }

    #[test]
    fn test_custom_protocol_needs_base_url() {
        let config = RawConfig {
            protocol: Some("my_gateway".to_string()),
            api_key: Some("k".to_string()),
            search: RawSearchConfig {
                api_key: Some("s".to_string()),
                ..RawSearchConfig::default()
            },
            ..RawConfig::default()
        };
        let err = resolve_config(config, &env_of(&[])).unwrap_err();
        assert!(err.to_string().contains("base_url"));
    }

    #[test]
    fn test_find_git_root() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join(".git")).unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_git_root(&nested), Some(dir.path().to_path_buf()));
    }
}
