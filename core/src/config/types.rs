//! Resolved configuration types for Delve core
//!
//! Core only accepts fully resolved, validated configuration.
//! All discovery, loading, and merging happens in the CLI layer.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default chat model
pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";

/// Default sampling temperature
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Default Serper search endpoint
pub const DEFAULT_SEARCH_URL: &str = "https://google.serper.dev/search";

/// Default Serper scrape endpoint
pub const DEFAULT_SCRAPE_URL: &str = "https://scrape.serper.dev";

/// Supported LLM protocols
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Protocol {
    /// OpenAI-compatible API (includes OpenAI, many proxies, local models)
    #[serde(rename = "openai_compat")]
    OpenAICompat,
    /// Azure OpenAI API
    #[serde(rename = "azure_openai")]
    AzureOpenAI,
    /// Custom protocol
    #[serde(rename = "custom")]
    Custom(String),
}

impl Protocol {
    /// Parse a protocol name as written in config files and flags
    pub fn parse(name: &str) -> Self {
        match name {
            "openai" | "openai_compat" => Protocol::OpenAICompat,
            "azure_openai" => Protocol::AzureOpenAI,
            custom => Protocol::Custom(custom.to_string()),
        }
    }

    /// Get the protocol name as a string
    pub fn as_str(&self) -> &str {
        match self {
            Protocol::OpenAICompat => "openai_compat",
            Protocol::AzureOpenAI => "azure_openai",
            Protocol::Custom(name) => name,
        }
    }

    /// Get the default base URL for this protocol
    pub fn default_base_url(&self) -> Option<&'static str> {
        match self {
            Protocol::OpenAICompat => Some("https://api.openai.com/v1"),
            Protocol::AzureOpenAI => None,
            Protocol::Custom(_) => None,
        }
    }
}

/// Model parameters for LLM requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelParams {
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
    /// Temperature for sampling (0.0 to 2.0)
    pub temperature: Option<f32>,
    /// Top-p sampling parameter
    pub top_p: Option<f32>,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            max_tokens: None,
            temperature: Some(DEFAULT_TEMPERATURE),
            top_p: None,
        }
    }
}

/// A fully resolved LLM configuration ready for use by core
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedLlmConfig {
    /// The protocol to use
    pub protocol: Protocol,
    /// Base URL for the API
    pub base_url: String,
    /// API key for authentication
    pub api_key: String,
    /// Model name/identifier
    pub model: String,
    /// Model parameters
    #[serde(default)]
    pub params: ModelParams,
    /// Additional headers for requests
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

impl ResolvedLlmConfig {
    /// Create a new resolved LLM config
    pub fn new(protocol: Protocol, base_url: String, api_key: String, model: String) -> Self {
        Self {
            protocol,
            base_url,
            api_key,
            model,
            params: ModelParams::default(),
            headers: HashMap::new(),
        }
    }

    /// Set model parameters
    pub fn with_params(mut self, params: ModelParams) -> Self {
        self.params = params;
        self
    }

    /// Add multiple headers
    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.is_empty() {
            return Err(ConfigError::MissingField {
                field: "api_key".to_string(),
            });
        }

        if self.model.is_empty() {
            return Err(ConfigError::MissingField {
                field: "model".to_string(),
            });
        }

        validate_url("base_url", &self.base_url)?;

        if let Some(temp) = self.params.temperature {
            if !(0.0..=2.0).contains(&temp) {
                return Err(ConfigError::InvalidValue {
                    field: "params.temperature".to_string(),
                    value: temp.to_string(),
                });
            }
        }

        if let Some(top_p) = self.params.top_p {
            if !(0.0..=1.0).contains(&top_p) {
                return Err(ConfigError::InvalidValue {
                    field: "params.top_p".to_string(),
                    value: top_p.to_string(),
                });
            }
        }

        Ok(())
    }
}

/// A fully resolved search/scrape provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedSearchConfig {
    /// Provider API key, sent as `X-API-KEY`
    pub api_key: String,
    /// Search endpoint
    #[serde(default = "default_search_url")]
    pub search_url: String,
    /// Scrape endpoint
    #[serde(default = "default_scrape_url")]
    pub scrape_url: String,
    /// Maximum hits kept per query (None keeps everything the provider returns)
    #[serde(default)]
    pub max_results: Option<usize>,
    /// Scraped page text is truncated to this many characters
    #[serde(default = "default_max_page_chars")]
    pub max_page_chars: usize,
    /// Per-request HTTP timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_search_url() -> String {
    DEFAULT_SEARCH_URL.to_string()
}

fn default_scrape_url() -> String {
    DEFAULT_SCRAPE_URL.to_string()
}

fn default_max_page_chars() -> usize {
    20_000
}

fn default_timeout_secs() -> u64 {
    30
}

impl ResolvedSearchConfig {
    /// Create a config pointing at the default Serper endpoints
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            search_url: default_search_url(),
            scrape_url: default_scrape_url(),
            max_results: None,
            max_page_chars: default_max_page_chars(),
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Override both endpoints
    pub fn with_endpoints(mut self, search_url: String, scrape_url: String) -> Self {
        self.search_url = search_url;
        self.scrape_url = scrape_url;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.is_empty() {
            return Err(ConfigError::MissingField {
                field: "search.api_key".to_string(),
            });
        }

        validate_url("search.search_url", &self.search_url)?;
        validate_url("search.scrape_url", &self.scrape_url)?;

        if self.max_page_chars == 0 {
            return Err(ConfigError::InvalidValue {
                field: "search.max_page_chars".to_string(),
                value: "0".to_string(),
            });
        }

        Ok(())
    }
}

fn validate_url(field: &str, url: &str) -> Result<(), ConfigError> {
    if url.is_empty() {
        return Err(ConfigError::MissingField {
            field: field.to_string(),
        });
    }

    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            value: url.to_string(),
        });
    }

    Ok(())
}
