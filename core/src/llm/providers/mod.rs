//! LLM provider implementations

pub mod openai;

pub use openai::OpenAiClient;

use crate::config::{Protocol, ResolvedLlmConfig};
use crate::error::{LlmError, Result};
use crate::llm::LlmClient;
use std::sync::Arc;

/// Build the client matching the configured protocol
pub fn create_client(config: &ResolvedLlmConfig) -> Result<Arc<dyn LlmClient>> {
    match &config.protocol {
        Protocol::OpenAICompat => Ok(Arc::new(OpenAiClient::new(config)?)),
        // Azure OpenAI uses the same client as OpenAI
        Protocol::AzureOpenAI => Ok(Arc::new(OpenAiClient::new(config)?)),
        Protocol::Custom(name) => Err(LlmError::UnsupportedProtocol {
            protocol: name.clone(),
        }
        .into()),
    }
}
