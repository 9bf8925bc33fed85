//! Tools listing command

use anyhow::Result;
use async_trait::async_trait;
use delve_core::error::{ProviderError, Result as CoreResult};
use delve_core::provider::{SearchHit, WebProvider};
use delve_core::tools::{ToolRegistry, WebLimits};
use delve_core::AgentVariant;
use std::sync::Arc;

/// Provider used only to describe tools; it never reaches the network
struct OfflineProvider;

#[async_trait]
impl WebProvider for OfflineProvider {
    async fn search(&self, _query: &str) -> CoreResult<Vec<SearchHit>> {
        Err(offline("search"))
    }

    async fn scrape(&self, _url: &str) -> CoreResult<String> {
        Err(offline("scrape"))
    }
}

fn offline(endpoint: &str) -> delve_core::Error {
    ProviderError::Network {
        endpoint: endpoint.to_string(),
        message: "provider is offline".to_string(),
    }
    .into()
}

/// Render the tools advertised by a variant
pub fn describe_tools(variant: AgentVariant) -> Result<String> {
    let registry = ToolRegistry::for_variant(variant, Arc::new(OfflineProvider), WebLimits::default())?;

    let mut out = format!("Tools of the {} agent\n\n", variant);
    for definition in registry.describe() {
        let function = definition.function;
        let arguments: Vec<&str> = function
            .parameters
            .get("properties")
            .and_then(|p| p.as_object())
            .map(|props| props.keys().map(String::as_str).collect())
            .unwrap_or_default();

        out.push_str(&format!("{}({})\n", function.name, arguments.join(", ")));
        let first_line = function.description.lines().next().unwrap_or_default();
        out.push_str(&format!("    {}\n\n", first_line));
    }
    Ok(out)
}

/// Show available tools
pub fn tools_command(variant: AgentVariant) -> Result<()> {
    print!("{}", describe_tools(variant)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lists_tools_in_advertised_order() {
        let simple = describe_tools(AgentVariant::Simple).unwrap();
        let search = simple.find("web_search(queries)").unwrap();
        let scrape = simple.find("scrape_pages(urls)").unwrap();
        assert!(search < scrape);
        assert!(!simple.contains("done("));

        let reasoning = describe_tools(AgentVariant::Reasoning).unwrap();
        assert!(reasoning.starts_with("Tools of the reasoning agent"));
        assert!(reasoning.contains("reasoning(reasoning)"));
        assert!(reasoning.contains("done()"));
    }
}
