//! Web search tool

use crate::error::Result;
use crate::provider::{SearchHit, WebProvider};
use crate::tools::base::{check_list, parse_arguments};
use crate::tools::{Tool, ToolExample, ToolOutput};
use async_trait::async_trait;
use futures::future::join_all;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// Maximum number of queries accepted in one call
pub const MAX_QUERIES: usize = 3;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WebSearchInput {
    pub queries: Vec<String>,
}

/// Runs every query against the provider concurrently and formats the hits
/// as `<search_results>` groups, in the order the queries were given
pub struct WebSearchTool {
    provider: Arc<dyn WebProvider>,
    max_results: Option<usize>,
}

impl WebSearchTool {
    pub fn new(provider: Arc<dyn WebProvider>) -> Self {
        Self {
            provider,
            max_results: None,
        }
    }

    /// Keep at most `max_results` hits per query
    pub fn with_max_results(mut self, max_results: Option<usize>) -> Self {
        self.max_results = max_results;
        self
    }

    async fn run_query(&self, query: &str) -> (String, Value) {
        match self.provider.search(query).await {
            Ok(mut hits) => {
                if let Some(max) = self.max_results {
                    hits.truncate(max);
                }
                let text = format_results(query, &hits);
                (text, json!({ "query": query, "hits": hits }))
            }
            Err(e) => {
                tracing::warn!("Search for '{}' failed: {}", query, e);
                let message = e.to_string();
                (
                    format!(
                        "\n<search_results for=\"{}\" error=\"{}\">\n</search_results>\n",
                        escape_attr(query),
                        escape_attr(&message)
                    ),
                    json!({ "query": query, "error": message }),
                )
            }
        }
    }
}

fn format_results(query: &str, hits: &[SearchHit]) -> String {
    let sites = hits
        .iter()
        .enumerate()
        .map(|(i, hit)| {
            format!(
                "<Site index={{{}}}>\nTitle: {}\nLink: {}\nSnippet: {}\n</Site>",
                i + 1,
                hit.title,
                hit.link,
                hit.snippet
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "\n<search_results for=\"{}\">\n{}\n</search_results>\n",
        escape_attr(query),
        sites
    )
}

pub(crate) fn escape_attr(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

#[async_trait]
impl Tool for WebSearchTool {
    type Input = WebSearchInput;

    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web for information"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "queries": {
                    "type": "array",
                    "items": { "type": "string" },
                    "minItems": 1,
                    "maxItems": MAX_QUERIES,
                    "description": "The search queries to look up on the web"
                }
            },
            "required": ["queries"],
            "additionalProperties": false
        })
    }

    fn validate(&self, raw: Value) -> std::result::Result<WebSearchInput, String> {
        let input: WebSearchInput = parse_arguments(raw)?;
        check_list("queries", &input.queries, MAX_QUERIES)?;
        Ok(input)
    }

    async fn execute(&self, input: WebSearchInput) -> Result<ToolOutput> {
        let outcomes = join_all(input.queries.iter().map(|q| self.run_query(q))).await;
        let (texts, data): (Vec<String>, Vec<Value>) = outcomes.into_iter().unzip();

        Ok(ToolOutput::text(texts.concat()).with_data(Value::Array(data)))
    }

    fn examples(&self) -> Vec<ToolExample> {
        vec![ToolExample {
            description: "Search two angles of one topic at once".to_string(),
            parameters: json!({
                "queries": ["solid state battery breakthroughs 2024", "solid state battery manufacturing challenges"]
            }),
            expected_result: "One <search_results> group per query, in query order".to_string(),
        }]
    }
}
