//! Page scraping tool

use crate::error::Result;
use crate::provider::WebProvider;
use crate::tools::base::{check_list, parse_arguments};
use crate::tools::builtin::web_search::escape_attr;
use crate::tools::{Tool, ToolExample, ToolOutput};
use async_trait::async_trait;
use futures::future::join_all;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// Maximum number of URLs accepted in one call
pub const MAX_URLS: usize = 3;

/// Default cap on the characters kept from one page
pub const DEFAULT_MAX_PAGE_CHARS: usize = 20_000;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScrapePagesInput {
    pub urls: Vec<String>,
}

/// Fetches the text of every URL concurrently; pages are returned in the
/// order the URLs were given
pub struct ScrapePagesTool {
    provider: Arc<dyn WebProvider>,
    max_page_chars: usize,
}

impl ScrapePagesTool {
    pub fn new(provider: Arc<dyn WebProvider>) -> Self {
        Self {
            provider,
            max_page_chars: DEFAULT_MAX_PAGE_CHARS,
        }
    }

    pub fn with_max_page_chars(mut self, max_page_chars: usize) -> Self {
        self.max_page_chars = max_page_chars;
        self
    }

    async fn scrape_one(&self, url: &str) -> (String, Value) {
        match self.provider.scrape(url).await {
            Ok(text) => {
                let (text, truncated) = truncate_chars(&text, self.max_page_chars);
                (
                    format!("<page url=\"{}\">\n{}\n</page>", escape_attr(url), text),
                    json!({ "url": url, "truncated": truncated }),
                )
            }
            Err(e) => {
                tracing::warn!("Scraping {} failed: {}", url, e);
                let message = e.to_string();
                (
                    format!(
                        "<page url=\"{}\" error=\"{}\"></page>",
                        escape_attr(url),
                        escape_attr(&message)
                    ),
                    json!({ "url": url, "error": message }),
                )
            }
        }
    }
}

fn truncate_chars(text: &str, max: usize) -> (String, bool) {
    match text.char_indices().nth(max) {
        Some((cut, _)) => (
            format!(
                "{}... [content truncated, showing first {} chars]",
                &text[..cut],
                max
            ),
            true,
        ),
        None => (text.to_string(), false),
    }
}

#[async_trait]
impl Tool for ScrapePagesTool {
    type Input = ScrapePagesInput;

    fn name(&self) -> &str {
        "scrape_pages"
    }

    fn description(&self) -> &str {
        "Scrape the content of web pages given their URLs"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "urls": {
                    "type": "array",
                    "items": { "type": "string" },
                    "minItems": 1,
                    "maxItems": MAX_URLS,
                    "description": "The URLs of the web pages to scrape"
                }
            },
            "required": ["urls"],
            "additionalProperties": false
        })
    }

    fn validate(&self, raw: Value) -> std::result::Result<ScrapePagesInput, String> {
        let input: ScrapePagesInput = parse_arguments(raw)?;
        check_list("urls", &input.urls, MAX_URLS)?;
        Ok(input)
    }

    async fn execute(&self, input: ScrapePagesInput) -> Result<ToolOutput> {
        let outcomes = join_all(input.urls.iter().map(|url| self.scrape_one(url))).await;
        let (pages, data): (Vec<String>, Vec<Value>) = outcomes.into_iter().unzip();

        Ok(ToolOutput::text(pages.join("\n")).with_data(Value::Array(data)))
    }

    fn examples(&self) -> Vec<ToolExample> {
        vec![ToolExample {
            description: "Read the two most promising search hits".to_string(),
            parameters: json!({
                "urls": ["https://example.com/article", "https://example.org/report"]
            }),
            expected_result: "One <page> block per URL, in URL order".to_string(),
        }]
    }
}
