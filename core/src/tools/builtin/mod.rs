//! Built-in tools

pub mod done;
pub mod reasoning;
pub mod scrape_pages;
pub mod web_search;

pub use done::DoneTool;
pub use reasoning::ReasoningTool;
pub use scrape_pages::ScrapePagesTool;
pub use web_search::WebSearchTool;

use crate::config::ResolvedSearchConfig;

/// Output limits shared by the web tools
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WebLimits {
    /// Hits kept per search query
    pub max_results: Option<usize>,
    /// Characters kept per scraped page
    pub max_page_chars: usize,
}

impl Default for WebLimits {
    fn default() -> Self {
        Self {
            max_results: None,
            max_page_chars: scrape_pages::DEFAULT_MAX_PAGE_CHARS,
        }
    }
}

impl From<&ResolvedSearchConfig> for WebLimits {
    fn from(config: &ResolvedSearchConfig) -> Self {
        Self {
            max_results: config.max_results,
            max_page_chars: config.max_page_chars,
        }
    }
}
