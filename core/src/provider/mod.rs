//! Search and scrape backends used by the web tools

pub mod serper;

pub use serper::SerperClient;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One organic search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub link: String,
    #[serde(default)]
    pub snippet: String,
}

/// Backend able to run a web search and fetch the text of a page
#[async_trait]
pub trait WebProvider: Send + Sync {
    /// Run one search query
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>>;

    /// Fetch the readable text of one page
    async fn scrape(&self, url: &str) -> Result<String>;
}
