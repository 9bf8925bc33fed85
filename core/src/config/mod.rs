//! Minimal configuration module for Delve core
//!
//! Only exports pure data types. All loading logic is in CLI layer.

pub mod types;

pub use types::{
    ModelParams, Protocol, ResolvedLlmConfig, ResolvedSearchConfig, DEFAULT_MODEL,
    DEFAULT_SCRAPE_URL, DEFAULT_SEARCH_URL, DEFAULT_TEMPERATURE,
};
