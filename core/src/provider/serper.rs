//! Serper.dev search and scrape client

use crate::config::ResolvedSearchConfig;
use crate::error::{ProviderError, Result};
use crate::provider::{SearchHit, WebProvider};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

const API_KEY_HEADER: &str = "X-API-KEY";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    organic: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct ScrapeResponse {
    #[serde(default)]
    text: Option<String>,
}

/// HTTP client for the Serper search and scrape endpoints
pub struct SerperClient {
    client: reqwest::Client,
    api_key: String,
    search_url: String,
    scrape_url: String,
}

impl SerperClient {
    pub fn new(config: &ResolvedSearchConfig) -> Result<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::Network {
                endpoint: config.search_url.clone(),
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            search_url: config.search_url.clone(),
            scrape_url: config.scrape_url.clone(),
        })
    }

    async fn post(&self, endpoint: &str, body: serde_json::Value) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(endpoint)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network {
                endpoint: endpoint.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("{} returned {}", endpoint, status);
            return Err(ProviderError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body,
            }
            .into());
        }

        Ok(response)
    }
}

#[async_trait]
impl WebProvider for SerperClient {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        tracing::debug!("Searching for: {}", query);
        let response = self.post(&self.search_url, json!({ "q": query })).await?;
        let parsed: SearchResponse =
            response.json().await.map_err(|e| ProviderError::Decode {
                endpoint: self.search_url.clone(),
                message: e.to_string(),
            })?;
        Ok(parsed.organic)
    }

    async fn scrape(&self, url: &str) -> Result<String> {
        tracing::debug!("Scraping: {}", url);
        let response = self.post(&self.scrape_url, json!({ "url": url })).await?;
        let parsed: ScrapeResponse =
            response.json().await.map_err(|e| ProviderError::Decode {
                endpoint: self.scrape_url.clone(),
                message: e.to_string(),
            })?;
        parsed.text.ok_or_else(|| {
            ProviderError::Decode {
                endpoint: self.scrape_url.clone(),
                message: "response has no `text` field".to_string(),
            }
            .into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serve one canned response and hand back the raw request
    async fn one_shot_server(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                request.extend_from_slice(&buf[..n]);
                if n == 0 || request_complete(&request) {
                    break;
                }
            }

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            String::from_utf8_lossy(&request).to_string()
        });

        (format!("http://{}", addr), server)
    }

    fn request_complete(raw: &[u8]) -> bool {
        let text = String::from_utf8_lossy(raw);
        let Some(split) = text.find("\r\n\r\n") else {
            return false;
        };
        let length = text[..split]
            .lines()
            .find_map(|line| {
                let lower = line.to_ascii_lowercase();
                lower
                    .strip_prefix("content-length:")
                    .and_then(|v| v.trim().parse::<usize>().ok())
            })
            .unwrap_or(0);
        raw.len() >= split + 4 + length
    }

    fn client_for(base: &str) -> SerperClient {
        let config = ResolvedSearchConfig::new("serper-test-key".to_string())
            .with_endpoints(format!("{}/search", base), format!("{}/scrape", base));
        SerperClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_search_posts_query_with_api_key() {
        let (base, server) = one_shot_server(
            "200 OK",
            r#"{"organic":[{"title":"Rust","link":"https://rust-lang.org","snippet":"A language","position":1}]}"#,
        )
        .await;

        let hits = client_for(&base).search("rust language").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Rust");
        assert_eq!(hits[0].link, "https://rust-lang.org");

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /search"));
        assert!(request.to_ascii_lowercase().contains("x-api-key: serper-test-key"));
        assert!(request.contains(r#"{"q":"rust language"}"#));
    }

    #[tokio::test]
    async fn test_search_without_organic_is_empty() {
        let (base, server) = one_shot_server("200 OK", r#"{"searchParameters":{}}"#).await;
        let hits = client_for(&base).search("nothing").await.unwrap();
        assert!(hits.is_empty());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_scrape_returns_text() {
        let (base, server) =
            one_shot_server("200 OK", r#"{"text":"Page body","metadata":{}}"#).await;

        let text = client_for(&base).scrape("https://example.com").await.unwrap();
        assert_eq!(text, "Page body");

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /scrape"));
        assert!(request.contains(r#"{"url":"https://example.com"}"#));
    }

    #[tokio::test]
    async fn test_non_success_status_is_reported() {
        let (base, server) =
            one_shot_server("403 Forbidden", r#"{"message":"bad key"}"#).await;

        let err = client_for(&base).search("rust").await.unwrap_err();
        match err {
            Error::Provider(ProviderError::Status { status, body, .. }) => {
                assert_eq!(status, 403);
                assert!(body.contains("bad key"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_scrape_without_text_is_decode_error() {
        let (base, server) = one_shot_server("200 OK", r#"{"metadata":{}}"#).await;
        let err = client_for(&base).scrape("https://example.com").await.unwrap_err();
        assert!(matches!(err, Error::Provider(ProviderError::Decode { .. })));
        server.await.unwrap();
    }

    #[test]
    fn test_missing_api_key_is_rejected() {
        let config = ResolvedSearchConfig::new(String::new());
        assert!(SerperClient::new(&config).is_err());
    }
}
