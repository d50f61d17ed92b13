//! HTTP client for communicating with agrid.

use agri_shared::rpc::{ChatRequest, ChatResponse, HealthResponse};
use anyhow::{anyhow, Context, Result};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Client for the agrid JSON API
pub struct AgridClient {
    http: reqwest::Client,
    base_url: String,
}

impl AgridClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("building HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn unreachable(&self, e: reqwest::Error) -> anyhow::Error {
        anyhow!(
            "Cannot reach AgriDetect daemon at {}: {}\n\n\
             Start it with `agrid`, or pass --daemon <url>.",
            self.base_url,
            e
        )
    }

    /// GET /health
    pub async fn health(&self) -> Result<HealthResponse> {
        let response = self
            .http
            .get(self.url("/health"))
            .send()
            .await
            .map_err(|e| self.unreachable(e))?;
        if !response.status().is_success() {
            return Err(anyhow!("Health check failed: HTTP {}", response.status()));
        }
        Ok(response.json().await?)
    }

    /// POST /api/v1/chat
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let response = self
            .http
            .post(self.url("/api/v1/chat"))
            .json(request)
            .send()
            .await
            .map_err(|e| self.unreachable(e))?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Chat failed: HTTP {} {}", status, body));
        }
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_join_strips_trailing_slash() {
        let client = AgridClient::new("http://127.0.0.1:8000/").unwrap();
        assert_eq!(client.url("/health"), "http://127.0.0.1:8000/health");
    }
}
