//! Keyword-ranking backend (RAKE-style HTTP service).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use tagforge_core::defaults::{INFERENCE_TIMEOUT_SECS, KEYWORD_BASE_URL};
use tagforge_core::{Error, KeywordBackend, Result};

/// HTTP keyword-ranking backend.
pub struct HttpKeywordBackend {
    base_url: String,
    client: reqwest::Client,
    timeout_secs: u64,
}

impl HttpKeywordBackend {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            client: reqwest::Client::new(),
            timeout_secs: INFERENCE_TIMEOUT_SECS,
        }
    }

    /// Create from environment variables (with defaults).
    pub fn from_env() -> Self {
        let base_url = std::env::var(tagforge_core::defaults::ENV_KEYWORD_BASE_URL)
            .unwrap_or_else(|_| KEYWORD_BASE_URL.to_string());
        Self::new(base_url)
    }
}

#[derive(Serialize)]
struct RankRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct RankResponse {
    phrases: Vec<String>,
}

#[async_trait]
impl KeywordBackend for HttpKeywordBackend {
    async fn rank(&self, text: &str) -> Result<Vec<String>> {
        let url = format!("{}/v1/keywords", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&RankRequest { text })
            .timeout(std::time::Duration::from_secs(self.timeout_secs))
            .send()
            .await
            .map_err(|e| Error::Inference(format!("keyword request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Inference(format!(
                "keyword backend returned {}: {}",
                status, body
            )));
        }

        let result: RankResponse = response
            .json()
            .await
            .map_err(|e| Error::Inference(format!("bad keyword response: {}", e)))?;
        Ok(result.phrases)
    }

    async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/health", self.base_url);
        match self.client.get(&url).send().await {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(_) => Ok(false),
        }
    }
}
