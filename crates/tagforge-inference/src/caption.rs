//! Image captioning backend (BLIP-style HTTP service).

use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};

use tagforge_core::defaults::{CAPTION_BASE_URL, INFERENCE_TIMEOUT_SECS};
use tagforge_core::{CaptionBackend, Error, Result};

/// HTTP captioning backend.
pub struct HttpCaptionBackend {
    base_url: String,
    model: String,
    client: reqwest::Client,
    timeout_secs: u64,
}

impl HttpCaptionBackend {
    pub fn new(base_url: String, model: String) -> Self {
        Self {
            base_url,
            model,
            client: reqwest::Client::new(),
            timeout_secs: INFERENCE_TIMEOUT_SECS,
        }
    }

    /// Create from environment variables (with defaults).
    pub fn from_env() -> Self {
        let base_url = std::env::var(tagforge_core::defaults::ENV_CAPTION_BASE_URL)
            .unwrap_or_else(|_| CAPTION_BASE_URL.to_string());
        let model = std::env::var("CAPTION_MODEL")
            .unwrap_or_else(|_| "blip-image-captioning-base".to_string());
        Self::new(base_url, model)
    }
}

#[derive(Serialize)]
struct CaptionRequest {
    model: String,
    image: String, // base64 encoded
    mime_type: String,
}

#[derive(Deserialize)]
struct CaptionResponse {
    caption: String,
}

#[async_trait]
impl CaptionBackend for HttpCaptionBackend {
    async fn caption(&self, image_data: &[u8], mime_type: &str) -> Result<String> {
        let request = CaptionRequest {
            model: self.model.clone(),
            image: base64::engine::general_purpose::STANDARD.encode(image_data),
            mime_type: mime_type.to_string(),
        };

        let url = format!("{}/v1/caption", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&request)
            .timeout(std::time::Duration::from_secs(self.timeout_secs))
            .send()
            .await
            .map_err(|e| Error::Inference(format!("caption request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Inference(format!(
                "caption backend returned {}: {}",
                status, body
            )));
        }

        let result: CaptionResponse = response
            .json()
            .await
            .map_err(|e| Error::Inference(format!("bad caption response: {}", e)))?;
        Ok(result.caption)
    }

    async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/health", self.base_url);
        match self.client.get(&url).send().await {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_caption_happy_path() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/caption"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "caption": "a dog on a beach" })),
            )
            .mount(&server)
            .await;

        let backend = HttpCaptionBackend::new(server.uri(), "blip-test".to_string());
        let caption = backend.caption(b"fake-png", "image/png").await.unwrap();
        assert_eq!(caption, "a dog on a beach");
    }

    #[tokio::test]
    async fn test_caption_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/caption"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let backend = HttpCaptionBackend::new(server.uri(), "blip-test".to_string());
        let err = backend.caption(b"x", "image/png").await.unwrap_err();
        assert!(matches!(err, Error::Inference(_)));
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn test_health_check_down() {
        // Nothing listening on this port
        let backend =
            HttpCaptionBackend::new("http://127.0.0.1:1".to_string(), "blip-test".to_string());
        assert!(!backend.health_check().await.unwrap());
    }

    #[test]
    fn test_model_name() {
        let backend = HttpCaptionBackend::new("http://x".to_string(), "blip-large".to_string());
        assert_eq!(backend.model_name(), "blip-large");
    }
}
