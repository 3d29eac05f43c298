use reqwest::Client as HttpClient;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use tracing::{debug, warn};

use super::models::{AttemptError, ErrorResponse, ScreenshotRequest};
use crate::config::ScreenshotConfig;
use crate::utils::errors::ReceiptError;

/// Client for a headless-browser screenshot API, rotating over a pool of keys
pub struct ScreenshotClient {
    http_client: HttpClient,
    api_url: String,
    api_keys: Vec<String>,
}

impl ScreenshotClient {
    pub fn new(config: &ScreenshotConfig) -> Self {
        let http_client = HttpClient::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!("Falling back to default HTTP client: {}", e);
                HttpClient::new()
            });

        Self {
            http_client,
            api_url: config.api_url.clone(),
            api_keys: config.api_keys.clone(),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.api_url.is_empty() && !self.api_keys.is_empty()
    }

    fn create_headers(api_key: &str) -> Result<HeaderMap, AttemptError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("image/png"));

        let key_value = HeaderValue::from_str(api_key)
            .map_err(|e| AttemptError::Request(format!("Invalid API key header: {}", e)))?;
        headers.insert("X-API-Key", key_value);

        Ok(headers)
    }

    async fn attempt(
        &self,
        api_key: &str,
        request: &ScreenshotRequest<'_>,
    ) -> Result<Vec<u8>, AttemptError> {
        let headers = Self::create_headers(api_key)?;

        let response = self
            .http_client
            .post(&self.api_url)
            .headers(headers)
            .json(request)
            .send()
            .await
            .map_err(|e| AttemptError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body_text)
                .ok()
                .and_then(|err| err.message.or(err.error))
                .unwrap_or(body_text);
            return Err(AttemptError::Http(status.as_u16(), message));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AttemptError::Request(e.to_string()))?;
        if bytes.is_empty() {
            return Err(AttemptError::EmptyBody);
        }
        Ok(bytes.to_vec())
    }

    /// Render `html` to PNG, trying each key in order until one succeeds
    pub async fn capture(
        &self,
        html: &str,
        viewport_width: u32,
        viewport_height: u32,
    ) -> Result<Vec<u8>, ReceiptError> {
        if !self.is_configured() {
            return Err(ReceiptError::UpstreamFailure(
                "screenshot API not configured".to_string(),
            ));
        }

        let request = ScreenshotRequest {
            html,
            viewport_width,
            viewport_height,
            device_scale: 2,
        };

        let mut last_error = AttemptError::EmptyBody;
        for (index, api_key) in self.api_keys.iter().enumerate() {
            debug!("Screenshot attempt with key #{}", index + 1);
            match self.attempt(api_key, &request).await {
                Ok(png) => return Ok(png),
                Err(e) => {
                    warn!("Screenshot key #{} failed: {}", index + 1, e);
                    last_error = e;
                }
            }
        }

        Err(ReceiptError::UpstreamFailure(format!(
            "all {} API keys failed, last error: {}",
            self.api_keys.len(),
            last_error
        )))
    }
}
