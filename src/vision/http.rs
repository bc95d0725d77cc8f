//! Remote recognition over HTTP
//!
//! Posts the raster as a base64 PNG together with the request options and
//! reads back ordered observations:
//!
//! ```text
//! POST {endpoint}
//! { "image_png_base64": "...", "width": 120, "height": 80, "request": { ... } }
//!
//! 200 OK
//! { "observations": [ { "candidates": [ { "text": "Hello", "confidence": 0.9 } ] } ] }
//! ```

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use super::raster::RasterImage;
use super::service::{RecognitionRequest, RecognitionService, ServiceError, TextObservation};

/// Longest error body echoed back into a status message
const MAX_ERROR_BODY: usize = 200;

#[derive(Debug, Serialize)]
struct RecognizePayload<'a> {
    image_png_base64: String,
    width: u32,
    height: u32,
    request: &'a RecognitionRequest,
}

#[derive(Debug, Deserialize)]
struct RecognizeResponse {
    #[serde(default)]
    observations: Vec<TextObservation>,
}

/// Recognition service reached through a JSON endpoint
pub struct HttpRecognitionService {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    timeout: Duration,
    supports_revision: bool,
}

impl HttpRecognitionService {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
        supports_revision: bool,
    ) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::Unavailable(format!("failed to build HTTP client: {e}")))?;

        let endpoint = endpoint.into();
        info!("HTTP recognition service targeting {}", endpoint);

        Ok(Self {
            client,
            endpoint,
            api_key: api_key.filter(|k| !k.is_empty()),
            timeout,
            supports_revision,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn map_transport_error(&self, err: reqwest::Error) -> ServiceError {
        if err.is_timeout() {
            ServiceError::Timeout(self.timeout)
        } else if err.is_connect() {
            ServiceError::Unavailable(err.to_string())
        } else {
            ServiceError::backend(err.to_string())
        }
    }
}

fn build_payload<'a>(
    image: &RasterImage,
    request: &'a RecognitionRequest,
) -> Result<RecognizePayload<'a>, ServiceError> {
    let png = image
        .to_png()
        .map_err(|e| ServiceError::backend(e.to_string()))?;
    Ok(RecognizePayload {
        image_png_base64: STANDARD.encode(png),
        width: image.width(),
        height: image.height(),
        request,
    })
}

fn truncate(body: &str) -> &str {
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

#[async_trait]
impl RecognitionService for HttpRecognitionService {
    fn name(&self) -> &'static str {
        "http"
    }

    fn supports_revision(&self) -> bool {
        self.supports_revision
    }

    async fn recognize(
        &self,
        image: &RasterImage,
        request: &RecognitionRequest,
    ) -> Result<Vec<TextObservation>, ServiceError> {
        let payload = build_payload(image, request)?;

        let mut builder = self.client.post(&self.endpoint).json(&payload);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::backend(format!(
                "service returned {}: {}",
                status,
                truncate(body.trim())
            )));
        }

        let parsed: RecognizeResponse = response
            .json()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        debug!("HTTP recognition returned {} regions", parsed.observations.len());
        Ok(parsed.observations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    #[test]
    fn test_payload_carries_png_and_request() {
        let image = RasterImage::new(RgbaImage::new(3, 2));
        let request = RecognitionRequest::default();

        let payload = build_payload(&image, &request).unwrap();
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["width"], 3);
        assert_eq!(json["height"], 2);
        assert_eq!(json["request"]["mode"], "accurate");
        assert_eq!(json["request"]["languages"][0], "en-US");

        let png = STANDARD
            .decode(json["image_png_base64"].as_str().unwrap())
            .unwrap();
        assert_eq!(&png[1..4], b"PNG");
    }

    #[test]
    fn test_response_parsing() {
        let body = r#"{
            "observations": [
                { "candidates": [ { "text": "Hello", "confidence": 0.9 } ] },
                { "candidates": [] }
            ]
        }"#;
        let parsed: RecognizeResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.observations.len(), 2);
        assert_eq!(parsed.observations[0].top_candidate().unwrap().text, "Hello");
        assert!(parsed.observations[1].top_candidate().is_none());
    }

    #[test]
    fn test_missing_observations_is_empty() {
        let parsed: RecognizeResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.observations.is_empty());
    }

    #[test]
    fn test_truncate_error_body() {
        let long = "x".repeat(500);
        assert_eq!(truncate(&long).len(), MAX_ERROR_BODY);
        assert_eq!(truncate("short"), "short");
    }

    #[test]
    fn test_empty_api_key_is_ignored() {
        let service =
            HttpRecognitionService::new("http://localhost:9/ocr", Some(String::new()), Duration::from_secs(1), false)
                .unwrap();
        assert!(service.api_key.is_none());
        assert!(!service.supports_revision());
        assert_eq!(service.endpoint(), "http://localhost:9/ocr");
    }
}
