//! Recognition service contract
//!
//! Text-recognition engines are opaque async services: they take a raster and
//! a request configuration and return ordered text regions, each with one or
//! more scored candidates.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use super::raster::RasterImage;

/// Speed/accuracy trade-off requested from the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecognitionMode {
    Fast,
    #[default]
    Accurate,
}

/// Engine revision that handles handwriting better than printed-text revisions
pub const HANDWRITING_REVISION: u32 = 3;

/// Per-call engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionRequest {
    pub mode: RecognitionMode,
    pub language_correction: bool,
    /// Locale tags in priority order
    pub languages: Vec<String>,
    /// Engine revision; only sent to services that support selecting one
    pub revision: Option<u32>,
    pub auto_detect_language: bool,
}

impl Default for RecognitionRequest {
    fn default() -> Self {
        Self {
            mode: RecognitionMode::Accurate,
            language_correction: true,
            languages: vec!["en-US".to_string()],
            revision: Some(HANDWRITING_REVISION),
            auto_detect_language: false,
        }
    }
}

/// One scored reading of a text region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextCandidate {
    pub text: String,
    pub confidence: f32,
}

/// A text region found by the engine, with its candidate readings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TextObservation {
    pub candidates: Vec<TextCandidate>,
}

impl TextObservation {
    pub fn new(candidates: Vec<TextCandidate>) -> Self {
        Self { candidates }
    }

    /// Region with a single candidate
    pub fn single(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            candidates: vec![TextCandidate {
                text: text.into(),
                confidence,
            }],
        }
    }

    /// Highest-confidence candidate; the first one wins ties
    pub fn top_candidate(&self) -> Option<&TextCandidate> {
        self.candidates.iter().reduce(|best, candidate| {
            if candidate.confidence.total_cmp(&best.confidence).is_gt() {
                candidate
            } else {
                best
            }
        })
    }
}

/// Recognition service failure
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{message}")]
    Backend { message: String },
    #[error("recognition request timed out after {0:?}")]
    Timeout(Duration),
    #[error("recognition service unavailable: {0}")]
    Unavailable(String),
}

impl ServiceError {
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}

/// Common interface for text-recognition engines
#[async_trait]
pub trait RecognitionService: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether [`RecognitionRequest::revision`] is honored
    fn supports_revision(&self) -> bool {
        false
    }

    async fn recognize(
        &self,
        image: &RasterImage,
        request: &RecognitionRequest,
    ) -> Result<Vec<TextObservation>, ServiceError>;
}
