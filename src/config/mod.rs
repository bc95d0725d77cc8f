//! Application Configuration
//!
//! User settings stored in TOML format. Every section falls back to its
//! defaults, so a partial file only overrides what it names.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::ink::{Color, RecolorSettings, SettingsError};
use crate::pipeline::{DisplayTexts, DEFAULT_QUIESCENCE};
use crate::vision::{
    InkRasterizer, RecognitionBackend, RecognitionMode, RecognitionRequest, RecognizerSettings,
    DEFAULT_PADDING, DEFAULT_SCALE, HANDWRITING_REVISION,
};

/// Name of the config file inside the config directory
pub const CONFIG_FILE: &str = "config.toml";

/// Settings that parse but cannot be used
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error(transparent)]
    Recolor(#[from] SettingsError),
    #[error("raster scale must be a positive, finite number (got {0})")]
    InvalidScale(f32),
    #[error("raster padding must be a finite, non-negative number (got {0})")]
    InvalidPadding(f32),
    #[error("debounce quiescence must be greater than zero")]
    ZeroQuiescence,
}

/// Application settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub debounce: DebounceConfig,
    pub recolor: RecolorConfig,
    pub raster: RasterConfig,
    pub recognition: RecognitionConfig,
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebounceConfig {
    /// Quiet period after the last stroke change before recognizing
    pub quiescence_ms: u64,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            quiescence_ms: DEFAULT_QUIESCENCE.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecolorConfig {
    /// Color given to near-black strokes before rasterizing
    pub substitute: Color,
    /// Per-channel threshold under which a color counts as black
    pub tolerance: f32,
}

impl Default for RecolorConfig {
    fn default() -> Self {
        let defaults = RecolorSettings::default();
        Self {
            substitute: defaults.target().clone(),
            tolerance: defaults.tolerance(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterConfig {
    /// Margin around the drawing bounds, in drawing units
    pub padding: f32,
    /// Pixels per drawing unit
    pub scale: f32,
    pub max_pixels: u64,
    /// RGBA background
    pub background: [u8; 4],
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            padding: DEFAULT_PADDING,
            scale: DEFAULT_SCALE,
            max_pixels: 40_000_000,
            background: [255, 255, 255, 255],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    pub backend: RecognitionBackend,
    pub mode: RecognitionMode,
    pub language_correction: bool,
    pub languages: Vec<String>,
    /// Engine revision, honored only by backends that support one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision: Option<u32>,
    pub auto_detect_language: bool,
    pub http: HttpConfig,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        let request = RecognitionRequest::default();
        Self {
            backend: RecognitionBackend::default(),
            mode: request.mode,
            language_correction: request.language_correction,
            languages: request.languages,
            revision: Some(HANDWRITING_REVISION),
            auto_detect_language: request.auto_detect_language,
            http: HttpConfig::default(),
        }
    }
}

impl RecognitionConfig {
    pub fn request(&self) -> RecognitionRequest {
        RecognitionRequest {
            mode: self.mode,
            language_correction: self.language_correction,
            languages: self.languages.clone(),
            revision: self.revision,
            auto_detect_language: self.auto_detect_language,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub endpoint: String,
    pub timeout_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub supports_revision: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8080/recognize".to_string(),
            timeout_secs: 30,
            api_key: None,
            supports_revision: false,
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Shown before anything has been recognized
    pub placeholder: String,
    /// Shown after the drawing is cleared
    pub cleared: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        let texts = DisplayTexts::default();
        Self {
            placeholder: texts.placeholder,
            cleared: texts.cleared,
        }
    }
}

/// Validated runtime settings derived from [`AppConfig`]
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub recognizer: RecognizerSettings,
    pub rasterizer: InkRasterizer,
    pub window: Duration,
    pub texts: DisplayTexts,
}

impl AppConfig {
    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce.quiescence_ms)
    }

    pub fn display_texts(&self) -> DisplayTexts {
        DisplayTexts {
            placeholder: self.display.placeholder.clone(),
            cleared: self.display.cleared.clone(),
        }
    }

    pub fn recognizer_settings(&self) -> Result<RecognizerSettings, ConfigError> {
        let recolor = RecolorSettings::new(self.recolor.substitute.clone(), self.recolor.tolerance)?;

        let raster = &self.raster;
        if !raster.scale.is_finite() || raster.scale <= 0.0 {
            return Err(ConfigError::InvalidScale(raster.scale));
        }
        if !raster.padding.is_finite() || raster.padding < 0.0 {
            return Err(ConfigError::InvalidPadding(raster.padding));
        }

        Ok(RecognizerSettings {
            recolor,
            padding: raster.padding,
            scale: raster.scale,
            request: self.recognition.request(),
        })
    }

    /// Validate everything and build runtime settings
    pub fn pipeline_settings(&self) -> Result<PipelineSettings, ConfigError> {
        if self.debounce.quiescence_ms == 0 {
            return Err(ConfigError::ZeroQuiescence);
        }
        Ok(PipelineSettings {
            recognizer: self.recognizer_settings()?,
            rasterizer: InkRasterizer::new(self.raster.background, self.raster.max_pixels),
            window: self.debounce_window(),
            texts: self.display_texts(),
        })
    }
}

/// Get the configuration directory
pub fn config_dir() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "inkscribe", "Inkscribe")
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    Ok(proj_dirs.config_dir().to_path_buf())
}

/// Default location of the config file
pub fn default_config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE))
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    Ok(config)
}

/// Save configuration to file, creating the parent directory if needed
pub fn save_config(config: &AppConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write config file {}", path.display()))?;
    Ok(())
}
