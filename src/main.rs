//! Inkscribe - handwriting recognition canvas

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use inkscribe::config::{self, AppConfig};
use inkscribe::dashboard;
use inkscribe::ink::Drawing;
use inkscribe::vision::{
    HttpRecognitionService, RecognitionBackend, RecognitionService, Recognizer,
};

/// Inkscribe - turns freehand ink into text
#[derive(Parser, Debug)]
#[command(name = "inkscribe")]
#[command(about = "Draw on a canvas and see the handwriting recognized as text")]
struct Args {
    /// Config file to use instead of the default location
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Recognize a drawing stored as JSON, print the result and exit
    #[arg(short, long)]
    drawing: Option<PathBuf>,

    /// Write the default configuration to the config path and exit
    #[arg(long)]
    write_default_config: bool,

    /// Override the configured recognition backend
    #[arg(short, long, value_enum)]
    backend: Option<RecognitionBackend>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => config::default_config_path()?,
    };

    if args.write_default_config {
        config::save_config(&AppConfig::default(), &config_path)?;
        println!("Wrote default configuration to {}", config_path.display());
        return Ok(());
    }

    let mut app_config = load_or_default_config(&config_path);
    if let Some(backend) = args.backend {
        app_config.recognition.backend = backend;
    }

    let settings = app_config
        .pipeline_settings()
        .context("Invalid configuration")?;

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let service = {
        // reqwest needs a reactor when the client is built
        let _guard = runtime.enter();
        create_service(&app_config)?
    };
    info!("Recognition backend: {}", service.name());

    let recognizer = Arc::new(Recognizer::new(
        Arc::new(settings.rasterizer.clone()),
        service,
        settings.recognizer.clone(),
    ));

    if let Some(path) = &args.drawing {
        let drawing = load_drawing(path)?;
        let result = runtime.block_on(recognizer.recognize(&drawing));
        println!("{}", result.display_text());
        return Ok(());
    }

    dashboard::run_dashboard(recognizer, runtime.handle().clone(), settings.window, settings.texts)?;

    info!("Inkscribe shutdown complete");
    Ok(())
}

/// Load configuration from file or fall back to defaults
fn load_or_default_config(path: &Path) -> AppConfig {
    if path.exists() {
        match config::load_config(path) {
            Ok(config) => {
                info!("Loaded configuration from {:?}", path);
                return config;
            }
            Err(e) => warn!("Ignoring unreadable configuration: {:#}", e),
        }
    }
    info!("Using default configuration");
    AppConfig::default()
}

fn load_drawing(path: &Path) -> Result<Drawing> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read drawing {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse drawing {}", path.display()))
}

fn create_service(config: &AppConfig) -> Result<Arc<dyn RecognitionService>> {
    match config.recognition.backend {
        RecognitionBackend::Http => {
            let http = &config.recognition.http;
            let service = HttpRecognitionService::new(
                http.endpoint.clone(),
                http.api_key.clone(),
                http.timeout(),
                http.supports_revision,
            )?;
            Ok(Arc::new(service))
        }
        RecognitionBackend::Windows => windows_service(),
    }
}

#[cfg(target_os = "windows")]
fn windows_service() -> Result<Arc<dyn RecognitionService>> {
    Ok(Arc::new(inkscribe::vision::WindowsOcrService::new()))
}

#[cfg(not(target_os = "windows"))]
fn windows_service() -> Result<Arc<dyn RecognitionService>> {
    anyhow::bail!("Windows OCR is only available on Windows; use --backend http")
}
