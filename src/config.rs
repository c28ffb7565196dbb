//! Configuration management for pagetext.
//!
//! `ExtractionConfig` is the immutable value the pipeline consumes. `Config`
//! is the optional on-disk file (discovered with the prefer crate) plus
//! environment overrides; CLI flags are applied on top by the caller.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ocr::{languages, EngineOptions, OcrBackendType};

/// Default OCR languages.
pub const DEFAULT_LANGUAGES: &[&str] = &["en"];
/// Minimum embedded text length (trimmed, in characters) to skip OCR.
pub const DEFAULT_EMBEDDED_TEXT_THRESHOLD: usize = 50;
/// Default rasterization resolution in DPI.
pub const DEFAULT_RASTER_RESOLUTION: u32 = 200;
/// Default maximum input file size in megabytes.
pub const DEFAULT_MAX_FILE_SIZE_MB: u64 = 100;

/// Invalid configuration values.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("At least one OCR language must be selected")]
    NoLanguages,

    #[error("Unsupported language code: {0}")]
    UnknownLanguage(String),

    #[error("Raster resolution must be a positive DPI value")]
    ZeroResolution,

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Failed to read config file {path}: {message}")]
    Read { path: PathBuf, message: String },
}

/// Where embedded text goes relative to OCR text on hybrid pages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HybridOrder {
    #[default]
    EmbeddedFirst,
    OcrFirst,
}

/// How the document-level confidence is computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidencePooling {
    /// Mean over every detection on every page.
    #[default]
    Pooled,
    /// Mean of the per-page means.
    PerPageMean,
}

/// Settings consumed by the page orchestrator and the aggregator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// OCR language codes.
    pub languages: Vec<String>,
    /// Minimum trimmed embedded text length for a page to be taken as-is.
    pub embedded_text_threshold: usize,
    /// Rasterization resolution in DPI.
    pub raster_resolution: u32,
    pub hybrid_order: HybridOrder,
    pub confidence_pooling: ConfidencePooling,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            languages: DEFAULT_LANGUAGES.iter().map(|s| s.to_string()).collect(),
            embedded_text_threshold: DEFAULT_EMBEDDED_TEXT_THRESHOLD,
            raster_resolution: DEFAULT_RASTER_RESOLUTION,
            hybrid_order: HybridOrder::default(),
            confidence_pooling: ConfidencePooling::default(),
        }
    }
}

impl ExtractionConfig {
    pub fn with_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.languages = languages.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_threshold(mut self, threshold: usize) -> Self {
        self.embedded_text_threshold = threshold;
        self
    }

    pub fn with_resolution(mut self, dpi: u32) -> Self {
        self.raster_resolution = dpi;
        self
    }

    pub fn with_hybrid_order(mut self, order: HybridOrder) -> Self {
        self.hybrid_order = order;
        self
    }

    pub fn with_confidence_pooling(mut self, pooling: ConfidencePooling) -> Self {
        self.confidence_pooling = pooling;
        self
    }

    /// Check the configuration is usable.
    ///
    /// Language codes are only checked for emptiness here; whether an engine
    /// supports a code is reported per page by the engine.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.languages.iter().all(|l| l.trim().is_empty()) {
            return Err(ConfigError::NoLanguages);
        }
        if self.raster_resolution == 0 {
            return Err(ConfigError::ZeroResolution);
        }
        Ok(())
    }

    /// Like `validate`, but also rejects codes missing from the language table.
    pub fn validate_strict(&self) -> Result<(), ConfigError> {
        self.validate()?;
        if let Some(unknown) = self.languages.iter().find(|l| languages::find(l).is_none()) {
            return Err(ConfigError::UnknownLanguage(unknown.clone()));
        }
        Ok(())
    }
}

/// Configuration file contents. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub languages: Option<Vec<String>>,
    pub threshold: Option<usize>,
    pub dpi: Option<u32>,
    pub engine: Option<OcrBackendType>,
    pub hybrid_order: Option<HybridOrder>,
    pub confidence_pooling: Option<ConfidencePooling>,
    pub max_file_size_mb: Option<u64>,
    /// Use `pdftotext -layout` for the embedded text layer.
    pub text_layout: Option<bool>,
    /// Tesseract page segmentation mode.
    pub psm: Option<u8>,
    /// Directory with PaddleOCR model files (downloaded there if missing).
    pub model_dir: Option<PathBuf>,
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration using prefer crate for discovery.
    /// Automatically discovers pagetext config files in standard locations.
    pub async fn load() -> Self {
        let mut config = match prefer::load("pagetext").await {
            Ok(pref_config) => match pref_config.source_path() {
                Some(path) => match Self::load_from_path(path).await {
                    Ok(config) => config,
                    Err(e) => {
                        tracing::warn!("Ignoring config file: {}", e);
                        Self::default()
                    }
                },
                None => Self::default(),
            },
            Err(_) => Self::default(),
        };
        config.apply_env_overrides();
        config
    }

    /// Load configuration from a specific file path.
    /// Supports JSON, TOML and YAML based on file extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let read_err = |message: String| ConfigError::Read {
            path: path.to_path_buf(),
            message,
        };

        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| read_err(e.to_string()))?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");
        let mut config = Self::parse(&contents, ext).map_err(read_err)?;
        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Parse config contents in the format named by `ext`.
    pub fn parse(contents: &str, ext: &str) -> Result<Self, String> {
        match ext {
            "json" => serde_json::from_str(contents)
                .map_err(|e| format!("Failed to parse JSON config: {}", e)),
            "yaml" | "yml" => serde_yaml::from_str(contents)
                .map_err(|e| format!("Failed to parse YAML config: {}", e)),
            _ => toml::from_str(contents)
                .map_err(|e| format!("Failed to parse TOML config: {}", e)),
        }
    }

    /// Apply `PAGETEXT_*` environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from a key lookup. Unparseable values are logged and ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(langs) = get("PAGETEXT_LANGUAGES") {
            tracing::debug!("Using PAGETEXT_LANGUAGES from environment: {}", langs);
            self.languages = Some(split_languages(&langs));
        }
        if let Some(value) = get("PAGETEXT_THRESHOLD") {
            match value.trim().parse() {
                Ok(threshold) => self.threshold = Some(threshold),
                Err(_) => tracing::warn!("Ignoring invalid PAGETEXT_THRESHOLD: {}", value),
            }
        }
        if let Some(value) = get("PAGETEXT_DPI") {
            match value.trim().parse() {
                Ok(dpi) => self.dpi = Some(dpi),
                Err(_) => tracing::warn!("Ignoring invalid PAGETEXT_DPI: {}", value),
            }
        }
        if let Some(value) = get("PAGETEXT_ENGINE") {
            match OcrBackendType::from_str(&value) {
                Some(engine) => self.engine = Some(engine),
                None => tracing::warn!("Ignoring invalid PAGETEXT_ENGINE: {}", value),
            }
        }
    }

    /// Build the pipeline configuration from file values and defaults.
    pub fn extraction_config(&self) -> ExtractionConfig {
        let defaults = ExtractionConfig::default();
        ExtractionConfig {
            languages: self.languages.clone().unwrap_or(defaults.languages),
            embedded_text_threshold: self.threshold.unwrap_or(defaults.embedded_text_threshold),
            raster_resolution: self.dpi.unwrap_or(defaults.raster_resolution),
            hybrid_order: self.hybrid_order.unwrap_or(defaults.hybrid_order),
            confidence_pooling: self.confidence_pooling.unwrap_or(defaults.confidence_pooling),
        }
    }

    pub fn engine(&self) -> OcrBackendType {
        self.engine.unwrap_or_default()
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            psm: self.psm,
            model_dir: self.model_dir.clone(),
        }
    }

    pub fn max_file_size_mb(&self) -> u64 {
        self.max_file_size_mb.unwrap_or(DEFAULT_MAX_FILE_SIZE_MB)
    }

    pub fn text_layout(&self) -> bool {
        self.text_layout.unwrap_or(false)
    }
}

/// Split a comma/plus/whitespace separated language list.
pub fn split_languages(value: &str) -> Vec<String> {
    value
        .split([',', '+', ' '])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
