//! OCR engine abstraction.
//!
//! Supports multiple OCR engines:
//! - Tesseract: Traditional OCR via command-line (CPU)
//! - PaddleOCR: CNN-based OCR via ONNX Runtime (feature: ocr-paddle)

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::model_store::ModelStore;
use super::tesseract::TesseractEngine;
use crate::pdf::RasterImage;

/// Errors from OCR engines.
#[derive(Debug, Error)]
pub enum OcrEngineError {
    #[error("Unsupported language code: {0}")]
    UnsupportedLanguage(String),

    #[error("Backend not available: {0}")]
    BackendNotAvailable(String),

    #[error("OCR failed: {0}")]
    OcrFailed(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A point in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Location of a detection on the page image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BoundingBox {
    /// Four corners, clockwise from top-left.
    Polygon { points: [Point; 4] },
    /// Axis-aligned rectangle.
    Rect {
        left: f64,
        top: f64,
        width: f64,
        height: f64,
    },
}

impl BoundingBox {
    pub fn rect(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self::Rect {
            left,
            top,
            width,
            height,
        }
    }

    pub fn polygon(points: [Point; 4]) -> Self {
        Self::Polygon { points }
    }

    /// Corner points, clockwise from top-left.
    pub fn corners(&self) -> [Point; 4] {
        match *self {
            Self::Polygon { points } => points,
            Self::Rect {
                left,
                top,
                width,
                height,
            } => [
                Point::new(left, top),
                Point::new(left + width, top),
                Point::new(left + width, top + height),
                Point::new(left, top + height),
            ],
        }
    }
}

/// One recognized text fragment.
///
/// Fields are private so every detection, including deserialized ones, has a
/// confidence in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "DetectionRecord")]
pub struct Detection {
    text: String,
    bbox: BoundingBox,
    confidence: f64,
}

/// Unchecked wire form of a `Detection`.
#[derive(Deserialize)]
struct DetectionRecord {
    text: String,
    bbox: BoundingBox,
    confidence: f64,
}

impl From<DetectionRecord> for Detection {
    fn from(record: DetectionRecord) -> Self {
        Self::new(record.text, record.bbox, record.confidence)
    }
}

impl Detection {
    /// Create a detection. Confidence is clamped to [0, 1]; NaN becomes 0.
    pub fn new(text: impl Into<String>, bbox: BoundingBox, confidence: f64) -> Self {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        Self {
            text: text.into(),
            bbox,
            confidence,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    /// Engine-reported confidence in [0, 1].
    pub fn confidence(&self) -> f64 {
        self.confidence
    }
}

/// Join detection fragments in engine order with single spaces.
pub fn join_detections(detections: &[Detection]) -> String {
    detections
        .iter()
        .map(Detection::text)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Available OCR backend types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OcrBackendType {
    /// Tesseract OCR via command-line.
    #[default]
    Tesseract,
    /// PaddleOCR via ONNX Runtime.
    #[serde(alias = "paddle")]
    PaddleOcr,
}

impl OcrBackendType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OcrBackendType::Tesseract => "tesseract",
            OcrBackendType::PaddleOcr => "paddleocr",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "tesseract" => Some(OcrBackendType::Tesseract),
            "paddleocr" | "paddle" => Some(OcrBackendType::PaddleOcr),
            _ => None,
        }
    }
}

impl std::fmt::Display for OcrBackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An OCR engine.
///
/// Engines may hold large model state; construct one per processing session
/// and reuse it for every page.
pub trait OcrEngine: Send + Sync {
    /// Short engine name for logs and reports.
    fn name(&self) -> &'static str;

    /// Check if this engine can run (dependencies installed, models present).
    fn is_available(&self) -> bool {
        true
    }

    /// Get a description of what's needed to make this engine available.
    fn availability_hint(&self) -> String {
        format!("{} is available", self.name())
    }

    /// Recognize text in an image. Detections are returned in reading order.
    fn recognize(
        &self,
        image: &RasterImage,
        languages: &[String],
    ) -> Result<Vec<Detection>, OcrEngineError>;
}

/// Engine construction settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineOptions {
    /// Tesseract page segmentation mode (`--psm`).
    pub psm: Option<u8>,
    /// Directory holding PaddleOCR model files.
    pub model_dir: Option<PathBuf>,
}

impl EngineOptions {
    /// Model store for PaddleOCR, honoring a configured directory.
    pub fn paddle_store(&self) -> ModelStore {
        ModelStore::resolve(self.model_dir.as_deref(), "paddle-ocr")
    }

    fn tesseract(&self) -> TesseractEngine {
        match self.psm {
            Some(psm) => TesseractEngine::new().with_psm(psm),
            None => TesseractEngine::new(),
        }
    }
}

/// Construct the engine for a backend type.
pub fn build_engine(
    backend: OcrBackendType,
    options: &EngineOptions,
) -> Result<Box<dyn OcrEngine>, OcrEngineError> {
    match backend {
        OcrBackendType::Tesseract => Ok(Box::new(options.tesseract())),
        #[cfg(feature = "ocr-paddle")]
        OcrBackendType::PaddleOcr => Ok(Box::new(super::PaddleEngine::new(
            options.paddle_store(),
        ))),
        #[cfg(not(feature = "ocr-paddle"))]
        OcrBackendType::PaddleOcr => Err(OcrEngineError::BackendNotAvailable(
            "PaddleOCR not compiled (enable the ocr-paddle feature)".to_string(),
        )),
    }
}
