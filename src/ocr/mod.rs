//! OCR engines.
//!
//! - **Tesseract**: Traditional OCR, widely available, CPU-based (default)
//! - **PaddleOCR**: CNN-based, ONNX Runtime, Chinese/English (feature: ocr-paddle)
//!
//! Engines return word- or line-level `Detection`s with bounding boxes and
//! confidences. Use `build_engine` to construct one per processing session.

mod backend;
pub mod languages;
mod model_store;
mod tesseract;

#[cfg(feature = "ocr-paddle")]
mod paddle_backend;

pub use backend::{
    build_engine, join_detections, BoundingBox, Detection, EngineOptions, OcrBackendType,
    OcrEngine, OcrEngineError, Point,
};
pub use model_store::{ModelFile, ModelStore, PADDLE_MODELS};
pub use tesseract::TesseractEngine;

#[cfg(feature = "ocr-paddle")]
pub use paddle_backend::PaddleEngine;
