//! Per-page extraction results.

use serde::{Deserialize, Serialize};

use crate::ocr::{Detection, OcrEngineError};
use crate::pdf::RasterizationError;

/// How the final text of a page was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMode {
    /// Embedded text layer was long enough; no OCR.
    Direct,
    /// Text comes from OCR only.
    Ocr,
    /// Short embedded text combined with OCR output.
    Hybrid,
}

impl ExtractionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Ocr => "ocr",
            Self::Hybrid => "hybrid",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "direct" => Some(Self::Direct),
            "ocr" => Some(Self::Ocr),
            "hybrid" => Some(Self::Hybrid),
            _ => None,
        }
    }

    /// Label used in human-readable reports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Direct => "Direct",
            Self::Ocr => "OCR",
            Self::Hybrid => "Hybrid",
        }
    }
}

impl std::fmt::Display for ExtractionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which collaborator failed for a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageErrorKind {
    Rasterization,
    Ocr,
}

/// A recovered page-level failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageError {
    pub kind: PageErrorKind,
    pub message: String,
}

impl std::fmt::Display for PageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl From<RasterizationError> for PageError {
    fn from(err: RasterizationError) -> Self {
        Self {
            kind: PageErrorKind::Rasterization,
            message: err.to_string(),
        }
    }
}

impl From<OcrEngineError> for PageError {
    fn from(err: OcrEngineError) -> Self {
        Self {
            kind: PageErrorKind::Ocr,
            message: err.to_string(),
        }
    }
}

/// Result of processing one page. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult {
    /// Page number (1-indexed).
    pub index: u32,
    pub mode: ExtractionMode,
    /// Final text reported for this page.
    pub text: String,
    /// OCR detections in engine order. Always empty for direct pages.
    pub detections: Vec<Detection>,
    /// Mean detection confidence; `None` when there are no detections.
    pub confidence: Option<f64>,
    /// Set when rasterization or OCR failed for this page.
    pub error: Option<PageError>,
}

impl PageResult {
    /// Page whose embedded text layer was used as-is.
    pub fn direct(index: u32, text: String) -> Self {
        Self {
            index,
            mode: ExtractionMode::Direct,
            text,
            detections: Vec::new(),
            confidence: None,
            error: None,
        }
    }

    /// Page processed with OCR. `text` is the already-composed final text.
    pub fn recognized(
        index: u32,
        mode: ExtractionMode,
        text: String,
        detections: Vec<Detection>,
    ) -> Self {
        let confidence = mean_confidence(&detections);
        Self {
            index,
            mode,
            text,
            detections,
            confidence,
            error: None,
        }
    }

    /// Page that needed OCR but could not be processed.
    pub fn failed(index: u32, error: PageError, fallback_text: String) -> Self {
        Self {
            index,
            mode: ExtractionMode::Ocr,
            text: fallback_text,
            detections: Vec::new(),
            confidence: None,
            error: Some(error),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Arithmetic mean of detection confidences.
pub(crate) fn mean_confidence(detections: &[Detection]) -> Option<f64> {
    if detections.is_empty() {
        return None;
    }
    let sum: f64 = detections.iter().map(Detection::confidence).sum();
    Some(sum / detections.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::BoundingBox;

    fn detection(text: &str, confidence: f64) -> Detection {
        Detection::new(text, BoundingBox::rect(0.0, 0.0, 10.0, 10.0), confidence)
    }

    #[test]
    fn test_mode_round_trip() {
        for mode in [
            ExtractionMode::Direct,
            ExtractionMode::Ocr,
            ExtractionMode::Hybrid,
        ] {
            assert_eq!(ExtractionMode::from_str(mode.as_str()), Some(mode));
        }
        assert_eq!(ExtractionMode::from_str("scanned"), None);
    }

    #[test]
    fn test_recognized_computes_mean() {
        let result = PageResult::recognized(
            1,
            ExtractionMode::Ocr,
            "a b".to_string(),
            vec![detection("a", 0.5), detection("b", 1.0)],
        );
        assert_eq!(result.confidence, Some(0.75));
        assert!(!result.is_failed());
    }

    #[test]
    fn test_no_detections_means_no_confidence() {
        let result =
            PageResult::recognized(2, ExtractionMode::Ocr, String::new(), Vec::new());
        assert_eq!(result.confidence, None);
    }

    #[test]
    fn test_failed_page_is_ocr_mode() {
        let err = PageError::from(RasterizationError::NoImage(3));
        let result = PageResult::failed(3, err, String::new());
        assert!(result.is_failed());
        assert_eq!(result.mode, ExtractionMode::Ocr);
        assert_eq!(
            result.error.as_ref().map(|e| e.kind),
            Some(PageErrorKind::Rasterization)
        );
    }
}
