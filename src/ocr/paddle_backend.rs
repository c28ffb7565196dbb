//! PaddleOCR engine implementation.
//!
//! Uses paddle-ocr-rs for OCR via ONNX Runtime. The bundled PP-OCRv4 models
//! recognize Chinese and English.
//!
//! Models are automatically downloaded on first use from:
//! https://github.com/RapidAI/RapidOCR

use std::sync::Mutex;

use paddle_ocr_rs::ocr_lite::OcrLite;

use super::backend::{BoundingBox, Detection, OcrEngine, OcrEngineError, Point};
use super::languages;
use super::model_store::{
    ModelFile, ModelStore, PADDLE_CLS, PADDLE_DET, PADDLE_MODELS, PADDLE_REC,
};
use crate::pdf::RasterImage;

/// Language codes the bundled models can read.
const SUPPORTED_LANGUAGES: &[&str] = &["en", "ch_sim"];

/// PaddleOCR engine via ONNX Runtime.
///
/// The model is loaded on first use and held until the engine is dropped.
pub struct PaddleEngine {
    store: ModelStore,
    num_threads: usize,
    engine: Mutex<Option<OcrLite>>,
}

impl PaddleEngine {
    pub fn new(store: ModelStore) -> Self {
        Self {
            store,
            num_threads: 4,
            engine: Mutex::new(None),
        }
    }

    fn load_engine(&self) -> Result<OcrLite, OcrEngineError> {
        self.store.fetch_missing(PADDLE_MODELS)?;
        let path = |file: ModelFile| self.store.path_of(&file).to_string_lossy().to_string();

        let mut ocr = OcrLite::new();
        ocr.init_models(
            &path(PADDLE_DET),
            &path(PADDLE_CLS),
            &path(PADDLE_REC),
            self.num_threads,
        )
            .map_err(|e| OcrEngineError::OcrFailed(format!("Failed to init PaddleOCR: {}", e)))?;

        tracing::debug!("PaddleOCR models loaded from {}", self.store.dir().display());
        Ok(ocr)
    }

    fn check_languages(languages: &[String]) -> Result<(), OcrEngineError> {
        for code in languages {
            let supported = languages::find(code)
                .map(|l| SUPPORTED_LANGUAGES.contains(&l.code))
                .unwrap_or(false);
            if !supported {
                return Err(OcrEngineError::UnsupportedLanguage(code.clone()));
            }
        }
        Ok(())
    }
}

impl OcrEngine for PaddleEngine {
    fn name(&self) -> &'static str {
        "paddleocr"
    }

    fn availability_hint(&self) -> String {
        if self.store.is_complete(PADDLE_MODELS) {
            format!("PaddleOCR models found in {}", self.store.dir().display())
        } else {
            format!(
                "PaddleOCR models will be downloaded on first use (~15 MB) to {}",
                self.store.dir().display()
            )
        }
    }

    fn recognize(
        &self,
        image: &RasterImage,
        languages: &[String],
    ) -> Result<Vec<Detection>, OcrEngineError> {
        Self::check_languages(languages)?;

        let mut guard = self
            .engine
            .lock()
            .map_err(|e| OcrEngineError::OcrFailed(format!("Failed to lock OCR engine: {}", e)))?;
        if guard.is_none() {
            *guard = Some(self.load_engine()?);
        }
        let ocr = guard
            .as_mut()
            .ok_or_else(|| OcrEngineError::OcrFailed("OCR engine not initialized".to_string()))?;

        let image_path = image.path().to_str().ok_or_else(|| {
            OcrEngineError::OcrFailed(format!("Non-UTF-8 image path: {:?}", image.path()))
        })?;

        let result = ocr
            .detect_from_path(
                image_path,
                50,    // padding
                1024,  // max side length
                0.5,   // box score threshold
                0.3,   // box threshold
                1.6,   // unclip ratio
                false, // do angle
                false, // most angle
            )
            .map_err(|e| OcrEngineError::OcrFailed(format!("PaddleOCR detection failed: {}", e)))?;

        Ok(result
            .text_blocks
            .iter()
            .filter(|block| !block.text.trim().is_empty())
            .map(|block| {
                let bbox = match block.box_points.as_slice() {
                    [a, b, c, d] => BoundingBox::polygon([
                        Point::new(a.x as f64, a.y as f64),
                        Point::new(b.x as f64, b.y as f64),
                        Point::new(c.x as f64, c.y as f64),
                        Point::new(d.x as f64, d.y as f64),
                    ]),
                    points => enclosing_rect(points.iter().map(|p| (p.x as f64, p.y as f64))),
                };
                Detection::new(block.text.trim(), bbox, block.text_score as f64)
            })
            .collect())
    }
}

/// Axis-aligned rectangle enclosing a set of points.
fn enclosing_rect(points: impl Iterator<Item = (f64, f64)>) -> BoundingBox {
    let (mut min_x, mut min_y) = (f64::MAX, f64::MAX);
    let (mut max_x, mut max_y) = (f64::MIN, f64::MIN);
    let mut any = false;
    for (x, y) in points {
        any = true;
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }
    if !any {
        return BoundingBox::rect(0.0, 0.0, 0.0, 0.0);
    }
    BoundingBox::rect(min_x, min_y, max_x - min_x, max_y - min_y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_support() {
        assert!(PaddleEngine::check_languages(&["en".to_string(), "ch_sim".to_string()]).is_ok());
        assert!(matches!(
            PaddleEngine::check_languages(&["ja".to_string()]),
            Err(OcrEngineError::UnsupportedLanguage(code)) if code == "ja"
        ));
    }

    #[test]
    fn test_enclosing_rect() {
        let rect = enclosing_rect([(4.0, 2.0), (10.0, 3.0), (6.0, 8.0)].into_iter());
        assert_eq!(rect, BoundingBox::rect(4.0, 2.0, 6.0, 6.0));
        assert_eq!(
            enclosing_rect(std::iter::empty()),
            BoundingBox::rect(0.0, 0.0, 0.0, 0.0)
        );
    }
}
