//! Per-page extraction strategy selection.

use tracing::{debug, info, warn};

use super::cancel::CancellationToken;
use crate::config::{ExtractionConfig, HybridOrder};
use crate::models::{Document, ExtractionMode, Page, PageError, PageErrorKind, PageResult};
use crate::ocr::{join_detections, Detection, OcrEngine};
use crate::pdf::{PageRasterizer, TextLayerExtractor};

/// Progress events emitted while processing a document.
#[derive(Debug, Clone, Copy)]
pub enum PageEvent<'a> {
    /// A page is about to be processed.
    Started { index: u32, total: u32 },
    /// A page finished (successfully or with a recorded failure).
    Completed { result: &'a PageResult, total: u32 },
}

/// Results for a document, possibly cut short by cancellation.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedDocument {
    /// Results in page order. A prefix of the document when cancelled.
    pub pages: Vec<PageResult>,
    pub cancelled: bool,
}

/// Decides per page between the embedded text layer and OCR.
///
/// Owns its collaborators for the length of a processing session, so the OCR
/// engine (and any model it holds) is released when the orchestrator drops.
pub struct PageOrchestrator {
    text_layer: Box<dyn TextLayerExtractor>,
    rasterizer: Box<dyn PageRasterizer>,
    engine: Box<dyn OcrEngine>,
}

impl PageOrchestrator {
    pub fn new(
        text_layer: Box<dyn TextLayerExtractor>,
        rasterizer: Box<dyn PageRasterizer>,
        engine: Box<dyn OcrEngine>,
    ) -> Self {
        Self {
            text_layer,
            rasterizer,
            engine,
        }
    }

    /// Produce exactly one result for a page. Never fails: rasterization and
    /// OCR errors are recorded on the result.
    pub fn process_page(&self, page: &Page<'_>, config: &ExtractionConfig) -> PageResult {
        let index = page.index();
        let embedded = self.text_layer.extract_text(page);
        let embedded_len = embedded.trim().chars().count();

        if embedded_len > 0 && embedded_len >= config.embedded_text_threshold {
            debug!(
                "Page {}: {} chars of embedded text, using text layer",
                index, embedded_len
            );
            return PageResult::direct(index, embedded);
        }

        let has_embedded = embedded_len > 0;
        debug!(
            "Page {}: {} chars of embedded text (threshold {}), running OCR",
            index, embedded_len, config.embedded_text_threshold
        );

        let detections = match self.recognize(page, config) {
            Ok(detections) => detections,
            Err(err) => {
                warn!("Page {} failed: {}", index, err.message);
                // OCR errors keep whatever embedded text there was
                let fallback = match err.kind {
                    PageErrorKind::Ocr if has_embedded => embedded,
                    _ => String::new(),
                };
                return PageResult::failed(index, err, fallback);
            }
        };

        if detections.is_empty() {
            debug!("Page {}: OCR found no text", index);
            return PageResult::recognized(index, ExtractionMode::Ocr, String::new(), detections);
        }

        let ocr_text = join_detections(&detections);
        if has_embedded {
            let text = compose_hybrid(&embedded, &ocr_text, config.hybrid_order);
            PageResult::recognized(index, ExtractionMode::Hybrid, text, detections)
        } else {
            PageResult::recognized(index, ExtractionMode::Ocr, ocr_text, detections)
        }
    }

    /// Rasterize and OCR a page. The image is released before returning.
    fn recognize(
        &self,
        page: &Page<'_>,
        config: &ExtractionConfig,
    ) -> Result<Vec<Detection>, PageError> {
        let image = self.rasterizer.rasterize(page, config.raster_resolution)?;
        let result = self.engine.recognize(&image, &config.languages);
        drop(image);
        Ok(result?)
    }

    /// Process every page in order, stopping early if `cancel` is set.
    pub fn process_document(
        &self,
        document: &Document,
        config: &ExtractionConfig,
        cancel: &CancellationToken,
        mut on_event: impl FnMut(PageEvent<'_>),
    ) -> ProcessedDocument {
        let total = document.page_count();
        info!(
            "Processing {} ({} pages) with {}",
            document.filename(),
            total,
            self.engine.name()
        );

        let mut pages = Vec::with_capacity(total as usize);
        let mut cancelled = false;

        for page in document.pages() {
            if cancel.is_cancelled() {
                info!("Cancelled after {} of {} pages", pages.len(), total);
                cancelled = true;
                break;
            }

            on_event(PageEvent::Started {
                index: page.index(),
                total,
            });
            let result = self.process_page(&page, config);
            on_event(PageEvent::Completed {
                result: &result,
                total,
            });
            pages.push(result);
        }

        ProcessedDocument { pages, cancelled }
    }
}

/// Combine embedded and OCR text for a hybrid page.
fn compose_hybrid(embedded: &str, ocr_text: &str, order: HybridOrder) -> String {
    match order {
        HybridOrder::EmbeddedFirst => format!("{}\n{}", embedded, ocr_text),
        HybridOrder::OcrFirst => format!("{}\n{}", ocr_text, embedded),
    }
}
