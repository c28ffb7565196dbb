//! End-to-end scenarios through the public pipeline API with scripted
//! collaborators standing in for Poppler and the OCR engine.

use std::collections::HashMap;

use pagetext::config::{ConfidencePooling, ExtractionConfig};
use pagetext::models::{Document, ExtractionMode, Page, PageErrorKind, TextStats};
use pagetext::ocr::{BoundingBox, Detection, OcrEngine, OcrEngineError};
use pagetext::pdf::{
    DocumentLoadError, DocumentLoader, PageRasterizer, PopplerLoader, RasterImage,
    RasterizationError, TextLayerExtractor,
};
use pagetext::pipeline::{aggregate, CancellationToken, PageEvent, PageOrchestrator};
use pagetext::report::render_text;
use tempfile::TempDir;

struct ScriptedTextLayer(HashMap<u32, String>);

impl TextLayerExtractor for ScriptedTextLayer {
    fn extract_text(&self, page: &Page<'_>) -> String {
        self.0.get(&page.index()).cloned().unwrap_or_default()
    }
}

struct ScriptedRasterizer {
    fail_pages: Vec<u32>,
}

impl PageRasterizer for ScriptedRasterizer {
    fn rasterize(&self, page: &Page<'_>, dpi: u32) -> Result<RasterImage, RasterizationError> {
        if self.fail_pages.contains(&page.index()) {
            return Err(RasterizationError::NoImage(page.index()));
        }
        let dir = TempDir::new()?;
        let path = dir.path().join(format!("{}.png", page.index()));
        std::fs::write(&path, b"png")?;
        Ok(RasterImage::in_temp_dir(dir, path, dpi))
    }
}

struct ScriptedEngine(HashMap<u32, Vec<Detection>>);

impl OcrEngine for ScriptedEngine {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn recognize(
        &self,
        image: &RasterImage,
        _languages: &[String],
    ) -> Result<Vec<Detection>, OcrEngineError> {
        let page: u32 = image
            .path()
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| OcrEngineError::OcrFailed("unexpected image name".to_string()))?;
        Ok(self.0.get(&page).cloned().unwrap_or_default())
    }
}

fn boxed(text: &str, confidence: f64) -> Detection {
    Detection::new(text, BoundingBox::rect(10.0, 20.0, 100.0, 12.0), confidence)
}

fn orchestrator(
    embedded: &[(u32, &str)],
    ocr: Vec<(u32, Vec<Detection>)>,
    fail_raster: Vec<u32>,
) -> PageOrchestrator {
    PageOrchestrator::new(
        Box::new(ScriptedTextLayer(
            embedded.iter().map(|(i, t)| (*i, t.to_string())).collect(),
        )),
        Box::new(ScriptedRasterizer {
            fail_pages: fail_raster,
        }),
        Box::new(ScriptedEngine(ocr.into_iter().collect())),
    )
}

#[test]
fn partial_failure_document() {
    let orchestrator = orchestrator(&[(1, "Hello world")], vec![(2, Vec::new())], vec![3]);
    let document = Document::new("/tmp/partial.pdf", 2048, 3);
    let config = ExtractionConfig::default().with_threshold(5);

    let processed =
        orchestrator.process_document(&document, &config, &CancellationToken::new(), |_| {});
    assert!(!processed.cancelled);
    assert_eq!(processed.pages.len(), 3);

    let [first, second, third] = &processed.pages[..] else {
        panic!("expected three pages");
    };
    assert_eq!(first.mode, ExtractionMode::Direct);
    assert_eq!(second.mode, ExtractionMode::Ocr);
    assert_eq!(second.confidence, None);
    assert!(!second.is_failed());
    assert!(third.is_failed());
    assert_eq!(
        third.error.as_ref().map(|e| e.kind),
        Some(PageErrorKind::Rasterization)
    );

    let report = aggregate(&processed.pages, &config);
    assert_eq!(report.pages[0].word_count(), 2);
    assert_eq!(report.pages[1].word_count(), 0);
    assert_eq!(report.pages[2].word_count(), 0);
    assert_eq!(report.total_words(), 2);
    assert_eq!(report.total_pages, 3);
    assert_eq!(report.overall_confidence, None);
    assert_eq!(report.failed_pages, 1);

    let text = render_text(&document, &processed, &report);
    assert!(text.contains("PAGE 1 | Type: Direct"));
    assert!(text.contains("PAGE 2 | Type: OCR"));
    assert!(text.contains("PAGE 3 | Type: OCR | Confidence: n/a | FAILED:"));
    assert!(text.contains("Failed Pages: 1"));
}

#[test]
fn hybrid_page() {
    let orchestrator = orchestrator(
        &[(1, "Fig 1")],
        vec![(1, vec![boxed("Annual Report", 0.9), boxed("2023", 0.8)])],
        Vec::new(),
    );
    let document = Document::new("/tmp/hybrid.pdf", 2048, 1);
    let config = ExtractionConfig::default().with_threshold(10);

    let page = orchestrator.process_page(&document.page(1).unwrap(), &config);
    assert_eq!(page.mode, ExtractionMode::Hybrid);
    assert_eq!(page.text, "Fig 1\nAnnual Report 2023");
    assert!((page.confidence.unwrap() - 0.85).abs() < 1e-9);
    assert_eq!(page.detections.len(), 2);
}

#[test]
fn reprocessing_is_identical() {
    let orchestrator = orchestrator(
        &[(1, "Fig 1"), (2, "A long enough embedded paragraph")],
        vec![(1, vec![boxed("Annual Report", 0.9)])],
        Vec::new(),
    );
    let document = Document::new("/tmp/same.pdf", 2048, 2);
    let config = ExtractionConfig::default().with_threshold(10);

    for page in document.pages() {
        let first = orchestrator.process_page(&page, &config);
        let second = orchestrator.process_page(&page, &config);
        assert_eq!(first, second);
    }
}

#[test]
fn text_statistics_invariants() {
    for text in ["", "   \n\t", "word", "two words", "tab\tand\nnewline", "漢字 かな"] {
        let stats = TextStats::from_text(text);
        assert_eq!(stats.words == 0, text.trim().is_empty(), "{:?}", text);
        assert!(stats.chars_without_spaces <= stats.chars_with_spaces);
        assert_eq!(
            stats.chars_without_spaces == stats.chars_with_spaces,
            !text.chars().any(char::is_whitespace),
            "{:?}",
            text
        );
    }
}

#[test]
fn confidence_stays_in_unit_range() {
    let orchestrator = orchestrator(
        &[],
        vec![
            (1, vec![boxed("a", 1.4), boxed("b", 0.3)]),
            (2, vec![boxed("c", -1.0)]),
        ],
        Vec::new(),
    );
    let document = Document::new("/tmp/range.pdf", 2048, 2);
    let processed = orchestrator.process_document(
        &document,
        &ExtractionConfig::default(),
        &CancellationToken::new(),
        |_| {},
    );

    for pooling in [ConfidencePooling::Pooled, ConfidencePooling::PerPageMean] {
        let config = ExtractionConfig::default().with_confidence_pooling(pooling);
        let overall = aggregate(&processed.pages, &config)
            .overall_confidence
            .unwrap();
        assert!((0.0..=1.0).contains(&overall));
    }
}

#[test]
fn cancellation_keeps_a_prefix() {
    let orchestrator = orchestrator(
        &[
            (1, "first page text"),
            (2, "second page text"),
            (3, "third page text"),
        ],
        Vec::new(),
        Vec::new(),
    );
    let document = Document::new("/tmp/cancel.pdf", 2048, 3);
    let config = ExtractionConfig::default().with_threshold(5);
    let cancel = CancellationToken::new();
    let mut seen = Vec::new();

    let processed = orchestrator.process_document(&document, &config, &cancel, |event| {
        if let PageEvent::Completed { result, .. } = event {
            seen.push(result.index);
            if result.index == 2 {
                cancel.cancel();
            }
        }
    });

    assert!(processed.cancelled);
    assert_eq!(seen, vec![1, 2]);
    let report = aggregate(&processed.pages, &config);
    assert_eq!(report.total_pages, 2);
    assert_eq!(report.total_words(), 6);
}

#[test]
fn loader_rejects_non_pdf_and_oversized_files() {
    let dir = TempDir::new().unwrap();

    let text_file = dir.path().join("notes.pdf");
    std::fs::write(&text_file, b"just some plain text").unwrap();
    let err = PopplerLoader::new().load(&text_file).unwrap_err();
    assert!(matches!(err, DocumentLoadError::NotPdf { .. }));

    let big = dir.path().join("big.pdf");
    let mut contents = b"%PDF-1.4\n".to_vec();
    contents.resize(2 * 1024 * 1024, b' ');
    std::fs::write(&big, contents).unwrap();
    let err = PopplerLoader::new()
        .with_max_size_mb(1)
        .load(&big)
        .unwrap_err();
    assert!(matches!(err, DocumentLoadError::TooLarge { limit_mb: 1, .. }));

    let missing = dir.path().join("missing.pdf");
    let err = PopplerLoader::new().load(&missing).unwrap_err();
    assert!(matches!(err, DocumentLoadError::Io { .. }));
}
