//! Document-level statistics.

use crate::config::{ConfidencePooling, ExtractionConfig};
use crate::models::{DocumentReport, ExtractionMode, PageResult, PageSummary, TextStats};

/// Aggregate page results into a report.
///
/// Pure and deterministic. Failed pages count toward the page totals and
/// contribute their (usually empty) text; pages without detections are left
/// out of the confidence mean.
pub fn aggregate(pages: &[PageResult], config: &ExtractionConfig) -> DocumentReport {
    let mut totals = TextStats::default();
    let mut summaries = Vec::with_capacity(pages.len());
    let (mut direct, mut ocr, mut hybrid, mut failed) = (0, 0, 0, 0);

    for page in pages {
        let stats = TextStats::from_text(&page.text);
        totals += stats;

        match page.mode {
            ExtractionMode::Direct => direct += 1,
            ExtractionMode::Ocr => ocr += 1,
            ExtractionMode::Hybrid => hybrid += 1,
        }
        if page.is_failed() {
            failed += 1;
        }

        summaries.push(PageSummary {
            index: page.index,
            mode: page.mode,
            stats,
            confidence: page.confidence,
            error: page.error.as_ref().map(|e| e.message.clone()),
        });
    }

    DocumentReport {
        totals,
        total_pages: pages.len(),
        direct_pages: direct,
        ocr_pages: ocr,
        hybrid_pages: hybrid,
        failed_pages: failed,
        overall_confidence: overall_confidence(pages, config.confidence_pooling),
        pages: summaries,
    }
}

fn overall_confidence(pages: &[PageResult], pooling: ConfidencePooling) -> Option<f64> {
    let values: Vec<f64> = match pooling {
        ConfidencePooling::Pooled => pages
            .iter()
            .flat_map(|p| p.detections.iter().map(|d| d.confidence()))
            .collect(),
        ConfidencePooling::PerPageMean => pages.iter().filter_map(|p| p.confidence).collect(),
    };
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PageError, PageErrorKind};
    use crate::ocr::{BoundingBox, Detection};

    fn det(confidence: f64) -> Detection {
        Detection::new("w", BoundingBox::rect(0.0, 0.0, 1.0, 1.0), confidence)
    }

    fn ocr_page(index: u32, confidences: &[f64]) -> PageResult {
        let detections: Vec<Detection> = confidences.iter().map(|c| det(*c)).collect();
        let text = vec!["w"; detections.len()].join(" ");
        PageResult::recognized(index, ExtractionMode::Ocr, text, detections)
    }

    #[test]
    fn test_pooled_is_not_mean_of_means() {
        // Page 1: one detection at 0.2. Page 2: three at 1.0.
        let pages = vec![ocr_page(1, &[0.2]), ocr_page(2, &[1.0, 1.0, 1.0])];

        let pooled = aggregate(&pages, &ExtractionConfig::default());
        assert!((pooled.overall_confidence.unwrap() - 0.8).abs() < 1e-9);

        let per_page = aggregate(
            &pages,
            &ExtractionConfig::default().with_confidence_pooling(ConfidencePooling::PerPageMean),
        );
        assert!((per_page.overall_confidence.unwrap() - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_no_detections_means_absent_confidence() {
        let pages = vec![
            PageResult::direct(1, "Hello world".to_string()),
            ocr_page(2, &[]),
        ];
        let report = aggregate(&pages, &ExtractionConfig::default());
        assert_eq!(report.overall_confidence, None);
        assert_eq!(report.overall_confidence_label(), "n/a");
    }

    #[test]
    fn test_mode_and_failure_counts() {
        let failed = PageResult::failed(
            3,
            PageError {
                kind: PageErrorKind::Ocr,
                message: "engine fault".to_string(),
            },
            "partial text".to_string(),
        );
        let pages = vec![
            PageResult::direct(1, "one two three".to_string()),
            PageResult::recognized(
                2,
                ExtractionMode::Hybrid,
                "cap\nw".to_string(),
                vec![det(0.5)],
            ),
            failed,
        ];
        let report = aggregate(&pages, &ExtractionConfig::default());

        assert_eq!(report.total_pages, 3);
        assert_eq!(report.direct_pages, 1);
        assert_eq!(report.hybrid_pages, 1);
        assert_eq!(report.ocr_pages, 1);
        assert_eq!(report.failed_pages, 1);
        // Failed page's fallback text still counts
        assert_eq!(report.total_words(), 3 + 2 + 2);
        assert_eq!(report.overall_confidence, Some(0.5));

        let failed: Vec<u32> = report.failed().map(|p| p.index).collect();
        assert_eq!(failed, vec![3]);
        assert_eq!(report.pages[2].error.as_deref(), Some("engine fault"));
    }

    #[test]
    fn test_empty_input() {
        let report = aggregate(&[], &ExtractionConfig::default());
        assert_eq!(report.total_pages, 0);
        assert_eq!(report.total_words(), 0);
        assert_eq!(report.overall_confidence, None);
        assert!(report.pages.is_empty());
    }

    #[test]
    fn test_char_totals() {
        let pages = vec![
            PageResult::direct(1, "ab cd".to_string()),
            PageResult::direct(2, "e\tf\n".to_string()),
        ];
        let report = aggregate(&pages, &ExtractionConfig::default());
        assert_eq!(report.total_chars_with_spaces(), 5 + 4);
        assert_eq!(report.total_chars_without_spaces(), 4 + 2);
    }
}
