//! Document-level report types produced by the statistics aggregator.

use serde::{Deserialize, Serialize};

use super::page_result::ExtractionMode;

/// Word and character counts for a piece of text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextStats {
    /// Maximal runs of non-whitespace characters.
    pub words: usize,
    /// Characters including whitespace.
    pub chars_with_spaces: usize,
    /// Characters with all whitespace removed.
    pub chars_without_spaces: usize,
}

impl TextStats {
    pub fn from_text(text: &str) -> Self {
        Self {
            words: text.split_whitespace().count(),
            chars_with_spaces: text.chars().count(),
            chars_without_spaces: text.chars().filter(|c| !c.is_whitespace()).count(),
        }
    }
}

impl std::ops::AddAssign for TextStats {
    fn add_assign(&mut self, other: Self) {
        self.words += other.words;
        self.chars_with_spaces += other.chars_with_spaces;
        self.chars_without_spaces += other.chars_without_spaces;
    }
}

/// Summary line for one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSummary {
    pub index: u32,
    pub mode: ExtractionMode,
    pub stats: TextStats,
    /// Mean OCR confidence; `None` renders as "n/a".
    pub confidence: Option<f64>,
    /// Failure message when the page could not be processed.
    pub error: Option<String>,
}

impl PageSummary {
    pub fn word_count(&self) -> usize {
        self.stats.words
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    /// Confidence as a percentage with one decimal, or "n/a".
    pub fn confidence_label(&self) -> String {
        format_confidence(self.confidence)
    }
}

/// Aggregated statistics for a processed document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentReport {
    pub totals: TextStats,
    pub total_pages: usize,
    pub direct_pages: usize,
    pub ocr_pages: usize,
    pub hybrid_pages: usize,
    pub failed_pages: usize,
    /// Mean OCR confidence across all detections; `None` if no page had any.
    pub overall_confidence: Option<f64>,
    pub pages: Vec<PageSummary>,
}

impl DocumentReport {
    pub fn total_words(&self) -> usize {
        self.totals.words
    }

    pub fn total_chars_with_spaces(&self) -> usize {
        self.totals.chars_with_spaces
    }

    pub fn total_chars_without_spaces(&self) -> usize {
        self.totals.chars_without_spaces
    }

    pub fn overall_confidence_label(&self) -> String {
        format_confidence(self.overall_confidence)
    }

    /// Summaries of pages that failed, in page order.
    pub fn failed(&self) -> impl Iterator<Item = &PageSummary> {
        self.pages.iter().filter(|p| p.is_failed())
    }
}

pub(crate) fn format_confidence(confidence: Option<f64>) -> String {
    match confidence {
        Some(c) => format!("{:.1}%", c * 100.0),
        None => "n/a".to_string(),
    }
}
