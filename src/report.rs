//! Report rendering: plain-text extraction report and JSON export.

use std::fmt::Write as _;

use serde::Serialize;

use crate::models::{Document, DocumentReport, PageResult};
use crate::pipeline::ProcessedDocument;

const RULE_WIDTH: usize = 60;

/// Render the plain-text report: a statistics header followed by every page.
pub fn render_text(
    document: &Document,
    processed: &ProcessedDocument,
    report: &DocumentReport,
) -> String {
    let heavy = "=".repeat(RULE_WIDTH);
    let light = "-".repeat(RULE_WIDTH);
    let mut out = String::new();

    let _ = writeln!(out, "{}", heavy);
    let _ = writeln!(out, "PDF TEXT EXTRACTION REPORT");
    let _ = writeln!(out, "{}", heavy);
    let _ = writeln!(
        out,
        "File: {} ({:.2} MB)",
        document.filename(),
        document.size_mb()
    );
    let _ = writeln!(out, "Total Word Count: {}", report.total_words());
    let _ = writeln!(
        out,
        "Total Character Count (with spaces): {}",
        report.total_chars_with_spaces()
    );
    let _ = writeln!(
        out,
        "Total Character Count (without spaces): {}",
        report.total_chars_without_spaces()
    );
    let _ = writeln!(out, "Total Pages Processed: {}", report.total_pages);
    let _ = writeln!(out, "Direct Pages: {}", report.direct_pages);
    let _ = writeln!(out, "OCR Pages: {}", report.ocr_pages);
    let _ = writeln!(out, "Hybrid Pages: {}", report.hybrid_pages);
    let _ = writeln!(out, "Failed Pages: {}", report.failed_pages);
    let _ = writeln!(
        out,
        "Overall OCR Confidence: {}",
        report.overall_confidence_label()
    );
    if processed.cancelled {
        let _ = writeln!(
            out,
            "Cancelled: stopped after {} of {} pages",
            processed.pages.len(),
            document.page_count()
        );
    }
    let _ = writeln!(out, "{}", heavy);

    for (summary, page) in report.pages.iter().zip(&processed.pages) {
        let _ = write!(
            out,
            "\nPAGE {} | Type: {} | Confidence: {}",
            summary.index,
            summary.mode.label(),
            summary.confidence_label()
        );
        if let Some(ref error) = summary.error {
            let _ = write!(out, " | FAILED: {}", error);
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", light);
        let _ = writeln!(out, "{}", page.text);
    }

    out
}

#[derive(Serialize)]
struct JsonReport<'a> {
    file: &'a str,
    byte_size: u64,
    page_count: u32,
    cancelled: bool,
    report: &'a DocumentReport,
    pages: &'a [PageResult],
}

/// Render the report and full page results (with bounding boxes) as JSON.
pub fn render_json(
    document: &Document,
    processed: &ProcessedDocument,
    report: &DocumentReport,
) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&JsonReport {
        file: document.filename(),
        byte_size: document.byte_size(),
        page_count: document.page_count(),
        cancelled: processed.cancelled,
        report,
        pages: &processed.pages,
    })
}
