//! pagetext - PDF page text extraction with selective OCR.
//!
//! Each page is classified on its embedded text layer: pages with enough
//! text are taken directly, the rest are rasterized and recognized. The
//! per-page results are then aggregated into a document report.

pub mod config;
pub mod models;
pub mod ocr;
pub mod pdf;
pub mod pipeline;
pub mod report;
