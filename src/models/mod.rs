//! Data models for pagetext.

mod document;
mod page_result;
mod report;

pub use document::{Document, Page};
pub use page_result::{ExtractionMode, PageError, PageErrorKind, PageResult};
pub use report::{DocumentReport, PageSummary, TextStats};
