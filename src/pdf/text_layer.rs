//! Embedded text layer extraction via `pdftotext`.

use std::process::Command;

use super::command::handle_cmd_output;
use crate::models::Page;

/// Returns the selectable text of a page, or an empty string if there is none.
///
/// Absence of text is not an error, so implementations never fail.
pub trait TextLayerExtractor: Send + Sync {
    fn extract_text(&self, page: &Page<'_>) -> String;
}

/// Text layer extractor that runs `pdftotext` on a single page.
#[derive(Debug, Clone, Default)]
pub struct PopplerTextLayer {
    /// Preserve physical layout (`-layout`), padding columns with spaces.
    layout: bool,
}

impl PopplerTextLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable `pdftotext -layout` mode.
    pub fn with_layout(mut self, layout: bool) -> Self {
        self.layout = layout;
        self
    }
}

impl TextLayerExtractor for PopplerTextLayer {
    fn extract_text(&self, page: &Page<'_>) -> String {
        let page_str = page.index().to_string();
        let mut cmd = Command::new("pdftotext");
        if self.layout {
            cmd.arg("-layout");
        }
        let output = cmd
            .args(["-enc", "UTF-8", "-f", &page_str, "-l", &page_str])
            .arg(page.document().path())
            .arg("-") // Output to stdout
            .output();

        match handle_cmd_output(
            output,
            "pdftotext (install poppler-utils)",
            &format!("pdftotext failed on page {}", page.index()),
        ) {
            Ok(text) => strip_page_break(&text).to_string(),
            Err(e) => {
                tracing::debug!(
                    "No text layer for page {} of {}: {}",
                    page.index(),
                    page.document().filename(),
                    e
                );
                String::new()
            }
        }
    }
}

/// Drop the form feed and trailing newlines `pdftotext` appends to each page.
fn strip_page_break(text: &str) -> &str {
    text.trim_end_matches(['\x0c', '\n', '\r'])
}
