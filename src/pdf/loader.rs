//! Document loading: validate the input is a PDF and read its page count.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

use super::command::{handle_cmd_output, ToolError};
use crate::models::Document;

/// The input could not be loaded as a document. Fatal for the whole run.
#[derive(Debug, Error)]
pub enum DocumentLoadError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Not a PDF document: {path} (detected {detected})")]
    NotPdf { path: PathBuf, detected: String },

    #[error("File size {size_mb:.2} MB exceeds the {limit_mb} MB limit")]
    TooLarge { size_mb: f64, limit_mb: u64 },

    #[error("Document has no pages: {0}")]
    NoPages(PathBuf),

    #[error("Could not read PDF structure: {0}")]
    Unreadable(String),

    #[error("External tool not found: {0}")]
    ToolNotFound(String),
}

impl From<ToolError> for DocumentLoadError {
    fn from(err: ToolError) -> Self {
        match err {
            ToolError::NotFound(tool) => Self::ToolNotFound(tool),
            ToolError::Failed(msg) => Self::Unreadable(msg),
            ToolError::Io(e) => Self::Unreadable(e.to_string()),
        }
    }
}

/// Opens a file and produces a `Document`.
pub trait DocumentLoader {
    fn load(&self, path: &Path) -> Result<Document, DocumentLoadError>;
}

/// Loader backed by content sniffing and `pdfinfo`.
#[derive(Debug, Clone, Default)]
pub struct PopplerLoader {
    /// Reject files larger than this many megabytes.
    max_size_mb: Option<u64>,
}

impl PopplerLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum accepted file size in megabytes.
    pub fn with_max_size_mb(mut self, limit_mb: u64) -> Self {
        self.max_size_mb = Some(limit_mb);
        self
    }

    /// Check file size and magic bytes before invoking any external tool.
    fn validate(&self, path: &Path) -> Result<u64, DocumentLoadError> {
        let io_err = |source| DocumentLoadError::Io {
            path: path.to_path_buf(),
            source,
        };

        let byte_size = std::fs::metadata(path).map_err(io_err)?.len();

        if let Some(limit_mb) = self.max_size_mb {
            if byte_size > limit_mb.saturating_mul(1024 * 1024) {
                return Err(DocumentLoadError::TooLarge {
                    size_mb: byte_size as f64 / (1024.0 * 1024.0),
                    limit_mb,
                });
            }
        }

        // Read first 8KB for magic byte detection
        let mut file = File::open(path).map_err(io_err)?;
        let mut buffer = [0u8; 8192];
        let bytes_read = file.read(&mut buffer).map_err(io_err)?;

        let detected = infer::get(&buffer[..bytes_read])
            .map(|t| t.mime_type())
            .unwrap_or("unknown");
        if detected != "application/pdf" {
            return Err(DocumentLoadError::NotPdf {
                path: path.to_path_buf(),
                detected: detected.to_string(),
            });
        }

        Ok(byte_size)
    }

    /// Get the page count of a PDF.
    fn page_count(&self, path: &Path) -> Result<u32, DocumentLoadError> {
        let output = Command::new("pdfinfo").arg(path).output();
        let stdout = handle_cmd_output(
            output,
            "pdfinfo (install poppler-utils)",
            "pdfinfo failed",
        )?;
        parse_page_count(&stdout).ok_or_else(|| {
            DocumentLoadError::Unreadable("pdfinfo reported no page count".to_string())
        })
    }
}

impl DocumentLoader for PopplerLoader {
    fn load(&self, path: &Path) -> Result<Document, DocumentLoadError> {
        let byte_size = self.validate(path)?;
        let page_count = self.page_count(path)?;
        if page_count == 0 {
            return Err(DocumentLoadError::NoPages(path.to_path_buf()));
        }

        tracing::debug!(
            "Loaded {} ({} bytes, {} pages)",
            path.display(),
            byte_size,
            page_count
        );
        Ok(Document::new(path, byte_size, page_count))
    }
}

/// Extract the `Pages:` value from `pdfinfo` output.
fn parse_page_count(pdfinfo: &str) -> Option<u32> {
    pdfinfo
        .lines()
        .find(|line| line.starts_with("Pages:"))
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|s| s.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_page_count() {
        let info = "Producer:       LibreOffice\nPages:          12\nEncrypted:      no\n";
        assert_eq!(parse_page_count(info), Some(12));
        assert_eq!(parse_page_count("Title: x\n"), None);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = PopplerLoader::new()
            .load(Path::new("/nonexistent/pagetext/input.pdf"))
            .unwrap_err();
        assert!(matches!(err, DocumentLoadError::Io { .. }));
    }

    #[test]
    fn test_non_pdf_rejected_before_pdfinfo() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.pdf");
        std::fs::write(&path, b"just some plain text, not a pdf").unwrap();

        let err = PopplerLoader::new().load(&path).unwrap_err();
        assert!(matches!(err, DocumentLoadError::NotPdf { .. }));
    }

    #[test]
    fn test_size_limit() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("huge.pdf");
        let mut content = b"%PDF-1.4\n".to_vec();
        content.resize(2 * 1024 * 1024, b' ');
        std::fs::write(&path, &content).unwrap();

        let err = PopplerLoader::new()
            .with_max_size_mb(1)
            .load(&path)
            .unwrap_err();
        match err {
            DocumentLoadError::TooLarge { limit_mb, size_mb } => {
                assert_eq!(limit_mb, 1);
                assert!(size_mb > 1.9);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unbounded_size_limit_does_not_overflow() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("small.pdf");
        std::fs::write(&path, b"plain text").unwrap();

        for limit in [u64::MAX, u64::MAX / 1024] {
            let err = PopplerLoader::new()
                .with_max_size_mb(limit)
                .load(&path)
                .unwrap_err();
            assert!(matches!(err, DocumentLoadError::NotPdf { .. }));
        }
    }
}
