//! Loaded PDF documents and the pages they expose.
//!
//! A `Document` is immutable once loaded. Pages are lightweight views that
//! borrow their document; the collaborators that need the underlying file
//! (text layer, rasterizer) reach it through `Page::document()`.

use std::path::{Path, PathBuf};

use serde::Serialize;

/// A loaded PDF: an ordered sequence of pages identified by filename and size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    /// Display name (final path component).
    filename: String,
    /// Size of the file in bytes.
    byte_size: u64,
    /// Path to the file on disk.
    path: PathBuf,
    /// Number of pages reported by the loader.
    page_count: u32,
}

impl Document {
    /// Create a document descriptor. The filename is taken from the path.
    pub fn new(path: impl Into<PathBuf>, byte_size: u64, page_count: u32) -> Self {
        let path = path.into();
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
        Self {
            filename,
            byte_size,
            path,
            page_count,
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn byte_size(&self) -> u64 {
        self.byte_size
    }

    /// File size in megabytes, as shown to users.
    pub fn size_mb(&self) -> f64 {
        self.byte_size as f64 / (1024.0 * 1024.0)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    /// Get a page by its 1-based index.
    pub fn page(&self, index: u32) -> Option<Page<'_>> {
        (1..=self.page_count)
            .contains(&index)
            .then_some(Page {
                index,
                document: self,
            })
    }

    /// Iterate pages in index order.
    pub fn pages(&self) -> impl Iterator<Item = Page<'_>> + '_ {
        (1..=self.page_count).map(move |index| Page {
            index,
            document: self,
        })
    }

    /// File stem used for naming output files (`report` for `report.pdf`).
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "document".to_string())
    }
}

/// One page of a document. Indices are 1-based and stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page<'a> {
    index: u32,
    document: &'a Document,
}

impl<'a> Page<'a> {
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn document(&self) -> &'a Document {
        self.document
    }
}
