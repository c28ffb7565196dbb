//! Page rasterization via `pdftoppm`.

use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;
use thiserror::Error;

use super::command::{check_cmd_status, ToolError};
use crate::models::Page;

/// The page image could not be produced.
#[derive(Debug, Error)]
pub enum RasterizationError {
    #[error("External tool not found: {0}")]
    ToolNotFound(String),

    #[error("Rasterization failed: {0}")]
    Failed(String),

    #[error("No image generated for page {0}")]
    NoImage(u32),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ToolError> for RasterizationError {
    fn from(err: ToolError) -> Self {
        match err {
            ToolError::NotFound(tool) => Self::ToolNotFound(tool),
            ToolError::Failed(msg) => Self::Failed(msg),
            ToolError::Io(e) => Self::Io(e),
        }
    }
}

/// A rendered page image.
///
/// When the image lives in a temporary directory the directory is owned by
/// this value and removed when it is dropped.
#[derive(Debug)]
pub struct RasterImage {
    path: PathBuf,
    dpi: u32,
    _dir: Option<TempDir>,
}

impl RasterImage {
    /// Image stored in a temporary directory owned by the image.
    pub fn in_temp_dir(dir: TempDir, path: PathBuf, dpi: u32) -> Self {
        Self {
            path,
            dpi,
            _dir: Some(dir),
        }
    }

    /// Image at a path the caller keeps alive.
    pub fn from_path(path: impl Into<PathBuf>, dpi: u32) -> Self {
        Self {
            path: path.into(),
            dpi,
            _dir: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dpi(&self) -> u32 {
        self.dpi
    }
}

/// Renders a page to an image at the given resolution.
pub trait PageRasterizer: Send + Sync {
    fn rasterize(&self, page: &Page<'_>, dpi: u32) -> Result<RasterImage, RasterizationError>;
}

/// Rasterizer that runs `pdftoppm` for a single page into a temp directory.
#[derive(Debug, Clone, Default)]
pub struct PopplerRasterizer;

impl PopplerRasterizer {
    pub fn new() -> Self {
        Self
    }

    /// Find the image file for a specific page number.
    fn find_page_image(&self, temp_path: &Path, page_num: u32) -> Option<PathBuf> {
        // pdftoppm names files like page-01.png, page-02.png, etc.
        // For documents with many pages, it may use more digits: page-001.png
        for digits in [1, 2, 3, 4, 5] {
            let filename = format!("page-{:0width$}.png", page_num, width = digits);
            let path = temp_path.join(&filename);
            if path.exists() {
                return Some(path);
            }
        }
        None
    }
}

impl PageRasterizer for PopplerRasterizer {
    fn rasterize(&self, page: &Page<'_>, dpi: u32) -> Result<RasterImage, RasterizationError> {
        let temp_dir = TempDir::new()?;
        let output_prefix = temp_dir.path().join("page");

        let page_str = page.index().to_string();
        let dpi_str = dpi.to_string();
        let status = Command::new("pdftoppm")
            .args(["-png", "-r", &dpi_str, "-f", &page_str, "-l", &page_str])
            .arg(page.document().path())
            .arg(&output_prefix)
            .status();

        check_cmd_status(
            status,
            "pdftoppm (install poppler-utils)",
            &format!("pdftoppm failed to convert page {}", page.index()),
        )?;

        let image_path = self
            .find_page_image(temp_dir.path(), page.index())
            .ok_or(RasterizationError::NoImage(page.index()))?;

        Ok(RasterImage::in_temp_dir(temp_dir, image_path, dpi))
    }
}
