//! PDF collaborators: document loading, text layer extraction, rasterization.
//!
//! The default implementations shell out to Poppler:
//! - `pdfinfo` for page counts
//! - `pdftotext` for the embedded text layer of a single page
//! - `pdftoppm` to render a single page to PNG

mod command;
mod loader;
mod rasterizer;
mod text_layer;

pub use command::{check_binary, ToolError};
pub use loader::{DocumentLoadError, DocumentLoader, PopplerLoader};
pub use rasterizer::{PageRasterizer, PopplerRasterizer, RasterImage, RasterizationError};
pub use text_layer::{PopplerTextLayer, TextLayerExtractor};

/// Poppler tools required for PDF processing.
pub const POPPLER_TOOLS: &[&str] = &["pdfinfo", "pdftotext", "pdftoppm"];
