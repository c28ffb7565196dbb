//! On-disk store for the ONNX model files of model-based engines.

use std::path::{Path, PathBuf};
use std::process::Command;

use super::backend::OcrEngineError;
use crate::pdf::check_binary;

/// One downloadable model file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelFile {
    pub name: &'static str,
    pub url: &'static str,
    /// Approximate download size, for log messages.
    pub approx_mb: u32,
}

/// PP-OCRv4 text detection model.
pub const PADDLE_DET: ModelFile = ModelFile {
    name: "ch_PP-OCRv4_det_infer.onnx",
    url: "https://huggingface.co/SWHL/RapidOCR/resolve/main/PP-OCRv4/ch_PP-OCRv4_det_infer.onnx",
    approx_mb: 4,
};

/// PP-OCRv4 recognition model (Chinese/English).
pub const PADDLE_REC: ModelFile = ModelFile {
    name: "ch_PP-OCRv4_rec_infer.onnx",
    url: "https://huggingface.co/SWHL/RapidOCR/resolve/main/PP-OCRv4/ch_PP-OCRv4_rec_infer.onnx",
    approx_mb: 10,
};

/// Text orientation classifier.
pub const PADDLE_CLS: ModelFile = ModelFile {
    name: "ch_ppocr_mobile_v2.0_cls_infer.onnx",
    url: "https://www.modelscope.cn/models/RapidAI/RapidOCR/resolve/v3.4.0/onnx/PP-OCRv4/cls/ch_ppocr_mobile_v2.0_cls_infer.onnx",
    approx_mb: 1,
};

pub const PADDLE_MODELS: &[ModelFile] = &[PADDLE_DET, PADDLE_REC, PADDLE_CLS];

/// Directory holding the model files for one engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelStore {
    dir: PathBuf,
}

impl ModelStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Use `configured` when set, otherwise `<data dir>/pagetext/models/<engine>`.
    pub fn resolve(configured: Option<&Path>, engine: &str) -> Self {
        match configured {
            Some(dir) => Self::new(dir),
            None => Self::new(
                dirs::data_dir()
                    .or_else(dirs::home_dir)
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("pagetext")
                    .join("models")
                    .join(engine),
            ),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_of(&self, file: &ModelFile) -> PathBuf {
        self.dir.join(file.name)
    }

    /// Files not yet present. Interrupted downloads never count as present.
    pub fn missing<'a>(&self, files: &'a [ModelFile]) -> Vec<&'a ModelFile> {
        files.iter().filter(|f| !self.path_of(f).is_file()).collect()
    }

    pub fn is_complete(&self, files: &[ModelFile]) -> bool {
        self.missing(files).is_empty()
    }

    /// Download every missing file with `curl`.
    ///
    /// Each file goes to a `.part` sibling first and is renamed into place
    /// once complete.
    pub fn fetch_missing(&self, files: &[ModelFile]) -> Result<(), OcrEngineError> {
        let missing = self.missing(files);
        if missing.is_empty() {
            return Ok(());
        }
        if !check_binary("curl") {
            return Err(OcrEngineError::ModelNotFound(format!(
                "{} model file(s) missing from {} and curl is not installed",
                missing.len(),
                self.dir.display()
            )));
        }

        std::fs::create_dir_all(&self.dir)?;
        for file in missing {
            tracing::info!("Downloading {} (~{} MB)", file.name, file.approx_mb);
            let dest = self.path_of(file);
            let partial = self.dir.join(format!("{}.part", file.name));
            let status = Command::new("curl")
                .args(["--fail", "--location", "--silent", "--show-error", "--output"])
                .arg(&partial)
                .arg(file.url)
                .status()?;
            if !status.success() {
                let _ = std::fs::remove_file(&partial);
                return Err(OcrEngineError::ModelNotFound(format!(
                    "download of {} failed ({})",
                    file.url, status
                )));
            }
            std::fs::rename(&partial, &dest)?;
        }
        Ok(())
    }
}
