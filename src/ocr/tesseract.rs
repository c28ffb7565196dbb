//! Tesseract OCR engine implementation.
//!
//! Uses Tesseract via command-line in TSV mode so each recognized word comes
//! back with its bounding box and confidence.

use std::ffi::OsString;
use std::process::Command;

use super::backend::{BoundingBox, Detection, OcrEngine, OcrEngineError};
use super::languages;
use crate::pdf::{check_binary, RasterImage};

/// TSV row level for individual words.
const WORD_LEVEL: u32 = 5;

/// Tesseract OCR engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TesseractEngine {
    /// Page segmentation mode (`--psm`); Tesseract's default when unset.
    psm: Option<u8>,
}

impl TesseractEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page segmentation mode.
    pub fn with_psm(mut self, psm: u8) -> Self {
        self.psm = Some(psm);
        self
    }

    /// Languages with traineddata installed, as reported by `tesseract --list-langs`.
    pub fn installed_languages() -> Result<Vec<String>, OcrEngineError> {
        let output = Command::new("tesseract").arg("--list-langs").output();
        match output {
            Ok(output) if output.status.success() => {
                // Older versions print the list on stderr
                let mut text = String::from_utf8_lossy(&output.stdout).to_string();
                if text.trim().is_empty() {
                    text = String::from_utf8_lossy(&output.stderr).to_string();
                }
                Ok(parse_language_list(&text))
            }
            Ok(output) => Err(OcrEngineError::OcrFailed(format!(
                "tesseract --list-langs failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            ))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(OcrEngineError::BackendNotAvailable(
                    "tesseract not found (install tesseract-ocr)".to_string(),
                ))
            }
            Err(e) => Err(OcrEngineError::Io(e)),
        }
    }

    /// Map language codes to a Tesseract `-l` argument (`eng+fra`).
    fn language_arg(languages: &[String]) -> Result<String, OcrEngineError> {
        let codes = languages
            .iter()
            .map(|code| {
                languages::to_tesseract(code)
                    .ok_or_else(|| OcrEngineError::UnsupportedLanguage(code.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        if codes.is_empty() {
            return Err(OcrEngineError::UnsupportedLanguage(String::new()));
        }
        Ok(codes.join("+"))
    }

    /// Command-line arguments for one TSV recognition run.
    fn command_args(&self, image: &RasterImage, lang: &str) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            image.path().into(),
            "stdout".into(),
            "-l".into(),
            lang.into(),
            "--dpi".into(),
            image.dpi().to_string().into(),
        ];
        if let Some(psm) = self.psm {
            args.push("--psm".into());
            args.push(psm.to_string().into());
        }
        args.push("tsv".into());
        args
    }

    /// Run Tesseract on an image file, returning raw TSV.
    fn run_tesseract(&self, image: &RasterImage, lang: &str) -> Result<String, OcrEngineError> {
        let output = Command::new("tesseract")
            .args(self.command_args(image, lang))
            .output();

        match output {
            Ok(output) => {
                if output.status.success() {
                    Ok(String::from_utf8_lossy(&output.stdout).to_string())
                } else {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    Err(OcrEngineError::OcrFailed(format!(
                        "tesseract failed: {}",
                        stderr.trim()
                    )))
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(OcrEngineError::BackendNotAvailable(
                    "tesseract not found (install tesseract-ocr)".to_string(),
                ))
            }
            Err(e) => Err(OcrEngineError::Io(e)),
        }
    }
}

impl OcrEngine for TesseractEngine {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn is_available(&self) -> bool {
        check_binary("tesseract")
    }

    fn availability_hint(&self) -> String {
        if !check_binary("tesseract") {
            "Tesseract not installed. Install with: apt install tesseract-ocr".to_string()
        } else if !check_binary("pdftoppm") {
            "pdftoppm not installed. Install with: apt install poppler-utils".to_string()
        } else {
            "Tesseract is available".to_string()
        }
    }

    fn recognize(
        &self,
        image: &RasterImage,
        languages: &[String],
    ) -> Result<Vec<Detection>, OcrEngineError> {
        let lang = Self::language_arg(languages)?;
        let tsv = self.run_tesseract(image, &lang)?;
        Ok(parse_tsv(&tsv))
    }
}

/// Parse Tesseract TSV output into word detections in reading order.
///
/// Structural rows (page, block, paragraph, line) and words with a confidence
/// of -1 or empty text are skipped. Confidences are scaled from 0-100 to 0-1.
fn parse_tsv(tsv: &str) -> Vec<Detection> {
    tsv.lines()
        .filter(|line| !line.starts_with("level"))
        .filter_map(|line| {
            let cols: Vec<&str> = line.splitn(12, '\t').collect();
            if cols.len() < 12 {
                return None;
            }
            let level: u32 = cols[0].parse().ok()?;
            if level != WORD_LEVEL {
                return None;
            }
            let conf: f64 = cols[10].trim().parse().ok()?;
            let text = cols[11].trim();
            if conf < 0.0 || text.is_empty() {
                return None;
            }
            let left: f64 = cols[6].parse().ok()?;
            let top: f64 = cols[7].parse().ok()?;
            let width: f64 = cols[8].parse().ok()?;
            let height: f64 = cols[9].parse().ok()?;
            Some(Detection::new(
                text,
                BoundingBox::rect(left, top, width, height),
                conf / 100.0,
            ))
        })
        .collect()
}

fn parse_language_list(output: &str) -> Vec<String> {
    output
        .lines()
        .skip_while(|line| !line.starts_with("List of available languages"))
        .skip(1)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_TSV: &str = "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext
1\t1\t0\t0\t0\t0\t0\t0\t1700\t2200\t-1\t
2\t1\t1\t0\t0\t0\t120\t80\t600\t40\t-1\t
4\t1\t1\t1\t1\t0\t120\t80\t600\t40\t-1\t
5\t1\t1\t1\t1\t1\t120\t80\t210\t40\t91.5\tAnnual
5\t1\t1\t1\t1\t2\t350\t80\t220\t40\t88.5\tReport
5\t1\t1\t1\t1\t3\t590\t80\t130\t40\t-1\t
5\t1\t1\t1\t1\t4\t600\t80\t120\t40\t80\t2023
";

    #[test]
    fn test_parse_tsv_words_only() {
        let detections = parse_tsv(SAMPLE_TSV);
        let texts: Vec<&str> = detections.iter().map(Detection::text).collect();
        assert_eq!(texts, vec!["Annual", "Report", "2023"]);
        assert!((detections[0].confidence() - 0.915).abs() < 1e-9);
        assert_eq!(detections[2].confidence(), 0.8);
        assert_eq!(
            *detections[1].bbox(),
            BoundingBox::rect(350.0, 80.0, 220.0, 40.0)
        );
    }

    #[test]
    fn test_parse_tsv_blank_page() {
        let tsv = "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext\n1\t1\t0\t0\t0\t0\t0\t0\t1700\t2200\t-1\t\n";
        assert!(parse_tsv(tsv).is_empty());
    }

    #[test]
    fn test_language_arg() {
        let langs = vec!["en".to_string(), "fr".to_string()];
        assert_eq!(TesseractEngine::language_arg(&langs).unwrap(), "eng+fra");

        let bad = vec!["en".to_string(), "klingon".to_string()];
        assert!(matches!(
            TesseractEngine::language_arg(&bad),
            Err(OcrEngineError::UnsupportedLanguage(code)) if code == "klingon"
        ));
    }

    #[test]
    fn test_unsupported_language_fails_before_running() {
        let image = RasterImage::from_path("/nonexistent/page-1.png", 200);
        let err = TesseractEngine::new()
            .recognize(&image, &["zz".to_string()])
            .unwrap_err();
        assert!(matches!(err, OcrEngineError::UnsupportedLanguage(_)));
    }

    #[test]
    fn test_parse_language_list() {
        let output = "List of available languages in \"/usr/share/tesseract-ocr/5/tessdata/\" (3):\neng\nfra\nosd\n";
        assert_eq!(parse_language_list(output), vec!["eng", "fra", "osd"]);
    }

    #[test]
    fn test_command_args_with_psm() {
        let image = RasterImage::from_path("/tmp/page-1.png", 300);
        let plain = TesseractEngine::new().command_args(&image, "eng+fra");
        assert_eq!(
            plain,
            ["/tmp/page-1.png", "stdout", "-l", "eng+fra", "--dpi", "300", "tsv"]
                .map(OsString::from)
                .to_vec()
        );

        let sparse = TesseractEngine::new().with_psm(11).command_args(&image, "eng");
        let tail: Vec<&OsString> = sparse.iter().rev().take(3).collect();
        assert_eq!(tail, vec!["tsv", "11", "--psm"]);
    }
}
