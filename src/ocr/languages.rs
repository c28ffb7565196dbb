//! Supported OCR languages and their engine-specific codes.

/// A language selectable for OCR.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    /// Short code used in configuration (`en`, `ch_sim`, ...).
    pub code: &'static str,
    /// Human-readable name.
    pub name: &'static str,
    /// Tesseract traineddata name.
    pub tesseract: &'static str,
}

const fn lang(code: &'static str, name: &'static str, tesseract: &'static str) -> Language {
    Language {
        code,
        name,
        tesseract,
    }
}

/// All supported languages.
pub const LANGUAGES: &[Language] = &[
    lang("en", "English", "eng"),
    lang("ch_sim", "Chinese (Simplified)", "chi_sim"),
    lang("ch_tra", "Chinese (Traditional)", "chi_tra"),
    lang("ja", "Japanese", "jpn"),
    lang("ko", "Korean", "kor"),
    lang("hi", "Hindi", "hin"),
    lang("bn", "Bengali", "ben"),
    lang("th", "Thai", "tha"),
    lang("fr", "French", "fra"),
    lang("de", "German", "deu"),
    lang("es", "Spanish", "spa"),
    lang("ru", "Russian", "rus"),
    lang("ar", "Arabic", "ara"),
    lang("pt", "Portuguese", "por"),
    lang("it", "Italian", "ita"),
    lang("nl", "Dutch", "nld"),
];

/// Look up a language by short code or Tesseract code (case-insensitive).
pub fn find(code: &str) -> Option<&'static Language> {
    let code = code.trim().to_lowercase();
    LANGUAGES
        .iter()
        .find(|l| l.code == code || l.tesseract == code)
}

/// Map a language code to its Tesseract name.
pub fn to_tesseract(code: &str) -> Option<&'static str> {
    find(code).map(|l| l.tesseract)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_and_tesseract_codes() {
        assert_eq!(to_tesseract("en"), Some("eng"));
        assert_eq!(to_tesseract("ch_sim"), Some("chi_sim"));
        assert_eq!(to_tesseract("DEU"), Some("deu"));
        assert_eq!(to_tesseract("xx"), None);
    }

    #[test]
    fn test_codes_are_unique() {
        for (i, a) in LANGUAGES.iter().enumerate() {
            for b in &LANGUAGES[i + 1..] {
                assert_ne!(a.code, b.code);
                assert_ne!(a.tesseract, b.tesseract);
            }
        }
    }
}
