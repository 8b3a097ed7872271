//! Document Text Extractor — turns an uploaded resume (PDF or DOCX bytes) into
//! flat plain text for scoring.
//!
//! Best-effort scraping, not parsing. `extract_text` never fails: when a
//! strategy finds nothing structured it falls back to a cleaned-up view of the
//! raw bytes, and the caller decides whether the result is usable via
//! [`has_enough_text`].
//!
//! Pure and stateless. CPU-bound on large inputs, so async callers should run it
//! inside `tokio::task::spawn_blocking`.

pub mod docx;
pub mod pdf;
pub mod text;

use serde::Serialize;

/// Fallback paths never return more than this many characters.
pub const MAX_EXTRACTED_CHARS: usize = 10_000;

/// Minimum trimmed length for extracted text to be worth scoring.
pub const MIN_EXTRACTED_CHARS: usize = 20;

/// Format tag, derived from the filename suffix only. Content is never sniffed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Unknown,
}

impl DocumentFormat {
    /// Case-sensitive suffix match: `resume.PDF` is `Unknown`.
    pub fn from_file_name(file_name: &str) -> Self {
        if file_name.ends_with(".pdf") {
            DocumentFormat::Pdf
        } else if file_name.ends_with(".docx") {
            DocumentFormat::Docx
        } else {
            DocumentFormat::Unknown
        }
    }

    pub fn is_supported_upload(self) -> bool {
        !matches!(self, DocumentFormat::Unknown)
    }
}

/// Extracts best-effort plain text from `bytes`, choosing a strategy by `file_name`.
///
/// Note: the PDF and DOCX success paths return all scraped runs without
/// re-applying the length cap; only fallbacks and the unknown-format path
/// are truncated.
pub fn extract_text(bytes: &[u8], file_name: &str) -> String {
    let raw = text::decode_lossy(bytes);

    match DocumentFormat::from_file_name(file_name) {
        DocumentFormat::Pdf => pdf::extract(&raw),
        DocumentFormat::Docx => docx::extract(&raw),
        DocumentFormat::Unknown => text::truncate_chars(&raw),
    }
}

/// Quality gate on extractor output.
pub fn has_enough_text(text: &str) -> bool {
    text.trim().chars().count() >= MIN_EXTRACTED_CHARS
}
