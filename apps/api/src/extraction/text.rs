//! Shared text helpers for the extraction strategies.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::extraction::MAX_EXTRACTED_CHARS;

static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Decodes bytes as UTF-8, replacing invalid sequences with U+FFFD instead of failing.
pub fn decode_lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Collapses every whitespace run to a single space and trims both ends.
pub fn collapse_whitespace(text: &str) -> String {
    RE_WHITESPACE.replace_all(text, " ").trim().to_string()
}

/// Keeps the first `MAX_EXTRACTED_CHARS` characters (not bytes).
pub fn truncate_chars(text: &str) -> String {
    match text.char_indices().nth(MAX_EXTRACTED_CHARS) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_lossy_replaces_invalid_bytes() {
        let decoded = decode_lossy(&[b'H', b'i', 0xFF, b'!']);
        assert_eq!(decoded, "Hi\u{FFFD}!");
    }

    #[test]
    fn test_collapse_whitespace_mixed_runs() {
        assert_eq!(collapse_whitespace("  a \n\t b\r\n c  "), "a b c");
    }

    #[test]
    fn test_collapse_whitespace_empty() {
        assert_eq!(collapse_whitespace(" \n\t "), "");
    }

    #[test]
    fn test_truncate_chars_short_input_unchanged() {
        assert_eq!(truncate_chars("hello"), "hello");
    }

    #[test]
    fn test_truncate_chars_counts_characters_not_bytes() {
        let input = "é".repeat(MAX_EXTRACTED_CHARS + 5);
        let truncated = truncate_chars(&input);
        assert_eq!(truncated.chars().count(), MAX_EXTRACTED_CHARS);
        assert_eq!(truncated.len(), MAX_EXTRACTED_CHARS * 2);
    }

    #[test]
    fn test_truncate_chars_exact_limit() {
        let input = "a".repeat(MAX_EXTRACTED_CHARS);
        assert_eq!(truncate_chars(&input), input);
    }
}
