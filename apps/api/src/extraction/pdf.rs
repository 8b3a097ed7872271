//! PDF strategy — scrapes string literals out of content streams.
//!
//! No object graph, no filter decompression. Text shown by `Tj`/`TJ` operators
//! in uncompressed streams is recovered; anything else drops to the
//! readable-ASCII fallback.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::extraction::text::{collapse_whitespace, truncate_chars};

static RE_STREAM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)stream\r?\n(.*?)endstream").unwrap());

/// A parenthesized string literal. Backslash escapes are consumed as a pair so
/// `\)` does not close the literal early.
static RE_STRING_LITERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\(((?:[^\\)]|\\.)*)\)").unwrap());

static RE_NON_READABLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\x20-\x7E\n\r\t]").unwrap());

/// Tokens that are PDF file structure, never document text.
const STRUCTURAL_KEYWORDS: &[&str] = &[
    "obj",
    "endobj",
    "stream",
    "endstream",
    "xref",
    "trailer",
    "startxref",
];

/// Escape tokens and their replacements, applied one after another in this order.
const ESCAPES: &[(&str, &str)] = &[
    ("\\n", "\n"),
    ("\\r", "\r"),
    ("\\(", "("),
    ("\\)", ")"),
    ("\\\\", "\\"),
];

pub fn extract(raw: &str) -> String {
    let runs = scrape_stream_runs(raw);
    if !runs.is_empty() {
        debug!("PDF: {} text runs scraped from content streams", runs.len());
        return runs.join(" ");
    }

    debug!("PDF: no text runs in content streams, using readable-ASCII fallback");
    readable_fallback(raw)
}

/// Collects every non-blank string literal inside every `stream ... endstream` block.
fn scrape_stream_runs(raw: &str) -> Vec<String> {
    let mut runs = Vec::new();
    for stream in RE_STREAM.captures_iter(raw) {
        let content = &stream[1];
        for literal in RE_STRING_LITERAL.captures_iter(content) {
            let text = unescape_literal(&literal[1]);
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                runs.push(trimmed.to_string());
            }
        }
    }
    runs
}

fn unescape_literal(literal: &str) -> String {
    ESCAPES
        .iter()
        .fold(literal.to_string(), |acc, (token, replacement)| {
            acc.replace(token, replacement)
        })
}

/// Keeps readable words from the raw buffer, dropping names, numbers and
/// file-structure keywords.
fn readable_fallback(raw: &str) -> String {
    let readable = RE_NON_READABLE.replace_all(raw, " ");
    let readable = collapse_whitespace(&readable);

    let words: Vec<&str> = readable
        .split(' ')
        .filter(|w| w.len() > 2)
        .filter(|w| !w.starts_with('/'))
        .filter(|w| !w.bytes().all(|b| b.is_ascii_digit()))
        .filter(|w| !STRUCTURAL_KEYWORDS.contains(w))
        .collect();

    truncate_chars(&words.join(" "))
}
