//! DOCX strategy — scans the decoded buffer for `<w:t>` text runs.
//!
//! The container is not unzipped. Only buffers whose decoded text exposes the
//! literal `<w:t>` markers yield clean runs; everything else drops to tag stripping.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::extraction::text::{collapse_whitespace, truncate_chars};

static RE_TEXT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"<w:t[^>]*>([^<]*)</w:t>").unwrap());

static RE_ANY_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());

pub fn extract(raw: &str) -> String {
    let runs: Vec<&str> = RE_TEXT_RUN
        .captures_iter(raw)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().trim())
        .filter(|run| !run.is_empty())
        .collect();

    if !runs.is_empty() {
        debug!("DOCX: {} <w:t> runs found", runs.len());
        return runs.join(" ");
    }

    debug!("DOCX: no <w:t> runs found, stripping tags from raw text");
    let stripped = RE_ANY_TAG.replace_all(raw, " ");
    truncate_chars(&collapse_whitespace(&stripped))
}
