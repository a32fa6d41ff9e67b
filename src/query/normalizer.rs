//! Query text normalization.
//!
//! Raw query text typed into a search box is cleaned before it is used as a
//! cache key, sent to sources, or recorded in analytics:
//!
//! 1. the characters `<`, `>`, `"` and `'` are stripped,
//! 2. the text is lowercased,
//! 3. whitespace runs collapse to a single space and the ends are trimmed,
//! 4. the result is truncated to the maximum length (200 grapheme clusters
//!    by default, so combining marks are never split from their base).
//!
//! Normalization never fails and is idempotent.

use lazy_static::lazy_static;
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

/// Default maximum normalized query length, in grapheme clusters.
pub const DEFAULT_MAX_QUERY_LENGTH: usize = 200;

lazy_static! {
    static ref UNSAFE_CHARS: Regex = Regex::new(r#"[<>"']"#).unwrap();
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
}

/// Normalizes raw query text.
#[derive(Debug, Clone)]
pub struct QueryNormalizer {
    max_length: usize,
}

impl Default for QueryNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_QUERY_LENGTH)
    }
}

impl QueryNormalizer {
    /// Create a normalizer truncating to `max_length` grapheme clusters.
    pub fn new(max_length: usize) -> Self {
        Self { max_length }
    }

    /// Maximum output length in grapheme clusters.
    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Normalize `raw`. Always returns a string, possibly empty.
    pub fn normalize(&self, raw: &str) -> String {
        let stripped = UNSAFE_CHARS.replace_all(raw, "");
        let lowered = stripped.to_lowercase();
        let collapsed = WHITESPACE_RUN.replace_all(lowered.trim(), " ");

        if collapsed.graphemes(true).count() <= self.max_length {
            return collapsed.into_owned();
        }

        let truncated: String = collapsed.graphemes(true).take(self.max_length).collect();
        truncated.trim_end().to_string()
    }

    /// Length of a normalized query, in grapheme clusters.
    pub fn length(normalized: &str) -> usize {
        normalized.graphemes(true).count()
    }
}

/// Normalize with the default settings.
pub fn normalize(raw: &str) -> String {
    QueryNormalizer::default().normalize(raw)
}

/// Split a normalized query into whitespace-separated tokens.
pub fn tokenize(normalized: &str) -> impl Iterator<Item = &str> {
    normalized.split_whitespace()
}
