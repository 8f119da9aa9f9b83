//! Derived fields: reading time, excerpts and slugs

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Reading speed used when nothing else is configured
pub const DEFAULT_WORDS_PER_MINUTE: u32 = 200;

/// Excerpt length used when nothing else is configured
pub const DEFAULT_EXCERPT_LENGTH: usize = 200;

const ELLIPSIS: &str = "...";

lazy_static! {
    static ref HEADING_MARKER: Regex = Regex::new(r"(?m)^#{1,6}[ \t]+").unwrap();
    static ref BOLD: Regex = Regex::new(r"\*\*(.*?)\*\*").unwrap();
    static ref ITALIC: Regex = Regex::new(r"\*(.*?)\*").unwrap();
    static ref LINK: Regex = Regex::new(r"\[([^\]]+)\]\([^)]+\)").unwrap();
    static ref INLINE_CODE: Regex = Regex::new(r"`([^`]+)`").unwrap();
    static ref NEWLINES: Regex = Regex::new(r"[\r\n]+").unwrap();
    static ref NON_SLUG_CHARS: Regex = Regex::new(r"[^\w\s-]").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref HYPHENS: Regex = Regex::new(r"-+").unwrap();
}

/// A table of contents entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    /// Heading level, 1 through 6
    pub level: u8,
    pub text: String,
    /// Anchor id of the heading
    pub slug: String,
}

/// Estimated reading time in minutes, rounded up.
///
/// Markdown syntax is counted as words, so this is an approximation of the
/// prose word count.
pub fn reading_time(body: &str, words_per_minute: u32) -> u32 {
    let words = body.split_whitespace().count() as u64;
    let wpm = u64::from(words_per_minute.max(1));
    words.div_ceil(wpm) as u32
}

/// Markup-stripped preview of a body, cut at a word boundary.
///
/// The result is at most `max_len` characters plus a trailing `...` when the
/// text had to be truncated.
pub fn extract_excerpt(body: &str, max_len: usize) -> String {
    let plain = strip_markdown(body);

    let chars: Vec<char> = plain.chars().collect();
    if chars.len() <= max_len {
        return plain;
    }

    // Cut exactly at max_len when a word ends there, otherwise at the last
    // whitespace before it.
    let cut = if chars[max_len].is_whitespace() {
        max_len
    } else {
        chars[..max_len]
            .iter()
            .rposition(|c| c.is_whitespace())
            .unwrap_or(0)
    };

    let kept: String = chars[..cut].iter().collect();
    format!("{}{}", kept.trim_end(), ELLIPSIS)
}

fn strip_markdown(body: &str) -> String {
    let text = HEADING_MARKER.replace_all(body, "");
    let text = BOLD.replace_all(&text, "$1");
    let text = ITALIC.replace_all(&text, "$1");
    let text = LINK.replace_all(&text, "$1");
    let text = INLINE_CODE.replace_all(&text, "$1");
    let text = NEWLINES.replace_all(&text, " ");
    text.trim().to_string()
}

/// URL-safe slug: lowercase, accent-free, hyphen separated
pub fn generate_slug(text: &str) -> String {
    let ascii = unidecode::unidecode(text.trim()).to_lowercase();
    let cleaned = NON_SLUG_CHARS.replace_all(&ascii, "");
    let hyphenated = WHITESPACE.replace_all(&cleaned, "-");
    let collapsed = HYPHENS.replace_all(&hyphenated, "-");
    collapsed.trim_matches('-').to_string()
}

/// Hands out unique heading anchors within one document.
///
/// The first occurrence of a slug is used as is, repeats get `-1`, `-2`, ...
#[derive(Debug, Default)]
pub struct SlugTracker {
    seen: HashMap<String, usize>,
}

impl SlugTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unique(&mut self, text: &str) -> String {
        let base = generate_slug(text);
        let mut candidate = base.clone();
        while let Some(count) = self.seen.get_mut(&candidate) {
            *count += 1;
            candidate = format!("{}-{}", base, count);
        }
        self.seen.insert(candidate.clone(), 0);
        candidate
    }

    /// Anchor for a heading: an explicit `{#id}` wins, otherwise a unique slug
    pub fn anchor(&mut self, explicit: Option<&str>, text: &str) -> String {
        match explicit.map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => id.to_string(),
            None => self.unique(text),
        }
    }
}
