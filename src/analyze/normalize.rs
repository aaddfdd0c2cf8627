//! Text normalization for raw extracted runs.
//!
//! Cleans the artifacts PDF extraction leaves behind: control characters,
//! ligature code points, collapsed-to-nothing whitespace runs, page-number
//! lines, and soft hyphenation at line breaks. Normalization is idempotent:
//! feeding an already-clean string back through returns it unchanged.

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Left-margin tolerance (points) for treating two lines as belonging to the
/// same text column when rejoining hyphenated words.
const HYPHEN_MARGIN_TOLERANCE: f32 = 20.0;

/// Text normalizer with precompiled artifact patterns.
pub struct TextNormalizer {
    page_number: Regex,
    page_of: Regex,
    ligatures: Vec<(&'static str, &'static str)>,
}

impl TextNormalizer {
    /// Create a normalizer.
    pub fn new() -> Self {
        Self {
            page_number: Regex::new(r"(?m)^\s*[-–—]?\s*\d+\s*[-–—]?\s*$").unwrap(),
            page_of: Regex::new(r"(?mi)^\s*Page\s+\d+\s+of\s+\d+\s*$").unwrap(),
            ligatures: vec![
                ("\u{FB00}", "ff"),
                ("\u{FB01}", "fi"),
                ("\u{FB02}", "fl"),
                ("\u{FB03}", "ffi"),
                ("\u{FB04}", "ffl"),
                ("\u{FB05}", "st"),
                ("\u{FB06}", "st"),
            ],
        }
    }

    /// Normalize a raw text run.
    ///
    /// Strips control characters and the Unicode replacement character,
    /// expands ligatures, applies NFC, and collapses whitespace runs to a
    /// single space.
    pub fn normalize(&self, text: &str) -> String {
        let mut s: String = text.nfc().collect();

        for (from, to) in &self.ligatures {
            if s.contains(from) {
                s = s.replace(from, to);
            }
        }

        let s: String = s
            .chars()
            .filter(|c| !c.is_control() && *c != '\u{FFFD}')
            .collect();

        s.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Join the lines of a block into one paragraph string.
    ///
    /// `lines` are `(text, left_x)` pairs in reading order. A line ending in a
    /// hyphen whose successor continues lowercase at a matching left margin is
    /// a soft line break: the hyphen is dropped and the word rejoined.
    /// Standalone page-number lines are discarded before joining.
    pub fn join_lines(&self, lines: &[(String, f32)]) -> String {
        let lines: Vec<&(String, f32)> = lines
            .iter()
            .filter(|(text, _)| !self.is_page_artifact(text))
            .collect();

        if lines.is_empty() {
            return String::new();
        }

        let block_margin = lines[0].1;
        let mut joined = String::new();

        for (i, (text, x)) in lines.iter().enumerate() {
            let text = text.trim();
            if text.is_empty() {
                continue;
            }
            if i == 0 || joined.is_empty() {
                joined.push_str(text);
                continue;
            }

            let margin_matches = (x - block_margin).abs() <= HYPHEN_MARGIN_TOLERANCE;
            let continues_word = text
                .chars()
                .next()
                .map(|c| c.is_lowercase())
                .unwrap_or(false);

            if joined.ends_with('-') && margin_matches && continues_word {
                joined.pop();
                joined.push_str(text);
            } else {
                joined.push(' ');
                joined.push_str(text);
            }
        }

        self.normalize(&joined)
    }

    /// Whether a line is a page-numbering artifact ("3", "- 12 -", "Page 4 of 9").
    pub fn is_page_artifact(&self, line: &str) -> bool {
        self.page_number.is_match(line) || self.page_of.is_match(line)
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}
