//! Page text quality checks.
//!
//! A page is kept only when its extracted spans read like real text. Pages
//! with no spans, only whitespace, or text that looks like a failed OCR
//! layer are dropped without an error.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::model::Span;

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));
static NEWLINE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n+").expect("newline pattern is valid"));

/// Unicode replacement character emitted for undecodable glyphs.
const REPLACEMENT_CHAR: char = '\u{FFFD}';

/// Thresholds for detecting garbled text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrHeuristics {
    /// Max share of whitespace runs among runs plus non-whitespace chars
    pub space_threshold: f64,

    /// Max share of newline runs among runs plus other chars
    pub newline_threshold: f64,

    /// Min share of alphanumeric chars, ignoring spaces and newlines
    pub alphanum_threshold: f64,

    /// Replacement chars tolerated, as a share of the text length
    pub invalid_char_ratio: f64,

    /// Replacement chars always tolerated
    pub min_invalid_chars: usize,
}

impl Default for OcrHeuristics {
    fn default() -> Self {
        Self {
            space_threshold: 0.7,
            newline_threshold: 0.6,
            alphanum_threshold: 0.3,
            invalid_char_ratio: 0.03,
            min_invalid_chars: 6,
        }
    }
}

impl OcrHeuristics {
    /// Check whether `text` looks garbled.
    pub fn is_bad(&self, text: &str) -> bool {
        let len = text.chars().count();
        if len == 0 {
            return true;
        }

        let spaces = WHITESPACE_RUN.find_iter(text).count();
        let non_spaces = text.chars().filter(|c| !c.is_whitespace()).count();
        if ratio(spaces, spaces + non_spaces) > self.space_threshold {
            return true;
        }

        let newlines = NEWLINE_RUN.find_iter(text).count();
        let non_newlines = text.chars().filter(|&c| c != '\n').count();
        if ratio(newlines, newlines + non_newlines) > self.newline_threshold {
            return true;
        }

        if alphanum_ratio(text) < self.alphanum_threshold {
            return true;
        }

        let invalid = text.chars().filter(|&c| c == REPLACEMENT_CHAR).count();
        let tolerated = (self.min_invalid_chars as f64).max(len as f64 * self.invalid_char_ratio);
        invalid as f64 > tolerated
    }
}

/// Share of alphanumeric chars once spaces and newlines are removed.
///
/// Text with nothing left counts as fully alphanumeric.
pub fn alphanum_ratio(text: &str) -> f64 {
    let mut total = 0usize;
    let mut alphanumeric = 0usize;
    for c in text.chars().filter(|&c| c != ' ' && c != '\n') {
        total += 1;
        if c.is_alphanumeric() {
            alphanumeric += 1;
        }
    }
    if total == 0 {
        return 1.0;
    }
    ratio(alphanumeric, total)
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

/// Accept/reject decision for a page's spans.
#[derive(Debug, Clone, Default)]
pub struct ContentQualityGate {
    heuristics: OcrHeuristics,
}

impl ContentQualityGate {
    pub fn new(heuristics: OcrHeuristics) -> Self {
        Self { heuristics }
    }

    /// Decide whether a page's per-line span lists hold usable text.
    pub fn accept(&self, line_spans: &[Vec<Span>]) -> bool {
        if line_spans.iter().all(Vec::is_empty) {
            return false;
        }

        let text = page_text(line_spans);
        if text.trim().is_empty() {
            return false;
        }

        !self.heuristics.is_bad(&text)
    }
}

/// Concatenate span texts: each span prefixed by a space, each line
/// followed by a newline.
pub fn page_text(line_spans: &[Vec<Span>]) -> String {
    let mut text = String::new();
    for spans in line_spans {
        for span in spans {
            text.push(' ');
            text.push_str(&span.text);
        }
        text.push('\n');
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::sample_span;

    fn lines(texts: &[&[&str]]) -> Vec<Vec<Span>> {
        texts
            .iter()
            .map(|line| line.iter().map(|t| sample_span(t, &[])).collect())
            .collect()
    }

    #[test]
    fn test_page_text_layout() {
        let spans = lines(&[&["Hello", "world"], &[], &["Bye"]]);
        assert_eq!(page_text(&spans), " Hello world\n\n Bye\n");
    }

    #[test]
    fn test_accepts_normal_text() {
        let gate = ContentQualityGate::default();
        let spans = lines(&[
            &["The quick brown fox"],
            &["jumps over the lazy dog."],
        ]);
        assert!(gate.accept(&spans));
    }

    #[test]
    fn test_rejects_no_spans() {
        let gate = ContentQualityGate::default();
        assert!(!gate.accept(&[]));
        assert!(!gate.accept(&lines(&[&[], &[]])));
    }

    #[test]
    fn test_rejects_whitespace_only() {
        let gate = ContentQualityGate::default();
        assert!(!gate.accept(&lines(&[&["   "], &["\t"]])));
    }

    #[test]
    fn test_rejects_symbol_soup() {
        let gate = ContentQualityGate::default();
        assert!(!gate.accept(&lines(&[&["@#$%^&*()!~<>?/|"]])));
    }

    #[test]
    fn test_is_bad_empty() {
        assert!(OcrHeuristics::default().is_bad(""));
    }

    #[test]
    fn test_is_bad_mostly_spaces() {
        assert!(OcrHeuristics::default().is_bad("   "));
        assert!(OcrHeuristics::default().is_bad("\n\n\n"));
        assert!(!OcrHeuristics::default().is_bad("a b c d e f g h"));
    }

    #[test]
    fn test_is_bad_replacement_chars() {
        let text = format!("Readable text {}", "\u{FFFD}".repeat(7));
        assert!(OcrHeuristics::default().is_bad(&text));
        let text = format!("Readable text {}", "\u{FFFD}".repeat(2));
        assert!(!OcrHeuristics::default().is_bad(&text));
    }

    #[test]
    fn test_alphanum_ratio() {
        assert_eq!(alphanum_ratio(""), 1.0);
        assert_eq!(alphanum_ratio(" \n"), 1.0);
        assert_eq!(alphanum_ratio("ab!!"), 0.5);
    }

    #[test]
    fn test_custom_thresholds() {
        let strict = OcrHeuristics {
            alphanum_threshold: 0.99,
            ..OcrHeuristics::default()
        };
        assert!(strict.is_bad("Hello, world."));
        assert!(!OcrHeuristics::default().is_bad("Hello, world."));
    }
}
