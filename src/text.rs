//! # Text Metrics & Wrapping
//!
//! Character-width measurement and greedy line wrapping against a maximum
//! width. The layout engine only speaks the [`FontMetrics`] trait, so tests
//! can swap in a fixed-advance measurer.
//!
//! Wrapping is whitespace-greedy with a character-level hard split for
//! oversized tokens, so it always terminates and every returned line fits.

use crate::error::ReportError;
use serde::{Deserialize, Serialize};

/// The standard PDF Type1 faces the engine draws with. No embedding needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Font {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
}

impl Font {
    /// The PDF base-font name.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Font::Helvetica => "Helvetica",
            Font::HelveticaBold => "Helvetica-Bold",
            Font::HelveticaOblique => "Helvetica-Oblique",
        }
    }

    /// Resource index inside each page's /Font dictionary (/F0, /F1, /F2).
    pub fn resource_index(&self) -> usize {
        match self {
            Font::Helvetica => 0,
            Font::HelveticaBold => 1,
            Font::HelveticaOblique => 2,
        }
    }

    pub const ALL: [Font; 3] = [Font::Helvetica, Font::HelveticaBold, Font::HelveticaOblique];
}

/// Text measurement seam between layout and the font data.
pub trait FontMetrics {
    /// Width of `text` in points at the given size.
    fn text_width(&self, font: Font, size: f64, text: &str) -> f64;
}

/// AFM advance widths (1/1000 em) for ASCII 32..=126.
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333,
    278, 278, 556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278,
    584, 584, 584, 556, 1015, 667, 667, 722, 722, 667, 611, 778, 722, 278,
    500, 667, 556, 833, 722, 778, 667, 778, 722, 667, 611, 722, 667, 944,
    667, 667, 611, 278, 278, 278, 469, 556, 333, 556, 556, 500, 556, 556,
    278, 556, 556, 222, 222, 500, 222, 833, 556, 556, 556, 556, 333, 500,
    278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333,
    278, 278, 556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333,
    584, 584, 584, 611, 975, 722, 722, 722, 722, 667, 611, 778, 722, 278,
    556, 722, 611, 833, 722, 778, 667, 778, 722, 667, 611, 722, 667, 944,
    667, 667, 611, 333, 278, 333, 584, 556, 333, 556, 611, 556, 611, 556,
    333, 611, 611, 278, 278, 556, 278, 889, 611, 611, 611, 611, 389, 556,
    333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Fallback advance for characters outside the table.
const DEFAULT_ADVANCE: u16 = 556;

/// Widest advance in the built-in tables ('@' in Helvetica), used for
/// minimum-usable-width checks at validation time.
pub const MAX_ADVANCE: u16 = 1015;

/// Measurement backed by the built-in standard-font advance tables.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinMetrics;

impl BuiltinMetrics {
    pub fn new() -> Self {
        Self
    }

    fn advance(font: Font, ch: char) -> u16 {
        let table = match font {
            Font::Helvetica | Font::HelveticaOblique => &HELVETICA_WIDTHS,
            Font::HelveticaBold => &HELVETICA_BOLD_WIDTHS,
        };
        let code = ch as u32;
        if (32..=126).contains(&code) {
            table[(code - 32) as usize]
        } else {
            DEFAULT_ADVANCE
        }
    }
}

impl FontMetrics for BuiltinMetrics {
    fn text_width(&self, font: Font, size: f64, text: &str) -> f64 {
        let units: u32 = text.chars().map(|ch| Self::advance(font, ch) as u32).sum();
        units as f64 * size / 1000.0
    }
}

/// Break `text` into lines no wider than `max_width`.
///
/// Words (whitespace-delimited) are accumulated greedily. A single word wider
/// than `max_width` is hard-split at the last character position that still
/// fits. Empty or whitespace-only input yields an empty Vec, never a single
/// blank line.
pub fn wrap(
    metrics: &dyn FontMetrics,
    font: Font,
    size: f64,
    text: &str,
    max_width: f64,
) -> Result<Vec<String>, ReportError> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return Ok(Vec::new());
    }

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in words {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if metrics.text_width(font, size, &candidate) <= max_width {
            current = candidate;
            continue;
        }

        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }

        if metrics.text_width(font, size, word) <= max_width {
            current = word.to_string();
        } else {
            // Oversized token: split character-by-character. All fragments
            // but the last are complete lines; the last may still accept
            // following words.
            let mut fragments = hard_split(metrics, font, size, word, max_width)?;
            current = fragments.pop().unwrap_or_default();
            lines.append(&mut fragments);
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    Ok(lines)
}

/// Split a single oversized word into maximal fragments that fit.
fn hard_split(
    metrics: &dyn FontMetrics,
    font: Font,
    size: f64,
    word: &str,
    max_width: f64,
) -> Result<Vec<String>, ReportError> {
    let chars: Vec<char> = word.chars().collect();
    let mut fragments = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let first: String = chars[start].to_string();
        if metrics.text_width(font, size, &first) > max_width {
            // Not even one character fits: the column itself is broken.
            return Err(ReportError::ColumnTooNarrow { width: max_width });
        }
        let mut end = start + 1;
        let mut piece = first;
        while end < chars.len() {
            let mut grown = piece.clone();
            grown.push(chars[end]);
            if metrics.text_width(font, size, &grown) > max_width {
                break;
            }
            piece = grown;
            end += 1;
        }
        fragments.push(piece);
        start = end;
    }

    Ok(fragments)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every character is exactly `advance` points wide at size 1.
    struct FixedMetrics {
        advance: f64,
    }

    impl FontMetrics for FixedMetrics {
        fn text_width(&self, _font: Font, size: f64, text: &str) -> f64 {
            text.chars().count() as f64 * self.advance * size
        }
    }

    fn fixed_wrap(text: &str, max_chars: usize) -> Vec<String> {
        let metrics = FixedMetrics { advance: 1.0 };
        wrap(&metrics, Font::Helvetica, 1.0, text, max_chars as f64).unwrap()
    }

    #[test]
    fn test_empty_input_yields_no_lines() {
        assert!(fixed_wrap("", 10).is_empty());
        assert!(fixed_wrap("   ", 10).is_empty());
    }

    #[test]
    fn test_short_text_single_line() {
        assert_eq!(fixed_wrap("hello world", 20), vec!["hello world"]);
    }

    #[test]
    fn test_greedy_word_wrap() {
        assert_eq!(
            fixed_wrap("one two three four", 9),
            vec!["one two", "three", "four"]
        );
    }

    #[test]
    fn test_every_line_fits() {
        let metrics = FixedMetrics { advance: 1.0 };
        let text = "the quick brown fox jumps over the lazy dog again and again";
        for max in 4..30 {
            let lines = wrap(&metrics, Font::Helvetica, 1.0, text, max as f64).unwrap();
            for line in &lines {
                assert!(
                    metrics.text_width(Font::Helvetica, 1.0, line) <= max as f64,
                    "line {line:?} exceeds {max}"
                );
            }
        }
    }

    #[test]
    fn test_rejoin_reproduces_normalized_text() {
        let text = "  alpha   beta\tgamma  ";
        let lines = fixed_wrap(text, 11);
        let rejoined = lines.join(" ");
        let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
        assert_eq!(rejoined, normalized);
    }

    #[test]
    fn test_long_word_hard_split() {
        let lines = fixed_wrap("abcdefghij", 4);
        assert_eq!(lines, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_hard_split_tail_accepts_next_word() {
        // "abcdefgh" splits into "abcd"/"efgh"; "ij" won't join "efgh" at
        // width 4, so it lands on its own line.
        assert_eq!(fixed_wrap("abcdefgh ij", 4), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_width_smaller_than_one_char_errors() {
        let metrics = FixedMetrics { advance: 10.0 };
        let err = wrap(&metrics, Font::Helvetica, 1.0, "x", 5.0).unwrap_err();
        assert!(matches!(err, ReportError::ColumnTooNarrow { .. }));
    }

    #[test]
    fn test_builtin_metrics_bold_wider() {
        let m = BuiltinMetrics::new();
        let regular = m.text_width(Font::Helvetica, 12.0, "Subtotal");
        let bold = m.text_width(Font::HelveticaBold, 12.0, "Subtotal");
        assert!(bold > regular);
    }

    #[test]
    fn test_builtin_metrics_space_width() {
        let m = BuiltinMetrics::new();
        let w = m.text_width(Font::Helvetica, 12.0, " ");
        assert!((w - 3.336).abs() < 0.001);
    }

    #[test]
    fn test_builtin_wrap_real_metrics() {
        let m = BuiltinMetrics::new();
        let lines = wrap(
            &m,
            Font::Helvetica,
            9.0,
            "Quarterly building maintenance and grounds upkeep",
            90.0,
        )
        .unwrap();
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(m.text_width(Font::Helvetica, 9.0, line) <= 90.0);
        }
    }
}
