/*!
 * Cleanup of PDF-extracted text.
 *
 * PDF copy/paste typically yields hard line breaks at every visual line end,
 * words hyphenated across those breaks, and a handful of glyph artifacts. The
 * normalizer undoes the reflow and produces paragraph texts.
 */

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::language_utils::is_han;

static LINE_ENDING_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r\n?").unwrap());

// A letter, hyphen, line break, then a lowercase continuation
static HYPHEN_BREAK_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\p{L})-[ \t]*\n[ \t]*(\p{Ll})").unwrap());

// Right-hand side is checked by hand so a one-character line can join on both ends
static HAN_LINE_BREAK_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\p{Han})[ \t]*\n[ \t]*").unwrap());

static PARAGRAPH_BREAK_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n(?:[ \t]*\n)+").unwrap());

static WHITESPACE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

// Bullet glyph wedged inside a word usually stands in for a lost diacritic
static INNER_BULLET_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\p{L})•").unwrap());

/// Plain glyph substitutions for common extraction artifacts.
///
/// Heuristic and incomplete: it fixes what shows up often, nothing more.
const ARTIFACT_TABLE: &[(&str, &str)] = &[
    ("\u{00AD}", ""),
    ("\u{200B}", ""),
    ("\u{FEFF}", ""),
    ("\u{00A0}", " "),
    ("\u{FB00}", "ff"),
    ("\u{FB01}", "fi"),
    ("\u{FB02}", "fl"),
    ("\u{FB03}", "ffi"),
    ("\u{FB04}", "ffl"),
];

/// Normalization switches
#[derive(Debug, Clone)]
pub struct NormalizerOptions {
    /// Apply the artifact substitution table
    pub fix_artifacts: bool,
    /// Treat every newline as a paragraph boundary instead of reflowing lines
    pub line_breaks_are_paragraphs: bool,
}

impl Default for NormalizerOptions {
    fn default() -> Self {
        Self {
            fix_artifacts: true,
            line_breaks_are_paragraphs: false,
        }
    }
}

/// Turns raw pasted text into clean paragraph texts
#[derive(Debug, Clone, Default)]
pub struct TextNormalizer {
    options: NormalizerOptions,
}

impl TextNormalizer {
    pub fn new(options: NormalizerOptions) -> Self {
        Self { options }
    }

    /// Normalize raw text into an ordered list of non-empty paragraphs
    pub fn normalize(&self, raw: &str) -> Vec<String> {
        let mut text = LINE_ENDING_REGEX.replace_all(raw, "\n").into_owned();

        if self.options.fix_artifacts {
            text = fix_artifacts(&text);
        }

        text = dehyphenate(&text);

        let blocks: Vec<&str> = if self.options.line_breaks_are_paragraphs {
            text.split('\n').collect()
        } else {
            PARAGRAPH_BREAK_REGEX.split(&text).collect()
        };

        blocks
            .into_iter()
            .map(reflow_paragraph)
            .filter(|p| !p.is_empty())
            .collect()
    }
}

/// Apply the artifact table
pub fn fix_artifacts(text: &str) -> String {
    let mut fixed = ARTIFACT_TABLE
        .iter()
        .fold(text.to_string(), |acc, (from, to)| acc.replace(from, to));
    fixed = drop_when_followed_by(&INNER_BULLET_REGEX, &fixed, char::is_alphabetic);
    fixed
}

/// Merge words hyphenated across a line break
pub fn dehyphenate(text: &str) -> String {
    HYPHEN_BREAK_REGEX.replace_all(text, "$1$2").into_owned()
}

/// Join soft line breaks and collapse whitespace within one paragraph
fn reflow_paragraph(block: &str) -> String {
    let joined = drop_when_followed_by(&HAN_LINE_BREAK_REGEX, block, is_han);
    WHITESPACE_REGEX.replace_all(&joined, " ").trim().to_string()
}

/// Replace each match of `pattern` by its first group when the character right
/// after the match satisfies `next`; other matches are kept as they are.
fn drop_when_followed_by(pattern: &Regex, text: &str, next: impl Fn(char) -> bool) -> String {
    pattern
        .replace_all(text, |caps: &Captures| {
            let follows = caps
                .get(0)
                .and_then(|m| text[m.end()..].chars().next())
                .is_some_and(&next);
            if follows { caps[1].to_string() } else { caps[0].to_string() }
        })
        .into_owned()
}
