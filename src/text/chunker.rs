/*!
 * Splitting of normalized text into translation chunks.
 *
 * Text is first cut into sentence units at end-of-sentence punctuation (Latin
 * and CJK). Units are then either packed greedily into chunks bounded by a
 * character budget ([`split`]) or merged by the quote-balanced sentence
 * splitter ([`split_sentences`]). Neither ever cuts inside a sentence, and
 * neither ends a chunk while a quotation is open.
 */

use log::debug;
use serde::{Deserialize, Serialize};

use crate::document::{Chunk, Paragraph, PreparedDocument};
use super::normalizer::{NormalizerOptions, TextNormalizer};

const SENTENCE_TERMINALS: &[char] = &['.', '!', '?', '…', '。', '！', '？'];
const CJK_TERMINALS: &[char] = &['。', '！', '？'];
const LATIN_CLAUSE_MARKS: &[char] = &[','];
const CJK_CLAUSE_MARKS: &[char] = &['，', '：', '；'];
const CLOSING_MARKS: &[char] = &['”', '’', '」', '』', ')', '）', ']', '》'];
const OPENING_MARKS: &[char] = &['"', '“', '‘', '「', '『', '(', '（', '[', '《'];
const QUOTE_GLYPHS: &[char] = &['"', '“', '”', '「', '」', '『', '』'];

const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "vs", "etc", "e.g", "i.e", "cf", "fig",
    "vol", "pp", "ch", "approx",
];

/// An open quotation may stretch a chunk to this many budgets before it is cut anyway
const UNBALANCED_QUOTE_LIMIT: usize = 4;

/// How paragraphs are cut into chunks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkMode {
    /// Greedy packing of sentences up to the character budget
    #[default]
    Budget,
    /// One chunk per (quote-balanced, minimum-length) sentence
    Sentence,
}

/// Chunking parameters
#[derive(Debug, Clone)]
pub struct ChunkerOptions {
    /// Soft character budget per chunk
    pub budget: usize,
    /// Minimum chunk length for sentence mode
    pub min_sentence_chars: usize,
    /// Also break at clause marks in sentence mode
    pub clause_level: bool,
    pub mode: ChunkMode,
    pub normalizer: NormalizerOptions,
}

impl Default for ChunkerOptions {
    fn default() -> Self {
        Self {
            budget: 800,
            min_sentence_chars: 20,
            clause_level: false,
            mode: ChunkMode::Budget,
            normalizer: NormalizerOptions::default(),
        }
    }
}

/// Normalizes raw input and cuts it into indexed chunks
#[derive(Debug, Clone, Default)]
pub struct Chunker {
    options: ChunkerOptions,
}

impl Chunker {
    pub fn new(options: ChunkerOptions) -> Self {
        Self { options }
    }

    /// Normalize `raw` and split every paragraph, assigning global chunk indices
    pub fn prepare(&self, raw: &str) -> PreparedDocument {
        let normalizer = TextNormalizer::new(self.options.normalizer.clone());
        let mut next_index = 0;

        let paragraphs = normalizer
            .normalize(raw)
            .into_iter()
            .enumerate()
            .map(|(paragraph_index, text)| {
                let pieces = match self.options.mode {
                    ChunkMode::Budget => split(&text, self.options.budget),
                    ChunkMode::Sentence => split_sentences(
                        &text,
                        self.options.min_sentence_chars,
                        self.options.clause_level,
                    ),
                };
                let chunks = pieces
                    .into_iter()
                    .map(|piece| {
                        let chunk = Chunk {
                            index: next_index,
                            paragraph: paragraph_index,
                            text: piece,
                        };
                        next_index += 1;
                        chunk
                    })
                    .collect();
                Paragraph {
                    index: paragraph_index,
                    text,
                    chunks,
                }
            })
            .collect::<Vec<_>>();

        debug!("Prepared {} paragraphs, {} chunks", paragraphs.len(), next_index);
        PreparedDocument { paragraphs }
    }
}

/// Greedily pack sentences into chunks of at most `budget` characters.
///
/// A sentence longer than the budget becomes its own oversized chunk.
pub fn split(text: &str, budget: usize) -> Vec<String> {
    let budget = budget.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();

    for unit in sentence_units(text, false) {
        let current_len = current.trim().chars().count();
        let unit_len = unit.trim().chars().count();

        let over_budget = current_len > 0 && current_len + unit_len > budget;
        let quote_open = !quotes_balanced(&current);
        if over_budget && (!quote_open || current_len >= budget * UNBALANCED_QUOTE_LIMIT) {
            push_trimmed(&mut chunks, &current);
            current.clear();
        }
        current.push_str(unit);
    }
    push_trimmed(&mut chunks, &current);

    chunks
}

/// Quote-balanced sentence splitter.
///
/// A sentence boundary is honored only when every quotation opened so far is
/// closed and the pending text has reached `min_length` characters. With
/// `clause_level`, commas and CJK clause marks also count as boundaries.
pub fn split_sentences(text: &str, min_length: usize, clause_level: bool) -> Vec<String> {
    let units = sentence_units(text, clause_level);
    let last = units.len().saturating_sub(1);
    let mut sentences = Vec::new();
    let mut current = String::new();

    for (i, unit) in units.into_iter().enumerate() {
        current.push_str(unit);
        let long_enough = current.trim().chars().count() >= min_length;
        if quotes_balanced(&current) && (long_enough || i == last) {
            push_trimmed(&mut sentences, &current);
            current.clear();
        }
    }
    push_trimmed(&mut sentences, &current);

    sentences
}

/// Whether every quote glyph in `text` has a partner
pub fn quotes_balanced(text: &str) -> bool {
    text.chars().filter(|c| QUOTE_GLYPHS.contains(c)).count() % 2 == 0
}

fn push_trimmed(out: &mut Vec<String>, text: &str) {
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        out.push(trimmed.to_string());
    }
}

fn is_delimiter(c: char, clause_level: bool) -> bool {
    SENTENCE_TERMINALS.contains(&c)
        || (clause_level && (LATIN_CLAUSE_MARKS.contains(&c) || CJK_CLAUSE_MARKS.contains(&c)))
}

/// Cut text into contiguous slices, each ending after a delimiter run.
///
/// The slices concatenate back to exactly `text`.
pub fn sentence_units(text: &str, clause_level: bool) -> Vec<&str> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut units = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < chars.len() {
        if !is_delimiter(chars[i].1, clause_level) {
            i += 1;
            continue;
        }

        // Longest punctuation run, then any closing quotes or brackets
        let run_start = i;
        let mut j = i;
        while j < chars.len() && is_delimiter(chars[j].1, clause_level) {
            j += 1;
        }
        while j < chars.len() {
            let next = chars.get(j + 1).map(|(_, c)| *c);
            if !is_closing(chars[j].1, next) {
                break;
            }
            j += 1;
        }

        let run_begin = chars[run_start].0;
        let end = chars.get(j).map(|(b, _)| *b).unwrap_or(text.len());
        let run = &text[run_begin..end];

        if is_boundary(&text[start..run_begin], run, &text[end..]) {
            units.push(&text[start..end]);
            start = end;
        }
        i = j;
    }

    if start < text.len() {
        units.push(&text[start..]);
    }
    units
}

// Straight quotes are ambiguous; one that hugs the punctuation and is not
// followed by a word closes the sentence
fn is_closing(c: char, next: Option<char>) -> bool {
    match c {
        '"' | '\'' => next.is_none_or(|n| !n.is_alphanumeric()),
        _ => CLOSING_MARKS.contains(&c),
    }
}

fn is_boundary(before: &str, run: &str, after: &str) -> bool {
    if run.chars().any(|c| CJK_TERMINALS.contains(&c) || CJK_CLAUSE_MARKS.contains(&c)) {
        return true;
    }

    let mut rest = after.chars();
    let Some(first) = rest.next() else {
        return true;
    };
    if crate::language_utils::is_han(first) {
        return true;
    }
    if !first.is_whitespace() {
        return false;
    }

    let clause_only = run
        .chars()
        .all(|c| LATIN_CLAUSE_MARKS.contains(&c) || !is_delimiter(c, true));
    if clause_only {
        return true;
    }

    if run.starts_with('.') && !run.starts_with("..") && is_abbreviation(before) {
        return false;
    }

    match after.trim_start().chars().next() {
        None => true,
        Some(c) => {
            c.is_uppercase()
                || c.is_ascii_digit()
                || OPENING_MARKS.contains(&c)
                || crate::language_utils::is_han(c)
        }
    }
}

fn is_abbreviation(before: &str) -> bool {
    let word = before
        .rsplit(char::is_whitespace)
        .next()
        .unwrap_or("")
        .trim_start_matches(|c| OPENING_MARKS.contains(&c));

    let mut letters = word.chars();
    if let (Some(c), None) = (letters.next(), letters.next()) {
        if c.is_uppercase() {
            return true;
        }
    }

    ABBREVIATIONS.contains(&word.to_lowercase().as_str())
}
