/*!
 * Local phonetic glosses and word segmentation.
 *
 * Pinyin is generated offline with the `pinyin` crate and Chinese text is cut
 * into words with `jieba-rs`. Both run without the network, so this module is
 * also the fallback for word-by-word mode when the remote structured call
 * fails.
 */

use jieba_rs::Jieba;
use once_cell::sync::Lazy;
use pinyin::ToPinyin;

use crate::document::WordGloss;
use crate::language_utils::{contains_han, is_han};

// Dictionary load takes a moment, do it once
static JIEBA: Lazy<Jieba> = Lazy::new(Jieba::new);

/// Tone-marked pinyin for every Han character, space separated.
///
/// Non-Han characters are skipped. Returns an empty string when the text has
/// no Han characters.
pub fn pinyin_gloss(text: &str) -> String {
    text.to_pinyin()
        .flatten()
        .map(|p| p.with_tone())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Pinyin for a single word, syllables joined without spaces
pub fn word_pinyin(word: &str) -> String {
    word.to_pinyin().flatten().map(|p| p.with_tone()).collect()
}

/// Cut text into words.
///
/// Han runs go through jieba; everything else splits on whitespace with
/// punctuation peeled off as separate tokens.
pub fn segment(text: &str) -> Vec<String> {
    if contains_han(text) {
        JIEBA
            .cut(text, false)
            .into_iter()
            .map(str::trim)
            .filter(|w| !w.is_empty())
            .map(str::to_string)
            .collect()
    } else {
        text.split_whitespace().flat_map(split_punctuation).collect()
    }
}

fn split_punctuation(token: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut word = String::new();

    for c in token.chars() {
        if c.is_alphanumeric() || c == '\'' || c == '-' {
            word.push(c);
        } else {
            if !word.is_empty() {
                parts.push(std::mem::take(&mut word));
            }
            parts.push(c.to_string());
        }
    }
    if !word.is_empty() {
        parts.push(word);
    }
    parts
}

/// Deterministic word-by-word breakdown without meanings
pub fn local_word_glosses(text: &str) -> Vec<WordGloss> {
    segment(text)
        .into_iter()
        .map(|word| {
            let phonetic = if word.chars().any(is_han) {
                word_pinyin(&word)
            } else {
                String::new()
            };
            WordGloss {
                word,
                phonetic,
                meaning: String::new(),
            }
        })
        .collect()
}
