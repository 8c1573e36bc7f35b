/*!
 * Document model for the translation pipeline.
 *
 * Raw input becomes a [`PreparedDocument`] (paragraphs owning chunks), chunks
 * are turned into [`TranslationRecord`]s by the orchestrator, and records are
 * regrouped by paragraph for rendering.
 */

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Raw input text, immutable once received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    text: String,
}

impl SourceDocument {
    /// Wrap raw input, rejecting empty or whitespace-only text.
    pub fn new(text: impl Into<String>) -> Result<Self, AppError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(AppError::Input("input text is empty".to_string()));
        }
        Ok(Self { text })
    }

    /// The text as received.
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Source and target language of a translation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguagePair {
    pub source: String,
    pub target: String,
}

impl LanguagePair {
    /// Build a pair, rejecting identical languages.
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Result<Self, AppError> {
        let source = source.into();
        let target = target.into();
        if crate::language_utils::language_codes_match(&source, &target) {
            return Err(AppError::Input(format!(
                "source and target language must differ (both are '{}')",
                source
            )));
        }
        Ok(Self { source, target })
    }
}

/// A contiguous span of source text with a stable position in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// 0-based position across the whole document
    pub index: usize,
    /// Index of the paragraph owning this chunk
    pub paragraph: usize,
    /// Trimmed chunk text
    pub text: String,
}

/// A paragraph of normalized text and the chunks it was split into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    pub index: usize,
    pub text: String,
    pub chunks: Vec<Chunk>,
}

/// Normalized and chunked input, ready for translation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreparedDocument {
    pub paragraphs: Vec<Paragraph>,
}

impl PreparedDocument {
    /// All chunks in index order.
    pub fn chunks(&self) -> Vec<Chunk> {
        self.paragraphs
            .iter()
            .flat_map(|p| p.chunks.iter().cloned())
            .collect()
    }

    /// Number of chunks across all paragraphs.
    pub fn chunk_count(&self) -> usize {
        self.paragraphs.iter().map(|p| p.chunks.len()).sum()
    }

    /// Paragraph texts joined by blank lines.
    pub fn normalized_text(&self) -> String {
        self.paragraphs
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }
}

/// Result of translating one chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationRecord {
    pub index: usize,
    pub paragraph: usize,
    pub source_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phonetic_gloss: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_translation: Option<String>,
    pub target_translation: String,
    /// Set when the primary translation failed; the translation then holds a placeholder
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_state: Option<String>,
}

impl TranslationRecord {
    pub fn is_error(&self) -> bool {
        self.error_state.is_some()
    }

    /// Placeholder record for a chunk whose translation failed.
    pub fn failed(chunk: &Chunk, error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            index: chunk.index,
            paragraph: chunk.paragraph,
            source_text: chunk.text.clone(),
            phonetic_gloss: None,
            reference_translation: None,
            target_translation: format!("[Translation error: {}]", error),
            error_state: Some(error),
        }
    }
}

/// One word of a word-by-word segmentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordGloss {
    pub word: String,
    #[serde(default)]
    pub phonetic: String,
    #[serde(default)]
    pub meaning: String,
}

/// A paragraph broken into glossed words for the interactive view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordParagraph {
    pub index: usize,
    pub words: Vec<WordGloss>,
    /// Whole-paragraph translation into the reference language, when requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_translation: Option<String>,
}

/// Group index-ordered records by paragraph, keeping empty groups out.
pub fn group_by_paragraph(records: &[TranslationRecord]) -> Vec<Vec<&TranslationRecord>> {
    let mut groups: Vec<Vec<&TranslationRecord>> = Vec::new();
    let mut current_paragraph = None;

    for record in records {
        if current_paragraph != Some(record.paragraph) {
            groups.push(Vec::new());
            current_paragraph = Some(record.paragraph);
        }
        if let Some(group) = groups.last_mut() {
            group.push(record);
        }
    }

    groups
}
