/*!
 * Prompt texts and the word-by-word response schema.
 */

use serde_json::{Value, json};

/// Separates the instructions from the text to translate; the text always comes last
pub const SOURCE_MARKER: &str = "\n\nText:\n";

/// System instruction for every translation call
pub const SYSTEM_PROMPT: &str = "You are a professional translator.";

/// Instructions for translating book text pasted from a PDF
pub const BOOK_EDITOR_INSTRUCTIONS: &str = "You are also an experienced book editor. \
Keep the meaning, tone and terminology of the original exactly. \
The text was copied from a PDF: join sentences that were broken across lines and \
ignore stray hyphens left by line wrapping. \
Do not add explanations, notes or commentary.";

/// Instructions for the secondary reference translation
pub const REFERENCE_INSTRUCTIONS: &str = "Translate accurately and literally.";

/// Prompt asking for a plain translation of `text`
pub fn translation_prompt(text: &str, source_name: &str, target_name: &str, instructions: &str) -> String {
    let mut prompt = format!(
        "Translate the following text from {} to {}.\n",
        source_name, target_name
    );
    if !instructions.trim().is_empty() {
        prompt.push_str(instructions.trim());
        prompt.push('\n');
    }
    prompt.push_str("Return only the translated text.");
    prompt.push_str(SOURCE_MARKER);
    prompt.push_str(text);
    prompt
}

/// Prompt asking for a word-by-word breakdown of `text`
pub fn word_by_word_prompt(text: &str, source_name: &str, target_name: &str) -> String {
    format!(
        "Split the following {} text into words in reading order. \
         For each word give its pinyin (empty if the word is not Chinese) and \
         its meaning in {}. Punctuation is its own word with an empty meaning.{}{}",
        source_name, target_name, SOURCE_MARKER, text
    )
}

/// Response schema for word-by-word mode
pub fn word_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "words": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "word": {"type": "STRING"},
                        "pinyin": {"type": "STRING"},
                        "translation": {"type": "STRING"}
                    },
                    "required": ["word", "pinyin", "translation"]
                }
            }
        },
        "required": ["words"]
    })
}
