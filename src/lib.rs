/*!
 * # transbook - book translation with AI
 *
 * A Rust library that turns pasted or PDF-extracted text into a bilingual
 * HTML book using a remote language model.
 *
 * ## Features
 *
 * - Repair PDF artifacts (ligatures, hyphenated line breaks, soft hyphens)
 * - Split text into chunks that respect sentences and quotations
 * - Translate chunks concurrently with caching, retries and model fallback
 * - Optional reference-language translation and local pinyin
 * - Interactive word-by-word mode with a local segmentation fallback
 * - ISO 639-1 and ISO 639-2 language code support
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `text`: normalization (`text::normalizer`) and chunking (`text::chunker`)
 * - `document`: the data passed between pipeline stages
 * - `phonetic`: local pinyin and word segmentation
 * - `translation`: AI-powered translation services:
 *   - `translation::core`: the translation client
 *   - `translation::batch`: ordered, bounded-concurrency orchestration
 *   - `translation::cache`: caching of successful translations
 *   - `translation::retry`: retry with exponential backoff
 *   - `translation::prompts`: prompt texts and response schemas
 * - `providers`: the remote model interface:
 *   - `providers::gemini`: Gemini REST client
 *   - `providers::mock`: deterministic provider for tests
 * - `render`: HTML output
 * - `app_config`, `app_controller`, `file_utils`: application wiring
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod document;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod phonetic;
pub mod providers;
pub mod render;
pub mod text;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{BookOutput, Controller};
pub use document::{Chunk, LanguagePair, PreparedDocument, SourceDocument, TranslationRecord, WordGloss, WordParagraph};
pub use errors::{AppError, ProviderError, TranslationError};
pub use language_utils::{get_language_name, language_codes_match, normalize_to_part2t};
pub use render::Renderer;
pub use text::{Chunker, TextNormalizer};
pub use translation::{Orchestrator, TranslationClient};
