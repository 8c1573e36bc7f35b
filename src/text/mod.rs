/*!
 * Text preparation: normalization of pasted text and chunking.
 */

pub mod chunker;
pub mod normalizer;

pub use chunker::{ChunkMode, Chunker, ChunkerOptions, split, split_sentences};
pub use normalizer::{NormalizerOptions, TextNormalizer};
