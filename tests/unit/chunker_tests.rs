/*!
 * Tests for document preparation and chunking
 */

use transbook::text::chunker::quotes_balanced;
use transbook::text::{ChunkMode, Chunker, ChunkerOptions, NormalizerOptions, split};

use crate::common;

fn strip_ws(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

#[test]
fn test_prepare_chunks_shouldReconstructNormalizedText() {
    let chunker = Chunker::new(ChunkerOptions { budget: 30, ..Default::default() });
    let doc = chunker.prepare(common::SAMPLE_ENGLISH);

    let joined: String = doc.chunks().iter().map(|c| c.text.as_str()).collect();
    assert_eq!(strip_ws(&joined), strip_ws(&doc.normalized_text()));
    assert!(doc.normalized_text().contains("important"));
}

#[test]
fn test_prepare_indices_shouldBeContiguousAcrossParagraphs() {
    let chunker = Chunker::new(ChunkerOptions { budget: 100, ..Default::default() });
    let doc = chunker.prepare(common::SAMPLE_CHINESE);

    assert_eq!(doc.paragraphs.len(), 3);
    let indices: Vec<usize> = doc.chunks().iter().map(|c| c.index).collect();
    assert_eq!(indices, (0..doc.chunk_count()).collect::<Vec<_>>());
    for paragraph in &doc.paragraphs {
        assert!(paragraph.chunks.iter().all(|c| c.paragraph == paragraph.index));
    }
}

#[test]
fn test_split_shortSentences_shouldStayWithinBudget() {
    let text: String = (1..=20)
        .map(|i| format!("Sentence number {} is here. ", i))
        .collect();

    let chunks = split(&text, 100);
    assert!(chunks.len() > 1);
    for chunk in &chunks {
        assert!(chunk.chars().count() <= 100, "chunk too long: {:?}", chunk);
    }
}

#[test]
fn test_split_cornerBrackets_shouldKeepQuotationTogether() {
    let chunks = split("他说：「今天。明天。」然后走了。", 10);
    assert_eq!(chunks, vec!["他说：「今天。明天。」", "然后走了。"]);
    assert!(chunks.iter().all(|c| quotes_balanced(c)));
}

#[test]
fn test_split_curlyQuotes_shouldBalanceAtEveryBudget() {
    let text = "She whispered “Wait. Listen. Do you hear it?” and froze. Nobody answered. \
                Then “Run!” he shouted.";
    for budget in [10, 25, 60, 200] {
        for chunk in split(text, budget) {
            assert!(quotes_balanced(&chunk), "budget {} split a quote: {:?}", budget, chunk);
        }
    }
}

#[test]
fn test_prepare_sentenceMode_shouldYieldOneChunkPerSentence() {
    let chunker = Chunker::new(ChunkerOptions {
        mode: ChunkMode::Sentence,
        min_sentence_chars: 1,
        ..Default::default()
    });
    let doc = chunker.prepare("One apple. Two pears. Three plums.");

    let texts: Vec<String> = doc.chunks().into_iter().map(|c| c.text).collect();
    assert_eq!(texts, vec!["One apple.", "Two pears.", "Three plums."]);
}

#[test]
fn test_prepare_lineMode_shouldTreatLinesAsParagraphs() {
    let chunker = Chunker::new(ChunkerOptions {
        normalizer: NormalizerOptions {
            line_breaks_are_paragraphs: true,
            ..Default::default()
        },
        ..Default::default()
    });
    let doc = chunker.prepare("first line\nsecond line\n\nthird line");

    assert_eq!(doc.paragraphs.len(), 3);
}

#[test]
fn test_prepare_blankInput_shouldBeEmpty() {
    let doc = Chunker::default().prepare(" \n\n\t ");
    assert!(doc.is_empty());
    assert_eq!(doc.chunk_count(), 0);
}
