/*!
 * Tests for PDF text normalization
 */

use transbook::text::normalizer::{dehyphenate, fix_artifacts};
use transbook::text::{NormalizerOptions, TextNormalizer};

use crate::common;

#[test]
fn test_dehyphenate_lineBreakWithIndent_shouldJoin() {
    assert_eq!(dehyphenate("transla- \n   tion"), "translation");
    assert_eq!(dehyphenate("well-known"), "well-known");
}

#[test]
fn test_dehyphenate_uppercaseContinuation_shouldKeepBreak() {
    assert_eq!(dehyphenate("Franco-\nPrussian"), "Franco-\nPrussian");
}

#[test]
fn test_fixArtifacts_ligaturesAndInvisibles_shouldBeReplaced() {
    assert_eq!(fix_artifacts("\u{FB01}rst \u{FB02}oor"), "first floor");
    assert_eq!(fix_artifacts("zero\u{200B}width\u{FEFF}"), "zerowidth");
}

#[test]
fn test_normalize_withoutArtifactFixing_shouldKeepLigatures() {
    let normalizer = TextNormalizer::new(NormalizerOptions {
        fix_artifacts: false,
        ..Default::default()
    });
    assert_eq!(normalizer.normalize("\u{FB01}ne"), vec!["\u{FB01}ne"]);
}

#[test]
fn test_normalize_sampleText_shouldReflowParagraphs() {
    let paragraphs = TextNormalizer::default().normalize(common::SAMPLE_ENGLISH);
    assert_eq!(
        paragraphs,
        vec![
            "The results were important for everyone. They changed the plan.",
            "A new chapter began.",
        ]
    );
}

#[test]
fn test_normalize_windowsLineEndings_shouldBehaveLikeUnix() {
    let normalizer = TextNormalizer::default();
    assert_eq!(
        normalizer.normalize("one\r\ntwo\r\n\r\nthree"),
        normalizer.normalize("one\ntwo\n\nthree")
    );
}
