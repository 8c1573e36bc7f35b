/*!
 * Tests for HTML rendering and template substitution
 */

use transbook::document::{TranslationRecord, WordGloss, WordParagraph};
use transbook::errors::AppError;
use transbook::render::{DEFAULT_TEMPLATE, Renderer, escape_html, render_document};

fn record(index: usize, paragraph: usize, text: &str, translation: &str) -> TranslationRecord {
    TranslationRecord {
        index,
        paragraph,
        source_text: text.to_string(),
        phonetic_gloss: None,
        reference_translation: None,
        target_translation: translation.to_string(),
        error_state: None,
    }
}

#[test]
fn test_render_entryLayout_shouldFollowLineOrder() {
    let mut entry = record(0, 0, "你好", "Xin chào");
    entry.phonetic_gloss = Some("nǐ hǎo".to_string());
    entry.reference_translation = Some("Hello".to_string());

    let html = Renderer::default().render(&[entry]);

    let original = html.find("class=\"original\"").unwrap();
    let pinyin = html.find("class=\"pinyin\"").unwrap();
    let reference = html.find("class=\"reference\"").unwrap();
    let translation = html.find("class=\"translation\"").unwrap();
    assert!(original < pinyin && pinyin < reference && reference < translation);
    assert!(html.contains("<div class=\"original\">1. 你好<button"));
}

#[test]
fn test_render_speakButton_shouldCarryTextAndLanguage() {
    let renderer = Renderer {
        speech_language: "en".to_string(),
        ..Default::default()
    };
    let html = renderer.render(&[record(0, 0, "Say \"hi\"", "x")]);

    assert!(html.contains("data-text=\"Say &quot;hi&quot;\""));
    assert!(html.contains("data-lang=\"en\""));
    assert!(html.contains("onclick=\"speak(this.dataset.text, this.dataset.lang)\""));
}

#[test]
fn test_render_partialFailure_shouldKeepAllEntriesInOrder() {
    let mut failed = record(1, 0, "two", "[Translation error: blocked]");
    failed.error_state = Some("blocked".to_string());
    let records = vec![record(0, 0, "one", "uno"), failed, record(2, 0, "three", "tres")];

    let html = Renderer::default().render(&records);

    assert_eq!(html.matches("class=\"sentence-part\"").count(), 3);
    assert_eq!(html.matches("translation-error").count(), 1);
    let uno = html.find("uno").unwrap();
    let error = html.find("translation-error").unwrap();
    let tres = html.find("tres").unwrap();
    assert!(uno < error && error < tres);
}

#[test]
fn test_render_markupInText_shouldBeEscaped() {
    let html = Renderer::default().render(&[record(0, 0, "<b>bold</b>", "a & b")]);
    assert!(!html.contains("<b>"));
    assert!(html.contains("&lt;b&gt;bold&lt;/b&gt;"));
    assert!(html.contains("a &amp; b"));
}

#[test]
fn test_render_empty_shouldProduceNoBlocks() {
    assert_eq!(Renderer::default().render(&[]), "");
}

#[test]
fn test_renderInteractive_latinWords_shouldBeSpaced() {
    let words = ["Hello", ",", "world"]
        .iter()
        .map(|w| WordGloss {
            word: w.to_string(),
            phonetic: String::new(),
            meaning: if *w == "," { String::new() } else { format!("m-{}", w) },
        })
        .collect();
    let paragraph = WordParagraph { index: 0, words, reference_translation: None };

    let html = Renderer::default().render_interactive(&[paragraph]);
    assert!(html.contains("Hello</span><span class=\"plain-word\">,</span> <span"));
    assert!(html.contains("data-tooltip=\"m-world\""));
    assert!(!html.contains("class=\"reference\""));
}

#[test]
fn test_renderDocument_defaultTemplate_shouldProduceFullPage() {
    let body = Renderer::default().render(&[record(0, 0, "a", "b")]);
    let page = render_document(DEFAULT_TEMPLATE, &body).unwrap();

    assert!(page.contains("<div class=\"paragraph-block\">"));
    assert!(!page.contains("{{content}}"));
    assert!(page.contains("prefers-color-scheme"));
    assert!(page.contains("function speak"));
    assert!(page.find("matchMedia").unwrap() < page.rfind("</body>").unwrap());
}

#[test]
fn test_renderDocument_placeholderCount_shouldBeValidated() {
    assert!(matches!(render_document("<body></body>", "x"), Err(AppError::Config(_))));
    assert!(matches!(render_document("{{content}}<p>{{content}}</p>", "x"), Err(AppError::Config(_))));
}

#[test]
fn test_escapeHtml_plainText_shouldBeUnchanged() {
    assert_eq!(escape_html("Xin chào 你好"), "Xin chào 你好");
}
