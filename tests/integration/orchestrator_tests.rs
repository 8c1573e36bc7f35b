/*!
 * Integration tests for the orchestrator: ordering, progress, failures, cancellation
 */

use parking_lot::Mutex;

use transbook::document::{Chunk, LanguagePair};
use transbook::errors::TranslationError;
use transbook::providers::mock::MockProvider;
use transbook::render::Renderer;
use transbook::text::{Chunker, ChunkerOptions};
use transbook::translation::{CancellationToken, Orchestrator, OrchestratorOptions, PhoneticSource};

use crate::common;

fn chunks(texts: &[&str]) -> Vec<Chunk> {
    texts
        .iter()
        .enumerate()
        .map(|(index, text)| Chunk {
            index,
            paragraph: 0,
            text: text.to_string(),
        })
        .collect()
}

fn pair(source: &str, target: &str) -> LanguagePair {
    LanguagePair::new(source, target).unwrap()
}

fn no_reference(concurrency: usize) -> OrchestratorOptions {
    OrchestratorOptions {
        concurrency,
        include_reference: false,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_run_jitteredCompletion_shouldPreserveOrder() {
    common::init_logging();
    let texts: Vec<String> = (0..40).map(|i| format!("Sentence {}.", i)).collect();
    let text_refs: Vec<&str> = texts.iter().map(String::as_str).collect();

    for concurrency in [1, 4, 16] {
        let orchestrator = common::test_orchestrator(MockProvider::jitter(5), no_reference(concurrency));
        let records = orchestrator.run(&chunks(&text_refs), &pair("en", "fr"), |_| {}).await.unwrap();

        assert_eq!(records.len(), 40);
        for (i, record) in records.iter().enumerate() {
            assert_eq!(record.index, i);
            assert_eq!(record.target_translation, format!("[French] Sentence {}.", i));
        }
    }
}

#[tokio::test]
async fn test_run_progress_shouldBeMonotonicAndEndAt100() {
    let seen = Mutex::new(Vec::new());
    let orchestrator = common::test_orchestrator(MockProvider::jitter(3), no_reference(4));

    orchestrator
        .run(&chunks(&["a.", "b.", "c.", "d.", "e.", "f.", "g."]), &pair("en", "fr"), |p| {
            seen.lock().push(p)
        })
        .await
        .unwrap();

    let seen = seen.into_inner();
    assert_eq!(seen.len(), 7);
    assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(*seen.last().unwrap(), 100.0);
}

#[tokio::test]
async fn test_run_noChunks_shouldReportCompletionOnce() {
    let seen = Mutex::new(Vec::new());
    let provider = MockProvider::working();
    let orchestrator = common::test_orchestrator(provider.clone(), no_reference(3));

    let records = orchestrator.run(&[], &pair("zh", "vi"), |p| seen.lock().push(p)).await.unwrap();

    assert!(records.is_empty());
    assert_eq!(seen.into_inner(), vec![100.0]);
    assert_eq!(provider.request_count(), 0);
}

#[tokio::test]
async fn test_run_permanentFailure_shouldFlagOnlyThatChunk() {
    let provider = MockProvider::fail_on_text("poison");
    let orchestrator = common::test_orchestrator(provider, no_reference(3));

    let records = orchestrator
        .run(&chunks(&["First.", "A poison pill.", "Third."]), &pair("en", "fr"), |_| {})
        .await
        .unwrap();

    assert_eq!(records.len(), 3);
    assert!(!records[0].is_error());
    assert!(records[1].is_error());
    assert!(!records[2].is_error());
    assert!(records[1].error_state.as_deref().unwrap().contains("poison"));

    let html = Renderer::default().render(&records);
    assert_eq!(html.matches("class=\"sentence-part\"").count(), 3);
    assert_eq!(html.matches("translation-error").count(), 1);
}

#[tokio::test]
async fn test_run_intermittentFailures_shouldBeRetried() {
    let provider = MockProvider::intermittent(3);
    let orchestrator = common::test_orchestrator(provider.clone(), no_reference(1));

    let records = orchestrator
        .run(&chunks(&["a.", "b.", "c.", "d.", "e."]), &pair("en", "fr"), |_| {})
        .await
        .unwrap();

    assert!(records.iter().all(|r| !r.is_error()));
    assert!(provider.request_count() > 5);
}

#[tokio::test]
async fn test_run_repeatedDocument_shouldBeServedFromCache() {
    let provider = MockProvider::working();
    let orchestrator = common::test_orchestrator(provider.clone(), OrchestratorOptions::default());
    let input = chunks(&["你好。", "再见。"]);

    let first = orchestrator.run(&input, &pair("zh", "vi"), |_| {}).await.unwrap();
    let calls_after_first = provider.request_count();
    let second = orchestrator.run(&input, &pair("zh", "vi"), |_| {}).await.unwrap();

    // Target and reference translation per chunk
    assert_eq!(calls_after_first, 4);
    assert_eq!(provider.request_count(), calls_after_first);
    assert_eq!(first, second);
    assert_eq!(orchestrator.client().cache_stats().hits, 4);
}

#[tokio::test]
async fn test_run_failedChunk_shouldBeRetriedOnNextRun() {
    let provider = MockProvider::transient(4);
    let orchestrator = common::test_orchestrator(provider.clone(), no_reference(1));
    let input = chunks(&["only."]);
    let en_fr = pair("en", "fr");

    // Two attempts on each model fail
    let first = orchestrator.run(&input, &en_fr, |_| {}).await.unwrap();
    assert!(first[0].is_error());
    assert_eq!(provider.request_count(), 4);
    assert_eq!(orchestrator.client().cache().len(), 0);

    let second = orchestrator.run(&input, &en_fr, |_| {}).await.unwrap();
    assert!(!second[0].is_error());
    assert_eq!(provider.request_count(), 5);
}

#[tokio::test]
async fn test_run_chineseSource_shouldAddGlossAndReference() {
    let orchestrator = common::test_orchestrator(MockProvider::working(), OrchestratorOptions::default());
    let doc = Chunker::new(ChunkerOptions::default()).prepare(common::SAMPLE_CHINESE);

    let records = orchestrator.run(&doc.chunks(), &pair("zh", "vi"), |_| {}).await.unwrap();

    assert_eq!(records.len(), 3);
    assert_eq!(records[0].phonetic_gloss.as_deref(), Some("nǐ hǎo shì jiè"));
    assert_eq!(records[0].reference_translation.as_deref(), Some("[English] 你好世界。"));
    assert_eq!(records[2].paragraph, 2);
}

#[tokio::test]
async fn test_run_phoneticSourceTarget_shouldSkipSourceGloss() {
    let options = OrchestratorOptions {
        phonetic_source: PhoneticSource::Target,
        include_reference: false,
        ..Default::default()
    };
    let orchestrator = common::test_orchestrator(MockProvider::working(), options);

    let records = orchestrator.run(&chunks(&["你好。"]), &pair("zh", "vi"), |_| {}).await.unwrap();
    assert!(records[0].phonetic_gloss.is_none());
}

#[tokio::test]
async fn test_run_cancelledBeforeStart_shouldFlagEveryChunk() {
    let provider = MockProvider::working();
    let token = CancellationToken::new();
    let orchestrator = Orchestrator::new(common::test_client(provider.clone(), 1), no_reference(2))
        .with_cancellation(token.clone());
    token.cancel();

    let result = orchestrator.run(&chunks(&["a.", "b."]), &pair("en", "fr"), |_| {}).await;

    let records = match result {
        Err(TranslationError::Cancelled { records }) => records,
        other => panic!("expected cancellation, got {:?}", other),
    };
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.error_state.as_deref() == Some("cancelled")));
    assert_eq!(records[1].target_translation, "[Translation error: cancelled]");
    assert_eq!(provider.request_count(), 0);
}

#[tokio::test]
async fn test_run_cancelledMidway_shouldKeepFinishedRecords() {
    let provider = MockProvider::working();
    let token = CancellationToken::new();
    let orchestrator = Orchestrator::new(common::test_client(provider.clone(), 1), no_reference(1))
        .with_cancellation(token.clone());

    // One worker: the second chunk starts only after the first reports progress
    let result = orchestrator
        .run(&chunks(&["one.", "two.", "three."]), &pair("en", "fr"), |_| token.cancel())
        .await;

    let records = match result {
        Err(TranslationError::Cancelled { records }) => records,
        other => panic!("expected cancellation, got {:?}", other),
    };
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].target_translation, "[French] one.");
    assert!(!records[0].is_error());
    assert!(records[1].is_error() && records[2].is_error());
    assert_eq!(provider.request_count(), 1);
}
