/*!
 * Tests for configuration loading and validation
 */

use std::time::Duration;

use transbook::app_config::{Config, LogLevel, TranslationMode};
use transbook::text::ChunkMode;
use transbook::translation::PhoneticSource;

use crate::common;

#[test]
fn test_default_shouldMatchDocumentedValues() {
    let config = Config::default();

    assert_eq!(config.source_language, "zh");
    assert_eq!(config.target_language, "vi");
    assert_eq!(config.chunking.max_chars, 800);
    assert_eq!(config.chunking.mode, ChunkMode::Budget);
    assert_eq!(config.translation.concurrent_requests, 3);
    assert_eq!(config.translation.reference_language, "en");
    assert_eq!(config.translation.mode, TranslationMode::Standard);
    assert_eq!(config.translation.phonetic_source, PhoneticSource::Auto);
    assert!(config.translation.include_reference);
    assert_eq!(config.log_level, LogLevel::Info);
}

#[test]
fn test_serialization_roundTrip_shouldPreserveOverrides() {
    let mut config = common::test_config("en", "fr");
    config.translation.mode = TranslationMode::WordByWord;
    config.chunking.clause_level = true;

    let json = serde_json::to_string_pretty(&config).unwrap();
    let parsed: Config = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed.source_language, "en");
    assert_eq!(parsed.translation.mode, TranslationMode::WordByWord);
    assert!(parsed.chunking.clause_level);
    assert!(json.contains("\"word_by_word\""));
}

#[test]
fn test_emptyJson_shouldDeserializeToDefaults() {
    let config: Config = serde_json::from_str("{}").unwrap();
    assert_eq!(config.target_language, "vi");
    assert_eq!(config.translation.retry_count, 4);
}

#[test]
fn test_validate_invalidLanguage_shouldFail() {
    let mut config = common::test_config("zh", "vi");
    config.target_language = "not-a-language".to_string();
    let error = config.validate().unwrap_err();
    assert!(error.to_string().contains("target"));
}

#[test]
fn test_validate_invalidReferenceLanguage_shouldFail() {
    let mut config = common::test_config("zh", "vi");
    config.translation.reference_language = "q1q".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_equivalentCodes_shouldBeRejectedAsSame() {
    let config = common::test_config("fr", "fre");
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_ranges_shouldBeEnforced() {
    let mut config = common::test_config("zh", "vi");
    config.translation.concurrent_requests = 17;
    assert!(config.validate().is_err());

    let mut config = common::test_config("zh", "vi");
    config.chunking.max_chars = 20_000;
    assert!(config.validate().is_err());

    let mut config = common::test_config("zh", "vi");
    config.chunking.min_sentence_chars = 900;
    assert!(config.validate().is_err());

    let mut config = common::test_config("zh", "vi");
    config.translation.temperature = 3.5;
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_missingTemplate_shouldFail() {
    let mut config = common::test_config("zh", "vi");
    config.output.template_path = Some("/definitely/not/here.html".to_string());
    assert!(config.validate().is_err());
}

#[test]
fn test_retryPolicy_shouldConvertUnits() {
    let mut config = common::test_config("zh", "vi");
    config.translation.retry_backoff_ms = 250;
    config.translation.quota_delay_secs = 30;

    let policy = config.translation.retry_policy();
    assert_eq!(policy.max_attempts, 2);
    assert_eq!(policy.base_delay, Duration::from_millis(250));
    assert_eq!(policy.quota_delay, Duration::from_secs(30));
}

#[test]
fn test_optionConversions_shouldCarrySettings() {
    let mut config = common::test_config("zh", "vi");
    config.chunking.max_chars = 300;
    config.chunking.line_breaks_are_paragraphs = true;
    config.translation.include_reference = false;
    config.translation.phonetic_source = PhoneticSource::Target;

    let chunker = config.chunking.chunker_options();
    assert_eq!(chunker.budget, 300);
    assert!(chunker.normalizer.line_breaks_are_paragraphs);

    let orchestrator = config.translation.orchestrator_options();
    assert!(!orchestrator.include_reference);
    assert_eq!(orchestrator.phonetic_source, PhoneticSource::Target);

    let client = config.translation.client_config();
    assert_eq!(client.fallback_model.as_deref(), Some("gemini-1.5-pro"));
}

#[test]
fn test_translationMode_fromStr_shouldAcceptAliases() {
    assert_eq!("word-by-word".parse::<TranslationMode>().unwrap(), TranslationMode::WordByWord);
    assert_eq!("Standard".parse::<TranslationMode>().unwrap(), TranslationMode::Standard);
    assert!("fancy".parse::<TranslationMode>().is_err());
}
