/*!
 * Tests for language code utilities
 */

use transbook::language_utils::{
    contains_han, display_name, get_language_name, has_phonetic_system, language_codes_match,
    normalize_to_part2t, speech_tag, validate_language_code,
};

#[test]
fn test_validateLanguageCode_shouldAcceptAllIsoForms() {
    for code in ["zh", "ZH", "zho", "chi", "vi", "vie", " en "] {
        assert!(validate_language_code(code).is_ok(), "rejected {}", code);
    }
    for code in ["", "x", "zz", "abcd", "q1q"] {
        assert!(validate_language_code(code).is_err(), "accepted {}", code);
    }
}

#[test]
fn test_normalizeToPart2t_shouldMapBibliographicCodes() {
    assert_eq!(normalize_to_part2t("ger").unwrap(), "deu");
    assert_eq!(normalize_to_part2t("de").unwrap(), "deu");
    assert!(normalize_to_part2t("xx").is_err());
}

#[test]
fn test_getLanguageName_shouldReturnEnglishName() {
    assert_eq!(get_language_name("zh").unwrap(), "Chinese");
    assert_eq!(get_language_name("fra").unwrap(), "French");
    assert_eq!(display_name("en"), "English");
}

#[test]
fn test_languageCodesMatch_shouldIgnoreForm() {
    assert!(language_codes_match("vi", "VIE"));
    assert!(!language_codes_match("zh", "ja"));
}

#[test]
fn test_scriptHelpers_shouldDetectChinese() {
    assert!(has_phonetic_system("cmn"));
    assert!(contains_han("abc 中 def"));
    assert!(!contains_han("abc"));
    assert_eq!(speech_tag("zh"), "zh-CN");
    assert_eq!(speech_tag("klingon"), "klingon");
}
