/*!
 * Tests for file utilities
 */

use std::path::PathBuf;

use transbook::file_utils::FileManager;

use crate::common;

#[test]
fn test_readInput_existingFile_shouldReturnContent() {
    let dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(dir.path(), "book.txt", common::SAMPLE_CHINESE).unwrap();

    assert_eq!(FileManager::read_input(&path).unwrap(), common::SAMPLE_CHINESE);
}

#[test]
fn test_fileExists_directory_shouldBeFalse() {
    let dir = common::create_temp_dir().unwrap();
    assert!(!FileManager::file_exists(dir.path()));
    assert!(FileManager::file_exists(
        common::create_test_file(dir.path(), "a.txt", "a").unwrap()
    ));
}

#[test]
fn test_ensureDir_nested_shouldCreateAll() {
    let dir = common::create_temp_dir().unwrap();
    let nested = dir.path().join("a/b/c");

    FileManager::ensure_dir(&nested).unwrap();
    FileManager::ensure_dir(&nested).unwrap();
    assert!(nested.is_dir());
}

#[test]
fn test_generateOutputPath_shouldLowercaseLanguage() {
    let path = FileManager::generate_output_path("chapter-1.md", "out", "ZH");
    assert_eq!(path, PathBuf::from("out/chapter-1.zh.html"));
}

#[test]
fn test_loadTemplate_missingFile_shouldFail() {
    let dir = common::create_temp_dir().unwrap();
    assert!(FileManager::load_template(Some(&dir.path().join("nope.html"))).is_err());
}
