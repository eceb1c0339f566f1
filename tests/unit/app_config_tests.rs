/*!
 * Tests for app configuration functionality
 */

use std::time::Duration;

use srtrans::app_config::{Config, TranslatorKind};
use srtrans::translation::CancellationPolicy;
use crate::common;

/// Test that default configuration has expected values
#[test]
fn test_default_config_shouldHaveExpectedValues() {
    let config = Config::default();

    assert_eq!(config.source_language, "auto");
    assert!(config.target_language.is_empty());
    assert_eq!(config.translator, TranslatorKind::Google);
    assert_eq!(config.workers, 1);
    assert_eq!(config.retry_count, 0);
    assert_eq!(config.cancellation_policy, CancellationPolicy::Drain);
    assert!(!config.detect_mixed_languages);
}

/// Test configuration validation
#[test]
fn test_config_validation_withInvalidValues_shouldFail() {
    let mut config = common::test_config(2);
    assert!(config.validate().is_ok());

    config.target_language = "auto".to_string();
    assert!(config.validate().is_err());

    config.target_language = "es".to_string();
    config.source_language = "not-a-language!".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_load_or_default_withPartialFile_shouldFillDefaults() {
    let dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(
        dir.path(),
        "conf.json",
        r#"{"target_language": "fr", "translator": "mymemory", "cancellation_policy": "abandon"}"#,
    )
    .unwrap();

    let config = Config::load_or_default(&path).unwrap();

    assert_eq!(config.target_language, "fr");
    assert_eq!(config.translator, TranslatorKind::MyMemory);
    assert_eq!(config.cancellation_policy, CancellationPolicy::Abandon);
    assert_eq!(config.source_language, "auto");
    assert_eq!(config.task_timeout(), Duration::from_secs(60));
}

#[test]
fn test_load_or_default_withMissingFile_shouldUseDefaults() {
    let dir = common::create_temp_dir().unwrap();
    let config = Config::load_or_default(&dir.path().join("absent.json")).unwrap();
    assert!(config.target_language.is_empty());
}

/// A run with no target from the command line or the file must not guess one
#[test]
fn test_validate_withoutTargetLanguage_shouldFailWithUsageHint() {
    let dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(dir.path(), "conf.json", r#"{"translator": "mymemory"}"#).unwrap();

    let config = Config::load_or_default(&path).unwrap();
    let err = config.validate().unwrap_err();

    assert!(err.to_string().contains("--target/-t is required"));
}

/// Unknown target codes fail validation with a pointer to the language list
#[test]
fn test_validate_withUnknownTargetLanguage_shouldPointToLanguageList() {
    let mut config = common::test_config(1);
    config.target_language = "klingon!".to_string();

    let err = config.validate().unwrap_err();

    assert!(err.to_string().contains("klingon!"));
    assert!(err.to_string().contains("--list-languages"));
}

#[test]
fn test_effective_workers_withMyMemory_shouldBeCapped() {
    let config = Config {
        translator: TranslatorKind::MyMemory,
        workers: 8,
        ..Config::default()
    };
    assert_eq!(config.effective_workers(), 2);

    let config = Config {
        workers: 20,
        ..Config::default()
    };
    assert_eq!(config.effective_workers(), 8);
}

#[test]
fn test_translator_kind_fromStr_shouldIgnoreCase() {
    assert_eq!("DeepL".parse::<TranslatorKind>().unwrap(), TranslatorKind::Deepl);
    assert_eq!("MOCK".parse::<TranslatorKind>().unwrap(), TranslatorKind::Mock);
    assert!("bing".parse::<TranslatorKind>().is_err());
}
