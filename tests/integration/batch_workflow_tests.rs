/*!
 * Tests for multi-file batch runs
 */

use std::fs;
use std::sync::Arc;

use srtrans::file_utils::FileManager;
use srtrans::providers::mock::MockTranslator;
use crate::common;

/// Test a batch over a directory writes one output per input
#[tokio::test]
async fn test_run_batch_withDirectory_shouldTranslateEveryFile() {
    let dir = common::create_temp_dir().unwrap();
    let input_dir = dir.path().join("input");
    let out_dir = dir.path().join("output");
    common::create_test_subtitle(&input_dir, "a.srt").unwrap();
    common::create_test_subtitle(&input_dir, "b.srt").unwrap();
    common::create_test_file(&input_dir, "extras/c.srt", common::TAGGED_SRT).unwrap();

    let files = FileManager::find_srt_files(&[&input_dir]);
    let controller = common::controller_with(common::test_config(2), Arc::new(MockTranslator::uppercase()));
    let summary = controller.run_batch(&files, Some(out_dir.as_path())).await;

    assert_eq!(summary.succeeded(), 3);
    assert!(!summary.has_failures());
    for name in ["a_es.srt", "b_es.srt", "c_es.srt"] {
        assert!(out_dir.join(name).exists(), "missing {}", name);
    }
}

#[tokio::test]
async fn test_run_batch_withMissingFile_shouldContinueWithOthers() {
    common::init_test_logging();
    let dir = common::create_temp_dir().unwrap();
    let first = common::create_test_subtitle(dir.path(), "first.srt").unwrap();
    let missing = dir.path().join("vanished.srt");
    let last = common::create_test_subtitle(dir.path(), "last.srt").unwrap();

    let controller = common::controller_with(common::test_config(1), Arc::new(MockTranslator::uppercase()));
    let summary = controller.run_batch(&[first, missing.clone(), last], None).await;

    assert_eq!(summary.succeeded(), 2);
    assert_eq!(summary.failed(), 1);
    assert_eq!(summary.failures[0].0, missing);
    assert!(dir.path().join("first_es.srt").exists());
    assert!(dir.path().join("last_es.srt").exists());
}

#[tokio::test]
async fn test_run_batch_withPartialFailures_shouldStillCountFileAsSucceeded() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_test_subtitle(dir.path(), "movie.srt").unwrap();
    let mock = MockTranslator::uppercase().failing_on("purposes", srtrans::errors::TranslationErrorKind::RateLimited);

    let controller = common::controller_with(common::test_config(2), Arc::new(mock));
    let summary = controller.run_batch(&[input], None).await;

    assert_eq!(summary.succeeded(), 1);
    assert!(!summary.reports[0].is_complete());
    let written = fs::read_to_string(dir.path().join("movie_es.srt")).unwrap();
    assert!(written.contains("For testing purposes."));
}

#[tokio::test]
async fn test_run_batch_whenCancelled_shouldMarkRemainingFiles() {
    let dir = common::create_temp_dir().unwrap();
    let files: Vec<_> = ["one.srt", "two.srt", "three.srt"]
        .iter()
        .map(|name| common::create_test_subtitle(dir.path(), name).unwrap())
        .collect();

    let (tx, rx) = tokio::sync::watch::channel(false);
    tx.send(true).unwrap();
    let controller = common::controller_with(common::test_config(1), Arc::new(MockTranslator::uppercase()))
        .with_cancellation(rx);
    let summary = controller.run_batch(&files, None).await;

    assert_eq!(summary.succeeded(), 0);
    assert_eq!(summary.failed(), 3);
    assert_eq!(summary.failures[2].1, "not started, run cancelled");
    assert!(!dir.path().join("one_es.srt").exists());
}
