/*!
 * Tests for single block translation
 */

use std::sync::Arc;
use std::time::Duration;

use srtrans::errors::TranslationErrorKind;
use srtrans::providers::mock::MockTranslator;
use srtrans::translation::{
    BlockTranslationWorker, FixedLanguageSegmenter, TranslationTask, WorkerOptions,
};
use crate::common::mock_translators::{ManglingTranslator, PlaceholderMangling};

fn worker_over(mock: Arc<MockTranslator>) -> BlockTranslationWorker {
    BlockTranslationWorker::new(mock, Arc::new(FixedLanguageSegmenter::new(Some("en"))))
}

/// Tags must come back in the same places around the translated words
#[tokio::test]
async fn test_process_withStyledMultilineBlock_shouldKeepTagsAndLineBreaks() {
    let mock = Arc::new(MockTranslator::uppercase());
    let task = TranslationTask::new(
        2,
        "<font color=\"#ffff00\">Look out!</font>\n<b>Run</b>",
        "es",
        "auto",
    );

    let result = worker_over(mock.clone()).process(&task).await;

    assert!(result.is_success());
    assert_eq!(result.translated_text, "<font color=\"#ffff00\">LOOK OUT!</font>\n<b>RUN</b>");
    assert_eq!(mock.call_count(), 2);
}

#[tokio::test]
async fn test_process_withTagOnlyBlock_shouldNotCallBackend() {
    let mock = Arc::new(MockTranslator::uppercase());
    let task = TranslationTask::new(1, "{\\an8}<i> </i>", "es", "auto");

    let result = worker_over(mock.clone()).process(&task).await;

    assert_eq!(result.translated_text, "{\\an8}<i> </i>");
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn test_process_withUnsupportedPair_shouldRecordKindAndKeepSource() {
    let mock = Arc::new(MockTranslator::uppercase().failing_on("Klingon", TranslationErrorKind::Unsupported));
    let task = TranslationTask::new(3, "<i>Klingon</i> words", "tlh", "en");

    let result = worker_over(mock).process(&task).await;

    assert_eq!(result.index, 3);
    assert_eq!(result.translated_text, "<i>Klingon</i> words");
    assert_eq!(result.error.map(|e| e.kind), Some(TranslationErrorKind::Unsupported));
}

#[tokio::test]
async fn test_process_withUnsupportedError_shouldNotRetry() {
    let mock = Arc::new(MockTranslator::uppercase().failing_on("nope", TranslationErrorKind::Unsupported));
    let worker = worker_over(mock.clone()).with_options(WorkerOptions {
        retry_count: 3,
        retry_backoff: Duration::from_millis(1),
        detect_mixed: false,
    });

    let result = worker.process(&TranslationTask::new(1, "nope", "es", "en")).await;

    assert!(!result.is_success());
    assert_eq!(mock.call_count(), 1);
}

#[tokio::test]
async fn test_process_withExhaustedRetries_shouldFailWithNetworkError() {
    let mock = Arc::new(MockTranslator::uppercase().with_transient_failures(5));
    let worker = worker_over(mock.clone()).with_options(WorkerOptions {
        retry_count: 2,
        retry_backoff: Duration::from_millis(1),
        detect_mixed: false,
    });

    let result = worker.process(&TranslationTask::new(1, "hello", "es", "en")).await;

    assert_eq!(result.error.map(|e| e.kind), Some(TranslationErrorKind::NetworkError));
    assert_eq!(mock.call_count(), 3);
}

#[tokio::test]
async fn test_process_withSquareBracketMangling_shouldRecoverTags() {
    let worker = BlockTranslationWorker::new(
        Arc::new(ManglingTranslator::new(PlaceholderMangling::SquareBrackets)),
        Arc::new(FixedLanguageSegmenter::new(Some("en"))),
    );

    let result = worker
        .process(&TranslationTask::new(1, "<i>Hello</i> world", "es", "en"))
        .await;

    assert_eq!(result.translated_text, "<i>HELLO</i> WORLD");
}

#[tokio::test]
async fn test_process_withDroppedPlaceholders_shouldReturnPlainTranslation() {
    let worker = BlockTranslationWorker::new(
        Arc::new(ManglingTranslator::new(PlaceholderMangling::Drop)),
        Arc::new(FixedLanguageSegmenter::new(Some("en"))),
    );

    let result = worker
        .process(&TranslationTask::new(1, "<i>Hello</i> world", "es", "en"))
        .await;

    assert!(result.is_success());
    assert_eq!(result.translated_text, "HELLO WORLD");
}

#[tokio::test]
async fn test_process_withTargetLanguage_shouldPassItToBackend() {
    let mock = Arc::new(MockTranslator::identity());
    worker_over(mock.clone())
        .process(&TranslationTask::new(1, "Good morning", "fr", "en"))
        .await;

    let calls = mock.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].dest_lang, "fr");
    assert_eq!(calls[0].source_lang, "en");
}
