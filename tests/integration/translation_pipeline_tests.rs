/*!
 * End-to-end tests for single file translation
 *
 * Files are read from and written to temporary directories, with offline
 * translators standing in for the web backends.
 */

use std::fs;
use std::sync::Arc;

use tokio::sync::watch;

use srtrans::errors::{AppError, TranslationErrorKind};
use srtrans::providers::mock::MockTranslator;
use srtrans::subtitle_processor::SubtitleDocument;
use crate::common;
use crate::common::mock_translators::{JitterTranslator, ManglingTranslator, PlaceholderMangling};

/// Test the full read, translate, write cycle keeps tags and timing
#[tokio::test]
async fn test_translate_file_withTaggedSubtitles_shouldPreserveTagsAndTimestamps() {
    common::init_test_logging();
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(dir.path(), "movie.srt", common::TAGGED_SRT).unwrap();
    let controller = common::controller_with(common::test_config(2), Arc::new(MockTranslator::uppercase()));

    let report = controller.translate_file(&input, None).await.unwrap();

    let output = report.output.clone().unwrap();
    assert_eq!(output, dir.path().join("movie_es.srt"));
    assert!(report.is_complete());
    assert_eq!(report.total_blocks, 3);

    let source = SubtitleDocument::parse(common::TAGGED_SRT.as_bytes());
    let translated = SubtitleDocument::from_path(&output).unwrap();
    assert_eq!(translated.len(), source.len());
    for (before, after) in source.entries().iter().zip(translated.entries()) {
        assert_eq!(before.start_time_ms, after.start_time_ms);
        assert_eq!(before.end_time_ms, after.end_time_ms);
    }
    assert_eq!(translated.entries()[0].text, "<i>HELLO</i> WORLD");
    assert_eq!(translated.entries()[1].text, "<font color=\"#ffff00\">LOOK OUT!</font>\n<b>RUN</b>");
    assert_eq!(translated.entries()[2].text, "{\\an8}TOP LINE");
}

#[tokio::test]
async fn test_translate_file_withManglingBackends_shouldNeverLeakPlaceholders() {
    common::init_test_logging();
    for mangling in [
        PlaceholderMangling::SquareBrackets,
        PlaceholderMangling::Spaces,
        PlaceholderMangling::Drop,
        PlaceholderMangling::MoveToEnd,
    ] {
        let dir = common::create_temp_dir().unwrap();
        let input = common::create_test_file(dir.path(), "movie.srt", common::TAGGED_SRT).unwrap();
        let controller =
            common::controller_with(common::test_config(3), Arc::new(ManglingTranslator::new(mangling)));

        let report = controller.translate_file(&input, None).await.unwrap();
        let written = fs::read_to_string(report.output.unwrap()).unwrap();

        assert!(!written.contains('⟦'), "{:?} leaked: {}", mangling, written);
        assert!(!written.contains('⟧'), "{:?} leaked: {}", mangling, written);
        assert!(!written.contains("[["), "{:?} leaked: {}", mangling, written);
        assert!(written.contains("HELLO"));
    }
}

#[tokio::test]
async fn test_translate_file_withFailingBlock_shouldKeepSourceTextAndReportIt() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_test_subtitle(dir.path(), "movie.srt").unwrap();
    let mock = MockTranslator::uppercase().failing_on("multiple", TranslationErrorKind::Unsupported);
    let controller = common::controller_with(common::test_config(2), Arc::new(mock));

    let report = controller.translate_file(&input, None).await.unwrap();

    assert_eq!(report.failed_blocks, vec![(2, TranslationErrorKind::Unsupported)]);
    let translated = SubtitleDocument::from_path(report.output.unwrap()).unwrap();
    assert_eq!(translated.entries()[0].text, "THIS IS A TEST SUBTITLE.");
    assert_eq!(translated.entries()[1].text, "It contains multiple entries.");
    assert_eq!(translated.entries()[2].text, "FOR TESTING PURPOSES.");
}

#[tokio::test]
async fn test_translate_file_withNoSubtitles_shouldWriteNothing() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(dir.path(), "empty.srt", "\n\n   \n").unwrap();
    let mock = Arc::new(MockTranslator::uppercase());
    let controller = common::controller_with(common::test_config(1), mock.clone());

    let report = controller.translate_file(&input, None).await.unwrap();

    assert!(report.output.is_none());
    assert_eq!(report.total_blocks, 0);
    assert!(!dir.path().join("empty_es.srt").exists());
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn test_translate_file_whenCancelled_shouldNotWriteOutput() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(dir.path(), "long.srt", common::numbered_srt(10)).unwrap();
    let (tx, rx) = watch::channel(false);
    tx.send(true).unwrap();
    let controller = common::controller_with(common::test_config(2), Arc::new(MockTranslator::uppercase()))
        .with_cancellation(rx);

    let err = controller.translate_file(&input, None).await.unwrap_err();

    assert!(matches!(err, AppError::Cancelled(_)));
    assert!(!dir.path().join("long_es.srt").exists());
}

/// Output must not depend on how many workers translated it
#[tokio::test]
async fn test_translate_file_withDifferentWorkerCounts_shouldWriteIdenticalBytes() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(dir.path(), "series.srt", common::numbered_srt(25)).unwrap();

    let mut outputs = Vec::new();
    for workers in [1, 4] {
        let out_dir = dir.path().join(format!("w{}", workers));
        let controller = common::controller_with(common::test_config(workers), Arc::new(JitterTranslator::new(8)));
        let report = controller.translate_file(&input, Some(out_dir.as_path())).await.unwrap();
        outputs.push(fs::read(report.output.unwrap()).unwrap());
    }

    assert_eq!(outputs[0], outputs[1]);
    let text = String::from_utf8(outputs[0].clone()).unwrap();
    assert!(text.contains("[es] line number 25"));
}

#[tokio::test]
async fn test_translate_file_withLatin1Input_shouldWriteUtf8() {
    let dir = common::create_temp_dir().unwrap();
    let raw = b"1\r\n00:00:01,000 --> 00:00:02,000\r\nOl\xe9, se\xf1or\r\n".to_vec();
    let input = common::create_test_file(dir.path(), "latin.srt", raw).unwrap();
    let controller = common::controller_with(common::test_config(1), Arc::new(MockTranslator::identity()));

    let report = controller.translate_file(&input, None).await.unwrap();

    assert_eq!(report.encoding, "windows-1252");
    let written = fs::read_to_string(report.output.unwrap()).unwrap();
    assert_eq!(written, "1\n00:00:01,000 --> 00:00:02,000\nOlé, señor\n\n");
}

#[tokio::test]
async fn test_translate_file_withIdentityBackend_shouldRoundTrip() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(dir.path(), "movie.srt", common::TAGGED_SRT).unwrap();
    let controller = common::controller_with(common::test_config(4), Arc::new(MockTranslator::identity()));

    let report = controller.translate_file(&input, None).await.unwrap();

    let original = SubtitleDocument::parse(common::TAGGED_SRT.as_bytes());
    let translated = SubtitleDocument::from_path(report.output.unwrap()).unwrap();
    assert_eq!(original.entries(), translated.entries());
}

#[tokio::test]
async fn test_translate_file_withMalformedBlock_shouldReportSkipped() {
    let dir = common::create_temp_dir().unwrap();
    let content = format!("{}\n5\nbroken timing\nlost text\n", common::SIMPLE_SRT);
    let input = common::create_test_file(dir.path(), "broken.srt", content).unwrap();
    let controller = common::controller_with(common::test_config(1), Arc::new(MockTranslator::uppercase()));

    let report = controller.translate_file(&input, None).await.unwrap();

    assert_eq!(report.skipped_blocks, 1);
    assert_eq!(report.total_blocks, 3);
}
