/*!
 * Tests for error types
 */

use std::io;

use srtrans::errors::{AppError, DispatchError, SubtitleError, TranslationError, TranslationErrorKind};

#[test]
fn test_translation_error_kind_display_shouldBeReadable() {
    assert_eq!(TranslationErrorKind::NetworkError.to_string(), "network error");
    assert_eq!(TranslationErrorKind::Unsupported.to_string(), "unsupported");
}

#[test]
fn test_app_error_fatal_io_shouldNamePath() {
    let err = AppError::fatal_io("/tmp/out.srt", io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
    let message = err.to_string();
    assert!(message.contains("/tmp/out.srt"));
    assert!(message.contains("denied"));
}

#[test]
fn test_app_error_from_conversions_shouldPickVariant() {
    let err: AppError = SubtitleError::UnknownIndex(4).into();
    assert!(matches!(err, AppError::Subtitle(SubtitleError::UnknownIndex(4))));

    let err: AppError = TranslationError::unsupported("xx").into();
    assert!(matches!(err, AppError::Translation(_)));

    let err: AppError = anyhow::anyhow!("boom").into();
    assert_eq!(err.to_string(), "Unknown error: boom");
}

#[test]
fn test_dispatch_error_cancelled_shouldReportCounts() {
    let err = DispatchError::Cancelled { completed: 0, total: 3 };
    assert_eq!(err.to_string(), "Translation cancelled after 0 of 3 blocks");
}
