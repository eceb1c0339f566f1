/*!
 * # srtrans - SubRip subtitle translator
 *
 * A Rust library for translating .srt subtitle files through public
 * translation services.
 *
 * ## Features
 *
 * - Tolerant SRT parsing with encoding detection
 * - Translation through several backends:
 *   - Google Translate web endpoint
 *   - DeepL API
 *   - MyMemory API
 * - Inline tags (`<i>`, `<font>`, `{\an8}`) kept out of the backend and restored
 * - Per-sentence language detection for mixed-language subtitles
 * - Bounded parallel translation with ordered results
 * - Partial failures leave the affected blocks in their source language
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `subtitle_processor`: SRT parsing and serialization
 * - `translation`: The block translation pipeline:
 *   - `translation::tags`: Tag extraction and reinsertion
 *   - `translation::segmenter`: Sentence splitting and language detection
 *   - `translation::worker`: Translation of a single block
 *   - `translation::dispatcher`: Parallel execution of blocks
 *   - `translation::concurrency`: Per-backend limits
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `language_utils`: Language code table and validation
 * - `providers`: Translation backend clients
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod providers;
pub mod subtitle_processor;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::{Config, TranslatorKind};
pub use app_controller::{BatchSummary, Controller, FileReport};
pub use errors::{AppError, DispatchError, SubtitleError, TranslationError, TranslationErrorKind};
pub use language_utils::{get_language_name, language_codes_match, validate_language_code};
pub use providers::{Translator, create_translator};
pub use subtitle_processor::{SubtitleDocument, SubtitleEntry};
