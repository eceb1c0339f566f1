/*!
 * Subtitle block translation pipeline.
 *
 * This module contains the pieces that turn subtitle text into translated
 * text, split into several submodules:
 *
 * - `tags`: Tag extraction and reinsertion around backend calls
 * - `segmenter`: Sentence splitting and per-sentence language detection
 * - `worker`: Translation of a single block
 * - `dispatcher`: Bounded parallel execution with ordered results
 * - `concurrency`: Per-backend worker caps and timeouts
 */

// Re-export main types for easier usage
pub use self::concurrency::BackendProfile;
pub use self::dispatcher::{CancellationPolicy, ParallelDispatcher, ProgressCallback};
pub use self::segmenter::{FixedLanguageSegmenter, LanguageSegment, LanguageSegmenter, WhatlangSegmenter};
pub use self::tags::{TagGuard, TaggedSpan};
pub use self::worker::{BlockTranslationWorker, TranslationResult, TranslationTask, WorkerOptions};

// Submodules
pub mod concurrency;
pub mod dispatcher;
pub mod segmenter;
pub mod tags;
pub mod worker;
