/*!
 * Single-block translation.
 *
 * A worker turns one `TranslationTask` into exactly one `TranslationResult`:
 * tags are swapped for placeholders, the text is split into language
 * segments, each segment is sent to the backend, and the pieces are glued
 * back together with their original separators before the tags return.
 * A failed block keeps its source text and records the error.
 */

use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};

use crate::errors::TranslationError;
use crate::language_utils::{AUTO, language_codes_match};
use crate::providers::Translator;

use super::segmenter::{LanguageSegment, LanguageSegmenter};
use super::tags::TagGuard;

/// One unit of work: a block's text and the language pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationTask {
    /// 1-based position of the block in its document
    pub index: usize,
    /// Text as it appears in the file, tags included
    pub source_text: String,
    /// Target language code
    pub target_lang: String,
    /// Source language code, or "auto"
    pub source_lang: String,
}

impl TranslationTask {
    pub fn new(index: usize, source_text: impl Into<String>, target_lang: &str, source_lang: &str) -> Self {
        Self {
            index,
            source_text: source_text.into(),
            target_lang: target_lang.to_string(),
            source_lang: source_lang.to_string(),
        }
    }
}

/// Outcome of a task; on error `translated_text` is the source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationResult {
    pub index: usize,
    pub translated_text: String,
    pub error: Option<TranslationError>,
}

impl TranslationResult {
    pub fn success(index: usize, translated_text: String) -> Self {
        Self {
            index,
            translated_text,
            error: None,
        }
    }

    /// Result for a task that could not be translated
    pub fn failure(task: &TranslationTask, error: TranslationError) -> Self {
        Self {
            index: task.index,
            translated_text: task.source_text.clone(),
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Tuning knobs for a worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerOptions {
    /// Extra attempts for rate-limited or network failures
    pub retry_count: u32,
    /// Delay before the first retry, doubled for each further one
    pub retry_backoff: Duration,
    /// Consult the segmenter even when the source language is declared
    pub detect_mixed: bool,
}

impl Default for WorkerOptions {
    fn default() -> Self {
        Self {
            retry_count: 0,
            retry_backoff: Duration::from_millis(1000),
            detect_mixed: false,
        }
    }
}

/// Translates one block at a time; cheap to clone and share across tasks
#[derive(Debug, Clone)]
pub struct BlockTranslationWorker {
    translator: Arc<dyn Translator>,
    segmenter: Arc<dyn LanguageSegmenter>,
    options: WorkerOptions,
}

impl BlockTranslationWorker {
    pub fn new(translator: Arc<dyn Translator>, segmenter: Arc<dyn LanguageSegmenter>) -> Self {
        Self {
            translator,
            segmenter,
            options: WorkerOptions::default(),
        }
    }

    pub fn with_options(mut self, options: WorkerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &WorkerOptions {
        &self.options
    }

    /// Process a task; never fails, errors end up in the result
    pub async fn process(&self, task: &TranslationTask) -> TranslationResult {
        match self.translate_block(task).await {
            Ok(text) => TranslationResult::success(task.index, text),
            Err(e) => {
                warn!("Block {} left untranslated: {}", task.index, e);
                TranslationResult::failure(task, e)
            }
        }
    }

    async fn translate_block(&self, task: &TranslationTask) -> Result<String, TranslationError> {
        let (detagged, spans) = TagGuard::extract(&task.source_text);
        if TagGuard::strip_placeholders(&detagged).trim().is_empty() {
            return Ok(task.source_text.clone());
        }

        let segments = self.plan_segments(&detagged, &task.source_lang);
        let mut translated = String::with_capacity(detagged.len());

        for segment in &segments {
            if TagGuard::strip_placeholders(&segment.text).trim().is_empty() {
                translated.push_str(&segment.text);
            } else {
                let source_lang = segment.lang_or(&task.source_lang);
                let text = self
                    .translate_with_retry(&segment.text, &task.target_lang, source_lang)
                    .await?;
                translated.push_str(&text);
            }
            translated.push_str(&segment.separator);
        }

        Ok(TagGuard::reinsert(&translated, &spans))
    }

    /// Decide which language each part of the block is sent as
    ///
    /// With `auto` every sentence gets its detected language, unknown ones
    /// stay `auto`. With a declared language the whole block is one segment,
    /// unless mixed detection is on, in which case a sentence confidently
    /// detected as another language overrides the declaration.
    fn plan_segments(&self, detagged: &str, source_lang: &str) -> Vec<LanguageSegment> {
        if source_lang.eq_ignore_ascii_case(AUTO) {
            return self.segmenter.segment(detagged);
        }

        if !self.options.detect_mixed {
            return vec![LanguageSegment {
                text: detagged.to_string(),
                detected_lang: Some(source_lang.to_string()),
                separator: String::new(),
            }];
        }

        self.segmenter
            .segment(detagged)
            .into_iter()
            .map(|mut segment| {
                let keep_declared = segment
                    .detected_lang
                    .as_deref()
                    .is_none_or(|detected| language_codes_match(detected, source_lang));
                if keep_declared {
                    segment.detected_lang = Some(source_lang.to_string());
                } else {
                    debug!(
                        "Sentence detected as {:?} overrides declared {}",
                        segment.detected_lang, source_lang
                    );
                }
                segment
            })
            .collect()
    }

    async fn translate_with_retry(
        &self,
        text: &str,
        dest_lang: &str,
        source_lang: &str,
    ) -> Result<String, TranslationError> {
        let mut attempt = 0;
        loop {
            match self.translator.translate(text, dest_lang, source_lang).await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_transient() && attempt < self.options.retry_count => {
                    let delay = self.options.retry_backoff * 2u32.saturating_pow(attempt);
                    debug!(
                        "{} failed ({}), retry {}/{} in {:?}",
                        self.translator.name(),
                        e,
                        attempt + 1,
                        self.options.retry_count,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
