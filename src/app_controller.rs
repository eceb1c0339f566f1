use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

use crate::app_config::Config;
use crate::errors::{AppError, TranslationErrorKind};
use crate::file_utils::FileManager;
use crate::providers::{Translator, create_translator};
use crate::subtitle_processor::SubtitleDocument;
use crate::translation::{
    BlockTranslationWorker, LanguageSegmenter, ParallelDispatcher, TranslationResult, TranslationTask,
    WhatlangSegmenter, WorkerOptions,
};

// @module: Application controller for subtitle processing

/// Outcome of translating one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub input: PathBuf,
    /// Written file; `None` when there was nothing to translate
    pub output: Option<PathBuf>,
    pub total_blocks: usize,
    /// Blocks that kept their source text, with the reason
    pub failed_blocks: Vec<(usize, TranslationErrorKind)>,
    /// Malformed blocks dropped while parsing
    pub skipped_blocks: usize,
    /// Encoding the input was decoded with
    pub encoding: String,
}

impl FileReport {
    pub fn is_complete(&self) -> bool {
        self.failed_blocks.is_empty()
    }
}

/// Outcome of a batch run
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub reports: Vec<FileReport>,
    /// Files that could not be processed at all
    pub failures: Vec<(PathBuf, String)>,
}

impl BatchSummary {
    pub fn succeeded(&self) -> usize {
        self.reports.len()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Main application controller for subtitle translation
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Backend shared by every file of the run
    translator: Arc<dyn Translator>,
    // @field: Sentence splitter and language detector
    segmenter: Arc<dyn LanguageSegmenter>,
    // @field: Interruption signal, set from the CLI
    cancel: Option<watch::Receiver<bool>>,
    // @field: Draw progress bars on the terminal
    show_progress: bool,
}

impl Controller {
    // @method: Create a controller with an explicit backend and segmenter
    pub fn with_translator(
        config: Config,
        translator: Arc<dyn Translator>,
        segmenter: Arc<dyn LanguageSegmenter>,
    ) -> Self {
        Self {
            config,
            translator,
            segmenter,
            cancel: None,
            show_progress: false,
        }
    }

    // @method: Create a controller with the backend named in the configuration
    pub fn from_config(config: Config) -> Result<Self, AppError> {
        let translator =
            create_translator(config.translator, &config).map_err(|e| AppError::Config(e.to_string()))?;
        Ok(Self::with_translator(config, translator, Arc::new(WhatlangSegmenter::default())))
    }

    pub fn with_cancellation(mut self, signal: watch::Receiver<bool>) -> Self {
        self.cancel = Some(signal);
        self
    }

    pub fn with_progress_bars(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn dispatcher(&self, progress_bar: &ProgressBar) -> ParallelDispatcher {
        let worker = BlockTranslationWorker::new(self.translator.clone(), self.segmenter.clone()).with_options(
            WorkerOptions {
                retry_count: self.config.retry_count,
                retry_backoff: self.config.retry_backoff(),
                detect_mixed: self.config.detect_mixed_languages,
            },
        );

        let pb = progress_bar.clone();
        let mut dispatcher = ParallelDispatcher::new(worker, self.config.task_timeout())
            .with_progress(Arc::new(move |completed, _total| pb.set_position(completed as u64)));
        if let Some(signal) = &self.cancel {
            dispatcher = dispatcher.with_cancellation(signal.clone(), self.config.cancellation_policy);
        }
        dispatcher
    }

    fn progress_bar(&self, multi_progress: Option<&MultiProgress>, len: u64, unit: &str) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(len);
        let bar = match multi_progress {
            Some(mp) => mp.add(bar),
            None => bar,
        };
        let template = format!(
            "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {} ({{percent}}%) {{msg}} {{eta}}",
            unit
        );
        let style = ProgressStyle::default_bar()
            .template(&template)
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style.progress_chars("█▓▒░"));
        bar
    }

    /// Translate an in-memory document
    ///
    /// Returns the document with translated texts and the per-block results.
    /// Failed blocks keep their source text. Only cancellation is an error.
    pub async fn translate_document(
        &self,
        document: SubtitleDocument,
    ) -> Result<(SubtitleDocument, Vec<TranslationResult>), AppError> {
        let bar = ProgressBar::hidden();
        self.translate_document_with_progress(document, &bar).await
    }

    async fn translate_document_with_progress(
        &self,
        mut document: SubtitleDocument,
        progress_bar: &ProgressBar,
    ) -> Result<(SubtitleDocument, Vec<TranslationResult>), AppError> {
        let tasks: Vec<TranslationTask> = document
            .get_texts()
            .into_iter()
            .map(|(index, text)| {
                TranslationTask::new(index, text, &self.config.target_language, &self.config.source_language)
            })
            .collect();

        let workers = self.config.effective_workers();
        let results = self.dispatcher(progress_bar).run(tasks, workers).await?;

        document.set_texts(
            results
                .iter()
                .map(|result| (result.index, result.translated_text.clone()))
                .collect(),
        )?;
        Ok((document, results))
    }

    /// Translate one file and write `<stem>_<lang>.srt`
    ///
    /// Nothing is written for a document without subtitles or when the run
    /// is cancelled.
    pub async fn translate_file(&self, input: &Path, output_dir: Option<&Path>) -> Result<FileReport, AppError> {
        self.translate_file_with_progress(input, output_dir, None).await
    }

    async fn translate_file_with_progress(
        &self,
        input: &Path,
        output_dir: Option<&Path>,
        multi_progress: Option<&MultiProgress>,
    ) -> Result<FileReport, AppError> {
        let start_time = Instant::now();
        let document = SubtitleDocument::from_path(input)?;
        let total_blocks = document.len();
        let encoding = document.encoding().to_string();
        let skipped_blocks = document.skipped_blocks();

        if document.is_empty() {
            warn!("No subtitles found in {}", input.display());
            return Ok(FileReport {
                input: input.to_path_buf(),
                output: None,
                total_blocks: 0,
                failed_blocks: Vec::new(),
                skipped_blocks,
                encoding,
            });
        }

        debug!(
            "Translating {} blocks of {} ({}) with {}",
            total_blocks,
            input.display(),
            encoding,
            self.translator.name()
        );

        let bar = self.progress_bar(multi_progress, total_blocks as u64, "blocks");
        if let Some(name) = input.file_name() {
            bar.set_message(name.to_string_lossy().to_string());
        }
        let outcome = self.translate_document_with_progress(document, &bar).await;
        bar.finish_and_clear();
        let (document, results) = outcome?;

        let failed_blocks: Vec<(usize, TranslationErrorKind)> = results
            .iter()
            .filter_map(|result| result.error.as_ref().map(|e| (result.index, e.kind)))
            .collect();

        let output = FileManager::generate_output_path(input, output_dir, &self.config.target_language);
        FileManager::write_atomic(&output, &document.serialize())?;

        if failed_blocks.is_empty() {
            info!(
                "Translated {} -> {} ({} subtitles, {})",
                input.display(),
                output.display(),
                total_blocks,
                format_duration(start_time.elapsed())
            );
        } else {
            warn!(
                "Translated {} -> {} with {} of {} blocks left untranslated",
                input.display(),
                output.display(),
                failed_blocks.len(),
                total_blocks
            );
        }

        Ok(FileReport {
            input: input.to_path_buf(),
            output: Some(output),
            total_blocks,
            failed_blocks,
            skipped_blocks,
            encoding,
        })
    }

    /// Translate several files; a failing file never stops the others
    ///
    /// Cancellation ends the batch: the interrupted file and every file not
    /// yet started are reported as failures.
    pub async fn run_batch(&self, inputs: &[PathBuf], output_dir: Option<&Path>) -> BatchSummary {
        let mut summary = BatchSummary::default();
        let multi_progress = MultiProgress::new();
        let files_bar = self.progress_bar(Some(&multi_progress), inputs.len() as u64, "files");

        info!(
            "Translating {} file(s) to {} using {}",
            inputs.len(),
            self.config.target_language,
            self.config.translator.display_name()
        );

        for (position, input) in inputs.iter().enumerate() {
            match self.translate_file_with_progress(input, output_dir, Some(&multi_progress)).await {
                Ok(report) => summary.reports.push(report),
                Err(AppError::Cancelled(e)) => {
                    error!("{}: {}", input.display(), e);
                    summary.failures.push((input.clone(), e.to_string()));
                    for skipped in &inputs[position + 1..] {
                        summary.failures.push((skipped.clone(), "not started, run cancelled".to_string()));
                    }
                    break;
                }
                Err(e) => {
                    error!("Error for {}: {}", input.display(), e);
                    summary.failures.push((input.clone(), e.to_string()));
                }
            }
            files_bar.inc(1);
        }

        files_bar.finish_and_clear();
        info!(
            "Summary: {} succeeded, {} failed",
            summary.succeeded(),
            summary.failed()
        );
        summary
    }
}

// Format duration in a human-readable format
fn format_duration(duration: std::time::Duration) -> String {
    let total_seconds = duration.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}.{:03}s", seconds, duration.subsec_millis())
    }
}
