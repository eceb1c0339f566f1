// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, error, info, warn};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::sync::watch;

use srtrans::app_config::{Config, LogLevel, TranslatorKind};
use srtrans::app_controller::Controller;
use srtrans::file_utils::FileManager;
use srtrans::language_utils::format_language_list;

/// CLI Wrapper for TranslatorKind to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslator {
    Google,
    Deepl,
    Mymemory,
    /// Offline backend that uppercases text, for dry runs
    Mock,
}

impl From<CliTranslator> for TranslatorKind {
    fn from(cli_translator: CliTranslator) -> Self {
        match cli_translator {
            CliTranslator::Google => TranslatorKind::Google,
            CliTranslator::Deepl => TranslatorKind::Deepl,
            CliTranslator::Mymemory => TranslatorKind::MyMemory,
            CliTranslator::Mock => TranslatorKind::Mock,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate shell completions for srtrans
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// srtrans - SubRip subtitle translator
///
/// Translates .srt files while keeping timing and inline styling tags.
#[derive(Parser, Debug)]
#[command(name = "srtrans")]
#[command(version)]
#[command(about = "Translate SRT subtitle files to any language")]
#[command(args_conflicts_with_subcommands = true)]
#[command(long_about = "srtrans translates SubRip (.srt) subtitle files block by block, keeping
timestamps and inline tags such as <i> or <font> intact.

EXAMPLES:
    srtrans movie.srt -t es                        # Translate to Spanish
    srtrans ./subs/ -t fr --translator mymemory    # Whole directory to French
    srtrans movie.srt -t de -w 4                   # Parallel translation
    srtrans movie.srt -t en -s auto --detect-mixed # Per-sentence language detection
    srtrans --list-languages                       # Show supported languages
    srtrans completions bash > srtrans.bash        # Generate bash completions

CONFIGURATION:
    Settings are read from conf.json if present (see --config). Command line
    flags override the file. DeepL needs DEEPL_API_KEY or deepl_api_key.

SUPPORTED TRANSLATORS:
    google   - Google Translate web endpoint (default)
    deepl    - DeepL API (requires API key)
    mymemory - MyMemory API (free, rate limited)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// SRT files or directories containing SRT files
    #[arg(value_name = "INPUT_PATHS")]
    input_paths: Vec<PathBuf>,

    /// Target language code (e.g., 'en', 'es', 'zh-CN')
    #[arg(short, long = "target")]
    target_language: Option<String>,

    /// Source language code, or 'auto' to detect
    #[arg(short, long = "source")]
    source_language: Option<String>,

    /// Translation service to use
    #[arg(long, value_enum)]
    translator: Option<CliTranslator>,

    /// Directory for translated files (default: next to the originals)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Number of parallel workers (1-8)
    #[arg(short, long)]
    workers: Option<usize>,

    /// Timeout per subtitle block in seconds
    #[arg(long = "timeout")]
    timeout_secs: Option<u64>,

    /// Retries for rate-limited or network failures
    #[arg(long)]
    retries: Option<u32>,

    /// Detect languages per sentence even when --source is given
    #[arg(long)]
    detect_mixed: bool,

    /// Configuration file path
    #[arg(short, long = "config", default_value = "conf.json")]
    config_path: PathBuf,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Display supported language codes and exit
    #[arg(long)]
    list_languages: bool,
}

// @struct: Custom logger implementation, filtered by the global max level
struct CustomLogger;

impl CustomLogger {
    // @initializes: Global logger; the max level can be changed later
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Color escape and emoji for a log level
    fn decoration(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "❌ "),
            Level::Warn => ("\x1B[1;33m", "🚧 "),
            Level::Info => ("\x1B[1;32m", " "),
            Level::Debug => ("\x1B[1;36m", "🔍 "),
            Level::Trace => ("\x1B[1;35m", "📋 "),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, emoji) = Self::decoration(record.level());
            let _ = writeln!(std::io::stderr(), "{}{} {} {}\x1B[0m", color, now, emoji, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Some(Commands::Completions { shell }) = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "srtrans", &mut std::io::stdout());
        return Ok(ExitCode::SUCCESS);
    }

    if cli.list_languages {
        println!("{}", format_language_list());
        return Ok(ExitCode::SUCCESS);
    }

    run_translate(cli).await
}

/// Merge the config file with command line overrides
fn build_config(options: &CommandLineOptions) -> Result<Config> {
    let mut config = Config::load_or_default(&options.config_path)?;

    if let Some(target) = &options.target_language {
        config.target_language = target.clone();
    }
    if let Some(source) = &options.source_language {
        config.source_language = source.clone();
    }
    if let Some(translator) = &options.translator {
        config.translator = translator.clone().into();
    }
    if let Some(workers) = options.workers {
        config.workers = workers;
    }
    if let Some(timeout) = options.timeout_secs {
        config.task_timeout_secs = timeout;
    }
    if let Some(retries) = options.retries {
        config.retry_count = retries;
    }
    if options.detect_mixed {
        config.detect_mixed_languages = true;
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
    Ok(config)
}

async fn run_translate(options: CommandLineOptions) -> Result<ExitCode> {
    if options.input_paths.is_empty() {
        return Err(anyhow!("INPUT_PATHS is required. Provide SRT files or directories."));
    }

    let config = build_config(&options)?;
    log::set_max_level(config.log_level.to_level_filter());

    config.validate().context("Configuration validation failed")?;

    let files = FileManager::find_srt_files(&options.input_paths);
    if files.is_empty() {
        warn!("No SRT files found to translate.");
        return Ok(ExitCode::SUCCESS);
    }

    // Ctrl-C flips the signal; the dispatcher stops and nothing is written
    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping translation");
            let _ = cancel_tx.send(true);
        }
    });

    let controller = Controller::from_config(config)?
        .with_cancellation(cancel_rx.clone())
        .with_progress_bars(true);

    let summary = controller.run_batch(&files, options.output_dir.as_deref()).await;

    for report in summary.reports.iter().filter(|r| !r.is_complete()) {
        let blocks: Vec<String> = report
            .failed_blocks
            .iter()
            .map(|(index, kind)| format!("#{} ({})", index, kind))
            .collect();
        warn!("{}: untranslated blocks {}", report.input.display(), blocks.join(", "));
    }
    for (path, reason) in &summary.failures {
        error!("{}: {}", path.display(), reason);
    }
    info!(
        "--- Summary: {} succeeded, {} failed ---",
        summary.succeeded(),
        summary.failed()
    );

    if *cancel_rx.borrow() {
        return Ok(ExitCode::from(130));
    }
    if summary.has_failures() {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
