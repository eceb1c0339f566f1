/*!
 * Common test utilities for the srtrans test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use srtrans::app_config::Config;
use srtrans::app_controller::Controller;
use srtrans::providers::Translator;
use srtrans::translation::FixedLanguageSegmenter;


/// Three plain blocks
pub const SIMPLE_SRT: &str = "1
00:00:01,000 --> 00:00:04,000
This is a test subtitle.

2
00:00:05,000 --> 00:00:09,000
It contains multiple entries.

3
00:00:10,000 --> 00:00:14,000
For testing purposes.
";

/// Blocks with inline styling
pub const TAGGED_SRT: &str = "1
00:00:01,000 --> 00:00:02,500
<i>Hello</i> world

2
00:00:03,000 --> 00:00:05,000
<font color=\"#ffff00\">Look out!</font>
<b>Run</b>

3
00:00:06,000 --> 00:00:07,000
{\\an8}Top line
";

/// Routes library log output through the test harness, set RUST_LOG to see it
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: impl AsRef<[u8]>) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Creates a sample subtitle file for testing
pub fn create_test_subtitle(dir: &Path, filename: &str) -> Result<PathBuf> {
    create_test_file(dir, filename, SIMPLE_SRT)
}

/// Builds an SRT file with `count` numbered blocks
pub fn numbered_srt(count: usize) -> String {
    (1..=count)
        .map(|i| {
            let start = i as u64 * 2000;
            format!(
                "{}\n{} --> {}\nline number {}\n\n",
                i,
                format_ms(start),
                format_ms(start + 1500),
                i
            )
        })
        .collect()
}

fn format_ms(ms: u64) -> String {
    srtrans::subtitle_processor::SubtitleEntry::format_timestamp(ms)
}

/// Config targeting Spanish with the given worker count
pub fn test_config(workers: usize) -> Config {
    Config {
        target_language: "es".to_string(),
        source_language: "auto".to_string(),
        workers,
        ..Config::default()
    }
}

/// Controller over an arbitrary translator with a fixed English segmenter
pub fn controller_with(config: Config, translator: Arc<dyn Translator>) -> Controller {
    Controller::with_translator(config, translator, Arc::new(FixedLanguageSegmenter::new(Some("en"))))
}
