use anyhow::{Context, Result, anyhow};
use log::{LevelFilter, debug};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use crate::language_utils::validate_language_code;
use crate::translation::concurrency::BackendProfile;
use crate::translation::dispatcher::CancellationPolicy;

/// Application configuration module
/// This module handles loading and validating the configuration. Values come
/// from an optional JSON file and are then overridden by command line flags.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language code, or "auto"
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Target language code
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Translation backend
    #[serde(default)]
    pub translator: TranslatorKind,

    /// Number of blocks translated in parallel
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Upper bound for one block, retries included
    #[serde(default = "default_task_timeout_secs")]
    pub task_timeout_secs: u64,

    /// Extra attempts for rate-limited or network failures
    #[serde(default)]
    pub retry_count: u32,

    /// Initial backoff between attempts, doubled each time
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Detect sentence languages even when the source language is given
    #[serde(default)]
    pub detect_mixed_languages: bool,

    /// What to do with in-flight blocks on interruption
    #[serde(default)]
    pub cancellation_policy: CancellationPolicy,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// DeepL authentication key, the DEEPL_API_KEY variable takes precedence
    #[serde(default)]
    pub deepl_api_key: Option<String>,

    /// Endpoint overrides, mostly for self-hosted proxies and tests
    #[serde(default)]
    pub endpoints: Endpoints,
}

/// Translation backend type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslatorKind {
    // @backend: Google web endpoint, no key
    #[default]
    Google,
    // @backend: DeepL API
    Deepl,
    // @backend: MyMemory API
    MyMemory,
    // @backend: offline deterministic backend
    Mock,
}

impl TranslatorKind {
    // @returns: Capitalized backend name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Google => "Google",
            Self::Deepl => "DeepL",
            Self::MyMemory => "MyMemory",
            Self::Mock => "Mock",
        }
    }

    // @returns: Lowercase backend identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Deepl => "deepl",
            Self::MyMemory => "mymemory",
            Self::Mock => "mock",
        }
    }
}

impl std::fmt::Display for TranslatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TranslatorKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "google" => Ok(Self::Google),
            "deepl" => Ok(Self::Deepl),
            "mymemory" => Ok(Self::MyMemory),
            "mock" => Ok(Self::Mock),
            _ => Err(anyhow!("Invalid translator type: {}", s)),
        }
    }
}

/// Per-backend endpoint overrides
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Endpoints {
    #[serde(default)]
    pub google: Option<String>,
    #[serde(default)]
    pub deepl: Option<String>,
    #[serde(default)]
    pub mymemory: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

fn default_source_language() -> String {
    crate::language_utils::AUTO.to_string()
}

// No implicit target, a run must name one
fn default_target_language() -> String {
    String::new()
}

fn default_workers() -> usize {
    1
}

fn default_task_timeout_secs() -> u64 {
    60
}

fn default_retry_backoff_ms() -> u64 {
    1000
}

impl Config {
    /// Load the configuration file if it exists, defaults otherwise
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;
        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if !validate_language_code(&self.source_language, true) {
            return Err(anyhow!("Invalid source language code: {}", self.source_language));
        }
        if self.target_language.trim().is_empty() {
            return Err(anyhow!(
                "--target/-t is required. Specify the target language code (e.g., -t es)."
            ));
        }
        if !validate_language_code(&self.target_language, false) {
            return Err(anyhow!(
                "Invalid target language code: {}. Use --list-languages to see common codes.",
                self.target_language
            ));
        }
        if self.workers == 0 {
            return Err(anyhow!("Worker count must be at least 1"));
        }
        if self.task_timeout_secs == 0 {
            return Err(anyhow!("Task timeout must be at least 1 second"));
        }
        if self.translator == TranslatorKind::Deepl && self.deepl_api_key().is_none() {
            return Err(anyhow!("DeepL API key is required (set DEEPL_API_KEY or deepl_api_key)"));
        }
        Ok(())
    }

    /// DeepL key from the environment or the config file
    pub fn deepl_api_key(&self) -> Option<String> {
        std::env::var("DEEPL_API_KEY")
            .ok()
            .or_else(|| self.deepl_api_key.clone())
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
    }

    /// Endpoint override for a backend
    pub fn endpoint_for(&self, kind: TranslatorKind) -> Option<String> {
        match kind {
            TranslatorKind::Google => self.endpoints.google.clone(),
            TranslatorKind::Deepl => self.endpoints.deepl.clone(),
            TranslatorKind::MyMemory => self.endpoints.mymemory.clone(),
            TranslatorKind::Mock => None,
        }
    }

    pub fn profile(&self) -> BackendProfile {
        BackendProfile::for_backend(self.translator)
    }

    /// HTTP timeout for the configured backend
    pub fn request_timeout(&self) -> Duration {
        self.profile().request_timeout
    }

    /// Worker count after range and backend clamping
    pub fn effective_workers(&self) -> usize {
        self.profile().effective_workers(self.workers)
    }

    pub fn task_timeout(&self) -> Duration {
        Duration::from_secs(self.task_timeout_secs.max(1))
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Self {
            source_language: default_source_language(),
            target_language: default_target_language(),
            translator: TranslatorKind::default(),
            workers: default_workers(),
            task_timeout_secs: default_task_timeout_secs(),
            retry_count: 0,
            retry_backoff_ms: default_retry_backoff_ms(),
            detect_mixed_languages: false,
            cancellation_policy: CancellationPolicy::default(),
            log_level: LogLevel::default(),
            deepl_api_key: None,
            endpoints: Endpoints::default(),
        }
    }
}
