/*!
 * Error types for the srtrans application.
 *
 * This module contains custom error types for the different layers of the
 * pipeline, using the thiserror crate for ergonomic error definitions.
 * Block-level errors (parse and translation) are absorbed and reported as
 * metadata; only file-level I/O failures abort the processing of a file.
 */

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Cause of a failed translation call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TranslationErrorKind {
    /// The backend refused the request because of quota or throttling
    RateLimited,
    /// Connection problems, timeouts and transport failures
    NetworkError,
    /// The backend does not support the requested language pair or input
    Unsupported,
    /// Anything else, including malformed responses
    Unknown,
}

impl fmt::Display for TranslationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::RateLimited => "rate limited",
            Self::NetworkError => "network error",
            Self::Unsupported => "unsupported",
            Self::Unknown => "unknown error",
        };
        write!(f, "{}", name)
    }
}

/// Error returned by a translation backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct TranslationError {
    /// Error category
    pub kind: TranslationErrorKind,
    /// Backend-specific detail
    pub message: String,
}

impl TranslationError {
    pub fn new(kind: TranslationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(TranslationErrorKind::RateLimited, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(TranslationErrorKind::NetworkError, message)
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::new(TranslationErrorKind::Unsupported, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(TranslationErrorKind::Unknown, message)
    }

    /// Whether a caller-side retry has a chance of succeeding
    pub fn is_transient(&self) -> bool {
        matches!(
            self.kind,
            TranslationErrorKind::RateLimited | TranslationErrorKind::NetworkError
        )
    }
}

/// Errors that can occur while working with subtitle documents
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubtitleError {
    /// A block could not be parsed; it is skipped, never fatal for the document
    #[error("Malformed subtitle block {block}: {reason}")]
    Parse {
        /// 1-based position of the raw block in the file
        block: usize,
        /// What was wrong with it
        reason: String,
    },

    /// A translated text referenced an entry that does not exist
    #[error("No subtitle entry with index {0}")]
    UnknownIndex(usize),
}

/// Input bytes could not be decoded with the detected encoding
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Could not decode input as {encoding}, fell back to {fallback}")]
pub struct EncodingError {
    /// Encoding that was tried first
    pub encoding: String,
    /// Encoding actually used
    pub fallback: String,
}

/// Errors that stop a dispatcher run
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The run was cancelled before every task produced a result
    #[error("Translation cancelled after {completed} of {total} blocks")]
    Cancelled {
        /// Tasks that had finished when the run stopped
        completed: usize,
        /// Tasks submitted
        total: usize,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Input unreadable or output unwritable; aborts this file only
    #[error("I/O error on {path}: {source}")]
    FatalIo {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration or arguments
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from subtitle processing
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Run interrupted; nothing was written
    #[error("{0}")]
    Cancelled(#[from] DispatchError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl AppError {
    pub fn fatal_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FatalIo {
            path: path.into(),
            source,
        }
    }
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::FatalIo {
            path: PathBuf::new(),
            source: error,
        }
    }
}
