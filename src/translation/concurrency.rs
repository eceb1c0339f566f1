/*!
 * Backend-specific concurrency tuning.
 *
 * Free web endpoints throttle aggressively, so each backend gets a cap on
 * parallel workers and a request timeout suited to its characteristics.
 */

use std::time::Duration;

use log::warn;

use crate::app_config::TranslatorKind;

/// Upper bound for the worker count accepted from the command line
pub const MAX_WORKERS: usize = 8;

/// Backend-specific concurrency profile with tuned defaults
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendProfile {
    /// Maximum concurrent requests
    pub max_workers: usize,
    /// Timeout for a single HTTP request
    pub request_timeout: Duration,
}

impl BackendProfile {
    /// Get the profile for a given backend
    pub fn for_backend(kind: TranslatorKind) -> Self {
        match kind {
            TranslatorKind::Google => Self {
                max_workers: 8,
                request_timeout: Duration::from_secs(30),
            },
            // Free tier keys hit 429 quickly
            TranslatorKind::Deepl => Self {
                max_workers: 4,
                request_timeout: Duration::from_secs(30),
            },
            TranslatorKind::MyMemory => Self {
                max_workers: 2,
                request_timeout: Duration::from_secs(30),
            },
            TranslatorKind::Mock => Self {
                max_workers: MAX_WORKERS,
                request_timeout: Duration::from_secs(5),
            },
        }
    }

    /// Clamp a requested worker count to `1..=MAX_WORKERS` and to this profile
    pub fn effective_workers(&self, requested: usize) -> usize {
        let clamped = requested.clamp(1, MAX_WORKERS);
        if clamped != requested {
            warn!("Worker count {} out of range, using {}", requested, clamped);
        }
        if clamped > self.max_workers {
            warn!(
                "Backend allows at most {} parallel workers, reducing from {}",
                self.max_workers, clamped
            );
            return self.max_workers;
        }
        clamped
    }
}
