/*!
 * Translation backends.
 *
 * This module contains client implementations for the supported translation
 * services, all exposed through the [`Translator`] trait:
 * - Google: the public web translation endpoint
 * - DeepL: the DeepL REST API (requires an API key)
 * - MyMemory: the free MyMemory API
 * - Mock: deterministic offline backend for tests and benchmarks
 */

use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use reqwest::StatusCode;

use crate::app_config::{Config, TranslatorKind};
use crate::errors::TranslationError;

/// Common trait for all translation backends
///
/// Implementations map every backend-specific failure (HTTP status, quota,
/// malformed body) onto [`TranslationError`]. A successful return is trusted
/// as translated text. Retries are the caller's concern.
#[async_trait]
pub trait Translator: Send + Sync + Debug {
    /// Short identifier used in logs
    fn name(&self) -> &str;

    /// Translate `text` into `dest_lang`
    ///
    /// # Arguments
    /// * `text` - The text to translate
    /// * `dest_lang` - Target language code
    /// * `source_lang` - Source language code, or `"auto"`
    async fn translate(&self, text: &str, dest_lang: &str, source_lang: &str) -> Result<String, TranslationError>;
}

/// Build the translator configured in `config`
pub fn create_translator(kind: TranslatorKind, config: &Config) -> Result<Arc<dyn Translator>> {
    let timeout = config.request_timeout();
    let translator: Arc<dyn Translator> = match kind {
        TranslatorKind::Google => Arc::new(google::GoogleTranslator::new(config.endpoint_for(kind), timeout)),
        TranslatorKind::Deepl => {
            let api_key = config
                .deepl_api_key()
                .ok_or_else(|| anyhow!("DeepL API key not found. Set DEEPL_API_KEY or deepl_api_key in the config file."))?;
            Arc::new(deepl::DeeplTranslator::new(api_key, config.endpoint_for(kind), timeout))
        }
        TranslatorKind::MyMemory => Arc::new(mymemory::MyMemoryTranslator::new(config.endpoint_for(kind), timeout)),
        TranslatorKind::Mock => Arc::new(mock::MockTranslator::uppercase()),
    };
    Ok(translator)
}

/// Map a transport error onto the translation error taxonomy
pub(crate) fn map_request_error(backend: &str, error: reqwest::Error) -> TranslationError {
    if error.is_timeout() || error.is_connect() || error.is_request() {
        TranslationError::network(format!("{} request failed: {}", backend, error))
    } else if error.is_decode() {
        TranslationError::unknown(format!("{} returned a malformed response: {}", backend, error))
    } else {
        TranslationError::unknown(format!("{} error: {}", backend, error))
    }
}

/// Map a non-success HTTP status onto the translation error taxonomy
pub(crate) fn map_status(backend: &str, status: StatusCode, body: &str) -> TranslationError {
    let message = format!("{} API error ({}): {}", backend, status, body.chars().take(200).collect::<String>());
    match status.as_u16() {
        429 | 456 => TranslationError::rate_limited(message),
        400 | 404 | 413 | 422 => TranslationError::unsupported(message),
        408 | 502 | 503 | 504 => TranslationError::network(message),
        _ => TranslationError::unknown(message),
    }
}

pub mod deepl;
pub mod google;
pub mod mock;
pub mod mymemory;
