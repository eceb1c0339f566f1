use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::Value;
use url::Url;

use crate::errors::TranslationError;
use crate::providers::{Translator, map_request_error, map_status};

const DEFAULT_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

/// Client for the public Google Translate web endpoint
///
/// No key is needed. The endpoint answers with a nested JSON array whose
/// first element holds `[translated, original, ...]` chunks.
#[derive(Debug)]
pub struct GoogleTranslator {
    /// HTTP client for API requests
    client: Client,
    /// Endpoint URL
    endpoint: String,
}

impl GoogleTranslator {
    pub fn new(endpoint: Option<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder().timeout(timeout).build().unwrap_or_default(),
            endpoint: endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
        }
    }

    fn request_url(&self, text: &str, dest_lang: &str, source_lang: &str) -> Result<Url, TranslationError> {
        Url::parse_with_params(
            &self.endpoint,
            &[
                ("client", "gtx"),
                ("sl", source_lang),
                ("tl", dest_lang),
                ("dt", "t"),
                ("q", text),
            ],
        )
        .map_err(|e| TranslationError::unknown(format!("Invalid Google endpoint {}: {}", self.endpoint, e)))
    }

    /// Concatenate the translated chunks of a response body
    pub(crate) fn parse_response(body: &Value) -> Result<String, TranslationError> {
        let chunks = body
            .get(0)
            .and_then(Value::as_array)
            .ok_or_else(|| TranslationError::unknown("Google returned an unexpected response shape"))?;

        Ok(chunks
            .iter()
            .filter_map(|chunk| chunk.get(0).and_then(Value::as_str))
            .collect())
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    fn name(&self) -> &str {
        "google"
    }

    async fn translate(&self, text: &str, dest_lang: &str, source_lang: &str) -> Result<String, TranslationError> {
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }

        let url = self.request_url(text, dest_lang, source_lang)?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| map_request_error("Google", e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(map_status("Google", status, &error_text));
        }

        let body: Value = response.json().await.map_err(|e| map_request_error("Google", e))?;
        let translated = Self::parse_response(&body)?;
        if translated.is_empty() {
            debug!("Google returned an empty translation, keeping source text");
            return Ok(text.to_string());
        }
        Ok(translated)
    }
}
