use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, header};
use serde::{Deserialize, Serialize};

use crate::errors::TranslationError;
use crate::language_utils::AUTO;
use crate::providers::{Translator, map_request_error, map_status};

const FREE_ENDPOINT: &str = "https://api-free.deepl.com";
const PRO_ENDPOINT: &str = "https://api.deepl.com";

/// DeepL translate request
#[derive(Debug, Serialize)]
struct DeeplRequest<'a> {
    text: Vec<&'a str>,
    target_lang: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_lang: Option<String>,
}

/// DeepL translate response
#[derive(Debug, Deserialize)]
struct DeeplResponse {
    translations: Vec<DeeplTranslation>,
}

#[derive(Debug, Deserialize)]
struct DeeplTranslation {
    text: String,
}

/// DeepL client for the v2 REST API
#[derive(Debug)]
pub struct DeeplTranslator {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// Base URL, picked from the key type unless overridden
    endpoint: String,
}

impl DeeplTranslator {
    pub fn new(api_key: impl Into<String>, endpoint: Option<String>, timeout: Duration) -> Self {
        let api_key = api_key.into();
        // Free-tier keys end with ":fx" and only work against the free host
        let endpoint = endpoint.unwrap_or_else(|| {
            if api_key.ends_with(":fx") { FREE_ENDPOINT } else { PRO_ENDPOINT }.to_string()
        });
        Self {
            client: Client::builder().timeout(timeout).build().unwrap_or_default(),
            api_key,
            endpoint,
        }
    }

    fn api_url(&self) -> String {
        format!("{}/v2/translate", self.endpoint.trim_end_matches('/'))
    }

    /// DeepL wants uppercase codes; source codes carry no region
    fn source_code(source_lang: &str) -> Option<String> {
        if source_lang.eq_ignore_ascii_case(AUTO) || source_lang.is_empty() {
            return None;
        }
        source_lang.split('-').next().map(str::to_uppercase)
    }

    fn target_code(dest_lang: &str) -> String {
        match dest_lang.to_lowercase().as_str() {
            "zh-cn" | "zh" => "ZH".to_string(),
            "zh-tw" => "ZH-HANT".to_string(),
            "no" | "nb" => "NB".to_string(),
            other => other.to_uppercase(),
        }
    }
}

#[async_trait]
impl Translator for DeeplTranslator {
    fn name(&self) -> &str {
        "deepl"
    }

    async fn translate(&self, text: &str, dest_lang: &str, source_lang: &str) -> Result<String, TranslationError> {
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }

        let request = DeeplRequest {
            text: vec![text],
            target_lang: Self::target_code(dest_lang),
            source_lang: Self::source_code(source_lang),
        };

        let response = self
            .client
            .post(self.api_url())
            .header(header::AUTHORIZATION, format!("DeepL-Auth-Key {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| map_request_error("DeepL", e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(map_status("DeepL", status, &error_text));
        }

        let body: DeeplResponse = response.json().await.map_err(|e| map_request_error("DeepL", e))?;
        let translated: String = body.translations.into_iter().map(|t| t.text).collect();
        if translated.is_empty() {
            debug!("DeepL returned an empty translation, keeping source text");
            return Ok(text.to_string());
        }
        Ok(translated)
    }
}
