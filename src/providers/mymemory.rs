use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::Value;
use url::Url;

use crate::errors::TranslationError;
use crate::language_utils::AUTO;
use crate::providers::{Translator, map_request_error, map_status};

const DEFAULT_ENDPOINT: &str = "https://api.mymemory.translated.net/get";

/// MyMemory expects full locale codes
static LOCALE_CODES: &[(&str, &str)] = &[
    ("af", "af-ZA"), ("sq", "sq-AL"), ("am", "am-ET"), ("ar", "ar-SA"), ("hy", "hy-AM"),
    ("az", "az-AZ"), ("eu", "eu-ES"), ("be", "be-BY"), ("bn", "bn-IN"), ("bs", "bs-BA"),
    ("bg", "bg-BG"), ("ca", "ca-ES"), ("ceb", "ceb-PH"), ("zh", "zh-CN"), ("hr", "hr-HR"),
    ("cs", "cs-CZ"), ("da", "da-DK"), ("nl", "nl-NL"), ("en", "en-GB"), ("eo", "eo-EU"),
    ("et", "et-EE"), ("fi", "fi-FI"), ("fr", "fr-FR"), ("gl", "gl-ES"), ("ka", "ka-GE"),
    ("de", "de-DE"), ("el", "el-GR"), ("gu", "gu-IN"), ("ht", "ht-HT"), ("ha", "ha-NE"),
    ("haw", "haw-US"), ("he", "he-IL"), ("hi", "hi-IN"), ("hu", "hu-HU"), ("is", "is-IS"),
    ("ig", "ig-NG"), ("id", "id-ID"), ("ga", "ga-IE"), ("it", "it-IT"), ("ja", "ja-JP"),
    ("jv", "jv-ID"), ("kn", "kn-IN"), ("kk", "kk-KZ"), ("km", "km-KH"), ("rw", "rw-RW"),
    ("ko", "ko-KR"), ("ku", "kmr-TR"), ("ky", "ky-KG"), ("lo", "lo-LA"), ("la", "la-XN"),
    ("lv", "lv-LV"), ("lt", "lt-LT"), ("lb", "lb-LU"), ("mk", "mk-MK"), ("mg", "mg-MG"),
    ("ms", "ms-MY"), ("ml", "ml-IN"), ("mt", "mt-MT"), ("mi", "mi-NZ"), ("mr", "mr-IN"),
    ("mn", "mn-MN"), ("my", "my-MM"), ("ne", "ne-NP"), ("no", "nb-NO"), ("ny", "ny-MW"),
    ("or", "or-IN"), ("ps", "ps-PK"), ("fa", "fa-IR"), ("pl", "pl-PL"), ("pt", "pt-PT"),
    ("pa", "pa-IN"), ("ro", "ro-RO"), ("ru", "ru-RU"), ("sm", "sm-WS"), ("gd", "gd-GB"),
    ("sr", "sr-Latn-RS"), ("sn", "sn-ZW"), ("sd", "sd-PK"), ("si", "si-LK"), ("sk", "sk-SK"),
    ("sl", "sl-SI"), ("so", "so-SO"), ("es", "es-ES"), ("su", "su-ID"), ("sw", "sw-KE"),
    ("sv", "sv-SE"), ("tl", "tl-PH"), ("tg", "tg-TJ"), ("ta", "ta-IN"), ("tt", "tt-RU"),
    ("te", "te-IN"), ("th", "th-TH"), ("tr", "tr-TR"), ("tk", "tk-TM"), ("uk", "uk-UA"),
    ("ur", "ur-PK"), ("ug", "ug-CN"), ("uz", "uz-UZ"), ("vi", "vi-VN"), ("cy", "cy-GB"),
    ("xh", "xh-ZA"), ("yi", "yi-YD"), ("yo", "yo-NG"), ("zu", "zu-ZA"),
];

/// Client for the free MyMemory API
#[derive(Debug)]
pub struct MyMemoryTranslator {
    client: Client,
    endpoint: String,
}

impl MyMemoryTranslator {
    pub fn new(endpoint: Option<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder().timeout(timeout).build().unwrap_or_default(),
            endpoint: endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
        }
    }

    /// Full locale for a short code
    ///
    /// MyMemory cannot auto-detect, so `auto` becomes English. Codes that
    /// already carry a region are passed through.
    pub fn locale_code(code: &str) -> String {
        if code.is_empty() || code.eq_ignore_ascii_case(AUTO) {
            return "en-GB".to_string();
        }
        if code.contains('-') {
            return code.to_string();
        }
        let lower = code.to_lowercase();
        LOCALE_CODES
            .iter()
            .find(|(short, _)| *short == lower)
            .map(|(_, full)| full.to_string())
            .unwrap_or_else(|| format!("{}-{}", lower, lower.to_uppercase()))
    }

    /// Extract the translation, mapping in-body error statuses
    pub(crate) fn parse_response(body: &Value) -> Result<String, TranslationError> {
        // responseStatus is a number on success and sometimes a string on errors
        let status = match body.get("responseStatus") {
            Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
            Some(Value::String(s)) => s.parse().unwrap_or(0),
            _ => 0,
        };
        let details = body
            .get("responseDetails")
            .and_then(Value::as_str)
            .unwrap_or_default();

        match status {
            200 => body
                .pointer("/responseData/translatedText")
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| TranslationError::unknown("MyMemory response has no translatedText")),
            429 => Err(TranslationError::rate_limited(format!("MyMemory quota exceeded: {}", details))),
            403 if details.to_uppercase().contains("LANGUAGE") => {
                Err(TranslationError::unsupported(format!("MyMemory: {}", details)))
            }
            other => Err(TranslationError::unknown(format!("MyMemory status {}: {}", other, details))),
        }
    }
}

#[async_trait]
impl Translator for MyMemoryTranslator {
    fn name(&self) -> &str {
        "mymemory"
    }

    async fn translate(&self, text: &str, dest_lang: &str, source_lang: &str) -> Result<String, TranslationError> {
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }

        let langpair = format!("{}|{}", Self::locale_code(source_lang), Self::locale_code(dest_lang));
        let url = Url::parse_with_params(&self.endpoint, &[("q", text), ("langpair", langpair.as_str())])
            .map_err(|e| TranslationError::unknown(format!("Invalid MyMemory endpoint {}: {}", self.endpoint, e)))?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| map_request_error("MyMemory", e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(map_status("MyMemory", status, &error_text));
        }

        let body: Value = response.json().await.map_err(|e| map_request_error("MyMemory", e))?;
        let translated = Self::parse_response(&body)?;
        if translated.is_empty() {
            debug!("MyMemory returned an empty translation, keeping source text");
            return Ok(text.to_string());
        }
        Ok(translated)
    }
}
