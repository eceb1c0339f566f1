use anyhow::{Result, anyhow};
use isolang::Language;
use once_cell::sync::Lazy;
use regex::Regex;

/// Language utilities for translation language codes
///
/// This module exposes the static list of language codes the translation
/// backends commonly accept, validates user supplied codes, and maps
/// detector output onto the same code space.

/// Pseudo language code asking the backend (or the segmenter) to detect the source
pub const AUTO: &str = "auto";

/// Language codes supported by most translation services, with display names
pub static SUPPORTED_LANGUAGES: &[(&str, &str)] = &[
    ("af", "Afrikaans"), ("sq", "Albanian"), ("am", "Amharic"), ("ar", "Arabic"),
    ("hy", "Armenian"), ("az", "Azerbaijani"), ("eu", "Basque"), ("be", "Belarusian"),
    ("bn", "Bengali"), ("bs", "Bosnian"), ("bg", "Bulgarian"), ("ca", "Catalan"),
    ("ceb", "Cebuano"), ("zh-CN", "Chinese (Simplified)"), ("zh-TW", "Chinese (Traditional)"),
    ("co", "Corsican"), ("hr", "Croatian"), ("cs", "Czech"), ("da", "Danish"),
    ("nl", "Dutch"), ("en", "English"), ("eo", "Esperanto"), ("et", "Estonian"),
    ("fi", "Finnish"), ("fr", "French"), ("fy", "Frisian"), ("gl", "Galician"),
    ("ka", "Georgian"), ("de", "German"), ("el", "Greek"), ("gu", "Gujarati"),
    ("ht", "Haitian Creole"), ("ha", "Hausa"), ("haw", "Hawaiian"), ("he", "Hebrew"),
    ("hi", "Hindi"), ("hmn", "Hmong"), ("hu", "Hungarian"), ("is", "Icelandic"),
    ("ig", "Igbo"), ("id", "Indonesian"), ("ga", "Irish"), ("it", "Italian"),
    ("ja", "Japanese"), ("jv", "Javanese"), ("kn", "Kannada"), ("kk", "Kazakh"),
    ("km", "Khmer"), ("rw", "Kinyarwanda"), ("ko", "Korean"), ("ku", "Kurdish"),
    ("ky", "Kyrgyz"), ("lo", "Lao"), ("la", "Latin"), ("lv", "Latvian"),
    ("lt", "Lithuanian"), ("lb", "Luxembourgish"), ("mk", "Macedonian"), ("mg", "Malagasy"),
    ("ms", "Malay"), ("ml", "Malayalam"), ("mt", "Maltese"), ("mi", "Maori"),
    ("mr", "Marathi"), ("mn", "Mongolian"), ("my", "Myanmar (Burmese)"), ("ne", "Nepali"),
    ("no", "Norwegian"), ("ny", "Nyanja (Chichewa)"), ("or", "Odia (Oriya)"), ("ps", "Pashto"),
    ("fa", "Persian"), ("pl", "Polish"), ("pt", "Portuguese"), ("pa", "Punjabi"),
    ("ro", "Romanian"), ("ru", "Russian"), ("sm", "Samoan"), ("gd", "Scots Gaelic"),
    ("sr", "Serbian"), ("st", "Sesotho"), ("sn", "Shona"), ("sd", "Sindhi"),
    ("si", "Sinhala (Sinhalese)"), ("sk", "Slovak"), ("sl", "Slovenian"), ("so", "Somali"),
    ("es", "Spanish"), ("su", "Sundanese"), ("sw", "Swahili"), ("sv", "Swedish"),
    ("tl", "Tagalog (Filipino)"), ("tg", "Tajik"), ("ta", "Tamil"), ("tt", "Tatar"),
    ("te", "Telugu"), ("th", "Thai"), ("tr", "Turkish"), ("tk", "Turkmen"),
    ("uk", "Ukrainian"), ("ur", "Urdu"), ("ug", "Uyghur"), ("uz", "Uzbek"),
    ("vi", "Vietnamese"), ("cy", "Welsh"), ("xh", "Xhosa"), ("yi", "Yiddish"),
    ("yo", "Yoruba"), ("zu", "Zulu"),
];

// Region-qualified codes such as pt-BR or zh-TW
static REGION_CODE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z]{2,3}-[A-Za-z]{2,4}$").unwrap()
});

/// Look up a code in the supported table, ignoring ASCII case
fn lookup(code: &str) -> Option<&'static (&'static str, &'static str)> {
    SUPPORTED_LANGUAGES
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(code))
}

/// Supported languages sorted by display name
pub fn supported_languages() -> Vec<(&'static str, &'static str)> {
    let mut languages: Vec<_> = SUPPORTED_LANGUAGES.to_vec();
    languages.sort_by(|a, b| a.1.cmp(b.1));
    languages
}

/// Render the language table for `--list-languages`
pub fn format_language_list() -> String {
    let rule = "-".repeat(50);
    let mut lines = vec!["Supported language codes:".to_string(), rule.clone()];
    for (code, name) in supported_languages() {
        lines.push(format!("  {:8} - {}", code, name));
    }
    lines.push(rule);
    lines.push("Note: Actual availability depends on the translation service used.".to_string());
    lines.push(format!("Use '{}' for source language to auto-detect.", AUTO));
    lines.join("\n")
}

/// Check whether a language code is likely accepted by the backends
///
/// Accepts the codes of the supported table, any ISO 639-1 or ISO 639-3 code
/// known to isolang, and region-qualified codes like `pt-BR`.
pub fn validate_language_code(code: &str, allow_auto: bool) -> bool {
    let code = code.trim();
    if code.is_empty() {
        return false;
    }
    if code.eq_ignore_ascii_case(AUTO) {
        return allow_auto;
    }
    if lookup(code).is_some() {
        return true;
    }

    let lower = code.to_lowercase();
    match lower.len() {
        2 => Language::from_639_1(&lower).is_some(),
        3 => Language::from_639_3(&lower).is_some(),
        _ => REGION_CODE_REGEX.is_match(code),
    }
}

/// Get the display name of a language code
pub fn get_language_name(code: &str) -> Result<String> {
    if let Some((_, name)) = lookup(code.trim()) {
        return Ok(name.to_string());
    }

    let lower = code.trim().to_lowercase();
    let lang = match lower.len() {
        2 => Language::from_639_1(&lower),
        3 => Language::from_639_3(&lower),
        _ => None,
    };

    lang.map(|l| l.to_name().to_string())
        .ok_or_else(|| anyhow!("Unknown language code: {}", code))
}

/// Check if two language codes represent the same language
///
/// Region suffixes are ignored, so `zh-CN` matches `zh-TW` and `en` matches `en-GB`.
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    let base = |code: &str| -> Option<String> {
        let primary = code.trim().split('-').next()?.to_lowercase();
        match primary.len() {
            2 => Language::from_639_1(&primary).map(|l| l.to_639_3().to_string()),
            3 => Language::from_639_3(&primary).map(|l| l.to_639_3().to_string()),
            _ => None,
        }
    };

    match (base(code1), base(code2)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Map a whatlang detection result onto the code space of the supported table
pub fn whatlang_to_code(lang: whatlang::Lang) -> String {
    match lang {
        whatlang::Lang::Cmn => "zh-CN".to_string(),
        whatlang::Lang::Pes => "fa".to_string(),
        whatlang::Lang::Nob => "no".to_string(),
        other => {
            let part3 = other.code();
            Language::from_639_3(part3)
                .and_then(|l| l.to_639_1())
                .map(|c| c.to_string())
                .unwrap_or_else(|| part3.to_string())
        }
    }
}
