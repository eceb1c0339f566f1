/*!
 * Sentence segmentation with per-sentence language detection.
 *
 * Real subtitle files often mix two spoken languages inside one block, so
 * the block is split into sentences and each sentence gets its own language
 * guess. Detection is local and deterministic; no network calls.
 */

use std::fmt::Debug;

use log::trace;

use crate::language_utils::whatlang_to_code;
use super::tags::TagGuard;

/// Abbreviations whose trailing period does not end a sentence
const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "st", "jr", "sr", "vs", "mt", "sgt", "capt", "lt", "col", "gen",
    "e.g", "i.e", "sra", "srta", "dra", "mme", "mlle", "fr",
];

/// One sentence-like unit of a block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageSegment {
    /// Sentence text, without the trailing separator
    pub text: String,
    /// Detected language code, `None` when detection was not confident
    pub detected_lang: Option<String>,
    /// Whitespace that followed the sentence in the source
    pub separator: String,
}

impl LanguageSegment {
    /// Detected language, or the given fallback when unknown
    pub fn lang_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.detected_lang.as_deref().unwrap_or(fallback)
    }
}

/// Splits text into sentences tagged with a detected language
pub trait LanguageSegmenter: Send + Sync + Debug {
    /// Concatenating `text + separator` of the returned segments reproduces the input
    fn segment(&self, text: &str) -> Vec<LanguageSegment>;
}

/// Segmenter backed by the whatlang trigram detector
#[derive(Debug, Clone)]
pub struct WhatlangSegmenter {
    /// Sentences with fewer letters than this are reported as unknown
    min_letters: usize,
}

impl WhatlangSegmenter {
    pub fn new(min_letters: usize) -> Self {
        Self { min_letters }
    }

    fn detect(&self, sentence: &str) -> Option<String> {
        let clean = TagGuard::strip_placeholders(sentence);
        let letters = clean.chars().filter(|c| c.is_alphabetic()).count();
        if letters < self.min_letters {
            return None;
        }

        let info = whatlang::detect(&clean)?;
        if !info.is_reliable() {
            trace!("Unreliable detection {:?} ({:.2}) for {:?}", info.lang(), info.confidence(), clean);
            return None;
        }
        Some(whatlang_to_code(info.lang()))
    }
}

impl Default for WhatlangSegmenter {
    fn default() -> Self {
        Self::new(12)
    }
}

impl LanguageSegmenter for WhatlangSegmenter {
    fn segment(&self, text: &str) -> Vec<LanguageSegment> {
        split_sentences(text)
            .into_iter()
            .map(|(sentence, separator)| LanguageSegment {
                detected_lang: if sentence.trim().is_empty() { None } else { self.detect(&sentence) },
                text: sentence,
                separator,
            })
            .collect()
    }
}

/// Deterministic segmenter for tests and offline runs
///
/// Uses the same sentence splitting as [`WhatlangSegmenter`] but assigns
/// languages from a list of `(marker, code)` rules: the first rule whose
/// marker occurs in the sentence wins, otherwise the default applies.
#[derive(Debug, Clone, Default)]
pub struct FixedLanguageSegmenter {
    rules: Vec<(String, String)>,
    default_lang: Option<String>,
}

impl FixedLanguageSegmenter {
    pub fn new(default_lang: Option<&str>) -> Self {
        Self {
            rules: Vec::new(),
            default_lang: default_lang.map(str::to_string),
        }
    }

    pub fn with_rule(mut self, marker: &str, lang: &str) -> Self {
        self.rules.push((marker.to_string(), lang.to_string()));
        self
    }
}

impl LanguageSegmenter for FixedLanguageSegmenter {
    fn segment(&self, text: &str) -> Vec<LanguageSegment> {
        split_sentences(text)
            .into_iter()
            .map(|(sentence, separator)| {
                let detected_lang = self
                    .rules
                    .iter()
                    .find(|(marker, _)| sentence.contains(marker.as_str()))
                    .map(|(_, lang)| lang.clone())
                    .or_else(|| self.default_lang.clone());
                LanguageSegment {
                    text: sentence,
                    detected_lang,
                    separator,
                }
            })
            .collect()
    }
}

fn is_terminator(c: char) -> bool {
    matches!(c, '.' | '!' | '?' | '…' | '。' | '！' | '？' | '‼' | '⁉')
}

fn is_cjk_terminator(c: char) -> bool {
    matches!(c, '。' | '！' | '？')
}

fn is_closing(c: char) -> bool {
    matches!(c, '"' | '\'' | '”' | '’' | '»' | ')' | ']' | '」' | '』')
}

/// Length in chars of a placeholder token starting at `i`, if any
fn placeholder_len(chars: &[(usize, char)], i: usize) -> Option<usize> {
    if chars.get(i)?.1 != '⟦' {
        return None;
    }
    let mut j = i + 1;
    while j < chars.len() && chars[j].1.is_ascii_digit() {
        j += 1;
    }
    (j > i + 1 && chars.get(j)?.1 == '⟧').then_some(j + 1 - i)
}

/// Whether the period closing `sentence` belongs to an abbreviation or an initial
fn ends_with_abbreviation(sentence: &str) -> bool {
    let word = TagGuard::strip_placeholders(sentence.split_whitespace().last().unwrap_or(""));
    let word = word.trim_end_matches('.').trim_start_matches(|c: char| !c.is_alphanumeric());
    if word.is_empty() {
        return false;
    }
    let single_initial = word.chars().count() == 1 && word.chars().all(|c| c.is_uppercase());
    single_initial || ABBREVIATIONS.contains(&word.to_lowercase().as_str())
}

/// Split text into `(sentence, separator)` pairs
///
/// A sentence ends at a line break, or at terminal punctuation (with any
/// closing quotes, brackets and placeholders glued to it) followed by
/// whitespace. CJK full stops end a sentence even without whitespace.
/// Leading whitespace becomes an empty sentence so nothing is lost.
pub fn split_sentences(text: &str) -> Vec<(String, String)> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let byte_at = |i: usize| chars.get(i).map(|(b, _)| *b).unwrap_or(text.len());
    let mut parts = Vec::new();

    let mut i = 0;
    while i < chars.len() && chars[i].1.is_whitespace() {
        i += 1;
    }
    if i > 0 {
        parts.push((String::new(), text[..byte_at(i)].to_string()));
    }
    let mut sentence_start = byte_at(i);

    while i < chars.len() {
        let c = chars[i].1;
        let end = if c == '\n' {
            Some(i)
        } else if is_terminator(c) {
            let mut j = i + 1;
            loop {
                if j < chars.len() && (is_terminator(chars[j].1) || is_closing(chars[j].1)) {
                    j += 1;
                } else if let Some(len) = placeholder_len(&chars, j) {
                    j += len;
                } else {
                    break;
                }
            }
            let at_boundary = j == chars.len() || chars[j].1.is_whitespace() || is_cjk_terminator(c);
            let abbreviation = c == '.' && ends_with_abbreviation(&text[sentence_start..byte_at(i + 1)]);
            if at_boundary && !abbreviation {
                Some(j)
            } else {
                i = j;
                continue;
            }
        } else {
            None
        };

        match end {
            Some(end_idx) => {
                let mut k = end_idx;
                while k < chars.len() && chars[k].1.is_whitespace() {
                    k += 1;
                }
                parts.push((
                    text[sentence_start..byte_at(end_idx)].to_string(),
                    text[byte_at(end_idx)..byte_at(k)].to_string(),
                ));
                sentence_start = byte_at(k);
                i = k;
            }
            None => i += 1,
        }
    }

    if sentence_start < text.len() {
        parts.push((text[sentence_start..].to_string(), String::new()));
    }
    parts
}
