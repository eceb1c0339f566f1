/*!
 * Inline tag protection.
 *
 * Subtitle text carries HTML-like styling tags (`<i>`, `<font color="...">`)
 * and SSA override blocks (`{\an8}`). Translation backends mangle or drop
 * markup, so every tag is swapped for an opaque placeholder before the text
 * leaves the process and swapped back afterwards by token match.
 */

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;

/// Opening, closing and self-closing tags plus SSA override blocks.
/// A `<` not followed by a letter (or `/` and a letter) is left as text.
static TAG_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"</?[A-Za-z][A-Za-z0-9]*(?:\s[^<>]*)?/?>|\{\\[^{}]*\}"#).unwrap()
});

/// Anything that still looks like one of our placeholders after reinsertion
static LEFTOVER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[⟦⟧]|\[\[\s*\d+\s*\]\]").unwrap()
});

const OPEN: char = '⟦';
const CLOSE: char = '⟧';

/// Placeholder token for the n-th tag of a block
pub fn placeholder(n: usize) -> String {
    format!("{}{}{}", OPEN, n, CLOSE)
}

/// Regex matching any placeholder token
pub static PLACEHOLDER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"⟦\d+⟧").unwrap()
});

/// One tag replaced by a placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedSpan {
    /// Token standing in for the tag, unique within the block
    pub placeholder: String,
    /// The tag as it appeared in the source
    pub original_tag: String,
    /// Byte offset of the placeholder in the detagged text
    pub position: usize,
}

/// Extracts tags before translation and restores them afterwards
pub struct TagGuard;

impl TagGuard {
    /// Replace every tag with a unique placeholder
    ///
    /// Each tag instance gets its own token, so two identical `<i>` tags are
    /// still distinguishable after translation.
    pub fn extract(text: &str) -> (String, Vec<TaggedSpan>) {
        let mut detagged = String::with_capacity(text.len());
        let mut spans = Vec::new();
        let mut last = 0;

        for m in TAG_REGEX.find_iter(text) {
            detagged.push_str(&text[last..m.start()]);
            let token = placeholder(spans.len());
            spans.push(TaggedSpan {
                placeholder: token.clone(),
                original_tag: m.as_str().to_string(),
                position: detagged.len(),
            });
            detagged.push_str(&token);
            last = m.end();
        }
        detagged.push_str(&text[last..]);

        (detagged, spans)
    }

    /// Put the original tags back in place of their placeholders
    ///
    /// Placeholders are matched by content, not position, since translation
    /// may reorder words. A placeholder the backend dropped means its tag is
    /// omitted. Never fails.
    pub fn reinsert(translated: &str, spans: &[TaggedSpan]) -> String {
        let mut result = translated.to_string();

        for (n, span) in spans.iter().enumerate() {
            if let Some(pos) = result.find(&span.placeholder) {
                result.replace_range(pos..pos + span.placeholder.len(), &span.original_tag);
                continue;
            }

            // Backends sometimes rewrite the brackets or pad the number with spaces
            let recovered = Self::lenient_pattern(n)
                .and_then(|lenient| lenient.find(&result).map(|m| (m.range(), m.as_str().to_string())));
            if let Some((range, fragment)) = recovered {
                debug!("Recovered corrupted placeholder {:?} for tag {}", fragment, span.original_tag);
                result.replace_range(range, &span.original_tag);
                continue;
            }

            debug!("Placeholder {} dropped by backend, omitting tag {}", span.placeholder, span.original_tag);
        }

        // Duplicated tokens would otherwise leak into the subtitle
        for span in spans {
            if result.contains(&span.placeholder) {
                debug!("Removing duplicate placeholder {}", span.placeholder);
                result = result.replace(&span.placeholder, "");
            }
        }

        if LEFTOVER_REGEX.is_match(&result) {
            warn!("Unresolved placeholder fragment left in translated text: {:?}", result);
        }

        result
    }

    /// Corrupted forms of placeholder `n`, never a plain `[n]` from the source text
    ///
    /// Full bracket pairs come first so `⟦ n ⟧` is consumed whole. A lone
    /// `⟦n` or `n⟧` is accepted only on a word boundary, so `⟦10` never
    /// stands in for placeholder 1.
    fn lenient_pattern(n: usize) -> Option<Regex> {
        Regex::new(&format!(
            r"⟦\s*{n}\s*⟧|【\s*{n}\s*】|\[\[\s*{n}\s*\]\]|⟦\s*{n}\b|\b{n}\s*⟧"
        ))
        .ok()
    }

    /// Text with all placeholders removed
    pub fn strip_placeholders(text: &str) -> String {
        PLACEHOLDER_REGEX.replace_all(text, "").into_owned()
    }
}
