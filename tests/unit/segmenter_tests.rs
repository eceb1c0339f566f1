/*!
 * Tests for sentence splitting and language detection
 */

use srtrans::translation::segmenter::split_sentences;
use srtrans::translation::{FixedLanguageSegmenter, LanguageSegmenter, TagGuard, WhatlangSegmenter};

fn rebuild(parts: &[(String, String)]) -> String {
    parts.iter().map(|(s, sep)| format!("{}{}", s, sep)).collect()
}

#[test]
fn test_split_sentences_withVariousInputs_shouldReconstructExactly() {
    let inputs = [
        "",
        "   ",
        "One sentence",
        "First. Second! Third?",
        "Dr. Who arrived.\n  Indented line",
        "⟦0⟧Quoted: \"Stop!\"⟦1⟧ Then go.",
        "Trailing spaces.   ",
        "日本語です。次の文。",
    ];
    for input in inputs {
        assert_eq!(rebuild(&split_sentences(input)), input, "input {:?}", input);
    }
}

#[test]
fn test_split_sentences_withClosingQuote_shouldKeepQuoteInSentence() {
    let parts = split_sentences("He said \"no.\" She left.");
    assert_eq!(parts[0].0, "He said \"no.\"");
    assert_eq!(parts[1].0, "She left.");
}

#[test]
fn test_split_sentences_withDecimalNumber_shouldNotSplit() {
    let parts = split_sentences("It costs 3.50 euros.");
    assert_eq!(parts.len(), 1);
}

#[test]
fn test_whatlang_segment_withPlaceholders_shouldIgnoreThemForDetection() {
    let (text, _) = TagGuard::extract(
        "<i>Das ist ein ziemlich langer deutscher Satz über das Wetter in der Stadt heute.</i>",
    );
    let segments = WhatlangSegmenter::default().segment(&text);
    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].detected_lang.as_deref(), Some("de"));
}

#[test]
fn test_whatlang_segment_withOnlyPunctuation_shouldBeUnknown() {
    let segments = WhatlangSegmenter::default().segment("... !!! ???");
    assert!(segments.iter().all(|s| s.detected_lang.is_none()));
}

#[test]
fn test_fixed_segmenter_withoutRules_shouldUseDefault() {
    let segments = FixedLanguageSegmenter::new(Some("it")).segment("Ciao. Come stai?");
    assert_eq!(segments.len(), 2);
    assert!(segments.iter().all(|s| s.detected_lang.as_deref() == Some("it")));
}
