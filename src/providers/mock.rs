/*!
 * Mock translator for tests, benches and offline runs.
 *
 * The mock transforms text deterministically:
 * - `MockTranslator::uppercase()` - Uppercases letters, placeholders untouched
 * - `MockTranslator::identity()` - Returns the text as is
 * - `MockTranslator::dictionary()` - Replaces known phrases, leaves the rest
 *
 * Failures can be injected per text fragment and responses can be delayed to
 * shuffle completion order.
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::Rng;
use std::ops::RangeInclusive;
use std::time::Duration;

use crate::errors::{TranslationError, TranslationErrorKind};
use crate::providers::Translator;

/// One recorded call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    pub text: String,
    pub dest_lang: String,
    pub source_lang: String,
}

/// How the mock transforms text
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Uppercase everything
    Uppercase,
    /// Return the input
    Identity,
    /// Replace dictionary phrases (longest first)
    Dictionary(Vec<(String, String)>),
}

/// Deterministic translator
#[derive(Debug)]
pub struct MockTranslator {
    behavior: MockBehavior,
    /// Texts containing a fragment fail with its kind, checked in registration order
    failures: Vec<(String, TranslationErrorKind)>,
    /// Random delay range in milliseconds
    delay_ms: Option<RangeInclusive<u64>>,
    /// Remaining number of calls that fail transiently before succeeding
    transient_failures: Mutex<usize>,
    calls: Mutex<Vec<MockCall>>,
}

impl MockTranslator {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            failures: Vec::new(),
            delay_ms: None,
            transient_failures: Mutex::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn uppercase() -> Self {
        Self::new(MockBehavior::Uppercase)
    }

    pub fn identity() -> Self {
        Self::new(MockBehavior::Identity)
    }

    pub fn dictionary(entries: &[(&str, &str)]) -> Self {
        let mut entries: Vec<(String, String)> = entries
            .iter()
            .map(|(from, to)| (from.to_string(), to.to_string()))
            .collect();
        entries.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        Self::new(MockBehavior::Dictionary(entries))
    }

    /// Fail every call whose text contains `fragment`
    ///
    /// When several fragments match, the one registered first decides the kind.
    pub fn failing_on(mut self, fragment: &str, kind: TranslationErrorKind) -> Self {
        self.failures.push((fragment.to_string(), kind));
        self
    }

    /// Sleep a random time within the range before answering
    pub fn with_delay_ms(mut self, range: RangeInclusive<u64>) -> Self {
        self.delay_ms = Some(range);
        self
    }

    /// The next `count` calls fail with a network error
    pub fn with_transient_failures(self, count: usize) -> Self {
        *self.transient_failures.lock() = count;
        self
    }

    /// Calls received so far, in arrival order
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    fn transform(&self, text: &str) -> String {
        match &self.behavior {
            MockBehavior::Uppercase => text.to_uppercase(),
            MockBehavior::Identity => text.to_string(),
            MockBehavior::Dictionary(entries) => entries
                .iter()
                .fold(text.to_string(), |acc, (from, to)| acc.replace(from.as_str(), to)),
        }
    }
}

#[async_trait]
impl Translator for MockTranslator {
    fn name(&self) -> &str {
        "mock"
    }

    async fn translate(&self, text: &str, dest_lang: &str, source_lang: &str) -> Result<String, TranslationError> {
        self.calls.lock().push(MockCall {
            text: text.to_string(),
            dest_lang: dest_lang.to_string(),
            source_lang: source_lang.to_string(),
        });

        if let Some(range) = &self.delay_ms {
            let millis = rand::rng().random_range(range.clone());
            tokio::time::sleep(Duration::from_millis(millis)).await;
        }

        {
            let mut remaining = self.transient_failures.lock();
            if *remaining > 0 {
                *remaining -= 1;
                return Err(TranslationError::network("mock transient failure"));
            }
        }

        if let Some((fragment, kind)) = self.failures.iter().find(|(fragment, _)| text.contains(fragment.as_str())) {
            return Err(TranslationError::new(*kind, format!("mock failure on {:?}", fragment)));
        }

        if text.trim().is_empty() {
            return Ok(text.to_string());
        }
        Ok(self.transform(text))
    }
}
