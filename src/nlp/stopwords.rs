//! Stopword lists and stopword-based language guessing
//!
//! Stopwords stay in the token stream (so phrases like "state of the art"
//! survive), but they never start or end a phrase, never form a cluster on
//! their own and carry no weight.

use crate::types::LanguageCode;
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::OnceLock;
use stop_words::LANGUAGE;

/// Languages with a built-in stopword list, in guessing priority order
const LISTED_LANGUAGES: [LanguageCode; 7] = [
    LanguageCode::English,
    LanguageCode::German,
    LanguageCode::French,
    LanguageCode::Spanish,
    LanguageCode::Italian,
    LanguageCode::Portuguese,
    LanguageCode::Dutch,
];

/// Minimum stopword hits before a language guess is trusted
const MIN_GUESS_HITS: usize = 2;

static BUILTIN: OnceLock<FxHashMap<LanguageCode, FxHashSet<String>>> = OnceLock::new();

fn list_language(language: LanguageCode) -> Option<LANGUAGE> {
    match language {
        LanguageCode::English => Some(LANGUAGE::English),
        LanguageCode::German => Some(LANGUAGE::German),
        LanguageCode::French => Some(LANGUAGE::French),
        LanguageCode::Spanish => Some(LANGUAGE::Spanish),
        LanguageCode::Italian => Some(LANGUAGE::Italian),
        LanguageCode::Portuguese => Some(LANGUAGE::Portuguese),
        LanguageCode::Dutch => Some(LANGUAGE::Dutch),
        _ => None,
    }
}

/// Built-in list for `language`, loaded once per process
fn builtin_list(language: LanguageCode) -> Option<&'static FxHashSet<String>> {
    BUILTIN
        .get_or_init(|| {
            LISTED_LANGUAGES
                .iter()
                .filter_map(|&lang| {
                    let words: FxHashSet<String> = stop_words::get(list_language(lang)?)
                        .into_iter()
                        .map(|w| w.to_lowercase())
                        .collect();
                    Some((lang, words))
                })
                .collect()
        })
        .get(&language)
        .filter(|words| !words.is_empty())
}

/// Case-insensitive stopword lookup for one language
#[derive(Debug, Clone, Default)]
pub struct StopwordFilter {
    words: FxHashSet<String>,
}

impl StopwordFilter {
    /// Built-in list for `language`; empty for unlisted or unknown languages
    pub fn new(language: Option<LanguageCode>) -> Self {
        let words = language
            .and_then(builtin_list)
            .cloned()
            .unwrap_or_default();
        Self { words }
    }

    /// Only the given words, for callers that bring their own list
    pub fn custom<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::default().with_words(words)
    }

    /// Extend the list with custom words
    pub fn with_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.words
            .extend(words.into_iter().map(|w| w.as_ref().to_lowercase()));
        self
    }

    pub fn is_stopword(&self, word: &str) -> bool {
        if self.words.contains(word) {
            return true;
        }
        // Avoid the allocation for the common all-lowercase case.
        word.chars().any(char::is_uppercase) && self.words.contains(&word.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Whether a built-in list exists for `language`
    pub fn has_builtin(language: LanguageCode) -> bool {
        builtin_list(language).is_some()
    }
}

/// Guess the language of a text from its stopword profile.
///
/// Returns the listed language with the most stopword hits, provided it has
/// at least two; ties go to the language listed first.
pub fn guess_language<'a>(words: impl IntoIterator<Item = &'a str>) -> Option<LanguageCode> {
    let mut hits = [0usize; LISTED_LANGUAGES.len()];
    for word in words {
        let lower = word.to_lowercase();
        for (slot, language) in LISTED_LANGUAGES.iter().enumerate() {
            if builtin_list(*language).is_some_and(|list| list.contains(&lower)) {
                hits[slot] += 1;
            }
        }
    }

    let mut best: Option<(usize, usize)> = None;
    for (slot, &count) in hits.iter().enumerate() {
        if count >= MIN_GUESS_HITS && best.map_or(true, |(_, c)| count > c) {
            best = Some((slot, count));
        }
    }
    best.map(|(slot, _)| LISTED_LANGUAGES[slot])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_english_stopwords() {
        let filter = StopwordFilter::new(Some(LanguageCode::English));
        assert!(filter.is_stopword("the"));
        assert!(filter.is_stopword("The"));
        assert!(!filter.is_stopword("mining"));
    }

    #[test]
    fn test_unknown_language_has_no_stopwords() {
        let filter = StopwordFilter::new(Some(LanguageCode::Korean));
        assert!(filter.is_empty());
        assert!(!filter.is_stopword("the"));
        assert!(StopwordFilter::new(None).is_empty());
        assert!(!StopwordFilter::has_builtin(LanguageCode::Tamil));
        assert!(StopwordFilter::has_builtin(LanguageCode::Dutch));
    }

    #[test]
    fn test_custom_words() {
        let filter = StopwordFilter::custom(["Foo", "bar"]);
        assert_eq!(filter.len(), 2);
        assert!(filter.is_stopword("foo"));
        assert!(filter.is_stopword("BAR"));
        assert!(!filter.is_stopword("the"));

        let extended = StopwordFilter::new(Some(LanguageCode::English)).with_words(["mining"]);
        assert!(extended.is_stopword("mining"));
        assert!(extended.is_stopword("the"));
    }

    #[test]
    fn test_builtin_lists_loaded() {
        for language in LISTED_LANGUAGES {
            assert!(StopwordFilter::has_builtin(language));
            assert!(!StopwordFilter::new(Some(language)).is_empty());
        }
        assert!(StopwordFilter::new(Some(LanguageCode::German)).is_stopword("und"));
        assert!(StopwordFilter::new(Some(LanguageCode::French)).is_stopword("avec"));
    }

    #[test]
    fn test_guess_language() {
        let english = "the history of the art and the science".split_whitespace();
        assert_eq!(guess_language(english), Some(LanguageCode::English));

        let german = "die Geschichte der Kunst und der Wissenschaft".split_whitespace();
        assert_eq!(guess_language(german), Some(LanguageCode::German));
    }

    #[test]
    fn test_guess_language_needs_evidence() {
        assert_eq!(guess_language("data mining".split_whitespace()), None);
        assert_eq!(guess_language("the mining".split_whitespace()), None);
        assert_eq!(guess_language(std::iter::empty()), None);
    }
}
