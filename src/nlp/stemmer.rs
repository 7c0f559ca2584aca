//! Per-language stemming
//!
//! Stemmers are looked up by language in a [`StemmerRegistry`]. A language
//! without a registered stemmer falls back to [`IdentityStemmer`]; clustering
//! never fails because a language is unsupported.

use crate::types::LanguageCode;
use rust_stemmers::Algorithm;
use rustc_hash::FxHashMap;
use std::borrow::Cow;
use std::sync::Arc;

/// A stemming algorithm. Input is already lowercased.
pub trait Stem: Send + Sync {
    fn stem<'a>(&self, word: &'a str) -> Cow<'a, str>;
}

/// Returns words unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityStemmer;

impl Stem for IdentityStemmer {
    #[inline]
    fn stem<'a>(&self, word: &'a str) -> Cow<'a, str> {
        Cow::Borrowed(word)
    }
}

/// Snowball stemmer backed by `rust_stemmers`
pub struct SnowballStemmer {
    inner: rust_stemmers::Stemmer,
}

impl SnowballStemmer {
    /// Snowball stemmer for `language`, if one exists
    pub fn for_language(language: LanguageCode) -> Option<Self> {
        snowball_algorithm(language).map(|algorithm| Self {
            inner: rust_stemmers::Stemmer::create(algorithm),
        })
    }
}

impl std::fmt::Debug for SnowballStemmer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnowballStemmer").finish_non_exhaustive()
    }
}

impl Stem for SnowballStemmer {
    fn stem<'a>(&self, word: &'a str) -> Cow<'a, str> {
        self.inner.stem(word)
    }
}

fn snowball_algorithm(language: LanguageCode) -> Option<Algorithm> {
    let algorithm = match language {
        LanguageCode::Arabic => Algorithm::Arabic,
        LanguageCode::Danish => Algorithm::Danish,
        LanguageCode::Dutch => Algorithm::Dutch,
        LanguageCode::English => Algorithm::English,
        LanguageCode::Finnish => Algorithm::Finnish,
        LanguageCode::French => Algorithm::French,
        LanguageCode::German => Algorithm::German,
        LanguageCode::Greek => Algorithm::Greek,
        LanguageCode::Hungarian => Algorithm::Hungarian,
        LanguageCode::Italian => Algorithm::Italian,
        LanguageCode::Norwegian => Algorithm::Norwegian,
        LanguageCode::Portuguese => Algorithm::Portuguese,
        LanguageCode::Romanian => Algorithm::Romanian,
        LanguageCode::Russian => Algorithm::Russian,
        LanguageCode::Spanish => Algorithm::Spanish,
        LanguageCode::Swedish => Algorithm::Swedish,
        LanguageCode::Tamil => Algorithm::Tamil,
        LanguageCode::Turkish => Algorithm::Turkish,
        LanguageCode::Polish
        | LanguageCode::Chinese
        | LanguageCode::Japanese
        | LanguageCode::Korean => return None,
    };
    Some(algorithm)
}

/// Language → stemmer lookup with identity fallback
#[derive(Clone)]
pub struct StemmerRegistry {
    stemmers: FxHashMap<LanguageCode, Arc<dyn Stem>>,
    fallback: Arc<dyn Stem>,
}

impl Default for StemmerRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for StemmerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut languages: Vec<_> = self.stemmers.keys().map(|l| l.iso_code()).collect();
        languages.sort_unstable();
        f.debug_struct("StemmerRegistry")
            .field("languages", &languages)
            .finish()
    }
}

impl StemmerRegistry {
    /// A registry with no stemmers; every language is left unstemmed
    pub fn empty() -> Self {
        Self {
            stemmers: FxHashMap::default(),
            fallback: Arc::new(IdentityStemmer),
        }
    }

    /// A registry with a Snowball stemmer for every language that has one
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        for language in LanguageCode::ALL {
            if let Some(stemmer) = SnowballStemmer::for_language(language) {
                registry.register(language, Arc::new(stemmer));
            }
        }
        registry
    }

    /// Register (or replace) the stemmer for a language
    pub fn register(&mut self, language: LanguageCode, stemmer: Arc<dyn Stem>) {
        self.stemmers.insert(language, stemmer);
    }

    /// Builder-style variant of [`register`](Self::register)
    pub fn with(mut self, language: LanguageCode, stemmer: Arc<dyn Stem>) -> Self {
        self.register(language, stemmer);
        self
    }

    /// Stemmer for `language`, or the identity stemmer
    pub fn get(&self, language: Option<LanguageCode>) -> &dyn Stem {
        let stemmer = language
            .and_then(|lang| self.stemmers.get(&lang))
            .unwrap_or(&self.fallback);
        &**stemmer
    }

    pub fn supports(&self, language: LanguageCode) -> bool {
        self.stemmers.contains_key(&language)
    }
}
