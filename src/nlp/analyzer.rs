//! Document analysis: tokenization plus language-dependent normalization
//!
//! The analyzer holds no mutable state and is `Sync`, so documents can be
//! analyzed on separate rayon workers. Term codes are assigned later, in a
//! single pass over the analyzed documents in input order.

use super::stemmer::StemmerRegistry;
use super::stopwords::{guess_language, StopwordFilter};
use super::tokenizer::Tokenizer;
use crate::document::Document;
use crate::types::{FieldKind, LanguageCode, Token, TokenType};
use unicode_segmentation::UnicodeSegmentation;
use rustc_hash::FxHashMap;

/// The tokens of one document, title first
#[derive(Debug, Clone)]
pub struct AnalyzedDocument {
    /// Position of the document in the input batch
    pub position: usize,
    /// Document id (already assigned)
    pub id: u32,
    /// Language used for stemming and stopwords
    pub language: Option<LanguageCode>,
    pub tokens: Vec<Token>,
}

impl AnalyzedDocument {
    /// Tokens of one field, in order
    pub fn field_tokens(&self, field: FieldKind) -> impl Iterator<Item = &Token> {
        self.tokens.iter().filter(move |t| t.field == field)
    }
}

/// Tokenizer + stemmers + stopword lists
#[derive(Debug, Clone)]
pub struct Analyzer {
    tokenizer: Tokenizer,
    stemmers: StemmerRegistry,
    stopwords: FxHashMap<LanguageCode, StopwordFilter>,
    default_language: Option<LanguageCode>,
}

impl Analyzer {
    pub fn new(stemmers: StemmerRegistry, default_language: Option<LanguageCode>) -> Self {
        let stopwords = LanguageCode::ALL
            .iter()
            .copied()
            .filter(|lang| StopwordFilter::has_builtin(*lang))
            .map(|lang| (lang, StopwordFilter::new(Some(lang))))
            .collect();

        Self {
            tokenizer: Tokenizer::new(),
            stemmers,
            stopwords,
            default_language,
        }
    }

    /// Replace the stemmer registry
    pub fn with_stemmers(mut self, stemmers: StemmerRegistry) -> Self {
        self.stemmers = stemmers;
        self
    }

    /// Replace the stopword list of a language
    pub fn with_stopwords(mut self, language: LanguageCode, filter: StopwordFilter) -> Self {
        self.stopwords.insert(language, filter);
        self
    }

    /// Language for documents that carry none: the configured default, else
    /// one guess over the pooled words of every such document in the batch.
    ///
    /// Resolving once per batch keeps a word's normalized form, and hence its
    /// term code, the same across all documents of a run.
    pub fn batch_language<'a>(
        &self,
        documents: impl IntoIterator<Item = &'a Document>,
    ) -> Option<LanguageCode> {
        if self.default_language.is_some() {
            return self.default_language;
        }
        let words = documents
            .into_iter()
            .filter(|d| d.language.is_none())
            .flat_map(|d| [d.title.as_deref(), d.summary.as_deref()])
            .flatten()
            .flat_map(|text| text.unicode_words());
        guess_language(words)
    }

    /// Analyze a single document, resolving its language on its own
    pub fn analyze(&self, position: usize, id: u32, document: &Document) -> AnalyzedDocument {
        let language = self.batch_language([document]);
        self.analyze_with(position, id, document, language)
    }

    /// Analyze one document whose id has already been assigned.
    /// `document.language` wins over `batch_language`.
    pub fn analyze_with(
        &self,
        position: usize,
        id: u32,
        document: &Document,
        batch_language: Option<LanguageCode>,
    ) -> AnalyzedDocument {
        let mut tokens = Vec::new();
        if let Some(title) = document.title.as_deref() {
            tokens.extend(self.tokenizer.tokenize(title, FieldKind::Title));
        }
        if let Some(summary) = document.summary.as_deref() {
            tokens.extend(self.tokenizer.tokenize(summary, FieldKind::Summary));
        }

        let language = document.language.or(batch_language);
        self.normalize(&mut tokens, language);

        AnalyzedDocument {
            position,
            id,
            language,
            tokens,
        }
    }

    /// Mark stopwords and stem, in place. `normalized` must hold the
    /// lowercased surface form on entry.
    fn normalize(&self, tokens: &mut [Token], language: Option<LanguageCode>) {
        let stemmer = self.stemmers.get(language);
        let stopwords = language.and_then(|lang| self.stopwords.get(&lang));

        for token in tokens.iter_mut() {
            match token.token_type {
                TokenType::Word => {
                    token.is_stopword =
                        stopwords.is_some_and(|filter| filter.is_stopword(&token.normalized));
                    if !token.is_stopword {
                        let stem = stemmer.stem(&token.normalized).into_owned();
                        if !stem.is_empty() {
                            token.normalized = stem;
                        }
                    }
                }
                TokenType::Acronym => {
                    token.normalized.retain(|c| c != '.');
                }
                TokenType::Number => {
                    token.normalized.retain(|c| c != ',');
                }
                TokenType::Email | TokenType::Url | TokenType::Punctuation => {}
            }
        }
    }
}
