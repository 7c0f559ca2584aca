//! Core types for rapid_stc
//!
//! This module defines the fundamental data structures shared by the
//! pipeline stages: language codes, classified tokens and the clustering
//! configuration.

use crate::errors::{ClusteringError, Result};
use serde::{Deserialize, Serialize};

// ============================================================================
// Language
// ============================================================================

/// Languages the pipeline knows about.
///
/// Languages without a stemmer or stopword list are still accepted; their
/// tokens are normalized by lowercasing only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LanguageCode {
    #[serde(rename = "ar")]
    Arabic,
    #[serde(rename = "da")]
    Danish,
    #[serde(rename = "nl")]
    Dutch,
    #[serde(rename = "en")]
    English,
    #[serde(rename = "fi")]
    Finnish,
    #[serde(rename = "fr")]
    French,
    #[serde(rename = "de")]
    German,
    #[serde(rename = "el")]
    Greek,
    #[serde(rename = "hu")]
    Hungarian,
    #[serde(rename = "it")]
    Italian,
    #[serde(rename = "no")]
    Norwegian,
    #[serde(rename = "pt")]
    Portuguese,
    #[serde(rename = "ro")]
    Romanian,
    #[serde(rename = "ru")]
    Russian,
    #[serde(rename = "es")]
    Spanish,
    #[serde(rename = "sv")]
    Swedish,
    #[serde(rename = "ta")]
    Tamil,
    #[serde(rename = "tr")]
    Turkish,
    #[serde(rename = "pl")]
    Polish,
    #[serde(rename = "zh")]
    Chinese,
    #[serde(rename = "ja")]
    Japanese,
    #[serde(rename = "ko")]
    Korean,
}

impl LanguageCode {
    /// Every known language, in declaration order.
    pub const ALL: [LanguageCode; 22] = [
        LanguageCode::Arabic,
        LanguageCode::Danish,
        LanguageCode::Dutch,
        LanguageCode::English,
        LanguageCode::Finnish,
        LanguageCode::French,
        LanguageCode::German,
        LanguageCode::Greek,
        LanguageCode::Hungarian,
        LanguageCode::Italian,
        LanguageCode::Norwegian,
        LanguageCode::Portuguese,
        LanguageCode::Romanian,
        LanguageCode::Russian,
        LanguageCode::Spanish,
        LanguageCode::Swedish,
        LanguageCode::Tamil,
        LanguageCode::Turkish,
        LanguageCode::Polish,
        LanguageCode::Chinese,
        LanguageCode::Japanese,
        LanguageCode::Korean,
    ];

    /// ISO 639-1 code
    pub fn iso_code(&self) -> &'static str {
        match self {
            LanguageCode::Arabic => "ar",
            LanguageCode::Danish => "da",
            LanguageCode::Dutch => "nl",
            LanguageCode::English => "en",
            LanguageCode::Finnish => "fi",
            LanguageCode::French => "fr",
            LanguageCode::German => "de",
            LanguageCode::Greek => "el",
            LanguageCode::Hungarian => "hu",
            LanguageCode::Italian => "it",
            LanguageCode::Norwegian => "no",
            LanguageCode::Portuguese => "pt",
            LanguageCode::Romanian => "ro",
            LanguageCode::Russian => "ru",
            LanguageCode::Spanish => "es",
            LanguageCode::Swedish => "sv",
            LanguageCode::Tamil => "ta",
            LanguageCode::Turkish => "tr",
            LanguageCode::Polish => "pl",
            LanguageCode::Chinese => "zh",
            LanguageCode::Japanese => "ja",
            LanguageCode::Korean => "ko",
        }
    }

    /// Parse an ISO 639-1 code (case-insensitive). Unknown codes yield `None`.
    pub fn from_iso_code(code: &str) -> Option<Self> {
        let code = code.trim().to_lowercase();
        Self::ALL.iter().copied().find(|lang| lang.iso_code() == code)
    }
}

// ============================================================================
// Token
// ============================================================================

/// Lexical class of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    Word,
    Number,
    Acronym,
    Email,
    Url,
    Punctuation,
}

impl TokenType {
    /// Ignorable tokens break phrases and never become terms
    pub fn is_ignorable(&self) -> bool {
        matches!(self, TokenType::Punctuation)
    }

    /// Whether this token type may label a cluster on its own
    pub fn can_label(&self) -> bool {
        matches!(self, TokenType::Word | TokenType::Acronym)
    }

    /// Whether the token text goes through the language stemmer
    pub fn is_stemmable(&self) -> bool {
        matches!(self, TokenType::Word)
    }
}

/// The document field a token was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Title,
    Summary,
}

/// A classified, normalized token read from one field of one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// The surface form (original text)
    pub text: String,
    /// The normalized form (lowercased and stemmed); the term key
    pub normalized: String,
    /// Lexical class
    pub token_type: TokenType,
    /// Field this token came from
    pub field: FieldKind,
    /// Byte offset (start) in the field text
    pub start: usize,
    /// Byte offset (end, exclusive) in the field text
    pub end: usize,
    /// Whether this token is a stopword in the document's language
    pub is_stopword: bool,
}

impl Token {
    /// Create a new token
    pub fn new(
        text: impl Into<String>,
        normalized: impl Into<String>,
        token_type: TokenType,
        field: FieldKind,
        start: usize,
        end: usize,
    ) -> Self {
        Self {
            text: text.into(),
            normalized: normalized.into(),
            token_type,
            field,
            start,
            end,
            is_stopword: false,
        }
    }

    /// Length of the token in bytes
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Check if the token spans no text
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether this token contributes to term statistics
    pub fn is_term(&self) -> bool {
        !self.token_type.is_ignorable()
    }
}

// ============================================================================
// Overlap measure
// ============================================================================

/// How the document-set overlap of two candidate clusters is measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapMeasure {
    /// |A ∩ B| / min(|A|, |B|)
    #[default]
    SmallerSet,
    /// |A ∩ B| / |A ∪ B|
    Jaccard,
    /// min(|A ∩ B| / |A|, |A ∩ B| / |B|), the classic STC condition
    Mutual,
}

impl OverlapMeasure {
    /// Overlap ratio in [0, 1] given the set sizes and the intersection size
    pub fn ratio(&self, len_a: usize, len_b: usize, intersection: usize) -> f64 {
        if len_a == 0 || len_b == 0 {
            return 0.0;
        }
        let i = intersection as f64;
        match self {
            OverlapMeasure::SmallerSet => i / len_a.min(len_b) as f64,
            OverlapMeasure::Jaccard => {
                let union = len_a + len_b - intersection;
                i / union as f64
            }
            OverlapMeasure::Mutual => i / len_a.max(len_b) as f64,
        }
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Upper bound for `max_base_clusters`; the merge phase keeps one overlap
/// value per pair of base clusters
pub const MAX_BASE_CLUSTERS_LIMIT: usize = 4096;

/// Configuration for a clustering run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusteringConfig {
    /// Minimum phrase length in terms
    pub min_phrase_length: usize,
    /// Maximum phrase length in terms
    pub max_phrase_length: usize,
    /// Minimum number of distinct documents a phrase must occur in
    pub min_documents_per_phrase: usize,
    /// Overlap ratio at or above which two clusters are merged, in (0, 1]
    pub merge_threshold: f64,
    /// Overlap ratio used by the merge phase
    pub overlap_measure: OverlapMeasure,
    /// Minimum number of documents in an emitted cluster
    pub min_cluster_size: usize,
    /// Maximum number of emitted clusters, excluding "Other Topics"
    pub max_clusters: Option<usize>,
    /// Default language for documents that carry none (`None` = guess)
    pub language: Option<LanguageCode>,
    /// Minimum weight for a single term to form a base cluster
    pub min_term_weight: f64,
    /// Single terms present in more than this share of documents are ignored
    pub max_document_fraction: f64,
    /// Maximum number of base clusters entering the merge phase
    pub max_base_clusters: usize,
    /// Phrase length at which the length boost stops growing
    pub max_length_boost: usize,
    /// Weight of the label score in the cluster score
    pub label_weight: f64,
    /// Weight of the normalized cluster size in the cluster score
    pub size_weight: f64,
    /// Maximum number of descriptive phrases kept per cluster
    pub max_label_phrases: usize,
    /// Emit constituent base clusters as sub-clusters
    pub hierarchical: bool,
    /// Label of the catch-all cluster
    pub other_topics_label: String,
    /// Use rayon for tokenization and suffix sorting
    pub parallel: bool,
    /// Upper bound on worker threads (`None` = rayon default)
    pub max_threads: Option<usize>,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            min_phrase_length: 2,
            max_phrase_length: 8,
            min_documents_per_phrase: 2,
            merge_threshold: 0.7,
            overlap_measure: OverlapMeasure::SmallerSet,
            min_cluster_size: 2,
            max_clusters: None,
            language: None,
            min_term_weight: 0.1,
            max_document_fraction: 0.9,
            max_base_clusters: 300,
            max_length_boost: 3,
            label_weight: 1.0,
            size_weight: 1.0,
            max_label_phrases: 3,
            hierarchical: false,
            other_topics_label: "Other Topics".to_string(),
            parallel: true,
            max_threads: None,
        }
    }
}

impl ClusteringConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Deserialize a config from JSON and validate it
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.min_phrase_length == 0 {
            return Err(ClusteringError::invalid_config(
                "min_phrase_length must be > 0",
            ));
        }

        if self.max_phrase_length < self.min_phrase_length {
            return Err(ClusteringError::invalid_config(
                "max_phrase_length must be >= min_phrase_length",
            ));
        }

        if self.min_documents_per_phrase == 0 {
            return Err(ClusteringError::invalid_config(
                "min_documents_per_phrase must be > 0",
            ));
        }

        if !(self.merge_threshold > 0.0 && self.merge_threshold <= 1.0) {
            return Err(ClusteringError::invalid_config(format!(
                "merge_threshold must be in (0, 1], got {}",
                self.merge_threshold
            )));
        }

        if self.min_cluster_size == 0 {
            return Err(ClusteringError::invalid_config(
                "min_cluster_size must be > 0",
            ));
        }

        if self.max_clusters == Some(0) {
            return Err(ClusteringError::invalid_config(
                "max_clusters must be > 0 when set",
            ));
        }

        if !(0.0..=1.0).contains(&self.min_term_weight) {
            return Err(ClusteringError::invalid_config(format!(
                "min_term_weight must be in [0, 1], got {}",
                self.min_term_weight
            )));
        }

        if !(self.max_document_fraction > 0.0 && self.max_document_fraction <= 1.0) {
            return Err(ClusteringError::invalid_config(format!(
                "max_document_fraction must be in (0, 1], got {}",
                self.max_document_fraction
            )));
        }

        if self.max_base_clusters == 0 || self.max_base_clusters > MAX_BASE_CLUSTERS_LIMIT {
            return Err(ClusteringError::invalid_config(format!(
                "max_base_clusters must be in [1, {}], got {}",
                MAX_BASE_CLUSTERS_LIMIT, self.max_base_clusters
            )));
        }

        if self.max_length_boost == 0 {
            return Err(ClusteringError::invalid_config(
                "max_length_boost must be > 0",
            ));
        }

        for (name, value) in [
            ("label_weight", self.label_weight),
            ("size_weight", self.size_weight),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ClusteringError::invalid_config(format!(
                    "{} must be a finite, non-negative number, got {}",
                    name, value
                )));
            }
        }
        if self.label_weight == 0.0 && self.size_weight == 0.0 {
            return Err(ClusteringError::invalid_config(
                "label_weight and size_weight cannot both be 0",
            ));
        }

        if self.max_label_phrases == 0 {
            return Err(ClusteringError::invalid_config(
                "max_label_phrases must be > 0",
            ));
        }

        if self.other_topics_label.trim().is_empty() {
            return Err(ClusteringError::invalid_config(
                "other_topics_label must not be empty",
            ));
        }

        if self.max_threads == Some(0) {
            return Err(ClusteringError::invalid_config(
                "max_threads must be > 0 when set",
            ));
        }

        Ok(())
    }

    /// Builder method: set minimum phrase length
    pub fn with_min_phrase_length(mut self, length: usize) -> Self {
        self.min_phrase_length = length;
        self
    }

    /// Builder method: set maximum phrase length
    pub fn with_max_phrase_length(mut self, length: usize) -> Self {
        self.max_phrase_length = length;
        self
    }

    /// Builder method: set minimum documents per phrase
    pub fn with_min_documents_per_phrase(mut self, count: usize) -> Self {
        self.min_documents_per_phrase = count;
        self
    }

    /// Builder method: set merge threshold
    pub fn with_merge_threshold(mut self, threshold: f64) -> Self {
        self.merge_threshold = threshold;
        self
    }

    /// Builder method: set overlap measure
    pub fn with_overlap_measure(mut self, measure: OverlapMeasure) -> Self {
        self.overlap_measure = measure;
        self
    }

    /// Builder method: set minimum cluster size
    pub fn with_min_cluster_size(mut self, size: usize) -> Self {
        self.min_cluster_size = size;
        self
    }

    /// Builder method: cap the number of clusters
    pub fn with_max_clusters(mut self, max: usize) -> Self {
        self.max_clusters = Some(max);
        self
    }

    /// Builder method: set the default language
    pub fn with_language(mut self, language: LanguageCode) -> Self {
        self.language = Some(language);
        self
    }

    /// Builder method: set minimum single-term weight
    pub fn with_min_term_weight(mut self, weight: f64) -> Self {
        self.min_term_weight = weight;
        self
    }

    /// Builder method: set maximum document fraction for single terms
    pub fn with_max_document_fraction(mut self, fraction: f64) -> Self {
        self.max_document_fraction = fraction;
        self
    }

    /// Builder method: set maximum number of base clusters
    pub fn with_max_base_clusters(mut self, max: usize) -> Self {
        self.max_base_clusters = max;
        self
    }

    /// Builder method: enable or disable sub-clusters
    pub fn with_hierarchical(mut self, hierarchical: bool) -> Self {
        self.hierarchical = hierarchical;
        self
    }

    /// Builder method: set the "Other Topics" label
    pub fn with_other_topics_label(mut self, label: impl Into<String>) -> Self {
        self.other_topics_label = label.into();
        self
    }

    /// Builder method: enable or disable parallel stages
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Builder method: cap the worker thread count
    pub fn with_max_threads(mut self, threads: usize) -> Self {
        self.max_threads = Some(threads);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    #[test]
    fn test_language_iso_roundtrip() {
        for lang in LanguageCode::ALL {
            assert_eq!(LanguageCode::from_iso_code(lang.iso_code()), Some(lang));
        }
        assert_eq!(LanguageCode::from_iso_code(" EN "), Some(LanguageCode::English));
        assert_eq!(LanguageCode::from_iso_code("xx"), None);
    }

    #[test]
    fn test_language_serde_uses_iso_code() {
        let json = serde_json::to_string(&LanguageCode::German).unwrap();
        assert_eq!(json, r#""de""#);
        let back: LanguageCode = serde_json::from_str(r#""fr""#).unwrap();
        assert_eq!(back, LanguageCode::French);
    }

    #[test]
    fn test_token_type_classes() {
        assert!(TokenType::Punctuation.is_ignorable());
        assert!(!TokenType::Word.is_ignorable());
        assert!(TokenType::Acronym.can_label());
        assert!(!TokenType::Number.can_label());
        assert!(TokenType::Word.is_stemmable());
        assert!(!TokenType::Url.is_stemmable());
    }

    #[test]
    fn test_token_len() {
        let token = Token::new("Mining", "mine", TokenType::Word, FieldKind::Title, 5, 11);
        assert_eq!(token.len(), 6);
        assert!(!token.is_empty());
        assert!(token.is_term());
        assert!(!token.is_stopword);
    }

    #[test]
    fn test_overlap_measures() {
        // |A| = 4, |B| = 2, |A ∩ B| = 2
        assert!((OverlapMeasure::SmallerSet.ratio(4, 2, 2) - 1.0).abs() < 1e-10);
        assert!((OverlapMeasure::Jaccard.ratio(4, 2, 2) - 0.5).abs() < 1e-10);
        assert!((OverlapMeasure::Mutual.ratio(4, 2, 2) - 0.5).abs() < 1e-10);
        assert_eq!(OverlapMeasure::Jaccard.ratio(0, 3, 0), 0.0);
    }

    #[test]
    fn test_config_validation() {
        let config = ClusteringConfig::default();
        assert!(config.validate().is_ok());

        assert!(ClusteringConfig::default()
            .with_merge_threshold(0.0)
            .validate()
            .is_err());
        assert!(ClusteringConfig::default()
            .with_merge_threshold(1.0)
            .validate()
            .is_ok());
        assert!(ClusteringConfig::default()
            .with_merge_threshold(1.5)
            .validate()
            .is_err());
        assert!(ClusteringConfig::default()
            .with_max_clusters(0)
            .validate()
            .is_err());
        assert!(ClusteringConfig::default()
            .with_min_phrase_length(3)
            .with_max_phrase_length(2)
            .validate()
            .is_err());
        assert!(ClusteringConfig::default()
            .with_other_topics_label("  ")
            .validate()
            .is_err());
    }

    #[test]
    fn test_max_base_clusters_bounded() {
        let at_limit = ClusteringConfig::default().with_max_base_clusters(MAX_BASE_CLUSTERS_LIMIT);
        assert!(at_limit.validate().is_ok());

        let err = ClusteringConfig::default()
            .with_max_base_clusters(MAX_BASE_CLUSTERS_LIMIT + 1)
            .validate()
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidConfig);
        assert!(ClusteringConfig::default()
            .with_max_base_clusters(0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_config_nan_threshold_rejected() {
        let config = ClusteringConfig::default().with_merge_threshold(f64::NAN);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_json_partial() {
        let config =
            ClusteringConfig::from_json(r#"{ "merge_threshold": 0.5, "max_clusters": 9 }"#)
                .unwrap();
        assert!((config.merge_threshold - 0.5).abs() < 1e-10);
        assert_eq!(config.max_clusters, Some(9));
        assert_eq!(config.min_phrase_length, 2);
        assert_eq!(config.other_topics_label, "Other Topics");
    }

    #[test]
    fn test_config_from_json_rejects_invalid() {
        let err = ClusteringConfig::from_json(r#"{ "merge_threshold": 2.0 }"#).unwrap_err();
        assert_eq!(err.code(), crate::errors::ErrorCode::InvalidConfig);

        let err = ClusteringConfig::from_json("{ not json").unwrap_err();
        assert_eq!(err.code(), crate::errors::ErrorCode::Serialization);
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = ClusteringConfig::default()
            .with_language(LanguageCode::English)
            .with_overlap_measure(OverlapMeasure::Jaccard);
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains(r#""overlap_measure":"jaccard""#));
        assert!(json.contains(r#""language":"en""#));
        let back: ClusteringConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
