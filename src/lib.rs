//! # rapid_stc
//!
//! Suffix Tree Clustering of search results over a generalized suffix array.
//!
//! Short documents (titles and snippets) are grouped into overlapping,
//! labeled clusters. Each cluster is named by a phrase that its documents
//! share; documents that fit nowhere end up in "Other Topics".
//!
//! ## Features
//!
//! - **Fast**: suffix array + LCP instead of a pointer-heavy suffix tree
//! - **Unicode-aware**: word segmentation per UAX #29, Snowball stemmers
//! - **Deterministic**: identical input and config give identical output,
//!   sequential or parallel
//! - **Observable**: `tracing` spans per stage, observer hooks, cancellation
//!
//! ## Example
//!
//! ```
//! use rapid_stc::{cluster, ClusteringConfig, Document, LanguageCode};
//!
//! let documents = vec![
//!     Document::new("Data mining tools", "Open source data mining"),
//!     Document::new("Data mining primer", "An introduction to data mining"),
//!     Document::new("Gardening tips", "Grow tomatoes at home"),
//! ];
//! let config = ClusteringConfig::default().with_language(LanguageCode::English);
//! let result = cluster(documents, &config).unwrap();
//! assert_eq!(result.ranked_clusters()[0].label, "Data mining");
//! ```

pub mod clustering;
pub mod document;
pub mod errors;
pub mod index;
pub mod nlp;
pub mod phrase;
pub mod pipeline;
pub mod result;
pub mod types;

// Re-export commonly used types
pub use document::Document;
pub use errors::{ClusteringError, ErrorCode, Result};
pub use result::{Cluster, ClusterResult, InputWarning};
pub use types::{ClusteringConfig, LanguageCode, OverlapMeasure, Token, TokenType};

// Re-export main functionality
pub use clustering::{BaseCluster, ClusterMerger, ClusterRanker, MergedCluster};
pub use index::{TermIndex, Vocabulary};
pub use nlp::{Analyzer, StemmerRegistry, StopwordFilter, Tokenizer};
pub use phrase::{PhraseCandidate, PhraseExtractor, SuffixArray};
pub use pipeline::{
    CancellationToken, ClusteringPipeline, NoopObserver, PipelineObserver, StageReport,
    StageTimingObserver,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Cluster `documents` with `config`
pub fn cluster(documents: Vec<Document>, config: &ClusteringConfig) -> Result<ClusterResult> {
    ClusteringPipeline::new(config.clone())?.run(documents)
}

/// Cluster `documents`, reporting stages to `observer` and stopping at the
/// next stage boundary once `token` is cancelled
pub fn cluster_with(
    documents: Vec<Document>,
    config: &ClusteringConfig,
    observer: &mut impl PipelineObserver,
    token: &CancellationToken,
) -> Result<ClusterResult> {
    ClusteringPipeline::new(config.clone())?.run_with(documents, observer, token)
}
