//! Pipeline runner: orchestrates one clustering run.
//!
//! Stages run strictly in order, each consuming the complete output of the
//! previous one:
//!
//! | Stage | Output |
//! |-------|--------|
//! | [`STAGE_TOKENIZE`] | analyzed documents (parallel per document) |
//! | [`STAGE_INDEX`] | vocabulary, term statistics, coded documents |
//! | [`STAGE_SUFFIX_ARRAY`] | generalized suffix array + LCP |
//! | [`STAGE_PHRASES`] | repeated phrase candidates |
//! | [`STAGE_BASE_CLUSTERS`] | phrase and single-term base clusters |
//! | [`STAGE_MERGE`] | merged clusters |
//! | [`STAGE_RANK`] | labeled, ranked, capped clusters + Other Topics |
//! | [`STAGE_ASSEMBLE`] | [`ClusterResult`] |
//!
//! The cancellation token is checked before every stage. All per-run state
//! is owned by the run; a pipeline can be shared and run concurrently.

use crate::clustering::{BaseClusterBuilder, ClusterMerger, ClusterRanker};
use crate::document::{assign_document_ids, Document};
use crate::errors::{ClusteringError, Result};
use crate::index::TermIndex;
use crate::nlp::{AnalyzedDocument, Analyzer, StemmerRegistry, StopwordFilter};
use crate::phrase::{PhraseExtractor, SuffixArray};
use crate::pipeline::cancel::CancellationToken;
use crate::pipeline::observer::{
    NoopObserver, PipelineObserver, StageClock, StageReport, STAGE_ASSEMBLE, STAGE_BASE_CLUSTERS,
    STAGE_INDEX, STAGE_MERGE, STAGE_PHRASES, STAGE_RANK, STAGE_SUFFIX_ARRAY, STAGE_TOKENIZE,
};
use crate::result::{assemble, ClusterResult, InputWarning};
use crate::types::{ClusteringConfig, LanguageCode};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, warn};

/// Enter a tracing span for a pipeline stage
macro_rules! trace_stage {
    ($name:expr) => {
        let _span = tracing::info_span!("pipeline_stage", stage = $name).entered();
    };
}

/// A validated configuration plus the text analysis setup
#[derive(Debug, Clone)]
pub struct ClusteringPipeline {
    config: ClusteringConfig,
    analyzer: Analyzer,
}

impl ClusteringPipeline {
    /// Validate `config` and build a pipeline with the default stemmers
    pub fn new(config: ClusteringConfig) -> Result<Self> {
        config.validate()?;
        let analyzer = Analyzer::new(StemmerRegistry::with_defaults(), config.language);
        Ok(Self { config, analyzer })
    }

    /// Use a custom stemmer registry
    pub fn with_stemmers(mut self, stemmers: StemmerRegistry) -> Self {
        self.analyzer = self.analyzer.with_stemmers(stemmers);
        self
    }

    /// Replace the stopword list of a language
    pub fn with_stopwords(mut self, language: LanguageCode, filter: StopwordFilter) -> Self {
        self.analyzer = self.analyzer.with_stopwords(language, filter);
        self
    }

    pub fn config(&self) -> &ClusteringConfig {
        &self.config
    }

    /// Cluster `documents`
    pub fn run(&self, documents: Vec<Document>) -> Result<ClusterResult> {
        self.run_with(documents, &mut NoopObserver, &CancellationToken::new())
    }

    /// Cluster `documents`, reporting to `observer` and honoring `token`
    /// at every stage boundary
    pub fn run_with(
        &self,
        mut documents: Vec<Document>,
        observer: &mut impl PipelineObserver,
        token: &CancellationToken,
    ) -> Result<ClusterResult> {
        let config = &self.config;
        assign_document_ids(&mut documents)?;
        let pool = self.thread_pool();
        let pool = pool.as_ref();

        let (analyzed, warnings) = run_stage(
            STAGE_TOKENIZE,
            observer,
            token,
            || self.tokenize(&documents, pool),
            |(analyzed, _)| analyzed.len(),
        )?;

        let index = run_stage(
            STAGE_INDEX,
            observer,
            token,
            || Ok(TermIndex::build(&analyzed)),
            TermIndex::num_terms,
        )?;
        drop(analyzed);
        debug!(
            documents = index.num_documents(),
            skipped = warnings.len(),
            terms = index.num_terms(),
            occurrences = index.num_occurrences(),
            "term index built"
        );

        let suffix_array = run_stage(
            STAGE_SUFFIX_ARRAY,
            observer,
            token,
            || {
                Ok(in_pool(pool, || {
                    SuffixArray::build(&index, config.parallel)
                }))
            },
            SuffixArray::len,
        )?;
        debug!(length = suffix_array.len(), "suffix array built");

        let phrases = run_stage(
            STAGE_PHRASES,
            observer,
            token,
            || Ok(PhraseExtractor::from_config(config).extract(&suffix_array, &index)),
            Vec::len,
        )?;
        observer.on_phrases(&phrases);
        drop(suffix_array);

        let mut base = run_stage(
            STAGE_BASE_CLUSTERS,
            observer,
            token,
            || Ok(BaseClusterBuilder::from_config(config).build(phrases, &index)),
            Vec::len,
        )?;
        observer.on_base_clusters(&base);
        debug!(base_clusters = base.len(), "base clusters built");

        let merged = run_stage(
            STAGE_MERGE,
            observer,
            token,
            || Ok(ClusterMerger::from_config(config).merge(&mut base)),
            Vec::len,
        )?;
        observer.on_merged_clusters(&merged);
        debug!(merged_clusters = merged.len(), "merge finished");

        let ranking = run_stage(
            STAGE_RANK,
            observer,
            token,
            || Ok(ClusterRanker::from_config(config).rank(&merged, &base, &index)),
            |ranking| ranking.clusters.len(),
        )?;

        let result = run_stage(
            STAGE_ASSEMBLE,
            observer,
            token,
            || {
                assemble(
                    documents,
                    &index,
                    ranking,
                    warnings,
                    &config.other_topics_label,
                )
            },
            |result| result.clusters().len(),
        )?;
        debug!(
            clusters = result.ranked_clusters().len(),
            other_topics = result.other_topics().map_or(0, |c| c.size()),
            "clustering finished"
        );

        Ok(result)
    }

    /// Analyze every document that has text; record the others as warnings
    fn tokenize(
        &self,
        documents: &[Document],
        pool: Option<&ThreadPool>,
    ) -> Result<(Vec<AnalyzedDocument>, Vec<InputWarning>)> {
        let mut warnings = Vec::new();
        let mut accepted: Vec<(usize, u32, &Document)> = Vec::with_capacity(documents.len());

        for (position, document) in documents.iter().enumerate() {
            let id = document.id.ok_or_else(|| {
                ClusteringError::inconsistent_state(
                    STAGE_TOKENIZE,
                    format!("document at position {} has no id", position),
                )
            })?;
            if !document.has_content() {
                warn!(
                    document_index = position,
                    document_id = id,
                    "skipping document without text content"
                );
                warnings.push(InputWarning {
                    document_index: position,
                    document_id: Some(id),
                    message: "document has no title or summary text".to_string(),
                });
                continue;
            }
            accepted.push((position, id, document));
        }

        let language = self
            .analyzer
            .batch_language(accepted.iter().map(|&(_, _, document)| document));
        debug!(language = ?language, "batch language resolved");

        let analyze = |&(position, id, document): &(usize, u32, &Document)| {
            self.analyzer.analyze_with(position, id, document, language)
        };
        let analyzed: Vec<AnalyzedDocument> = if self.config.parallel {
            in_pool(pool, || accepted.par_iter().map(analyze).collect())
        } else {
            accepted.iter().map(analyze).collect()
        };

        Ok((analyzed, warnings))
    }

    /// A dedicated pool when `max_threads` is set
    fn thread_pool(&self) -> Option<ThreadPool> {
        if !self.config.parallel {
            return None;
        }
        let threads = self.config.max_threads?;
        match ThreadPoolBuilder::new().num_threads(threads).build() {
            Ok(pool) => Some(pool),
            Err(err) => {
                warn!(error = %err, threads, "could not build thread pool, using the global pool");
                None
            }
        }
    }
}

/// Run one stage: cancellation check, span, observer notifications, timing
fn run_stage<T>(
    stage: &'static str,
    observer: &mut impl PipelineObserver,
    token: &CancellationToken,
    run: impl FnOnce() -> Result<T>,
    items: impl FnOnce(&T) -> usize,
) -> Result<T> {
    token.check(stage)?;
    trace_stage!(stage);
    observer.on_stage_start(stage);
    let clock = StageClock::start();
    let output = run()?;
    let report = StageReport::new(clock.elapsed()).with_items(items(&output));
    observer.on_stage_end(stage, &report);
    Ok(output)
}

fn in_pool<R: Send>(pool: Option<&ThreadPool>, op: impl FnOnce() -> R + Send) -> R {
    match pool {
        Some(pool) => pool.install(op),
        None => op(),
    }
}
