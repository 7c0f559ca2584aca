//! Base clusters: one per qualifying phrase or single term
//!
//! Document sets are kept as sorted vectors of document ordinals so overlap
//! tests are a linear merge walk.

use crate::index::{TermId, TermIndex};
use crate::phrase::PhraseCandidate;
use crate::types::ClusteringConfig;
use rustc_hash::FxHashSet;
use std::cmp::Ordering;

/// A candidate cluster derived directly from one phrase or term
#[derive(Debug, Clone, PartialEq)]
pub struct BaseCluster {
    /// Canonical id: position in the ranked candidate pool
    pub id: usize,
    /// Descriptive phrase (a single term for term clusters)
    pub terms: Vec<TermId>,
    /// Sorted document ordinals
    pub documents: Vec<u32>,
    pub score: f64,
    /// Id of the cluster this one was merged into, if any
    pub merged_into: Option<usize>,
}

impl BaseCluster {
    pub fn size(&self) -> usize {
        self.documents.len()
    }

    pub fn is_phrase(&self) -> bool {
        self.terms.len() > 1
    }
}

/// Size of the intersection of two sorted, duplicate-free slices
pub fn compute_intersection(a: &[u32], b: &[u32]) -> usize {
    let (mut i, mut j, mut count) = (0, 0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                count += 1;
                i += 1;
                j += 1;
            }
        }
    }
    count
}

/// Sorted union of two sorted, duplicate-free slices
pub fn sorted_union(a: &[u32], b: &[u32]) -> Vec<u32> {
    let mut result = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            Ordering::Less => {
                result.push(a[i]);
                i += 1;
            }
            Ordering::Greater => {
                result.push(b[j]);
                j += 1;
            }
            Ordering::Equal => {
                result.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    result.extend_from_slice(&a[i..]);
    result.extend_from_slice(&b[j..]);
    result
}

/// Whether sorted `a` is a subset of sorted `b`
pub fn is_subset(a: &[u32], b: &[u32]) -> bool {
    a.len() <= b.len() && compute_intersection(a, b) == a.len()
}

/// Score of a phrase:
/// `geometric_mean(labelable term weights) × min(len, max_length_boost) × coverage`
pub fn phrase_score(
    terms: &[TermId],
    index: &TermIndex,
    max_length_boost: usize,
    coverage: f64,
) -> f64 {
    let mut log_sum = 0.0;
    let mut count = 0usize;
    for &term in terms {
        let stats = index.term(term);
        if stats.can_label() && stats.weight > 0.0 {
            log_sum += stats.weight.ln();
            count += 1;
        }
    }
    if count == 0 {
        return 0.0;
    }

    let mean = (log_sum / count as f64).exp();
    let boost = terms.len().min(max_length_boost) as f64;
    mean * boost * coverage
}

/// Builds the candidate pool entering the merge phase
#[derive(Debug, Clone)]
pub struct BaseClusterBuilder {
    min_term_weight: f64,
    max_document_fraction: f64,
    min_documents: usize,
    max_base_clusters: usize,
    max_length_boost: usize,
}

impl Default for BaseClusterBuilder {
    fn default() -> Self {
        Self::from_config(&ClusteringConfig::default())
    }
}

impl BaseClusterBuilder {
    pub fn from_config(config: &ClusteringConfig) -> Self {
        Self {
            min_term_weight: config.min_term_weight,
            max_document_fraction: config.max_document_fraction,
            min_documents: config.min_documents_per_phrase.max(2),
            max_base_clusters: config.max_base_clusters,
            max_length_boost: config.max_length_boost,
        }
    }

    /// Combine phrase candidates with single-term candidates.
    ///
    /// The pool is ordered by score (descending), then phrase length
    /// (descending), then term sequence, and truncated to
    /// `max_base_clusters`. Ids follow that order.
    pub fn build(&self, phrases: Vec<PhraseCandidate>, index: &TermIndex) -> Vec<BaseCluster> {
        let mut pool: Vec<BaseCluster> = Vec::with_capacity(phrases.len());
        let mut seen: FxHashSet<Vec<TermId>> = FxHashSet::default();

        for phrase in phrases {
            let score = phrase_score(&phrase.terms, index, self.max_length_boost, 1.0)
                * phrase.documents.len() as f64;
            seen.insert(phrase.terms.clone());
            pool.push(BaseCluster {
                id: 0,
                terms: phrase.terms,
                documents: phrase.documents,
                score,
                merged_into: None,
            });
        }

        let n = index.num_documents();
        for (code, stats) in index.terms().iter().enumerate() {
            let df = stats.document_frequency as usize;
            if !stats.can_label()
                || df < self.min_documents
                || stats.weight < self.min_term_weight
                || df as f64 > self.max_document_fraction * n as f64
            {
                continue;
            }
            let terms = vec![code as TermId];
            if seen.contains(&terms) {
                continue;
            }
            let score = phrase_score(&terms, index, self.max_length_boost, 1.0) * df as f64;
            pool.push(BaseCluster {
                id: 0,
                documents: index.postings(code as TermId).to_vec(),
                terms,
                score,
                merged_into: None,
            });
        }

        pool.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| b.terms.len().cmp(&a.terms.len()))
                .then_with(|| a.terms.cmp(&b.terms))
        });
        pool.truncate(self.max_base_clusters);
        for (id, cluster) in pool.iter_mut().enumerate() {
            cluster.id = id;
        }

        pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::nlp::{Analyzer, StemmerRegistry};
    use crate::phrase::{PhraseExtractor, SuffixArray};
    use crate::types::LanguageCode;

    fn pool(docs: &[Document], config: &ClusteringConfig) -> (TermIndex, Vec<BaseCluster>) {
        let analyzer = Analyzer::new(StemmerRegistry::with_defaults(), Some(LanguageCode::English));
        let analyzed: Vec<_> = docs
            .iter()
            .enumerate()
            .map(|(i, d)| analyzer.analyze(i, i as u32, d))
            .collect();
        let index = TermIndex::build(&analyzed);
        let sa = SuffixArray::build(&index, false);
        let phrases = PhraseExtractor::from_config(config).extract(&sa, &index);
        let clusters = BaseClusterBuilder::from_config(config).build(phrases, &index);
        (index, clusters)
    }

    #[test]
    fn test_compute_intersection() {
        assert_eq!(compute_intersection(&[1, 3, 5, 7], &[2, 3, 4, 7, 9]), 2);
        assert_eq!(compute_intersection(&[], &[1, 2]), 0);
        assert_eq!(compute_intersection(&[1, 2, 3], &[1, 2, 3]), 3);
        assert_eq!(compute_intersection(&[10], &[1, 2, 3]), 0);
    }

    #[test]
    fn test_sorted_union_and_subset() {
        assert_eq!(sorted_union(&[1, 4, 6], &[2, 4, 8]), vec![1, 2, 4, 6, 8]);
        assert_eq!(sorted_union(&[], &[3]), vec![3]);
        assert!(is_subset(&[2, 4], &[1, 2, 3, 4]));
        assert!(!is_subset(&[2, 5], &[1, 2, 3, 4]));
        assert!(is_subset(&[], &[1]));
    }

    #[test]
    fn test_pool_contains_phrases_and_terms() {
        let docs = [
            Document::new("Data mining tools", ""),
            Document::new("Data mining in practice", ""),
            Document::new("Data warehouses", ""),
            Document::new("Pasta recipes", ""),
        ];
        let (index, clusters) = pool(&docs, &ClusteringConfig::default());

        let labels: Vec<_> = clusters.iter().map(|c| index.phrase_label(&c.terms)).collect();
        assert!(labels.contains(&"Data mining".to_string()));
        assert!(labels.contains(&"Data".to_string()));
        // "mining" covers the same two documents as the phrase but is still a term candidate
        assert!(labels.contains(&"mining".to_string()));
        // "pasta" occurs once
        assert!(!labels.contains(&"Pasta".to_string()));

        for (i, cluster) in clusters.iter().enumerate() {
            assert_eq!(cluster.id, i);
            assert!(cluster.size() >= 2);
        }
        for pair in clusters.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn test_frequent_terms_excluded() {
        let docs = [
            Document::new("rust parser", ""),
            Document::new("rust compiler", ""),
            Document::new("rust borrow", ""),
        ];
        let config = ClusteringConfig::default().with_max_document_fraction(0.5);
        let (_, clusters) = pool(&docs, &config);
        assert!(clusters.is_empty());
    }

    #[test]
    fn test_truncation_keeps_best() {
        let docs = [
            Document::new("alpha beta gamma", ""),
            Document::new("alpha beta gamma", ""),
            Document::new("alpha delta", ""),
        ];
        let config = ClusteringConfig::default().with_max_base_clusters(1);
        let (_, clusters) = pool(&docs, &config);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].id, 0);
    }

    #[test]
    fn test_phrase_score() {
        let docs = [
            Document::new("neural network", ""),
            Document::new("neural network", ""),
            Document::new("neural", ""),
        ];
        let (index, _) = pool(&docs, &ClusteringConfig::default());
        let neural = index.vocabulary().id_of("neural").unwrap();
        let network = index.vocabulary().id_of("network").unwrap();

        let single = phrase_score(&[neural], &index, 3, 1.0);
        let pair = phrase_score(&[neural, network], &index, 3, 1.0);
        assert!(pair > single);
        assert_eq!(phrase_score(&[neural, network], &index, 3, 0.5), pair * 0.5);
        // boost is capped
        let four = phrase_score(&[network, network, network, network], &index, 3, 1.0);
        let three = phrase_score(&[network, network, network], &index, 3, 1.0);
        assert!((four - three).abs() < 1e-12);
    }
}
