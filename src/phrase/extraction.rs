//! Repeated phrase discovery
//!
//! Walks the LCP intervals of the suffix array bottom-up. Every interval
//! with common prefix length `ℓ` is an internal node of the (virtual)
//! generalized suffix tree; its label is the `ℓ`-term prefix shared by all
//! suffixes in the interval. LCP values are capped at the maximum phrase
//! length first, so over-long repeats surface as nodes of exactly that length.
//! A node label ending in stopwords is cut back to its last content term.

use super::dedup::dedup_by_documents;
use super::suffix_array::SuffixArray;
use crate::index::{TermId, TermIndex};
use crate::types::ClusteringConfig;

/// A repeated phrase shared by several documents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseCandidate {
    pub terms: Vec<TermId>,
    /// Sorted, distinct document ordinals
    pub documents: Vec<u32>,
    /// Total occurrences across all documents
    pub occurrences: u32,
}

impl PhraseCandidate {
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Turns a suffix array into deduplicated phrase candidates
#[derive(Debug, Clone)]
pub struct PhraseExtractor {
    min_length: usize,
    max_length: usize,
    min_documents: usize,
}

impl Default for PhraseExtractor {
    fn default() -> Self {
        Self::from_config(&ClusteringConfig::default())
    }
}

impl PhraseExtractor {
    pub fn from_config(config: &ClusteringConfig) -> Self {
        Self {
            min_length: config.min_phrase_length,
            max_length: config.max_phrase_length,
            min_documents: config.min_documents_per_phrase,
        }
    }

    /// Extract phrase candidates.
    ///
    /// A candidate must be at least `min_length` terms long, appear in at
    /// least `min_documents` distinct documents, neither start nor end with
    /// a stopword and contain at least one term that can label a cluster.
    /// Candidates with identical document sets are collapsed to the longest
    /// phrase. The result is ordered by term sequence.
    pub fn extract(&self, suffix_array: &SuffixArray, index: &TermIndex) -> Vec<PhraseCandidate> {
        let mut candidates = Vec::new();
        let n = suffix_array.len();
        if n == 0 {
            return candidates;
        }

        let cap = self.max_length as u32;
        let lcp = |i: usize| suffix_array.lcp()[i].min(cap);

        // (lcp, left bound) of the open intervals
        let mut stack: Vec<(u32, usize)> = vec![(0, 0)];
        for i in 1..=n {
            let current = if i < n { lcp(i) } else { 0 };
            let mut left = i - 1;

            while let Some(&(top_lcp, top_left)) = stack.last() {
                if current >= top_lcp {
                    break;
                }
                stack.pop();
                let parent_lcp = stack.last().map_or(0, |&(l, _)| l).max(current);
                if let Some(candidate) =
                    self.candidate(suffix_array, index, top_lcp, parent_lcp, top_left, i - 1)
                {
                    candidates.push(candidate);
                }
                left = top_left;
            }

            let top_lcp = stack.last().map_or(0, |&(l, _)| l);
            if current > top_lcp {
                stack.push((current, left));
            }
        }

        dedup_by_documents(candidates)
    }

    /// Build a candidate from the interval `[left, right]` with prefix
    /// length `depth`, if it qualifies.
    ///
    /// Trailing stopwords are trimmed off. The trimmed prefix is shared by
    /// the same suffixes, so it keeps the interval's document set, unless it
    /// is no longer than `parent_depth`: then it is the label of an
    /// enclosing interval and is emitted from there.
    fn candidate(
        &self,
        suffix_array: &SuffixArray,
        index: &TermIndex,
        depth: u32,
        parent_depth: u32,
        left: usize,
        right: usize,
    ) -> Option<PhraseCandidate> {
        let mut terms = suffix_array.prefix(left, depth as usize);
        while let Some((&last, rest)) = terms.split_last() {
            if !index.term(last).is_stopword {
                break;
            }
            terms = rest;
        }
        if terms.len() < self.min_length || terms.len() <= parent_depth as usize {
            return None;
        }
        if index.term(*terms.first()?).is_stopword {
            return None;
        }
        if !terms.iter().any(|&t| index.term(t).can_label()) {
            return None;
        }

        let mut documents: Vec<u32> = (left..=right)
            .map(|rank| suffix_array.document_of_rank(rank))
            .collect();
        documents.sort_unstable();
        documents.dedup();
        if documents.len() < self.min_documents {
            return None;
        }

        Some(PhraseCandidate {
            terms: terms.to_vec(),
            documents,
            occurrences: (right - left + 1) as u32,
        })
    }
}
