//! Term / document index
//!
//! Built once per run from the analyzed documents, read-only afterwards.
//! Documents are addressed by *ordinal*: their position among the indexed
//! documents (skipped documents have no ordinal).

use super::vocabulary::{TermId, Vocabulary};
use crate::nlp::AnalyzedDocument;
use crate::types::{FieldKind, TokenType};
use rustc_hash::{FxHashMap, FxHashSet};

/// Weight multiplier for terms that occur in a single document
const SINGLETON_PENALTY: f64 = 0.1;

/// Aggregated statistics of one term
#[derive(Debug, Clone, PartialEq)]
pub struct TermStats {
    /// Number of documents containing the term
    pub document_frequency: u32,
    /// Total number of occurrences
    pub collection_frequency: u32,
    /// idf-style weight in [0, 1]
    pub weight: f64,
    /// Token type of the first occurrence
    pub token_type: TokenType,
    pub is_stopword: bool,
    /// Most frequent surface form, used for labels
    pub label: String,
}

impl TermStats {
    /// Whether the term may label a cluster on its own
    pub fn can_label(&self) -> bool {
        !self.is_stopword && self.token_type.can_label()
    }
}

/// One document as runs of term codes
#[derive(Debug, Clone)]
pub struct IndexedDocument {
    pub id: u32,
    /// Position of the document in the input batch
    pub position: usize,
    /// Runs of term codes; no phrase spans two segments
    pub segments: Vec<Vec<TermId>>,
    /// Mean weight of the document's distinct terms
    pub strength: f64,
}

impl IndexedDocument {
    /// Number of term occurrences
    pub fn len(&self) -> usize {
        self.segments.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.iter().all(Vec::is_empty)
    }
}

/// Read-only term statistics and coded documents for one run
#[derive(Debug, Clone, Default)]
pub struct TermIndex {
    vocabulary: Vocabulary,
    terms: Vec<TermStats>,
    documents: Vec<IndexedDocument>,
    /// Term → sorted document ordinals
    postings: Vec<Vec<u32>>,
}

impl TermIndex {
    /// Build the index from analyzed documents, in the given order.
    ///
    /// Term codes are assigned in first-seen order over this sequence, so the
    /// same input always yields the same codes regardless of how the
    /// documents were analyzed.
    pub fn build(analyzed: &[AnalyzedDocument]) -> Self {
        let total_tokens: usize = analyzed.iter().map(|d| d.tokens.len()).sum();
        let mut vocabulary = Vocabulary::with_capacity(total_tokens / 2 + 1);
        let mut collection_frequency: Vec<u32> = Vec::new();
        let mut first_type: Vec<TokenType> = Vec::new();
        let mut stopword: Vec<bool> = Vec::new();
        let mut surfaces: Vec<FxHashMap<String, u32>> = Vec::new();
        let mut postings: Vec<Vec<u32>> = Vec::new();
        let mut documents = Vec::with_capacity(analyzed.len());

        for (ordinal, doc) in analyzed.iter().enumerate() {
            let mut segments: Vec<Vec<TermId>> = Vec::new();
            let mut current: Vec<TermId> = Vec::new();
            let mut current_field: Option<FieldKind> = None;

            for token in &doc.tokens {
                if current_field != Some(token.field) {
                    if !current.is_empty() {
                        segments.push(std::mem::take(&mut current));
                    }
                    current_field = Some(token.field);
                }

                if token.token_type.is_ignorable() {
                    if !current.is_empty() {
                        segments.push(std::mem::take(&mut current));
                    }
                    continue;
                }

                let id = vocabulary.intern(&token.normalized);
                let slot = id as usize;
                if slot == collection_frequency.len() {
                    collection_frequency.push(0);
                    first_type.push(token.token_type);
                    stopword.push(false);
                    surfaces.push(FxHashMap::default());
                    postings.push(Vec::new());
                }

                collection_frequency[slot] += 1;
                stopword[slot] |= token.is_stopword;
                *surfaces[slot].entry(token.text.clone()).or_insert(0) += 1;
                if postings[slot].last() != Some(&(ordinal as u32)) {
                    postings[slot].push(ordinal as u32);
                }
                current.push(id);
            }
            if !current.is_empty() {
                segments.push(current);
            }

            documents.push(IndexedDocument {
                id: doc.id,
                position: doc.position,
                segments,
                strength: 0.0,
            });
        }

        let n = documents.len();
        let terms: Vec<TermStats> = (0..vocabulary.len())
            .map(|slot| {
                let df = postings[slot].len() as u32;
                let token_type = first_type[slot];
                let weight = if stopword[slot] || !token_type.can_label() {
                    0.0
                } else {
                    idf_weight(df, n)
                };
                TermStats {
                    document_frequency: df,
                    collection_frequency: collection_frequency[slot],
                    weight,
                    token_type,
                    is_stopword: stopword[slot],
                    label: canonical_surface(&surfaces[slot]),
                }
            })
            .collect();

        for doc in &mut documents {
            let distinct: FxHashSet<TermId> = doc.segments.iter().flatten().copied().collect();
            if !distinct.is_empty() {
                let total: f64 = distinct.iter().map(|&t| terms[t as usize].weight).sum();
                doc.strength = total / distinct.len() as f64;
            }
        }

        Self {
            vocabulary,
            terms,
            documents,
            postings,
        }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Statistics of a term
    pub fn term(&self, id: TermId) -> &TermStats {
        &self.terms[id as usize]
    }

    pub fn terms(&self) -> &[TermStats] {
        &self.terms
    }

    pub fn num_terms(&self) -> usize {
        self.terms.len()
    }

    /// Indexed documents, by ordinal
    pub fn documents(&self) -> &[IndexedDocument] {
        &self.documents
    }

    pub fn num_documents(&self) -> usize {
        self.documents.len()
    }

    /// Sorted ordinals of the documents containing `id`
    pub fn postings(&self, id: TermId) -> &[u32] {
        &self.postings[id as usize]
    }

    /// Total number of term occurrences
    pub fn num_occurrences(&self) -> usize {
        self.documents.iter().map(IndexedDocument::len).sum()
    }

    /// Label text of a term sequence
    pub fn phrase_label(&self, phrase: &[TermId]) -> String {
        phrase
            .iter()
            .map(|&t| self.terms[t as usize].label.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// idf-style weight: `ln((N + 1) / df) / ln(N + 1)`, penalized for `df <= 1`.
///
/// Terms present in every document get a weight close to zero, terms present
/// in only one document are damped by [`SINGLETON_PENALTY`].
pub fn idf_weight(document_frequency: u32, num_documents: usize) -> f64 {
    if document_frequency == 0 || num_documents == 0 {
        return 0.0;
    }
    let n = num_documents as f64 + 1.0;
    let weight = (n / document_frequency as f64).ln() / n.ln();
    if document_frequency <= 1 {
        weight * SINGLETON_PENALTY
    } else {
        weight
    }
}

/// Most frequent surface form; ties go to the lexicographically smallest
fn canonical_surface(variants: &FxHashMap<String, u32>) -> String {
    variants
        .iter()
        .max_by(|(text_a, count_a), (text_b, count_b)| {
            count_a.cmp(count_b).then_with(|| text_b.cmp(text_a))
        })
        .map(|(text, _)| text.clone())
        .unwrap_or_default()
}
