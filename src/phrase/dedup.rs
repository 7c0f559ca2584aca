//! Identical-document-set resolution for phrase candidates
//!
//! Nested suffix tree nodes often cover exactly the same documents
//! ("big data mining", "data mining", "mining platform"). Only one phrase per
//! document set survives.

use super::extraction::PhraseCandidate;
use rustc_hash::FxHashMap;
use std::cmp::Ordering;

/// Order of preference between two phrases covering the same documents:
/// longer first, then the lexicographically smaller term sequence
pub fn preference(a: &PhraseCandidate, b: &PhraseCandidate) -> Ordering {
    b.terms
        .len()
        .cmp(&a.terms.len())
        .then_with(|| a.terms.cmp(&b.terms))
}

/// Keep one candidate per distinct document set.
///
/// The result is sorted by term sequence so it does not depend on the order
/// candidates were discovered in.
pub fn dedup_by_documents(candidates: Vec<PhraseCandidate>) -> Vec<PhraseCandidate> {
    let mut best: FxHashMap<Vec<u32>, PhraseCandidate> = FxHashMap::default();

    for candidate in candidates {
        match best.get_mut(&candidate.documents) {
            Some(kept) => {
                if preference(&candidate, kept) == Ordering::Less {
                    *kept = candidate;
                }
            }
            None => {
                best.insert(candidate.documents.clone(), candidate);
            }
        }
    }

    let mut result: Vec<PhraseCandidate> = best.into_values().collect();
    result.sort_by(|a, b| a.terms.cmp(&b.terms));
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(terms: &[u32], documents: &[u32]) -> PhraseCandidate {
        PhraseCandidate {
            terms: terms.to_vec(),
            documents: documents.to_vec(),
            occurrences: documents.len() as u32,
        }
    }

    #[test]
    fn test_longer_phrase_preferred() {
        let result = dedup_by_documents(vec![
            candidate(&[1, 2], &[0, 1]),
            candidate(&[0, 1, 2], &[0, 1]),
        ]);
        assert_eq!(result, vec![candidate(&[0, 1, 2], &[0, 1])]);
    }

    #[test]
    fn test_lexicographic_tie_break() {
        let result = dedup_by_documents(vec![
            candidate(&[4, 5], &[2, 3]),
            candidate(&[3, 9], &[2, 3]),
        ]);
        assert_eq!(result, vec![candidate(&[3, 9], &[2, 3])]);
    }

    #[test]
    fn test_distinct_sets_kept_in_term_order() {
        let result = dedup_by_documents(vec![
            candidate(&[7, 8], &[0, 1]),
            candidate(&[1, 2], &[1, 2]),
        ]);
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].terms, vec![1, 2]);
    }

    #[test]
    fn test_empty_input() {
        assert!(dedup_by_documents(Vec::new()).is_empty());
    }
}
