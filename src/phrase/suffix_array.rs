//! Generalized suffix array over the coded document streams
//!
//! All segments of all documents are concatenated into one symbol stream.
//! Every segment is followed by its own terminator symbol; terminators are
//! numbered from `vocabulary_len` upward, so they are unique and compare
//! greater than any real term code. No common prefix can therefore contain a
//! terminator, and repeated substrings never cross a phrase break or a
//! document boundary.
//!
//! Construction is prefix doubling over rank pairs (O(n log² n) with a
//! comparison sort, parallel when requested). LCPs come from Kasai's
//! algorithm.

use crate::index::{TermId, TermIndex};
use rayon::prelude::*;
use std::cmp::Ordering;
use std::ops::Range;

/// A term code or a terminator
pub type Symbol = u32;

#[derive(Debug, Clone, Default)]
pub struct SuffixArray {
    text: Vec<Symbol>,
    /// Document ordinal of every stream position
    document_of: Vec<u32>,
    /// Suffix start positions in lexicographic order
    suffixes: Vec<u32>,
    /// `lcp[i]` = common prefix length of `suffixes[i - 1]` and `suffixes[i]`
    lcp: Vec<u32>,
    first_terminator: Symbol,
}

impl SuffixArray {
    /// Build the suffix array over every indexed document
    pub fn build(index: &TermIndex, parallel: bool) -> Self {
        let first_terminator = index.num_terms() as Symbol;
        let capacity = index.num_occurrences()
            + index
                .documents()
                .iter()
                .map(|d| d.segments.len())
                .sum::<usize>();

        let mut text = Vec::with_capacity(capacity);
        let mut document_of = Vec::with_capacity(capacity);
        let mut next_terminator = first_terminator;

        for (ordinal, doc) in index.documents().iter().enumerate() {
            for segment in &doc.segments {
                text.extend_from_slice(segment);
                text.push(next_terminator);
                next_terminator += 1;
                document_of.resize(text.len(), ordinal as u32);
            }
        }

        Self::from_stream(text, document_of, first_terminator, parallel)
    }

    /// Build from a raw stream. `document_of` must be as long as `text`.
    pub fn from_stream(
        text: Vec<Symbol>,
        document_of: Vec<u32>,
        first_terminator: Symbol,
        parallel: bool,
    ) -> Self {
        let suffixes = sort_suffixes(&text, parallel);
        let lcp = kasai_lcp(&text, &suffixes);
        Self {
            text,
            document_of,
            suffixes,
            lcp,
            first_terminator,
        }
    }

    pub fn len(&self) -> usize {
        self.suffixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.suffixes.is_empty()
    }

    /// The concatenated stream
    pub fn text(&self) -> &[Symbol] {
        &self.text
    }

    /// Sorted suffix start positions
    pub fn suffixes(&self) -> &[u32] {
        &self.suffixes
    }

    pub fn lcp(&self) -> &[u32] {
        &self.lcp
    }

    /// Document ordinal owning stream position `position`
    pub fn document_at(&self, position: usize) -> u32 {
        self.document_of[position]
    }

    /// Document ordinal of the `rank`-th smallest suffix
    pub fn document_of_rank(&self, rank: usize) -> u32 {
        self.document_of[self.suffixes[rank] as usize]
    }

    pub fn is_terminator(&self, symbol: Symbol) -> bool {
        symbol >= self.first_terminator
    }

    /// The first `len` symbols of the `rank`-th smallest suffix
    pub fn prefix(&self, rank: usize, len: usize) -> &[TermId] {
        let start = self.suffixes[rank] as usize;
        let end = (start + len).min(self.text.len());
        &self.text[start..end]
    }

    /// Ranks of all suffixes starting with `pattern`
    pub fn find(&self, pattern: &[TermId]) -> Range<usize> {
        if pattern.is_empty() {
            return 0..self.len();
        }
        let lower = self
            .suffixes
            .partition_point(|&s| self.compare_prefix(s, pattern) == Ordering::Less);
        let upper = self
            .suffixes
            .partition_point(|&s| self.compare_prefix(s, pattern) != Ordering::Greater);
        lower..upper
    }

    /// Number of occurrences of `pattern`
    pub fn count(&self, pattern: &[TermId]) -> usize {
        self.find(pattern).len()
    }

    fn compare_prefix(&self, start: u32, pattern: &[TermId]) -> Ordering {
        let start = start as usize;
        let end = (start + pattern.len()).min(self.text.len());
        self.text[start..end].cmp(pattern)
    }
}

/// Prefix doubling: sort by (rank[i], rank[i + k]) until all ranks differ
fn sort_suffixes(text: &[Symbol], parallel: bool) -> Vec<u32> {
    let n = text.len();
    let mut suffixes: Vec<u32> = (0..n as u32).collect();
    if n <= 1 {
        return suffixes;
    }

    let mut rank: Vec<u32> = text.to_vec();
    let mut next_rank = vec![0u32; n];
    let mut k = 1usize;

    loop {
        let key = |i: u32| -> (u32, u32) {
            let i = i as usize;
            let second = if i + k < n { rank[i + k] + 1 } else { 0 };
            (rank[i], second)
        };

        if parallel {
            suffixes.par_sort_unstable_by_key(|&i| key(i));
        } else {
            suffixes.sort_unstable_by_key(|&i| key(i));
        }

        next_rank[suffixes[0] as usize] = 0;
        for j in 1..n {
            let bump = u32::from(key(suffixes[j]) != key(suffixes[j - 1]));
            next_rank[suffixes[j] as usize] = next_rank[suffixes[j - 1] as usize] + bump;
        }
        std::mem::swap(&mut rank, &mut next_rank);

        if rank[suffixes[n - 1] as usize] as usize == n - 1 || k >= n {
            break;
        }
        k *= 2;
    }

    suffixes
}

fn kasai_lcp(text: &[Symbol], suffixes: &[u32]) -> Vec<u32> {
    let n = text.len();
    let mut lcp = vec![0u32; n];
    let mut rank = vec![0usize; n];
    for (r, &s) in suffixes.iter().enumerate() {
        rank[s as usize] = r;
    }

    let mut h = 0usize;
    for i in 0..n {
        if rank[i] == 0 {
            h = 0;
            continue;
        }
        let j = suffixes[rank[i] - 1] as usize;
        while i + h < n && j + h < n && text[i + h] == text[j + h] {
            h += 1;
        }
        lcp[rank[i]] = h as u32;
        h = h.saturating_sub(1);
    }

    lcp
}
