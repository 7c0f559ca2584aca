//! Greedy agglomerative merging of base clusters
//!
//! Each step merges the pair of live clusters with the highest document-set
//! overlap, as long as it reaches the merge threshold. Candidate pairs are
//! totally ordered by (overlap desc, combined base score desc, canonical ids
//! asc), so the merge sequence is fully determined by the input. The
//! sequence for a stricter threshold is always a prefix of the sequence for
//! a looser one.

use super::base::{compute_intersection, sorted_union, BaseCluster};
use crate::index::TermId;
use crate::types::{ClusteringConfig, OverlapMeasure};
use std::cmp::Ordering;

/// Union of one or more base clusters
#[derive(Debug, Clone, PartialEq)]
pub struct MergedCluster {
    /// Base cluster ids, ascending; the first one is the canonical id
    pub members: Vec<usize>,
    /// Sorted document ordinals
    pub documents: Vec<u32>,
    /// Member phrases in merge order, without duplicates
    pub phrases: Vec<Vec<TermId>>,
    /// Sum of the member base scores
    pub base_score: f64,
}

impl MergedCluster {
    fn from_base(base: &BaseCluster) -> Self {
        Self {
            members: vec![base.id],
            documents: base.documents.clone(),
            phrases: vec![base.terms.clone()],
            base_score: base.score,
        }
    }

    pub fn canonical_id(&self) -> usize {
        self.members[0]
    }

    pub fn size(&self) -> usize {
        self.documents.len()
    }

    fn absorb(&mut self, other: MergedCluster) {
        self.documents = sorted_union(&self.documents, &other.documents);
        for phrase in other.phrases {
            if !self.phrases.contains(&phrase) {
                self.phrases.push(phrase);
            }
        }
        self.members.extend(other.members);
        self.members.sort_unstable();
        self.base_score += other.base_score;
    }
}

/// Symmetric pair values without the diagonal, stored as the flattened
/// upper triangle
struct PairMatrix {
    n: usize,
    values: Vec<f64>,
}

impl PairMatrix {
    fn new(n: usize) -> Self {
        Self {
            n,
            values: vec![0.0; n * n.saturating_sub(1) / 2],
        }
    }

    fn slot(&self, a: usize, b: usize) -> usize {
        let (i, j) = if a < b { (a, b) } else { (b, a) };
        i * self.n - i * (i + 1) / 2 + (j - i - 1)
    }

    fn get(&self, a: usize, b: usize) -> f64 {
        self.values[self.slot(a, b)]
    }

    fn set(&mut self, a: usize, b: usize, value: f64) {
        let slot = self.slot(a, b);
        self.values[slot] = value;
    }
}

#[derive(Debug, Clone)]
pub struct ClusterMerger {
    threshold: f64,
    measure: OverlapMeasure,
}

impl Default for ClusterMerger {
    fn default() -> Self {
        Self::from_config(&ClusteringConfig::default())
    }
}

impl ClusterMerger {
    pub fn new(threshold: f64, measure: OverlapMeasure) -> Self {
        Self { threshold, measure }
    }

    pub fn from_config(config: &ClusteringConfig) -> Self {
        Self::new(config.merge_threshold, config.overlap_measure)
    }

    /// Overlap ratio of two sorted document sets
    pub fn overlap(&self, a: &[u32], b: &[u32]) -> f64 {
        self.measure
            .ratio(a.len(), b.len(), compute_intersection(a, b))
    }

    /// Merge `base` (ids must equal positions) until no pair reaches the
    /// threshold.
    ///
    /// Every base cluster absorbed into another one gets its `merged_into`
    /// marker set to the canonical id of the resulting cluster. Merged
    /// clusters are returned in canonical id order.
    pub fn merge(&self, base: &mut [BaseCluster]) -> Vec<MergedCluster> {
        let n = base.len();
        let mut slots: Vec<Option<MergedCluster>> =
            base.iter().map(|b| Some(MergedCluster::from_base(b))).collect();

        let mut ratio = PairMatrix::new(n);
        for i in 0..n {
            for j in (i + 1)..n {
                ratio.set(i, j, self.overlap(&base[i].documents, &base[j].documents));
            }
        }

        loop {
            let mut best: Option<(usize, usize, f64, f64)> = None;

            for i in 0..n {
                let a = match &slots[i] {
                    Some(a) => a,
                    None => continue,
                };
                for j in (i + 1)..n {
                    let b = match &slots[j] {
                        Some(b) => b,
                        None => continue,
                    };
                    let r = ratio.get(i, j);
                    if r < self.threshold {
                        continue;
                    }
                    let combined = a.base_score + b.base_score;
                    let better = match best {
                        None => true,
                        Some((_, _, best_ratio, best_combined)) => {
                            match r.total_cmp(&best_ratio) {
                                Ordering::Greater => true,
                                Ordering::Less => false,
                                Ordering::Equal => combined > best_combined,
                            }
                        }
                    };
                    if better {
                        best = Some((i, j, r, combined));
                    }
                }
            }

            let (i, j) = match best {
                Some((i, j, _, _)) => (i, j),
                None => break,
            };

            if let Some(absorbed) = slots[j].take() {
                if let Some(target) = slots[i].as_mut() {
                    target.absorb(absorbed);
                }
            }

            if let Some(target) = &slots[i] {
                for k in 0..n {
                    if k == i {
                        continue;
                    }
                    if let Some(other) = &slots[k] {
                        ratio.set(i, k, self.overlap(&target.documents, &other.documents));
                    }
                }
            }
        }

        let merged: Vec<MergedCluster> = slots.into_iter().flatten().collect();
        for cluster in &merged {
            let canonical = cluster.canonical_id();
            for &member in &cluster.members[1..] {
                base[member].merged_into = Some(canonical);
            }
        }
        merged
    }
}
