//! Base cluster construction, merging and ranking

pub mod base;
pub mod merge;
pub mod ranking;

pub use base::{
    compute_intersection, is_subset, phrase_score, sorted_union, BaseCluster, BaseClusterBuilder,
};
pub use merge::{ClusterMerger, MergedCluster};
pub use ranking::{ClusterRanker, RankedCluster, Ranking};
