//! Labeling, scoring and ranking of merged clusters

use super::base::{is_subset, phrase_score, BaseCluster};
use super::merge::MergedCluster;
use crate::index::{TermId, TermIndex};
use crate::types::ClusteringConfig;
use std::cmp::Ordering;

/// A labeled cluster whose documents are still ordinals
#[derive(Debug, Clone, PartialEq)]
pub struct RankedCluster {
    pub label: String,
    /// Descriptive phrases, best first; the first one is the label
    pub phrases: Vec<String>,
    pub score: f64,
    /// Sorted document ordinals
    pub documents: Vec<u32>,
    pub subclusters: Vec<RankedCluster>,
}

impl RankedCluster {
    pub fn size(&self) -> usize {
        self.documents.len()
    }
}

/// Final ranked clusters plus the documents none of them claims
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ranking {
    pub clusters: Vec<RankedCluster>,
    /// Sorted ordinals of the "Other Topics" documents
    pub other_topics: Vec<u32>,
}

/// A cluster together with its tie-breaking keys
struct Candidate {
    cluster: RankedCluster,
    earliest_id: u32,
    strength: f64,
}

/// Total ranking order: score desc, size desc, earliest document id asc,
/// summed document strength desc, label asc
fn compare(a: &Candidate, b: &Candidate) -> Ordering {
    b.cluster
        .score
        .total_cmp(&a.cluster.score)
        .then_with(|| b.cluster.size().cmp(&a.cluster.size()))
        .then_with(|| a.earliest_id.cmp(&b.earliest_id))
        .then_with(|| b.strength.total_cmp(&a.strength))
        .then_with(|| a.cluster.label.cmp(&b.cluster.label))
}

#[derive(Debug, Clone)]
pub struct ClusterRanker {
    min_cluster_size: usize,
    max_clusters: Option<usize>,
    max_length_boost: usize,
    label_weight: f64,
    size_weight: f64,
    max_label_phrases: usize,
    hierarchical: bool,
}

impl Default for ClusterRanker {
    fn default() -> Self {
        Self::from_config(&ClusteringConfig::default())
    }
}

impl ClusterRanker {
    pub fn from_config(config: &ClusteringConfig) -> Self {
        Self {
            min_cluster_size: config.min_cluster_size,
            max_clusters: config.max_clusters,
            max_length_boost: config.max_length_boost,
            label_weight: config.label_weight,
            size_weight: config.size_weight,
            max_label_phrases: config.max_label_phrases,
            hierarchical: config.hierarchical,
        }
    }

    /// Label, score, filter, sort and cap the merged clusters.
    ///
    /// Clusters below the minimum size are dropped first; the cap then cuts
    /// the lowest ranked clusters. Documents not covered by a surviving
    /// cluster end up in `other_topics`.
    pub fn rank(&self, merged: &[MergedCluster], base: &[BaseCluster], index: &TermIndex) -> Ranking {
        let num_documents = index.num_documents();

        let mut candidates: Vec<Candidate> = merged
            .iter()
            .filter(|m| m.size() >= self.min_cluster_size)
            .filter_map(|m| self.label_merged(m, base, index))
            .collect();
        candidates.sort_by(compare);
        if let Some(max) = self.max_clusters {
            candidates.truncate(max);
        }

        let mut covered = vec![false; num_documents];
        for candidate in &candidates {
            for &ordinal in &candidate.cluster.documents {
                if let Some(slot) = covered.get_mut(ordinal as usize) {
                    *slot = true;
                }
            }
        }
        let other_topics = covered
            .iter()
            .enumerate()
            .filter(|(_, &c)| !c)
            .map(|(ordinal, _)| ordinal as u32)
            .collect();

        Ranking {
            clusters: candidates.into_iter().map(|c| c.cluster).collect(),
            other_topics,
        }
    }

    fn label_merged(
        &self,
        merged: &MergedCluster,
        base: &[BaseCluster],
        index: &TermIndex,
    ) -> Option<Candidate> {
        let size = merged.size() as f64;
        let mut scored: Vec<(&BaseCluster, f64)> = merged
            .members
            .iter()
            .filter_map(|&id| base.get(id))
            .map(|b| {
                let coverage = b.size() as f64 / size;
                (b, phrase_score(&b.terms, index, self.max_length_boost, coverage))
            })
            .collect();
        scored.sort_by(|(a, sa), (b, sb)| {
            sb.total_cmp(sa)
                .then_with(|| b.terms.len().cmp(&a.terms.len()))
                .then_with(|| a.terms.cmp(&b.terms))
        });

        let label_score = scored.first()?.1;
        let mut chosen: Vec<&[TermId]> = Vec::new();
        for (b, _) in &scored {
            if chosen.len() == self.max_label_phrases {
                break;
            }
            let redundant = chosen
                .iter()
                .any(|c| b.terms.iter().all(|t| c.contains(t)));
            if !redundant {
                chosen.push(&b.terms);
            }
        }
        let phrases: Vec<String> = chosen.iter().map(|t| index.phrase_label(t)).collect();

        let subclusters = if self.hierarchical && merged.members.len() > 1 {
            self.subclusters(merged, &scored, index)
        } else {
            Vec::new()
        };

        let cluster = RankedCluster {
            label: phrases.first()?.clone(),
            phrases,
            score: self.cluster_score(label_score, merged.size(), index.num_documents()),
            documents: merged.documents.clone(),
            subclusters,
        };
        Some(self.candidate(cluster, index))
    }

    /// One sub-cluster per member whose documents are a strict subset of
    /// the parent's, ranked with the same order
    fn subclusters(
        &self,
        parent: &MergedCluster,
        scored: &[(&BaseCluster, f64)],
        index: &TermIndex,
    ) -> Vec<RankedCluster> {
        let mut candidates: Vec<Candidate> = scored
            .iter()
            .filter(|(b, _)| {
                b.size() >= self.min_cluster_size
                    && b.size() < parent.size()
                    && is_subset(&b.documents, &parent.documents)
            })
            .map(|(b, _)| {
                let label = index.phrase_label(&b.terms);
                let score = phrase_score(&b.terms, index, self.max_length_boost, 1.0);
                let cluster = RankedCluster {
                    label: label.clone(),
                    phrases: vec![label],
                    score: self.cluster_score(score, b.size(), index.num_documents()),
                    documents: b.documents.clone(),
                    subclusters: Vec::new(),
                };
                self.candidate(cluster, index)
            })
            .collect();
        candidates.sort_by(compare);

        let mut result: Vec<RankedCluster> = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if result.iter().all(|r| r.documents != candidate.cluster.documents) {
                result.push(candidate.cluster);
            }
        }
        result
    }

    /// `label_weight × label_score / max_length_boost + size_weight × size / N`
    ///
    /// Both terms lie in [0, 1] before weighting.
    pub fn cluster_score(&self, label_score: f64, size: usize, num_documents: usize) -> f64 {
        let coverage = if num_documents == 0 {
            0.0
        } else {
            size as f64 / num_documents as f64
        };
        let label = label_score / self.max_length_boost as f64;
        self.label_weight * label + self.size_weight * coverage
    }

    fn candidate(&self, cluster: RankedCluster, index: &TermIndex) -> Candidate {
        let documents = index.documents();
        let earliest_id = cluster
            .documents
            .iter()
            .filter_map(|&o| documents.get(o as usize))
            .map(|d| d.id)
            .min()
            .unwrap_or(u32::MAX);
        let strength = cluster
            .documents
            .iter()
            .filter_map(|&o| documents.get(o as usize))
            .map(|d| d.strength)
            .sum();
        Candidate {
            cluster,
            earliest_id,
            strength,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clustering::{BaseClusterBuilder, ClusterMerger};
    use crate::document::Document;
    use crate::nlp::{Analyzer, StemmerRegistry};
    use crate::phrase::{PhraseExtractor, SuffixArray};
    use crate::types::LanguageCode;

    fn rank(docs: &[Document], config: &ClusteringConfig) -> Ranking {
        let analyzer = Analyzer::new(StemmerRegistry::with_defaults(), Some(LanguageCode::English));
        let analyzed: Vec<_> = docs
            .iter()
            .enumerate()
            .map(|(i, d)| analyzer.analyze(i, i as u32, d))
            .collect();
        let index = TermIndex::build(&analyzed);
        let sa = SuffixArray::build(&index, false);
        let phrases = PhraseExtractor::from_config(config).extract(&sa, &index);
        let mut base = BaseClusterBuilder::from_config(config).build(phrases, &index);
        let merged = ClusterMerger::from_config(config).merge(&mut base);
        ClusterRanker::from_config(config).rank(&merged, &base, &index)
    }

    fn sample() -> Vec<Document> {
        vec![
            Document::new("Data mining tools", "Tools for data mining"),
            Document::new("Introduction to data mining", ""),
            Document::new("Data mining algorithms", ""),
            Document::new("Machine learning basics", ""),
            Document::new("Machine learning in practice", ""),
            Document::new("Gardening tips", ""),
        ]
    }

    #[test]
    fn test_labels_and_order() {
        let ranking = rank(&sample(), &ClusteringConfig::default());
        let labels: Vec<_> = ranking.clusters.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["Data mining", "Machine learning"]);
        assert_eq!(ranking.clusters[0].documents, vec![0, 1, 2]);
        assert_eq!(ranking.clusters[1].documents, vec![3, 4]);
        assert_eq!(ranking.other_topics, vec![5]);
    }

    #[test]
    fn test_descriptions_skip_contained_phrases() {
        let ranking = rank(&sample(), &ClusteringConfig::default());
        let phrases = &ranking.clusters[0].phrases;
        assert_eq!(phrases[0], "Data mining");
        // "Data" and "mining" are contained in the label
        assert!(!phrases.iter().any(|p| p == "Data" || p == "mining"));
    }

    #[test]
    fn test_cap_moves_documents_to_other_topics() {
        let config = ClusteringConfig::default().with_max_clusters(1);
        let ranking = rank(&sample(), &config);
        assert_eq!(ranking.clusters.len(), 1);
        assert_eq!(ranking.other_topics, vec![3, 4, 5]);
    }

    #[test]
    fn test_min_size_filter() {
        let config = ClusteringConfig::default().with_min_cluster_size(3);
        let ranking = rank(&sample(), &config);
        assert_eq!(ranking.clusters.len(), 1);
        assert!(ranking.clusters.iter().all(|c| c.size() >= 3));
    }

    #[test]
    fn test_hierarchical_subclusters() {
        let docs = vec![
            Document::new("Data mining tools", ""),
            Document::new("Data mining tools", ""),
            Document::new("Data mining algorithms", ""),
            Document::new("Data warehouses", ""),
        ];
        let config = ClusteringConfig::default().with_hierarchical(true);
        let ranking = rank(&docs, &config);

        assert_eq!(ranking.clusters.len(), 1);
        let top = &ranking.clusters[0];
        assert_eq!(top.documents, vec![0, 1, 2]);
        // "data mining tools" and "tools" cover the same pair; one sub-cluster survives
        assert_eq!(top.subclusters.len(), 1);
        assert_eq!(top.subclusters[0].label, "Data mining tools");
        assert_eq!(top.subclusters[0].documents, vec![0, 1]);
        assert!(top.subclusters[0].subclusters.is_empty());
        assert_eq!(ranking.other_topics, vec![3]);
    }

    #[test]
    fn test_flat_by_default() {
        let ranking = rank(&sample(), &ClusteringConfig::default());
        assert!(ranking.clusters.iter().all(|c| c.subclusters.is_empty()));
    }

    #[test]
    fn test_cluster_score() {
        let ranker = ClusterRanker::default();
        assert_eq!(ranker.cluster_score(1.5, 5, 10), 1.0);
        assert_eq!(ranker.cluster_score(1.5, 5, 0), 0.5);
    }

    #[test]
    fn test_empty() {
        let ranking = rank(&[], &ClusteringConfig::default());
        assert!(ranking.clusters.is_empty());
        assert!(ranking.other_topics.is_empty());
    }
}
