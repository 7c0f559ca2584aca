//! Clustering output
//!
//! A [`ClusterResult`] is built once by [`assemble`] and never mutated
//! afterwards; it is `Send + Sync` and can be shared between readers.

use crate::clustering::{RankedCluster, Ranking};
use crate::document::Document;
use crate::errors::{ClusteringError, Result};
use crate::index::TermIndex;
use crate::pipeline::observer::STAGE_ASSEMBLE;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

/// One output cluster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    pub label: String,
    /// Descriptive phrases, best first; the first one is the label
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub phrases: Vec<String>,
    pub score: f64,
    /// Member document ids, in input order
    pub documents: Vec<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subclusters: Vec<Cluster>,
    /// Set on the catch-all "Other Topics" cluster
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub other_topics: bool,
}

impl Cluster {
    pub fn size(&self) -> usize {
        self.documents.len()
    }

    pub fn is_other_topics(&self) -> bool {
        self.other_topics
    }

    pub fn contains(&self, id: u32) -> bool {
        self.documents.contains(&id)
    }
}

/// A document that was skipped, and why
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputWarning {
    /// Position of the document in the input batch
    pub document_index: usize,
    pub document_id: Option<u32>,
    pub message: String,
}

/// Ranked clusters, "Other Topics" and the echoed input documents
#[derive(Debug, Clone, Default, Serialize)]
pub struct ClusterResult {
    clusters: Vec<Cluster>,
    documents: Vec<Document>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<InputWarning>,
    #[serde(skip)]
    positions: FxHashMap<u32, usize>,
}

impl ClusterResult {
    /// All clusters in ranking order; "Other Topics", if any, is last
    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    /// Clusters without "Other Topics"
    pub fn ranked_clusters(&self) -> &[Cluster] {
        match self.clusters.last() {
            Some(last) if last.is_other_topics() => &self.clusters[..self.clusters.len() - 1],
            _ => &self.clusters,
        }
    }

    pub fn other_topics(&self) -> Option<&Cluster> {
        self.clusters.last().filter(|c| c.is_other_topics())
    }

    /// The input documents, with ids assigned
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Look up a document by id
    pub fn document(&self, id: u32) -> Option<&Document> {
        self.positions.get(&id).map(|&p| &self.documents[p])
    }

    /// The member documents of `cluster`, in cluster order
    pub fn cluster_documents(&self, cluster: &Cluster) -> Vec<&Document> {
        cluster
            .documents
            .iter()
            .filter_map(|&id| self.document(id))
            .collect()
    }

    /// Documents skipped during tokenization
    pub fn warnings(&self) -> &[InputWarning] {
        &self.warnings
    }

    /// Documents that appear in no cluster, "Other Topics" included
    pub fn unclustered(&self) -> Vec<&Document> {
        let mut claimed: FxHashSet<u32> = FxHashSet::default();
        let mut stack: Vec<&Cluster> = self.clusters.iter().collect();
        while let Some(cluster) = stack.pop() {
            claimed.extend(cluster.documents.iter().copied());
            stack.extend(cluster.subclusters.iter());
        }
        self.documents
            .iter()
            .filter(|d| d.id.map_or(true, |id| !claimed.contains(&id)))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// Serialize clusters, documents and warnings to JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Build the immutable result.
///
/// Ordinals in `ranking` are resolved to document ids through `index`, and
/// every id is checked against `documents`. A dangling reference means an
/// earlier stage broke an invariant and fails the run.
pub fn assemble(
    documents: Vec<Document>,
    index: &TermIndex,
    ranking: Ranking,
    warnings: Vec<InputWarning>,
    other_topics_label: &str,
) -> Result<ClusterResult> {
    let mut positions = FxHashMap::default();
    for (position, document) in documents.iter().enumerate() {
        let id = document.id.ok_or_else(|| {
            ClusteringError::inconsistent_state(
                STAGE_ASSEMBLE,
                format!("document at position {} has no id", position),
            )
        })?;
        positions.insert(id, position);
    }

    let resolve = |ordinals: &[u32]| -> Result<Vec<u32>> {
        ordinals
            .iter()
            .map(|&ordinal| {
                let indexed = index.documents().get(ordinal as usize).ok_or_else(|| {
                    ClusteringError::inconsistent_state(
                        STAGE_ASSEMBLE,
                        format!("document ordinal {} is out of range", ordinal),
                    )
                })?;
                if !positions.contains_key(&indexed.id) {
                    return Err(ClusteringError::inconsistent_state(
                        STAGE_ASSEMBLE,
                        format!("document id {} is not in the input", indexed.id),
                    ));
                }
                Ok(indexed.id)
            })
            .collect()
    };

    fn convert(
        cluster: RankedCluster,
        resolve: &dyn Fn(&[u32]) -> Result<Vec<u32>>,
    ) -> Result<Cluster> {
        let documents = resolve(&cluster.documents)?;
        let subclusters = cluster
            .subclusters
            .into_iter()
            .map(|sub| convert(sub, resolve))
            .collect::<Result<Vec<_>>>()?;
        Ok(Cluster {
            label: cluster.label,
            phrases: cluster.phrases,
            score: cluster.score,
            documents,
            subclusters,
            other_topics: false,
        })
    }

    let mut clusters = ranking
        .clusters
        .into_iter()
        .map(|c| convert(c, &resolve))
        .collect::<Result<Vec<_>>>()?;

    if !ranking.other_topics.is_empty() {
        clusters.push(Cluster {
            label: other_topics_label.to_string(),
            phrases: Vec::new(),
            score: 0.0,
            documents: resolve(&ranking.other_topics)?,
            subclusters: Vec::new(),
            other_topics: true,
        });
    }

    Ok(ClusterResult {
        clusters,
        documents,
        warnings,
        positions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;
    use crate::nlp::{Analyzer, StemmerRegistry};

    fn indexed(docs: &[Document]) -> TermIndex {
        let analyzer = Analyzer::new(StemmerRegistry::empty(), None);
        let analyzed: Vec<_> = docs
            .iter()
            .enumerate()
            .map(|(i, d)| analyzer.analyze(i, d.id.unwrap_or(i as u32), d))
            .collect();
        TermIndex::build(&analyzed)
    }

    fn ranked(label: &str, documents: &[u32]) -> RankedCluster {
        RankedCluster {
            label: label.to_string(),
            phrases: vec![label.to_string()],
            score: 1.0,
            documents: documents.to_vec(),
            subclusters: Vec::new(),
        }
    }

    fn docs() -> Vec<Document> {
        vec![
            Document::new("a b", "").with_id(10),
            Document::new("a c", "").with_id(20),
            Document::new("d", "").with_id(30),
        ]
    }

    #[test]
    fn test_assemble_resolves_ids() {
        let documents = docs();
        let index = indexed(&documents);
        let ranking = Ranking {
            clusters: vec![ranked("a", &[0, 1])],
            other_topics: vec![2],
        };
        let result = assemble(documents, &index, ranking, Vec::new(), "Other Topics").unwrap();

        assert_eq!(result.clusters().len(), 2);
        assert_eq!(result.ranked_clusters().len(), 1);
        assert_eq!(result.ranked_clusters()[0].documents, vec![10, 20]);

        let other = result.other_topics().unwrap();
        assert_eq!(other.label, "Other Topics");
        assert_eq!(other.documents, vec![30]);
        assert!(other.is_other_topics());

        assert_eq!(result.document(20).and_then(|d| d.title.as_deref()), Some("a c"));
        assert!(result.document(99).is_none());
        let members = result.cluster_documents(&result.ranked_clusters()[0]);
        assert_eq!(members.len(), 2);
        assert!(result.unclustered().is_empty());
    }

    #[test]
    fn test_no_other_topics_when_all_claimed() {
        let documents = docs();
        let index = indexed(&documents);
        let ranking = Ranking {
            clusters: vec![ranked("a", &[0, 1, 2])],
            other_topics: Vec::new(),
        };
        let result = assemble(documents, &index, ranking, Vec::new(), "Other Topics").unwrap();
        assert!(result.other_topics().is_none());
        assert_eq!(result.ranked_clusters().len(), 1);
    }

    #[test]
    fn test_dangling_ordinal_is_inconsistent() {
        let documents = docs();
        let index = indexed(&documents);
        let ranking = Ranking {
            clusters: vec![ranked("a", &[0, 7])],
            other_topics: Vec::new(),
        };
        let err = assemble(documents, &index, ranking, Vec::new(), "Other Topics").unwrap_err();
        assert_eq!(err.code(), ErrorCode::InconsistentState);
    }

    #[test]
    fn test_unknown_id_is_inconsistent() {
        let index = indexed(&docs());
        let ranking = Ranking {
            clusters: vec![ranked("a", &[0])],
            other_topics: Vec::new(),
        };
        let err = assemble(vec![Document::new("x", "").with_id(1)], &index, ranking, Vec::new(), "x")
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InconsistentState);
    }

    #[test]
    fn test_unclustered_and_warnings() {
        let documents = vec![
            Document::new("a", "").with_id(0),
            Document::default().with_id(1),
        ];
        let index = indexed(&documents[..1]);
        let warnings = vec![InputWarning {
            document_index: 1,
            document_id: Some(1),
            message: "no text content".to_string(),
        }];
        let ranking = Ranking {
            clusters: Vec::new(),
            other_topics: vec![0],
        };
        let result = assemble(documents, &index, ranking, warnings, "Other Topics").unwrap();

        assert_eq!(result.warnings().len(), 1);
        let unclustered: Vec<_> = result.unclustered().iter().map(|d| d.id).collect();
        assert_eq!(unclustered, vec![Some(1)]);
    }

    #[test]
    fn test_to_json() {
        let documents = docs();
        let index = indexed(&documents);
        let ranking = Ranking {
            clusters: vec![ranked("a", &[0, 1])],
            other_topics: vec![2],
        };
        let result = assemble(documents, &index, ranking, Vec::new(), "Other Topics").unwrap();
        let json: serde_json::Value = serde_json::from_str(&result.to_json().unwrap()).unwrap();
        assert_eq!(json["clusters"][0]["label"], "a");
        assert_eq!(json["clusters"][1]["other_topics"], true);
        assert!(json.get("warnings").is_none());
    }

    #[test]
    fn test_result_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ClusterResult>();
    }
}
