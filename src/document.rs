//! Input documents
//!
//! A document is a fixed set of well-known optional fields plus an open
//! `fields` map for anything a document source wants to carry along. The
//! clustering core only reads `title`, `summary` and `language`.

use crate::errors::{ClusteringError, Result};
use crate::types::LanguageCode;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A search result (or any short text) to be clustered
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Identifier, unique within a batch. Assigned before clustering if absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Short summary, e.g. the snippet returned by a search engine
    #[serde(default, rename = "snippet", skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<LanguageCode>,
    /// Source-specific relevance score
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Names of the sources the document was found in
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
    /// Any other fields
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, serde_json::Value>,
}

impl Document {
    /// Create a document with a title and a summary
    pub fn new(title: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            summary: Some(summary.into()),
            ..Self::default()
        }
    }

    /// Create a document with a title only
    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// Builder method: set the identifier
    pub fn with_id(mut self, id: u32) -> Self {
        self.id = Some(id);
        self
    }

    /// Builder method: set the content URL
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Builder method: set the language
    pub fn with_language(mut self, language: LanguageCode) -> Self {
        self.language = Some(language);
        self
    }

    /// Builder method: set the source score
    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    /// Builder method: add a source name
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.sources.push(source.into());
        self
    }

    /// Builder method: set an extra field
    pub fn with_field(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    /// Look up an extra field
    pub fn field(&self, name: &str) -> Option<&serde_json::Value> {
        self.fields.get(name)
    }

    /// Whether the document has any text to cluster on
    pub fn has_content(&self) -> bool {
        let non_blank = |s: &Option<String>| s.as_deref().is_some_and(|s| !s.trim().is_empty());
        non_blank(&self.title) || non_blank(&self.summary)
    }
}

/// Check id uniqueness and assign ids to documents that have none.
///
/// Missing ids are assigned in input order, starting right after the
/// largest id already present (or at 0). A duplicate id is an input error:
/// silently renumbering would make caller-side lookups ambiguous.
pub fn assign_document_ids(documents: &mut [Document]) -> Result<()> {
    let mut seen: FxHashMap<u32, usize> = FxHashMap::default();
    let mut next: u64 = 0;

    for (position, document) in documents.iter().enumerate() {
        if let Some(id) = document.id {
            if let Some(first) = seen.insert(id, position) {
                return Err(ClusteringError::invalid_input(format!(
                    "duplicate document id {} at positions {} and {}",
                    id, first, position
                )));
            }
            next = next.max(id as u64 + 1);
        }
    }

    for document in documents.iter_mut().filter(|d| d.id.is_none()) {
        let id = u32::try_from(next).map_err(|_| {
            ClusteringError::invalid_input("document id space exhausted while assigning ids")
        })?;
        document.id = Some(id);
        next += 1;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assign_ids_from_zero() {
        let mut docs = vec![Document::new("a", "b"), Document::new("c", "d")];
        assign_document_ids(&mut docs).unwrap();
        assert_eq!(docs[0].id, Some(0));
        assert_eq!(docs[1].id, Some(1));
    }

    #[test]
    fn test_assign_ids_after_max() {
        let mut docs = vec![
            Document::new("a", "b"),
            Document::new("c", "d").with_id(7),
            Document::new("e", "f"),
            Document::new("g", "h").with_id(3),
        ];
        assign_document_ids(&mut docs).unwrap();
        let ids: Vec<_> = docs.iter().map(|d| d.id.unwrap()).collect();
        assert_eq!(ids, vec![8, 7, 9, 3]);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut docs = vec![
            Document::new("a", "b").with_id(1),
            Document::new("c", "d").with_id(1),
        ];
        let err = assign_document_ids(&mut docs).unwrap_err();
        assert_eq!(err.code(), crate::errors::ErrorCode::InvalidInput);
        assert!(err.to_string().contains("duplicate document id 1"));
    }

    #[test]
    fn test_has_content() {
        assert!(Document::new("title", "").has_content());
        assert!(Document::new("", "summary").has_content());
        assert!(!Document::new("  ", "\n").has_content());
        assert!(!Document::default().has_content());
    }

    #[test]
    fn test_serde_field_names() {
        let doc = Document::new("Title", "Snippet text")
            .with_id(4)
            .with_language(LanguageCode::English)
            .with_field("rank", serde_json::json!(3));
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["snippet"], "Snippet text");
        assert_eq!(value["language"], "en");
        assert_eq!(value["fields"]["rank"], 3);
        assert!(value.get("url").is_none());

        let back: Document = serde_json::from_value(value).unwrap();
        assert_eq!(back, doc);
        assert_eq!(back.field("rank"), Some(&serde_json::json!(3)));
    }
}
