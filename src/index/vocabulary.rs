//! Run-scoped term vocabulary
//!
//! Each distinct normalized token gets a dense, 0-based code in first-seen
//! order. A vocabulary belongs to exactly one clustering run.

use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Dense integer code of a term within one run
pub type TermId = u32;

/// Interning table from normalized term strings to [`TermId`]s
#[derive(Debug, Default, Clone)]
pub struct Vocabulary {
    term_to_id: FxHashMap<Arc<str>, TermId>,
    id_to_term: Vec<Arc<str>>,
}

impl Vocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a vocabulary with pre-allocated capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            term_to_id: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            id_to_term: Vec::with_capacity(capacity),
        }
    }

    /// Return the code of `term`, assigning the next free one if it is new
    pub fn intern(&mut self, term: &str) -> TermId {
        if let Some(&id) = self.term_to_id.get(term) {
            return id;
        }

        let id = self.id_to_term.len() as TermId;
        let arc: Arc<str> = term.into();
        self.term_to_id.insert(arc.clone(), id);
        self.id_to_term.push(arc);
        id
    }

    /// Code of an already interned term
    pub fn id_of(&self, term: &str) -> Option<TermId> {
        self.term_to_id.get(term).copied()
    }

    /// Term string of a code
    pub fn get(&self, id: TermId) -> Option<&str> {
        self.id_to_term.get(id as usize).map(|s| s.as_ref())
    }

    pub fn len(&self) -> usize {
        self.id_to_term.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_to_term.is_empty()
    }
}
