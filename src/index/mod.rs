//! Run-scoped vocabulary and term statistics

pub mod term_index;
pub mod vocabulary;

pub use term_index::{idf_weight, IndexedDocument, TermIndex, TermStats};
pub use vocabulary::{TermId, Vocabulary};
