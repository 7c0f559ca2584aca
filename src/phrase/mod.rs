//! Suffix array construction and repeated phrase discovery

pub mod dedup;
pub mod extraction;
pub mod suffix_array;

pub use dedup::dedup_by_documents;
pub use extraction::{PhraseCandidate, PhraseExtractor};
pub use suffix_array::{Symbol, SuffixArray};
