//! Text analysis: tokenization, stemming and stopwords.

pub mod analyzer;
pub mod stemmer;
pub mod stopwords;
pub mod tokenizer;

pub use analyzer::{AnalyzedDocument, Analyzer};
pub use stemmer::{IdentityStemmer, SnowballStemmer, Stem, StemmerRegistry};
pub use stopwords::{guess_language, StopwordFilter};
pub use tokenizer::Tokenizer;
