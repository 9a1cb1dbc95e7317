//! This crate is a job listing recommender built on a TF-IDF Vectorizer.

pub mod catalog;
pub mod config;
pub mod error;
pub mod recommend;
pub mod resource;
pub mod utils;
pub mod vectorizer;
pub mod view;

/// TF-IDF Vectorizer
/// The core struct of this crate. It maps free text into a fixed, fitted
/// column space of weighted terms.
///
/// It holds:
/// - The analyzer used for both documents and queries
/// - The fitted vocabulary (term -> column) with one IDF weight per column
/// - The options used at fit time
/// - A stamp of the texts it was fitted on
///
/// `TFIDFVectorizer<N, E>` has the following generic parameters:
/// - `N`: Vector value type (f32 or f64)
/// - `E`: TF-IDF calculation engine type (e.g., DefaultTFIDFEngine)
///
/// # Serialization
/// Through `TFIDFData`.
pub use vectorizer::TFIDFVectorizer;

/// TF-IDF Vectorizer Data Structure for Serialization
/// The stored model artifact. Holds no training text; only the analyzer,
/// options, ordered vocabulary, IDF weights and a corpus stamp.
///
/// Encoded as CBOR and versioned; `into_tf_idf_vectorizer` rejects
/// versions it does not know.
pub use vectorizer::serde::TFIDFData;

/// Corpus for TF-IDF Vectorizer
/// Document-frequency statistics collected while fitting.
/// It does not store document text; it only manages:
/// - The number of documents
/// - For each term, the number of documents it appears in and its total occurrences
///
/// Partial corpora built on different threads can be merged.
pub use vectorizer::corpus::Corpus;

/// Term Frequency structure
/// Occurrence counts of each term within one text, plus the total.
/// Used as base data for TF (Term Frequency) calculation.
pub use vectorizer::term::TermFrequency;

/// TF IDF Calculation Engine Trait
/// Defines vocabulary selection, IDF and TF-IDF weighting.
///
/// By implementing this trait, you can plug different TF-IDF calculation strategies
/// into `TFIDFVectorizer<N, E>`.
/// `DefaultTFIDFEngine` performs smoothed textbook TF-IDF with optional
/// sublinear TF and L2 row normalization.
pub use vectorizer::tfidf::{DefaultTFIDFEngine, TFIDFEngine, TFIDFOptions};

/// Similarity Ranker
/// Ranks the rows of a `DocumentTermMatrix` by cosine similarity to a query
/// vector and returns the top K.
pub use vectorizer::evaluate::scoring::{SimilarityRanker, DEFAULT_TOP_K};

/// Search Hits and Hit Entry structures
/// - `Hits`: ranked results, best first
/// - `HitEntry`: a matrix row and its score
pub use vectorizer::evaluate::scoring::{HitEntry, Hits};

pub use vectorizer::{analyzer::Analyzer, matrix::DocumentTermMatrix, vocabulary::Vocabulary};

pub use catalog::{Catalog, JobPosting};
pub use config::Config;
pub use error::{Error, Result};
pub use recommend::{Recommendation, Recommender};
pub use resource::Resources;
pub use utils::math::vector::SparseVec;
pub use view::ViewState;
