use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while loading data, fitting or querying.
#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed job catalog: {0}")]
    Csv(#[from] csv::Error),

    #[error("job catalog is missing required column `{0}`")]
    MissingColumn(String),

    #[error("malformed model artifact: {0}")]
    Artifact(#[from] serde_cbor::Error),

    #[error("model artifact version {found} is not supported (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("search query is empty")]
    EmptyQuery,

    #[error("dimension mismatch: expected {expected} columns, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("document matrix was built with vocabulary {matrix:08x}, vectorizer has {vectorizer:08x}")]
    VocabularyMismatch { matrix: u32, vectorizer: u32 },

    #[error("invalid tf-idf options: {0}")]
    InvalidOptions(String),
}

pub type Result<T> = std::result::Result<T, Error>;
