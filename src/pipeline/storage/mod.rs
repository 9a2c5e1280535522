pub mod types;
pub mod embedder;
pub mod model_cache;
pub mod vectordb;
pub mod corpus;
pub mod index;

pub use index::{EmbeddingIndex, IndexParams, QueryOutcome};
pub use model_cache::ModelCache;
pub use types::{EmbeddingModel, LabeledExample, Match, SharedEmbedder};

use std::path::PathBuf;

use thiserror::Error;

use super::source::SourceError;

#[derive(Error, Debug)]
pub enum EmbeddingError {
    #[error("Embedding model not found: {}", .0.display())]
    ModelNotFound(PathBuf),

    #[error("Embedding model initialization: {0}")]
    ModelInit(String),

    #[error("Embedding backend '{0}' is not compiled into this build")]
    BackendUnavailable(String),

    #[error("Tokenization error: {0}")]
    Tokenization(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Embedding batch returned {actual} vectors for {expected} texts")]
    BatchSizeMismatch { expected: usize, actual: usize },

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Model cache lock poisoned")]
    LockPoisoned,
}

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("Example corpus error: {0}")]
    Corpus(#[from] SourceError),

    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),
}
