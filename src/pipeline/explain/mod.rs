pub mod types;
pub mod fusion;
pub mod orchestrator;

pub use fusion::fuse;
pub use orchestrator::ExplainablePipeline;
pub use types::{Decision, ExplainResult, TopMatch};

use thiserror::Error;

use super::lexicon::LexiconError;
use super::storage::{EmbeddingError, IndexError};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Invalid pipeline configuration: {0}")]
    Config(String),

    #[error("Lexicon error: {0}")]
    Lexicon(#[from] LexiconError),

    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Result serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}
