use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::EmbeddingError;

/// Sentence embedding function: text in, fixed-length unit-norm vector out.
///
/// Implementations must be deterministic for a fixed model and input, and
/// `embed_batch` must preserve input order. `Send + Sync` so one instance can
/// be shared by every caller; back-ends that need exclusive access to their
/// runtime serialize internally.
pub trait EmbeddingModel: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError>;
    fn dimension(&self) -> usize;
    /// Identifier reported as `embedding_model` in every result.
    fn model_id(&self) -> &str;
}

/// Shared handle handed out by the model cache.
pub type SharedEmbedder = Arc<dyn EmbeddingModel>;

/// One corpus example, with defaults applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledExample {
    pub id: String,
    pub text: String,
    pub intent: String,
    pub symptom: String,
    /// Grouping label; carried along, never used for scoring.
    pub category: Option<String>,
}

/// A corpus example and its similarity to a query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Match {
    pub id: String,
    pub text: String,
    pub intent: String,
    pub symptom: String,
    /// Dot product of unit vectors, in [-1, 1].
    pub score: f32,
}

impl Match {
    pub fn from_example(example: &LabeledExample, score: f32) -> Self {
        Self {
            id: example.id.clone(),
            text: example.text.clone(),
            intent: example.intent.clone(),
            symptom: example.symptom.clone(),
            score,
        }
    }
}
