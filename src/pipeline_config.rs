//! Pipeline configuration.
//!
//! Locates the lexicon tables and example corpus, fixes the retrieval bounds
//! (`top_k`, acceptance `threshold`) and selects the embedding back-end.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;

use crate::config;

/// Default number of corpus matches reported per query.
pub const DEFAULT_TOP_K: usize = 3;
/// Default similarity a best match must reach to be accepted (inclusive).
pub const DEFAULT_THRESHOLD: f32 = 0.55;
/// Sentence-transformer used by the ONNX back-end unless overridden.
pub const DEFAULT_MODEL_ID: &str = "paraphrase-multilingual-mpnet-base-v2";
/// Output width of the default sentence-transformer.
pub const DEFAULT_MODEL_DIM: usize = 768;
/// Token limit of the default sentence-transformer; longer input is truncated.
pub const DEFAULT_MAX_SEQ_LENGTH: usize = 128;

// ═══════════════════════════════════════════════════════════
// Types
// ═══════════════════════════════════════════════════════════

/// Which embedding implementation backs the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingBackend {
    /// Character n-gram feature hashing. No model files, fully offline.
    HashedNgram,
    /// Sentence-transformer exported to ONNX (`onnx-embeddings` feature).
    Onnx,
}

impl EmbeddingBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HashedNgram => "hashed_ngram",
            Self::Onnx => "onnx",
        }
    }
}

impl Default for EmbeddingBackend {
    fn default() -> Self {
        if cfg!(feature = "onnx-embeddings") {
            Self::Onnx
        } else {
            Self::HashedNgram
        }
    }
}

impl fmt::Display for EmbeddingBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmbeddingBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hashed_ngram" | "hashed-ngram" | "hashed" => Ok(Self::HashedNgram),
            "onnx" => Ok(Self::Onnx),
            other => Err(format!(
                "unknown embedding backend '{other}' (expected 'hashed_ngram' or 'onnx')"
            )),
        }
    }
}

/// Embedding model selection.
#[derive(Debug, Clone, Serialize)]
pub struct EmbeddingConfig {
    pub backend: EmbeddingBackend,
    /// Model identifier reported in every result (`embedding_model`).
    /// Ignored by the hashed back-end, which names itself.
    pub model_id: String,
    /// Directory with `model.onnx` and `tokenizer.json` (ONNX back-end only).
    pub model_dir: PathBuf,
    /// Output dimension of the model.
    pub dimension: usize,
    /// BERT-style exports take `token_type_ids`; XLM-R/MPNet exports do not.
    pub token_type_ids: bool,
    /// Tokens kept per input before pooling, special tokens included.
    pub max_seq_length: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            backend: EmbeddingBackend::default(),
            model_id: DEFAULT_MODEL_ID.to_string(),
            model_dir: config::models_dir().join(DEFAULT_MODEL_ID),
            dimension: DEFAULT_MODEL_DIM,
            token_type_ids: false,
            max_seq_length: DEFAULT_MAX_SEQ_LENGTH,
        }
    }
}

/// Everything the pipeline needs at construction time.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineConfig {
    /// Directory containing the five lexicon tables.
    pub lexicon_dir: PathBuf,
    /// Labelled example corpus (`{"items": [...]}`).
    pub examples_path: PathBuf,
    /// Number of ranked matches reported per query.
    pub top_k: usize,
    /// Minimum score (inclusive) for a confident best match.
    pub threshold: f32,
    pub embedding: EmbeddingConfig,
}

// ═══════════════════════════════════════════════════════════
// Construction
// ═══════════════════════════════════════════════════════════

impl PipelineConfig {
    /// Standard layout: `<data_dir>/lexicons/` and `<data_dir>/examples.json`.
    pub fn from_data_dir(data_dir: &Path) -> Self {
        Self {
            lexicon_dir: data_dir.join(config::LEXICON_SUBDIR),
            examples_path: data_dir.join(config::EXAMPLES_FILE),
            top_k: DEFAULT_TOP_K,
            threshold: DEFAULT_THRESHOLD,
            embedding: EmbeddingConfig::default(),
        }
    }

    /// Reject settings that would make every decision meaningless.
    pub fn validate(&self) -> Result<(), String> {
        if !self.threshold.is_finite() {
            return Err(format!("threshold must be finite, got {}", self.threshold));
        }
        if self.embedding.dimension == 0 {
            return Err("embedding dimension must be positive".to_string());
        }
        if self.embedding.max_seq_length == 0 {
            return Err("embedding max_seq_length must be positive".to_string());
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::from_data_dir(&config::data_dir())
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
