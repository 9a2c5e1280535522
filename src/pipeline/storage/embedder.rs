use std::sync::Arc;

use sha2::{Digest, Sha256};

use super::types::{EmbeddingModel, SharedEmbedder};
use super::vectordb::l2_normalize;
use super::EmbeddingError;
use crate::pipeline_config::{EmbeddingBackend, EmbeddingConfig};

/// Output dimension of the hashed n-gram embedder.
pub const HASHED_DIM: usize = 384;
/// Longest character n-gram hashed into the vector.
const MAX_NGRAM: usize = 3;

// ═══════════════════════════════════════════════════════════
// ONNX Embedder (behind `onnx-embeddings` feature)
// ═══════════════════════════════════════════════════════════

#[cfg(feature = "onnx-embeddings")]
mod onnx {
    use super::{EmbeddingConfig, EmbeddingError, EmbeddingModel};
    use crate::pipeline::storage::vectordb::l2_normalize;
    use ort::session::Session;
    use std::sync::Mutex;

    /// Sentence-transformer inference through ONNX Runtime.
    ///
    /// Requires two files in the model directory:
    /// - `model.onnx`: the exported transformer
    /// - `tokenizer.json`: HuggingFace tokenizer definition
    ///
    /// `ort::Session::run` needs `&mut self`, so the session sits behind a
    /// Mutex and concurrent callers are serialized.
    pub struct OnnxEmbedder {
        session: Mutex<Session>,
        tokenizer: tokenizers::Tokenizer,
        model_id: String,
        dimension: usize,
        token_type_ids: bool,
    }

    impl OnnxEmbedder {
        /// Load the model described by `config.model_dir`.
        pub fn load(config: &EmbeddingConfig) -> Result<Self, EmbeddingError> {
            let model_path = config.model_dir.join("model.onnx");
            let tokenizer_path = config.model_dir.join("tokenizer.json");

            if !model_path.exists() {
                return Err(EmbeddingError::ModelNotFound(model_path));
            }
            if !tokenizer_path.exists() {
                return Err(EmbeddingError::ModelNotFound(tokenizer_path));
            }

            let session = Session::builder()
                .map_err(|e: ort::Error| EmbeddingError::ModelInit(e.to_string()))?
                .with_intra_threads(2)
                .map_err(|e: ort::Error| EmbeddingError::ModelInit(e.to_string()))?
                .commit_from_file(&model_path)
                .map_err(|e: ort::Error| EmbeddingError::ModelInit(format!("ONNX load failed: {e}")))?;

            let mut tokenizer = tokenizers::Tokenizer::from_file(&tokenizer_path)
                .map_err(|e| EmbeddingError::ModelInit(format!("Tokenizer load failed: {e}")))?;
            limit_sequence_length(&mut tokenizer, config.max_seq_length)?;

            tracing::info!(
                model_id = %config.model_id,
                dir = %config.model_dir.display(),
                max_seq_length = config.max_seq_length,
                "ONNX embedder loaded"
            );

            Ok(Self {
                session: Mutex::new(session),
                tokenizer,
                model_id: config.model_id.clone(),
                dimension: config.dimension,
                token_type_ids: config.token_type_ids,
            })
        }

        /// Tokenize, run the transformer, mean-pool over the attention mask, L2 normalize.
        fn infer(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
            use ort::value::TensorRef;

            let encoding = self
                .tokenizer
                .encode(text, true)
                .map_err(|e| EmbeddingError::Tokenization(e.to_string()))?;

            let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
            let attention_mask: Vec<i64> = encoding
                .get_attention_mask()
                .iter()
                .map(|&m| m as i64)
                .collect();
            let token_type_ids: Vec<i64> = encoding
                .get_type_ids()
                .iter()
                .map(|&t| t as i64)
                .collect();

            let seq_len = input_ids.len();

            let ids_array = ndarray::Array2::from_shape_vec((1, seq_len), input_ids)
                .map_err(|e| EmbeddingError::Embedding(e.to_string()))?;
            let mask_array = ndarray::Array2::from_shape_vec((1, seq_len), attention_mask.clone())
                .map_err(|e| EmbeddingError::Embedding(e.to_string()))?;
            let type_array = ndarray::Array2::from_shape_vec((1, seq_len), token_type_ids)
                .map_err(|e| EmbeddingError::Embedding(e.to_string()))?;

            let ids_tensor = TensorRef::from_array_view(&ids_array)
                .map_err(|e| EmbeddingError::Embedding(e.to_string()))?;
            let mask_tensor = TensorRef::from_array_view(&mask_array)
                .map_err(|e| EmbeddingError::Embedding(e.to_string()))?;

            let mut session = self
                .session
                .lock()
                .map_err(|_| EmbeddingError::Embedding("Session lock poisoned".to_string()))?;

            let outputs = if self.token_type_ids {
                let type_tensor = TensorRef::from_array_view(&type_array)
                    .map_err(|e| EmbeddingError::Embedding(e.to_string()))?;
                session.run(ort::inputs![ids_tensor, mask_tensor, type_tensor])
            } else {
                session.run(ort::inputs![ids_tensor, mask_tensor])
            }
            .map_err(|e| EmbeddingError::Embedding(format!("ONNX inference failed: {e}")))?;

            // Output shape: [1, seq_len, dim]
            let (shape, output_data) = outputs[0]
                .try_extract_tensor::<f32>()
                .map_err(|e| EmbeddingError::Embedding(format!("Output extraction: {e}")))?;

            if shape.len() != 3 || shape[2] as usize != self.dimension {
                return Err(EmbeddingError::Embedding(format!(
                    "Unexpected output shape: {shape:?}, expected [1, {seq_len}, {}]",
                    self.dimension
                )));
            }

            let mut pooled = vec![0.0f32; self.dimension];
            let mut mask_sum = 0.0f32;

            for (token_idx, &mask_val_i64) in attention_mask.iter().enumerate().take(seq_len) {
                let mask_val = mask_val_i64 as f32;
                mask_sum += mask_val;
                let offset = token_idx * self.dimension;
                for (dim_idx, p) in pooled.iter_mut().enumerate() {
                    *p += output_data[offset + dim_idx] * mask_val;
                }
            }

            if mask_sum > 0.0 {
                for val in &mut pooled {
                    *val /= mask_sum;
                }
            }

            l2_normalize(&mut pooled);
            Ok(pooled)
        }
    }

    /// Truncate encodings to `max_length` tokens, as sentence-transformers do
    /// before pooling. Longer input would also overrun the position table.
    pub(super) fn limit_sequence_length(
        tokenizer: &mut tokenizers::Tokenizer,
        max_length: usize,
    ) -> Result<(), EmbeddingError> {
        tokenizer
            .with_truncation(Some(tokenizers::TruncationParams {
                max_length,
                ..Default::default()
            }))
            .map_err(|e| EmbeddingError::ModelInit(format!("Tokenizer truncation: {e}")))?;
        Ok(())
    }

    impl EmbeddingModel for OnnxEmbedder {
        fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
            self.infer(text)
        }

        fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            texts.iter().map(|t| self.infer(t)).collect()
        }

        fn dimension(&self) -> usize {
            self.dimension
        }

        fn model_id(&self) -> &str {
            &self.model_id
        }
    }
}

#[cfg(feature = "onnx-embeddings")]
pub use onnx::OnnxEmbedder;

// ═══════════════════════════════════════════════════════════
// Hashed character n-gram embedder
// ═══════════════════════════════════════════════════════════

/// Offline embedder: signed feature hashing of character 1..=3-grams.
///
/// Deterministic across platforms (SHA-256 bucket selection). Texts sharing
/// many n-grams score high; identical texts score 1. Blank text maps to the
/// zero vector, which scores 0 against everything.
pub struct HashedNgramEmbedder {
    dimension: usize,
    model_id: String,
}

impl HashedNgramEmbedder {
    pub fn new() -> Self {
        Self::with_dimension(HASHED_DIM)
    }

    pub fn with_dimension(dimension: usize) -> Self {
        Self {
            dimension,
            model_id: hashed_model_id(dimension),
        }
    }
}

impl Default for HashedNgramEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

impl EmbeddingModel for HashedNgramEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Ok(hashed_vector(text, self.dimension))
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts
            .iter()
            .map(|t| hashed_vector(t, self.dimension))
            .collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

pub fn hashed_model_id(dimension: usize) -> String {
    format!("hashed-char-ngram-{dimension}")
}

fn hashed_vector(text: &str, dim: usize) -> Vec<f32> {
    let mut vec = vec![0.0f32; dim];
    let words: Vec<&str> = text.split_whitespace().collect();
    if dim == 0 || words.is_empty() {
        return vec;
    }

    // Pad with spaces so word starts and ends form their own n-grams.
    let padded: Vec<char> = format!(" {} ", words.join(" ")).chars().collect();

    for n in 1..=MAX_NGRAM {
        // Unigrams are noisy in a syllabary; bigrams and trigrams carry more.
        let weight = if n == 1 { 0.5 } else { 1.0 };
        for window in padded.windows(n) {
            if n == 1 && window[0] == ' ' {
                continue;
            }
            let gram: String = window.iter().collect();
            let (bucket, sign) = hash_gram(&gram, dim);
            vec[bucket] += sign * weight;
        }
    }

    l2_normalize(&mut vec);
    vec
}

/// Bucket and sign for an n-gram.
fn hash_gram(gram: &str, dim: usize) -> (usize, f32) {
    let digest = Sha256::digest(gram.as_bytes());
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    let bucket = (u64::from_le_bytes(head) % dim as u64) as usize;
    let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
    (bucket, sign)
}

// ═══════════════════════════════════════════════════════════
// Backend selection
// ═══════════════════════════════════════════════════════════

/// Key the model cache stores a backend under. ONNX keys cover every
/// setting `OnnxEmbedder::load` reads, so differing configs never share a model.
pub fn cache_key(config: &EmbeddingConfig) -> String {
    match config.backend {
        EmbeddingBackend::HashedNgram => hashed_model_id(HASHED_DIM),
        EmbeddingBackend::Onnx => format!(
            "{}@{}:dim={}:type_ids={}:max_len={}",
            config.model_id,
            config.model_dir.display(),
            config.dimension,
            config.token_type_ids,
            config.max_seq_length
        ),
    }
}

/// Construct the configured backend. Expensive for ONNX; go through `ModelCache`.
pub fn load_backend(config: &EmbeddingConfig) -> Result<SharedEmbedder, EmbeddingError> {
    match config.backend {
        EmbeddingBackend::HashedNgram => Ok(Arc::new(HashedNgramEmbedder::new())),
        #[cfg(feature = "onnx-embeddings")]
        EmbeddingBackend::Onnx => Ok(Arc::new(OnnxEmbedder::load(config)?)),
        #[cfg(not(feature = "onnx-embeddings"))]
        EmbeddingBackend::Onnx => Err(EmbeddingError::BackendUnavailable(
            EmbeddingBackend::Onnx.to_string(),
        )),
    }
}
