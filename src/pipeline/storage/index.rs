//! Embedding index over the labelled example corpus.

use std::path::Path;

use super::corpus::Corpus;
use super::types::{LabeledExample, Match, SharedEmbedder};
use super::vectordb::EmbeddingMatrix;
use super::{EmbeddingError, IndexError};

/// Retrieval bounds applied to every query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexParams {
    pub top_k: usize,
    /// A best match is confident when `score >= threshold`.
    pub threshold: f32,
}

/// Ranked matches for one query.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutcome {
    /// At most `min(top_k, corpus size)` matches, best first.
    pub matches: Vec<Match>,
    /// The top match when it clears the threshold.
    pub best: Option<Match>,
}

impl QueryOutcome {
    fn empty() -> Self {
        Self {
            matches: Vec::new(),
            best: None,
        }
    }
}

/// Corpus examples with one precomputed embedding each. Immutable after
/// `build`, so concurrent queries need no locking.
pub struct EmbeddingIndex {
    examples: Vec<LabeledExample>,
    matrix: EmbeddingMatrix,
    embedder: SharedEmbedder,
    params: IndexParams,
}

impl EmbeddingIndex {
    /// Embed every example in one batch call.
    pub fn build(
        examples: Vec<LabeledExample>,
        embedder: SharedEmbedder,
        params: IndexParams,
    ) -> Result<Self, EmbeddingError> {
        let texts: Vec<&str> = examples.iter().map(|e| e.text.as_str()).collect();
        let rows = if texts.is_empty() {
            Vec::new()
        } else {
            embedder.embed_batch(&texts)?
        };

        if rows.len() != examples.len() {
            return Err(EmbeddingError::BatchSizeMismatch {
                expected: examples.len(),
                actual: rows.len(),
            });
        }

        let matrix = EmbeddingMatrix::from_rows(rows, embedder.dimension())?;

        tracing::info!(
            examples = examples.len(),
            model = embedder.model_id(),
            dimension = matrix.dimension(),
            top_k = params.top_k,
            threshold = params.threshold,
            "Embedding index built"
        );

        Ok(Self {
            examples,
            matrix,
            embedder,
            params,
        })
    }

    /// Read the corpus file at `path` and build over it.
    pub fn load(path: &Path, embedder: SharedEmbedder, params: IndexParams) -> Result<Self, IndexError> {
        let examples = Corpus::load(path)?.into_examples();
        Ok(Self::build(examples, embedder, params)?)
    }

    /// Rank the corpus against `text`.
    ///
    /// An empty corpus yields no matches without embedding the query.
    pub fn query(&self, text: &str) -> Result<QueryOutcome, EmbeddingError> {
        if self.examples.is_empty() {
            return Ok(QueryOutcome::empty());
        }

        let query = self.embedder.embed(text)?;
        self.rank(&query)
    }

    /// `query` for several texts, embedded in one batch call. Outcomes are in
    /// input order.
    pub fn query_batch(&self, texts: &[&str]) -> Result<Vec<QueryOutcome>, EmbeddingError> {
        if self.examples.is_empty() || texts.is_empty() {
            return Ok(texts.iter().map(|_| QueryOutcome::empty()).collect());
        }

        let queries = self.embedder.embed_batch(texts)?;
        if queries.len() != texts.len() {
            return Err(EmbeddingError::BatchSizeMismatch {
                expected: texts.len(),
                actual: queries.len(),
            });
        }
        queries.iter().map(|q| self.rank(q)).collect()
    }

    fn rank(&self, query: &[f32]) -> Result<QueryOutcome, EmbeddingError> {
        let matches: Vec<Match> = self
            .matrix
            .search(query, self.params.top_k)?
            .into_iter()
            .map(|(row, score)| Match::from_example(&self.examples[row], score))
            .collect();

        let best = matches
            .first()
            .filter(|m| m.score >= self.params.threshold)
            .cloned();

        Ok(QueryOutcome { matches, best })
    }

    pub fn model_id(&self) -> &str {
        self.embedder.model_id()
    }

    pub fn threshold(&self) -> f32 {
        self.params.threshold
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================
