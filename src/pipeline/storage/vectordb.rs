use super::EmbeddingError;

/// In-memory matrix of unit-norm row vectors, one per corpus example.
///
/// Rows are trusted to be unit norm (the embedding contract), so the dot
/// product is the cosine similarity.
#[derive(Debug, Clone, Default)]
pub struct EmbeddingMatrix {
    rows: Vec<Vec<f32>>,
    dimension: usize,
}

impl EmbeddingMatrix {
    /// Build from embedding rows, checking every row has `dimension` entries.
    pub fn from_rows(rows: Vec<Vec<f32>>, dimension: usize) -> Result<Self, EmbeddingError> {
        if let Some(bad) = rows.iter().find(|r| r.len() != dimension) {
            return Err(EmbeddingError::DimensionMismatch {
                expected: dimension,
                actual: bad.len(),
            });
        }
        Ok(Self { rows, dimension })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Score of every row against `query`, in row order.
    pub fn scores(&self, query: &[f32]) -> Result<Vec<f32>, EmbeddingError> {
        if query.len() != self.dimension {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }
        Ok(self.rows.iter().map(|row| dot(row, query)).collect())
    }

    /// `(row, score)` for the best `top_k` rows, highest score first.
    ///
    /// The sort is stable: equal scores keep row order.
    pub fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<(usize, f32)>, EmbeddingError> {
        let mut scored: Vec<(usize, f32)> = self.scores(query)?.into_iter().enumerate().collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(top_k.min(self.rows.len()));
        Ok(scored)
    }
}

pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Scale `vec` to unit length. The zero vector is left unchanged.
pub fn l2_normalize(vec: &mut [f32]) {
    let norm: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for val in vec.iter_mut() {
            *val /= norm;
        }
    }
}
