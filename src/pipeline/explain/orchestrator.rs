use std::sync::Arc;

use super::fusion::fuse;
use super::types::{ExplainResult, TopMatch};
use super::PipelineError;
use crate::pipeline::lexicon::LexiconStore;
use crate::pipeline::normalize::{NormalizationResult, RuleExtractor};
use crate::pipeline::storage::{EmbeddingIndex, IndexParams, ModelCache, QueryOutcome};
use crate::pipeline_config::PipelineConfig;

/// Rule extraction, nearest-example retrieval and fusion over one corpus.
///
/// Coordinates: normalize → query canonical text → fuse → explain.
/// Immutable after construction; `run` takes `&self`.
pub struct ExplainablePipeline {
    extractor: RuleExtractor,
    index: EmbeddingIndex,
}

impl ExplainablePipeline {
    /// Load lexicons and corpus, and embed the corpus with the cached model.
    ///
    /// Every load failure is fatal here; nothing is retried.
    pub fn new(config: &PipelineConfig, models: &ModelCache) -> Result<Self, PipelineError> {
        config.validate().map_err(PipelineError::Config)?;

        let lexicons = LexiconStore::load(&config.lexicon_dir)?;
        let embedder = models.load(&config.embedding)?;
        let index = EmbeddingIndex::load(
            &config.examples_path,
            embedder,
            IndexParams {
                top_k: config.top_k,
                threshold: config.threshold,
            },
        )?;

        tracing::info!(
            lexicon_dir = %config.lexicon_dir.display(),
            examples = index.len(),
            model = index.model_id(),
            "Pipeline ready"
        );

        Ok(Self::from_parts(RuleExtractor::new(Arc::new(lexicons)), index))
    }

    pub fn from_parts(extractor: RuleExtractor, index: EmbeddingIndex) -> Self {
        Self { extractor, index }
    }

    /// Explain one input. Fails only when the query cannot be embedded.
    pub fn run(&self, text: &str) -> Result<ExplainResult, PipelineError> {
        // Step 1: Rule extraction
        let normalized = self.extractor.normalize(text);

        // Step 2: Nearest examples for the canonical sentence
        let outcome = self.index.query(&normalized.canonical_text)?;

        Ok(self.explain(normalized, outcome))
    }

    /// `run` over several inputs with one batch embedding call. Results are in
    /// input order; any embedding failure fails the whole batch.
    pub fn run_batch(&self, texts: &[&str]) -> Result<Vec<ExplainResult>, PipelineError> {
        let normalized: Vec<NormalizationResult> =
            texts.iter().map(|t| self.extractor.normalize(t)).collect();
        let canonical: Vec<&str> = normalized.iter().map(|n| n.canonical_text.as_str()).collect();
        let outcomes = self.index.query_batch(&canonical)?;

        tracing::debug!(inputs = texts.len(), "Batch explained");

        Ok(normalized
            .into_iter()
            .zip(outcomes)
            .map(|(n, o)| self.explain(n, o))
            .collect())
    }

    // Step 3: Fusion, keeping every intermediate artifact
    fn explain(&self, normalized: NormalizationResult, outcome: QueryOutcome) -> ExplainResult {
        let threshold = self.index.threshold();
        let decision = fuse(&normalized.features, outcome.best.as_ref(), threshold);

        tracing::debug!(
            matches = outcome.matches.len(),
            best_score = outcome.matches.first().map(|m| m.score),
            accepted = decision.accepted,
            "Decision fused"
        );

        ExplainResult {
            input: normalized.input_text,
            tokens: normalized.tokens,
            rule_matches: normalized.rule_matches,
            features: normalized.features,
            canonical: normalized.canonical_text,
            embedding_model: self.index.model_id().to_string(),
            top_matches: outcome.matches.iter().map(TopMatch::from).collect(),
            decision,
        }
    }

    pub fn embedding_model(&self) -> &str {
        self.index.model_id()
    }
}

// =============================================================================
// Tests
// =============================================================================
