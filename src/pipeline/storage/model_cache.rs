use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::embedder;
use super::types::SharedEmbedder;
use super::EmbeddingError;
use crate::pipeline_config::EmbeddingConfig;

/// Process-lifetime cache of embedding models, one instance per identifier.
///
/// Construction runs under the cache lock, so concurrent first requests for
/// the same identifier build the model exactly once. Handed-out models are
/// `Send + Sync` and shared by every caller.
pub struct ModelCache {
    models: Mutex<HashMap<String, SharedEmbedder>>,
}

impl ModelCache {
    pub fn new() -> Self {
        Self {
            models: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached model for `config`, building it on first use.
    pub fn load(&self, config: &EmbeddingConfig) -> Result<SharedEmbedder, EmbeddingError> {
        let key = embedder::cache_key(config);
        self.get_or_try_init(&key, || embedder::load_backend(config))
    }

    /// Return the model cached under `model_id`, or build it with `init`.
    ///
    /// A failed `init` caches nothing; the next call retries.
    pub fn get_or_try_init<F>(&self, model_id: &str, init: F) -> Result<SharedEmbedder, EmbeddingError>
    where
        F: FnOnce() -> Result<SharedEmbedder, EmbeddingError>,
    {
        let mut models = self.models.lock().map_err(|_| EmbeddingError::LockPoisoned)?;

        if let Some(model) = models.get(model_id) {
            return Ok(Arc::clone(model));
        }

        tracing::info!(model_id, "Loading embedding model");
        let model = init()?;
        models.insert(model_id.to_string(), Arc::clone(&model));
        Ok(model)
    }

    pub fn contains(&self, model_id: &str) -> bool {
        self.models
            .lock()
            .map(|models| models.contains_key(model_id))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.models.lock().map(|models| models.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ModelCache {
    fn default() -> Self {
        Self::new()
    }
}
