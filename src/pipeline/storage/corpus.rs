//! Labelled example corpus (`{"items": [...]}`).

use std::path::Path;

use serde::Deserialize;

use super::types::LabeledExample;
use crate::pipeline::source::{read_json, SourceError};

/// Intent of an example that declares none.
pub const DEFAULT_INTENT: &str = "symptom_query";
/// Symptom of an example that declares none.
pub const DEFAULT_SYMPTOM: &str = "unknown";

/// Corpus file as written on disk.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Corpus {
    #[serde(default)]
    pub items: Vec<CorpusItem>,
}

/// One raw corpus entry. Only `text` is required.
#[derive(Debug, Clone, Deserialize)]
pub struct CorpusItem {
    /// String or number; defaults to the item's position.
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    pub text: String,
    #[serde(default)]
    pub intent: Option<String>,
    #[serde(default)]
    pub symptom: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl Corpus {
    pub fn load(path: &Path) -> Result<Self, SourceError> {
        read_json(path)
    }

    /// Apply defaults, keeping corpus order.
    pub fn into_examples(self) -> Vec<LabeledExample> {
        self.items
            .into_iter()
            .enumerate()
            .map(|(position, item)| {
                if item.text.trim().is_empty() {
                    tracing::warn!(position, "Corpus item has empty text");
                }
                LabeledExample {
                    id: item_id(item.id.as_ref(), position),
                    text: item.text,
                    intent: item.intent.unwrap_or_else(|| DEFAULT_INTENT.to_string()),
                    symptom: item.symptom.unwrap_or_else(|| DEFAULT_SYMPTOM.to_string()),
                    category: item.category,
                }
            })
            .collect()
    }
}

fn item_id(id: Option<&serde_json::Value>, position: usize) -> String {
    match id {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Null) | None => position.to_string(),
        Some(other) => other.to_string(),
    }
}
