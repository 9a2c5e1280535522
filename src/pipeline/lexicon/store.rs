use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::types::{EmergencyValue, LexiconTable, ModifierValue, PhraseEntry, PhraseTable, SymptomGroup};
use super::LexiconError;
use crate::pipeline::source::read_json;

/// The five tables as parsed JSON, before validation.
#[derive(Debug, Clone)]
pub struct RawLexicons {
    pub body_parts: Value,
    pub temporal_markers: Value,
    pub emergency_phrases: Value,
    pub modifiers: Value,
    pub symptom_keywords: Value,
}

impl RawLexicons {
    /// Read `<dir>/<table>.json` for every table. Any missing file is fatal.
    pub fn read_dir(dir: &Path) -> Result<Self, LexiconError> {
        let read = |table: LexiconTable| -> Result<Value, LexiconError> {
            Ok(read_json(&dir.join(table.file_name()))?)
        };

        Ok(Self {
            body_parts: read(LexiconTable::BodyParts)?,
            temporal_markers: read(LexiconTable::TemporalMarkers)?,
            emergency_phrases: read(LexiconTable::EmergencyPhrases)?,
            modifiers: read(LexiconTable::Modifiers)?,
            symptom_keywords: read(LexiconTable::SymptomKeywords)?,
        })
    }
}

impl Default for RawLexicons {
    /// Five empty tables.
    fn default() -> Self {
        Self {
            body_parts: Value::Object(Map::new()),
            temporal_markers: Value::Object(Map::new()),
            emergency_phrases: Value::Object(Map::new()),
            modifiers: Value::Object(Map::new()),
            symptom_keywords: Value::Object(Map::new()),
        }
    }
}

/// Read-only lexicon tables used by the rule extractor.
///
/// Built once; nothing mutates it afterwards, so it is shared behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct LexiconStore {
    body_parts: PhraseTable<String>,
    temporal_markers: PhraseTable<String>,
    emergency_phrases: PhraseTable<EmergencyValue>,
    modifiers: PhraseTable<ModifierValue>,
    /// `(symptom key, group)` in file order. The order is the keyword priority.
    symptom_groups: Vec<(String, SymptomGroup)>,
}

impl LexiconStore {
    /// Load and validate all tables from a lexicon directory.
    pub fn load(dir: &Path) -> Result<Self, LexiconError> {
        let store = Self::from_raw(RawLexicons::read_dir(dir)?)?;

        tracing::info!(
            dir = %dir.display(),
            body_parts = store.body_parts.len(),
            temporal_markers = store.temporal_markers.len(),
            emergency_phrases = store.emergency_phrases.len(),
            modifiers = store.modifiers.len(),
            symptom_groups = store.symptom_groups.len(),
            "Lexicons loaded"
        );

        Ok(store)
    }

    /// Validate parsed tables. Every table must be a JSON object; empty is fine.
    pub fn from_raw(raw: RawLexicons) -> Result<Self, LexiconError> {
        let symptom_groups = table_entries(LexiconTable::SymptomKeywords, raw.symptom_keywords)?
            .into_iter()
            .map(|entry| (entry.phrase, entry.value))
            .collect();

        Ok(Self {
            body_parts: phrase_table(LexiconTable::BodyParts, raw.body_parts)?,
            temporal_markers: phrase_table(LexiconTable::TemporalMarkers, raw.temporal_markers)?,
            emergency_phrases: phrase_table(LexiconTable::EmergencyPhrases, raw.emergency_phrases)?,
            modifiers: phrase_table(LexiconTable::Modifiers, raw.modifiers)?,
            symptom_groups,
        })
    }

    pub fn body_parts(&self) -> &PhraseTable<String> {
        &self.body_parts
    }

    pub fn temporal_markers(&self) -> &PhraseTable<String> {
        &self.temporal_markers
    }

    pub fn emergency_phrases(&self) -> &PhraseTable<EmergencyValue> {
        &self.emergency_phrases
    }

    pub fn modifiers(&self) -> &PhraseTable<ModifierValue> {
        &self.modifiers
    }

    pub fn symptom_groups(&self) -> &[(String, SymptomGroup)] {
        &self.symptom_groups
    }
}

fn phrase_table<V: DeserializeOwned>(
    table: LexiconTable,
    value: Value,
) -> Result<PhraseTable<V>, LexiconError> {
    Ok(PhraseTable::from_entries(table_entries(table, value)?))
}

/// Decode one table in file order, keeping each value as written.
fn table_entries<V: DeserializeOwned>(
    table: LexiconTable,
    value: Value,
) -> Result<Vec<PhraseEntry<V>>, LexiconError> {
    let map = match value {
        Value::Object(map) => map,
        other => {
            return Err(LexiconError::Invalid {
                table,
                reason: format!("expected a JSON object, found {}", json_kind(&other)),
            })
        }
    };

    let mut entries = Vec::with_capacity(map.len());
    for (key, raw) in map {
        match serde_json::from_value::<V>(raw.clone()) {
            Ok(value) => entries.push(PhraseEntry {
                phrase: key,
                value,
                raw,
            }),
            Err(e) => {
                return Err(LexiconError::Invalid {
                    table,
                    reason: format!("entry '{key}': {e}"),
                })
            }
        }
    }
    Ok(entries)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::pipeline::source::SourceError;

    fn write_table(dir: &Path, table: LexiconTable, value: &Value) {
        std::fs::write(dir.join(table.file_name()), value.to_string()).unwrap();
    }

    fn write_all(dir: &Path) {
        write_table(dir, LexiconTable::BodyParts, &json!({ "ራስ": "head" }));
        write_table(dir, LexiconTable::TemporalMarkers, &json!({ "ዛሬ": "today" }));
        write_table(
            dir,
            LexiconTable::EmergencyPhrases,
            &json!({ "መተንፈስ አልቻልኩም": { "severity": "critical" } }),
        );
        write_table(dir, LexiconTable::Modifiers, &json!({ "በጣም": { "intensity": "severe" } }));
        write_table(
            dir,
            LexiconTable::SymptomKeywords,
            &json!({
                "fever": { "keywords": ["ትኩሳት"], "canonical_am": "ትኩሳት አለብኝ" },
                "cough": { "keywords": ["ሳል"], "canonical_am": "ሳል አለብኝ" },
                "back_pain": { "keywords": ["ጀርባዬ"] }
            }),
        );
    }

    #[test]
    fn load_reads_all_tables() {
        let dir = tempfile::tempdir().unwrap();
        write_all(dir.path());

        let store = LexiconStore::load(dir.path()).unwrap();
        assert_eq!(store.body_parts().len(), 1);
        assert_eq!(store.temporal_markers().len(), 1);
        assert_eq!(store.emergency_phrases().len(), 1);
        assert_eq!(store.modifiers().len(), 1);
        assert_eq!(store.symptom_groups().len(), 3);
        let groups = store.symptom_groups();
        assert_eq!(groups[0].1.canonical_template(), Some("ትኩሳት አለብኝ"));
        assert!(groups[2].1.canonical_am.is_none());
    }

    #[test]
    fn symptom_groups_keep_file_order() {
        let dir = tempfile::tempdir().unwrap();
        write_all(dir.path());

        let store = LexiconStore::load(dir.path()).unwrap();
        let keys: Vec<&str> = store.symptom_groups().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["fever", "cough", "back_pain"]);
    }

    #[test]
    fn missing_table_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write_all(dir.path());
        std::fs::remove_file(dir.path().join("modifiers.json")).unwrap();

        let err = LexiconStore::load(dir.path()).unwrap_err();
        match err {
            LexiconError::Source(SourceError::Io { path, .. }) => {
                assert!(path.ends_with("modifiers.json"));
            }
            other => panic!("expected missing file error, got {other:?}"),
        }
    }

    #[test]
    fn malformed_table_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write_all(dir.path());
        std::fs::write(dir.path().join("body_parts.json"), "{ \"ራስ\": ").unwrap();

        let err = LexiconStore::load(dir.path()).unwrap_err();
        assert!(matches!(err, LexiconError::Source(SourceError::Parse { .. })));
    }

    #[test]
    fn non_object_table_is_invalid() {
        let raw = RawLexicons {
            temporal_markers: json!(["ዛሬ"]),
            ..RawLexicons::default()
        };
        let err = LexiconStore::from_raw(raw).unwrap_err();
        match err {
            LexiconError::Invalid { table, reason } => {
                assert_eq!(table, LexiconTable::TemporalMarkers);
                assert!(reason.contains("an array"), "reason: {reason}");
            }
            other => panic!("expected invalid table, got {other:?}"),
        }
    }

    #[test]
    fn wrongly_typed_entry_is_invalid() {
        let raw = RawLexicons {
            body_parts: json!({ "ራስ": { "label": "head" } }),
            ..RawLexicons::default()
        };
        let err = LexiconStore::from_raw(raw).unwrap_err();
        assert!(err.to_string().contains("body_parts"));
        assert!(err.to_string().contains("ራስ"));
    }

    #[test]
    fn empty_tables_are_legal() {
        let store = LexiconStore::from_raw(RawLexicons::default()).unwrap();
        assert!(store.body_parts().is_empty());
        assert!(store.symptom_groups().is_empty());
    }
}
