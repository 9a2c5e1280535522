use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The five independent lexicon tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LexiconTable {
    BodyParts,
    TemporalMarkers,
    EmergencyPhrases,
    Modifiers,
    SymptomKeywords,
}

impl LexiconTable {
    pub const ALL: [LexiconTable; 5] = [
        Self::BodyParts,
        Self::TemporalMarkers,
        Self::EmergencyPhrases,
        Self::Modifiers,
        Self::SymptomKeywords,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BodyParts => "body_parts",
            Self::TemporalMarkers => "temporal_markers",
            Self::EmergencyPhrases => "emergency_phrases",
            Self::Modifiers => "modifiers",
            Self::SymptomKeywords => "symptom_keywords",
        }
    }

    /// File name inside the lexicon directory.
    pub fn file_name(&self) -> String {
        format!("{}.json", self.as_str())
    }
}

impl fmt::Display for LexiconTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Emergency phrase metadata. Other fields stay in the entry's raw value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EmergencyValue {
    #[serde(default)]
    pub severity: Option<String>,
}

/// Modifier metadata: intensity, pain quality and general quality.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ModifierValue {
    #[serde(default)]
    pub intensity: Option<String>,
    #[serde(default)]
    pub pain_quality: Option<String>,
    #[serde(default)]
    pub quality: Option<String>,
    /// Body-part label → pain quality that replaces `pain_quality`.
    #[serde(default)]
    pub pain_quality_by_body_part: Option<BTreeMap<String, String>>,
}

impl ModifierValue {
    /// Pain quality this modifier contributes, given the extracted body part.
    pub fn pain_quality_for(&self, body_part: Option<&str>) -> Option<&str> {
        let overridden = body_part.and_then(|part| {
            self.pain_quality_by_body_part
                .as_ref()
                .and_then(|by_part| by_part.get(part))
        });
        overridden.or(self.pain_quality.as_ref()).map(String::as_str)
    }
}

/// Keyword group for one symptom category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SymptomGroup {
    /// Surface keywords, in priority order.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Canonical Amharic template replacing the input for matching.
    #[serde(default)]
    pub canonical_am: Option<String>,
}

impl SymptomGroup {
    /// The template, trimmed, if it has any content.
    pub fn canonical_template(&self) -> Option<&str> {
        self.canonical_am
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

/// One surface phrase, its decoded value and the value exactly as written.
#[derive(Debug, Clone, PartialEq)]
pub struct PhraseEntry<V> {
    pub phrase: String,
    pub value: V,
    /// Echoed verbatim in the evidence trail (key order and nulls included).
    pub raw: Value,
}

/// Phrase table in file order, with a precomputed longest-first scan order.
#[derive(Debug, Clone)]
pub struct PhraseTable<V> {
    entries: Vec<PhraseEntry<V>>,
    longest_first: Vec<usize>,
}

impl<V> PhraseTable<V> {
    /// Build from entries in file order.
    ///
    /// Length is counted in Unicode scalar values. The sort is stable, so
    /// phrases of equal length keep their file order.
    pub fn from_entries(entries: Vec<PhraseEntry<V>>) -> Self {
        let mut longest_first: Vec<usize> = (0..entries.len()).collect();
        longest_first.sort_by_key(|&i| std::cmp::Reverse(entries[i].phrase.chars().count()));

        Self {
            entries,
            longest_first,
        }
    }

    /// Entries ordered by phrase length, longest first.
    pub fn longest_first(&self) -> impl Iterator<Item = &PhraseEntry<V>> {
        self.longest_first.iter().map(move |&i| &self.entries[i])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> Default for PhraseTable<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            longest_first: Vec::new(),
        }
    }
}
