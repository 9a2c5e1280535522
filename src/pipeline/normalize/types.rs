use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sentinel for a feature nothing resolved.
pub const UNKNOWN: &str = "unknown";
/// Sentinel for a missing temporal marker.
pub const UNSPECIFIED: &str = "unspecified";
/// Severity of an emergency phrase that declares none.
pub const DEFAULT_EMERGENCY_SEVERITY: &str = "critical";

/// Triage intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Emergency,
    SymptomQuery,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Emergency => "emergency",
            Self::SymptomQuery => "symptom_query",
        }
    }
}

/// Lexicon table a rule hit came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleHitKind {
    EmergencyPhrase,
    TemporalMarker,
    BodyPart,
    Modifier,
    SymptomKeyword,
}

/// One recorded match between the input and a lexicon entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleHit {
    #[serde(rename = "type")]
    pub kind: RuleHitKind,
    /// Surface phrase found in the input.
    #[serde(rename = "match")]
    pub matched: String,
    /// The lexicon's value as written; the category key for symptom hits.
    pub value: Value,
}

/// Structured features. Every field always holds a value or a sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Features {
    pub intent: Intent,
    pub severity: String,
    pub symptom: String,
    pub body_part: String,
    pub intensity: String,
    pub pain_quality: String,
    pub temporal: String,
}

/// Output of rule extraction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizationResult {
    pub input_text: String,
    pub tokens: Vec<String>,
    /// Evidence trail: emergency, temporal, body part, modifier, symptom keyword.
    pub rule_matches: Vec<RuleHit>,
    pub features: Features,
    /// Sentence used for embedding comparison.
    pub canonical_text: String,
}
