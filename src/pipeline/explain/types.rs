use serde::Serialize;

use crate::pipeline::normalize::{Features, Intent, RuleHit};
use crate::pipeline::storage::Match;

/// Full evidence trail for one input, serialized with fixed key order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplainResult {
    pub input: String,
    pub tokens: Vec<String>,
    pub rule_matches: Vec<RuleHit>,
    pub features: Features,
    pub canonical: String,
    pub embedding_model: String,
    pub top_matches: Vec<TopMatch>,
    pub decision: Decision,
}

/// Reported corpus match. The score is rounded to 4 decimal places.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopMatch {
    pub id: String,
    pub text: String,
    pub intent: String,
    pub symptom: String,
    pub score: f64,
}

impl From<&Match> for TopMatch {
    fn from(m: &Match) -> Self {
        Self {
            id: m.id.clone(),
            text: m.text.clone(),
            intent: m.intent.clone(),
            symptom: m.symptom.clone(),
            score: round4(m.score),
        }
    }
}

/// Final verdict.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decision {
    pub intent: Intent,
    pub severity: String,
    pub symptom: String,
    pub threshold: f32,
    pub accepted: bool,
}

impl ExplainResult {
    /// Pretty-printed JSON. Non-ASCII text is written as-is.
    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Round half away from zero to 4 decimal places.
pub fn round4(score: f32) -> f64 {
    (f64::from(score) * 10_000.0).round() / 10_000.0
}
