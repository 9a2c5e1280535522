use std::sync::Arc;

use serde_json::Value;

use super::canonical::canonicalize;
use super::matcher::{contains_phrase, find_phrase_matches, first_phrase_match, tokenize_simple};
use super::types::{
    Features, Intent, NormalizationResult, RuleHit, RuleHitKind,
    DEFAULT_EMERGENCY_SEVERITY, UNKNOWN, UNSPECIFIED,
};
use crate::pipeline::lexicon::{LexiconStore, ModifierValue, SymptomGroup};

/// Lexicon-driven rule extraction.
///
/// Every stage scans the original text. The evidence trail is always recorded
/// in the same order: emergency phrases, temporal markers, the body part,
/// modifiers, the symptom keyword.
#[derive(Debug, Clone)]
pub struct RuleExtractor {
    lexicons: Arc<LexiconStore>,
}

impl RuleExtractor {
    pub fn new(lexicons: Arc<LexiconStore>) -> Self {
        Self { lexicons }
    }

    /// Convert raw text into features and a canonical sentence. Never fails.
    pub fn normalize(&self, text: &str) -> NormalizationResult {
        let lex = &*self.lexicons;
        let tokens = tokenize_simple(text);
        let mut rule_matches: Vec<RuleHit> = Vec::new();

        // Emergency phrases: all of them, no exclusivity
        let emergency_hits = find_phrase_matches(text, lex.emergency_phrases());
        for entry in &emergency_hits {
            rule_matches.push(RuleHit {
                kind: RuleHitKind::EmergencyPhrase,
                matched: entry.phrase.clone(),
                value: entry.raw.clone(),
            });
        }

        let temporal_hits = find_phrase_matches(text, lex.temporal_markers());
        for entry in &temporal_hits {
            rule_matches.push(RuleHit {
                kind: RuleHitKind::TemporalMarker,
                matched: entry.phrase.clone(),
                value: entry.raw.clone(),
            });
        }

        // At most one body part
        let body_part = first_phrase_match(text, lex.body_parts()).map(|entry| {
            rule_matches.push(RuleHit {
                kind: RuleHitKind::BodyPart,
                matched: entry.phrase.clone(),
                value: entry.raw.clone(),
            });
            entry.value.as_str()
        });

        let modifier_hits = find_phrase_matches(text, lex.modifiers());
        for entry in &modifier_hits {
            rule_matches.push(RuleHit {
                kind: RuleHitKind::Modifier,
                matched: entry.phrase.clone(),
                value: entry.raw.clone(),
            });
        }

        let symptom = infer_symptom(text, lex.symptom_groups()).map(|(key, keyword, group)| {
            rule_matches.push(RuleHit {
                kind: RuleHitKind::SymptomKeyword,
                matched: keyword.to_string(),
                value: Value::String(key.to_string()),
            });
            (key, group)
        });

        let modifiers = resolve_modifiers(modifier_hits.iter().map(|e| &e.value), body_part);
        let temporal = temporal_hits.first().map(|e| e.value.as_str());

        let (intent, severity) = match emergency_hits.first() {
            Some(first) => (
                Intent::Emergency,
                first
                    .value
                    .severity
                    .clone()
                    .unwrap_or_else(|| DEFAULT_EMERGENCY_SEVERITY.to_string()),
            ),
            None => (
                Intent::SymptomQuery,
                severity_from_intensity(modifiers.intensity).to_string(),
            ),
        };

        let features = Features {
            intent,
            severity,
            symptom: symptom.map_or(UNKNOWN, |(key, _)| key).to_string(),
            body_part: body_part.unwrap_or(UNKNOWN).to_string(),
            intensity: modifiers.intensity.unwrap_or(UNKNOWN).to_string(),
            pain_quality: modifiers
                .pain_quality
                .or(modifiers.quality)
                .unwrap_or(UNKNOWN)
                .to_string(),
            temporal: temporal.unwrap_or(UNSPECIFIED).to_string(),
        };

        let canonical_text = canonicalize(text, symptom.map(|(_, group)| group));

        tracing::debug!(
            rule_hits = rule_matches.len(),
            intent = intent.as_str(),
            symptom = %features.symptom,
            body_part = %features.body_part,
            "Normalized input"
        );

        NormalizationResult {
            input_text: text.to_string(),
            tokens,
            rule_matches,
            features,
            canonical_text,
        }
    }
}

/// Modifier fields resolved across all modifier hits.
#[derive(Debug, Default, PartialEq)]
struct ResolvedModifiers<'a> {
    intensity: Option<&'a str>,
    pain_quality: Option<&'a str>,
    quality: Option<&'a str>,
}

/// First non-empty value per field, scanning hits in recorded order.
fn resolve_modifiers<'a>(
    values: impl Iterator<Item = &'a ModifierValue>,
    body_part: Option<&str>,
) -> ResolvedModifiers<'a> {
    fn non_empty(value: Option<&str>) -> Option<&str> {
        value.filter(|v| !v.is_empty())
    }

    let mut resolved = ResolvedModifiers::default();
    for value in values {
        if resolved.intensity.is_none() {
            resolved.intensity = non_empty(value.intensity.as_deref());
        }
        if resolved.pain_quality.is_none() {
            resolved.pain_quality = non_empty(value.pain_quality_for(body_part));
        }
        if resolved.quality.is_none() {
            resolved.quality = non_empty(value.quality.as_deref());
        }
    }
    resolved
}

/// Categories in file order, keywords in file order; first contained keyword wins.
fn infer_symptom<'a>(
    text: &str,
    groups: &'a [(String, SymptomGroup)],
) -> Option<(&'a str, &'a str, &'a SymptomGroup)> {
    groups.iter().find_map(|(key, group)| {
        group
            .keywords
            .iter()
            .find(|kw| contains_phrase(text, kw))
            .map(|kw| (key.as_str(), kw.as_str(), group))
    })
}

/// Non-emergency severity from the resolved intensity.
pub fn severity_from_intensity(intensity: Option<&str>) -> &'static str {
    match intensity {
        Some("moderate") => "moderate",
        Some("severe") => "high",
        // unset, "mild" and anything unrecognized
        _ => "routine",
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use serde_json::json;

    use super::*;
    use crate::pipeline::lexicon::RawLexicons;

    fn extractor(raw: RawLexicons) -> RuleExtractor {
        RuleExtractor::new(Arc::new(LexiconStore::from_raw(raw).unwrap()))
    }

    fn shipped() -> RuleExtractor {
        let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data").join("lexicons");
        RuleExtractor::new(Arc::new(LexiconStore::load(&dir).unwrap()))
    }

    fn kinds(result: &NormalizationResult) -> Vec<RuleHitKind> {
        result.rule_matches.iter().map(|h| h.kind).collect()
    }

    // =================================================================
    // SHIPPED LEXICON SCENARIOS
    // =================================================================

    #[test]
    fn headache_splitting_pain() {
        let res = shipped().normalize("ራሴን ሰንጥቆ ያመኛል");
        assert_eq!(res.features.body_part, "head");
        assert_eq!(res.features.symptom, "headache");
        assert!(
            ["severe", "unknown"].contains(&res.features.intensity.as_str()),
            "intensity: {}",
            res.features.intensity
        );
        assert!(res.canonical_text.contains("ራስ"), "canonical: {}", res.canonical_text);
        assert_eq!(res.tokens, vec!["ራሴን", "ሰንጥቆ", "ያመኛል"]);
    }

    #[test]
    fn abdomen_cutting_becomes_cramping() {
        let res = shipped().normalize("ሆድ ተቆረጠ");
        assert_eq!(res.features.body_part, "abdomen");
        assert_eq!(res.features.pain_quality, "cramping");
    }

    #[test]
    fn chest_cutting_keeps_default_quality() {
        let res = shipped().normalize("ደረት ተቆረጠ");
        assert_eq!(res.features.body_part, "chest");
        assert_eq!(res.features.pain_quality, "cutting");
    }

    #[test]
    fn shipped_emergency_phrase_sets_intent() {
        let res = shipped().normalize("ከትናንት ጀምሮ መተንፈስ አልቻልኩም");
        assert_eq!(res.features.intent, Intent::Emergency);
        assert_eq!(res.features.severity, "critical");
        assert_eq!(res.features.temporal, "since_yesterday");
    }

    // =================================================================
    // ORDERING AND TIE-BREAKS
    // =================================================================

    #[test]
    fn evidence_trail_order_is_fixed() {
        let ex = extractor(RawLexicons {
            body_parts: json!({ "ደረት": "chest" }),
            temporal_markers: json!({ "ዛሬ": "today" }),
            emergency_phrases: json!({ "መተንፈስ": { "severity": "critical" } }),
            modifiers: json!({ "በጣም": { "intensity": "severe" } }),
            symptom_keywords: json!({ "chest_pain": { "keywords": ["ደረት"], "canonical_am": "የደረት ህመም አለብኝ" } }),
        });
        let res = ex.normalize("ዛሬ ደረት በጣም ያመኛል መተንፈስ ከበደኝ");
        assert_eq!(
            kinds(&res),
            vec![
                RuleHitKind::EmergencyPhrase,
                RuleHitKind::TemporalMarker,
                RuleHitKind::BodyPart,
                RuleHitKind::Modifier,
                RuleHitKind::SymptomKeyword,
            ]
        );
    }

    #[test]
    fn longest_body_part_is_exclusive() {
        let ex = extractor(RawLexicons {
            body_parts: json!({ "ሆድ": "abdomen", "ሆድ ዕቃ": "bowel", "ራስ": "head" }),
            ..RawLexicons::default()
        });
        let res = ex.normalize("ሆድ ዕቃዬ ራስ");
        assert_eq!(res.features.body_part, "bowel");
        let body_hits: Vec<&RuleHit> = res
            .rule_matches
            .iter()
            .filter(|h| h.kind == RuleHitKind::BodyPart)
            .collect();
        assert_eq!(body_hits.len(), 1);
        assert_eq!(body_hits[0].matched, "ሆድ ዕቃ");
    }

    #[test]
    fn longest_temporal_marker_resolves_feature() {
        let ex = extractor(RawLexicons {
            temporal_markers: json!({ "ማታ": "night", "ማታ ማታ": "nightly" }),
            ..RawLexicons::default()
        });
        let res = ex.normalize("ማታ ማታ ያስለኛል");
        assert_eq!(res.features.temporal, "nightly");
        let matched: Vec<&str> = res.rule_matches.iter().map(|h| h.matched.as_str()).collect();
        assert_eq!(matched, vec!["ማታ ማታ", "ማታ"]);
    }

    #[test]
    fn equal_length_temporal_tie_keeps_file_order() {
        let ex = extractor(RawLexicons {
            temporal_markers: json!({ "ጠዋት": "morning", "ቀትር": "noon" }),
            ..RawLexicons::default()
        });
        let res = ex.normalize("ቀትር እና ጠዋት");
        assert_eq!(res.features.temporal, "morning");
    }

    #[test]
    fn multiple_emergency_phrases_cofire_and_first_sets_severity() {
        let ex = extractor(RawLexicons {
            emergency_phrases: json!({
                "መናድ": { "severity": "urgent" },
                "ራሱን ሳተ": { "severity": "critical" }
            }),
            ..RawLexicons::default()
        });
        let res = ex.normalize("ልጁ መናድ ይዞት ራሱን ሳተ");
        let emergency: Vec<&str> = res
            .rule_matches
            .iter()
            .filter(|h| h.kind == RuleHitKind::EmergencyPhrase)
            .map(|h| h.matched.as_str())
            .collect();
        // longest first: "ራሱን ሳተ" (6 chars) before "መናድ" (3 chars)
        assert_eq!(emergency, vec!["ራሱን ሳተ", "መናድ"]);
        assert_eq!(res.features.severity, "critical");
    }

    #[test]
    fn emergency_without_severity_defaults_to_critical() {
        let ex = extractor(RawLexicons {
            emergency_phrases: json!({ "ደም አስመለሰኝ": {} }),
            modifiers: json!({ "ትንሽ": { "intensity": "mild" } }),
            ..RawLexicons::default()
        });
        let res = ex.normalize("ትንሽ ደም አስመለሰኝ");
        assert_eq!(res.features.intent, Intent::Emergency);
        assert_eq!(res.features.severity, "critical");
        assert_eq!(res.features.intensity, "mild");
    }

    #[test]
    fn symptom_priority_follows_category_then_keyword_order() {
        let ex = extractor(RawLexicons {
            symptom_keywords: json!({
                "nausea": { "keywords": ["ያቅለሸልሸኛል"], "canonical_am": "ያቅለሸልሸኛል" },
                "fever": { "keywords": ["ብርድ", "ትኩሳት"], "canonical_am": "ትኩሳት አለብኝ" },
                "headache": { "keywords": ["ራስ ምታት"], "canonical_am": "ራስ ምታት አለብኝ" }
            }),
            ..RawLexicons::default()
        });
        let res = ex.normalize("ራስ ምታት እና ትኩሳት ብርድ ብርድ");
        assert_eq!(res.features.symptom, "fever");
        let last = res.rule_matches.last().unwrap();
        assert_eq!(last.kind, RuleHitKind::SymptomKeyword);
        assert_eq!(last.matched, "ብርድ");
        assert_eq!(last.value, Value::String("fever".into()));
        assert_eq!(res.canonical_text, "ትኩሳት አለብኝ");
    }

    #[test]
    fn trail_echoes_lexicon_values_as_written() {
        let ex = extractor(RawLexicons {
            emergency_phrases: json!({ "ራሴን ሳትኩ": { "note": "syncope", "severity": "urgent" } }),
            modifiers: json!({
                "ተቆረጠ": {
                    "pain_quality": "cutting",
                    "intensity": null,
                    "pain_quality_by_body_part": { "zz": "a", "aa": "b" }
                }
            }),
            ..RawLexicons::default()
        });
        let res = ex.normalize("ራሴን ሳትኩ ተቆረጠ");

        let value_of = |kind: RuleHitKind| {
            let hit = res.rule_matches.iter().find(|h| h.kind == kind).unwrap();
            serde_json::to_string(&hit.value).unwrap()
        };
        assert_eq!(
            value_of(RuleHitKind::EmergencyPhrase),
            r#"{"note":"syncope","severity":"urgent"}"#
        );
        assert_eq!(
            value_of(RuleHitKind::Modifier),
            r#"{"pain_quality":"cutting","intensity":null,"pain_quality_by_body_part":{"zz":"a","aa":"b"}}"#
        );
        assert_eq!(res.features.severity, "urgent");
        assert_eq!(res.features.intensity, "unknown");
        assert_eq!(res.features.pain_quality, "cutting");
    }

    #[test]
    fn empty_body_part_key_is_the_fallback() {
        let ex = extractor(RawLexicons {
            body_parts: json!({ "ራስ": "head", "": "general" }),
            ..RawLexicons::default()
        });

        let res = ex.normalize("ያመኛል");
        assert_eq!(res.features.body_part, "general");
        assert_eq!(res.rule_matches[0].kind, RuleHitKind::BodyPart);
        assert_eq!(res.rule_matches[0].matched, "");

        assert_eq!(ex.normalize("ራስ ያመኛል").features.body_part, "head");
    }

    // =================================================================
    // FEATURE SYNTHESIS
    // =================================================================

    #[test]
    fn modifier_fields_resolve_independently() {
        let ex = extractor(RawLexicons {
            modifiers: json!({
                "ያቃጥለኛል": { "pain_quality": "burning" },
                "በጣም": { "intensity": "severe", "pain_quality": "" },
                "ትንሽ": { "intensity": "mild" }
            }),
            ..RawLexicons::default()
        });
        // longest first: ያቃጥለኛል, then በጣም / ትንሽ (equal length, file order)
        let res = ex.normalize("በጣም ትንሽ ያቃጥለኛል");
        assert_eq!(res.features.intensity, "severe");
        assert_eq!(res.features.pain_quality, "burning");
        assert_eq!(res.features.severity, "high");
    }

    #[test]
    fn pain_quality_falls_back_to_quality() {
        let ex = extractor(RawLexicons {
            modifiers: json!({ "ያሳክከኛል": { "quality": "itchy" } }),
            ..RawLexicons::default()
        });
        let res = ex.normalize("ቆዳዬ ያሳክከኛል");
        assert_eq!(res.features.pain_quality, "itchy");
    }

    #[test]
    fn override_requires_matching_body_part() {
        let ex = extractor(RawLexicons {
            body_parts: json!({ "ሆድ": "abdomen" }),
            modifiers: json!({
                "ተቆረጠ": { "pain_quality": "cutting", "pain_quality_by_body_part": { "abdomen": "cramping" } }
            }),
            ..RawLexicons::default()
        });
        assert_eq!(ex.normalize("ሆድ ተቆረጠ").features.pain_quality, "cramping");
        assert_eq!(ex.normalize("እጄ ተቆረጠ").features.pain_quality, "cutting");
    }

    #[test]
    fn severity_mapping_from_intensity() {
        assert_eq!(severity_from_intensity(None), "routine");
        assert_eq!(severity_from_intensity(Some("mild")), "routine");
        assert_eq!(severity_from_intensity(Some("moderate")), "moderate");
        assert_eq!(severity_from_intensity(Some("severe")), "high");
        assert_eq!(severity_from_intensity(Some("excruciating")), "routine");
    }

    #[test]
    fn empty_input_yields_all_sentinels() {
        for text in ["", "   ", "\n\t"] {
            let res = shipped().normalize(text);
            assert!(res.rule_matches.is_empty(), "hits for {text:?}");
            assert!(res.tokens.is_empty());
            assert_eq!(
                res.features,
                Features {
                    intent: Intent::SymptomQuery,
                    severity: "routine".into(),
                    symptom: "unknown".into(),
                    body_part: "unknown".into(),
                    intensity: "unknown".into(),
                    pain_quality: "unknown".into(),
                    temporal: "unspecified".into(),
                }
            );
            assert_eq!(res.canonical_text, "");
        }
    }

    #[test]
    fn features_serialize_with_every_key() {
        let res = shipped().normalize("hello");
        let json = serde_json::to_value(&res.features).unwrap();
        for key in ["intent", "severity", "symptom", "body_part", "intensity", "pain_quality", "temporal"] {
            assert!(json[key].is_string(), "missing or null feature {key}");
        }
    }

    // =================================================================
    // CANONICALIZATION
    // =================================================================

    #[test]
    fn template_replaces_person_specific_phrasing() {
        let ex = shipped();
        let a = ex.normalize("ዛሬ ጠዋት በጣም ያተኩሰኛል");
        let b = ex.normalize("ትኩሳት አለኝ (fever)");
        assert_eq!(a.canonical_text, "ትኩሳት አለብኝ");
        assert_eq!(b.canonical_text, "ትኩሳት አለብኝ");
    }

    #[test]
    fn no_symptom_keeps_cleaned_input() {
        let ex = extractor(RawLexicons::default());
        let res = ex.normalize("  እግሬ አበጠ (swollen leg) ");
        assert_eq!(res.canonical_text, "እግሬ አበጠ");
        assert_eq!(res.input_text, "  እግሬ አበጠ (swollen leg) ");
    }
}
