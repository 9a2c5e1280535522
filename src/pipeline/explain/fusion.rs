use super::types::Decision;
use crate::pipeline::normalize::{Features, Intent};
use crate::pipeline::storage::Match;

/// Reconcile rule features with the confident best match.
///
/// Priority: an emergency is always accepted with its rule-derived symptom;
/// otherwise a confident match is accepted and supplies the symptom;
/// otherwise nothing is accepted. Intent and severity always come from the
/// rules.
pub fn fuse(features: &Features, best: Option<&Match>, threshold: f32) -> Decision {
    let (symptom, accepted) = match (features.intent, best) {
        (Intent::Emergency, _) => (features.symptom.clone(), true),
        (_, Some(best)) => (best.symptom.clone(), true),
        (_, None) => (features.symptom.clone(), false),
    };

    Decision {
        intent: features.intent,
        severity: features.severity.clone(),
        symptom,
        threshold,
        accepted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features(intent: Intent, severity: &str, symptom: &str) -> Features {
        Features {
            intent,
            severity: severity.into(),
            symptom: symptom.into(),
            body_part: "unknown".into(),
            intensity: "unknown".into(),
            pain_quality: "unknown".into(),
            temporal: "unspecified".into(),
        }
    }

    fn best(symptom: &str, score: f32) -> Match {
        Match {
            id: "ex".into(),
            text: "text".into(),
            intent: "symptom_query".into(),
            symptom: symptom.into(),
            score,
        }
    }

    #[test]
    fn emergency_is_accepted_without_match() {
        let d = fuse(&features(Intent::Emergency, "critical", "unknown"), None, 0.55);
        assert!(d.accepted);
        assert_eq!(d.intent, Intent::Emergency);
        assert_eq!(d.severity, "critical");
        assert_eq!(d.symptom, "unknown");
    }

    #[test]
    fn emergency_keeps_rule_symptom_over_match() {
        let m = best("cough", 0.9);
        let d = fuse(&features(Intent::Emergency, "urgent", "chest_pain"), Some(&m), 0.55);
        assert!(d.accepted);
        assert_eq!(d.symptom, "chest_pain");
        assert_eq!(d.severity, "urgent");
    }

    #[test]
    fn confident_match_overrides_symptom() {
        let m = best("fever", 0.7);
        let d = fuse(&features(Intent::SymptomQuery, "moderate", "unknown"), Some(&m), 0.55);
        assert!(d.accepted);
        assert_eq!(d.symptom, "fever");
        assert_eq!(d.intent, Intent::SymptomQuery);
        assert_eq!(d.severity, "moderate");
    }

    #[test]
    fn no_match_is_not_accepted() {
        let d = fuse(&features(Intent::SymptomQuery, "severe", "headache"), None, 0.55);
        assert!(!d.accepted);
        assert_eq!(d.symptom, "headache");
        assert_eq!(d.severity, "severe");
        assert_eq!(d.threshold, 0.55);
    }
}
