use std::sync::LazyLock;

use regex::Regex;

use crate::pipeline::lexicon::SymptomGroup;

/// A parenthesized gloss with its surrounding whitespace: `"ትኩሳት (Fever) "`.
static PARENTHESIZED_GLOSS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\([^)]*\)\s*").expect("valid gloss regex"));

/// Sentence used for embedding comparison.
///
/// A symptom template replaces the input entirely; otherwise the input is
/// kept with its glosses removed.
pub fn canonicalize(text: &str, group: Option<&SymptomGroup>) -> String {
    if let Some(template) = group.and_then(SymptomGroup::canonical_template) {
        return template.to_string();
    }
    strip_parenthesized_glosses(text)
}

/// Replace each gloss with one space, then trim.
pub fn strip_parenthesized_glosses(text: &str) -> String {
    PARENTHESIZED_GLOSS.replace_all(text, " ").trim().to_string()
}
