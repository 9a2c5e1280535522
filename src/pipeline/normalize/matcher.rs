//! Substring phrase scanning over raw text.
//!
//! Matching is plain containment: case- and diacritic-sensitive, not word
//! boundary aware. Short phrases can fire inside unrelated words; the shipped
//! lexicons and corpus are calibrated to that.

use crate::pipeline::lexicon::{PhraseEntry, PhraseTable};

/// Every entry whose phrase occurs in `text`, longest phrase first.
pub fn find_phrase_matches<'a, V>(text: &str, table: &'a PhraseTable<V>) -> Vec<&'a PhraseEntry<V>> {
    table
        .longest_first()
        .filter(|entry| contains_phrase(text, &entry.phrase))
        .collect()
}

/// The longest entry whose phrase occurs in `text`.
///
/// Unlike the other scans this one has no empty-phrase guard: an empty key
/// matches any text and acts as the table's fallback.
pub fn first_phrase_match<'a, V>(text: &str, table: &'a PhraseTable<V>) -> Option<&'a PhraseEntry<V>> {
    table
        .longest_first()
        .find(|entry| text.contains(entry.phrase.as_str()))
}

/// Containment test; an empty phrase never matches.
pub fn contains_phrase(text: &str, phrase: &str) -> bool {
    !phrase.is_empty() && text.contains(phrase)
}

/// Whitespace tokens, for display only.
pub fn tokenize_simple(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}
