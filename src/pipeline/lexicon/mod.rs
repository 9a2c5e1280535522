pub mod types;
pub mod store;

pub use store::{LexiconStore, RawLexicons};
pub use types::{EmergencyValue, LexiconTable, ModifierValue, PhraseEntry, PhraseTable, SymptomGroup};

use thiserror::Error;

use super::source::SourceError;

#[derive(Error, Debug)]
pub enum LexiconError {
    #[error("Lexicon source error: {0}")]
    Source(#[from] SourceError),

    #[error("Invalid {table} table: {reason}")]
    Invalid { table: LexiconTable, reason: String },
}
