pub mod types;
pub mod matcher;
pub mod canonical;
pub mod extractor;

pub use extractor::RuleExtractor;
pub use types::{Features, Intent, NormalizationResult, RuleHit, RuleHitKind};
