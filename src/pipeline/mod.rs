pub mod source;
pub mod lexicon;
pub mod normalize;
pub mod storage;
pub mod explain;
