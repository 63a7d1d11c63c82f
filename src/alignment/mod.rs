pub mod boundary;
pub mod normalize;
pub mod punctuation;
pub mod report;
pub(crate) mod sentence;
pub mod similarity;
pub mod words;
