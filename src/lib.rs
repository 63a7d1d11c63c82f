pub mod alignment;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod types;

pub use alignment::punctuation::PunctuationSet;
pub use alignment::report::{
    render_marked_content, strip_alignment_markers, AlignmentSummary, ConversionStatus,
};
pub use config::AlignerConfig;
pub use error::AlignmentError;
pub use pipeline::builder::TextAlignerBuilder;
pub use pipeline::runtime::TextAligner;
pub use pipeline::service::AlignmentService;
pub use pipeline::traits::{
    AlignmentRepository, AlignmentSink, BoundaryOptimizer, SimilarityScorer, WordRealigner,
};
pub use types::{
    AlignedWord, AlignmentMatch, AlignmentProgress, AlignmentRun, BlockAlignment, MappingKind,
    RunOutcome, TextBlock, Token, Utterance, WordAlignment, WordAlignmentMap, WordMapping,
    WordOrigin,
};
