use crate::alignment::punctuation::PunctuationSet;
use crate::config::AlignerConfig;
use crate::error::AlignmentError;
use crate::types::{AlignmentProgress, AlignmentRun, TextBlock, Utterance, WordAlignment};

/// Bounded, symmetric string similarity in [0, 1].
pub trait SimilarityScorer: Send + Sync {
    fn similarity(&self, a: &str, b: &str) -> f32;
}

/// Trims a raw match window to a sentence boundary; returns the byte length to keep.
pub trait BoundaryOptimizer: Send + Sync {
    fn optimize(&self, window: &str, punctuation: &PunctuationSet) -> usize;
}

/// Re-derives per-word timings once an utterance's matched text is known.
pub trait WordRealigner: Send + Sync {
    fn realign(
        &self,
        utterance: &Utterance,
        matched_text: &str,
        scorer: &dyn SimilarityScorer,
        config: &AlignerConfig,
    ) -> WordAlignment;
}

/// Read-only source of blocks and utterances.
///
/// Implementations hand out canonical text: any `[[id]]` markers from an earlier
/// alignment must be stripped before the block reaches the engine.
pub trait AlignmentRepository {
    fn fetch_block(&self, block_id: &str) -> Result<TextBlock, AlignmentError>;

    fn fetch_utterance(&self, utterance_id: &str) -> Result<Utterance, AlignmentError>;

    /// Utterances of `speech_id` with `begin_ms >= from_begin_ms`, ascending by `begin_ms`.
    fn fetch_utterances(
        &self,
        speech_id: &str,
        from_begin_ms: u64,
    ) -> Result<Vec<Utterance>, AlignmentError>;
}

/// Persists alignment results. Reconciling stored tokens is the sink's job.
pub trait AlignmentSink {
    fn on_progress(&mut self, _event: &AlignmentProgress<'_>) {}

    fn persist_run(&mut self, run: &AlignmentRun) -> Result<(), AlignmentError>;

    fn persist_words(&mut self, words: &WordAlignment) -> Result<(), AlignmentError>;
}
