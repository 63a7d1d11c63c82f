use crate::alignment::sentence::{align_chain, SentenceContext};
use crate::config::AlignerConfig;
use crate::pipeline::traits::{BoundaryOptimizer, SimilarityScorer, WordRealigner};
use crate::types::{
    AlignmentProgress, AlignmentRun, BlockAlignment, TextBlock, Utterance, WordAlignment,
};

/// Alignment engine. Holds no per-run state, so one instance can serve many blocks
/// from many threads.
pub struct TextAligner {
    config: AlignerConfig,
    scorer: Box<dyn SimilarityScorer>,
    boundary_optimizer: Box<dyn BoundaryOptimizer>,
    word_realigner: Box<dyn WordRealigner>,
}

pub(crate) struct TextAlignerParts {
    pub config: AlignerConfig,
    pub scorer: Box<dyn SimilarityScorer>,
    pub boundary_optimizer: Box<dyn BoundaryOptimizer>,
    pub word_realigner: Box<dyn WordRealigner>,
}

impl TextAligner {
    pub(crate) fn from_parts(parts: TextAlignerParts) -> Self {
        Self {
            config: parts.config,
            scorer: parts.scorer,
            boundary_optimizer: parts.boundary_optimizer,
            word_realigner: parts.word_realigner,
        }
    }

    pub fn config(&self) -> &AlignerConfig {
        &self.config
    }

    /// Places `utterances` (chain order, ascending `begin_ms`) inside `block`.
    ///
    /// `block.content` must be canonical text; see
    /// [`crate::alignment::report::strip_alignment_markers`].
    pub fn align_block(&self, block: &TextBlock, utterances: &[Utterance]) -> AlignmentRun {
        self.align_block_with_progress(block, utterances, |_| {})
    }

    /// Same as [`Self::align_block`], calling `on_progress` after every confirmed match
    /// and once when the run stops.
    pub fn align_block_with_progress<F>(
        &self,
        block: &TextBlock,
        utterances: &[Utterance],
        mut on_progress: F,
    ) -> AlignmentRun
    where
        F: FnMut(&AlignmentProgress<'_>),
    {
        align_chain(block, utterances, &self.sentence_context(), &mut on_progress)
    }

    pub fn realign_words(&self, utterance: &Utterance, matched_text: &str) -> WordAlignment {
        self.word_realigner
            .realign(utterance, matched_text, self.scorer.as_ref(), &self.config)
    }

    /// Sentence alignment followed by word re-timing of every matched utterance.
    pub fn align_block_with_words(
        &self,
        block: &TextBlock,
        utterances: &[Utterance],
    ) -> BlockAlignment {
        let run = self.align_block(block, utterances);
        let words = self.realign_matches(&run, utterances);
        BlockAlignment { run, words }
    }

    /// Word alignments for every match of `run`, in match order.
    pub fn realign_matches(&self, run: &AlignmentRun, utterances: &[Utterance]) -> Vec<WordAlignment> {
        run.matches
            .iter()
            .filter_map(|m| {
                let utterance = utterances.iter().find(|u| u.id == m.utterance_id)?;
                Some(self.realign_words(utterance, &m.matched_text))
            })
            .collect()
    }

    fn sentence_context(&self) -> SentenceContext<'_> {
        SentenceContext {
            config: &self.config,
            scorer: self.scorer.as_ref(),
            boundary: self.boundary_optimizer.as_ref(),
        }
    }
}
