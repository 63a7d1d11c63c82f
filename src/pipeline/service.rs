use crate::alignment::report::strip_alignment_markers;
use crate::error::AlignmentError;
use crate::pipeline::runtime::TextAligner;
use crate::pipeline::traits::{AlignmentRepository, AlignmentSink};
use crate::types::{BlockAlignment, TextBlock};

/// Fetch, align, persist. All repository reads happen before the first sink write, so a
/// failed lookup leaves the sink untouched.
pub struct AlignmentService<R, S> {
    aligner: TextAligner,
    repository: R,
    sink: S,
}

impl<R, S> AlignmentService<R, S>
where
    R: AlignmentRepository,
    S: AlignmentSink,
{
    pub fn new(aligner: TextAligner, repository: R, sink: S) -> Self {
        Self {
            aligner,
            repository,
            sink,
        }
    }

    pub fn aligner(&self) -> &TextAligner {
        &self.aligner
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_parts(self) -> (TextAligner, R, S) {
        (self.aligner, self.repository, self.sink)
    }

    /// Aligns the utterances of `speech_id` starting at `start_utterance_id` against
    /// block `block_id` and hands the results to the sink.
    pub fn align_from(
        &mut self,
        block_id: &str,
        speech_id: &str,
        start_utterance_id: &str,
    ) -> Result<BlockAlignment, AlignmentError> {
        let block = self.repository.fetch_block(block_id)?;
        let start = self.repository.fetch_utterance(start_utterance_id)?;
        let utterances = self
            .repository
            .fetch_utterances(speech_id, start.begin_ms)?;

        let canonical = strip_alignment_markers(&block.content);
        let block = if canonical.len() == block.content.len() {
            block
        } else {
            tracing::debug!(
                block_id,
                removed = block.content.len() - canonical.len(),
                "service: stripped previous alignment markers"
            );
            TextBlock::new(block.id.clone(), canonical.into_owned())
        };

        tracing::info!(
            block_id,
            speech_id,
            start_utterance_id,
            utterances = utterances.len(),
            "service: aligning block"
        );

        let sink = &mut self.sink;
        let run = self
            .aligner
            .align_block_with_progress(&block, &utterances, |event| sink.on_progress(event));
        let words = self.aligner.realign_matches(&run, &utterances);

        self.sink.persist_run(&run)?;
        for alignment in &words {
            self.sink.persist_words(alignment)?;
        }

        Ok(BlockAlignment { run, words })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::pipeline::builder::TextAlignerBuilder;
    use crate::types::{
        AlignmentProgress, AlignmentRun, RunOutcome, Token, Utterance, WordAlignment,
    };

    #[derive(Default)]
    struct MemoryRepository {
        blocks: HashMap<String, TextBlock>,
        utterances: Vec<Utterance>,
        fail_utterances: bool,
    }

    impl AlignmentRepository for MemoryRepository {
        fn fetch_block(&self, block_id: &str) -> Result<TextBlock, AlignmentError> {
            self.blocks
                .get(block_id)
                .cloned()
                .ok_or_else(|| AlignmentError::data_access("fetching block", block_id))
        }

        fn fetch_utterance(&self, utterance_id: &str) -> Result<Utterance, AlignmentError> {
            self.utterances
                .iter()
                .find(|u| u.id == utterance_id)
                .cloned()
                .ok_or_else(|| AlignmentError::data_access("fetching utterance", utterance_id))
        }

        fn fetch_utterances(
            &self,
            speech_id: &str,
            from_begin_ms: u64,
        ) -> Result<Vec<Utterance>, AlignmentError> {
            if self.fail_utterances {
                return Err(AlignmentError::data_access(
                    "fetching utterances",
                    "connection reset",
                ));
            }
            let mut chain: Vec<Utterance> = self
                .utterances
                .iter()
                .filter(|u| u.speech_id == speech_id && u.begin_ms >= from_begin_ms)
                .cloned()
                .collect();
            chain.sort_by_key(|u| u.begin_ms);
            Ok(chain)
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        events: Vec<String>,
        runs: Vec<AlignmentRun>,
        words: Vec<WordAlignment>,
    }

    impl AlignmentSink for RecordingSink {
        fn on_progress(&mut self, event: &AlignmentProgress<'_>) {
            self.events.push(match event {
                AlignmentProgress::Matched { alignment, .. } => alignment.utterance_id.clone(),
                AlignmentProgress::Stopped { .. } => "stop".to_string(),
            });
        }

        fn persist_run(&mut self, run: &AlignmentRun) -> Result<(), AlignmentError> {
            self.runs.push(run.clone());
            Ok(())
        }

        fn persist_words(&mut self, words: &WordAlignment) -> Result<(), AlignmentError> {
            self.words.push(words.clone());
            Ok(())
        }
    }

    fn make_utterance(id: &str, text: &str, begin: u64, words: &[&str]) -> Utterance {
        let mut utterance = Utterance::new(id, text, begin, begin + 100 * words.len() as u64);
        utterance.speech_id = "speech-1".to_string();
        utterance.with_tokens(
            words
                .iter()
                .enumerate()
                .map(|(i, w)| {
                    let start = begin + 100 * i as u64;
                    Token::new(*w, start, start + 100)
                })
                .collect(),
        )
    }

    fn repository(content: &str) -> MemoryRepository {
        let mut blocks = HashMap::new();
        blocks.insert("b1".to_string(), TextBlock::new("b1", content));
        MemoryRepository {
            blocks,
            utterances: vec![
                make_utterance("u0", "earlier speech", 0, &["earlier", "speech"]),
                make_utterance("u1", "the cat sat", 1000, &["the", "cat", "sat"]),
                make_utterance("u2", "on the mat", 2000, &["on", "the", "mat"]),
            ],
            fail_utterances: false,
        }
    }

    fn service(repo: MemoryRepository) -> AlignmentService<MemoryRepository, RecordingSink> {
        let aligner = TextAlignerBuilder::default().build().expect("build should succeed");
        AlignmentService::new(aligner, repo, RecordingSink::default())
    }

    #[test]
    fn align_from_persists_run_and_words() {
        let mut service = service(repository("The cat sat on the mat."));
        let result = service
            .align_from("b1", "speech-1", "u1")
            .expect("alignment should succeed");

        assert_eq!(result.run.outcome, RunOutcome::Completed);
        assert_eq!(result.run.matches.len(), 2);
        let sink = service.sink();
        assert_eq!(sink.runs, vec![result.run.clone()]);
        assert_eq!(sink.words.len(), 2);
        assert_eq!(sink.events, vec!["u1", "u2", "stop"]);
    }

    #[test]
    fn previous_markers_are_stripped_before_alignment() {
        let mut service = service(repository("[[u1]]The cat sat on the mat.[[u2]]"));
        let result = service
            .align_from("b1", "speech-1", "u1")
            .expect("alignment should succeed");

        assert!(result.run.is_lossless("The cat sat on the mat."));
        assert_eq!(result.run.outcome, RunOutcome::Completed);
    }

    #[test]
    fn repository_failure_persists_nothing() {
        let mut repo = repository("The cat sat on the mat.");
        repo.fail_utterances = true;
        let mut service = service(repo);

        let err = service
            .align_from("b1", "speech-1", "u1")
            .expect_err("lookup should fail");
        assert!(err.is_data_access());
        let sink = service.sink();
        assert!(sink.runs.is_empty());
        assert!(sink.words.is_empty());
        assert!(sink.events.is_empty());
    }

    #[test]
    fn unknown_block_is_data_access_error() {
        let mut service = service(repository("The cat sat on the mat."));
        let err = service
            .align_from("missing", "speech-1", "u1")
            .expect_err("lookup should fail");
        assert!(matches!(
            err,
            AlignmentError::DataAccess {
                context: "fetching block",
                ..
            }
        ));
    }

    #[test]
    fn empty_chain_is_persisted_as_degenerate_run() {
        let mut repo = repository("The cat sat on the mat.");
        repo.utterances
            .iter_mut()
            .for_each(|u| u.speech_id = "other".to_string());
        let mut service = service(repo);

        let result = service
            .align_from("b1", "speech-1", "u1")
            .expect("alignment should succeed");
        assert_eq!(result.run.outcome, RunOutcome::DegenerateInput);
        assert_eq!(service.sink().runs.len(), 1);
        assert!(service.sink().words.is_empty());
    }
}
