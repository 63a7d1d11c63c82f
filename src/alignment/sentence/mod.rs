//! Sentence-level alignment: places a chain of utterances inside one text block.
//!
//! The first utterance is located by a short fuzzy search; every later utterance starts
//! exactly where the previous match ended. A low score stops the chain and the rest of
//! the block becomes trailing text.

mod start_search;
mod suffix_snap;
mod window_match;


use crate::alignment::normalize::NormalizedText;
use crate::config::AlignerConfig;
use crate::pipeline::traits::{BoundaryOptimizer, SimilarityScorer};
use crate::types::{AlignmentMatch, AlignmentProgress, AlignmentRun, RunOutcome, TextBlock, Utterance};

use start_search::locate_start;
use window_match::{match_at, WindowOutcome};

/// Strategies and tuning shared by every step of one run.
#[derive(Clone, Copy)]
pub(crate) struct SentenceContext<'a> {
    pub config: &'a AlignerConfig,
    pub scorer: &'a dyn SimilarityScorer,
    pub boundary: &'a dyn BoundaryOptimizer,
}

enum ChainState {
    SearchingStart,
    Matching { index: usize, cursor: usize },
    Done { cursor: usize, outcome: RunOutcome },
}

/// Aligns `utterances` (in chain order) against `block`.
///
/// Always returns a run that partitions `block.content` exactly; low scores end up in
/// [`AlignmentRun::outcome`], never as errors.
pub(crate) fn align_chain(
    block: &TextBlock,
    utterances: &[Utterance],
    ctx: &SentenceContext<'_>,
    on_progress: &mut dyn FnMut(&AlignmentProgress<'_>),
) -> AlignmentRun {
    let content = block.content.as_str();
    if content.trim().is_empty() || utterances.is_empty() {
        tracing::debug!(
            block_id = %block.id,
            utterances = utterances.len(),
            "sentence: degenerate input, nothing to align"
        );
        let run = AlignmentRun::unaligned(block, RunOutcome::DegenerateInput);
        on_progress(&AlignmentProgress::Stopped {
            matched: 0,
            outcome: &run.outcome,
        });
        return run;
    }

    let confident = ctx.config.thresholds.confident_match;
    let mut matches: Vec<AlignmentMatch> = Vec::with_capacity(utterances.len());
    let mut leading_end = 0usize;
    let mut state = ChainState::SearchingStart;

    let (cursor, outcome) = loop {
        state = match state {
            ChainState::SearchingStart => {
                let normalized = NormalizedText::new(content);
                leading_end = locate_start(&normalized, &utterances[0].text, ctx);
                ChainState::Matching {
                    index: 0,
                    cursor: leading_end,
                }
            }
            ChainState::Matching { index, cursor } => {
                let Some(utterance) = utterances.get(index) else {
                    break (cursor, RunOutcome::Completed);
                };
                let available = &content[cursor..];
                if available.trim().is_empty() {
                    break (
                        cursor,
                        RunOutcome::TextExhausted {
                            unused_utterances: utterances.len() - index,
                        },
                    );
                }

                let placed = match match_at(available, &utterance.text, ctx) {
                    WindowOutcome::Matched { end, score } if score >= confident => Ok((end, score)),
                    WindowOutcome::Matched { score, .. } => Err(score),
                    WindowOutcome::NoMatch { best_score } => Err(best_score),
                };

                match placed {
                    Ok((end, score)) => {
                        let alignment = AlignmentMatch {
                            utterance_id: utterance.id.clone(),
                            matched_text: available[..end].to_string(),
                            start: cursor,
                            end: cursor + end,
                            score,
                            begin_ms: utterance.begin_ms,
                            end_ms: utterance.end_ms,
                        };
                        tracing::debug!(
                            utterance_id = %utterance.id,
                            start = alignment.start,
                            end = alignment.end,
                            score = format!("{:.3}", score),
                            "sentence: matched utterance"
                        );
                        on_progress(&AlignmentProgress::Matched {
                            index,
                            alignment: &alignment,
                        });
                        matches.push(alignment);
                        ChainState::Matching {
                            index: index + 1,
                            cursor: cursor + end,
                        }
                    }
                    Err(score) if index == 0 => {
                        tracing::warn!(
                            block_id = %block.id,
                            utterance_id = %utterance.id,
                            score = format!("{:.3}", score),
                            "sentence: first utterance could not be placed"
                        );
                        ChainState::Done {
                            cursor,
                            outcome: RunOutcome::NoConfidentStart { best_score: score },
                        }
                    }
                    Err(score) => {
                        tracing::debug!(
                            utterance_id = %utterance.id,
                            score = format!("{:.3}", score),
                            "sentence: chain terminated"
                        );
                        ChainState::Done {
                            cursor,
                            outcome: RunOutcome::ChainTerminated {
                                utterance_id: utterance.id.clone(),
                                score,
                            },
                        }
                    }
                }
            }
            ChainState::Done { cursor, outcome } => break (cursor, outcome),
        };
    };

    let run = if matches!(outcome, RunOutcome::NoConfidentStart { .. }) {
        AlignmentRun::unaligned(block, outcome)
    } else {
        AlignmentRun {
            block_id: block.id.clone(),
            leading_text: content[..leading_end].to_string(),
            trailing_text: content[cursor..].to_string(),
            matches,
            outcome,
        }
    };

    tracing::info!(
        block_id = %run.block_id,
        matched = run.matches.len(),
        utterances = utterances.len(),
        leading = run.leading_text.len(),
        trailing = run.trailing_text.len(),
        outcome = ?run.outcome,
        "sentence: alignment run finished"
    );
    on_progress(&AlignmentProgress::Stopped {
        matched: run.matches.len(),
        outcome: &run.outcome,
    });
    run
}
