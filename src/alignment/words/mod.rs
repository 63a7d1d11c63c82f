//! Word-level re-timing of one utterance against its matched text.

mod mapping;
mod retime;
mod tokenize;


pub use mapping::build_word_map;
pub use tokenize::extract_words;

use crate::config::AlignerConfig;
use crate::pipeline::traits::SimilarityScorer;
use crate::types::{MappingKind, Utterance, WordAlignment};

/// Maps the utterance's recognized words onto the words of `matched_text` and derives a
/// timestamp for every resulting word.
///
/// Source word `i` is token `i`. When the recognized text does not split into exactly one
/// word per token, the token texts are used as the source words instead.
/// An utterance without tokens yields a no-op result.
pub fn realign_words(
    utterance: &Utterance,
    matched_text: &str,
    scorer: &dyn SimilarityScorer,
    config: &AlignerConfig,
) -> WordAlignment {
    if utterance.tokens.is_empty() {
        tracing::debug!(utterance_id = %utterance.id, "words: no tokens, nothing to re-time");
        return WordAlignment {
            utterance_id: utterance.id.clone(),
            ..WordAlignment::default()
        };
    }

    let mut sources = extract_words(&utterance.text);
    if sources.len() != utterance.tokens.len() {
        tracing::warn!(
            utterance_id = %utterance.id,
            words = sources.len(),
            tokens = utterance.tokens.len(),
            "words: recognized text does not match token count, using token texts"
        );
        sources = utterance.tokens.iter().map(|t| t.text.clone()).collect();
    }
    let targets = extract_words(matched_text);

    let map = build_word_map(
        &sources,
        &targets,
        scorer,
        &config.thresholds,
        &config.words,
    );
    let retimed = retime::retime(
        &map,
        &utterance.tokens,
        (utterance.begin_ms, utterance.end_ms),
        &config.words,
    );

    let count = |kind: MappingKind| map.entries.iter().filter(|e| e.kind == kind).count();
    tracing::debug!(
        utterance_id = %utterance.id,
        sources = sources.len(),
        targets = targets.len(),
        matched = count(MappingKind::Match),
        split = count(MappingKind::Split),
        merged = count(MappingKind::Merge),
        deleted = count(MappingKind::Deletion),
        inserted = count(MappingKind::Insertion),
        "words: re-timed utterance"
    );

    WordAlignment {
        utterance_id: utterance.id.clone(),
        map,
        words: retimed.words,
        removed_tokens: retimed.removed_tokens,
    }
}
