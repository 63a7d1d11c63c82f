use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::types::{AlignmentRun, RunOutcome, Utterance, WordAlignment, WordOrigin};

pub const REPORT_SCHEMA_VERSION: u32 = 1;
const ALIGNMENT_METHOD: &str = "string_similarity";

/// `[[utterance-id]]` markers left in block content by an earlier alignment.
static MARKER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[[^\]]+\]\]").expect("Invalid marker regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionStatus {
    /// Every non-blank character of the block belongs to a match.
    Completed,
    PartiallyConverted,
    Unaligned,
}

/// Character counts describing how much of a block was converted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionMetadata {
    pub alignment_method: &'static str,
    pub aligned_sentences_count: usize,
    pub total_length: usize,
    pub aligned_length: usize,
    pub prefix_length: usize,
    pub remaining_length: usize,
}

impl ConversionMetadata {
    pub fn from_run(run: &AlignmentRun) -> Self {
        let prefix_length = run.leading_text.chars().count();
        let remaining_length = run.trailing_text.chars().count();
        let aligned_length = run
            .matches
            .iter()
            .map(|m| m.matched_text.chars().count())
            .sum::<usize>();
        Self {
            alignment_method: ALIGNMENT_METHOD,
            aligned_sentences_count: run.matches.len(),
            total_length: prefix_length + aligned_length + remaining_length,
            aligned_length,
            prefix_length,
            remaining_length,
        }
    }
}

pub fn conversion_status(run: &AlignmentRun) -> ConversionStatus {
    if run.matches.is_empty() {
        ConversionStatus::Unaligned
    } else if run.leading_text.trim().is_empty() && run.trailing_text.trim().is_empty() {
        ConversionStatus::Completed
    } else {
        ConversionStatus::PartiallyConverted
    }
}

/// Block content with every match replaced by its `[[utterance_id]]` marker.
pub fn render_marked_content(run: &AlignmentRun) -> String {
    let mut out = run.leading_text.clone();
    for m in &run.matches {
        out.push_str("[[");
        out.push_str(&m.utterance_id);
        out.push_str("]]");
    }
    out.push_str(&run.trailing_text);
    out
}

/// Removes `[[id]]` markers so previously aligned content can be aligned again.
pub fn strip_alignment_markers(content: &str) -> Cow<'_, str> {
    MARKER_PATTERN.replace_all(content, "")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WordChangeKind {
    Unchanged,
    Respelled,
    Inserted,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordChange {
    pub word: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_word: Option<String>,
    pub begin_ms: u64,
    pub end_ms: u64,
    pub change: WordChangeKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentenceSummary {
    pub utterance_id: String,
    pub original_text: String,
    pub matched_text: String,
    pub score: f32,
    pub begin_ms: u64,
    pub end_ms: u64,
    pub words: Vec<WordChange>,
    pub removed_token_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignmentSummary {
    pub block_id: String,
    pub status: ConversionStatus,
    pub outcome: RunOutcome,
    pub metadata: ConversionMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub begin_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marked_content: Option<String>,
    pub sentences: Vec<SentenceSummary>,
}

/// Per-block summary joining each match with its utterance text and word changes.
/// Matches whose utterance or word alignment is missing get empty fields.
pub fn summarize_run(
    run: &AlignmentRun,
    utterances: &[Utterance],
    words: &[WordAlignment],
) -> AlignmentSummary {
    let utterance_text: HashMap<&str, &str> = utterances
        .iter()
        .map(|u| (u.id.as_str(), u.text.as_str()))
        .collect();
    let words_by_id: HashMap<&str, &WordAlignment> =
        words.iter().map(|w| (w.utterance_id.as_str(), w)).collect();

    let sentences = run
        .matches
        .iter()
        .map(|m| {
            let realigned = words_by_id.get(m.utterance_id.as_str());
            SentenceSummary {
                utterance_id: m.utterance_id.clone(),
                original_text: utterance_text
                    .get(m.utterance_id.as_str())
                    .map(|t| t.to_string())
                    .unwrap_or_default(),
                matched_text: m.matched_text.clone(),
                score: m.score,
                begin_ms: m.begin_ms,
                end_ms: m.end_ms,
                words: realigned.map(|w| word_changes(w)).unwrap_or_default(),
                removed_token_count: realigned.map_or(0, |w| w.removed_tokens.len()),
            }
        })
        .collect();

    AlignmentSummary {
        block_id: run.block_id.clone(),
        status: conversion_status(run),
        outcome: run.outcome.clone(),
        metadata: ConversionMetadata::from_run(run),
        begin_ms: run.begin_ms(),
        end_ms: run.end_ms(),
        marked_content: None,
        sentences,
    }
}

fn word_changes(alignment: &WordAlignment) -> Vec<WordChange> {
    alignment
        .words
        .iter()
        .map(|w| {
            let change = match (&w.origin, &w.original_word) {
                (WordOrigin::Inserted, _) | (_, None) => WordChangeKind::Inserted,
                (WordOrigin::Token(_), Some(original)) if original == &w.word => {
                    WordChangeKind::Unchanged
                }
                (WordOrigin::Token(_), Some(_)) => WordChangeKind::Respelled,
            };
            WordChange {
                word: w.word.clone(),
                original_word: w.original_word.clone(),
                begin_ms: w.begin_ms,
                end_ms: w.end_ms,
                change,
            }
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct AlignmentReport {
    pub schema_version: u32,
    pub meta: ReportMeta,
    pub blocks: Vec<AlignmentSummary>,
    pub aggregates: AggregateReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportMeta {
    pub generated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_path: Option<String>,
    pub case_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateReport {
    pub blocks: usize,
    pub completed: usize,
    pub partially_converted: usize,
    pub unaligned: usize,
    pub sentences: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_score: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_score: Option<f32>,
    pub inserted_words: usize,
    pub respelled_words: usize,
    pub removed_tokens: usize,
}

pub fn aggregate_summaries(blocks: &[AlignmentSummary]) -> AggregateReport {
    let count_status =
        |status: ConversionStatus| blocks.iter().filter(|b| b.status == status).count();
    let sentences: Vec<&SentenceSummary> = blocks.iter().flat_map(|b| &b.sentences).collect();
    let count_words = |kind: WordChangeKind| {
        sentences
            .iter()
            .flat_map(|s| &s.words)
            .filter(|w| w.change == kind)
            .count()
    };

    let scores: Vec<f32> = sentences.iter().map(|s| s.score).collect();
    let mean_score =
        (!scores.is_empty()).then(|| scores.iter().sum::<f32>() / scores.len() as f32);
    let min_score = scores.iter().copied().reduce(f32::min);

    AggregateReport {
        blocks: blocks.len(),
        completed: count_status(ConversionStatus::Completed),
        partially_converted: count_status(ConversionStatus::PartiallyConverted),
        unaligned: count_status(ConversionStatus::Unaligned),
        sentences: sentences.len(),
        mean_score,
        min_score,
        inserted_words: count_words(WordChangeKind::Inserted),
        respelled_words: count_words(WordChangeKind::Respelled),
        removed_tokens: sentences.iter().map(|s| s.removed_token_count).sum(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AlignedWord, AlignmentMatch, TextBlock};

    fn make_match(id: &str, text: &str, start: usize, score: f32) -> AlignmentMatch {
        AlignmentMatch {
            utterance_id: id.to_string(),
            matched_text: text.to_string(),
            start,
            end: start + text.len(),
            score,
            begin_ms: 100,
            end_ms: 900,
        }
    }

    fn make_run(leading: &str, matches: Vec<AlignmentMatch>, trailing: &str) -> AlignmentRun {
        AlignmentRun {
            block_id: "b1".to_string(),
            matches,
            leading_text: leading.to_string(),
            trailing_text: trailing.to_string(),
            outcome: RunOutcome::Completed,
        }
    }

    #[test]
    fn status_follows_leftover_text() {
        let full = make_run("", vec![make_match("s1", "Hi.", 0, 0.9)], "  ");
        assert_eq!(conversion_status(&full), ConversionStatus::Completed);

        let partial = make_run("Intro. ", vec![make_match("s1", "Hi.", 7, 0.9)], "");
        assert_eq!(conversion_status(&partial), ConversionStatus::PartiallyConverted);

        let none = AlignmentRun::unaligned(
            &TextBlock::new("b1", "text"),
            RunOutcome::NoConfidentStart { best_score: 0.1 },
        );
        assert_eq!(conversion_status(&none), ConversionStatus::Unaligned);
    }

    #[test]
    fn metadata_counts_characters() {
        let run = make_run(
            "Él: ",
            vec![make_match("s1", "sí, ", 5, 0.8), make_match("s2", "no.", 10, 0.7)],
            " fin",
        );
        let metadata = ConversionMetadata::from_run(&run);
        assert_eq!(metadata.aligned_sentences_count, 2);
        assert_eq!(metadata.prefix_length, 4);
        assert_eq!(metadata.aligned_length, 7);
        assert_eq!(metadata.remaining_length, 4);
        assert_eq!(metadata.total_length, 15);
        assert_eq!(metadata.alignment_method, "string_similarity");
    }

    #[test]
    fn marked_content_round_trips_through_strip() {
        let run = make_run(
            "Intro. ",
            vec![make_match("s-1", "One.", 7, 0.9), make_match("s-2", " Two.", 11, 0.9)],
            " Outro.",
        );
        let marked = render_marked_content(&run);
        assert_eq!(marked, "Intro. [[s-1]][[s-2]] Outro.");
        assert_eq!(strip_alignment_markers(&marked), "Intro.  Outro.");
    }

    #[test]
    fn strip_leaves_unmarked_text_borrowed() {
        let text = "No markers [here] or [[ ]] there";
        let stripped = strip_alignment_markers(text);
        assert!(matches!(stripped, Cow::Owned(_)));
        assert_eq!(stripped, "No markers [here] or  there");

        let plain = strip_alignment_markers("plain text");
        assert!(matches!(plain, Cow::Borrowed("plain text")));
    }

    #[test]
    fn summary_classifies_word_changes() {
        let run = make_run("", vec![make_match("s1", "Hello, world.", 0, 0.95)], "");
        let utterance = Utterance::new("s1", "hello word", 100, 900);
        let words = WordAlignment {
            utterance_id: "s1".to_string(),
            words: vec![
                AlignedWord {
                    word: "Hello".to_string(),
                    original_word: Some("Hello".to_string()),
                    begin_ms: 100,
                    end_ms: 400,
                    origin: WordOrigin::Token(0),
                },
                AlignedWord {
                    word: "world".to_string(),
                    original_word: Some("word".to_string()),
                    begin_ms: 400,
                    end_ms: 700,
                    origin: WordOrigin::Token(1),
                },
                AlignedWord {
                    word: "again".to_string(),
                    original_word: None,
                    begin_ms: 700,
                    end_ms: 900,
                    origin: WordOrigin::Inserted,
                },
            ],
            removed_tokens: vec![2],
            ..WordAlignment::default()
        };

        let summary = summarize_run(&run, &[utterance], &[words]);
        assert_eq!(summary.status, ConversionStatus::Completed);
        assert_eq!(summary.sentences[0].original_text, "hello word");
        let kinds: Vec<WordChangeKind> =
            summary.sentences[0].words.iter().map(|w| w.change).collect();
        assert_eq!(
            kinds,
            vec![
                WordChangeKind::Unchanged,
                WordChangeKind::Respelled,
                WordChangeKind::Inserted
            ]
        );

        let aggregates = aggregate_summaries(&[summary]);
        assert_eq!(aggregates.completed, 1);
        assert_eq!(aggregates.sentences, 1);
        assert_eq!(aggregates.inserted_words, 1);
        assert_eq!(aggregates.respelled_words, 1);
        assert_eq!(aggregates.removed_tokens, 1);
        assert_eq!(aggregates.min_score, Some(0.95));
    }

    #[test]
    fn aggregates_of_nothing_have_no_scores() {
        let aggregates = aggregate_summaries(&[]);
        assert_eq!(aggregates.blocks, 0);
        assert_eq!(aggregates.mean_score, None);
        assert_eq!(aggregates.min_score, None);
    }
}
