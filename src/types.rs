use serde::{Deserialize, Serialize};

/// Canonical written text for one paragraph-like unit. Never mutated by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextBlock {
    pub id: String,
    pub content: String,
}

impl TextBlock {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
        }
    }
}

/// One recognized word. Interval is `[begin_ms, end_ms]` on the recording clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub begin_ms: u64,
    pub end_ms: u64,
}

impl Token {
    pub fn new(text: impl Into<String>, begin_ms: u64, end_ms: u64) -> Self {
        Self {
            text: text.into(),
            begin_ms,
            end_ms,
        }
    }
}

/// One ASR sentence. Tokens are time-sorted and non-overlapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utterance {
    pub id: String,
    #[serde(default)]
    pub speech_id: String,
    pub text: String,
    pub begin_ms: u64,
    pub end_ms: u64,
    #[serde(default)]
    pub tokens: Vec<Token>,
}

impl Utterance {
    pub fn new(id: impl Into<String>, text: impl Into<String>, begin_ms: u64, end_ms: u64) -> Self {
        Self {
            id: id.into(),
            speech_id: String::new(),
            text: text.into(),
            begin_ms,
            end_ms,
            tokens: Vec::new(),
        }
    }

    pub fn with_tokens(mut self, tokens: Vec<Token>) -> Self {
        self.tokens = tokens;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignmentMatch {
    pub utterance_id: String,
    /// Exact substring of the block content.
    pub matched_text: String,
    /// Byte offset of `matched_text` in the block content.
    pub start: usize,
    /// Byte offset one past the end of `matched_text`.
    pub end: usize,
    /// Similarity of the winning window in [0, 1].
    pub score: f32,
    pub begin_ms: u64,
    pub end_ms: u64,
}

/// Why a run stopped where it did. None of these are errors.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunOutcome {
    /// Every utterance was placed.
    Completed,
    /// The block text ran out before the utterances did.
    TextExhausted { unused_utterances: usize },
    /// A later utterance scored below threshold; the remainder is trailing text.
    ChainTerminated { utterance_id: String, score: f32 },
    /// The first utterance could not be placed; the whole block is leading text.
    NoConfidentStart { best_score: f32 },
    /// Empty block or empty utterance list.
    DegenerateInput,
}

/// Sentence-level result for one block.
///
/// `leading_text + concat(matched_text) + trailing_text == content` always holds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignmentRun {
    pub block_id: String,
    pub matches: Vec<AlignmentMatch>,
    pub leading_text: String,
    pub trailing_text: String,
    pub outcome: RunOutcome,
}

impl AlignmentRun {
    pub(crate) fn unaligned(block: &TextBlock, outcome: RunOutcome) -> Self {
        Self {
            block_id: block.id.clone(),
            matches: Vec::new(),
            leading_text: block.content.clone(),
            trailing_text: String::new(),
            outcome,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Reassembles the partition.
    pub fn reconstruct(&self) -> String {
        let mut out = self.leading_text.clone();
        for m in &self.matches {
            out.push_str(&m.matched_text);
        }
        out.push_str(&self.trailing_text);
        out
    }

    pub fn is_lossless(&self, content: &str) -> bool {
        self.reconstruct() == content
    }

    pub fn offsets(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.matches.iter().map(|m| (m.start, m.end))
    }

    pub fn begin_ms(&self) -> Option<u64> {
        self.matches.first().map(|m| m.begin_ms)
    }

    pub fn end_ms(&self) -> Option<u64> {
        self.matches.last().map(|m| m.end_ms)
    }
}

/// Sentence run plus the word re-timing of each of its matches, in match order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockAlignment {
    pub run: AlignmentRun,
    pub words: Vec<WordAlignment>,
}

/// Events handed to progress callbacks while a run is in flight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AlignmentProgress<'a> {
    Matched {
        index: usize,
        alignment: &'a AlignmentMatch,
    },
    Stopped {
        matched: usize,
        outcome: &'a RunOutcome,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingKind {
    Match,
    Split,
    Merge,
    Deletion,
    Insertion,
}

/// One entry of a word map. `sources` index the original tokens, `targets` index
/// the words extracted from the matched text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordMapping {
    pub kind: MappingKind,
    pub sources: Vec<usize>,
    pub targets: Vec<usize>,
    pub score: f32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct WordAlignmentMap {
    pub source_words: Vec<String>,
    pub target_words: Vec<String>,
    pub entries: Vec<WordMapping>,
}

impl WordAlignmentMap {
    /// True when every target index is covered by exactly one entry.
    pub fn covers_targets_exactly(&self) -> bool {
        let mut seen = vec![0u32; self.target_words.len()];
        for entry in &self.entries {
            for &t in &entry.targets {
                match seen.get_mut(t) {
                    Some(count) => *count += 1,
                    None => return false,
                }
            }
        }
        seen.iter().all(|&count| count == 1)
    }

    /// Original token indices mapped to nothing.
    pub fn deleted_sources(&self) -> Vec<usize> {
        self.entries
            .iter()
            .filter(|e| e.kind == MappingKind::Deletion)
            .flat_map(|e| e.sources.iter().copied())
            .collect()
    }
}

/// Identity of a produced word relative to the stored tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "token_index", rename_all = "snake_case")]
pub enum WordOrigin {
    /// Keeps the identity of an existing token (1:1, first split segment, merge representative).
    Token(usize),
    /// A new entry with no stored counterpart.
    Inserted,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignedWord {
    pub word: String,
    /// Pre-alignment wording, `None` for inserted words.
    pub original_word: Option<String>,
    pub begin_ms: u64,
    pub end_ms: u64,
    pub origin: WordOrigin,
}

/// Word-level result for one utterance.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct WordAlignment {
    pub utterance_id: String,
    pub map: WordAlignmentMap,
    pub words: Vec<AlignedWord>,
    /// Token indices whose stored identity must be removed (deletions and merged-away tokens).
    pub removed_tokens: Vec<usize>,
}

impl WordAlignment {
    pub fn is_noop(&self) -> bool {
        self.words.is_empty() && self.removed_tokens.is_empty() && self.map.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_match(text: &str, start: usize) -> AlignmentMatch {
        AlignmentMatch {
            utterance_id: "u".to_string(),
            matched_text: text.to_string(),
            start,
            end: start + text.len(),
            score: 1.0,
            begin_ms: 0,
            end_ms: 10,
        }
    }

    #[test]
    fn reconstruct_joins_all_segments() {
        let run = AlignmentRun {
            block_id: "b".to_string(),
            matches: vec![sample_match("one ", 4), sample_match("two", 8)],
            leading_text: "pre ".to_string(),
            trailing_text: " post".to_string(),
            outcome: RunOutcome::Completed,
        };
        assert_eq!(run.reconstruct(), "pre one two post");
        assert!(run.is_lossless("pre one two post"));
        assert_eq!(run.offsets().collect::<Vec<_>>(), vec![(4, 8), (8, 11)]);
    }

    #[test]
    fn coverage_detects_duplicates_and_gaps() {
        let mut map = WordAlignmentMap {
            source_words: vec!["a".into()],
            target_words: vec!["a".into(), "b".into()],
            entries: vec![WordMapping {
                kind: MappingKind::Match,
                sources: vec![0],
                targets: vec![0],
                score: 1.0,
            }],
        };
        assert!(!map.covers_targets_exactly());
        map.entries.push(WordMapping {
            kind: MappingKind::Insertion,
            sources: vec![],
            targets: vec![1],
            score: 0.0,
        });
        assert!(map.covers_targets_exactly());
        map.entries.push(WordMapping {
            kind: MappingKind::Insertion,
            sources: vec![],
            targets: vec![1],
            score: 0.0,
        });
        assert!(!map.covers_targets_exactly());
    }

    #[test]
    fn unaligned_run_keeps_whole_content_as_leading() {
        let block = TextBlock::new("b1", "Nothing to see.");
        let run = AlignmentRun::unaligned(&block, RunOutcome::DegenerateInput);
        assert!(run.is_empty());
        assert_eq!(run.leading_text, "Nothing to see.");
        assert!(run.is_lossless(&block.content));
    }
}
