use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::alignment::punctuation::PunctuationSet;
use crate::error::AlignmentError;

/// Tuning knobs for the whole engine. Every field has a default, so a partial JSON
/// file only needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignerConfig {
    pub thresholds: Thresholds,
    pub windows: MatchWindows,
    pub words: WordTimingPolicy,
    pub punctuation: PunctuationSet,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Score a match must reach to be kept in the chain.
    pub confident_match: f32,
    /// Below this the window search reports no match at all.
    pub min_match: f32,
    /// Prefix similarity that lets the first utterance start at offset 0 without searching.
    pub start_probe: f32,
    pub word_match: f32,
    pub word_split_merge: f32,
    /// Score recorded for forced 1:1 word mappings.
    pub word_score_floor: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            confident_match: 0.6,
            min_match: 0.4,
            start_probe: 0.6,
            word_match: 0.8,
            word_split_merge: 0.7,
            word_score_floor: 0.3,
        }
    }
}

/// Window sizes, in normalized characters unless noted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchWindows {
    pub start_probe_chars: usize,
    pub start_prefix_chars: usize,
    pub start_window_cap: usize,
    pub quote_snap_max_offset: usize,
    pub punctuation_lookback: usize,
    pub closing_quote_lookahead: usize,
    pub retry_min_length: usize,
    pub retry_step: usize,
    pub retry_floor_ratio: f32,
    pub terminal_extension_ratio: f32,
    pub open_extension_ratio: f32,
    pub suffix_lookahead: usize,
}

impl Default for MatchWindows {
    fn default() -> Self {
        Self {
            start_probe_chars: 20,
            start_prefix_chars: 30,
            start_window_cap: 30,
            quote_snap_max_offset: 3,
            punctuation_lookback: 10,
            closing_quote_lookahead: 20,
            retry_min_length: 20,
            retry_step: 5,
            retry_floor_ratio: 0.7,
            terminal_extension_ratio: 1.5,
            open_extension_ratio: 1.3,
            suffix_lookahead: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WordTimingPolicy {
    /// Duration given to words extrapolated past the last known boundary.
    pub nominal_word_ms: u64,
    /// Largest run of words combined when testing for a split or merge.
    pub max_group_size: usize,
}

impl Default for WordTimingPolicy {
    fn default() -> Self {
        Self {
            nominal_word_ms: 200,
            max_group_size: 3,
        }
    }
}

impl AlignerConfig {
    pub fn load(path: &Path) -> Result<Self, AlignmentError> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| AlignmentError::io("read aligner config", e))?;
        serde_json::from_str(&data).map_err(|e| AlignmentError::json("parse aligner config", e))
    }

    pub fn validate(&self) -> Result<(), AlignmentError> {
        let t = &self.thresholds;
        for (name, value) in [
            ("confident_match", t.confident_match),
            ("min_match", t.min_match),
            ("start_probe", t.start_probe),
            ("word_match", t.word_match),
            ("word_split_merge", t.word_split_merge),
            ("word_score_floor", t.word_score_floor),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(AlignmentError::invalid_input(format!(
                    "threshold {name} must lie in [0, 1], got {value}"
                )));
            }
        }
        if t.min_match > t.confident_match {
            return Err(AlignmentError::invalid_input(format!(
                "min_match ({}) must not exceed confident_match ({})",
                t.min_match, t.confident_match
            )));
        }

        let w = &self.windows;
        if w.start_probe_chars == 0 || w.start_prefix_chars == 0 || w.start_window_cap == 0 {
            return Err(AlignmentError::invalid_input(
                "start search windows must be non-empty",
            ));
        }
        if w.retry_step == 0 {
            return Err(AlignmentError::invalid_input("retry_step must be at least 1"));
        }
        if !(0.0..=1.0).contains(&w.retry_floor_ratio) {
            return Err(AlignmentError::invalid_input(
                "retry_floor_ratio must lie in [0, 1]",
            ));
        }
        if w.terminal_extension_ratio < 1.0 || w.open_extension_ratio < 1.0 {
            return Err(AlignmentError::invalid_input(
                "extension ratios must be at least 1.0",
            ));
        }

        if self.words.max_group_size < 2 {
            return Err(AlignmentError::invalid_input(
                "max_group_size must be at least 2",
            ));
        }
        if self.punctuation.sentence_end.is_empty() {
            return Err(AlignmentError::invalid_input(
                "punctuation.sentence_end must not be empty",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aligner_config_default() {
        let config = AlignerConfig::default();
        assert_eq!(config.thresholds.confident_match, 0.6);
        assert_eq!(config.thresholds.min_match, 0.4);
        assert_eq!(config.thresholds.word_match, 0.8);
        assert_eq!(config.thresholds.word_split_merge, 0.7);
        assert_eq!(config.windows.start_probe_chars, 20);
        assert_eq!(config.words.nominal_word_ms, 200);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let json = r#"{
            "thresholds": { "confident_match": 0.7 },
            "words": { "nominal_word_ms": 250 }
        }"#;
        let config: AlignerConfig = serde_json::from_str(json).expect("valid config json");
        assert_eq!(config.thresholds.confident_match, 0.7);
        assert_eq!(config.thresholds.min_match, 0.4);
        assert_eq!(config.words.nominal_word_ms, 250);
        assert_eq!(config.words.max_group_size, 3);
        assert_eq!(config.windows, MatchWindows::default());
    }

    #[test]
    fn custom_punctuation_from_json() {
        let json = r#"{ "punctuation": { "sentence_end": ["."], "quotes": ["'"] } }"#;
        let config: AlignerConfig = serde_json::from_str(json).expect("valid config json");
        assert_eq!(config.punctuation.sentence_end, vec!['.']);
        assert_eq!(config.punctuation.quotes, vec!['\'']);
        assert_eq!(
            config.punctuation.clause_end,
            PunctuationSet::default().clause_end
        );
    }

    #[test]
    fn validate_rejects_inverted_thresholds() {
        let mut config = AlignerConfig::default();
        config.thresholds.min_match = 0.9;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_out_of_range_threshold() {
        let mut config = AlignerConfig::default();
        config.thresholds.word_match = 1.5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("word_match"));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = AlignerConfig::load(Path::new("/nonexistent/aligner.json")).unwrap_err();
        assert!(matches!(err, AlignmentError::Io { .. }));
    }

    #[test]
    fn load_round_trips_through_temp_file() {
        let path = std::env::temp_dir().join("transcript_align_config_load.json");
        std::fs::write(&path, r#"{"thresholds":{"min_match":0.3}}"#).expect("write config");
        let config = AlignerConfig::load(&path).expect("load config");
        assert_eq!(config.thresholds.min_match, 0.3);
        let _ = std::fs::remove_file(&path);
    }
}
