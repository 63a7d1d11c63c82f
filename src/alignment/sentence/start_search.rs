use super::SentenceContext;
use crate::alignment::normalize::{char_prefix, normalize, NormalizedText};

/// Finds the byte offset in the block where the first utterance most likely begins.
///
/// A close prefix match pins the start to 0. Otherwise a window of
/// `min(2 * prefix_len, cap)` characters slides across the block; the best window is
/// then narrowed to the prefix-length position inside it that scores highest.
pub(super) fn locate_start(
    block: &NormalizedText,
    utterance_text: &str,
    ctx: &SentenceContext<'_>,
) -> usize {
    let windows = &ctx.config.windows;
    let utterance = normalize(utterance_text);
    if block.is_empty() || utterance.is_empty() {
        return 0;
    }

    let probe = char_prefix(&utterance, windows.start_probe_chars);
    let probe_score = ctx
        .scorer
        .similarity(probe, block.prefix(windows.start_probe_chars));
    if probe_score >= ctx.config.thresholds.start_probe {
        tracing::debug!(
            probe_score = format!("{:.3}", probe_score),
            "sentence: first utterance starts at block start"
        );
        return 0;
    }

    let prefix = char_prefix(&utterance, windows.start_prefix_chars)
        .trim_start_matches(|c: char| ctx.config.punctuation.is_quote(c))
        .trim_start();
    let prefix_len = prefix.chars().count();
    if prefix_len == 0 {
        return 0;
    }
    let window_len = (prefix_len * 2).min(windows.start_window_cap).max(prefix_len);

    let mut best_index = 0usize;
    let mut best_score = -1.0f32;
    let last_start = block.len().saturating_sub(prefix_len);
    for i in 0..=last_start {
        let score = ctx.scorer.similarity(prefix, block.slice(i, i + window_len));
        if score > best_score {
            best_score = score;
            best_index = i;
        }
    }

    let refine_end = (best_index + window_len - prefix_len).min(last_start);
    let mut start_index = best_index;
    let mut refined_score = -1.0f32;
    for j in best_index..=refine_end {
        let score = ctx.scorer.similarity(prefix, block.slice(j, j + prefix_len));
        if score > refined_score {
            refined_score = score;
            start_index = j;
        }
    }

    let opens_with_quote = block
        .char_at(0)
        .is_some_and(|c| ctx.config.punctuation.is_quote(c));
    if opens_with_quote && start_index <= windows.quote_snap_max_offset {
        start_index = 0;
    }

    tracing::debug!(
        probe_score = format!("{:.3}", probe_score),
        window_len,
        window_score = format!("{:.3}", best_score),
        refined_score = format!("{:.3}", refined_score),
        start_index,
        "sentence: searched for first utterance start"
    );

    if start_index == 0 {
        0
    } else {
        block.original_start(start_index)
    }
}
