use super::suffix_snap::snap_to_utterance_suffix;
use super::SentenceContext;
use crate::alignment::normalize::{normalize, NormalizedText};

#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) enum WindowOutcome {
    /// `end` is a byte offset into the available text.
    Matched { end: usize, score: f32 },
    NoMatch { best_score: f32 },
}

/// Places one utterance at the start of `available` and decides where it ends.
pub(super) fn match_at(
    available: &str,
    utterance_text: &str,
    ctx: &SentenceContext<'_>,
) -> WindowOutcome {
    let text = NormalizedText::new(available);
    let utterance = normalize(utterance_text);
    let basic = utterance.chars().count();
    if text.is_empty() || basic == 0 {
        return WindowOutcome::NoMatch { best_score: 0.0 };
    }

    let basic_len = basic.min(text.len());
    let extended_len = extended_length(&text, utterance_text, basic, ctx);

    let basic_score = ctx.scorer.similarity(&utterance, text.prefix(basic_len));
    let extended_score = ctx.scorer.similarity(&utterance, text.prefix(extended_len));
    let (mut best_len, mut best_score) = if extended_score > basic_score {
        (extended_len, extended_score)
    } else {
        (basic_len, basic_score)
    };

    let thresholds = &ctx.config.thresholds;
    let windows = &ctx.config.windows;
    if best_score < thresholds.confident_match && basic > windows.retry_min_length {
        let floor = (basic as f32 * windows.retry_floor_ratio).ceil() as usize;
        let mut len = basic.saturating_sub(windows.retry_step);
        while len >= floor.max(1) {
            let score = ctx.scorer.similarity(&utterance, text.prefix(len));
            if score > best_score {
                best_score = score;
                best_len = len.min(text.len());
            }
            len = match len.checked_sub(windows.retry_step) {
                Some(next) => next,
                None => break,
            };
        }
    }

    tracing::debug!(
        basic_len,
        extended_len,
        basic_score = format!("{:.3}", basic_score),
        extended_score = format!("{:.3}", extended_score),
        best_len,
        best_score = format!("{:.3}", best_score),
        "sentence: scored match windows"
    );

    if best_score < thresholds.min_match {
        return WindowOutcome::NoMatch { best_score };
    }

    let raw_end = text.original_end(best_len);
    let punctuation = &ctx.config.punctuation;
    let kept = ctx.boundary.optimize(&available[..raw_end], punctuation);
    let snapped = snap_to_utterance_suffix(
        available,
        kept,
        utterance_text,
        punctuation,
        windows.suffix_lookahead,
    );
    let end = available[..snapped].trim_end().len();
    if available[..end].trim_start().is_empty() {
        return WindowOutcome::NoMatch { best_score };
    }

    WindowOutcome::Matched {
        end,
        score: best_score,
    }
}

/// Window length (in normalized chars) that also covers the punctuation closing the
/// utterance, capped at the available text.
fn extended_length(
    text: &NormalizedText,
    utterance_text: &str,
    basic: usize,
    ctx: &SentenceContext<'_>,
) -> usize {
    let windows = &ctx.config.windows;
    let punctuation = &ctx.config.punctuation;

    if !punctuation.ends_terminal(utterance_text) {
        return round_scaled(basic, windows.open_extension_ratio).min(text.len());
    }

    let from = basic.saturating_sub(windows.punctuation_lookback);
    let to = (basic * 2).min(text.len());
    let stop = (from..to).find(|&i| text.char_at(i).is_some_and(|c| punctuation.is_stop(c)));
    let Some(stop) = stop else {
        return round_scaled(basic, windows.terminal_extension_ratio).min(text.len());
    };

    let mut end = stop + 1;
    let mut closers = 0;
    while closers < 2 && text.char_at(end).is_some_and(|c| punctuation.is_closing(c)) {
        end += 1;
        closers += 1;
    }

    let open_quotes = text
        .prefix(end)
        .chars()
        .filter(|&c| punctuation.is_quote(c))
        .count();
    if open_quotes % 2 == 1 {
        let limit = (end + windows.closing_quote_lookahead).min(text.len());
        if let Some(quote) =
            (end..limit).find(|&i| text.char_at(i).is_some_and(|c| punctuation.is_quote(c)))
        {
            end = quote + 1;
        }
    }

    if text.char_at(end) == Some(' ') {
        end += 1;
    }
    end.min(text.len())
}

fn round_scaled(len: usize, ratio: f32) -> usize {
    (len as f32 * ratio).round() as usize
}
