use crate::alignment::punctuation::PunctuationSet;

const MIN_SINGLE_WORD_CHARS: usize = 3;

/// Pulls the right edge of a match back to the end of the utterance's own closing words.
///
/// Tries the last `k` words of `utterance_text` for decreasing `k` (a lone word must have
/// at least three characters) and looks for the phrase verbatim inside
/// `available[..match_end]`. On a hit the match ends right after the phrase, extended by
/// up to `lookahead` characters of stop punctuation followed by at most one closing quote.
/// Hits that would discard more than half of the match are ignored.
///
/// Returns the new byte end, or `match_end` when nothing applies.
pub(super) fn snap_to_utterance_suffix(
    available: &str,
    match_end: usize,
    utterance_text: &str,
    punctuation: &PunctuationSet,
    lookahead: usize,
) -> usize {
    let matched = &available[..match_end];
    let words: Vec<&str> = utterance_text.split_whitespace().collect();

    for k in (1..=words.len()).rev() {
        let phrase = words[words.len() - k..].join(" ");
        let phrase = phrase
            .trim_end_matches(|c: char| punctuation.is_terminal(c))
            .trim_start_matches(|c: char| punctuation.is_quote(c));
        if phrase.is_empty() {
            continue;
        }
        if k == 1 && phrase.chars().count() < MIN_SINGLE_WORD_CHARS {
            continue;
        }
        let Some(found) = matched.rfind(phrase) else {
            continue;
        };
        let phrase_end = found + phrase.len();
        if phrase_end * 2 < match_end {
            continue;
        }

        let end = consume_closing_punctuation(available, phrase_end, punctuation, lookahead);
        if end != match_end {
            tracing::debug!(
                words = k,
                phrase,
                from = match_end,
                to = end,
                "sentence: snapped match to utterance suffix"
            );
        }
        return end;
    }

    match_end
}

fn consume_closing_punctuation(
    text: &str,
    from: usize,
    punctuation: &PunctuationSet,
    lookahead: usize,
) -> usize {
    let mut end = from;
    let mut scanned = 0usize;
    let mut chars = text[from..].chars().peekable();

    while let Some(&c) = chars.peek() {
        if scanned >= lookahead || !punctuation.is_stop(c) {
            break;
        }
        end += c.len_utf8();
        scanned += 1;
        chars.next();
    }
    if let Some(&c) = chars.peek() {
        if scanned < lookahead && punctuation.is_closing_quote(c) {
            end += c.len_utf8();
        }
    }
    end
}
