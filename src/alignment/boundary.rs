use super::punctuation::PunctuationSet;

/// Reshapes a raw match window to a defensible linguistic boundary and returns the
/// byte length of `window` to keep.
///
/// Rules are tried in order and the first one that applies wins:
/// 1. already ends in terminal punctuation (optionally followed by quote/space): keep;
/// 2. last sentence break (`". "`, `"! "`, `"? "`, full-width stops) past the midpoint: cut after it;
/// 3. last clause break (`", "`, `"; "`) past 75% of the window: cut after it;
/// 4. odd number of quotes and the second-to-last quote past the midpoint: cut after it;
/// 5. otherwise keep the window unchanged.
///
/// Knows nothing about scores; only the shape of the text matters.
pub fn optimize_boundary(window: &str, punctuation: &PunctuationSet) -> usize {
    if window.is_empty() || punctuation.ends_terminal(window) {
        return window.len();
    }

    let chars: Vec<(usize, char)> = window.char_indices().collect();
    let n = chars.len();

    if let Some((pos, cut)) = last_break(&chars, window.len(), |c| punctuation.is_sentence_end(c))
    {
        if pos * 2 > n {
            tracing::debug!(pos, n, rule = "sentence", "boundary: truncating window");
            return cut;
        }
    }

    if let Some((pos, cut)) = last_break(&chars, window.len(), |c| punctuation.is_clause_end(c)) {
        if pos * 4 > n * 3 {
            tracing::debug!(pos, n, rule = "clause", "boundary: truncating window");
            return cut;
        }
    }

    let quote_positions: Vec<usize> = chars
        .iter()
        .enumerate()
        .filter(|(_, (_, c))| punctuation.is_quote(*c))
        .map(|(i, _)| i)
        .collect();
    if quote_positions.len() % 2 == 1 && quote_positions.len() >= 2 {
        let pos = quote_positions[quote_positions.len() - 2];
        if pos * 2 > n {
            tracing::debug!(pos, n, rule = "quote", "boundary: truncating window");
            let (offset, c) = chars[pos];
            return offset + c.len_utf8();
        }
    }

    window.len()
}

/// Last punctuation mark that is followed by whitespace (or is full-width, which needs
/// none). Returns its char position and the byte offset just past the break.
fn last_break(
    chars: &[(usize, char)],
    total_len: usize,
    is_mark: impl Fn(char) -> bool,
) -> Option<(usize, usize)> {
    for pos in (0..chars.len()).rev() {
        let (offset, c) = chars[pos];
        if !is_mark(c) {
            continue;
        }
        match chars.get(pos + 1) {
            Some(&(next_offset, next)) if next.is_whitespace() => {
                return Some((pos, next_offset + next.len_utf8()));
            }
            _ if PunctuationSet::is_full_width(c) => {
                return Some((pos, offset + c.len_utf8()));
            }
            None => return Some((pos, total_len)),
            _ => {}
        }
    }
    None
}
