use crate::config::WordTimingPolicy;
use crate::types::{AlignedWord, MappingKind, Token, WordAlignmentMap, WordOrigin};

/// Concrete words (one per target index) plus the token indices that lose their identity.
pub(super) struct Retimed {
    pub words: Vec<AlignedWord>,
    pub removed_tokens: Vec<usize>,
}

#[derive(Clone)]
struct Slot {
    begin_ms: u64,
    end_ms: u64,
    origin: WordOrigin,
    original_word: Option<String>,
}

/// Turns a word map into timed words.
///
/// Mapped words inherit (or subdivide, or span) token times; insertions are spread over
/// the gap between their mapped neighbours, or extrapolated by `nominal_word_ms` at the
/// edges. Everything ends up inside `[range.0, range.1]` with non-decreasing begin times.
pub(super) fn retime(
    map: &WordAlignmentMap,
    tokens: &[Token],
    range: (u64, u64),
    policy: &WordTimingPolicy,
) -> Retimed {
    let mut slots: Vec<Option<Slot>> = vec![None; map.target_words.len()];
    let mut removed_tokens = Vec::new();

    for entry in &map.entries {
        match entry.kind {
            MappingKind::Match => {
                if let (Some(&s), Some(&t)) = (entry.sources.first(), entry.targets.first()) {
                    if let Some(token) = tokens.get(s) {
                        slots[t] = Some(Slot {
                            begin_ms: token.begin_ms,
                            end_ms: token.end_ms,
                            origin: WordOrigin::Token(s),
                            original_word: Some(token.text.clone()),
                        });
                    }
                }
            }
            MappingKind::Split => {
                let Some((s, token)) = entry
                    .sources
                    .first()
                    .and_then(|&s| tokens.get(s).map(|token| (s, token)))
                else {
                    continue;
                };
                let parts = entry.targets.len() as u64;
                let duration = token.end_ms.saturating_sub(token.begin_ms);
                for (n, &t) in entry.targets.iter().enumerate() {
                    let n = n as u64;
                    let begin_ms = token.begin_ms + duration * n / parts;
                    let end_ms = if n + 1 == parts {
                        token.end_ms
                    } else {
                        token.begin_ms + duration * (n + 1) / parts
                    };
                    slots[t] = Some(Slot {
                        begin_ms,
                        end_ms,
                        origin: if n == 0 { WordOrigin::Token(s) } else { WordOrigin::Inserted },
                        original_word: (n == 0).then(|| token.text.clone()),
                    });
                }
            }
            MappingKind::Merge => {
                let merged: Vec<(usize, &Token)> = entry
                    .sources
                    .iter()
                    .filter_map(|&s| tokens.get(s).map(|token| (s, token)))
                    .collect();
                let (Some(&(representative, _)), Some(&t)) = (merged.first(), entry.targets.first())
                else {
                    continue;
                };
                let begin_ms = merged.iter().map(|(_, tk)| tk.begin_ms).min().unwrap_or(range.0);
                let end_ms = merged.iter().map(|(_, tk)| tk.end_ms).max().unwrap_or(begin_ms);
                let original_word = merged
                    .iter()
                    .map(|(_, tk)| tk.text.as_str())
                    .collect::<Vec<_>>()
                    .join(" ");
                slots[t] = Some(Slot {
                    begin_ms,
                    end_ms,
                    origin: WordOrigin::Token(representative),
                    original_word: Some(original_word),
                });
                removed_tokens.extend(merged.iter().skip(1).map(|&(s, _)| s));
            }
            MappingKind::Deletion => removed_tokens.extend(entry.sources.iter().copied()),
            MappingKind::Insertion => {}
        }
    }

    fill_insertions(&mut slots, range, policy.nominal_word_ms);

    let mut words = Vec::with_capacity(slots.len());
    let mut floor = range.0;
    for (t, slot) in slots.into_iter().enumerate() {
        let Some(slot) = slot else { continue };
        let (begin_ms, end_ms) = clamp_span(slot.begin_ms, slot.end_ms, range, policy.nominal_word_ms);
        let begin_ms = begin_ms.max(floor);
        let end_ms = end_ms.max(begin_ms);
        floor = begin_ms;
        words.push(AlignedWord {
            word: map.target_words[t].clone(),
            original_word: slot.original_word,
            begin_ms,
            end_ms,
            origin: slot.origin,
        });
    }

    removed_tokens.sort_unstable();
    removed_tokens.dedup();
    Retimed {
        words,
        removed_tokens,
    }
}

/// Times every still-empty slot from its mapped neighbours.
fn fill_insertions(slots: &mut [Option<Slot>], range: (u64, u64), nominal_ms: u64) {
    let mut i = 0;
    while i < slots.len() {
        if slots[i].is_some() {
            i += 1;
            continue;
        }
        let run_start = i;
        while i < slots.len() && slots[i].is_none() {
            i += 1;
        }
        let count = (i - run_start) as u64;
        let prev_end = run_start
            .checked_sub(1)
            .and_then(|p| slots[p].as_ref())
            .map(|s| s.end_ms);
        let next_begin = slots.get(i).and_then(|s| s.as_ref()).map(|s| s.begin_ms);

        let spans: Vec<(u64, u64)> = match (prev_end, next_begin) {
            (Some(from), Some(to)) => even_spans(from, to.max(from), count),
            (Some(from), None) => (0..count)
                .map(|n| (from + nominal_ms * n, from + nominal_ms * (n + 1)))
                .collect(),
            (None, Some(to)) => (0..count)
                .map(|n| {
                    let back = count - n;
                    (
                        to.saturating_sub(nominal_ms * back),
                        to.saturating_sub(nominal_ms * (back - 1)),
                    )
                })
                .collect(),
            (None, None) => even_spans(range.0, range.1.max(range.0), count),
        };

        for (slot, (begin_ms, end_ms)) in slots[run_start..i].iter_mut().zip(spans) {
            *slot = Some(Slot {
                begin_ms,
                end_ms,
                origin: WordOrigin::Inserted,
                original_word: None,
            });
        }
    }
}

fn even_spans(from: u64, to: u64, count: u64) -> Vec<(u64, u64)> {
    let width = to - from;
    (0..count)
        .map(|n| {
            let end = if n + 1 == count {
                to
            } else {
                from + width * (n + 1) / count
            };
            (from + width * n / count, end)
        })
        .collect()
}

fn clamp_span(begin_ms: u64, end_ms: u64, range: (u64, u64), nominal_ms: u64) -> (u64, u64) {
    let (lo, hi) = (range.0, range.1.max(range.0));
    let begin = begin_ms.clamp(lo, hi);
    let end = if end_ms < begin_ms {
        begin.saturating_add(nominal_ms).min(hi)
    } else {
        end_ms.clamp(lo, hi)
    };
    (begin, end.max(begin))
}
