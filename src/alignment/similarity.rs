use std::cell::RefCell;
use std::cmp::Ordering;

thread_local! {
    // Reused bigram buffers; the scorer runs thousands of times per block.
    static BIGRAM_SCRATCH: RefCell<(Vec<(char, char)>, Vec<(char, char)>)> =
        const { RefCell::new((Vec::new(), Vec::new())) };
}

/// Sørensen–Dice coefficient over character bigrams.
///
/// Whitespace is ignored and comparison is case-insensitive. Returns 1.0 for equal
/// inputs and 0.0 when either side has fewer than two characters and they differ.
/// Bigrams are counted as a multiset, so repeated pairs only match as often as they
/// occur on both sides.
pub fn dice_coefficient(a: &str, b: &str) -> f32 {
    BIGRAM_SCRATCH.with(|scratch| {
        let mut scratch = scratch.borrow_mut();
        let (left, right) = &mut *scratch;
        let left_len = fill_bigrams(a, left);
        let right_len = fill_bigrams(b, right);

        if left_len == right_len && left == right {
            return 1.0;
        }
        if left_len < 2 || right_len < 2 {
            return 0.0;
        }

        left.sort_unstable();
        right.sort_unstable();
        let shared = count_shared(left, right);
        (2 * shared) as f32 / (left.len() + right.len()) as f32
    })
}

/// Fills `out` with the bigrams of `text` (lower-cased, whitespace removed) and
/// returns the number of characters that took part.
fn fill_bigrams(text: &str, out: &mut Vec<(char, char)>) -> usize {
    out.clear();
    let mut prev: Option<char> = None;
    let mut count = 0usize;
    for c in text
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
    {
        count += 1;
        if let Some(p) = prev {
            out.push((p, c));
        }
        prev = Some(c);
    }
    // A single char has no bigrams; keep it so equal one-char inputs still compare equal.
    if count == 1 {
        if let Some(p) = prev {
            out.push((p, '\0'));
        }
    }
    count
}

fn count_shared(left: &[(char, char)], right: &[(char, char)]) -> usize {
    let (mut i, mut j, mut shared) = (0, 0, 0);
    while i < left.len() && j < right.len() {
        match left[i].cmp(&right[j]) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                shared += 1;
                i += 1;
                j += 1;
            }
        }
    }
    shared
}
