/// Lower-cases, collapses whitespace runs to one space and trims both ends.
///
/// Comparison only: offsets reported to callers always refer to the original text.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        out.extend(c.to_lowercase());
    }
    out
}

/// Leading `chars` characters of `text` (the whole text if shorter).
pub fn char_prefix(text: &str, chars: usize) -> &str {
    match text.char_indices().nth(chars) {
        Some((offset, _)) => &text[..offset],
        None => text,
    }
}

/// Normalized text that remembers where each of its characters came from.
///
/// Character `i` of `text` covers the original byte range `spans[i]`. A collapsed
/// whitespace run maps to a single space spanning the whole run.
#[derive(Debug, Clone)]
pub struct NormalizedText {
    text: String,
    /// Byte offset of each normalized char in `text`, plus a final `text.len()` sentinel.
    char_starts: Vec<usize>,
    spans: Vec<(usize, usize)>,
}

impl NormalizedText {
    pub fn new(original: &str) -> Self {
        let mut text = String::with_capacity(original.len());
        let mut char_starts = Vec::with_capacity(original.len() + 1);
        let mut spans = Vec::with_capacity(original.len());
        let mut pending_space: Option<(usize, usize)> = None;

        for (offset, c) in original.char_indices() {
            let end = offset + c.len_utf8();
            if c.is_whitespace() {
                if !text.is_empty() {
                    pending_space = Some(match pending_space {
                        Some((start, _)) => (start, end),
                        None => (offset, end),
                    });
                }
                continue;
            }
            if let Some(span) = pending_space.take() {
                char_starts.push(text.len());
                text.push(' ');
                spans.push(span);
            }
            for lower in c.to_lowercase() {
                char_starts.push(text.len());
                text.push(lower);
                spans.push((offset, end));
            }
        }
        char_starts.push(text.len());

        Self {
            text,
            char_starts,
            spans,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Normalized substring for the char range `[start, end)`, clamped to the text.
    pub fn slice(&self, start: usize, end: usize) -> &str {
        let end = end.min(self.len());
        let start = start.min(end);
        &self.text[self.char_starts[start]..self.char_starts[end]]
    }

    /// Normalized prefix of at most `chars` characters.
    pub fn prefix(&self, chars: usize) -> &str {
        self.slice(0, chars)
    }

    pub fn char_at(&self, index: usize) -> Option<char> {
        self.slice(index, index + 1).chars().next()
    }

    /// Original byte offset where normalized char `index` begins.
    /// `index == len()` maps to the end of the last covered original char.
    pub fn original_start(&self, index: usize) -> usize {
        match self.spans.get(index) {
            Some(&(start, _)) => start,
            None => self.spans.last().map(|&(_, end)| end).unwrap_or(0),
        }
    }

    /// Original byte offset one past the last original char covered by the normalized
    /// range ending at `end` (exclusive). `end == 0` maps to 0.
    pub fn original_end(&self, end: usize) -> usize {
        if end == 0 {
            return 0;
        }
        let idx = end.min(self.len()) - 1;
        self.spans.get(idx).map(|&(_, e)| e).unwrap_or(0)
    }
}
