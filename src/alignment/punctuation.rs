use serde::{Deserialize, Serialize};

/// Punctuation classes used by boundary decisions.
///
/// Defaults cover Latin and CJK text; callers aligning other scripts replace the
/// sets through [`crate::AlignerConfig::punctuation`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PunctuationSet {
    pub sentence_end: Vec<char>,
    pub clause_end: Vec<char>,
    /// Closing brackets and quotes that may trail a sentence.
    pub closing: Vec<char>,
    /// Quote marks counted for balance. Apostrophes are deliberately absent.
    pub quotes: Vec<char>,
}

impl Default for PunctuationSet {
    fn default() -> Self {
        Self {
            sentence_end: vec!['.', '!', '?', '…', '。', '！', '？'],
            clause_end: vec![',', ';', ':', '，', '；', '：', '、'],
            closing: vec![
                '"', '\'', ')', ']', '}', '”', '’', '»', '」', '』', '）', '】', '》',
            ],
            quotes: vec!['"', '“', '”', '«', '»', '「', '」', '『', '』'],
        }
    }
}

impl PunctuationSet {
    pub fn is_sentence_end(&self, c: char) -> bool {
        self.sentence_end.contains(&c)
    }

    pub fn is_clause_end(&self, c: char) -> bool {
        self.clause_end.contains(&c)
    }

    pub fn is_closing(&self, c: char) -> bool {
        self.closing.contains(&c)
    }

    pub fn is_quote(&self, c: char) -> bool {
        self.quotes.contains(&c)
    }

    /// Any character that may end an utterance: `.!?,;:"')]}` and the CJK forms.
    pub fn is_terminal(&self, c: char) -> bool {
        self.is_sentence_end(c) || self.is_clause_end(c) || self.is_closing(c)
    }

    /// Terminal punctuation that is not a quote or bracket.
    pub fn is_stop(&self, c: char) -> bool {
        self.is_sentence_end(c) || self.is_clause_end(c)
    }

    pub fn is_closing_quote(&self, c: char) -> bool {
        self.is_closing(c) && (self.is_quote(c) || c == '\'' || c == '’')
    }

    /// Full-width marks end a unit without a following space.
    pub fn is_full_width(c: char) -> bool {
        !c.is_ascii() && c != '…'
    }

    /// Whether the text, ignoring trailing whitespace, ends with terminal punctuation.
    /// Closing quotes and brackets count, so `fine."` qualifies.
    pub fn ends_terminal(&self, text: &str) -> bool {
        text.trim_end()
            .chars()
            .next_back()
            .is_some_and(|c| self.is_terminal(c))
    }
}
