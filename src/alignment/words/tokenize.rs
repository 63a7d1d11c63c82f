use std::sync::LazyLock;

use regex::Regex;

/// Letter/digit runs, allowing internal hyphens and apostrophes (`don't`, `well-known`).
static WORD_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\p{L}\p{N}]+(?:['’\-][\p{L}\p{N}]+)*").expect("Invalid word regex")
});

/// Words of `text` in order, punctuation-only runs dropped.
pub fn extract_words(text: &str) -> Vec<String> {
    WORD_PATTERN
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}
