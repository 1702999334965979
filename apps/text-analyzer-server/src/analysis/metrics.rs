//! Text metrics
//!
//! Word characters are the ASCII class `[A-Za-z0-9_]`; everything else,
//! including non-ASCII letters, counts as punctuation.
//!
//! Whitespace is an explicit set rather than Unicode `White_Space`: it
//! includes U+FEFF (byte order mark) and excludes U+0085 (next line).

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Characters treated as whitespace, in character class syntax
const WHITESPACE: &str = r"\t\n\x0B\x0C\r \x{A0}\x{1680}\x{2000}-\x{200A}\x{2028}\x{2029}\x{202F}\x{205F}\x{3000}\x{FEFF}";

/// Anything that is neither a word character nor whitespace.
static NON_WORD_OR_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("[^A-Za-z0-9_{WHITESPACE}]")).expect("valid regex"));

/// Anything that is not a word character.
static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_]").expect("valid regex"));

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("[{WHITESPACE}]+")).expect("valid regex"));

static SENTENCE_TERMINATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+").expect("valid regex"));

/// Statistics derived from a document's content
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TextMetrics {
    pub words_count: u64,
    pub characters_count: u64,
    pub sentences_count: u64,
    pub paragraphs_count: u64,
    pub longest_word: String,
}

impl TextMetrics {
    /// Compute all metrics for `text`
    #[tracing::instrument(skip_all, fields(text_len = text.len()))]
    pub fn compute(text: &str) -> Self {
        let words = normalized_words(text);

        Self {
            words_count: words.iter().filter(|w| !w.is_empty()).count() as u64,
            characters_count: count_word_characters(text),
            sentences_count: count_sentences(text),
            paragraphs_count: count_paragraphs(text),
            longest_word: longest_word(&words).to_string(),
        }
    }
}

/// Strip punctuation, lowercase, split on whitespace runs.
///
/// Leading or trailing whitespace yields empty tokens at the edges.
pub fn normalized_words(text: &str) -> Vec<String> {
    let sanitized = NON_WORD_OR_SPACE.replace_all(text, "").to_lowercase();
    WHITESPACE_RUN
        .split(&sanitized)
        .map(str::to_string)
        .collect()
}

/// First token of maximal length, or `""` when there is none
pub fn longest_word(words: &[String]) -> &str {
    words.iter().fold("", |longest, current| {
        if current.len() > longest.len() {
            current.as_str()
        } else {
            longest
        }
    })
}

pub fn count_word_characters(text: &str) -> u64 {
    NON_WORD.replace_all(text, "").len() as u64
}

pub fn count_sentences(text: &str) -> u64 {
    SENTENCE_TERMINATORS
        .split(text)
        .filter(|s| !s.is_empty())
        .count() as u64
}

pub fn count_paragraphs(text: &str) -> u64 {
    text.split('\n').filter(|p| !p.is_empty()).count() as u64
}
