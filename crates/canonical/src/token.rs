use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::normalize::normalize;

/// A normalized token together with its UTF-8 byte offsets in the original text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Token {
    /// The normalized token text.
    pub text: String,
    /// Byte offset (inclusive) in the original text.
    pub start: usize,
    /// Byte offset (exclusive) in the original text.
    pub end: usize,
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        self.text.as_str()
    }
}

/// Tokenizes `text` on Unicode word boundaries (UAX #29).
///
/// Segments without any alphanumeric character (whitespace, punctuation) are
/// dropped. Each kept segment is normalized with [`normalize`], while the
/// offsets keep pointing into the caller's original string so excerpts can be
/// cut from the unmodified text.
pub fn tokenize(text: &str) -> Vec<Token> {
    text.split_word_bound_indices()
        .filter(|(_, segment)| segment.chars().any(char::is_alphanumeric))
        .map(|(start, segment)| Token {
            text: normalize(segment),
            start,
            end: start + segment.len(),
        })
        .collect()
}

/// Normalized token texts only, in order of appearance.
pub fn token_texts(text: &str) -> Vec<String> {
    tokenize(text).into_iter().map(|t| t.text).collect()
}
