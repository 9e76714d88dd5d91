//! docsearch text analysis.
//!
//! Every component that compares text (the index when it computes token
//! statistics, the query engine when it matches terms, cuts excerpts or filters
//! suggestions) goes through this crate so that they all agree on what a token
//! is.
//!
//! ## What we do
//!
//! - Unicode normalization (NFKC) and lowercasing via [`normalize`]
//! - Word-boundary tokenization (UAX #29) via [`tokenize`], keeping only
//!   segments with at least one alphanumeric character
//! - Byte offsets that refer to the *original* text, so excerpts never show
//!   the folded form
//!
//! ## Pure function guarantee
//!
//! No I/O, no clock calls, no locale dependence. Same text in, same tokens out.

mod normalize;
mod token;

pub use crate::normalize::{normalize, starts_with_normalized};
pub use crate::token::{token_texts, tokenize, Token};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_and_normalize_agree() {
        let text = "Caf\u{00E9} CRÈME";
        let folded: Vec<String> = tokenize(text).into_iter().map(|t| t.text).collect();
        let expected: Vec<String> = normalize(text)
            .split_whitespace()
            .map(str::to_string)
            .collect();
        assert_eq!(folded, expected);
    }
}
