use unicode_normalization::UnicodeNormalization;

/// Fold `text` into the form used for every comparison in docsearch:
/// NFKC normalization followed by Unicode lowercasing.
///
/// Whitespace is left untouched so that whole-value comparisons (keyword
/// equality, suggestion prefixes) still see the caller's spacing.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.nfkc() {
        // Lowercasing can expand a single character (e.g. 'İ' -> "i̇").
        out.extend(ch.to_lowercase());
    }
    out
}

/// Returns true when the normalized form of `value` starts with `normalized_prefix`.
///
/// The prefix must already be normalized with [`normalize`]; callers usually
/// fold it once and test many values against it.
pub fn starts_with_normalized(value: &str, normalized_prefix: &str) -> bool {
    if normalized_prefix.is_empty() {
        return true;
    }
    normalize(value).starts_with(normalized_prefix)
}
