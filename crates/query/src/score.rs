//! Term matching, TF-IDF relevance and excerpt windows.

use std::collections::BTreeSet;

use index::{Document, DocumentStats, FieldMappings, IndexSnapshot};

use crate::types::Excerpt;

const ELLIPSIS: char = '…';

/// Distinct normalized tokens of a search term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TermQuery {
    tokens: BTreeSet<String>,
}

impl TermQuery {
    /// `None` when the term has no tokens, which callers treat as "no term".
    pub(crate) fn parse(term: &str) -> Option<Self> {
        let tokens: BTreeSet<String> = canonical::token_texts(term).into_iter().collect();
        if tokens.is_empty() {
            None
        } else {
            Some(Self { tokens })
        }
    }

    pub(crate) fn contains(&self, token: &str) -> bool {
        self.tokens.contains(token)
    }

    pub(crate) fn matches(&self, stats: &DocumentStats) -> bool {
        self.tokens.iter().any(|t| stats.term_freq(t) > 0)
    }

    /// `Σ (tf / len) · ln(1 + N / df)` over the distinct query tokens.
    pub(crate) fn score(&self, stats: &DocumentStats, snapshot: &IndexSnapshot) -> f64 {
        let len = stats.token_count();
        if len == 0 {
            return 0.0;
        }
        let n = snapshot.len() as f64;
        self.tokens
            .iter()
            .filter_map(|token| {
                let tf = stats.term_freq(token);
                let df = snapshot.doc_freq(token);
                (tf > 0 && df > 0).then(|| {
                    (f64::from(tf) / f64::from(len)) * (1.0 + n / f64::from(df)).ln()
                })
            })
            .sum()
    }

    /// Window around the first matched token of the first text field (by name)
    /// that contains one.
    pub(crate) fn excerpt(
        &self,
        document: &Document,
        mappings: &FieldMappings,
        max_chars: usize,
    ) -> Option<Excerpt> {
        mappings.text_fields().find_map(|field| {
            let text = document.get(field)?.as_str()?;
            let token = canonical::tokenize(text)
                .into_iter()
                .find(|token| self.contains(&token.text))?;
            Some(Excerpt {
                field: field.to_string(),
                text: window(text, token.start, token.end, max_chars),
            })
        })
    }
}

/// At most `max_chars` characters of `text` centred on the byte range
/// `start..end`, with an ellipsis on each truncated side.
fn window(text: &str, start: usize, end: usize, max_chars: usize) -> String {
    let total = text.chars().count();
    if total <= max_chars {
        return text.to_string();
    }
    let token_start = text[..start].chars().count();
    let token_len = text[start..end].chars().count();

    let lead = max_chars.saturating_sub(token_len) / 2;
    let mut from = token_start.saturating_sub(lead);
    let to = (from + max_chars).min(total);
    if to == total {
        from = total - max_chars;
    }

    let body: String = text.chars().skip(from).take(to - from).collect();
    let mut out = String::with_capacity(body.len() + 2 * ELLIPSIS.len_utf8());
    if from > 0 {
        out.push(ELLIPSIS);
        out.push_str(body.trim_start());
    } else {
        out.push_str(&body);
    }
    if to < total {
        out.truncate(out.trim_end().len());
        out.push(ELLIPSIS);
    }
    out
}
