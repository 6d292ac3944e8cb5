//! Term normalization shared by the keyword index and query processing.
//!
//! A keyword and a query word only ever meet in normalized form: lower-cased,
//! punctuation stripped, internal whitespace collapsed to single spaces.

/// Normalize a term for indexing or lookup.
///
/// Lower-cases, drops punctuation and symbols, and collapses runs of
/// whitespace to a single space. Leading and trailing whitespace is removed.
pub fn normalize(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for ch in term.chars() {
        if ch.is_alphanumeric() {
            out.extend(ch.to_lowercase());
        } else if ch.is_whitespace() && !out.is_empty() && !out.ends_with(' ') {
            out.push(' ');
        }
    }
    while out.ends_with(' ') {
        out.pop();
    }
    out
}

/// Normalize free text and split it into words.
pub fn tokenize(text: &str) -> Vec<String> {
    normalize(text)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}
