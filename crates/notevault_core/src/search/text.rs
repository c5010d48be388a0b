//! Query-text tokenization for FTS5.
//!
//! # Invariants
//! - Every emitted term is double-quoted, so user text is never parsed as
//!   FTS5 operators.
//! - Terms are OR-joined: a note matches when any term matches, and bm25
//!   ranks notes matching more terms higher.

use once_cell::sync::Lazy;
use regex::Regex;

static WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\p{L}\p{N}_]+").expect("valid word regex"));

/// Splits query text into lowercase word tokens.
///
/// Punctuation and whitespace separate tokens, mirroring the `unicode61`
/// tokenizer used by the index.
pub fn query_terms(text: &str) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    for found in WORD_RE.find_iter(text) {
        let term = found.as_str().to_lowercase();
        if !terms.contains(&term) {
            terms.push(term);
        }
    }
    terms
}

/// Builds an FTS5 match expression, or `None` when the text has no word tokens.
pub fn build_match_expression(text: &str) -> Option<String> {
    let terms = query_terms(text);
    if terms.is_empty() {
        return None;
    }

    Some(
        terms
            .iter()
            .map(|term| escape_fts_term(term))
            .collect::<Vec<_>>()
            .join(" OR "),
    )
}

fn escape_fts_term(raw: &str) -> String {
    let escaped = raw.replace('"', "\"\"");
    format!("\"{escaped}\"")
}
