//! Fuzzy multi-term ranking of posts against a query.
//!
//! The distance between a query and a post is the sum, over every query
//! term, of the smallest Levenshtein distance between that term and any
//! lowercased word of the post's title. Lower is more relevant; a title
//! containing a term verbatim contributes `0` for that term.

use crate::models::Post;

/// Split a raw query into lowercase, whitespace-separated terms.
///
/// Blank input yields no terms, which ranks every post at `0`.
pub fn query_terms(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Total fuzzy distance between `terms` and the post's title.
pub fn multi_word_rank<S: AsRef<str>>(terms: &[S], post: &Post) -> usize {
    let words: Vec<String> = post
        .title
        .split_whitespace()
        .map(str::to_lowercase)
        .collect();

    terms
        .iter()
        .map(|term| {
            let term = term.as_ref();
            words
                .iter()
                .map(|word| levenshtein(term, word))
                .min()
                .unwrap_or_else(|| term.chars().count())
        })
        .sum()
}

/// Levenshtein edit distance over Unicode scalar values.
pub fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }
    let b_chars: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a.chars().count();
    }

    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr = vec![0; b_chars.len() + 1];
    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b_chars.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != *cb);
            curr[j + 1] = substitution.min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b_chars.len()]
}
