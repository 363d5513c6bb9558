//! Keyword extraction over post titles.
//!
//! Titles are split on whitespace and lowercased; stopwords are dropped and
//! the remaining tokens are tallied. The most frequent tokens win, with ties
//! broken by the token itself in ascending byte order so the result never
//! depends on hash iteration order.

use std::collections::HashMap;
use std::sync::Arc;

use crate::stopwords::Stopwords;

/// Default number of keywords reported.
pub const MAX_KEYWORDS: usize = 20;

#[derive(Debug, Clone)]
pub struct KeywordExtractor {
    stopwords: Arc<Stopwords>,
    max_keywords: usize,
}

impl KeywordExtractor {
    pub fn new(stopwords: Arc<Stopwords>) -> Self {
        Self::with_limit(stopwords, MAX_KEYWORDS)
    }

    pub fn with_limit(stopwords: Arc<Stopwords>, max_keywords: usize) -> Self {
        Self {
            stopwords,
            max_keywords,
        }
    }

    /// Top tokens across `titles`, most frequent first.
    pub fn extract<'a, I>(&self, titles: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for title in titles {
            for word in title.split_whitespace() {
                let word = word.to_lowercase();
                if self.stopwords.contains(&word) {
                    continue;
                }
                *counts.entry(word).or_insert(0) += 1;
            }
        }

        let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked
            .into_iter()
            .take(self.max_keywords)
            .map(|(word, _)| word)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor(stop: &str) -> KeywordExtractor {
        KeywordExtractor::new(Arc::new(Stopwords::from_lines(stop)))
    }

    #[test]
    fn test_orders_by_frequency() {
        let ex = extractor("the");
        let kw = ex.extract(["Happy Dog", "Sad Dog", "Happy Cat", "the dog"]);
        assert_eq!(kw, vec!["dog", "happy", "cat", "sad"]);
    }

    #[test]
    fn test_ties_are_lexicographic() {
        let ex = extractor("");
        let kw = ex.extract(["zebra yak", "xylophone"]);
        assert_eq!(kw, vec!["xylophone", "yak", "zebra"]);
    }

    #[test]
    fn test_excludes_stopwords_case_insensitively() {
        let ex = extractor("when\nthe");
        let kw = ex.extract(["When THE tests pass", "when the build breaks"]);
        assert!(!kw.iter().any(|w| w == "when" || w == "the"));
        assert!(kw.contains(&"tests".to_string()));
    }

    #[test]
    fn test_caps_at_limit() {
        let ex = extractor("");
        let titles: Vec<String> = (0..50).map(|i| format!("word{}", i)).collect();
        let kw = ex.extract(titles.iter().map(String::as_str));
        assert_eq!(kw.len(), MAX_KEYWORDS);

        let small = KeywordExtractor::with_limit(Arc::new(Stopwords::default()), 3);
        assert_eq!(small.extract(titles.iter().map(String::as_str)).len(), 3);
    }

    #[test]
    fn test_empty_input() {
        let ex = extractor("the");
        assert!(ex.extract(std::iter::empty()).is_empty());
    }
}
