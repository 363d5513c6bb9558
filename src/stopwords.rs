//! Stopword set used to keep noise words out of keyword stats.
//!
//! [`Stopwords`] is an immutable set, safe to share across threads. It is
//! built once from a line-delimited word list (one word per line, `#`
//! comments and blank lines ignored) and only read afterwards.
//!
//! [`StopwordSource`] is the load-once handle owned by whoever builds the
//! keyword extractor: the first caller of [`StopwordSource::get`] loads the
//! list, concurrent first callers block on that single load, and every
//! later call returns the same shared set.

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// English stopword list compiled into the binary.
const BUNDLED: &str = include_str!("../data/stopwords.txt");

#[derive(Debug, Clone, Default)]
pub struct Stopwords {
    words: HashSet<String>,
}

impl Stopwords {
    /// Parse a line-delimited word list. Words are trimmed and lowercased.
    pub fn from_lines(text: &str) -> Self {
        let words = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .map(str::to_lowercase)
            .collect();
        Self { words }
    }

    /// The bundled English list.
    pub fn bundled() -> Self {
        Self::from_lines(BUNDLED)
    }

    /// Read a word list from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read stopword list: {}", path.display()))?;
        Ok(Self::from_lines(&text))
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Load-once, read-many handle to a stopword list.
pub struct StopwordSource {
    path: Option<PathBuf>,
    cell: OnceCell<Arc<Stopwords>>,
}

impl StopwordSource {
    /// A source reading `path`, or the bundled list when `None`.
    pub fn new(path: Option<PathBuf>) -> Self {
        Self {
            path,
            cell: OnceCell::new(),
        }
    }

    /// Return the shared set, loading it on first use.
    ///
    /// A failed load leaves the cell empty, so a later call retries.
    pub fn get(&self) -> Result<Arc<Stopwords>> {
        self.cell
            .get_or_try_init(|| {
                let words = match &self.path {
                    Some(path) => Stopwords::load(path)?,
                    None => Stopwords::bundled(),
                };
                tracing::debug!(count = words.len(), "stopwords loaded");
                Ok(Arc::new(words))
            })
            .cloned()
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }
}
