//! Everything a command or request handler needs to answer a query.
//!
//! [`BoardContext`] bundles the configuration, the shared [`Board`], the
//! keyword extractor (which owns the stopword list) and the error reporter.
//! CLI commands build one with [`BoardContext::load`], which populates the
//! board before returning. The server uses [`BoardContext::start`], which
//! returns as soon as the population task holds the board's write lock.

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::board::Board;
use crate::config::Config;
use crate::ingest::loader_from_config;
use crate::keywords::KeywordExtractor;
use crate::report::{ErrorReporter, TracingReporter};
use crate::stopwords::StopwordSource;

#[derive(Clone)]
pub struct BoardContext {
    pub config: Arc<Config>,
    pub board: Arc<Board>,
    pub keywords: Arc<KeywordExtractor>,
    pub reporter: Arc<dyn ErrorReporter>,
}

impl BoardContext {
    /// Assemble a context around an existing board.
    pub fn new(config: Config, board: Arc<Board>, reporter: Arc<dyn ErrorReporter>) -> Result<Self> {
        let stopwords = StopwordSource::new(config.keywords.stopwords.clone())
            .get()
            .context("Failed to load stopwords")?;
        let keywords = KeywordExtractor::with_limit(stopwords, config.keywords.max_keywords);
        Ok(Self {
            config: Arc::new(config),
            board,
            keywords: Arc::new(keywords),
            reporter,
        })
    }

    /// Build a context and populate the board from the feed, waiting for
    /// the load to finish.
    pub async fn load(config: &Config) -> Result<Self> {
        let reporter: Arc<dyn ErrorReporter> = Arc::new(TracingReporter);
        let ctx = Self::new(config.clone(), Arc::new(Board::empty()), reporter.clone())?;
        let loader = loader_from_config(&config.feed, reporter)?;
        let count = ctx
            .board
            .populate(loader.as_ref())
            .await
            .with_context(|| format!("Failed to load feed: {}", loader.name()))?;
        tracing::debug!(posts = count, feed = loader.name(), "board loaded");
        Ok(ctx)
    }

    /// Build a context and start populating the board in the background.
    ///
    /// Requests that arrive before the load finishes wait on the board lock.
    pub async fn start(config: &Config) -> Result<Self> {
        let reporter: Arc<dyn ErrorReporter> = Arc::new(TracingReporter);
        let ctx = Self::new(config.clone(), Arc::new(Board::empty()), reporter.clone())?;
        let loader = loader_from_config(&config.feed, reporter.clone())?;
        tracing::info!(feed = loader.name(), "populating board");
        ctx.board
            .spawn_populate(loader, config.feed.max_retries, reporter)
            .await;
        Ok(ctx)
    }
}
