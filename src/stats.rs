//! Board statistics: post count and top keywords.
//!
//! Used by `rboard stats` and `GET /stats.json`.

use anyhow::Result;
use serde::Serialize;

use crate::board::Board;
use crate::config::Config;
use crate::context::BoardContext;
use crate::keywords::KeywordExtractor;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    /// Decimal string, as the stats payload has always carried it.
    pub post_count: String,
    pub keywords: Vec<String>,
}

pub async fn board_stats(board: &Board, extractor: &KeywordExtractor) -> Stats {
    Stats {
        post_count: board.len().await.to_string(),
        keywords: board.keywords(extractor).await,
    }
}

/// CLI entry point for `rboard stats`.
pub async fn run_stats(config: &Config) -> Result<()> {
    let ctx = BoardContext::load(config).await?;
    let stats = board_stats(&ctx.board, &ctx.keywords).await;
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}
