//! Paged search over the board.
//!
//! Used by both `rboard search` and `GET /search`.
//!
//! # Flow
//!
//! 1. Normalize the query (trim, lowercase) and split it into terms.
//! 2. Rank the board against the terms into a new, derived board.
//! 3. An empty query shuffles the derived board, so browsing without a
//!    query shows a random selection.
//! 4. Record the total before paging.
//! 5. Cut the page `[offset, offset + max_results)`.
//! 6. An empty query then sorts the page by likes.

use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::board::Board;
use crate::config::Config;
use crate::context::BoardContext;
use crate::models::Post;
use crate::rank::query_terms;

/// One page of posts plus paging metadata.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    pub offset: usize,
    pub total_results: usize,
    pub data: Vec<Post>,
}

/// Run a search and return one page of results.
pub async fn search_page<R: Rng + ?Sized>(
    board: &Board,
    query: &str,
    offset: usize,
    max_results: usize,
    rng: &mut R,
) -> SearchPage {
    let terms = query_terms(query.trim());
    let browsing = terms.is_empty();

    let results = board.filter(&terms).await;
    if browsing {
        results.shuffle(rng).await;
    }
    let total_results = results.len().await;
    results.limit(offset, max_results).await;
    if browsing {
        results.sort_by_popularity().await;
    }

    SearchPage {
        offset,
        total_results,
        data: results.snapshot().await,
    }
}

/// Parse a user-supplied offset; anything unparseable is `0`.
pub fn parse_offset(raw: Option<&str>) -> usize {
    raw.and_then(|s| s.trim().parse::<usize>().ok()).unwrap_or(0)
}

/// CLI entry point for `rboard search`.
pub async fn run_search(
    config: &Config,
    query: &str,
    offset: usize,
    limit: Option<usize>,
    seed: Option<u64>,
) -> Result<()> {
    let ctx = BoardContext::load(config).await?;
    let max_results = limit.unwrap_or(config.search.max_results);
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let page = search_page(&ctx.board, query, offset, max_results, &mut rng).await;
    println!("{}", serde_json::to_string_pretty(&page)?);
    Ok(())
}
