//! Post retrieval by id.
//!
//! Used by both `rboard get` and `GET /postdata/{id}`. A missing post is an
//! absence (`None`), not an error; callers decide what the user sees.

use anyhow::{bail, Result};

use crate::board::Board;
use crate::config::Config;
use crate::context::BoardContext;
use crate::search::SearchPage;

/// Parse a post id taken from a URL path segment.
pub fn parse_post_id(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}

/// A single-post page: `offset` 0, `totalResults` 1.
pub async fn post_page(board: &Board, id: i64) -> Option<SearchPage> {
    let post = board.get_by_id(id).await?;
    Some(SearchPage {
        offset: 0,
        total_results: 1,
        data: vec![post],
    })
}

/// CLI entry point for `rboard get`.
pub async fn run_get(config: &Config, raw_id: &str) -> Result<()> {
    let Some(id) = parse_post_id(raw_id) else {
        bail!("invalid post id: '{}'", raw_id);
    };

    let ctx = BoardContext::load(config).await?;
    match post_page(&ctx.board, id).await {
        Some(page) => {
            println!("{}", serde_json::to_string_pretty(&page)?);
            Ok(())
        }
        None => bail!("post not found: {}", id),
    }
}
