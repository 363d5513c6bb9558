//! # Reaction Board CLI (`rboard`)
//!
//! The `rboard` binary loads the post feed and either answers a single
//! query on stdout or serves the board over HTTP.
//!
//! ## Usage
//!
//! ```bash
//! rboard --config ./config/rboard.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `rboard serve` | Load the board in the background and start the HTTP server |
//! | `rboard search "<query>"` | Print one page of search results as JSON |
//! | `rboard get <id>` | Print a single post as JSON |
//! | `rboard stats` | Print the post count and top keywords |
//! | `rboard sitemap` | Print the sitemap XML |
//! | `rboard check` | Load the feed and report problem rows |
//!
//! ## Examples
//!
//! ```bash
//! # Browse: a random page, most-liked first
//! rboard search ""
//!
//! # Second page of results for a query
//! rboard search "happy dog" --offset 20
//!
//! # Validate a feed before deploying it
//! rboard check --config ./config/staging.toml
//! ```

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use reaction_board::config::{self, Config};
use reaction_board::{get, ingest, logging, search, server, sitemap, stats};

const DEFAULT_CONFIG_PATH: &str = "./config/rboard.toml";

/// Reaction Board CLI: search, inspect and serve a board of reaction posts.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/rboard.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "rboard",
    about = "Reaction Board: search, inspect and serve a board of reaction posts",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/rboard.toml`. When the default file does not
    /// exist, built-in defaults are used (feed at `data/posts.csv`).
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server.
    ///
    /// The board is populated in the background; requests that arrive
    /// before the feed has loaded wait for it.
    Serve,

    /// Search post titles.
    ///
    /// Ranks every post by edit distance between the query words and the
    /// title words. An empty query returns a random page sorted by likes.
    Search {
        /// The search query. Use "" to browse.
        query: String,

        /// Number of results to skip.
        #[arg(long, default_value = "0")]
        offset: usize,

        /// Page size. Defaults to `[search].max_results`.
        #[arg(long)]
        limit: Option<usize>,

        /// Seed for the empty-query shuffle.
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Print a single post by id.
    Get {
        /// Numeric post id.
        id: String,
    },

    /// Print the post count and most frequent title keywords.
    Stats,

    /// Print the sitemap XML for every post.
    Sitemap,

    /// Load the feed without serving and list every reported row problem.
    Check,
}

fn resolve_config(path: &Path) -> anyhow::Result<Config> {
    if path == Path::new(DEFAULT_CONFIG_PATH) && !path.exists() {
        return Ok(Config::minimal());
    }
    config::load_config(path)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = resolve_config(&cli.config)?;
    logging::init(&cfg.logging)?;

    match cli.command {
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Search {
            query,
            offset,
            limit,
            seed,
        } => {
            search::run_search(&cfg, &query, offset, limit, seed).await?;
        }
        Commands::Get { id } => {
            get::run_get(&cfg, &id).await?;
        }
        Commands::Stats => {
            stats::run_stats(&cfg).await?;
        }
        Commands::Sitemap => {
            sitemap::run_sitemap(&cfg).await?;
        }
        Commands::Check => {
            ingest::run_check(&cfg).await?;
        }
    }

    Ok(())
}
