//! TOML configuration.
//!
//! ```toml
//! [feed]
//! path = "data/posts.csv"          # or: url = "https://…/posts.csv"
//! image_root = "https://img.reaction.pics/file/reaction-pics/"
//!
//! [search]
//! max_results = 20
//!
//! [keywords]
//! stopwords = "data/stopwords.txt" # optional, bundled list otherwise
//! max_keywords = 20
//!
//! [server]
//! bind = "127.0.0.1:8080"
//! host = "https://reaction.pics"
//!
//! [logging]
//! level = "info"
//! format = "pretty"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::keywords::MAX_KEYWORDS;

pub const DEFAULT_IMAGE_ROOT: &str = "https://img.reaction.pics/file/reaction-pics/";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub feed: FeedConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub keywords: KeywordsConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FeedConfig {
    /// Local CSV file.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Remote CSV file, fetched over HTTP(S).
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_image_root")]
    pub image_root: String,
    #[serde(default)]
    pub has_headers: bool,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            path: None,
            url: None,
            image_root: default_image_root(),
            has_headers: false,
            max_retries: default_max_retries(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_image_root() -> String {
    DEFAULT_IMAGE_ROOT.to_string()
}
fn default_max_retries() -> u32 {
    3
}
fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
        }
    }
}

fn default_max_results() -> usize {
    20
}

#[derive(Debug, Deserialize, Clone)]
pub struct KeywordsConfig {
    #[serde(default)]
    pub stopwords: Option<PathBuf>,
    #[serde(default = "default_max_keywords")]
    pub max_keywords: usize,
}

impl Default for KeywordsConfig {
    fn default() -> Self {
        Self {
            stopwords: None,
            max_keywords: default_max_keywords(),
        }
    }
}

fn default_max_keywords() -> usize {
    MAX_KEYWORDS
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Base URL prefixed to sitemap entries.
    #[serde(default)]
    pub host: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            host: String::new(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl Config {
    /// Defaults only, with the feed read from `data/posts.csv`.
    pub fn minimal() -> Self {
        Self {
            feed: FeedConfig {
                path: Some(PathBuf::from("data/posts.csv")),
                ..FeedConfig::default()
            },
            search: SearchConfig::default(),
            keywords: KeywordsConfig::default(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

pub fn validate(config: &Config) -> Result<()> {
    // Feed: exactly one source
    match (&config.feed.path, &config.feed.url) {
        (Some(_), Some(_)) => anyhow::bail!("feed.path and feed.url are mutually exclusive"),
        (None, None) => anyhow::bail!("one of feed.path or feed.url must be set"),
        _ => {}
    }

    if let Some(url) = &config.feed.url {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            anyhow::bail!("feed.url must be an http(s) URL, got '{}'", url);
        }
    }

    if config.feed.image_root.trim().is_empty() {
        anyhow::bail!("feed.image_root must not be empty");
    }

    if config.search.max_results < 1 {
        anyhow::bail!("search.max_results must be >= 1");
    }

    if config.keywords.max_keywords < 1 {
        anyhow::bail!("keywords.max_keywords must be >= 1");
    }

    Ok(())
}
