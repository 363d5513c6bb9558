//! Ingestion: turn feed rows into [`Post`]s.
//!
//! The feed is a CSV file with one post per row:
//!
//! ```text
//! id, title, url, image_file, likes
//! ```
//!
//! `image_file` is joined onto the configured image root. A non-numeric
//! `id` or `likes` does not drop the row: the field becomes `0` and the
//! problem goes to the [`ErrorReporter`]. Rows too short to describe a
//! post are reported and skipped, as are records the CSV reader cannot
//! decode. Nothing about a single row aborts the load.
//!
//! [`PostLoader`] abstracts where the feed comes from. [`CsvFileLoader`]
//! reads a local file; [`HttpCsvLoader`] fetches one over HTTP(S).

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::io::Read;
use std::num::ParseIntError;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::{Config, FeedConfig};
use crate::models::Post;
use crate::report::{ErrorReporter, MemoryReporter, Severity};

/// Number of fields in a feed row.
pub const ROW_FIELDS: usize = 5;

#[derive(Error, Debug)]
pub enum IngestError {
    /// A numeric field could not be parsed.
    #[error("cannot parse {field} '{value}': {source}")]
    InvalidField {
        field: &'static str,
        value: String,
        #[source]
        source: ParseIntError,
    },

    /// The row has fewer than [`ROW_FIELDS`] fields.
    #[error("row has {fields} fields, expected 5")]
    ShortRow { fields: usize },
}

/// How feed rows are laid out.
#[derive(Debug, Clone)]
pub struct CsvLayout {
    /// Prefix for every image file name. Never empty.
    pub image_root: String,
    /// Skip the first row.
    pub has_headers: bool,
}

impl From<&FeedConfig> for CsvLayout {
    fn from(feed: &FeedConfig) -> Self {
        Self {
            image_root: feed.image_root.clone(),
            has_headers: feed.has_headers,
        }
    }
}

/// Convert one feed row into a post.
///
/// Unparseable `id`/`likes` fall back to `0` and are reported; only a
/// short row is an error.
pub fn row_to_post<S: AsRef<str>>(
    row: &[S],
    image_root: &str,
    reporter: &dyn ErrorReporter,
) -> Result<Post, IngestError> {
    if row.len() < ROW_FIELDS {
        return Err(IngestError::ShortRow { fields: row.len() });
    }

    let id = parse_or_report("id", row[0].as_ref(), reporter);
    let likes = parse_or_report("likes", row[4].as_ref(), reporter);

    Ok(Post {
        id,
        title: row[1].as_ref().to_string(),
        url: row[2].as_ref().to_string(),
        image: format!("{}{}", image_root, row[3].as_ref()),
        likes,
    })
}

fn parse_field(field: &'static str, value: &str) -> Result<i64, IngestError> {
    value
        .parse::<i64>()
        .map_err(|source| IngestError::InvalidField {
            field,
            value: value.to_string(),
            source,
        })
}

fn parse_or_report(field: &'static str, value: &str, reporter: &dyn ErrorReporter) -> i64 {
    match parse_field(field, value) {
        Ok(n) => n,
        Err(e) => {
            let error = e.to_string();
            reporter.report(
                Severity::Error,
                &format!("cannot parse {}", field),
                &[("field", field), ("value", value), ("error", error.as_str())],
            );
            0
        }
    }
}

/// Parse a whole CSV feed, skipping (and reporting) rows that cannot
/// become posts.
pub fn read_posts_from_csv<R: Read>(
    reader: R,
    layout: &CsvLayout,
    reporter: &dyn ErrorReporter,
) -> Vec<Post> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(layout.has_headers)
        .flexible(true)
        .from_reader(reader);

    let mut posts = Vec::new();
    for record in rdr.records() {
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                let line = e
                    .position()
                    .map(|p| p.line().to_string())
                    .unwrap_or_default();
                let error = e.to_string();
                reporter.report(
                    Severity::Error,
                    "cannot read feed record",
                    &[("line", line.as_str()), ("error", error.as_str())],
                );
                continue;
            }
        };

        let fields: Vec<&str> = record.iter().collect();
        match row_to_post(&fields, &layout.image_root, reporter) {
            Ok(post) => posts.push(post),
            Err(e) => {
                let line = record
                    .position()
                    .map(|p| p.line().to_string())
                    .unwrap_or_default();
                let error = e.to_string();
                reporter.report(
                    Severity::Error,
                    "skipping feed row",
                    &[("line", line.as_str()), ("error", error.as_str())],
                );
            }
        }
    }
    posts
}

// ═══════════════════════════════════════════════════════════════════════
// Loaders
// ═══════════════════════════════════════════════════════════════════════

/// A source of posts for populating a board.
///
/// `load` may do I/O. It returns the posts in feed order; ordering by
/// popularity is the board's job.
#[async_trait]
pub trait PostLoader: Send + Sync {
    /// Short label for logs (a path or URL).
    fn name(&self) -> &str;

    async fn load(&self) -> Result<Vec<Post>>;
}

/// Reads the feed from a local CSV file.
pub struct CsvFileLoader {
    path: PathBuf,
    label: String,
    layout: CsvLayout,
    reporter: Arc<dyn ErrorReporter>,
}

impl CsvFileLoader {
    pub fn new(path: PathBuf, layout: CsvLayout, reporter: Arc<dyn ErrorReporter>) -> Self {
        let label = path.display().to_string();
        Self {
            path,
            label,
            layout,
            reporter,
        }
    }
}

#[async_trait]
impl PostLoader for CsvFileLoader {
    fn name(&self) -> &str {
        &self.label
    }

    async fn load(&self) -> Result<Vec<Post>> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("Failed to read feed file: {}", self.path.display()))?;
        Ok(read_posts_from_csv(
            bytes.as_slice(),
            &self.layout,
            self.reporter.as_ref(),
        ))
    }
}

/// Fetches the feed over HTTP(S).
pub struct HttpCsvLoader {
    url: String,
    timeout: Duration,
    layout: CsvLayout,
    reporter: Arc<dyn ErrorReporter>,
}

impl HttpCsvLoader {
    pub fn new(
        url: String,
        timeout: Duration,
        layout: CsvLayout,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        Self {
            url,
            timeout,
            layout,
            reporter,
        }
    }
}

#[async_trait]
impl PostLoader for HttpCsvLoader {
    fn name(&self) -> &str {
        &self.url
    }

    async fn load(&self) -> Result<Vec<Post>> {
        let client = reqwest::Client::builder().timeout(self.timeout).build()?;
        let response = client
            .get(&self.url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch feed: {}", self.url))?
            .error_for_status()?;
        let bytes = response.bytes().await?;
        Ok(read_posts_from_csv(
            bytes.as_ref(),
            &self.layout,
            self.reporter.as_ref(),
        ))
    }
}

/// Build the loader described by `[feed]`.
pub fn loader_from_config(
    feed: &FeedConfig,
    reporter: Arc<dyn ErrorReporter>,
) -> Result<Arc<dyn PostLoader>> {
    let layout = CsvLayout::from(feed);
    match (&feed.path, &feed.url) {
        (Some(path), None) => Ok(Arc::new(CsvFileLoader::new(path.clone(), layout, reporter))),
        (None, Some(url)) => Ok(Arc::new(HttpCsvLoader::new(
            url.clone(),
            Duration::from_secs(feed.timeout_secs),
            layout,
            reporter,
        ))),
        _ => anyhow::bail!("exactly one of feed.path or feed.url must be set"),
    }
}

/// Load the feed once and print a summary of what was read.
pub async fn run_check(config: &Config) -> Result<()> {
    let reporter = Arc::new(MemoryReporter::new());
    let loader = loader_from_config(&config.feed, reporter.clone())?;
    let posts = loader.load().await?;

    println!("feed: {}", loader.name());
    println!("  posts loaded:    {}", posts.len());
    println!("  reported issues: {}", reporter.len());
    for event in reporter.events() {
        let context: Vec<String> = event
            .context
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        println!("    - {} ({})", event.message, context.join(", "));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_IMAGE_ROOT;

    fn layout() -> CsvLayout {
        CsvLayout {
            image_root: DEFAULT_IMAGE_ROOT.to_string(),
            has_headers: false,
        }
    }

    #[test]
    fn test_row_to_post() {
        let reporter = MemoryReporter::new();
        let row = ["12", "Happy Dog", "https://t.co/x", "dog.gif", "40"];
        let post = row_to_post(&row, DEFAULT_IMAGE_ROOT, &reporter).unwrap();
        assert_eq!(post.id, 12);
        assert_eq!(post.title, "Happy Dog");
        assert_eq!(post.url, "https://t.co/x");
        assert_eq!(post.image, format!("{}dog.gif", DEFAULT_IMAGE_ROOT));
        assert_eq!(post.likes, 40);
        assert!(reporter.is_empty());
    }

    #[test]
    fn test_bad_numbers_become_zero_and_are_reported() {
        let reporter = MemoryReporter::new();
        let row = ["notanumber", "Title", "http://x", "img.jpg", "notanumber"];
        let post = row_to_post(&row, DEFAULT_IMAGE_ROOT, &reporter).unwrap();
        assert_eq!(post.id, 0);
        assert_eq!(post.likes, 0);
        assert_eq!(post.image, format!("{}img.jpg", DEFAULT_IMAGE_ROOT));

        let events = reporter.events();
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.severity == Severity::Error));
        assert_eq!(events[0].message, "cannot parse id");
        assert_eq!(events[1].message, "cannot parse likes");
        assert_eq!(events[0].context[0], ("field".to_string(), "id".to_string()));
        assert_eq!(events[0].context[1], ("value".to_string(), "notanumber".to_string()));
    }

    #[test]
    fn test_padded_number_is_not_a_number() {
        let reporter = MemoryReporter::new();
        let row = [" 12", "Title", "http://x", "img.jpg", "7 "];
        let post = row_to_post(&row, DEFAULT_IMAGE_ROOT, &reporter).unwrap();
        assert_eq!(post.id, 0);
        assert_eq!(post.likes, 0);
        assert_eq!(reporter.len(), 2);
    }

    #[test]
    fn test_short_row_rejected() {
        let reporter = MemoryReporter::new();
        let err = row_to_post(&["1", "Title"], DEFAULT_IMAGE_ROOT, &reporter).unwrap_err();
        assert!(matches!(err, IngestError::ShortRow { fields: 2 }));
    }

    #[test]
    fn test_csv_continues_past_bad_rows() {
        let reporter = MemoryReporter::new();
        let csv = "notanumber,Title,http://x,img.jpg,notanumber\n\
                   2,Too short\n\
                   3,\"Quoted, title\",http://y,y.gif,7\n";
        let posts = read_posts_from_csv(csv.as_bytes(), &layout(), &reporter);
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].id, 0);
        assert_eq!(posts[1].id, 3);
        assert_eq!(posts[1].title, "Quoted, title");
        assert_eq!(posts[1].likes, 7);
        // two parse reports plus one skipped row
        assert_eq!(reporter.len(), 3);
    }

    #[test]
    fn test_csv_headers_skipped() {
        let reporter = MemoryReporter::new();
        let layout = CsvLayout {
            has_headers: true,
            ..layout()
        };
        let csv = "id,title,url,image,likes\n1,A,u,a.gif,2\n";
        let posts = read_posts_from_csv(csv.as_bytes(), &layout, &reporter);
        assert_eq!(posts.len(), 1);
        assert!(reporter.is_empty());
    }

    #[tokio::test]
    async fn test_file_loader_reads_feed() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("posts.csv");
        std::fs::write(&path, "1,A,u,a.gif,2\n2,B,u,b.gif,9\n").unwrap();

        let loader = CsvFileLoader::new(path, layout(), Arc::new(MemoryReporter::new()));
        let posts = loader.load().await.unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[1].title, "B");
    }

    #[tokio::test]
    async fn test_file_loader_missing_file() {
        let loader = CsvFileLoader::new(
            PathBuf::from("/nonexistent/posts.csv"),
            layout(),
            Arc::new(MemoryReporter::new()),
        );
        assert!(loader.load().await.is_err());
    }

    #[test]
    fn test_loader_from_config_picks_source() {
        let reporter: Arc<dyn ErrorReporter> = Arc::new(MemoryReporter::new());
        let mut feed = FeedConfig {
            path: Some(PathBuf::from("posts.csv")),
            ..FeedConfig::default()
        };
        assert_eq!(
            loader_from_config(&feed, reporter.clone()).unwrap().name(),
            "posts.csv"
        );

        feed.path = None;
        feed.url = Some("https://example.com/posts.csv".to_string());
        assert_eq!(
            loader_from_config(&feed, reporter.clone()).unwrap().name(),
            "https://example.com/posts.csv"
        );

        feed.url = None;
        assert!(loader_from_config(&feed, reporter).is_err());
    }
}
