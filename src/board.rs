//! The board: a lock-guarded, ordered collection of posts.
//!
//! A [`Board`] owns one `Vec<Post>` behind a single `tokio::sync::RwLock`.
//! Any number of readers may hold the lock at once; a writer holds it
//! alone, and a queued writer blocks new readers. The lock is never
//! poisoned and is never held across another lock.
//!
//! # Ordering
//!
//! The vector's order is the board's meaning: most liked first right after
//! population, or whatever the last
//! [`sort_by_popularity`](Board::sort_by_popularity),
//! [`shuffle`](Board::shuffle) or [`limit`](Board::limit) left behind.
//! Nothing reorders it implicitly.
//!
//! # Derived boards
//!
//! [`filter`](Board::filter) copies the posts out under the read lock,
//! releases it, and ranks the copy into a brand new board with its own
//! lock. Derived boards never alias their parent.
//!
//! # Population
//!
//! [`spawn_populate`](Board::spawn_populate) takes the write lock *before*
//! it returns and keeps it until the loader has finished and the posts are
//! sorted, so nobody ever sees a half-loaded board. Progress is published
//! as a [`LoadState`] on a watch channel.
//!
//! | Operation | Lock |
//! |-----------|------|
//! | [`populate`](Board::populate) / [`spawn_populate`](Board::spawn_populate) | write, for the whole load |
//! | [`add_post`](Board::add_post) | write |
//! | [`filter`](Board::filter) | read, only while copying |
//! | [`get_by_id`](Board::get_by_id) | read |
//! | [`limit`](Board::limit) | write |
//! | [`sort_by_popularity`](Board::sort_by_popularity) | write |
//! | [`shuffle`](Board::shuffle) | write |
//! | [`urls`](Board::urls) | read |
//! | [`keywords`](Board::keywords) | read |
//! | [`to_json`](Board::to_json) / [`snapshot`](Board::snapshot) | read |

use anyhow::Result;
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;

use crate::ingest::PostLoader;
use crate::keywords::KeywordExtractor;
use crate::models::Post;
use crate::rank::multi_word_rank;
use crate::report::{ErrorReporter, Severity};

/// Where a board is in its one-shot population.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum LoadState {
    /// Population is running; reads block until it finishes.
    Loading,
    /// Population finished.
    Ready {
        posts: usize,
        loaded_at: DateTime<Utc>,
    },
    /// Every attempt failed; the board is empty.
    Failed { message: String },
}

impl LoadState {
    fn ready(posts: usize) -> Self {
        Self::Ready {
            posts,
            loaded_at: Utc::now(),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

pub struct Board {
    posts: Arc<RwLock<Vec<Post>>>,
    state: watch::Sender<LoadState>,
}

impl Board {
    /// A ready board holding `posts` in the given order.
    pub fn new(posts: Vec<Post>) -> Self {
        let count = posts.len();
        let (state, _) = watch::channel(LoadState::ready(count));
        Self {
            posts: Arc::new(RwLock::new(posts)),
            state,
        }
    }

    /// An empty board waiting to be populated.
    pub fn empty() -> Self {
        let (state, _) = watch::channel(LoadState::Loading);
        Self {
            posts: Arc::new(RwLock::new(Vec::new())),
            state,
        }
    }

    // ============ Population ============

    /// Replace every post with the loader's output, then sort by
    /// popularity. Holds the write lock for the whole call.
    pub async fn populate(&self, loader: &dyn PostLoader) -> Result<usize> {
        let mut posts = self.posts.write().await;
        self.state.send_replace(LoadState::Loading);
        match loader.load().await {
            Ok(loaded) => {
                *posts = loaded;
                sort_by_likes(&mut posts);
                self.state.send_replace(LoadState::ready(posts.len()));
                Ok(posts.len())
            }
            Err(e) => {
                posts.clear();
                self.state.send_replace(LoadState::Failed {
                    message: format!("{:#}", e),
                });
                Err(e)
            }
        }
    }

    /// Populate in the background.
    ///
    /// The write lock is acquired before this returns, so every read issued
    /// afterwards waits for the load. A failing loader is retried up to
    /// `max_retries` times with exponential backoff (1s, 2s, 4s, … capped at
    /// 32s). If every attempt fails the board stays empty, the failure is
    /// reported, and the state becomes [`LoadState::Failed`].
    pub async fn spawn_populate(
        self: &Arc<Self>,
        loader: Arc<dyn PostLoader>,
        max_retries: u32,
        reporter: Arc<dyn ErrorReporter>,
    ) -> JoinHandle<()> {
        let mut guard = self.posts.clone().write_owned().await;
        self.state.send_replace(LoadState::Loading);
        let board = Arc::clone(self);

        tokio::spawn(async move {
            let mut last_err = None;
            for attempt in 0..=max_retries {
                if attempt > 0 {
                    let delay = Duration::from_secs(1 << (attempt - 1).min(5));
                    tracing::warn!(
                        loader = loader.name(),
                        attempt,
                        delay_secs = delay.as_secs(),
                        "retrying board population"
                    );
                    tokio::time::sleep(delay).await;
                }
                match loader.load().await {
                    Ok(loaded) => {
                        *guard = loaded;
                        sort_by_likes(&mut guard);
                        tracing::info!(
                            loader = loader.name(),
                            posts = guard.len(),
                            "board populated"
                        );
                        board.state.send_replace(LoadState::ready(guard.len()));
                        return;
                    }
                    Err(e) => last_err = Some(e),
                }
            }

            let message = last_err
                .map(|e| format!("{:#}", e))
                .unwrap_or_else(|| "board population failed".to_string());
            guard.clear();
            reporter.report(
                Severity::Error,
                "cannot populate board",
                &[("loader", loader.name()), ("error", message.as_str())],
            );
            board.state.send_replace(LoadState::Failed { message });
        })
    }

    /// Current population state.
    pub fn load_state(&self) -> LoadState {
        self.state.borrow().clone()
    }

    /// Wait until population has finished, successfully or not.
    ///
    /// The board owns the state sender, so on a [`Board::empty`] that is
    /// never populated this waits forever. Bound it with
    /// `tokio::time::timeout` when that can happen.
    pub async fn wait_ready(&self) -> LoadState {
        let mut rx = self.state.subscribe();
        loop {
            let current = rx.borrow_and_update().clone();
            if !current.is_loading() {
                return current;
            }
            if rx.changed().await.is_err() {
                return self.load_state();
            }
        }
    }

    // ============ Writes ============

    /// Append `post` unless a post with the exact same title is present.
    ///
    /// Returns whether the post was added. Ids are not checked.
    pub async fn add_post(&self, post: Post) -> bool {
        let mut posts = self.posts.write().await;
        if posts.iter().any(|p| p.title == post.title) {
            return false;
        }
        posts.push(post);
        true
    }

    /// Keep only the window `[offset, offset + max_results)`.
    ///
    /// Both ends are clamped to the board length; an out-of-range offset
    /// leaves the board empty.
    pub async fn limit(&self, offset: usize, max_results: usize) {
        let mut posts = self.posts.write().await;
        let len = posts.len();
        let start = offset.min(len);
        let end = start.saturating_add(max_results).min(len);
        posts.truncate(end);
        posts.drain(..start);
    }

    /// Sort by likes, most liked first. Equal likes keep their order.
    pub async fn sort_by_popularity(&self) {
        let mut posts = self.posts.write().await;
        sort_by_likes(&mut posts);
    }

    /// Uniformly permute the posts using `rng`.
    pub async fn shuffle<R: Rng + ?Sized>(&self, rng: &mut R) {
        let mut posts = self.posts.write().await;
        posts.shuffle(rng);
    }

    // ============ Reads ============

    /// Rank every post against `terms` and return a new board ordered by
    /// ascending distance. Ties keep this board's order.
    pub async fn filter<S: AsRef<str>>(&self, terms: &[S]) -> Board {
        let posts = self.snapshot().await;
        let mut ranked: Vec<(usize, Post)> = posts
            .into_iter()
            .map(|post| (multi_word_rank(terms, &post), post))
            .collect();
        ranked.sort_by_key(|(distance, _)| *distance);
        Board::new(ranked.into_iter().map(|(_, post)| post).collect())
    }

    /// First post with `id`, as an owned copy.
    pub async fn get_by_id(&self, id: i64) -> Option<Post> {
        let posts = self.posts.read().await;
        posts.iter().find(|p| p.id == id).cloned()
    }

    /// Internal URL of every post, in board order.
    pub async fn urls(&self) -> Vec<String> {
        let posts = self.posts.read().await;
        posts.iter().map(Post::internal_url).collect()
    }

    /// Most frequent non-stopword title words.
    pub async fn keywords(&self, extractor: &KeywordExtractor) -> Vec<String> {
        let posts = self.posts.read().await;
        extractor.extract(posts.iter().map(|p| p.title.as_str()))
    }

    /// Owned copy of the posts in board order.
    pub async fn snapshot(&self) -> Vec<Post> {
        self.posts.read().await.clone()
    }

    /// The posts as a bare JSON array.
    pub async fn to_json(&self) -> Result<String> {
        let posts = self.posts.read().await;
        Ok(serde_json::to_string(&*posts)?)
    }

    pub async fn len(&self) -> usize {
        self.posts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.posts.read().await.is_empty()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

fn sort_by_likes(posts: &mut [Post]) {
    posts.sort_by(|a, b| b.likes.cmp(&a.likes));
}
