//! # Reaction Board
//!
//! The data backend for a reaction-image site: an in-memory board of posts
//! loaded from a CSV feed, with fuzzy title search, popularity ordering,
//! keyword statistics and a sitemap, exposed through a CLI and a JSON
//! HTTP server.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌─────────────┐   ┌──────────────┐
//! │  CSV feed   │──▶│   Ingest    │──▶│    Board     │
//! │ file / HTTP │   │ rows→Posts  │   │ RwLock<Vec>  │
//! └─────────────┘   └─────────────┘   └──────┬───────┘
//!                                            │
//!                        ┌───────────────────┤
//!                        ▼                   ▼
//!                   ┌──────────┐       ┌──────────┐
//!                   │   CLI    │       │   HTTP   │
//!                   │ (rboard) │       │  (axum)  │
//!                   └──────────┘       └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! rboard check                  # load the feed and report bad rows
//! rboard search "happy dog"     # one page of ranked results
//! rboard get 42                 # a single post
//! rboard stats                  # post count and top keywords
//! rboard serve                  # start the HTTP server
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | The `Post` record and its internal URL |
//! | [`ingest`] | CSV feed loading |
//! | [`board`] | The shared, lock-protected post collection |
//! | [`rank`] | Edit-distance ranking of titles |
//! | [`keywords`] | Keyword frequency extraction |
//! | [`stopwords`] | Lazily loaded stopword list |
//! | [`report`] | Error reporting sink |
//! | [`search`] | Paged search |
//! | [`get`] | Post lookup by id |
//! | [`stats`] | Board statistics |
//! | [`sitemap`] | Sitemap XML |
//! | [`server`] | HTTP server |

pub mod board;
pub mod config;
pub mod context;
pub mod get;
pub mod ingest;
pub mod keywords;
pub mod logging;
pub mod models;
pub mod rank;
pub mod report;
pub mod search;
pub mod server;
pub mod sitemap;
pub mod stats;
pub mod stopwords;
