//! Core data models used throughout the board.
//!
//! A [`Post`] is one curated reaction: a title, the link it was sourced
//! from, an image reference, and a like count. Posts are plain values and
//! are always cloned out of a [`Board`](crate::board::Board), never lent.

use deunicode::deunicode;
use serde::{Deserialize, Serialize, Serializer};

/// Maximum length of the title slug embedded in a post's internal URL.
pub const MAX_SLUG_LEN: usize = 30;

/// A single post on the board.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    /// Original source link.
    pub url: String,
    /// Fully-qualified image reference (image root + file name).
    pub image: String,
    /// Popularity score.
    pub likes: i64,
}

impl Post {
    /// Canonical in-site path for this post: `/post/{id}/{slug}`.
    ///
    /// Derived on every call from `id` and `title`; never stored.
    pub fn internal_url(&self) -> String {
        internal_url(self.id, &self.title)
    }
}

/// Build the internal path for a post id and title.
pub fn internal_url(id: i64, title: &str) -> String {
    let mut slug = slugify(title);
    slug.truncate(MAX_SLUG_LEN);
    format!("/post/{}/{}", id, slug)
}

/// Lowercase ASCII slug. The title is transliterated to ASCII first
/// (`é` → `e`, `猫` → `mao`); then alphanumerics are kept, every other run
/// of characters collapses into a single `-`, with no leading or trailing
/// `-`.
///
/// The output is pure ASCII, so byte truncation is char truncation.
pub fn slugify(text: &str) -> String {
    let ascii = deunicode(text);
    let mut slug = String::with_capacity(ascii.len());
    let mut pending_sep = false;
    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !slug.is_empty() {
                slug.push('-');
            }
            pending_sep = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }
    slug
}

/// Wire shape of a post: the stored fields plus the derived `internalURL`.
#[derive(Serialize)]
struct PostJson<'a> {
    id: i64,
    title: &'a str,
    url: &'a str,
    image: &'a str,
    likes: i64,
    #[serde(rename = "internalURL")]
    internal_url: String,
}

impl Serialize for Post {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        PostJson {
            id: self.id,
            title: &self.title,
            url: &self.url,
            image: &self.image,
            likes: self.likes,
            internal_url: self.internal_url(),
        }
        .serialize(serializer)
    }
}
