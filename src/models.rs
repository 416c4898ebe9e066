//! Data models for fetched pages and extracted articles.
//!
//! - [`FetchResult`]: one HTTP response, consumed once by the extractors
//! - [`ImageCandidate`]: one discovered image URL with its declared width
//! - [`ArticleMetadata`]: title, author, and publish date
//! - [`ArticleRecord`]: the assembled article handed to downstream stages
//!
//! Every field that a page may legitimately lack is an `Option`; absence is
//! data, not an error.

use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A completed HTTP fetch.
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// URL after redirects (and after the AMP fallback, if it was used).
    pub final_url: String,
    pub status_code: u16,
    /// Raw HTML.
    pub body: String,
    pub headers: HeaderMap,
}

/// An image URL discovered in the page markup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ImageCandidate {
    /// Absolute image URL.
    pub source_url: String,
    /// Width from the `srcset` descriptor, or the inferred width after dedup.
    pub declared_width: Option<u32>,
    pub alt_text: Option<String>,
    pub caption_text: Option<String>,
}

/// Which discovery strategy produced the image list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum ImageStrategy {
    /// Inline-photo blocks matched. The label says "inline + captioned" even
    /// though captioned figures are not merged in on this path.
    #[serde(rename = "inline + captioned")]
    InlineAndCaptioned,
    #[serde(rename = "captioned")]
    Captioned,
    #[serde(rename = "none")]
    None,
}

impl ImageStrategy {
    pub fn label(&self) -> &'static str {
        match self {
            ImageStrategy::InlineAndCaptioned => "inline + captioned",
            ImageStrategy::Captioned => "captioned",
            ImageStrategy::None => "none",
        }
    }
}

impl fmt::Display for ImageStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Title, author, and publish date recovered from structured markup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ArticleMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    /// ISO-8601 when the source date parsed, otherwise the raw string.
    pub published_iso8601: Option<String>,
}

/// A parsed article: metadata, body paragraphs, and deduplicated images.
///
/// A record with no title and no paragraphs is still valid; callers decide
/// whether it is usable.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ArticleRecord {
    pub title: Option<String>,
    pub author: Option<String>,
    pub published_iso8601: Option<String>,
    /// Body text in document order.
    pub paragraphs: Vec<String>,
    /// One entry per canonical image, in first-discovery order.
    pub images: Vec<ImageCandidate>,
    pub image_strategy: ImageStrategy,
}

impl ArticleRecord {
    /// `true` when extraction found neither a title nor any body text.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.paragraphs.is_empty()
    }
}
