//! ESPN article assembly.
//!
//! Runs every extractor over one fetched page and merges the results into an
//! [`ArticleRecord`]. Nothing here fails: missing pieces stay `None` or empty.

use super::body::extract_paragraphs;
use super::canonical::dedupe_keep_largest;
use super::images::discover_images;
use super::metadata::extract_metadata;
use crate::config::ExtractionProfile;
use crate::models::{ArticleRecord, FetchResult};
use scraper::Html;
use tracing::{info, instrument};

/// Builds [`ArticleRecord`]s with a fixed [`ExtractionProfile`].
#[derive(Debug, Clone, Default)]
pub struct ArticleAssembler {
    profile: ExtractionProfile,
}

impl ArticleAssembler {
    pub fn new(profile: ExtractionProfile) -> Self {
        Self { profile }
    }

    /// Assemble a record from a fetch, resolving images against its final URL.
    ///
    /// # Arguments
    ///
    /// * `fetched` - A completed fetch; its `final_url` is the base for relative image URLs
    ///
    /// # Returns
    ///
    /// The assembled record. Missing pieces stay `None` or empty.
    pub fn assemble(&self, fetched: &FetchResult) -> ArticleRecord {
        self.parse_html(&fetched.body, &fetched.final_url)
    }

    /// Assemble a record from raw HTML served at `page_url`.
    #[instrument(level = "info", skip_all, fields(%page_url))]
    pub fn parse_html(&self, html: &str, page_url: &str) -> ArticleRecord {
        let doc = Html::parse_document(html);

        let metadata = extract_metadata(&doc);
        let paragraphs = extract_paragraphs(&doc, &self.profile);
        let (raw_images, image_strategy) = discover_images(&doc, page_url, &self.profile);
        let discovered = raw_images.len();
        let images = dedupe_keep_largest(raw_images);

        info!(
            title = metadata.title.as_deref().unwrap_or(""),
            paragraphs = paragraphs.len(),
            images_discovered = discovered,
            images_kept = images.len(),
            %image_strategy,
            "Parsed article"
        );

        ArticleRecord {
            title: metadata.title,
            author: metadata.author,
            published_iso8601: metadata.published_iso8601,
            paragraphs,
            images,
            image_strategy,
        }
    }
}

/// Assemble a record with the default ESPN profile.
pub fn assemble(fetched: &FetchResult) -> ArticleRecord {
    ArticleAssembler::default().assemble(fetched)
}
