//! JSON output for assembled articles.
//!
//! Two shapes are produced:
//!
//! - [`ArticlePreview`]: a compact summary printed by the CLI
//! - the full [`ArticleRecord`], written to `{dir}/{slug}.json` where the slug
//!   comes from the title (`article` when there is none)

use crate::models::ArticleRecord;
use crate::utils::slugify_title;
use serde::Serialize;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

/// Compact summary of a record.
#[derive(Debug, Serialize)]
pub struct ArticlePreview<'a> {
    pub title: Option<&'a str>,
    pub author: Option<&'a str>,
    pub published: Option<&'a str>,
    pub para_count: usize,
    pub first_para: Option<&'a str>,
    pub image_count: usize,
    pub image_strategy: &'static str,
}

impl<'a> ArticlePreview<'a> {
    pub fn new(record: &'a ArticleRecord) -> Self {
        Self {
            title: record.title.as_deref(),
            author: record.author.as_deref(),
            published: record.published_iso8601.as_deref(),
            para_count: record.paragraphs.len(),
            first_para: record.paragraphs.first().map(String::as_str),
            image_count: record.images.len(),
            image_strategy: record.image_strategy.label(),
        }
    }
}

/// Path the record is written to under `dir`.
pub fn article_path(record: &ArticleRecord, dir: &Path) -> PathBuf {
    let slug = record
        .title
        .as_deref()
        .and_then(slugify_title)
        .unwrap_or_else(|| "article".to_string());
    dir.join(format!("{slug}.json"))
}

/// Write the full record as pretty JSON, creating `dir` if needed.
#[instrument(level = "info", skip_all, fields(dir = %dir.display()))]
pub async fn write_article(record: &ArticleRecord, dir: &Path) -> Result<PathBuf, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(record)?;

    if let Err(e) = fs::create_dir_all(dir).await {
        error!(error = %e, "Failed to create JSON dir");
        return Err(e.into());
    }

    let path = article_path(record, dir);
    fs::write(&path, json).await?;
    info!(path = %path.display(), "Wrote article JSON");
    Ok(path)
}
