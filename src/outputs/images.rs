//! Image persistence.
//!
//! Downloads each deduplicated image in discovery order and writes it as
//! `{file_stem}_{n}{ext}` under the configured directory. The extension comes
//! from the URL path, falling back to the configured default. Downloads go
//! through [`FetchClient::download`], so they carry a rotated user agent and
//! retry on 429/5xx like page fetches. A failed download is logged and
//! skipped; it never aborts the batch.

use crate::config::ImageSaveConfig;
use crate::error::SaveError;
use crate::fetch::FetchClient;
use crate::models::ImageCandidate;
use crate::utils::{ensure_writable_dir, url_extension};
use futures::stream::{self, StreamExt};
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, instrument, warn};

/// File name for the `n`th image (1-based).
pub fn image_file_name(config: &ImageSaveConfig, n: usize, url: &str) -> String {
    let ext = url_extension(url).unwrap_or(config.default_extension.as_str());
    format!("{}_{}{}", config.file_stem, n, ext)
}

/// Download `images` into `config.dir`, returning the paths actually written.
///
/// # Arguments
///
/// * `client` - Fetch client whose pool, user agents, and status retries are reused
/// * `images` - Deduplicated candidates, numbered from 1 in this order
/// * `config` - Destination directory and file naming
///
/// # Returns
///
/// Paths of the files written, in input order, skipping failed downloads.
///
/// # Errors
///
/// Only a destination directory that cannot be cleared, created, or written
/// is an error. Individual download failures are skipped.
#[instrument(level = "info", skip_all, fields(dir = %config.dir.display(), count = images.len()))]
pub async fn save_images(
    client: &FetchClient,
    images: &[ImageCandidate],
    config: &ImageSaveConfig,
) -> Result<Vec<PathBuf>, SaveError> {
    let dir_err = |source: std::io::Error| SaveError::Directory {
        path: config.dir.clone(),
        source,
    };
    if config.clear_existing && fs::try_exists(&config.dir).await.map_err(dir_err)? {
        debug!("Clearing existing image directory");
        fs::remove_dir_all(&config.dir).await.map_err(dir_err)?;
    }
    ensure_writable_dir(&config.dir).await.map_err(dir_err)?;

    let saved: Vec<PathBuf> = stream::iter(images.iter().enumerate())
        .then(|(i, image)| async move {
            let path = config.dir.join(image_file_name(config, i + 1, &image.source_url));
            match download(client, &image.source_url, &path).await {
                Ok(bytes) => {
                    debug!(url = %image.source_url, path = %path.display(), bytes, "Saved image");
                    Some(path)
                }
                Err(e) => {
                    warn!(url = %image.source_url, error = %e, "Failed to save image");
                    None
                }
            }
        })
        .filter_map(std::future::ready)
        .collect()
        .await;

    info!(saved = saved.len(), failed = images.len() - saved.len(), "Saved article images");
    Ok(saved)
}

async fn download(client: &FetchClient, url: &str, path: &Path) -> Result<usize, Box<dyn Error>> {
    let bytes = client.download(url).await?;
    fs::write(path, &bytes).await?;
    Ok(bytes.len())
}
