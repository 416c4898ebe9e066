//! Runtime configuration for fetching, extraction, and image output.
//!
//! Every knob has a default matching ESPN article markup, so an empty (or
//! missing) YAML file yields a working configuration. Selector lists live here
//! rather than in the extractors so fixtures can pin them against known markup
//! snapshots.
//!
//! ```yaml
//! fetch:
//!   timeout_secs: 15
//!   network_retries: 2
//! extraction:
//!   body_selectors:
//!     - '[data-testid="ArticleBody"]'
//!     - 'main article'
//! images:
//!   dir: ./images
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, instrument};

/// Browser user agents rotated across fetch attempts.
pub const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36",
];

/// Top-level configuration, usually loaded from YAML.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub fetch: FetchConfig,
    pub extraction: ExtractionProfile,
    pub images: ImageSaveConfig,
}

impl Config {
    /// Load configuration from a YAML file. Missing fields take their defaults.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Loaded configuration");
        Ok(config)
    }

    /// Parse configuration from YAML text. Blank input yields the defaults.
    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }
}

/// Fetch client budget and header pool.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Per-request timeout. Always applied; a fetch never blocks indefinitely.
    pub timeout_secs: u64,
    /// Extra attempts after a connection-level failure.
    pub network_retries: u32,
    /// Base delay for network retries, doubled on every attempt.
    pub network_backoff_ms: u64,
    /// Extra attempts after a retryable status code.
    pub status_retries: u32,
    /// Backoff multiplier for status retries.
    pub status_backoff_ms: u64,
    /// Status codes retried at the transport layer.
    pub retry_statuses: Vec<u16>,
    /// User agents picked pseudo-randomly per attempt.
    pub user_agents: Vec<String>,
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn network_backoff(&self) -> Duration {
        Duration::from_millis(self.network_backoff_ms)
    }

    pub fn status_backoff(&self) -> Duration {
        Duration::from_millis(self.status_backoff_ms)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            network_retries: 2,
            network_backoff_ms: 750,
            status_retries: 3,
            status_backoff_ms: 600,
            retry_statuses: vec![429, 500, 502, 503, 504],
            user_agents: DEFAULT_USER_AGENTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// CSS selectors and markers driving the extractors.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExtractionProfile {
    /// Body container candidates, tried in order; the first match wins.
    pub body_selectors: Vec<String>,
    /// Text-bearing elements collected inside the body container.
    pub paragraph_selector: String,
    /// Wrapper marking an inline photo block.
    pub inline_photo_selector: String,
    /// Lowercase prefixes of boilerplate lines dropped from the body.
    pub editor_note_markers: Vec<String>,
}

impl Default for ExtractionProfile {
    fn default() -> Self {
        Self {
            body_selectors: vec![
                r#"[data-testid="ArticleBody"]"#.to_string(),
                r#"section[name="articleBody"]"#.to_string(),
                "article .article-body".to_string(),
                "main article".to_string(),
                "div.article-body".to_string(),
            ],
            paragraph_selector: "p, li".to_string(),
            inline_photo_selector: "aside.inline.inline-photo".to_string(),
            editor_note_markers: vec!["editor\u{2019}s note".to_string(), "editor's note".to_string()],
        }
    }
}

/// Where and how downloaded images are written.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ImageSaveConfig {
    /// Destination directory.
    pub dir: PathBuf,
    /// File name stem; files are named `{file_stem}_{n}{ext}`.
    pub file_stem: String,
    /// Extension used when the URL path has none.
    pub default_extension: String,
    /// Remove the destination directory's contents before saving.
    pub clear_existing: bool,
}

impl Default for ImageSaveConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("images"),
            file_stem: "image".to_string(),
            default_extension: ".jpg".to_string(),
            clear_existing: false,
        }
    }
}
