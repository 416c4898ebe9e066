//! Error types for fetching, configuration, and image persistence.
//!
//! Extraction never fails: a page with no title or no paragraphs is a valid
//! result, so only the I/O edges of the crate have error types.

use std::path::PathBuf;

/// Failure of a single [`fetch`](crate::fetch::FetchClient::fetch) call.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Connection-level failure (timeout, DNS, reset) after the retry budget ran out.
    #[error("network error fetching {url}: {message}")]
    Network { url: String, message: String },

    /// Terminal non-success status after status retries and the AMP fallback.
    #[error("HTTP {status} fetching {url}")]
    Http { url: String, status: u16 },

    /// The requested URL could not be parsed.
    #[error("invalid url {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The pooled HTTP client could not be built.
    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
}

impl FetchError {
    /// Status code carried by an [`FetchError::Http`] error.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Connection-level failure reported by a [`Transport`](crate::fetch::Transport).
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct TransportError(pub String);

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        let kind = if e.is_timeout() {
            "timeout"
        } else if e.is_connect() {
            "connect"
        } else {
            "request"
        };
        TransportError(format!("{kind}: {e}"))
    }
}

/// Failure loading a YAML configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Failure preparing the image output directory.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("image directory {} is not usable: {source}", path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
