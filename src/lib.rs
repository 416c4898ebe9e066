//! # Sports Reel
//!
//! The scraping core of a "news article → short video" pipeline. It fetches
//! an article page under anti-bot conditions and turns the HTML into a typed
//! [`ArticleRecord`](models::ArticleRecord): headline, author, publish date,
//! body paragraphs, and one image per logical photo at its largest known
//! width.
//!
//! ## Architecture
//!
//! 1. **Fetching** ([`fetch`]): pooled client with status retries, network
//!    retries, user-agent rotation, and an AMP fallback on 403
//! 2. **Extraction** ([`scrapers`]): metadata, body text, and image discovery
//!    run independently over the same document
//! 3. **Canonicalization** ([`scrapers::canonical`]): size variants collapse to
//!    one candidate per canonical image
//! 4. **Output** ([`outputs`], [`excerpt`]): image files, JSON records, and the
//!    bounded paragraph excerpt handed to script generation
//!
//! ## Example
//!
//! ```no_run
//! use sports_reel::config::FetchConfig;
//! use sports_reel::fetch::FetchClient;
//! use sports_reel::scrapers::espn::assemble;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = FetchClient::new(&FetchConfig::default())?;
//! let page = client.fetch("https://www.espn.com/nfl/story/_/id/46366297/hall-of-fame").await?;
//! let article = assemble(&page);
//! println!("{:?} ({} images)", article.title, article.images.len());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod excerpt;
pub mod fetch;
pub mod models;
pub mod outputs;
pub mod scrapers;
pub mod utils;
