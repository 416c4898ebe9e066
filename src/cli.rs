//! Command-line interface definitions.
//!
//! Every option can also come from the environment. Flags override values
//! loaded from the YAML config file.

use clap::Parser;
use std::path::PathBuf;

/// Fetch an article and extract its text, metadata, and best images.
///
/// # Examples
///
/// ```sh
/// # Preview only
/// sports_reel https://www.espn.com/nfl/story/_/id/46366297/...
///
/// # Save images and the full record
/// sports_reel URL --images-dir ./images --json-output-dir ./json
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Article URL to fetch
    pub url: String,

    /// Optional path to a config.yaml file
    #[arg(short, long, env = "SPORTS_REEL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Download deduplicated images into this directory
    #[arg(short, long, env = "SPORTS_REEL_IMAGES_DIR")]
    pub images_dir: Option<PathBuf>,

    /// Remove existing files from the image directory first
    #[arg(long)]
    pub clear_images: bool,

    /// Write the full article record as JSON into this directory
    #[arg(short, long, env = "SPORTS_REEL_JSON_DIR")]
    pub json_output_dir: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}
