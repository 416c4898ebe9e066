//! # Sports Reel CLI
//!
//! Fetches one article, prints a preview of the extracted record, and
//! optionally saves the record as JSON and its images as numbered files.
//!
//! ## Usage
//!
//! ```sh
//! RUST_LOG=debug sports_reel https://www.espn.com/nfl/story/_/id/46366297/... -i ./images
//! ```

use clap::Parser;
use sports_reel::config::Config;
use sports_reel::excerpt::{ScriptBudget, ScriptExcerpt, script_excerpt};
use sports_reel::fetch::FetchClient;
use sports_reel::outputs::{images, json};
use sports_reel::scrapers::espn::ArticleAssembler;
use sports_reel::utils::truncate_for_log;
use std::error::Error;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;

use cli::Cli;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("sports_reel starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    // ---- Config: file, then flag overrides ----
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(timeout_secs) = args.timeout_secs {
        config.fetch.timeout_secs = timeout_secs;
    }
    if args.clear_images {
        config.images.clear_existing = true;
    }

    // ---- Fetch and parse ----
    let client = FetchClient::new(&config.fetch)?;
    let page = client.fetch(&args.url).await?;
    let record = ArticleAssembler::new(config.extraction.clone()).assemble(&page);

    if record.is_empty() {
        warn!(url = %page.final_url, "No title or body text extracted");
    }
    match script_excerpt(&record, &ScriptBudget::default()) {
        ScriptExcerpt::Ready(text) => info!(chars = text.chars().count(), "Article fits the script budget"),
        ScriptExcerpt::TooLong { paragraphs } => {
            warn!(paragraphs, "Article exceeds the script paragraph budget")
        }
        ScriptExcerpt::Empty => warn!("Article has no body text for the script"),
    }

    println!("Fetched: {} from {}", page.status_code, page.final_url);
    let preview = serde_json::to_string_pretty(&json::ArticlePreview::new(&record))?;
    println!("{}", truncate_for_log(&preview, 1200));

    // ---- Outputs ----
    if let Some(dir) = &args.json_output_dir {
        if let Err(e) = json::write_article(&record, dir).await {
            error!(dir = %dir.display(), error = %e, "Failed to write article JSON");
        }
    }

    if let Some(dir) = args.images_dir {
        config.images.dir = dir;
        match images::save_images(&client, &record.images, &config.images).await {
            Ok(saved) => {
                for path in &saved {
                    println!("Saved {}", path.display());
                }
            }
            Err(e) => error!(error = %e, "Failed to save images"),
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
