//! Output stages for assembled articles.
//!
//! # Submodules
//!
//! - [`images`]: Downloads the deduplicated images as numbered files
//! - [`json`]: Preview summaries and full-record JSON files
//!
//! # Output Structure
//!
//! ```text
//! images_dir/
//! ├── image_1.jpg
//! ├── image_2.webp
//! └── image_3.jpg            # no extension in the URL → default
//!
//! json_output_dir/
//! └── team-wins-big.json
//! ```

pub mod images;
pub mod json;
