//! Paragraph budget for the script-writing stage.
//!
//! The script writer accepts a bounded number of paragraphs and a per-paragraph
//! character budget. Articles with too many paragraphs are refused outright;
//! over-long paragraphs are cut back to a word boundary.

use crate::models::ArticleRecord;
use serde::{Deserialize, Serialize};

/// Limits applied by [`script_excerpt`].
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct ScriptBudget {
    pub max_paragraphs: usize,
    pub max_chars_per_paragraph: usize,
}

impl Default for ScriptBudget {
    fn default() -> Self {
        Self {
            max_paragraphs: 20,
            max_chars_per_paragraph: 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptExcerpt {
    /// The article has no body text.
    Empty,
    /// More paragraphs than the budget allows.
    TooLong { paragraphs: usize },
    /// Paragraphs joined by blank lines.
    Ready(String),
}

/// Prepare an article's body for the script writer.
pub fn script_excerpt(record: &ArticleRecord, budget: &ScriptBudget) -> ScriptExcerpt {
    if record.paragraphs.is_empty() {
        return ScriptExcerpt::Empty;
    }
    if record.paragraphs.len() > budget.max_paragraphs {
        return ScriptExcerpt::TooLong {
            paragraphs: record.paragraphs.len(),
        };
    }
    let text = record
        .paragraphs
        .iter()
        .map(|p| clip_paragraph(p, budget.max_chars_per_paragraph))
        .collect::<Vec<_>>()
        .join("\n\n");
    ScriptExcerpt::Ready(text)
}

/// Cut `p` to `max` characters, back off to the last space, append `...`.
fn clip_paragraph(p: &str, max: usize) -> String {
    if p.chars().count() <= max {
        return p.to_string();
    }
    let head: String = p.chars().take(max).collect();
    let cut = match head.rfind(' ') {
        Some(i) => &head[..i],
        None => head.as_str(),
    };
    format!("{cut}...")
}
