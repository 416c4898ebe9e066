//! Article body paragraphs.

use super::{first_match, parse_selector, stripped_text};
use crate::config::ExtractionProfile;
use scraper::{ElementRef, Html};
use tracing::debug;

/// Collect body paragraphs in document order.
///
/// The container is the first element matched by the profile's ordered
/// `body_selectors`; every `paragraph_selector` element inside it contributes
/// one line. Lines starting with an editor's-note marker are dropped. No
/// matching container means no paragraphs.
pub fn extract_paragraphs(doc: &Html, profile: &ExtractionProfile) -> Vec<String> {
    let Some(container) = find_container(doc, &profile.body_selectors) else {
        debug!("No article body container matched");
        return Vec::new();
    };
    let Some(items) = parse_selector(&profile.paragraph_selector) else {
        return Vec::new();
    };

    let paragraphs: Vec<String> = container
        .select(&items)
        .map(stripped_text)
        .filter(|text| !text.is_empty() && !is_editor_note(text, &profile.editor_note_markers))
        .collect();
    debug!(count = paragraphs.len(), "Extracted paragraphs");
    paragraphs
}

fn find_container<'a>(doc: &'a Html, selectors: &[String]) -> Option<ElementRef<'a>> {
    first_match(selectors, |css| {
        let sel = parse_selector(css)?;
        let found = doc.select(&sel).next();
        if found.is_some() {
            debug!(selector = %css, "Matched body container");
        }
        found
    })
}

fn is_editor_note(text: &str, markers: &[String]) -> bool {
    let lower = text.to_lowercase();
    markers.iter().any(|m| lower.starts_with(m.as_str()))
}
