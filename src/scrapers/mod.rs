//! Article extraction from raw HTML.
//!
//! Each extractor is total: it returns an empty or `None` result instead of an
//! error when the markup does not contain what it looks for.
//!
//! | Module | Produces |
//! |--------|----------|
//! | [`metadata`] | Title, author, and publish date (JSON-LD, then meta tags) |
//! | [`body`] | Ordered body paragraphs |
//! | [`images`] | Image candidates from inline photos or captioned figures |
//! | [`canonical`] | One candidate per canonical image, largest width kept |
//! | [`espn`] | The assembled [`ArticleRecord`](crate::models::ArticleRecord) |
//!
//! Fallback chains are expressed as ranked lists of strategies handed to
//! [`first_match`], never as nested error handling.

pub mod body;
pub mod canonical;
pub mod espn;
pub mod images;
pub mod metadata;

use itertools::Itertools;
use scraper::{ElementRef, Selector};
use tracing::warn;

/// Evaluate `strategies` in order and return the first non-`None` value.
pub fn first_match<I, S, T>(strategies: I, mut run: impl FnMut(S) -> Option<T>) -> Option<T>
where
    I: IntoIterator<Item = S>,
{
    strategies.into_iter().find_map(|s| run(s))
}

/// Whitespace-stripped text fragments of `el`, joined by single spaces.
pub fn stripped_text(el: ElementRef<'_>) -> String {
    el.text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .join(" ")
}

/// Parse a configured selector, logging and skipping invalid ones.
pub(crate) fn parse_selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(sel) => Some(sel),
        Err(e) => {
            warn!(selector = css, error = %e, "Invalid selector; skipping");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn test_first_match_stops_at_first_hit() {
        let mut tried = Vec::new();
        let hit = first_match([1, 2, 3, 4], |n| {
            tried.push(n);
            (n % 2 == 0).then_some(n * 10)
        });
        assert_eq!(hit, Some(20));
        assert_eq!(tried, vec![1, 2]);
    }

    #[test]
    fn test_first_match_none_when_all_miss() {
        let hit: Option<u8> = first_match(Vec::<u8>::new(), |_| Some(1));
        assert_eq!(hit, None);
    }

    #[test]
    fn test_stripped_text_joins_fragments() {
        let doc = Html::parse_fragment("<p>  Hello\n <b>big</b>   <i> </i>world  </p>");
        let sel = Selector::parse("p").unwrap();
        let p = doc.select(&sel).next().unwrap();
        assert_eq!(stripped_text(p), "Hello big world");
    }

    #[test]
    fn test_parse_selector_rejects_garbage() {
        assert!(parse_selector("div.article-body").is_some());
        assert!(parse_selector("[[[").is_none());
    }
}
