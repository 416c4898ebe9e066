//! Title, author, and publish date.
//!
//! JSON-LD `Article`/`NewsArticle` blocks come first; Open Graph and
//! `article:published_time` meta tags fill whatever they leave blank.
//! Malformed JSON-LD blocks are skipped.

use super::{first_match, parse_selector};
use crate::models::ArticleMetadata;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use serde_json::{Map, Value};
use tracing::debug;

static JSON_LD: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"script[type="application/ld+json"]"#).expect("static selector"));

const ARTICLE_TYPES: &[&str] = &["NewsArticle", "Article"];

/// Extract metadata from a parsed document. Absent fields are `None`.
pub fn extract_metadata(doc: &Html) -> ArticleMetadata {
    let ld = find_article_json_ld(doc);

    let title = ld
        .as_ref()
        .and_then(|obj| non_empty_str(obj.get("headline")))
        .or_else(|| meta_property(doc, "og:title"));
    let author = ld.as_ref().and_then(|obj| author_name(obj.get("author")));
    let published = ld
        .as_ref()
        .and_then(|obj| non_empty_str(obj.get("datePublished")))
        .or_else(|| meta_property(doc, "article:published_time"));

    debug!(
        json_ld = ld.is_some(),
        has_title = title.is_some(),
        has_author = author.is_some(),
        has_date = published.is_some(),
        "Extracted metadata"
    );

    ArticleMetadata {
        title,
        author,
        published_iso8601: published.map(|raw| normalize_date(&raw)),
    }
}

/// First `Article`-family object across all JSON-LD blocks.
fn find_article_json_ld(doc: &Html) -> Option<Map<String, Value>> {
    first_match(doc.select(&JSON_LD), |script| {
        let raw = script.text().collect::<String>();
        let value = serde_json::from_str::<Value>(raw.trim()).ok()?;
        find_article(&value)
    })
}

fn find_article(value: &Value) -> Option<Map<String, Value>> {
    match value {
        Value::Array(items) => first_match(items, find_article),
        Value::Object(obj) => {
            if is_article_type(obj.get("@type")) {
                return Some(obj.clone());
            }
            obj.get("@graph").and_then(find_article)
        }
        _ => None,
    }
}

fn is_article_type(ty: Option<&Value>) -> bool {
    match ty {
        Some(Value::String(s)) => ARTICLE_TYPES.contains(&s.as_str()),
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .any(|s| ARTICLE_TYPES.contains(&s)),
        _ => false,
    }
}

/// `author.name`, the first entry's name when `author` is a list, or a bare string.
fn author_name(author: Option<&Value>) -> Option<String> {
    match author? {
        Value::Object(obj) => non_empty_str(obj.get("name")),
        Value::Array(items) => match items.first()? {
            Value::Object(obj) => non_empty_str(obj.get("name")),
            _ => None,
        },
        v @ Value::String(_) => non_empty_str(Some(v)),
        _ => None,
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Non-empty `content` of `<meta property="{property}">`.
fn meta_property(doc: &Html, property: &str) -> Option<String> {
    let sel = parse_selector(&format!(r#"meta[property="{property}"]"#))?;
    let meta = doc.select(&sel).next()?;
    meta.value()
        .attr("content")
        .filter(|c| !c.is_empty())
        .map(str::to_string)
}

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M%:z",
    "%Y-%m-%d %H:%M%z",
];
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Normalize a publish date to ISO-8601, passing unparseable input through.
///
/// A `Z` suffix is read as `+00:00`. Naive timestamps stay naive, bare dates
/// become midnight, and fractional seconds are kept at microsecond precision.
pub fn normalize_date(raw: &str) -> String {
    let s = raw.trim().replace('Z', "+00:00");

    if let Ok(dt) = DateTime::parse_from_rfc3339(&s) {
        return format_datetime(&dt.naive_local(), Some(&dt.format("%:z").to_string()));
    }
    if let Some(dt) = OFFSET_FORMATS
        .iter()
        .find_map(|f| DateTime::parse_from_str(&s, f).ok())
    {
        return format_datetime(&dt.naive_local(), Some(&dt.format("%:z").to_string()));
    }
    if let Some(dt) = NAIVE_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(&s, f).ok())
    {
        return format_datetime(&dt, None);
    }
    if let Ok(d) = NaiveDate::parse_from_str(&s, "%Y-%m-%d") {
        if let Some(dt) = d.and_hms_opt(0, 0, 0) {
            return format_datetime(&dt, None);
        }
    }
    raw.to_string()
}

fn format_datetime(dt: &NaiveDateTime, offset: Option<&str>) -> String {
    let base = if dt.and_utc().timestamp_subsec_micros() == 0 {
        dt.format("%Y-%m-%dT%H:%M:%S").to_string()
    } else {
        dt.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
    };
    match offset {
        Some(off) => format!("{base}{off}"),
        None => base,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(html: &str) -> ArticleMetadata {
        extract_metadata(&Html::parse_document(html))
    }

    #[test]
    fn test_json_ld_news_article() {
        let m = meta(
            r#"<html><head><script type="application/ld+json">
            {"@type":"NewsArticle","headline":"Team Wins Big",
             "datePublished":"2024-01-05T12:00:00Z","author":{"name":"Jane Doe"}}
            </script></head></html>"#,
        );
        assert_eq!(m.title.as_deref(), Some("Team Wins Big"));
        assert_eq!(m.author.as_deref(), Some("Jane Doe"));
        assert_eq!(m.published_iso8601.as_deref(), Some("2024-01-05T12:00:00+00:00"));
    }

    #[test]
    fn test_author_list_takes_first_name() {
        let m = meta(
            r#"<script type="application/ld+json">
            {"@type":"Article","headline":"H","author":[{"name":"First"},{"name":"Second"}]}
            </script>"#,
        );
        assert_eq!(m.author.as_deref(), Some("First"));
    }

    #[test]
    fn test_skips_malformed_and_non_article_blocks() {
        let m = meta(
            r#"<script type="application/ld+json">{ not json </script>
            <script type="application/ld+json">{"@type":"Organization","name":"ESPN"}</script>
            <script type="application/ld+json">[{"@type":"WebPage"},{"@type":"NewsArticle","headline":"Third"}]</script>"#,
        );
        assert_eq!(m.title.as_deref(), Some("Third"));
    }

    #[test]
    fn test_graph_and_type_list() {
        let m = meta(
            r#"<script type="application/ld+json">
            {"@context":"https://schema.org","@graph":[
              {"@type":"WebSite"},
              {"@type":["NewsArticle","ReportageNewsArticle"],"headline":"From graph"}]}
            </script>"#,
        );
        assert_eq!(m.title.as_deref(), Some("From graph"));
    }

    #[test]
    fn test_meta_tag_fallbacks() {
        let m = meta(
            r#"<head>
            <meta property="og:title" content="OG Title">
            <meta property="article:published_time" content="2024-03-01T08:30:00-05:00">
            </head>"#,
        );
        assert_eq!(m.title.as_deref(), Some("OG Title"));
        assert_eq!(m.author, None);
        assert_eq!(m.published_iso8601.as_deref(), Some("2024-03-01T08:30:00-05:00"));
    }

    #[test]
    fn test_empty_headline_falls_back_to_og_title() {
        let m = meta(
            r#"<script type="application/ld+json">{"@type":"Article","headline":""}</script>
            <meta property="og:title" content="OG">"#,
        );
        assert_eq!(m.title.as_deref(), Some("OG"));
    }

    #[test]
    fn test_nothing_found_is_all_none() {
        assert_eq!(meta("<html><body><p>hi</p></body></html>"), ArticleMetadata::default());
    }

    #[test]
    fn test_normalize_date_variants() {
        assert_eq!(normalize_date("2024-01-05T12:00:00Z"), "2024-01-05T12:00:00+00:00");
        assert_eq!(
            normalize_date("2024-01-05T12:00:00.250Z"),
            "2024-01-05T12:00:00.250000+00:00"
        );
        assert_eq!(normalize_date("2024-01-05 12:00:00+02:00"), "2024-01-05T12:00:00+02:00");
        assert_eq!(normalize_date("2024-01-05T12:00:00"), "2024-01-05T12:00:00");
        assert_eq!(normalize_date("2024-01-05"), "2024-01-05T00:00:00");
    }

    #[test]
    fn test_normalize_date_compact_offset_and_minute_precision() {
        assert_eq!(normalize_date("2024-01-05T12:00:00-0500"), "2024-01-05T12:00:00-05:00");
        assert_eq!(normalize_date("2024-01-05 12:00:00+0130"), "2024-01-05T12:00:00+01:30");
        assert_eq!(normalize_date("2024-01-05 12:00+00:00"), "2024-01-05T12:00:00+00:00");
        assert_eq!(normalize_date("2024-01-05T12:00-0800"), "2024-01-05T12:00:00-08:00");
        assert_eq!(normalize_date("2024-01-05 12:00"), "2024-01-05T12:00:00");
    }

    #[test]
    fn test_normalize_date_passes_through_garbage() {
        assert_eq!(normalize_date("Jan 5, 2024"), "Jan 5, 2024");
    }
}
