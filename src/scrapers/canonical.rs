//! Canonical image identity and largest-variant deduplication.
//!
//! ESPN serves one photo under many URLs: `_1296x729` style suffixes before
//! the extension, `?w=…&h=…` resizing knobs, and combiner URLs that carry the
//! real path in an `img` query parameter. All of them reduce to the same
//! `{host}:{path}` key, and only the widest variant per key survives.

use crate::models::ImageCandidate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;
use std::collections::HashMap;
use tracing::debug;
use url::{Url, form_urlencoded};

/// Host used when a URL carries none.
const FALLBACK_HOST: &str = "espncdn";

/// `_WxH` (optionally followed by an aspect/crop token) right before the extension.
static SIZE_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"_\d{2,4}x\d{2,4}(?:_[\d:x=]+)?\.").expect("static regex"));

static SIZE_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?P<w>\d{2,4})x(?P<h>\d{2,4})").expect("static regex"));

static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("static regex"));

/// Canonical `{host}:{path}` key of an image URL.
///
/// The query string is ignored except for a combiner `img` parameter, which
/// replaces the path. Size suffixes are stripped from whichever path is used.
///
/// # Arguments
///
/// * `url` - Image URL, absolute or relative
///
/// # Returns
///
/// The key; relative URLs get the `espncdn` host.
pub fn canonical_key(url: &str) -> String {
    let (host, path) = match Url::parse(url) {
        Ok(parsed) => {
            let mut host = parsed.host_str().unwrap_or_default().to_string();
            if let Some(port) = parsed.port() {
                host = format!("{host}:{port}");
            }
            let path = first_query_value(parsed.query_pairs(), "img").unwrap_or_else(|| parsed.path().to_string());
            (host, path)
        }
        Err(_) => {
            // Relative or otherwise unparseable: split the query off by hand.
            let without_fragment = url.split('#').next().unwrap_or_default();
            let (path, query) = without_fragment.split_once('?').unwrap_or((without_fragment, ""));
            let path = first_query_value(form_urlencoded::parse(query.as_bytes()), "img")
                .unwrap_or_else(|| path.to_string());
            (String::new(), path)
        }
    };

    let path = SIZE_SUFFIX.replace_all(&path, ".");
    let host = if host.is_empty() { FALLBACK_HOST } else { host.as_str() };
    format!("{host}:{path}")
}

/// Width implied by the URL itself.
///
/// A non-empty `w` query parameter decides on its own (its first digit run,
/// or `0` if it has none); otherwise the first `WIDTHxHEIGHT` token in the URL
/// is used; otherwise `0`.
pub fn infer_width(url: &str) -> u32 {
    if let Some(w) = Url::parse(url).ok().and_then(|u| first_query_value(u.query_pairs(), "w")) {
        return DIGITS
            .find(&w)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0);
    }
    SIZE_TOKEN
        .captures(url)
        .and_then(|caps| caps["w"].parse().ok())
        .unwrap_or(0)
}

/// First non-empty value of query parameter `name`, percent-decoded.
fn first_query_value<'a>(
    mut pairs: impl Iterator<Item = (Cow<'a, str>, Cow<'a, str>)>,
    name: &str,
) -> Option<String> {
    pairs
        .find(|(k, v)| k == name && !v.is_empty())
        .map(|(_, v)| v.into_owned())
}

/// Keep one candidate per canonical key: the widest, first-seen on ties.
///
/// Unknown (or zero) widths are inferred from the URL first, and the kept
/// candidate's `declared_width` is set to the width it won with. Output
/// follows the order in which each key was first seen.
pub fn dedupe_keep_largest(candidates: Vec<ImageCandidate>) -> Vec<ImageCandidate> {
    let total = candidates.len();
    let mut kept: Vec<ImageCandidate> = Vec::new();
    let mut by_key: HashMap<String, usize> = HashMap::new();

    for mut candidate in candidates {
        let width = candidate
            .declared_width
            .filter(|w| *w > 0)
            .unwrap_or_else(|| infer_width(&candidate.source_url));
        let key = canonical_key(&candidate.source_url);

        match by_key.get(&key) {
            Some(&i) => {
                if width > kept[i].declared_width.unwrap_or(0) {
                    candidate.declared_width = Some(width);
                    kept[i] = candidate;
                }
            }
            None => {
                candidate.declared_width = Some(width);
                by_key.insert(key, kept.len());
                kept.push(candidate);
            }
        }
    }

    debug!(before = total, after = kept.len(), "Deduplicated image variants");
    kept
}
