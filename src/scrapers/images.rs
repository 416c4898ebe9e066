//! Image discovery.
//!
//! Two strategies scan the markup for `<figure>` images and every responsive
//! variant they declare:
//!
//! - **Inline photo**: figures inside inline-photo wrappers
//!   (`aside.inline.inline-photo` on ESPN)
//! - **Captioned figure**: any figure with a non-empty `<figcaption>`
//!
//! [`discover_images`] runs the inline strategy and only falls back to
//! captioned figures when it finds nothing. Each strategy removes exact-URL
//! repeats before returning; collapsing size variants is left to
//! [`canonical`](super::canonical).

use super::{parse_selector, stripped_text};
use crate::config::ExtractionProfile;
use crate::models::{ImageCandidate, ImageStrategy};
use itertools::Itertools;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info};
use url::Url;

static FIGURE: Lazy<Selector> = Lazy::new(|| Selector::parse("figure").expect("static selector"));
static FIGCAPTION: Lazy<Selector> = Lazy::new(|| Selector::parse("figcaption").expect("static selector"));
static IMG: Lazy<Selector> = Lazy::new(|| Selector::parse("img").expect("static selector"));
static SOURCE: Lazy<Selector> = Lazy::new(|| Selector::parse("source").expect("static selector"));

/// Discover article images, returning the candidates and the strategy used.
///
/// # Arguments
///
/// * `doc` - Parsed article page
/// * `page_url` - URL the page was served from, for resolving relative sources
/// * `profile` - Supplies the inline-photo wrapper selector
///
/// # Returns
///
/// Candidates in markup order, still containing size variants, and the
/// strategy label. The inline-photo path reports [`ImageStrategy::InlineAndCaptioned`] even
/// though captioned figures are not merged in when inline photos exist.
pub fn discover_images(
    doc: &Html,
    page_url: &str,
    profile: &ExtractionProfile,
) -> (Vec<ImageCandidate>, ImageStrategy) {
    let inline = inline_photo_images(doc, page_url, &profile.inline_photo_selector);
    if !inline.is_empty() {
        info!(count = inline.len(), strategy = %ImageStrategy::InlineAndCaptioned, "Discovered images");
        return (inline, ImageStrategy::InlineAndCaptioned);
    }

    let captioned = captioned_images(doc, page_url);
    if !captioned.is_empty() {
        info!(count = captioned.len(), strategy = %ImageStrategy::Captioned, "Discovered images");
        return (captioned, ImageStrategy::Captioned);
    }

    debug!("No article images found");
    (Vec::new(), ImageStrategy::None)
}

/// Figures nested in inline-photo wrappers. Only the first figure of each
/// wrapper is read; its caption is optional.
pub fn inline_photo_images(doc: &Html, page_url: &str, wrapper_selector: &str) -> Vec<ImageCandidate> {
    let Some(wrapper) = parse_selector(wrapper_selector) else {
        return Vec::new();
    };

    let mut results = Vec::new();
    for aside in doc.select(&wrapper) {
        let Some(fig) = aside.select(&FIGURE).next() else {
            continue;
        };
        let caption = fig
            .select(&FIGCAPTION)
            .next()
            .map(stripped_text)
            .filter(|c| !c.is_empty());
        figure_candidates(fig, page_url, caption, &mut results);
    }
    dedupe_exact(results)
}

/// Every figure with a non-empty caption, wrapped or not.
pub fn captioned_images(doc: &Html, page_url: &str) -> Vec<ImageCandidate> {
    let mut results = Vec::new();
    for fig in doc.select(&FIGURE) {
        let Some(caption) = fig
            .select(&FIGCAPTION)
            .next()
            .map(stripped_text)
            .filter(|c| !c.is_empty())
        else {
            continue;
        };
        figure_candidates(fig, page_url, Some(caption), &mut results);
    }
    dedupe_exact(results)
}

/// Emit candidates for every `<source>` srcset, then the `<img>` srcset, then
/// the plain `<img src>` with unknown width.
fn figure_candidates(
    fig: ElementRef<'_>,
    page_url: &str,
    caption: Option<String>,
    out: &mut Vec<ImageCandidate>,
) {
    let img = fig.select(&IMG).next();
    let alt = img.and_then(|i| i.value().attr("alt")).map(str::to_string);

    let candidate = |url: &str, width: Option<u32>| ImageCandidate {
        source_url: absolute_url(url, page_url),
        declared_width: width,
        alt_text: alt.clone(),
        caption_text: caption.clone(),
    };

    for source in fig.select(&SOURCE) {
        for (url, width) in parse_srcset(srcset_attr(source)) {
            out.push(candidate(url, width));
        }
    }

    if let Some(img) = img {
        for (url, width) in parse_srcset(srcset_attr(img)) {
            out.push(candidate(url, width));
        }
        if let Some(src) = img.value().attr("src").filter(|s| !s.is_empty()) {
            out.push(candidate(src, None));
        }
    }
}

/// `srcset`, or `data-srcset` when `srcset` is missing or empty.
fn srcset_attr<'a>(el: ElementRef<'a>) -> &'a str {
    let attrs = el.value();
    attrs
        .attr("srcset")
        .filter(|s| !s.is_empty())
        .or_else(|| attrs.attr("data-srcset"))
        .unwrap_or("")
}

/// Split a responsive-size descriptor into `(url, width)` pairs.
///
/// Widths are only recognised in the `640w` form; density descriptors and
/// missing descriptors give `None`.
pub fn parse_srcset(srcset: &str) -> Vec<(&str, Option<u32>)> {
    srcset
        .split(',')
        .filter_map(|part| {
            let mut bits = part.split_whitespace();
            let url = bits.next()?;
            let width = bits
                .next()
                .and_then(|d| d.strip_suffix('w'))
                .and_then(|n| n.parse().ok());
            Some((url, width))
        })
        .collect()
}

/// Resolve `url` against the page: `//host/x` becomes `https://host/x`,
/// anything else is joined onto `base`.
pub fn absolute_url(url: &str, base: &str) -> String {
    if url.is_empty() {
        return String::new();
    }
    if let Some(rest) = url.strip_prefix("//") {
        return format!("https://{rest}");
    }
    match Url::parse(base).and_then(|b| b.join(url)) {
        Ok(resolved) => resolved.to_string(),
        Err(_) => url.to_string(),
    }
}

fn dedupe_exact(candidates: Vec<ImageCandidate>) -> Vec<ImageCandidate> {
    candidates
        .into_iter()
        .unique_by(|c| c.source_url.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "https://www.espn.com/nfl/story/_/id/1/slug";

    fn discover(html: &str) -> (Vec<ImageCandidate>, ImageStrategy) {
        discover_images(&Html::parse_document(html), PAGE, &ExtractionProfile::default())
    }

    #[test]
    fn test_parse_srcset_pairs() {
        assert_eq!(
            parse_srcset("a.jpg 640w, b.jpg 1280w,  c.jpg,d.jpg 2x, e.jpg 12xw"),
            vec![
                ("a.jpg", Some(640)),
                ("b.jpg", Some(1280)),
                ("c.jpg", None),
                ("d.jpg", None),
                ("e.jpg", None),
            ]
        );
        assert!(parse_srcset("").is_empty());
        assert!(parse_srcset(" , ").is_empty());
    }

    #[test]
    fn test_absolute_url_resolution() {
        assert_eq!(
            absolute_url("//a.espncdn.com/photo/x.jpg", PAGE),
            "https://a.espncdn.com/photo/x.jpg"
        );
        assert_eq!(
            absolute_url("/photo/x.jpg", PAGE),
            "https://www.espn.com/photo/x.jpg"
        );
        assert_eq!(
            absolute_url("x.jpg", PAGE),
            "https://www.espn.com/nfl/story/_/id/1/x.jpg"
        );
        assert_eq!(
            absolute_url("https://cdn.example.com/y.png", PAGE),
            "https://cdn.example.com/y.png"
        );
        assert_eq!(absolute_url("", PAGE), "");
    }

    #[test]
    fn test_inline_photo_sources_then_img() {
        let (images, strategy) = discover(
            r#"<aside class="inline inline-photo full">
              <figure>
                <picture>
                  <source srcset="//a.espncdn.com/p/a_640x360.webp 640w, //a.espncdn.com/p/a_1280x720.webp 1280w">
                  <source data-srcset="/p/a_320x180.jpg 320w">
                  <img alt="Quarterback" src="/p/a.jpg" srcset="/p/a_960x540.jpg 960w">
                </picture>
                <figcaption> Brees <em>throws</em> </figcaption>
              </figure>
            </aside>"#,
        );
        assert_eq!(strategy, ImageStrategy::InlineAndCaptioned);
        let urls: Vec<_> = images.iter().map(|c| c.source_url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://a.espncdn.com/p/a_640x360.webp",
                "https://a.espncdn.com/p/a_1280x720.webp",
                "https://www.espn.com/p/a_320x180.jpg",
                "https://www.espn.com/p/a_960x540.jpg",
                "https://www.espn.com/p/a.jpg",
            ]
        );
        assert_eq!(images[1].declared_width, Some(1280));
        assert_eq!(images[4].declared_width, None);
        assert!(images.iter().all(|c| c.alt_text.as_deref() == Some("Quarterback")));
        assert!(images.iter().all(|c| c.caption_text.as_deref() == Some("Brees throws")));
    }

    #[test]
    fn test_inline_photo_without_caption() {
        let (images, strategy) = discover(
            r#"<aside class="inline inline-photo"><figure><img src="//cdn/x.jpg"></figure></aside>"#,
        );
        assert_eq!(strategy, ImageStrategy::InlineAndCaptioned);
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].caption_text, None);
        assert_eq!(images[0].alt_text, None);
    }

    #[test]
    fn test_inline_wins_over_captioned_without_merging() {
        // Known quirk: label claims both strategies but only inline ran.
        let (images, strategy) = discover(
            r#"<aside class="inline inline-photo"><figure><img src="/inline.jpg"></figure></aside>
            <figure><img src="/captioned.jpg"><figcaption>Caption</figcaption></figure>"#,
        );
        assert_eq!(strategy.label(), "inline + captioned");
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].source_url, "https://www.espn.com/inline.jpg");
    }

    #[test]
    fn test_falls_back_to_captioned_figures() {
        let (images, strategy) = discover(
            r#"<aside class="inline"><figure><img src="/not-inline-photo.jpg"></figure></aside>
            <figure><img src="/no-caption.jpg"></figure>
            <figure><img src="/blank.jpg"><figcaption>   </figcaption></figure>
            <figure><img alt="Coach" src="/coach.jpg"><figcaption>Coach speaks</figcaption></figure>"#,
        );
        assert_eq!(strategy, ImageStrategy::Captioned);
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].source_url, "https://www.espn.com/coach.jpg");
        assert_eq!(images[0].caption_text.as_deref(), Some("Coach speaks"));
        assert_eq!(images[0].alt_text.as_deref(), Some("Coach"));
    }

    #[test]
    fn test_no_images_is_none_strategy() {
        let (images, strategy) = discover("<article><p>Text only</p></article>");
        assert!(images.is_empty());
        assert_eq!(strategy, ImageStrategy::None);
    }

    #[test]
    fn test_exact_duplicates_keep_first() {
        let (images, _) = discover(
            r#"<aside class="inline inline-photo"><figure>
              <img alt="first" src="/a.jpg" srcset="/a.jpg 800w">
            </figure></aside>
            <aside class="inline inline-photo"><figure>
              <img alt="second" src="/a.jpg">
            </figure></aside>"#,
        );
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].declared_width, Some(800));
        assert_eq!(images[0].alt_text.as_deref(), Some("first"));
    }
}
