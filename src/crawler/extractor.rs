//! Link extraction
//!
//! Turns a page's link candidates into one lazy stream of raw URL strings.
//! Strategies are yielded in a fixed order: anchors, product cards, URL
//! attributes, click handlers. Duplicates are left in; the normalizer and
//! the visited set remove them.

use crate::crawler::parser::LinkCandidates;

/// File extensions that never lead to a crawlable page
const ASSET_EXTENSIONS: &[&str] = &[
    ".jpg", ".jpeg", ".png", ".gif", ".webp", ".svg", ".ico", ".bmp", ".avif", ".css", ".js",
    ".mjs", ".map", ".woff", ".woff2", ".ttf", ".otf", ".eot", ".mp4", ".webm", ".mp3", ".wav",
    ".ogg", ".pdf", ".zip", ".gz", ".rar", ".7z", ".xml", ".json", ".txt",
];

/// Yields every raw link on a page, in strategy order
///
/// The candidates are consumed, so the stream can only be walked once.
/// Links to static assets are skipped.
///
/// # Example
///
/// ```
/// use shelf_ripple::crawler::{extract_links, parse_html};
///
/// let facts = parse_html(r#"<a href="/a">a</a><img src="/x.png"><a href="/logo.png">l</a>"#);
/// let links: Vec<String> = extract_links(facts.links).collect();
/// assert_eq!(links, vec!["/a"]);
/// ```
pub fn extract_links(candidates: LinkCandidates) -> impl Iterator<Item = String> {
    let LinkCandidates {
        anchors,
        cards,
        data_urls,
        onclick,
    } = candidates;

    anchors
        .into_iter()
        .chain(cards)
        .chain(data_urls)
        .chain(onclick)
        .filter(|link| !looks_like_asset(link))
}

/// Checks whether a link points at a static asset by its path extension
pub fn looks_like_asset(link: &str) -> bool {
    let path = link
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    ASSET_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}
