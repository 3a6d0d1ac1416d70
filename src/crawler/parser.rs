//! HTML parser for extracting structural facts
//!
//! This module turns a fetched page into the facts the crawl engine consumes:
//! - Link candidates, grouped by the strategy that found them
//! - Content indicators (attribute markers, button labels, visible words,
//!   structured product data)
//!
//! The page is parsed once; everything downstream works on the facts.

use crate::classify::{compact_marker, IndicatorSet};
use crate::crawler::fetcher::PageContent;
use crate::ShelfError;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::{BTreeSet, HashSet};
use std::sync::LazyLock;

/// Selectors identifying product cards and grid items
const PRODUCT_CARD_SELECTOR: &str = ".product-card, .product-item, .product-box, \
     .product-grid-item, .product-tile, [class*=\"product\"], [data-product-id]";

/// Attributes whose value is a URL by name
const URL_ATTRIBUTES: &[&str] = &[
    "data-href",
    "data-url",
    "data-link",
    "data-product-url",
    "data-target-url",
];

/// Attribute values collected as indicator markers
const MARKER_ATTRIBUTES: &[&str] = &["class", "id", "name", "itemprop", "data-testid", "aria-label"];

/// Longest label compacted into a marker; longer text is prose, not a control
const MAX_LABEL_LEN: usize = 40;

static ONCLICK_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r#"(?:window\.|document\.)?location(?:\.href)?\s*=\s*['"]([^'"]+)['"]"#,
        r#"location\.(?:assign|replace)\(\s*['"]([^'"]+)['"]"#,
        r#"window\.open\(\s*['"]([^'"]+)['"]"#,
    ]
    .iter()
    .map(|p| Regex::new(p).expect("hardcoded regex pattern is valid"))
    .collect()
});

/// Raw link strings found on a page, one list per extraction strategy
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkCandidates {
    /// `<a href>` targets and the canonical link
    pub anchors: Vec<String>,
    /// Anchors and URL attributes inside product cards
    pub cards: Vec<String>,
    /// `data-*` attributes whose name or value looks like a URL
    pub data_urls: Vec<String>,
    /// Navigation targets in inline click handlers
    pub onclick: Vec<String>,
}

/// Everything the crawl engine needs from one page
#[derive(Debug, Clone, Default)]
pub struct PageFacts {
    pub links: LinkCandidates,
    pub indicators: IndicatorSet,
    /// First `<base href>` of the document, unresolved
    pub base: Option<String>,
}

/// Parses a fetched page into facts
///
/// # Arguments
///
/// * `page` - The fetched response
///
/// # Returns
///
/// * `Ok(PageFacts)` - Facts extracted from the markup
/// * `Err(ShelfError::HtmlParse)` - The response is not markup; callers treat
///   this as a page with no links
pub fn parse_page(page: &PageContent) -> Result<PageFacts, ShelfError> {
    if let Some(content_type) = &page.content_type {
        if !is_markup(content_type) {
            return Err(ShelfError::HtmlParse {
                url: page.final_url.to_string(),
                message: format!("unsupported content type '{}'", content_type),
            });
        }
    }
    Ok(parse_html(&page.body))
}

/// Parses HTML content and extracts link candidates and indicators
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` tags and `<link rel="canonical" href="...">`
/// - anchors and URL attributes inside product cards
/// - `data-*` attributes that hold URLs
/// - `location.href = '...'`, `location.assign('...')` and `window.open('...')`
///   in `onclick` handlers
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs
/// - Fragment-only links
///
/// # Example
///
/// ```
/// use shelf_ripple::crawler::parse_html;
///
/// let html = r#"<html><body><a href="/page">Link</a><button class="add-to-cart">Add</button></body></html>"#;
/// let facts = parse_html(html);
/// assert_eq!(facts.links.anchors, vec!["/page"]);
/// assert!(!facts.indicators.is_empty());
/// ```
pub fn parse_html(html: &str) -> PageFacts {
    let document = Html::parse_document(html);

    let links = LinkCandidates {
        anchors: extract_anchors(&document),
        cards: extract_card_links(&document),
        data_urls: extract_data_urls(&document),
        onclick: extract_onclick_targets(&document),
    };

    let markers = collect_markers(&document);
    let words = collect_words(&document);
    let product_schema = has_product_schema(&document);
    let indicators = IndicatorSet::detect(&markers, &words, product_schema);

    PageFacts {
        links,
        indicators,
        base: extract_base(&document),
    }
}

fn is_markup(content_type: &str) -> bool {
    let content_type = content_type.to_ascii_lowercase();
    content_type.contains("html") || content_type.contains("xml") || content_type.starts_with("text/")
}

/// Checks that a raw link is worth passing to the normalizer
fn is_followable(href: &str) -> bool {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return false;
    }
    let lower = href.to_ascii_lowercase();
    !(lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:"))
}

/// The document base that relative links resolve against, if declared
fn extract_base(document: &Html) -> Option<String> {
    let selector = Selector::parse("base[href]").ok()?;
    document
        .select(&selector)
        .next()
        .and_then(|element| element.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .map(str::to_string)
}

fn extract_anchors(document: &Html) -> Vec<String> {
    let mut links = Vec::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if element.value().attr("download").is_some() {
                continue;
            }
            if let Some(href) = element.value().attr("href").filter(|h| is_followable(h)) {
                links.push(href.trim().to_string());
            }
        }
    }

    if let Ok(canonical_selector) = Selector::parse("link[rel='canonical'][href]") {
        for element in document.select(&canonical_selector) {
            if let Some(href) = element.value().attr("href").filter(|h| is_followable(h)) {
                links.push(href.trim().to_string());
            }
        }
    }

    links
}

fn extract_card_links(document: &Html) -> Vec<String> {
    let mut links = Vec::new();
    let (Ok(card_selector), Ok(a_selector)) = (
        Selector::parse(PRODUCT_CARD_SELECTOR),
        Selector::parse("a[href]"),
    ) else {
        return links;
    };

    for card in document.select(&card_selector) {
        links.extend(url_attributes(card));
        if let Some(href) = card.value().attr("href").filter(|h| is_followable(h)) {
            links.push(href.trim().to_string());
        }
        for anchor in card.select(&a_selector) {
            if let Some(href) = anchor.value().attr("href").filter(|h| is_followable(h)) {
                links.push(href.trim().to_string());
            }
        }
    }

    links
}

fn extract_data_urls(document: &Html) -> Vec<String> {
    let Ok(all) = Selector::parse("*") else {
        return Vec::new();
    };
    document.select(&all).flat_map(url_attributes).collect()
}

/// URL-valued `data-*` attributes of a single element
fn url_attributes(element: ElementRef<'_>) -> Vec<String> {
    element
        .value()
        .attrs()
        .filter(|(name, value)| {
            name.starts_with("data-")
                && (URL_ATTRIBUTES.contains(name) || looks_like_url(value))
        })
        .map(|(_, value)| value.trim())
        .filter(|value| is_followable(value))
        .map(str::to_string)
        .collect()
}

fn looks_like_url(value: &str) -> bool {
    let value = value.trim();
    if value.contains(char::is_whitespace) {
        return false;
    }
    value.starts_with("http://")
        || value.starts_with("https://")
        || (value.starts_with('/') && value.len() > 1 && !value.starts_with("//"))
}

fn extract_onclick_targets(document: &Html) -> Vec<String> {
    let Ok(selector) = Selector::parse("[onclick]") else {
        return Vec::new();
    };

    let mut targets = Vec::new();
    for element in document.select(&selector) {
        let Some(handler) = element.value().attr("onclick") else {
            continue;
        };
        for pattern in ONCLICK_PATTERNS.iter() {
            for captures in pattern.captures_iter(handler) {
                if let Some(target) = captures.get(1).map(|m| m.as_str()) {
                    if is_followable(target) {
                        targets.push(target.to_string());
                    }
                }
            }
        }
    }
    targets
}

/// Attribute names, selected attribute values and short control labels, compacted
fn collect_markers(document: &Html) -> BTreeSet<String> {
    let mut markers = BTreeSet::new();

    if let Ok(all) = Selector::parse("*") {
        for element in document.select(&all) {
            for (name, value) in element.value().attrs() {
                markers.insert(compact_marker(name));
                if MARKER_ATTRIBUTES.contains(&name) {
                    for token in value.split_whitespace() {
                        markers.insert(compact_marker(token));
                    }
                }
            }
        }
    }

    if let Ok(controls) = Selector::parse("button, a, input[type='submit'], input[type='button']") {
        for element in document.select(&controls) {
            let label = match element.value().attr("value") {
                Some(value) if element.value().name() == "input" => value.to_string(),
                _ => element.text().collect::<String>(),
            };
            let label = label.trim();
            if !label.is_empty() && label.len() <= MAX_LABEL_LEN {
                markers.insert(compact_marker(label));
            }
        }
    }

    markers
}

/// Lower-cased words of visible text; script and style contents are skipped
fn collect_words(document: &Html) -> HashSet<String> {
    let mut words = HashSet::new();

    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node
            .parent()
            .and_then(|parent| parent.value().as_element().map(|e| e.name()))
            .is_some_and(|name| matches!(name, "script" | "style" | "noscript"));
        if hidden {
            continue;
        }
        for word in text.split(|c: char| !c.is_alphanumeric()) {
            if !word.is_empty() {
                words.insert(word.to_lowercase());
            }
        }
    }

    words
}

/// Checks microdata and JSON-LD for a schema.org Product
fn has_product_schema(document: &Html) -> bool {
    if let Ok(selector) = Selector::parse("[itemtype]") {
        let microdata = document.select(&selector).any(|element| {
            element
                .value()
                .attr("itemtype")
                .is_some_and(|t| t.to_ascii_lowercase().contains("schema.org/product"))
        });
        if microdata {
            return true;
        }
    }

    let Ok(selector) = Selector::parse("script[type='application/ld+json']") else {
        return false;
    };
    document.select(&selector).any(|script| {
        let text: String = script.text().collect();
        serde_json::from_str::<serde_json::Value>(&text)
            .map(|value| declares_product(&value))
            .unwrap_or(false)
    })
}

fn declares_product(value: &serde_json::Value) -> bool {
    use serde_json::Value;

    match value {
        Value::Object(map) => {
            let typed = match map.get("@type") {
                Some(Value::String(t)) => t.eq_ignore_ascii_case("product"),
                Some(Value::Array(types)) => types
                    .iter()
                    .any(|t| t.as_str().is_some_and(|t| t.eq_ignore_ascii_case("product"))),
                _ => false,
            };
            typed || map.get("@graph").is_some_and(declares_product)
        }
        Value::Array(items) => items.iter().any(declares_product),
        _ => false,
    }
}
