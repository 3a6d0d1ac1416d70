//! Product URL classification
//!
//! This module decides whether a URL is a product page and grows the set of
//! rules it decides with:
//! - `patterns`: the process-wide static pattern table and `PatternRecord`
//! - `indicators`: the fixed set of content indicators detected per page
//! - `learner`: derives per-domain patterns from pages showing indicators
//!
//! Classification is a pure predicate over the path. Learning is a separate
//! step that only the owning domain task performs.

mod indicators;
mod learner;
mod patterns;

pub use indicators::{compact_marker, Indicator, IndicatorSet};
pub use learner::learn;
pub use patterns::{PatternKind, PatternOrigin, PatternRecord, PatternSignal, STATIC_PATTERNS};

use crate::state::DomainState;
use crate::url::NormalizedUrl;

/// Returns true if a path matches any static pattern or one of `learned`
pub fn path_matches(path: &str, learned: &[PatternRecord]) -> bool {
    STATIC_PATTERNS.iter().any(|p| p.matches(path)) || learned.iter().any(|p| p.matches(path))
}

/// Classifies a normalized URL for one domain
///
/// Matching looks at the path only; scheme, host and query are ignored.
/// This never mutates `state`.
///
/// # Examples
///
/// ```
/// use shelf_ripple::classify::is_product_url;
/// use shelf_ripple::state::DomainState;
/// use shelf_ripple::url::{normalize_url, CrawlTarget};
///
/// let target = CrawlTarget::parse("shop.example").unwrap();
/// let state = DomainState::new(target.clone(), 10);
/// let url = normalize_url("/product/101", target.homepage(), &target, &[]).unwrap();
/// assert!(is_product_url(&url, &state));
/// ```
pub fn is_product_url(url: &NormalizedUrl, state: &DomainState) -> bool {
    path_matches(url.path(), state.learned_patterns())
}

/// Decides from page content alone whether the page is a product page
///
/// Structured product data is enough on its own. Otherwise the page needs
/// more distinct indicators than learning does, so that a single stray
/// price or cart button on a listing page does not count.
pub fn is_product_content(indicators: &IndicatorSet, min_indicators: usize) -> bool {
    indicators.contains(Indicator::ProductSchema) || indicators.len() > min_indicators.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::url::{normalize_url, CrawlTarget};

    #[test]
    fn test_product_content() {
        let schema: IndicatorSet = [Indicator::ProductSchema].into_iter().collect();
        let cart_and_price: IndicatorSet =
            [Indicator::AddToCart, Indicator::Price].into_iter().collect();
        let cart_only: IndicatorSet = [Indicator::AddToCart].into_iter().collect();

        assert!(is_product_content(&schema, 1));
        assert!(is_product_content(&schema, 5));
        assert!(is_product_content(&cart_and_price, 1));
        assert!(!is_product_content(&cart_and_price, 2));
        assert!(!is_product_content(&cart_only, 1));
        assert!(!is_product_content(&IndicatorSet::default(), 1));
    }

    #[test]
    fn test_static_match_without_learning() {
        let target = CrawlTarget::parse("shop.example").unwrap();
        let state = DomainState::new(target.clone(), 10);
        let product = normalize_url("/item/abc", target.homepage(), &target, &[]).unwrap();
        let other = normalize_url("/about", target.homepage(), &target, &[]).unwrap();
        assert!(is_product_url(&product, &state));
        assert!(!is_product_url(&other, &state));
    }

    #[test]
    fn test_learned_patterns_are_per_domain() {
        let a = CrawlTarget::parse("a.example").unwrap();
        let b = CrawlTarget::parse("b.example").unwrap();
        let mut state_a = DomainState::new(a.clone(), 10);
        let state_b = DomainState::new(b.clone(), 10);
        state_a.add_learned(PatternRecord::learned("/women/", IndicatorSet::default()));

        let url_a = normalize_url("/women/tops", a.homepage(), &a, &[]).unwrap();
        let url_b = normalize_url("/women/tops", b.homepage(), &b, &[]).unwrap();
        assert!(is_product_url(&url_a, &state_a));
        assert!(!is_product_url(&url_b, &state_b));
    }

    #[test]
    fn test_path_matches_ignores_query() {
        assert!(path_matches("/product/1", &[]));
        assert!(!path_matches("/search", &[]));
    }
}
