use crate::classify::{is_product_url, IndicatorSet, PatternRecord};
use crate::state::DomainState;
use crate::url::NormalizedUrl;
use tracing::{debug, info};

/// Derives new product patterns for a domain from one fetched page
///
/// When the page shows at least `min_indicators` distinct product indicators
/// and its URL is not already classified as a product, two prefixes are taken
/// from its path: the first segment (`/category/`) and the first two
/// segments (`/category/kurta/`). Each is appended to the domain's learned
/// patterns unless already present, so learning from the same page twice
/// changes nothing.
///
/// Pages with fewer than two path segments never produce patterns.
///
/// # Arguments
///
/// * `indicators` - Indicators detected on the page
/// * `url` - The page's effective URL
/// * `state` - The domain's state; only `learned_patterns` is touched
/// * `min_indicators` - Distinct indicators required before learning
///
/// # Returns
///
/// The pattern strings that were newly added
pub fn learn(
    indicators: &IndicatorSet,
    url: &NormalizedUrl,
    state: &mut DomainState,
    min_indicators: usize,
) -> Vec<String> {
    if indicators.is_empty() || indicators.len() < min_indicators {
        return Vec::new();
    }
    if is_product_url(url, state) {
        return Vec::new();
    }

    let segments: Vec<&str> = url.path().split('/').filter(|s| !s.is_empty()).collect();
    if segments.len() < 2 {
        debug!(url = %url, "Indicators found but path too shallow to learn from");
        return Vec::new();
    }

    let candidates = [
        format!("/{}/", segments[0]),
        format!("/{}/{}/", segments[0], segments[1]),
    ];

    let mut added = Vec::new();
    for prefix in candidates {
        let record = PatternRecord::learned(&prefix, indicators.clone());
        let pattern = record.pattern_str().to_string();
        if state.add_learned(record) {
            info!(
                domain = %state.target().domain(),
                pattern = %pattern,
                signal = %indicators,
                "Learned product pattern"
            );
            added.push(pattern);
        }
    }
    added
}
