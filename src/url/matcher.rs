/// Checks if a host matches a site pattern
///
/// Site patterns key the per-site overrides in the configuration. Two forms
/// are supported:
/// 1. Exact match: "example.com" matches only "example.com"
/// 2. Wildcard match: "*.example.com" matches "example.com" and any subdomain
///
/// # Examples
///
/// ```
/// use shelf_ripple::url::matches_wildcard;
///
/// assert!(matches_wildcard("example.com", "example.com"));
/// assert!(matches_wildcard("*.example.com", "shop.example.com"));
/// assert!(!matches_wildcard("*.example.com", "example.org"));
/// ```
pub fn matches_wildcard(pattern: &str, candidate: &str) -> bool {
    if let Some(base) = pattern.strip_prefix("*.") {
        candidate == base || candidate.ends_with(&format!(".{}", base))
    } else {
        candidate == pattern
    }
}

/// Strips a single leading `www.` label
pub fn strip_www(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}

/// Returns true if two lowercase hosts name the same site
///
/// `www.shop.example` and `shop.example` are aliases; any other subdomain is
/// a different site.
pub fn same_site(a: &str, b: &str) -> bool {
    strip_www(a) == strip_www(b)
}
