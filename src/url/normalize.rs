use crate::classify::{path_matches, PatternRecord};
use crate::url::CrawlTarget;
use crate::{UrlError, UrlResult};
use std::fmt;
use url::Url;

/// List of tracking query parameters to remove during normalization
const TRACKING_PARAMS: &[&str] = &["fbclid", "gclid", "mc_eid", "ref", "source"];

/// An absolute, canonical, in-scope URL
///
/// Two links that normalize to the same value are the same frontier entry.
/// Built by [`normalize_url`], or from a target's homepage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedUrl(Url);

impl NormalizedUrl {
    /// The target's homepage, which is already in canonical form
    pub fn homepage(target: &CrawlTarget) -> Self {
        Self(target.homepage().clone())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn path(&self) -> &str {
        self.0.path()
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// Number of non-empty path segments
    pub fn depth(&self) -> usize {
        self.0.path().split('/').filter(|s| !s.is_empty()).count()
    }
}

impl fmt::Display for NormalizedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl AsRef<str> for NormalizedUrl {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Normalizes a raw link found on a page of `target`
///
/// # Normalization Steps
///
/// 1. Resolve `raw` against `base` (the page's effective URL); reject if malformed
/// 2. Reject non-HTTP(S) schemes and URLs without a host
/// 3. Reject hosts outside the target (a leading `www.` is folded)
/// 4. Rewrite scheme and host to the target's; the URL crate lowercases the
///    host and drops default ports
/// 5. Normalize path:
///    - Remove dot segments (. and ..)
///    - Collapse repeated slashes
///    - Remove trailing slash (except for root /)
/// 6. Remove fragment unless it is a `#!` route
/// 7. Keep the query only when the path matches a static or learned product
///    pattern; tracking parameters are dropped and the rest keep their order
///
/// Normalizing an already-normalized URL returns it unchanged, as long as the
/// learned patterns are the same.
///
/// # Arguments
///
/// * `raw` - The link as it appeared in the page
/// * `base` - URL the link is relative to
/// * `target` - The domain being crawled
/// * `learned` - Patterns learned so far for this domain
///
/// # Returns
///
/// * `Ok(NormalizedUrl)` - Canonical URL
/// * `Err(UrlError)` - The candidate is unusable and should be dropped
///
/// # Examples
///
/// ```
/// use shelf_ripple::url::{normalize_url, CrawlTarget};
///
/// let target = CrawlTarget::parse("shop.example").unwrap();
/// let url = normalize_url("HTTP://WWW.SHOP.EXAMPLE/about/?x=1", target.homepage(), &target, &[]).unwrap();
/// assert_eq!(url.as_str(), "https://shop.example/about");
/// ```
pub fn normalize_url(
    raw: &str,
    base: &Url,
    target: &CrawlTarget,
    learned: &[PatternRecord],
) -> UrlResult<NormalizedUrl> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(UrlError::Malformed("empty link".to_string()));
    }

    let mut url = base.join(raw).map_err(|e| UrlError::Parse(format!("{}: {}", raw, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }
    if url.host_str().is_none() {
        return Err(UrlError::MissingDomain);
    }
    if !target.in_scope(&url) {
        return Err(UrlError::OffDomain(
            url.host_str().unwrap_or_default().to_string(),
        ));
    }

    url.set_scheme(target.scheme())
        .map_err(|_| UrlError::InvalidScheme(target.scheme().to_string()))?;
    url.set_host(Some(target.host()))
        .map_err(|e| UrlError::Malformed(format!("Failed to set host: {}", e)))?;

    let normalized_path = normalize_path(url.path());
    url.set_path(&normalized_path);

    if !url.fragment().is_some_and(|f| f.starts_with('!')) {
        url.set_fragment(None);
    }

    let query = url.query().map(filter_query);
    match query {
        Some(q) if !q.is_empty() && path_matches(url.path(), learned) => url.set_query(Some(&q)),
        _ => url.set_query(None),
    }

    Ok(NormalizedUrl(url))
}

/// Normalizes a URL path by removing dot segments and trailing slashes
fn normalize_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }

    if segments.is_empty() {
        return "/".to_string();
    }
    format!("/{}", segments.join("/"))
}

/// Drops empty and tracking pairs from a raw query, keeping order and encoding
fn filter_query(query: &str) -> String {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter(|pair| {
            let key = pair.split('=').next().unwrap_or_default();
            !is_tracking_param(key)
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Checks if a query parameter is a tracking parameter
fn is_tracking_param(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    TRACKING_PARAMS.contains(&key.as_str()) || key.starts_with("utm_")
}
