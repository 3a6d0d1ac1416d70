use crate::classify::IndicatorSet;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// How a pattern is matched against a URL path
#[derive(Debug, Clone)]
pub enum PatternKind {
    /// Lowercase segment run like `/category/`, matched wherever it occurs
    /// in the path as long as more path follows it
    Prefix(String),
    /// Case-insensitive regular expression searched in the path
    Regex(Regex),
}

/// Where a pattern came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternOrigin {
    Static,
    Learned,
}

impl PatternOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::Learned => "learned",
        }
    }
}

/// The evidence that produced a pattern
#[derive(Debug, Clone)]
pub enum PatternSignal {
    /// A URL shape known before crawling
    UrlShape(&'static str),
    /// Content indicators observed on the page the pattern was derived from
    Content(IndicatorSet),
}

impl fmt::Display for PatternSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UrlShape(shape) => f.write_str(shape),
            Self::Content(indicators) => write!(f, "{}", indicators),
        }
    }
}

/// A product-URL rule
#[derive(Debug, Clone)]
pub struct PatternRecord {
    pub kind: PatternKind,
    pub origin: PatternOrigin,
    pub signal: PatternSignal,
}

impl PatternRecord {
    /// Builds a static regex pattern
    ///
    /// Only called with the hardcoded table below.
    fn fixed(pattern: &str, shape: &'static str) -> Self {
        let regex = Regex::new(pattern).expect("hardcoded regex pattern is valid");
        Self {
            kind: PatternKind::Regex(regex),
            origin: PatternOrigin::Static,
            signal: PatternSignal::UrlShape(shape),
        }
    }

    /// Builds a learned prefix pattern
    ///
    /// The prefix is lower-cased and given a trailing `/` so that it only
    /// matches whole segments.
    pub fn learned(prefix: &str, evidence: IndicatorSet) -> Self {
        let mut prefix = prefix.to_ascii_lowercase();
        if !prefix.starts_with('/') {
            prefix.insert(0, '/');
        }
        if !prefix.ends_with('/') {
            prefix.push('/');
        }
        Self {
            kind: PatternKind::Prefix(prefix),
            origin: PatternOrigin::Learned,
            signal: PatternSignal::Content(evidence),
        }
    }

    /// The pattern's source text; learned patterns are deduplicated on it
    pub fn pattern_str(&self) -> &str {
        match &self.kind {
            PatternKind::Prefix(prefix) => prefix,
            PatternKind::Regex(regex) => regex.as_str(),
        }
    }

    /// Returns true if the URL path matches this pattern
    pub fn matches(&self, path: &str) -> bool {
        match &self.kind {
            PatternKind::Prefix(prefix) => {
                let path = path.to_ascii_lowercase();
                path.match_indices(prefix.as_str())
                    .any(|(start, _)| start + prefix.len() < path.len())
            }
            PatternKind::Regex(regex) => regex.is_match(path),
        }
    }
}

/// Product URL shapes shared by every domain
///
/// Every expression is anchored on `/` so that it only matches whole path
/// segments.
pub static STATIC_PATTERNS: LazyLock<Vec<PatternRecord>> = LazyLock::new(|| {
    vec![
        PatternRecord::fixed(
            r"(?i)/(?:products?|items?|p|pd|buy|shop|goods?|detail|prod|dp|sku)/[^/]+",
            "product path segment",
        ),
        PatternRecord::fixed(
            r"(?i)/(?:catalog|collections?|category|categories)/[^/]*\d[^/]*",
            "listing segment with identifier",
        ),
        PatternRecord::fixed(r"(?i)^/[^/]+/\d{3,}$", "numeric product id"),
        PatternRecord::fixed(r"(?i)^/[^/]+-\d{5,}(?:\.html?)?$", "slug with numeric id"),
        PatternRecord::fixed(r"(?i)/[^/]+/\d+\.html?$", "numeric html page"),
        PatternRecord::fixed(r"(?i)/[^/]+-pd?-\d+\.html?$", "-p-<digits>.html suffix"),
        PatternRecord::fixed(
            r"(?i)^/[^/]+/p-[a-z0-9]*\d[a-z0-9]*/?$",
            "p-<code> product slug",
        ),
    ]
});
