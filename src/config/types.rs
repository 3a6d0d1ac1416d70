use crate::url::{matches_wildcard, strip_www, CrawlTarget};
use crate::ConfigError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// Browser-like user agent sent when none is configured
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";

/// Storefront entry points queued after the homepage unless configured otherwise
pub const DEFAULT_SEED_PATHS: &[&str] = &[
    "/products",
    "/shop",
    "/catalog",
    "/collection",
    "/category",
    "/fashion",
    "/clothing",
    "/apparel",
    "/accessories",
    "/footwear",
    "/beauty",
];

/// Main configuration structure for Shelf-Ripple
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Per-site overrides; the first entry whose pattern matches wins
    #[serde(default)]
    pub site: Vec<SiteEntry>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum number of pages fetched per domain
    #[serde(rename = "max-pages")]
    pub max_pages: usize,

    /// Maximum number of simultaneous in-flight fetches per domain
    pub concurrency: usize,

    /// Minimum time between request starts to the same domain (seconds)
    pub delay: f64,

    /// Per-request timeout (seconds)
    pub timeout: f64,

    /// Verbose logging
    pub debug: bool,

    /// Distinct content indicators required before learning a pattern
    #[serde(rename = "min-indicators")]
    pub min_indicators: usize,

    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Extra paths queued after the homepage on every domain
    ///
    /// Defaults to the usual storefront entry points. Set `seed-paths = []`
    /// to start from the homepage alone.
    #[serde(rename = "seed-paths")]
    pub seed_paths: Vec<String>,

    /// Domains to crawl
    pub domains: Vec<String>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_pages: 1000,
            concurrency: 10,
            delay: 0.5,
            timeout: 30.0,
            debug: false,
            min_indicators: 1,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            seed_paths: DEFAULT_SEED_PATHS.iter().map(|p| p.to_string()).collect(),
            domains: Vec::new(),
        }
    }
}

/// Overrides for sites that need gentler pacing or special headers
#[derive(Debug, Clone, Deserialize)]
pub struct SiteEntry {
    /// Domain pattern (e.g., "example.com" or "*.example.com")
    pub domain: String,

    /// Replaces the crawler delay for this site (seconds)
    #[serde(default)]
    pub delay: Option<f64>,

    /// Paths queued after the homepage, in addition to the crawler-wide ones
    #[serde(default, rename = "seed-paths")]
    pub seed_paths: Vec<String>,

    /// Extra request headers
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

/// Values given on the command line; each one replaces the file value
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub domains: Option<Vec<String>>,
    pub max_pages: Option<usize>,
    pub concurrency: Option<usize>,
    pub delay: Option<f64>,
    pub timeout: Option<f64>,
    pub debug: bool,
}

/// Settings for one domain's crawl, resolved from the crawler config and the
/// matching site entry
#[derive(Debug, Clone, PartialEq)]
pub struct DomainSettings {
    pub max_pages: usize,
    pub concurrency: usize,
    pub delay: Duration,
    pub timeout: Duration,
    pub min_indicators: usize,
    pub seed_paths: Vec<String>,
    pub headers: BTreeMap<String, String>,
}

impl Config {
    /// Builds a configuration for the given domains with default settings
    pub fn for_domains<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut config = Self::default();
        config.crawler.domains = domains.into_iter().map(Into::into).collect();
        config
    }

    /// Parses the configured domains into crawl targets
    ///
    /// Domains that resolve to the same target are crawled once; the first
    /// occurrence keeps its position.
    pub fn targets(&self) -> Result<Vec<CrawlTarget>, ConfigError> {
        let mut targets: Vec<CrawlTarget> = Vec::new();
        for domain in &self.crawler.domains {
            let target = CrawlTarget::parse(domain).map_err(|e| {
                ConfigError::InvalidUrl(format!("Invalid domain '{}': {}", domain, e))
            })?;
            if !targets.iter().any(|t| t.domain() == target.domain()) {
                targets.push(target);
            }
        }
        Ok(targets)
    }

    /// Finds the site entry that applies to a target
    pub fn site_for(&self, target: &CrawlTarget) -> Option<&SiteEntry> {
        let host = strip_www(target.host());
        self.site
            .iter()
            .find(|entry| matches_wildcard(&entry.domain.to_lowercase(), host))
    }

    /// Resolves the settings one domain crawl runs with
    pub fn settings_for(&self, target: &CrawlTarget) -> DomainSettings {
        let crawler = &self.crawler;
        let site = self.site_for(target);

        let delay = site.and_then(|s| s.delay).unwrap_or(crawler.delay);
        let mut seed_paths = crawler.seed_paths.clone();
        let mut headers = BTreeMap::new();
        if let Some(site) = site {
            seed_paths.extend(site.seed_paths.iter().cloned());
            headers = site.headers.clone();
        }

        DomainSettings {
            max_pages: crawler.max_pages,
            concurrency: crawler.concurrency,
            delay: Duration::from_secs_f64(delay.max(0.0)),
            timeout: Duration::from_secs_f64(crawler.timeout.max(0.0)),
            min_indicators: crawler.min_indicators,
            seed_paths,
            headers,
        }
    }
}
