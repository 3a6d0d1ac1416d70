use crate::crawler::DomainRun;
use crate::output::stats::CrawlStatistics;
use crate::state::CrawlPhase;
use crate::url::CrawlTarget;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// A pattern learned during one domain's crawl
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LearnedPattern {
    pub pattern: String,
    /// The indicators that produced it
    pub signal: String,
}

/// Result of crawling one domain
#[derive(Debug, Clone, Serialize)]
pub struct DomainReport {
    pub domain: String,

    /// Canonical homepage; the key of the product map
    pub homepage: String,

    /// Product URLs in discovery order
    pub product_urls: Vec<String>,

    pub pages_fetched: usize,
    pub learned_patterns: Vec<LearnedPattern>,

    /// Dispatched fetches that did not end in a processed page, by outcome
    pub skipped_pages: BTreeMap<String, u64>,

    pub phase: CrawlPhase,
    pub peak_in_flight: usize,

    /// The domain task died before reporting
    pub failed: bool,
}

impl DomainReport {
    pub fn from_run(run: &DomainRun) -> Self {
        let state = &run.state;
        let target = state.target();

        let skipped_pages = state
            .page_outcomes()
            .iter()
            .filter(|(outcome, _)| outcome.is_error())
            .map(|(outcome, count)| (outcome.as_str().to_string(), *count))
            .collect();

        Self {
            domain: target.domain().to_string(),
            homepage: target.homepage().to_string(),
            product_urls: state.product_urls().iter().map(|u| u.to_string()).collect(),
            pages_fetched: state.pages_fetched(),
            learned_patterns: state
                .learned_patterns()
                .iter()
                .map(|p| LearnedPattern {
                    pattern: p.pattern_str().to_string(),
                    signal: p.signal.to_string(),
                })
                .collect(),
            skipped_pages,
            phase: state.phase(),
            peak_in_flight: run.peak_in_flight,
            failed: false,
        }
    }

    /// Zero-result report for a domain whose crawl never finished
    pub fn empty(target: &CrawlTarget) -> Self {
        Self {
            domain: target.domain().to_string(),
            homepage: target.homepage().to_string(),
            product_urls: Vec::new(),
            pages_fetched: 0,
            learned_patterns: Vec::new(),
            skipped_pages: BTreeMap::new(),
            phase: CrawlPhase::Seeded,
            peak_in_flight: 0,
            failed: true,
        }
    }

    pub fn skipped_total(&self) -> u64 {
        self.skipped_pages.values().sum()
    }
}

/// Result of a whole multi-domain run
#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// One report per requested domain, in request order
    pub domains: Vec<DomainReport>,
}

impl CrawlReport {
    /// Homepage → product URLs, for every requested domain
    ///
    /// Domains without results map to an empty list.
    pub fn product_map(&self) -> BTreeMap<String, Vec<String>> {
        self.domains
            .iter()
            .map(|d| (d.homepage.clone(), d.product_urls.clone()))
            .collect()
    }

    pub fn total_product_urls(&self) -> usize {
        self.domains.iter().map(|d| d.product_urls.len()).sum()
    }

    pub fn statistics(&self) -> CrawlStatistics {
        CrawlStatistics::from_report(self)
    }
}
