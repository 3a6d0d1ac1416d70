//! Multi-domain scheduler
//!
//! Runs one `DomainCrawler` per requested domain, all at once, and collects
//! their results in request order. Domains share the HTTP client and the
//! static pattern table, nothing else.

use crate::config::{validate, Config};
use crate::crawler::coordinator::{DomainCrawler, DomainRun};
use crate::crawler::fetcher::{build_http_client, Fetcher};
use crate::output::{CrawlReport, DomainReport};
use crate::url::CrawlTarget;
use chrono::Utc;
use tokio::task::JoinSet;

/// Scheduler owns the validated configuration and the shared client
pub struct Scheduler {
    config: Config,
    targets: Vec<CrawlTarget>,
    fetcher: Fetcher,
}

impl Scheduler {
    /// Creates a new scheduler
    ///
    /// Validation happens here, so configuration errors surface before any
    /// request is sent.
    ///
    /// # Returns
    ///
    /// * `Ok(Scheduler)` - Ready to run
    /// * `Err(ShelfError)` - Invalid configuration or HTTP client failure
    pub fn new(config: Config) -> crate::Result<Self> {
        validate(&config)?;
        let targets = config.targets()?;
        let client = build_http_client(&config.crawler.user_agent)?;

        Ok(Self {
            config,
            targets,
            fetcher: Fetcher::new(client),
        })
    }

    pub fn targets(&self) -> &[CrawlTarget] {
        &self.targets
    }

    /// Builds the crawler for one target with its resolved settings
    pub fn crawler_for(&self, target: &CrawlTarget) -> crate::Result<DomainCrawler> {
        let settings = self.config.settings_for(target);
        let fetcher = self.fetcher.with_headers(&settings.headers)?;
        Ok(DomainCrawler::new(target.clone(), settings, fetcher))
    }

    /// Crawls every domain concurrently
    ///
    /// A domain whose task fails is logged and reported with zero results;
    /// the other domains are unaffected.
    pub async fn run(self) -> CrawlReport {
        let started_at = Utc::now();
        tracing::info!("Starting crawl of {} domains", self.targets.len());

        let mut tasks: JoinSet<(usize, DomainRun)> = JoinSet::new();
        for (index, target) in self.targets.iter().enumerate() {
            match self.crawler_for(target) {
                Ok(crawler) => {
                    tasks.spawn(async move { (index, crawler.run().await) });
                }
                Err(e) => tracing::warn!("Skipping {}: {}", target.domain(), e),
            }
        }

        let mut runs: Vec<Option<DomainRun>> = self.targets.iter().map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, run)) => runs[index] = Some(run),
                Err(e) => tracing::warn!("Domain task failed: {}", e),
            }
        }

        let domains = self
            .targets
            .iter()
            .zip(runs)
            .map(|(target, run)| match run {
                Some(run) => DomainReport::from_run(&run),
                None => DomainReport::empty(target),
            })
            .collect();

        let report = CrawlReport {
            started_at,
            finished_at: Utc::now(),
            domains,
        };
        tracing::info!(
            "Crawl finished: {} product URLs across {} domains",
            report.total_product_urls(),
            report.domains.len()
        );
        report
    }
}

/// Runs a complete crawl
///
/// This is the main entry point. It will:
/// 1. Validate the configuration
/// 2. Build the shared HTTP client
/// 3. Crawl every domain concurrently
/// 4. Return the per-domain results
///
/// # Returns
///
/// * `Ok(CrawlReport)` - The crawl ran; individual domains may have failed
/// * `Err(ShelfError)` - Fatal configuration error; nothing was crawled
pub async fn crawl(config: Config) -> crate::Result<CrawlReport> {
    Ok(Scheduler::new(config)?.run().await)
}
