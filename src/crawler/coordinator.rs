//! Domain crawl orchestrator
//!
//! One `DomainCrawler` drives the breadth-first traversal of one domain:
//! - Seeding the frontier with the homepage and configured seed paths
//! - Dispatching fetches with bounded concurrency and request pacing
//! - Running extraction, learning and classification on each result
//! - Walking the phase machine to `Done`
//!
//! Fetches run as spawned tasks; everything that touches `DomainState`
//! happens on the crawler's own task, one result at a time.

use crate::classify::{is_product_content, is_product_url, learn};
use crate::config::DomainSettings;
use crate::crawler::extractor::extract_links;
use crate::crawler::fetcher::{Fetcher, PageContent};
use crate::crawler::parser::{parse_page, PageFacts};
use crate::crawler::throttle::{InFlightGauge, RequestPacer};
use crate::state::{CrawlPhase, DomainState, FrontierEntry, PageState};
use crate::url::{normalize_url, CrawlTarget, NormalizedUrl};
use crate::{FetchError, UrlError};
use std::sync::Arc;
use tokio::task::JoinSet;

type FetchOutcome = (FrontierEntry, Result<PageContent, FetchError>);

/// The finished crawl of one domain
#[derive(Debug)]
pub struct DomainRun {
    pub state: DomainState,
    /// Highest number of fetches that were on the wire at once
    pub peak_in_flight: usize,
}

/// Crawls a single domain
pub struct DomainCrawler {
    state: DomainState,
    settings: DomainSettings,
    fetcher: Fetcher,
    pacer: Arc<RequestPacer>,
    gauge: Arc<InFlightGauge>,
}

impl DomainCrawler {
    /// Creates a crawler with its frontier seeded
    ///
    /// The homepage is queued first, followed by each seed path in order.
    /// Seed paths that do not normalize are logged and dropped.
    pub fn new(target: CrawlTarget, settings: DomainSettings, fetcher: Fetcher) -> Self {
        let mut state = DomainState::new(target.clone(), settings.max_pages);

        let mut seeds = vec![NormalizedUrl::homepage(&target)];
        for path in &settings.seed_paths {
            match normalize_url(path, target.homepage(), &target, &[]) {
                Ok(url) => seeds.push(url),
                Err(e) => tracing::debug!("Dropping seed path {}: {}", path, e),
            }
        }
        state.seed(seeds);

        let pacer = Arc::new(RequestPacer::new(settings.delay));
        Self {
            state,
            settings,
            fetcher,
            pacer,
            gauge: InFlightGauge::new(),
        }
    }

    pub fn state(&self) -> &DomainState {
        &self.state
    }

    /// Runs the traversal until the frontier or the page budget is used up
    ///
    /// # Flow
    ///
    /// 1. Fill the task set up to `concurrency` from the frontier head
    /// 2. Stop dispatching once the budget is reached or nothing is left
    /// 3. Take the next finished fetch and process it
    /// 4. Drain what is still in flight, then finish
    ///
    /// Never fails: fetch errors become skipped pages.
    pub async fn run(mut self) -> DomainRun {
        let domain = self.state.target().domain().to_string();
        tracing::info!(
            "Crawling {} (max {} pages, concurrency {}, delay {:?})",
            domain,
            self.settings.max_pages,
            self.settings.concurrency,
            self.pacer.delay()
        );
        self.transition(CrawlPhase::Running);

        let mut in_flight: JoinSet<FetchOutcome> = JoinSet::new();
        loop {
            if !self.state.phase().is_stopping() {
                while in_flight.len() < self.settings.concurrency {
                    match self.state.next_dispatch() {
                        Some(entry) => self.spawn_fetch(&mut in_flight, entry),
                        None => break,
                    }
                }

                if self.state.budget_exhausted() {
                    tracing::info!("{}: page limit of {} reached", domain, self.state.max_pages());
                    self.transition(CrawlPhase::PageLimitReached);
                } else if in_flight.is_empty() && self.state.frontier_is_empty() {
                    tracing::info!("{}: frontier exhausted", domain);
                    self.transition(CrawlPhase::Exhausted);
                }
            }

            let Some(joined) = in_flight.join_next().await else {
                break;
            };
            match joined {
                Ok((entry, Ok(page))) => self.process_page(entry, page),
                Ok((entry, Err(e))) => self.record_failure(&entry, &e),
                Err(e) => {
                    tracing::warn!("{}: fetch task failed: {}", domain, e);
                    self.state.record_outcome(PageState::Failed);
                }
            }
        }

        if self.state.phase() == CrawlPhase::Running {
            self.transition(CrawlPhase::Exhausted);
        }
        self.transition(CrawlPhase::Done);

        tracing::info!(
            "{}: done after {} pages, {} product URLs, {} learned patterns",
            domain,
            self.state.pages_fetched(),
            self.state.product_urls().len(),
            self.state.learned_patterns().len()
        );

        DomainRun {
            peak_in_flight: self.gauge.peak(),
            state: self.state,
        }
    }

    fn spawn_fetch(&self, in_flight: &mut JoinSet<FetchOutcome>, entry: FrontierEntry) {
        let fetcher = self.fetcher.clone();
        let pacer = Arc::clone(&self.pacer);
        let gauge = Arc::clone(&self.gauge);
        let timeout = self.settings.timeout;

        tracing::trace!("Dispatching {} (depth {})", entry.url, entry.depth);
        in_flight.spawn(async move {
            pacer.wait_turn().await;
            let _guard = gauge.enter();
            let result = fetcher.fetch(entry.url.as_url(), timeout).await;
            (entry, result)
        });
    }

    /// Handles one successful fetch
    ///
    /// Learning runs before any classification so that links on this page
    /// are already judged with whatever the page itself taught.
    fn process_page(&mut self, entry: FrontierEntry, page: PageContent) {
        let target = self.state.target().clone();

        let page_url = match normalize_url(
            page.final_url.as_str(),
            &page.final_url,
            &target,
            self.state.learned_patterns(),
        ) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!(
                    "{} redirected off-domain to {}: {}",
                    entry.url,
                    page.final_url,
                    e
                );
                self.state.record_outcome(PageState::Processed);
                return;
            }
        };
        if page_url != entry.url && !self.state.mark_fetched(page_url.clone()) {
            tracing::debug!("{} redirected to already fetched {}", entry.url, page_url);
        }

        let facts = parse_page(&page).unwrap_or_else(|e| {
            tracing::debug!("{}", e);
            PageFacts::default()
        });

        learn(
            &facts.indicators,
            &page_url,
            &mut self.state,
            self.settings.min_indicators,
        );

        let product_page = is_product_url(&page_url, &self.state)
            || is_product_content(&facts.indicators, self.settings.min_indicators);
        if product_page && self.state.record_product(page_url.clone()) {
            tracing::info!("Product page: {} ({})", page_url, facts.indicators);
        }

        // Relative links resolve against <base href> when the page declares one
        let base = facts
            .base
            .as_deref()
            .and_then(|href| page.final_url.join(href).ok())
            .unwrap_or_else(|| page.final_url.clone());

        let mut discovered = 0usize;
        for link in extract_links(facts.links) {
            let url = match normalize_url(
                &link,
                &base,
                &target,
                self.state.learned_patterns(),
            ) {
                Ok(url) => url,
                Err(UrlError::OffDomain(_)) => {
                    tracing::trace!("Off-domain link {}", link);
                    continue;
                }
                Err(e) => {
                    tracing::trace!("Dropping link {}: {}", link, e);
                    continue;
                }
            };

            if is_product_url(&url, &self.state) && self.state.record_product(url.clone()) {
                tracing::debug!("Product link: {}", url);
            }
            if self.state.enqueue(url, entry.depth + 1) {
                discovered += 1;
            }
        }

        self.state.record_outcome(PageState::Processed);
        tracing::debug!(
            "Processed {} ({} new links, {} queued)",
            page_url,
            discovered,
            self.state.frontier_len()
        );
    }

    fn record_failure(&mut self, entry: &FrontierEntry, error: &FetchError) {
        let outcome = error.page_state();
        tracing::debug!("Skipping {} ({}): {}", entry.url, outcome, error);
        self.state.record_outcome(outcome);
    }

    fn transition(&mut self, next: CrawlPhase) {
        if let Err(e) = self.state.advance(next) {
            tracing::warn!("{}: {}", self.state.target().domain(), e);
        }
    }
}
