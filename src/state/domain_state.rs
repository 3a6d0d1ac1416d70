use crate::classify::PatternRecord;
use crate::state::{CrawlPhase, PageState};
use crate::url::{CrawlTarget, NormalizedUrl};
use crate::ShelfError;
use std::collections::{HashMap, HashSet, VecDeque};

/// A frontier URL together with the link depth it was discovered at
///
/// The depth is diagnostic only; traversal order comes from the FIFO queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    pub url: NormalizedUrl,
    pub depth: u32,
}

/// Tracks the state of one domain during crawling
///
/// Owned by exactly one domain task. Every mutation goes through that task,
/// so no locking is needed. Once the task finishes the state is handed to the
/// scheduler and only read from then on.
#[derive(Debug)]
pub struct DomainState {
    target: CrawlTarget,

    /// Page budget for this domain
    max_pages: usize,

    /// Every URL ever enqueued; grows only
    visited: HashSet<NormalizedUrl>,

    /// Pending URLs in discovery order
    frontier: VecDeque<FrontierEntry>,

    /// Confirmed product pages in discovery order
    product_urls: Vec<NormalizedUrl>,
    product_index: HashSet<NormalizedUrl>,

    /// Domain-specific patterns; append-only
    learned_patterns: Vec<PatternRecord>,

    /// Fetches dispatched so far, successful or not
    pages_fetched: usize,

    /// URLs in the order they were dispatched
    fetch_log: Vec<NormalizedUrl>,
    dispatched: HashSet<NormalizedUrl>,

    /// How each dispatched fetch ended
    page_outcomes: HashMap<PageState, u64>,

    phase: CrawlPhase,
}

impl DomainState {
    /// Creates an empty state for a target with the given page budget
    pub fn new(target: CrawlTarget, max_pages: usize) -> Self {
        Self {
            target,
            max_pages,
            visited: HashSet::new(),
            frontier: VecDeque::new(),
            product_urls: Vec::new(),
            product_index: HashSet::new(),
            learned_patterns: Vec::new(),
            pages_fetched: 0,
            fetch_log: Vec::new(),
            dispatched: HashSet::new(),
            page_outcomes: HashMap::new(),
            phase: CrawlPhase::Seeded,
        }
    }

    /// Queues the seed URLs at depth 0
    ///
    /// The homepage should come first so that it is the first page fetched.
    pub fn seed(&mut self, seeds: impl IntoIterator<Item = NormalizedUrl>) {
        for url in seeds {
            self.enqueue(url, 0);
        }
    }

    /// Adds a URL to the frontier unless it was seen before
    ///
    /// The URL is marked visited here, at discovery time, so it can enter the
    /// frontier at most once.
    ///
    /// # Returns
    ///
    /// * `true` - The URL was new and has been queued
    /// * `false` - The URL was already visited
    pub fn enqueue(&mut self, url: NormalizedUrl, depth: u32) -> bool {
        if !self.visited.insert(url.clone()) {
            return false;
        }
        self.frontier.push_back(FrontierEntry { url, depth });
        true
    }

    /// Records a URL as fetched without it going through the frontier
    ///
    /// Used for the final URL of a redirect. The URL is marked visited so it
    /// is never queued, and any frontier entry already waiting for it is
    /// skipped at dispatch.
    ///
    /// # Returns
    ///
    /// * `true` - The URL had not been fetched before
    /// * `false` - The URL was already dispatched
    pub fn mark_fetched(&mut self, url: NormalizedUrl) -> bool {
        self.visited.insert(url.clone());
        self.dispatched.insert(url)
    }

    /// Pops the next frontier entry and charges it against the page budget
    ///
    /// Returns `None` when the budget is used or the frontier is empty.
    /// Entries that were already dispatched are skipped.
    pub fn next_dispatch(&mut self) -> Option<FrontierEntry> {
        while !self.budget_exhausted() {
            let entry = self.frontier.pop_front()?;
            if !self.dispatched.insert(entry.url.clone()) {
                continue;
            }
            self.pages_fetched += 1;
            self.fetch_log.push(entry.url.clone());
            return Some(entry);
        }
        None
    }

    /// Records a product URL; returns false if it was already recorded
    pub fn record_product(&mut self, url: NormalizedUrl) -> bool {
        if !self.product_index.insert(url.clone()) {
            return false;
        }
        self.product_urls.push(url);
        true
    }

    /// Appends a learned pattern unless one with the same text exists
    pub fn add_learned(&mut self, record: PatternRecord) -> bool {
        if self
            .learned_patterns
            .iter()
            .any(|p| p.pattern_str() == record.pattern_str())
        {
            return false;
        }
        self.learned_patterns.push(record);
        true
    }

    /// Counts the outcome of one dispatched fetch
    pub fn record_outcome(&mut self, outcome: PageState) {
        *self.page_outcomes.entry(outcome).or_insert(0) += 1;
    }

    /// Moves the crawl to its next phase
    pub fn advance(&mut self, next: CrawlPhase) -> Result<(), ShelfError> {
        self.phase = self.phase.advance(next)?;
        Ok(())
    }

    /// Checks if the page budget has been used up
    pub fn budget_exhausted(&self) -> bool {
        self.pages_fetched >= self.max_pages
    }

    pub fn frontier_is_empty(&self) -> bool {
        self.frontier.is_empty()
    }

    pub fn frontier_len(&self) -> usize {
        self.frontier.len()
    }

    pub fn target(&self) -> &CrawlTarget {
        &self.target
    }

    pub fn max_pages(&self) -> usize {
        self.max_pages
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    pub fn product_urls(&self) -> &[NormalizedUrl] {
        &self.product_urls
    }

    pub fn learned_patterns(&self) -> &[PatternRecord] {
        &self.learned_patterns
    }

    pub fn fetch_log(&self) -> &[NormalizedUrl] {
        &self.fetch_log
    }

    pub fn page_outcomes(&self) -> &HashMap<PageState, u64> {
        &self.page_outcomes
    }

    /// Number of dispatched fetches that did not end in `Processed`
    pub fn skipped_pages(&self) -> u64 {
        self.page_outcomes
            .iter()
            .filter(|(state, _)| state.is_error())
            .map(|(_, count)| count)
            .sum()
    }

    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }
}
