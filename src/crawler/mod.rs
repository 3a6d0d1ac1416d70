//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with redirect and timeout handling
//! - HTML parsing into structural facts and link extraction
//! - Per-domain pacing and bounded concurrency
//! - Per-domain traversal and multi-domain scheduling

mod coordinator;
mod extractor;
mod fetcher;
mod parser;
mod scheduler;
mod throttle;

pub use coordinator::{DomainCrawler, DomainRun};
pub use extractor::{extract_links, looks_like_asset};
pub use fetcher::{build_http_client, Fetcher, PageContent, MAX_REDIRECTS};
pub use parser::{parse_html, parse_page, LinkCandidates, PageFacts};
pub use scheduler::{crawl, Scheduler};
pub use throttle::{InFlightGauge, InFlightGuard, RequestPacer};
