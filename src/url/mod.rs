//! URL handling module for Shelf-Ripple
//!
//! This module provides crawl targets, URL normalization, domain extraction
//! and site-pattern matching.

mod domain;
mod matcher;
mod normalize;

pub use domain::{extract_domain, CrawlTarget};
pub use matcher::{matches_wildcard, same_site, strip_www};
pub use normalize::{normalize_url, NormalizedUrl};
