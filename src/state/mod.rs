//! State module for tracking crawl progress
//!
//! This module provides the per-domain crawl state and its lifecycle.
//!
//! # Components
//!
//! - `DomainState`: frontier, visited set, product URLs and learned patterns for one domain
//! - `CrawlPhase`: the domain crawl state machine
//! - `PageState`: how each dispatched fetch ended

mod domain_state;
mod page_state;
mod phase;

// Re-export main types
pub use domain_state::{DomainState, FrontierEntry};
pub use page_state::PageState;
pub use phase::CrawlPhase;
