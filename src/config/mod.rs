//! Configuration module for Shelf-Ripple
//!
//! This module handles loading TOML configuration files, merging command-line
//! overrides and validating the result before any crawling starts.
//!
//! # Example
//!
//! ```no_run
//! use shelf_ripple::config::{apply_overrides, load_config, ConfigOverrides};
//! use std::path::Path;
//!
//! let config = load_config(Path::new("shelf-ripple.toml")).unwrap();
//! let config = apply_overrides(config, ConfigOverrides::default()).unwrap();
//! println!("Crawling {} domains", config.crawler.domains.len());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, ConfigOverrides, CrawlerConfig, DomainSettings, SiteEntry, DEFAULT_SEED_PATHS,
    DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{apply_overrides, load_config, parse_config};
pub use validation::validate;
