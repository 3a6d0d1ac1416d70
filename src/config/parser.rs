use crate::config::types::{Config, ConfigOverrides};
use crate::config::validation::validate;
use crate::ConfigResult;
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded configuration
/// * `Err(ConfigError)` - Failed to read or parse the file
///
/// Validation is left to the caller because command-line overrides may still
/// change the values (the domain list in particular).
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use shelf_ripple::config::load_config;
///
/// let config = load_config(Path::new("shelf-ripple.toml")).unwrap();
/// println!("Max pages: {}", config.crawler.max_pages);
/// ```
pub fn load_config(path: &Path) -> ConfigResult<Config> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses configuration from TOML text
pub fn parse_config(content: &str) -> ConfigResult<Config> {
    let config: Config = toml::from_str(content)?;
    Ok(config)
}

/// Applies command-line overrides and validates the result
///
/// # Arguments
///
/// * `config` - Configuration loaded from file, or the defaults
/// * `overrides` - Values given on the command line
///
/// # Returns
///
/// * `Ok(Config)` - The merged, validated configuration
/// * `Err(ConfigError)` - The merged configuration is invalid
pub fn apply_overrides(mut config: Config, overrides: ConfigOverrides) -> ConfigResult<Config> {
    let crawler = &mut config.crawler;

    if let Some(domains) = overrides.domains {
        crawler.domains = domains;
    }
    if let Some(max_pages) = overrides.max_pages {
        crawler.max_pages = max_pages;
    }
    if let Some(concurrency) = overrides.concurrency {
        crawler.concurrency = concurrency;
    }
    if let Some(delay) = overrides.delay {
        crawler.delay = delay;
    }
    if let Some(timeout) = overrides.timeout {
        crawler.timeout = timeout;
    }
    crawler.debug |= overrides.debug;

    validate(&config)?;
    Ok(config)
}
