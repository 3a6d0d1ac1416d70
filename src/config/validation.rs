use crate::config::types::{Config, CrawlerConfig, SiteEntry};
use crate::url::CrawlTarget;
use crate::{ConfigError, ConfigResult};
use reqwest::header::{HeaderName, HeaderValue};

/// Validates the entire configuration
///
/// Every failure here is fatal and is reported before any crawling starts.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_crawler_config(&config.crawler)?;
    validate_domains(&config.crawler.domains)?;
    validate_seed_paths(&config.crawler.seed_paths)?;
    validate_sites(&config.site)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> ConfigResult<()> {
    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max-pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.concurrency < 1 || config.concurrency > 100 {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and 100, got {}",
            config.concurrency
        )));
    }

    validate_delay("delay", config.delay)?;

    if !config.timeout.is_finite() || config.timeout <= 0.0 {
        return Err(ConfigError::Validation(format!(
            "timeout must be a positive number of seconds, got {}",
            config.timeout
        )));
    }

    if config.min_indicators < 1 {
        return Err(ConfigError::Validation(format!(
            "min-indicators must be >= 1, got {}",
            config.min_indicators
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }
    HeaderValue::from_str(&config.user_agent).map_err(|_| {
        ConfigError::Validation(format!(
            "user-agent contains invalid characters: '{}'",
            config.user_agent
        ))
    })?;

    Ok(())
}

fn validate_delay(name: &str, delay: f64) -> ConfigResult<()> {
    if !delay.is_finite() || delay < 0.0 {
        return Err(ConfigError::Validation(format!(
            "{} must be a non-negative number of seconds, got {}",
            name, delay
        )));
    }
    Ok(())
}

/// Validates the list of domains to crawl
fn validate_domains(domains: &[String]) -> ConfigResult<()> {
    if domains.is_empty() {
        return Err(ConfigError::Validation(
            "at least one domain is required".to_string(),
        ));
    }

    for domain in domains {
        CrawlTarget::parse(domain).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid domain '{}': {}", domain, e))
        })?;
    }

    Ok(())
}

/// Validates extra seed paths
fn validate_seed_paths(paths: &[String]) -> ConfigResult<()> {
    for path in paths {
        if !path.starts_with('/') || path.starts_with("//") {
            return Err(ConfigError::Validation(format!(
                "seed path '{}' must start with a single '/'",
                path
            )));
        }
    }
    Ok(())
}

/// Validates per-site override entries
fn validate_sites(sites: &[SiteEntry]) -> ConfigResult<()> {
    for entry in sites {
        validate_domain_pattern(&entry.domain)?;

        if let Some(delay) = entry.delay {
            validate_delay(&format!("delay for site '{}'", entry.domain), delay)?;
        }

        validate_seed_paths(&entry.seed_paths)?;

        for (name, value) in &entry.headers {
            HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
                ConfigError::Validation(format!(
                    "invalid header name '{}' for site '{}'",
                    name, entry.domain
                ))
            })?;
            HeaderValue::from_str(value).map_err(|_| {
                ConfigError::Validation(format!(
                    "invalid value for header '{}' for site '{}'",
                    name, entry.domain
                ))
            })?;
        }
    }
    Ok(())
}

/// Validates a domain pattern (supports wildcards)
fn validate_domain_pattern(pattern: &str) -> ConfigResult<()> {
    if pattern.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain pattern cannot be empty".to_string(),
        ));
    }

    match pattern.strip_prefix("*.") {
        Some(domain) => validate_domain_string(domain),
        None => validate_domain_string(pattern),
    }
}

/// Validates a domain string (without wildcard prefix)
fn validate_domain_string(domain: &str) -> ConfigResult<()> {
    if domain.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain cannot be empty".to_string(),
        ));
    }

    if !domain
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' contains invalid characters",
            domain
        )));
    }

    if domain.starts_with('.')
        || domain.ends_with('.')
        || domain.starts_with('-')
        || domain.ends_with('-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot start or end with '.' or '-'",
            domain
        )));
    }

    if domain.contains("..") {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot contain consecutive dots",
            domain
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' must contain at least one dot (e.g., 'example.com')",
            domain
        )));
    }

    Ok(())
}
