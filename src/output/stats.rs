//! Run statistics
//!
//! The statistics artifact is written next to the product map, and the same
//! numbers are printed as a console summary when the run ends.

use crate::output::report::CrawlReport;
use serde::Serialize;
use std::collections::BTreeMap;

/// Crawl statistics summary
///
/// Per-domain maps are keyed by homepage, like the product map.
#[derive(Debug, Clone, Serialize)]
pub struct CrawlStatistics {
    /// Number of domains requested
    pub domains: usize,

    pub total_product_urls: usize,
    pub product_urls_per_domain: BTreeMap<String, usize>,
    pub pages_crawled_per_domain: BTreeMap<String, usize>,
    pub skipped_pages_per_domain: BTreeMap<String, u64>,
    pub learned_patterns_per_domain: BTreeMap<String, usize>,

    /// Domains whose crawl task died
    pub failed_domains: Vec<String>,

    pub duration_secs: f64,
}

impl CrawlStatistics {
    pub fn from_report(report: &CrawlReport) -> Self {
        let mut stats = Self {
            domains: report.domains.len(),
            total_product_urls: report.total_product_urls(),
            product_urls_per_domain: BTreeMap::new(),
            pages_crawled_per_domain: BTreeMap::new(),
            skipped_pages_per_domain: BTreeMap::new(),
            learned_patterns_per_domain: BTreeMap::new(),
            failed_domains: Vec::new(),
            duration_secs: (report.finished_at - report.started_at)
                .to_std()
                .map(|d| d.as_secs_f64())
                .unwrap_or(0.0),
        };

        for domain in &report.domains {
            let key = domain.homepage.clone();
            stats
                .product_urls_per_domain
                .insert(key.clone(), domain.product_urls.len());
            stats
                .pages_crawled_per_domain
                .insert(key.clone(), domain.pages_fetched);
            stats
                .skipped_pages_per_domain
                .insert(key.clone(), domain.skipped_total());
            stats
                .learned_patterns_per_domain
                .insert(key, domain.learned_patterns.len());
            if domain.failed {
                stats.failed_domains.push(domain.domain.clone());
            }
        }

        stats
    }

    pub fn total_pages_crawled(&self) -> usize {
        self.pages_crawled_per_domain.values().sum()
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Domains crawled: {}", stats.domains);
    println!("  Pages fetched: {}", stats.total_pages_crawled());
    println!("  Product URLs found: {}", stats.total_product_urls);
    println!("  Duration: {:.1}s", stats.duration_secs);
    println!();

    println!("Product URLs by Domain:");
    // Sort domains by product count (descending)
    let mut product_counts: Vec<_> = stats.product_urls_per_domain.iter().collect();
    product_counts.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

    for (homepage, count) in product_counts {
        let pages = stats
            .pages_crawled_per_domain
            .get(homepage)
            .copied()
            .unwrap_or(0);
        let skipped = stats
            .skipped_pages_per_domain
            .get(homepage)
            .copied()
            .unwrap_or(0);
        let learned = stats
            .learned_patterns_per_domain
            .get(homepage)
            .copied()
            .unwrap_or(0);
        println!(
            "  {}: {} products ({} pages, {} skipped, {} learned patterns)",
            homepage, count, pages, skipped, learned
        );
    }
    println!();

    if !stats.failed_domains.is_empty() {
        println!("Failed Domains ({}):", stats.failed_domains.len());
        for domain in &stats.failed_domains {
            println!("  - {}", domain);
        }
        println!();
    }

    let pages = stats.total_pages_crawled();
    let yield_rate = if pages > 0 {
        (stats.total_product_urls as f64 / pages as f64) * 100.0
    } else {
        0.0
    };
    println!(
        "Product Yield: {:.1}% ({} product URLs / {} pages fetched)",
        yield_rate, stats.total_product_urls, pages
    );
}
