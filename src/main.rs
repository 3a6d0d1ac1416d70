//! Shelf-Ripple main entry point
//!
//! This is the command-line interface for the Shelf-Ripple product crawler.

use anyhow::Context;
use clap::Parser;
use shelf_ripple::config::{apply_overrides, load_config, Config, ConfigOverrides};
use shelf_ripple::crawler::Scheduler;
use shelf_ripple::output::{print_statistics, write_results};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Shelf-Ripple: an adaptive product-page crawler
///
/// Shelf-Ripple walks each domain breadth-first and writes every URL that
/// looks like a product detail page. It starts from known URL shapes and
/// learns new ones per domain from the content of the pages it visits.
#[derive(Parser, Debug)]
#[command(name = "shelf-ripple")]
#[command(version = "1.0.0")]
#[command(about = "An adaptive product-page crawler", long_about = None)]
struct Cli {
    /// Domains to crawl (e.g. shop.example)
    #[arg(long, num_args = 1.., value_name = "DOMAIN")]
    domains: Vec<String>,

    /// Path to TOML configuration file
    #[arg(long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Output file for the product URL map
    #[arg(long, default_value = "product_urls.json")]
    output: PathBuf,

    /// Maximum pages to fetch per domain
    #[arg(long)]
    max_pages: Option<usize>,

    /// Maximum concurrent requests per domain
    #[arg(long)]
    concurrency: Option<usize>,

    /// Delay between requests to the same domain (seconds)
    #[arg(long)]
    delay: Option<f64>,

    /// Request timeout (seconds)
    #[arg(long)]
    timeout: Option<f64>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with_all = ["verbose", "debug"])]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let file_config = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => Config::default(),
    };

    let overrides = ConfigOverrides {
        domains: (!cli.domains.is_empty()).then(|| cli.domains.clone()),
        max_pages: cli.max_pages,
        concurrency: cli.concurrency,
        delay: cli.delay,
        timeout: cli.timeout,
        debug: cli.debug,
    };
    let config = apply_overrides(file_config, overrides).context("Invalid configuration")?;

    // Setup logging based on verbosity
    let verbose = if config.crawler.debug {
        cli.verbose.max(1)
    } else {
        cli.verbose
    };
    setup_logging(verbose, cli.quiet);

    if let Some(path) = &cli.config {
        tracing::info!("Configuration loaded from {}", path.display());
    }

    let scheduler = Scheduler::new(config.clone()).context("Failed to start crawler")?;

    if cli.dry_run {
        print_dry_run(&config, &scheduler, &cli.output);
        return Ok(());
    }

    let report = scheduler.run().await;
    let written = write_results(&report, &cli.output)
        .with_context(|| format!("Failed to write results to {}", cli.output.display()))?;

    if !cli.quiet {
        print_statistics(&report.statistics());
        println!();
        println!("Results: {}", written.results.display());
        println!("Stats:   {}", written.stats.display());
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("shelf_ripple=info,warn"),
            1 => EnvFilter::new("shelf_ripple=debug,info"),
            _ => EnvFilter::new("shelf_ripple=trace,debug"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Shows the resolved settings for every domain without crawling
fn print_dry_run(config: &Config, scheduler: &Scheduler, output: &std::path::Path) {
    println!("=== Shelf-Ripple Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Max pages per domain: {}", config.crawler.max_pages);
    println!("  Concurrency per domain: {}", config.crawler.concurrency);
    println!("  Delay: {}s", config.crawler.delay);
    println!("  Timeout: {}s", config.crawler.timeout);
    println!("  Min indicators: {}", config.crawler.min_indicators);
    println!("  User agent: {}", config.crawler.user_agent);

    println!("\nDomains ({}):", scheduler.targets().len());
    for target in scheduler.targets() {
        let settings = config.settings_for(target);
        println!(
            "  - {} (delay {:?}, {} extra seeds, {} headers)",
            target.homepage(),
            settings.delay,
            settings.seed_paths.len(),
            settings.headers.len()
        );
        for seed in &settings.seed_paths {
            println!("    * {}", seed);
        }
    }

    println!("\nOutput:");
    println!("  Results: {}", output.display());
    println!(
        "  Stats: {}",
        shelf_ripple::output::stats_path(output).display()
    );

    println!("\n✓ Configuration is valid");
}
