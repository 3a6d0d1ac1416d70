//! Output module for crawl results
//!
//! This module handles:
//! - Collecting per-domain results into a run report
//! - Writing the product URL map and the statistics artifact as JSON
//! - Printing the console summary

mod report;
pub mod stats;

pub use report::{CrawlReport, DomainReport, LearnedPattern};
pub use stats::{print_statistics, CrawlStatistics};

use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Paths of the artifacts written for one run
#[derive(Debug, Clone, PartialEq)]
pub struct WrittenFiles {
    pub results: PathBuf,
    pub stats: PathBuf,
}

/// Writes the product map and the statistics next to it
///
/// The statistics go to `<stem>_stats.json` in the same directory as
/// `output`.
///
/// # Arguments
///
/// * `report` - The finished run
/// * `output` - Path of the product map file
///
/// # Returns
///
/// * `Ok(WrittenFiles)` - Both files were written
/// * `Err(ShelfError)` - A file could not be created or serialized
pub fn write_results(report: &CrawlReport, output: &Path) -> crate::Result<WrittenFiles> {
    write_json(output, &report.product_map())?;
    tracing::info!("Results saved to {}", output.display());

    let stats = stats_path(output);
    write_json(&stats, &report.statistics())?;
    tracing::info!("Stats saved to {}", stats.display());

    Ok(WrittenFiles {
        results: output.to_path_buf(),
        stats,
    })
}

/// Derives the statistics file path from the results path
///
/// `out/products.json` becomes `out/products_stats.json`; a path without a
/// `.json` extension just gets `_stats.json` appended.
pub fn stats_path(output: &Path) -> PathBuf {
    let file_name = output
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = file_name.strip_suffix(".json").unwrap_or(&file_name);
    output.with_file_name(format!("{}_stats.json", stem))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> crate::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
