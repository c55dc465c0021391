//! Statistics gathered over a mirror run
//!
//! This module provides the counters a run accumulates and a formatted
//! printout for the command line.

use crate::resources::{ResolveSummary, ResourceCategory};
use std::collections::BTreeMap;

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStatistics {
    /// Pages fetched, rewritten and written to disk
    pub pages_saved: u64,

    /// Pages that passed the pre-check but could not be fetched or saved
    pub pages_failed: u64,

    /// Pages rejected by the validity pre-check
    pub pages_skipped: u64,

    /// Resources downloaded, per category
    pub downloaded_by_category: BTreeMap<ResourceCategory, u64>,

    /// Resources mapped without a download
    pub resources_reused: u64,

    /// Resource downloads that failed
    pub resources_failed: u64,

    /// Total bytes of downloaded resources
    pub bytes_downloaded: u64,
}

impl CrawlStatistics {
    /// Adds the outcome of one resolve call
    pub fn record_resources(&mut self, category: ResourceCategory, summary: &ResolveSummary) {
        if summary.downloaded > 0 {
            *self.downloaded_by_category.entry(category).or_insert(0) += summary.downloaded as u64;
        }
        self.resources_reused += summary.reused as u64;
        self.resources_failed += summary.failed as u64;
        self.bytes_downloaded += summary.bytes;
    }

    /// Total resources downloaded across all categories
    pub fn resources_downloaded(&self) -> u64 {
        self.downloaded_by_category.values().sum()
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Mirror Statistics ===\n");

    println!("Pages:");
    println!("  Saved: {}", stats.pages_saved);
    println!("  Failed: {}", stats.pages_failed);
    println!("  Skipped (404 or unreachable): {}", stats.pages_skipped);
    println!();

    println!("Resources:");
    // Sort categories by count (descending)
    let mut category_counts: Vec<_> = stats.downloaded_by_category.iter().collect();
    category_counts.sort_by(|a, b| b.1.cmp(a.1));

    let downloaded = stats.resources_downloaded();
    for (category, count) in category_counts {
        let percentage = if downloaded > 0 {
            (*count as f64 / downloaded as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", category, count, percentage);
    }
    println!("  Reused: {}", stats.resources_reused);
    println!("  Failed: {}", stats.resources_failed);
    println!();

    println!(
        "Downloaded {} resources ({:.1} KB)",
        downloaded,
        stats.bytes_downloaded as f64 / 1024.0
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_resources() {
        let mut stats = CrawlStatistics::default();
        stats.record_resources(
            ResourceCategory::Image,
            &ResolveSummary {
                downloaded: 3,
                reused: 1,
                failed: 1,
                bytes: 2048,
            },
        );
        stats.record_resources(
            ResourceCategory::Font,
            &ResolveSummary {
                downloaded: 2,
                reused: 0,
                failed: 0,
                bytes: 1024,
            },
        );
        stats.record_resources(ResourceCategory::Js, &ResolveSummary::default());

        assert_eq!(stats.resources_downloaded(), 5);
        assert_eq!(stats.downloaded_by_category.get(&ResourceCategory::Image), Some(&3));
        assert_eq!(stats.downloaded_by_category.get(&ResourceCategory::Js), None);
        assert_eq!(stats.resources_reused, 1);
        assert_eq!(stats.resources_failed, 1);
        assert_eq!(stats.bytes_downloaded, 3072);
    }

    #[test]
    fn test_print_statistics_empty() {
        print_statistics(&CrawlStatistics::default());
    }
}
