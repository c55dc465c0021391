//! Crawler module for fetching and mirroring pages
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching and optional headless rendering
//! - HTML parsing, link and resource extraction
//! - The FIFO frontier
//! - Progress reporting
//! - Overall run coordination

mod coordinator;
mod fetcher;
mod frontier;
mod job;
mod parser;
mod progress;
mod render;

pub use coordinator::{run_crawl, Coordinator, CrawlReport};
pub use fetcher::{build_http_client, FetchError, FetchMode, FetchSettings, Fetcher};
pub use frontier::Frontier;
pub use job::{enabled_categories, CrawlJob};
pub use parser::{parse_html, ParsedPage};
pub use progress::{
    MessageKind, Progress, ProgressCallback, Reporter, StatusCallback, StatusMessage,
};
pub use render::{find_chrome, headless_browser_available, render_page};

use crate::config::Config;
use crate::state::CancelFlag;
use crate::MirrorError;

/// Mirrors a site starting from `seed`
///
/// This is the main entry point for starting a run. It will:
/// 1. Probe for a headless browser
/// 2. Build the job from configuration
/// 3. Run the crawl until the budget is spent, the frontier is empty, or
///    `cancel` is raised
///
/// # Arguments
///
/// * `seed` - The URL to start from
/// * `config` - The mirror configuration
/// * `reporter` - Notification sink
/// * `cancel` - Cancellation flag
///
/// # Returns
///
/// * `Ok(CrawlReport)` - The run ended (completed, stopped or failed)
/// * `Err(MirrorError)` - The seed was invalid or the client could not be built
pub async fn mirror(
    seed: &str,
    config: &Config,
    reporter: Reporter,
    cancel: CancelFlag,
) -> Result<CrawlReport, MirrorError> {
    let job = CrawlJob::from_config(seed, config, headless_browser_available())?;
    run_crawl(job, config, reporter, cancel).await
}
