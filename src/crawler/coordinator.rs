//! Crawler coordinator - main mirror orchestration logic
//!
//! This module contains the crawl loop that coordinates one run:
//! - Preparing the output layout
//! - Draining the frontier within the page budget
//! - Fetching, parsing and scoping links
//! - Resolving resources and scanning stylesheets for fonts
//! - Rewriting and saving each page
//! - Handling cancellation and reporting the final state

use crate::config::Config;
use crate::crawler::frontier::Frontier;
use crate::crawler::parser::parse_html;
use crate::crawler::progress::{Progress, Reporter};
use crate::crawler::{CrawlJob, FetchMode, Fetcher};
use crate::output::{rewrite_document, write_netlify_config, CrawlStatistics, OutputLayout};
use crate::resources::{ResourceCategory, ResourceMap, ResourceResolver};
use crate::state::{CancelFlag, PageRecord, RunState};
use crate::url::resolve_reference;
use crate::MirrorError;
use std::collections::HashSet;
use std::path::PathBuf;
use url::Url;

/// Final outcome of a run
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Terminal state: `Completed`, `Stopped` or `Failed`
    pub state: RunState,
    /// Pages written to disk, in crawl order
    pub pages: Vec<PageRecord>,
    /// Pages that passed the pre-check, in crawl order
    pub visited: Vec<Url>,
    pub statistics: CrawlStatistics,
    pub output_root: PathBuf,
    /// Error message when the run failed
    pub error: Option<String>,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    job: CrawlJob,
    fetcher: Fetcher,
    resolver: ResourceResolver,
    layout: OutputLayout,
    frontier: Frontier,
    resources: ResourceMap,
    scanned_stylesheets: HashSet<String>,
    pages: Vec<PageRecord>,
    statistics: CrawlStatistics,
    reporter: Reporter,
    cancel: CancelFlag,
    state: RunState,
    write_netlify: bool,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `job` - The run description
    /// * `config` - Configuration for timeouts, concurrency and output options
    /// * `reporter` - Receives status, log and progress notifications
    /// * `cancel` - Shared flag polled at page boundaries and before network calls
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(MirrorError)` - The HTTP client could not be built
    pub fn new(
        job: CrawlJob,
        config: &Config,
        reporter: Reporter,
        cancel: CancelFlag,
    ) -> Result<Self, MirrorError> {
        let fetcher = Fetcher::new(config, job.render_mode)?;
        let layout = OutputLayout::new(&job.output_root);
        let resolver = ResourceResolver::new(
            fetcher.clone(),
            layout.clone(),
            cancel.clone(),
            reporter.clone(),
            config.crawler.download_concurrency,
        );

        Ok(Self {
            frontier: Frontier::new(&job.seed_url),
            job,
            fetcher,
            resolver,
            layout,
            resources: ResourceMap::new(),
            scanned_stylesheets: HashSet::new(),
            pages: Vec::new(),
            statistics: CrawlStatistics::default(),
            reporter,
            cancel,
            state: RunState::Idle,
            write_netlify: config.output.netlify,
        })
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn job(&self) -> &CrawlJob {
        &self.job
    }

    /// Resource mapping built so far
    pub fn resources(&self) -> &ResourceMap {
        &self.resources
    }

    /// Runs the main crawl loop
    ///
    /// Recoverable problems (a page or resource that cannot be fetched) are
    /// logged and skipped. Failure to prepare the output directory ends the
    /// run in `Failed`; that is reported in the returned `CrawlReport`, not
    /// as an `Err`. An `Err` only means the coordinator was misused, e.g.
    /// run twice.
    pub async fn run(&mut self) -> Result<CrawlReport, MirrorError> {
        if self.state != RunState::Idle {
            return Err(MirrorError::InvalidTransition {
                from: self.state,
                to: RunState::Running,
            });
        }

        let seed = self.job.seed_url.clone();
        tracing::info!(
            "Starting mirror of {} into {}",
            seed,
            self.layout.root().display()
        );
        self.reporter.status(format!("Initializing crawl: {}", seed));

        if let Err(e) = self.layout.create() {
            return self.fail(e);
        }
        self.transition(RunState::Running)?;

        if self.fetcher.mode() == FetchMode::Rendered {
            self.reporter.log("Using headless browser rendering");
        }

        let start_time = std::time::Instant::now();
        let mut pages_crawled: u32 = 0;
        let mut cancelled = false;

        while pages_crawled < self.job.max_pages {
            if self.cancel.is_cancelled() {
                cancelled = true;
                break;
            }

            let url = match self.frontier.pop() {
                Some(url) => url,
                None => {
                    tracing::info!("Frontier is empty, crawl complete");
                    break;
                }
            };
            if self.frontier.is_visited(&url) {
                continue;
            }

            if !self.fetcher.check_validity(&url).await {
                tracing::info!("Skipping {} (404 or unreachable)", url);
                self.reporter
                    .log(format!("Skipped (404 or unreachable): {}", url));
                self.frontier.mark_skipped(&url);
                self.statistics.pages_skipped += 1;
                continue;
            }

            if self.cancel.is_cancelled() {
                cancelled = true;
                break;
            }

            self.frontier.mark_visited(&url);
            pages_crawled += 1;
            self.reporter.status(format!("Crawling: {}", url));
            self.reporter
                .progress(Progress::new(pages_crawled, self.job.max_pages));

            match self.process_page(&url, pages_crawled).await {
                Ok(record) => {
                    tracing::info!("Saved {} as {}", url, record.storage_relative_path);
                    self.reporter
                        .log(format!("Saved: {}", record.storage_relative_path));
                    self.statistics.pages_saved += 1;
                    self.pages.push(record);
                }
                Err(e) => {
                    tracing::warn!("Error processing {}: {}", url, e);
                    let message = match e {
                        MirrorError::Fetch(_) => format!("Failed to fetch: {}", url),
                        _ => format!("Failed to save: {}", url),
                    };
                    self.reporter.log(message);
                    self.statistics.pages_failed += 1;
                }
            }
        }

        cancelled |= self.cancel.is_cancelled();

        if self.write_netlify {
            match write_netlify_config(self.layout.root()).await {
                Ok(_) => self.reporter.log("Generated netlify.toml"),
                Err(e) => tracing::warn!("Failed to write netlify.toml: {}", e),
            }
        }

        let visited = self.frontier.visited_count() as u32;
        if cancelled {
            self.transition(RunState::Stopped)?;
            self.reporter.status("Stopped by user");
        } else {
            self.transition(RunState::Completed)?;
            self.reporter.progress(Progress::finished(visited));
            self.reporter.status(format!("Completed ({} pages)", visited));
        }

        tracing::info!(
            "Mirror {}: {} pages, {} resources in {:?}",
            self.state,
            visited,
            self.resources.len(),
            start_time.elapsed()
        );

        Ok(self.report(None))
    }

    /// Processes a single page
    ///
    /// This method:
    /// 1. Fetches the document
    /// 2. Parses it and queues in-scope links
    /// 3. Resolves each enabled resource category
    /// 4. Scans stylesheets for fonts
    /// 5. Rewrites and saves the document
    async fn process_page(&mut self, url: &Url, sequence: u32) -> Result<PageRecord, MirrorError> {
        let html = self.fetcher.fetch(url).await?;
        let parsed = parse_html(&html, url, &self.job.enabled_categories);
        tracing::debug!(
            "Parsed {} ({}): {} links, {} stylesheets",
            url,
            parsed.title.as_deref().unwrap_or("untitled"),
            parsed.links.len(),
            parsed.stylesheets.len()
        );

        if self.job.crawl_subpages {
            self.enqueue_links(&parsed.links);
        }

        for (category, references) in &parsed.references {
            if self.cancel.is_cancelled() {
                break;
            }
            let summary = self
                .resolver
                .resolve(references, *category, url, &mut self.resources)
                .await;
            self.statistics.record_resources(*category, &summary);
        }

        if self.job.is_enabled(ResourceCategory::Font) {
            for href in &parsed.stylesheets {
                if self.cancel.is_cancelled() {
                    break;
                }
                let Some(stylesheet_url) = resolve_reference(url, href) else {
                    continue;
                };
                if !self.scanned_stylesheets.insert(stylesheet_url.to_string()) {
                    continue;
                }
                let summary = self
                    .resolver
                    .scan_stylesheet(&stylesheet_url, &mut self.resources)
                    .await;
                self.statistics
                    .record_resources(ResourceCategory::Font, &summary);
            }
        }

        let record = PageRecord::for_url(url, &self.job.seed_url, sequence);
        let document = rewrite_document(&html, &self.resources, url, record.depth);
        self.layout.write_page(&record, &document).await?;

        Ok(record)
    }

    /// Adds in-scope links to the frontier
    fn enqueue_links(&mut self, links: &[Url]) {
        let mut added = 0;
        for link in links {
            let classification = self.job.scope.classify(link);
            if !classification.should_crawl() {
                tracing::trace!("Not following {} ({:?})", link, classification);
                continue;
            }
            if self.frontier.enqueue(link.clone()) {
                added += 1;
            }
        }
        tracing::debug!(
            "Queued {} new links, {} in frontier",
            added,
            self.frontier.len()
        );
    }

    fn fail(&mut self, error: MirrorError) -> Result<CrawlReport, MirrorError> {
        tracing::error!("Mirror failed: {}", error);
        self.transition(RunState::Failed)?;
        self.reporter.status(format!("Error: {}", error));
        Ok(self.report(Some(error.to_string())))
    }

    fn transition(&mut self, next: RunState) -> Result<(), MirrorError> {
        if !self.state.can_transition_to(next) {
            return Err(MirrorError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        tracing::debug!("Run state {} -> {}", self.state, next);
        self.state = next;
        Ok(())
    }

    fn report(&self, error: Option<String>) -> CrawlReport {
        CrawlReport {
            state: self.state,
            pages: self.pages.clone(),
            visited: self.frontier.visited().to_vec(),
            statistics: self.statistics.clone(),
            output_root: self.layout.root().to_path_buf(),
            error,
        }
    }
}

/// Runs a complete mirror for an already-built job
///
/// # Arguments
///
/// * `job` - The run description
/// * `config` - The configuration the job was built from
/// * `reporter` - Notification sink
/// * `cancel` - Cancellation flag
pub async fn run_crawl(
    job: CrawlJob,
    config: &Config,
    reporter: Reporter,
    cancel: CancelFlag,
) -> Result<CrawlReport, MirrorError> {
    let mut coordinator = Coordinator::new(job, config, reporter, cancel)?;
    coordinator.run().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn job_in(dir: &std::path::Path, seed: &str) -> (CrawlJob, Config) {
        let mut config = Config::default();
        config.crawler.use_browser = false;
        config.output.directory = Some(dir.to_string_lossy().into_owned());
        let job = CrawlJob::from_config(seed, &config, false).unwrap();
        (job, config)
    }

    #[tokio::test]
    async fn test_cancel_before_start_stops() {
        let temp = TempDir::new().unwrap();
        let (job, config) = job_in(&temp.path().join("out"), "https://example.invalid/");
        let cancel = CancelFlag::new();
        cancel.cancel();

        let report = run_crawl(job, &config, Reporter::new(), cancel).await.unwrap();
        assert_eq!(report.state, RunState::Stopped);
        assert!(report.visited.is_empty());
        assert!(report.pages.is_empty());
        assert!(temp.path().join("out/netlify.toml").exists());
    }

    #[tokio::test]
    async fn test_unwritable_output_fails_run() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("file");
        std::fs::write(&blocker, "x").unwrap();
        let (job, config) = job_in(&blocker.join("out"), "https://example.invalid/");

        let report = run_crawl(job, &config, Reporter::new(), CancelFlag::new())
            .await
            .unwrap();
        assert_eq!(report.state, RunState::Failed);
        assert!(report.error.is_some());
    }

    #[tokio::test]
    async fn test_coordinator_cannot_run_twice() {
        let temp = TempDir::new().unwrap();
        let (job, config) = job_in(&temp.path().join("out"), "https://example.invalid/");
        let cancel = CancelFlag::new();
        cancel.cancel();

        let mut coordinator = Coordinator::new(job, &config, Reporter::new(), cancel).unwrap();
        coordinator.run().await.unwrap();
        assert!(matches!(
            coordinator.run().await,
            Err(MirrorError::InvalidTransition { .. })
        ));
    }
}
