//! Site-Mirror main entry point
//!
//! This is the command-line interface for the Site-Mirror website copier.

use anyhow::{bail, Context};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use site_mirror::config::{load_config_with_hash, validate, Config};
use site_mirror::crawler::{
    headless_browser_available, FetchMode, MessageKind, Progress, Reporter, StatusMessage,
};
use site_mirror::output::print_statistics;
use site_mirror::{run_crawl, CancelFlag, CrawlJob, ResourceCategory, RunState};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Site-Mirror: copy a website into a self-contained static directory
///
/// Site-Mirror crawls a site breadth-first from a seed URL, downloads the
/// images, media, stylesheets, scripts and fonts each page references, and
/// rewrites the pages so the copy works offline or on any static host.
#[derive(Parser, Debug)]
#[command(name = "site-mirror")]
#[command(version = "1.0.0")]
#[command(about = "Mirror a website into a static directory", long_about = None)]
struct Cli {
    /// URL of the site to mirror (https:// is assumed without a scheme)
    #[arg(value_name = "URL")]
    url: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output directory (default: scraped_<domain>_<timestamp>)
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Maximum number of pages to save
    #[arg(short = 'n', long, value_name = "N")]
    max_pages: Option<u32>,

    /// Only mirror the seed page
    #[arg(long)]
    single_page: bool,

    /// Never use a headless browser, even when one is available
    #[arg(long)]
    no_browser: bool,

    /// Resource category to skip (images, videos, audio, css, js, fonts); repeatable
    #[arg(long = "skip", value_name = "CATEGORY")]
    skip: Vec<ResourceCategory>,

    /// Do not write netlify.toml
    #[arg(long)]
    no_netlify: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate settings and show what would be mirrored without fetching anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;
    let browser_available = headless_browser_available();
    tracing::debug!("Headless browser available: {}", browser_available);

    let job = CrawlJob::from_config(&cli.url, &config, browser_available)
        .with_context(|| format!("Invalid URL: {}", cli.url))?;

    if cli.dry_run {
        handle_dry_run(&job, &config);
        return Ok(());
    }

    handle_mirror(job, config, cli.quiet).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("site_mirror=warn,warn"),
            1 => EnvFilter::new("site_mirror=info,warn"),
            2 => EnvFilter::new("site_mirror=debug,info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the config file (if any) and applies command-line overrides
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(output) = &cli.output {
        config.output.directory = Some(output.to_string_lossy().into_owned());
    }
    if let Some(max_pages) = cli.max_pages {
        config.crawler.max_pages = max_pages;
    }
    if cli.single_page {
        config.crawler.crawl_subpages = false;
    }
    if cli.no_browser {
        config.crawler.use_browser = false;
    }
    if cli.no_netlify {
        config.output.netlify = false;
    }
    for category in &cli.skip {
        match category {
            ResourceCategory::Image => config.resources.images = false,
            ResourceCategory::Video => config.resources.videos = false,
            ResourceCategory::Audio => config.resources.audio = false,
            ResourceCategory::Css => config.resources.css = false,
            ResourceCategory::Js => config.resources.js = false,
            ResourceCategory::Font => config.resources.fonts = false,
        }
    }

    validate(&config).context("Invalid settings")?;
    Ok(config)
}

/// Handles the --dry-run mode: shows what would be mirrored
fn handle_dry_run(job: &CrawlJob, config: &Config) {
    println!("=== Site-Mirror Dry Run ===\n");

    println!("Seed: {}", job.seed_url);
    println!("  Base domain: {}", job.scope.base_domain);
    println!("  Page budget: {}", job.max_pages);
    println!("  Crawl subpages: {}", job.crawl_subpages);
    println!(
        "  Fetch mode: {}",
        match job.render_mode {
            FetchMode::Plain => "plain HTTP",
            FetchMode::Rendered => "headless browser",
        }
    );
    println!(
        "  Download concurrency: {}",
        config.crawler.download_concurrency
    );

    println!("\nResources:");
    for category in ResourceCategory::ALL {
        let marker = if job.is_enabled(category) { "✓" } else { "✗" };
        println!("  {} {}", marker, category);
    }

    println!(
        "\nSkipped subdomains: {}",
        job.scope.subdomain_blocklist.join(", ")
    );

    println!("\nOutput:");
    println!("  Directory: {}", job.output_root.display());
    println!("  netlify.toml: {}", config.output.netlify);

    println!("\n✓ Settings are valid");
}

/// Handles the main mirror operation
async fn handle_mirror(job: CrawlJob, config: Config, quiet: bool) -> anyhow::Result<()> {
    let max_pages = job.max_pages;
    let progress_bar = if quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(max_pages as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{bar:30.cyan/blue} {pos}/{len} {msg}")
                .context("Invalid progress bar template")?,
        );
        pb
    };

    let status_bar = progress_bar.clone();
    let progress = progress_bar.clone();
    let reporter = Reporter::new()
        .with_status_callback(Arc::new(move |message: StatusMessage| match message.kind {
            MessageKind::Status => status_bar.set_message(message.text),
            MessageKind::Log => status_bar.println(message.to_string()),
        }))
        .with_progress_callback(Arc::new(move |p: Progress| {
            progress.set_length(p.total as u64);
            progress.set_position(p.done as u64);
        }));

    let cancel = CancelFlag::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after the current step");
            interrupt.cancel();
        }
    });

    let report = run_crawl(job, &config, reporter, cancel).await?;
    progress_bar.finish_and_clear();

    match report.state {
        RunState::Failed => {
            bail!(
                "Mirror failed: {}",
                report.error.as_deref().unwrap_or("unknown error")
            );
        }
        state => {
            if !quiet {
                println!();
                print_statistics(&report.statistics);
                println!(
                    "\n{} {} pages into {}",
                    if state == RunState::Stopped {
                        "Stopped after mirroring"
                    } else {
                        "Mirrored"
                    },
                    report.pages.len(),
                    report.output_root.display()
                );
            }
            Ok(())
        }
    }
}
