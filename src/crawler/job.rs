//! Immutable description of one mirror run

use crate::config::{Config, ResourcesConfig};
use crate::crawler::FetchMode;
use crate::output::OutputLayout;
use crate::resources::ResourceCategory;
use crate::url::{normalize_seed, LinkScope};
use crate::MirrorError;
use std::collections::BTreeSet;
use std::path::PathBuf;
use url::Url;

/// Everything a run needs to know up front
#[derive(Debug, Clone)]
pub struct CrawlJob {
    /// Normalized seed (scheme added, fragment removed)
    pub seed_url: Url,
    /// Same-site rules for discovered links
    pub scope: LinkScope,
    /// Page budget; 1 when subpages are not crawled
    pub max_pages: u32,
    pub crawl_subpages: bool,
    pub enabled_categories: BTreeSet<ResourceCategory>,
    pub render_mode: FetchMode,
    pub output_root: PathBuf,
}

impl CrawlJob {
    /// Builds a job for `seed` from configuration
    ///
    /// # Arguments
    ///
    /// * `seed` - User-supplied URL; `https://` is added when no scheme is given
    /// * `config` - Validated configuration
    /// * `browser_available` - Result of the headless browser probe; rendered
    ///   mode is only used when both this and `crawler.use-browser` are true
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlJob)` - The job description
    /// * `Err(MirrorError)` - The seed is not a usable http(s) URL
    pub fn from_config(
        seed: &str,
        config: &Config,
        browser_available: bool,
    ) -> Result<Self, MirrorError> {
        let seed_url = normalize_seed(seed)?;
        let scope = LinkScope::for_seed(&seed_url, &config.scope)?;

        let crawl_subpages = config.crawler.crawl_subpages;
        let max_pages = if crawl_subpages {
            config.crawler.max_pages.max(1)
        } else {
            1
        };

        let render_mode = if config.crawler.use_browser && browser_available {
            FetchMode::Rendered
        } else {
            FetchMode::Plain
        };

        let output_root = match &config.output.directory {
            Some(directory) => PathBuf::from(directory),
            None => OutputLayout::default_root_for(&seed_url, chrono::Utc::now().timestamp()),
        };

        Ok(Self {
            seed_url,
            scope,
            max_pages,
            crawl_subpages,
            enabled_categories: enabled_categories(&config.resources),
            render_mode,
            output_root,
        })
    }

    pub fn is_enabled(&self, category: ResourceCategory) -> bool {
        self.enabled_categories.contains(&category)
    }
}

/// Categories switched on in configuration
pub fn enabled_categories(resources: &ResourcesConfig) -> BTreeSet<ResourceCategory> {
    [
        (ResourceCategory::Image, resources.images),
        (ResourceCategory::Video, resources.videos),
        (ResourceCategory::Audio, resources.audio),
        (ResourceCategory::Css, resources.css),
        (ResourceCategory::Js, resources.js),
        (ResourceCategory::Font, resources.fonts),
    ]
    .into_iter()
    .filter_map(|(category, enabled)| enabled.then_some(category))
    .collect()
}
