use serde::Deserialize;

/// Browser-like user agent sent with every request
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Main configuration structure for Site-Mirror
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub resources: ResourcesConfig,
    #[serde(default)]
    pub scope: ScopeConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of pages saved in one run
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: u32,

    /// Follow same-site links; when false only the seed page is mirrored
    #[serde(rename = "crawl-subpages", default = "default_true")]
    pub crawl_subpages: bool,

    /// Prefer rendered-DOM fetching when a headless browser is available
    #[serde(rename = "use-browser", default = "default_true")]
    pub use_browser: bool,

    /// Number of resource downloads allowed in flight per page
    #[serde(rename = "download-concurrency", default = "default_concurrency")]
    pub download_concurrency: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_pages: default_max_pages(),
            crawl_subpages: true,
            use_browser: true,
            download_concurrency: default_concurrency(),
        }
    }
}

/// HTTP transport configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Timeout for fetching a page body (seconds)
    #[serde(rename = "page-timeout-secs", default = "default_page_timeout")]
    pub page_timeout_secs: u64,

    /// Timeout for the HEAD reachability check (seconds)
    #[serde(rename = "head-timeout-secs", default = "default_head_timeout")]
    pub head_timeout_secs: u64,

    /// Timeout for the GET fallback of the reachability check (seconds)
    #[serde(rename = "validity-timeout-secs", default = "default_validity_timeout")]
    pub validity_timeout_secs: u64,

    /// Timeout for a single resource download (seconds)
    #[serde(rename = "resource-timeout-secs", default = "default_resource_timeout")]
    pub resource_timeout_secs: u64,

    /// Timeout for fetching stylesheet text scanned for fonts (seconds)
    #[serde(rename = "stylesheet-timeout-secs", default = "default_stylesheet_timeout")]
    pub stylesheet_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            page_timeout_secs: default_page_timeout(),
            head_timeout_secs: default_head_timeout(),
            validity_timeout_secs: default_validity_timeout(),
            resource_timeout_secs: default_resource_timeout(),
            stylesheet_timeout_secs: default_stylesheet_timeout(),
        }
    }
}

/// Headless browser rendering configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserConfig {
    /// Wait after navigation before touching the page (milliseconds)
    #[serde(rename = "settle-ms", default = "default_settle_ms")]
    pub settle_ms: u64,

    /// Pause at the bottom of the page while lazy content loads (milliseconds)
    #[serde(rename = "scroll-pause-ms", default = "default_scroll_pause_ms")]
    pub scroll_pause_ms: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            settle_ms: default_settle_ms(),
            scroll_pause_ms: default_scroll_pause_ms(),
        }
    }
}

/// Which resource categories get downloaded
#[derive(Debug, Clone, Deserialize)]
pub struct ResourcesConfig {
    #[serde(default = "default_true")]
    pub images: bool,
    #[serde(default = "default_true")]
    pub videos: bool,
    #[serde(default = "default_true")]
    pub audio: bool,
    #[serde(default = "default_true")]
    pub css: bool,
    #[serde(default = "default_true")]
    pub js: bool,
    #[serde(default = "default_true")]
    pub fonts: bool,
}

impl Default for ResourcesConfig {
    fn default() -> Self {
        Self {
            images: true,
            videos: true,
            audio: true,
            css: true,
            js: true,
            fonts: true,
        }
    }
}

/// Link scoping rules
#[derive(Debug, Clone, Deserialize)]
pub struct ScopeConfig {
    /// Leading host labels that are never crawled (e.g. "admin" for admin.example.com)
    #[serde(rename = "subdomain-blocklist", default = "default_blocklist")]
    pub subdomain_blocklist: Vec<String>,

    /// Path extensions that mark a link as not being an HTML page
    #[serde(rename = "skip-extensions", default = "default_skip_extensions")]
    pub skip_extensions: Vec<String>,
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            subdomain_blocklist: default_blocklist(),
            skip_extensions: default_skip_extensions(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Output root; a timestamped directory is derived from the seed when unset
    #[serde(default)]
    pub directory: Option<String>,

    /// Write a netlify.toml deployment manifest next to index.html
    #[serde(default = "default_true")]
    pub netlify: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: None,
            netlify: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_max_pages() -> u32 {
    10
}

fn default_concurrency() -> usize {
    4
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_page_timeout() -> u64 {
    30
}

fn default_head_timeout() -> u64 {
    5
}

fn default_validity_timeout() -> u64 {
    10
}

fn default_resource_timeout() -> u64 {
    15
}

fn default_stylesheet_timeout() -> u64 {
    10
}

fn default_settle_ms() -> u64 {
    2000
}

fn default_scroll_pause_ms() -> u64 {
    1000
}

fn default_blocklist() -> Vec<String> {
    ["dash", "admin", "api", "reseller", "portal", "account", "auth"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_skip_extensions() -> Vec<String> {
    [
        ".pdf", ".zip", ".rar", ".gz", ".tar", ".7z", ".doc", ".docx", ".jpg", ".jpeg", ".png",
        ".gif", ".webp", ".svg",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
