//! HTTP fetcher implementation
//!
//! This module handles every network request of a run:
//! - Building the HTTP client with the configured user agent
//! - Fetching page documents, either plain or through a headless browser
//! - Validity pre-checks (HEAD, falling back to GET)
//! - Downloading resources and stylesheet text
//! - Error classification

use crate::config::{Config, HttpConfig};
use crate::crawler::render;
use reqwest::header::ACCEPT;
use reqwest::{Client, Response};
use std::time::Duration;
use thiserror::Error;
use url::Url;

const HTML_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// How page documents are obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Plain HTTP GET
    Plain,
    /// Headless browser; the captured DOM after scripts ran
    Rendered,
}

/// Errors from a single fetch
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request to {url} timed out")]
    Timeout { url: String },

    #[error("Transport error for {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Browser rendering failed for {url}: {message}")]
    Render { url: String, message: String },

    #[error("Rendered fetching requires the `browser` feature")]
    RenderUnavailable,
}

impl FetchError {
    fn from_reqwest(url: &Url, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else {
            FetchError::Transport {
                url: url.to_string(),
                source: error,
            }
        }
    }
}

/// Timing settings the fetcher needs, resolved from configuration
#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub user_agent: String,
    pub page_timeout: Duration,
    pub head_timeout: Duration,
    pub validity_timeout: Duration,
    pub resource_timeout: Duration,
    pub stylesheet_timeout: Duration,
    /// Wait after navigation before scrolling (rendered mode)
    pub settle: Duration,
    /// Wait after scrolling to the bottom (rendered mode)
    pub scroll_pause: Duration,
}

impl FetchSettings {
    pub fn from_config(config: &Config) -> Self {
        let http = &config.http;
        Self {
            user_agent: http.user_agent.clone(),
            page_timeout: Duration::from_secs(http.page_timeout_secs),
            head_timeout: Duration::from_secs(http.head_timeout_secs),
            validity_timeout: Duration::from_secs(http.validity_timeout_secs),
            resource_timeout: Duration::from_secs(http.resource_timeout_secs),
            stylesheet_timeout: Duration::from_secs(http.stylesheet_timeout_secs),
            settle: Duration::from_millis(config.browser.settle_ms),
            scroll_pause: Duration::from_millis(config.browser.scroll_pause_ms),
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// Timeouts are applied per request, since pages, pre-checks and resources
/// each have their own.
///
/// # Example
///
/// ```no_run
/// use site_mirror::config::HttpConfig;
/// use site_mirror::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Performs all network access for a run
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    mode: FetchMode,
    settings: FetchSettings,
}

impl Fetcher {
    pub fn new(config: &Config, mode: FetchMode) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(&config.http)?,
            mode,
            settings: FetchSettings::from_config(config),
        })
    }

    pub fn mode(&self) -> FetchMode {
        self.mode
    }

    /// Fetches the document text of a page
    ///
    /// Plain mode requires a 2xx status. Rendered mode returns the serialized
    /// DOM after the page has settled and been scrolled once.
    pub async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        match self.mode {
            FetchMode::Plain => self.fetch_plain(url).await,
            FetchMode::Rendered => render::render_page(url, &self.settings).await,
        }
    }

    async fn fetch_plain(&self, url: &Url) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, HTML_ACCEPT)
            .timeout(self.settings.page_timeout)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let response = require_success(url, response)?;
        response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))
    }

    /// Checks whether a page URL looks fetchable before spending a page on it
    ///
    /// # Request Flow
    ///
    /// 1. HEAD with a short timeout; any status below 400 is valid
    /// 2. On a 4xx/5xx or transport failure, retry with GET
    /// 3. GET status below 400 is valid; a GET transport failure is also
    ///    treated as valid so the real fetch gets a chance
    pub async fn check_validity(&self, url: &Url) -> bool {
        match self
            .client
            .head(url.clone())
            .timeout(self.settings.head_timeout)
            .send()
            .await
        {
            Ok(response) if response.status().as_u16() < 400 => return true,
            Ok(response) => {
                tracing::debug!("HEAD {} returned {}", url, response.status());
            }
            Err(e) => {
                tracing::debug!("HEAD {} failed: {}", url, e);
            }
        }

        match self
            .client
            .get(url.clone())
            .timeout(self.settings.validity_timeout)
            .send()
            .await
        {
            Ok(response) => response.status().as_u16() < 400,
            Err(e) => {
                tracing::debug!("GET pre-check for {} failed, assuming valid: {}", url, e);
                true
            }
        }
    }

    /// Downloads a resource body
    pub async fn download(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .timeout(self.settings.resource_timeout)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let response = require_success(url, response)?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;
        Ok(bytes.to_vec())
    }

    /// Fetches a stylesheet as text without saving it
    pub async fn fetch_stylesheet(&self, url: &Url) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .timeout(self.settings.stylesheet_timeout)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let response = require_success(url, response)?;
        response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))
    }
}

fn require_success(url: &Url, response: Response) -> Result<Response, FetchError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        })
    }
}
