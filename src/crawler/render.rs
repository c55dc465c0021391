//! Headless browser rendering
//!
//! Rendered fetching is compiled only with the `browser` feature. Without it,
//! `render_page` always fails with `FetchError::RenderUnavailable` and the
//! availability probe reports false, so runs fall back to plain HTTP.

use crate::crawler::fetcher::{FetchError, FetchSettings};
use std::path::{Path, PathBuf};
use url::Url;

/// Well-known Chrome/Chromium install locations
const CHROME_PATHS: &[&str] = &[
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/snap/bin/chromium",
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
    "/opt/google/chrome/google-chrome",
];

/// Executable names looked up on `PATH`
const CHROME_COMMANDS: &[&str] = &[
    "google-chrome",
    "google-chrome-stable",
    "chromium",
    "chromium-browser",
];

/// Locates a Chrome or Chromium executable
pub fn find_chrome() -> Option<PathBuf> {
    CHROME_PATHS
        .iter()
        .map(Path::new)
        .find(|p| p.exists())
        .map(Path::to_path_buf)
        .or_else(|| CHROME_COMMANDS.iter().find_map(|cmd| which::which(cmd).ok()))
}

/// Reports whether rendered fetching can be used in this build and environment
pub fn headless_browser_available() -> bool {
    cfg!(feature = "browser") && find_chrome().is_some()
}

/// Loads a page in a fresh headless browser and returns the rendered DOM
///
/// # Sequence
///
/// 1. Launch the browser and navigate to the URL
/// 2. Wait for the settle interval
/// 3. Scroll to the bottom, pause, scroll back to the top
/// 4. Serialize the document
/// 5. Close the browser, on success and on failure
#[cfg(feature = "browser")]
pub async fn render_page(url: &Url, settings: &FetchSettings) -> Result<String, FetchError> {
    use chromiumoxide::{Browser, BrowserConfig};
    use futures::StreamExt;

    let chrome_path =
        find_chrome().ok_or_else(|| render_error(url, "Chrome/Chromium executable not found"))?;

    let config = BrowserConfig::builder()
        .chrome_executable(chrome_path)
        .no_sandbox()
        .arg("--disable-blink-features=AutomationControlled")
        .arg("--disable-dev-shm-usage")
        .arg("--disable-gpu")
        .arg("--no-first-run")
        .arg(format!("--user-agent={}", settings.user_agent))
        .build()
        .map_err(|e| render_error(url, e))?;

    let (mut browser, mut handler) = Browser::launch(config)
        .await
        .map_err(|e| render_error(url, e))?;

    let handler_task = tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    let result = capture_dom(&browser, url, settings).await;

    if let Err(e) = browser.close().await {
        tracing::debug!("Failed to close browser cleanly: {}", e);
    }
    let _ = browser.wait().await;
    handler_task.abort();

    result
}

#[cfg(feature = "browser")]
async fn capture_dom(
    browser: &chromiumoxide::Browser,
    url: &Url,
    settings: &FetchSettings,
) -> Result<String, FetchError> {
    let page = browser
        .new_page(url.as_str())
        .await
        .map_err(|e| render_error(url, e))?;

    tokio::time::sleep(settings.settle).await;
    page.evaluate("window.scrollTo(0, document.body.scrollHeight);")
        .await
        .map_err(|e| render_error(url, e))?;
    tokio::time::sleep(settings.scroll_pause).await;
    page.evaluate("window.scrollTo(0, 0);")
        .await
        .map_err(|e| render_error(url, e))?;

    let content = page.content().await.map_err(|e| render_error(url, e));
    let _ = page.close().await;
    content
}

#[cfg(feature = "browser")]
fn render_error(url: &Url, error: impl std::fmt::Display) -> FetchError {
    FetchError::Render {
        url: url.to_string(),
        message: error.to_string(),
    }
}

#[cfg(not(feature = "browser"))]
pub async fn render_page(_url: &Url, _settings: &FetchSettings) -> Result<String, FetchError> {
    Err(FetchError::RenderUnavailable)
}
