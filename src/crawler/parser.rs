//! HTML parser for extracting links and resource references
//!
//! This module handles parsing HTML content to extract:
//! - Links to follow (from <a> tags)
//! - Resource references per enabled category
//! - Stylesheet hrefs to scan for fonts
//! - Page title
//!
//! Parsing is synchronous and returns owned data only; the parsed document
//! never lives across an await point.

use crate::resources::{Reference, ResourceCategory};
use crate::url::page_identity;
use scraper::{Html, Selector};
use std::collections::BTreeSet;
use url::Url;

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    /// The page title (from <title> tag)
    pub title: Option<String>,

    /// All hyperlink targets found on the page, absolute and without fragments
    pub links: Vec<Url>,

    /// Resource references grouped by category, in category order
    pub references: Vec<(ResourceCategory, Vec<Reference>)>,

    /// Raw `href` values of stylesheet links
    pub stylesheets: Vec<String>,
}

/// Parses HTML content and extracts links and resource references
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` tags anywhere in the document
///
/// **Exclude:**
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs
/// - Fragment-only links
///
/// Resource references are only collected for the categories in `categories`.
/// Stylesheet hrefs are always collected so fonts can be found even when
/// stylesheets themselves are not downloaded.
///
/// # Example
///
/// ```
/// use site_mirror::crawler::parse_html;
/// use site_mirror::ResourceCategory;
/// use std::collections::BTreeSet;
/// use url::Url;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a><img src="a.png"></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let categories: BTreeSet<_> = [ResourceCategory::Image].into_iter().collect();
/// let parsed = parse_html(html, &base_url, &categories);
/// assert_eq!(parsed.title, Some("Test".to_string()));
/// assert_eq!(parsed.links[0].as_str(), "https://example.com/page");
/// assert_eq!(parsed.references[0].1[0].value, "a.png");
/// ```
pub fn parse_html(
    html: &str,
    base_url: &Url,
    categories: &BTreeSet<ResourceCategory>,
) -> ParsedPage {
    let document = Html::parse_document(html);

    let references = categories
        .iter()
        .filter(|category| !category.selectors().is_empty())
        .map(|category| (*category, extract_references(&document, *category)))
        .collect();

    ParsedPage {
        title: extract_title(&document),
        links: extract_links(&document, base_url),
        references,
        stylesheets: extract_stylesheets(&document),
    }
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Extracts all valid links from the HTML document
fn extract_links(document: &Html, base_url: &Url) -> Vec<Url> {
    let mut links = Vec::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if let Some(href) = element.value().attr("href") {
                if let Some(absolute_url) = resolve_link(href, base_url) {
                    links.push(absolute_url);
                }
            }
        }
    }

    links
}

/// Collects the raw reference strings for one category
///
/// Values are kept exactly as written so they can be matched literally when
/// the document is rewritten. Blank values and `data:` URIs are dropped.
fn extract_references(document: &Html, category: ResourceCategory) -> Vec<Reference> {
    let mut references: Vec<Reference> = Vec::new();

    for resource_selector in category.selectors() {
        let Ok(selector) = Selector::parse(resource_selector.selector) else {
            continue;
        };

        for element in document.select(&selector) {
            let Some(value) = element.value().attr(resource_selector.attribute) else {
                continue;
            };
            let trimmed = value.trim();
            if trimmed.is_empty() || trimmed.to_ascii_lowercase().starts_with("data:") {
                continue;
            }
            if references.iter().any(|r| r.value == value) {
                continue;
            }

            references.push(Reference {
                value: value.to_string(),
                declared_type: element.value().attr("type").map(str::to_string),
            });
        }
    }

    references
}

/// Collects stylesheet hrefs for font scanning
fn extract_stylesheets(document: &Html) -> Vec<String> {
    let mut hrefs: Vec<String> = Vec::new();

    for resource_selector in ResourceCategory::Css.selectors() {
        let Ok(selector) = Selector::parse(resource_selector.selector) else {
            continue;
        };
        for element in document.select(&selector) {
            if let Some(href) = element.value().attr(resource_selector.attribute) {
                if !href.trim().is_empty() && !hrefs.iter().any(|h| h == href) {
                    hrefs.push(href.to_string());
                }
            }
        }
    }

    hrefs
}

/// Resolves a link href to an absolute page URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Fragment-only links
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    // Same-page anchors
    if href.starts_with('#') {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) => {
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                Some(page_identity(&absolute_url))
            } else {
                None
            }
        }
        Err(_) => None,
    }
}
