//! URL handling module for Site-Mirror
//!
//! This module provides seed normalization, reference resolution, base-domain
//! extraction, and the link scoping rules that decide which discovered links
//! enter the crawl frontier.

mod domain;
mod matcher;
mod normalize;

use crate::config::ScopeConfig;
use crate::UrlError;
use ::url::Url;

// Re-export main functions
pub use domain::{base_domain, extract_domain, leading_label, strip_www};
pub use matcher::{has_skipped_extension, is_blocked_subdomain};
pub use normalize::{
    decode_path, is_relative_reference, normalize_seed, page_identity, resolve_reference,
};

/// Link classification types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkClassification {
    /// Same site, crawlable page
    InScope,
    /// Host outside the seed's base domain
    ForeignDomain,
    /// Same base domain but the leading label is blocklisted
    BlockedSubdomain,
    /// Path ends in an extension that is not an HTML page
    NonPage,
}

impl LinkClassification {
    /// Returns true if the link should be added to the frontier
    pub fn should_crawl(&self) -> bool {
        matches!(self, Self::InScope)
    }
}

/// Same-site scoping rules for one crawl
#[derive(Debug, Clone)]
pub struct LinkScope {
    /// Base domain of the seed (last two host labels)
    pub base_domain: String,
    /// Leading host labels that are never crawled
    pub subdomain_blocklist: Vec<String>,
    /// Path extensions that are not HTML pages
    pub skip_extensions: Vec<String>,
}

impl LinkScope {
    /// Builds the scope for a crawl rooted at `seed`
    pub fn for_seed(seed: &Url, config: &ScopeConfig) -> Result<Self, UrlError> {
        let host = extract_domain(seed).ok_or(UrlError::MissingDomain)?;
        Ok(Self {
            base_domain: base_domain(&host),
            subdomain_blocklist: config.subdomain_blocklist.clone(),
            skip_extensions: config.skip_extensions.clone(),
        })
    }

    /// Classifies a resolved link against this scope
    ///
    /// The checks run in this order:
    /// 1. Base domain
    /// 2. Subdomain blocklist
    /// 3. Non-page extension
    ///
    /// # Examples
    ///
    /// ```
    /// use site_mirror::config::ScopeConfig;
    /// use site_mirror::url::{LinkClassification, LinkScope};
    /// use url::Url;
    ///
    /// let seed = Url::parse("https://www.example.com/").unwrap();
    /// let scope = LinkScope::for_seed(&seed, &ScopeConfig::default()).unwrap();
    ///
    /// let link = Url::parse("https://admin.example.com/x").unwrap();
    /// assert_eq!(scope.classify(&link), LinkClassification::BlockedSubdomain);
    /// ```
    pub fn classify(&self, url: &Url) -> LinkClassification {
        let host = match extract_domain(url) {
            Some(h) => h,
            None => return LinkClassification::ForeignDomain,
        };

        if base_domain(&host) != self.base_domain {
            return LinkClassification::ForeignDomain;
        }

        if is_blocked_subdomain(&host, &self.subdomain_blocklist) {
            return LinkClassification::BlockedSubdomain;
        }

        if has_skipped_extension(url, &self.skip_extensions) {
            return LinkClassification::NonPage;
        }

        LinkClassification::InScope
    }
}
