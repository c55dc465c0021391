//! Saved page records and their storage depth

use url::Url;

/// Directory holding every page except the seed document
pub const PAGES_DIR: &str = "pages";

/// Filename of the seed document at the output root
pub const ROOT_DOCUMENT: &str = "index.html";

/// Where a document sits relative to the output root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Depth {
    /// Stored at the output root (the seed page)
    Root,
    /// Stored one directory below the output root
    Nested,
}

impl Depth {
    /// Prefix that turns a root-relative asset path into one valid from this depth
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Root => "",
            Self::Nested => "../",
        }
    }
}

/// A page that was fetched and written to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRecord {
    pub url: Url,
    /// Path relative to the output root, always `/`-separated
    pub storage_relative_path: String,
    pub depth: Depth,
}

impl PageRecord {
    /// Decides where a page is stored
    ///
    /// The seed is always `index.html`. Any other page goes under `pages/`
    /// with its URL path flattened (`/` → `_`), or `page_<n>.html` when the
    /// path is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use site_mirror::state::{Depth, PageRecord};
    /// use url::Url;
    ///
    /// let seed = Url::parse("https://example.com/").unwrap();
    /// let page = Url::parse("https://example.com/docs/intro/").unwrap();
    ///
    /// let record = PageRecord::for_url(&page, &seed, 2);
    /// assert_eq!(record.storage_relative_path, "pages/docs_intro.html");
    /// assert_eq!(record.depth, Depth::Nested);
    /// ```
    pub fn for_url(url: &Url, seed: &Url, sequence: u32) -> Self {
        if url == seed {
            return Self {
                url: url.clone(),
                storage_relative_path: ROOT_DOCUMENT.to_string(),
                depth: Depth::Root,
            };
        }

        let path = url.path().trim_matches('/');
        let filename = if path.is_empty() {
            format!("page_{}.html", sequence)
        } else {
            format!("{}.html", path.replace('/', "_"))
        };

        Self {
            url: url.clone(),
            storage_relative_path: format!("{}/{}", PAGES_DIR, filename),
            depth: Depth::Nested,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed() -> Url {
        Url::parse("https://example.com/").unwrap()
    }

    #[test]
    fn test_depth_prefix() {
        assert_eq!(Depth::Root.prefix(), "");
        assert_eq!(Depth::Nested.prefix(), "../");
    }

    #[test]
    fn test_seed_is_root_document() {
        let record = PageRecord::for_url(&seed(), &seed(), 1);
        assert_eq!(record.storage_relative_path, "index.html");
        assert_eq!(record.depth, Depth::Root);
    }

    #[test]
    fn test_nested_path_flattened() {
        let url = Url::parse("https://example.com/blog/2024/post").unwrap();
        let record = PageRecord::for_url(&url, &seed(), 3);
        assert_eq!(record.storage_relative_path, "pages/blog_2024_post.html");
        assert_eq!(record.depth, Depth::Nested);
    }

    #[test]
    fn test_empty_path_uses_sequence() {
        // Same site, different host: the path is empty but it is not the seed
        let url = Url::parse("https://blog.example.com/").unwrap();
        let record = PageRecord::for_url(&url, &seed(), 7);
        assert_eq!(record.storage_relative_path, "pages/page_7.html");
    }

    #[test]
    fn test_query_is_ignored_for_storage() {
        let url = Url::parse("https://example.com/search?q=rust").unwrap();
        let record = PageRecord::for_url(&url, &seed(), 2);
        assert_eq!(record.storage_relative_path, "pages/search.html");
    }
}
