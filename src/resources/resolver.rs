//! Downloads the resources a page references and records their local paths
//!
//! # Flow
//!
//! 1. Plan: resolve each reference against the page URL, skip URLs already in
//!    the map (recording an alias), and pick a filename. A file that already
//!    exists on disk (or was claimed earlier in the same batch) is reused
//!    instead of downloaded.
//! 2. Download: run the planned fetches through a bounded pool. Cancellation
//!    is checked before each request starts.
//! 3. Record: write the bodies and update the map from this task only.
//! 4. Settle: a URL whose name was claimed earlier in the batch maps onto
//!    that file once it is written. If the claimant failed, the next URL
//!    with the same name is downloaded in another round.

use crate::crawler::{FetchError, Fetcher, Reporter};
use crate::output::OutputLayout;
use crate::resources::filename::derive_filename;
use crate::resources::{ResourceCategory, ResourceMap, ResourceRecord};
use crate::state::CancelFlag;
use crate::url::resolve_reference;
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::path::Path;
use url::Url;

/// A resource reference taken from a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// Attribute value (or CSS `url()` argument) exactly as written
    pub value: String,
    /// MIME type declared next to the reference (`type` attribute), if any
    pub declared_type: Option<String>,
}

impl Reference {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            declared_type: None,
        }
    }
}

/// Outcome counts for one resolve call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveSummary {
    pub downloaded: usize,
    /// Mapped without a download (already mapped or already on disk)
    pub reused: usize,
    pub failed: usize,
    pub bytes: u64,
}

#[derive(Debug)]
struct PlannedDownload {
    absolute_url: Url,
    original_reference: String,
    filename: String,
}

impl PlannedDownload {
    fn into_record(self, category: ResourceCategory) -> ResourceRecord {
        ResourceRecord {
            local_relative_path: format!("{}/{}", category.relative_dir(), self.filename),
            absolute_url: self.absolute_url,
            original_reference: self.original_reference,
            category,
        }
    }
}

/// Resolves and downloads resource references into the output layout
#[derive(Clone)]
pub struct ResourceResolver {
    fetcher: Fetcher,
    layout: OutputLayout,
    cancel: CancelFlag,
    reporter: Reporter,
    concurrency: usize,
}

impl ResourceResolver {
    pub fn new(
        fetcher: Fetcher,
        layout: OutputLayout,
        cancel: CancelFlag,
        reporter: Reporter,
        concurrency: usize,
    ) -> Self {
        Self {
            fetcher,
            layout,
            cancel,
            reporter,
            concurrency: concurrency.max(1),
        }
    }

    pub(crate) fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    pub(crate) fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    pub(crate) fn cancel_flag(&self) -> &CancelFlag {
        &self.cancel
    }

    /// Resolves one category's references from a single source document
    ///
    /// Failed downloads are logged and skipped; their references stay
    /// unmapped and are left untouched by the rewriter.
    pub async fn resolve(
        &self,
        references: &[Reference],
        category: ResourceCategory,
        source_url: &Url,
        map: &mut ResourceMap,
    ) -> ResolveSummary {
        let mut summary = ResolveSummary::default();
        let dest_dir = self.layout.category_dir(category);

        let mut planned: Vec<PlannedDownload> = Vec::new();
        let mut planned_urls: HashSet<String> = HashSet::new();
        let mut claimed_names: HashSet<String> = HashSet::new();
        // References whose outcome depends on a download in this batch
        let mut pending_aliases: Vec<(String, Url)> = Vec::new();
        let mut same_name: Vec<PlannedDownload> = Vec::new();
        // Names present in the category directory: reused or written by this call
        let mut available: HashSet<String> = HashSet::new();

        for reference in references {
            let value = reference.value.as_str();
            let trimmed = value.trim();
            if trimmed.is_empty() || trimmed.to_ascii_lowercase().starts_with("data:") {
                continue;
            }

            let Some(absolute_url) = resolve_reference(source_url, value) else {
                tracing::debug!("Ignoring unresolvable {} reference: {}", category, value);
                continue;
            };

            if map.contains_url(&absolute_url) {
                map.add_alias(value, &absolute_url);
                summary.reused += 1;
                continue;
            }

            if planned_urls.contains(absolute_url.as_str()) {
                pending_aliases.push((value.to_string(), absolute_url));
                continue;
            }
            planned_urls.insert(absolute_url.to_string());

            let filename = derive_filename(&absolute_url, reference.declared_type.as_deref());
            let download = PlannedDownload {
                absolute_url,
                original_reference: value.to_string(),
                filename,
            };

            if claimed_names.contains(&download.filename) {
                same_name.push(download);
            } else if dest_dir.join(&download.filename).is_file() {
                claimed_names.insert(download.filename.clone());
                available.insert(download.filename.clone());
                map.record(download.into_record(category));
                summary.reused += 1;
            } else {
                claimed_names.insert(download.filename.clone());
                planned.push(download);
            }
        }

        let mut round = planned;
        loop {
            if !round.is_empty() {
                self.download_round(round, category, &dest_dir, map, &mut summary, &mut available)
                    .await;
            }

            // A same-named URL takes over the name when every earlier claimant failed
            let mut next: Vec<PlannedDownload> = Vec::new();
            let mut waiting: Vec<PlannedDownload> = Vec::new();
            for download in same_name {
                if available.contains(&download.filename) {
                    map.record(download.into_record(category));
                    summary.reused += 1;
                } else if next.iter().any(|d| d.filename == download.filename) {
                    waiting.push(download);
                } else {
                    next.push(download);
                }
            }

            if next.is_empty() || self.cancel.is_cancelled() {
                break;
            }
            same_name = waiting;
            round = next;
        }

        for (value, absolute_url) in pending_aliases {
            if map.add_alias(&value, &absolute_url) {
                summary.reused += 1;
            }
        }

        summary
    }

    /// Downloads one set of distinctly named resources and records the ones written
    async fn download_round(
        &self,
        planned: Vec<PlannedDownload>,
        category: ResourceCategory,
        dest_dir: &Path,
        map: &mut ResourceMap,
        summary: &mut ResolveSummary,
        available: &mut HashSet<String>,
    ) {
        let fetcher = &self.fetcher;
        let cancel = &self.cancel;
        let results: Vec<(PlannedDownload, Option<Result<Vec<u8>, FetchError>>)> =
            stream::iter(planned)
                .map(|download| async move {
                    if cancel.is_cancelled() {
                        return (download, None);
                    }
                    let result = fetcher.download(&download.absolute_url).await;
                    (download, Some(result))
                })
                .buffer_unordered(self.concurrency)
                .collect()
                .await;

        for (download, result) in results {
            match result {
                None => {}
                Some(Ok(body)) => {
                    let path = dest_dir.join(&download.filename);
                    if let Err(e) = tokio::fs::write(&path, &body).await {
                        tracing::warn!("Failed to write {}: {}", path.display(), e);
                        summary.failed += 1;
                        continue;
                    }

                    let size = body.len() as u64;
                    tracing::info!(
                        "Downloaded {}: {} ({} KB)",
                        category,
                        download.filename,
                        size / 1024
                    );
                    self.reporter.log(format!(
                        "Downloaded {}: {} ({:.1}KB)",
                        category,
                        download.filename,
                        size as f64 / 1024.0
                    ));
                    available.insert(download.filename.clone());
                    map.record(download.into_record(category));
                    summary.downloaded += 1;
                    summary.bytes += size;
                }
                Some(Err(e)) => {
                    tracing::warn!("Failed to download {}: {}", download.absolute_url, e);
                    summary.failed += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::crawler::FetchMode;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn resolver(root: &std::path::Path, cancel: CancelFlag) -> ResourceResolver {
        let layout = OutputLayout::new(root);
        layout.create().unwrap();
        let fetcher = Fetcher::new(&Config::default(), FetchMode::Plain).unwrap();
        ResourceResolver::new(fetcher, layout, cancel, Reporter::new(), 4)
    }

    fn refs(values: &[&str]) -> Vec<Reference> {
        values.iter().map(|v| Reference::new(*v)).collect()
    }

    #[tokio::test]
    async fn test_downloads_and_maps_references() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/img/a.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"png".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let temp = TempDir::new().unwrap();
        let resolver = resolver(temp.path(), CancelFlag::new());
        let page = Url::parse(&format!("{}/", server.uri())).unwrap();
        let mut map = ResourceMap::new();

        let summary = resolver
            .resolve(&refs(&["img/a.png", "/img/a.png"]), ResourceCategory::Image, &page, &mut map)
            .await;

        assert_eq!(summary.downloaded, 1);
        assert_eq!(summary.failed, 0);
        assert_eq!(map.len(), 1);
        assert_eq!(map.path_for("img/a.png"), Some("assets/images/a.png"));
        assert_eq!(map.path_for("/img/a.png"), Some("assets/images/a.png"));
        assert_eq!(
            std::fs::read(temp.path().join("assets/images/a.png")).unwrap(),
            b"png"
        );
    }

    #[tokio::test]
    async fn test_already_mapped_url_is_not_downloaded_again() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/js/app.js"))
            .respond_with(ResponseTemplate::new(200).set_body_string("1;"))
            .expect(1)
            .mount(&server)
            .await;

        let temp = TempDir::new().unwrap();
        let resolver = resolver(temp.path(), CancelFlag::new());
        let root = Url::parse(&format!("{}/", server.uri())).unwrap();
        let nested = root.join("blog/post").unwrap();
        let mut map = ResourceMap::new();

        resolver
            .resolve(&refs(&["js/app.js"]), ResourceCategory::Js, &root, &mut map)
            .await;
        let second = resolver
            .resolve(&refs(&["../js/app.js"]), ResourceCategory::Js, &nested, &mut map)
            .await;

        assert_eq!(second.downloaded, 0);
        assert_eq!(second.reused, 1);
        assert_eq!(map.path_for("../js/app.js"), Some("assets/js/app.js"));
    }

    #[tokio::test]
    async fn test_existing_file_is_reused() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("new"))
            .expect(0)
            .mount(&server)
            .await;

        let temp = TempDir::new().unwrap();
        let resolver = resolver(temp.path(), CancelFlag::new());
        std::fs::write(temp.path().join("assets/css/site.css"), "old").unwrap();

        let page = Url::parse(&format!("{}/", server.uri())).unwrap();
        let mut map = ResourceMap::new();
        let summary = resolver
            .resolve(&refs(&["css/site.css"]), ResourceCategory::Css, &page, &mut map)
            .await;

        assert_eq!(summary.reused, 1);
        assert_eq!(map.path_for("css/site.css"), Some("assets/css/site.css"));
        assert_eq!(
            std::fs::read_to_string(temp.path().join("assets/css/site.css")).unwrap(),
            "old"
        );
    }

    #[tokio::test]
    async fn test_failed_download_stays_unmapped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing.png"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let temp = TempDir::new().unwrap();
        let resolver = resolver(temp.path(), CancelFlag::new());
        let page = Url::parse(&format!("{}/", server.uri())).unwrap();
        let mut map = ResourceMap::new();

        let summary = resolver
            .resolve(&refs(&["missing.png"]), ResourceCategory::Image, &page, &mut map)
            .await;

        assert_eq!(summary.failed, 1);
        assert!(map.is_empty());
        assert_eq!(map.path_for("missing.png"), None);
    }

    #[tokio::test]
    async fn test_cancelled_resolver_downloads_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let temp = TempDir::new().unwrap();
        let cancel = CancelFlag::new();
        cancel.cancel();
        let resolver = resolver(temp.path(), cancel);
        let page = Url::parse(&format!("{}/", server.uri())).unwrap();
        let mut map = ResourceMap::new();

        let summary = resolver
            .resolve(&refs(&["a.png", "b.png"]), ResourceCategory::Image, &page, &mut map)
            .await;

        assert_eq!(summary, ResolveSummary::default());
        assert!(map.is_empty());
    }

    #[tokio::test]
    async fn test_data_uris_are_ignored() {
        let temp = TempDir::new().unwrap();
        let resolver = resolver(temp.path(), CancelFlag::new());
        let page = Url::parse("https://example.com/").unwrap();
        let mut map = ResourceMap::new();

        let summary = resolver
            .resolve(
                &refs(&["data:image/png;base64,AAAA", "  "]),
                ResourceCategory::Image,
                &page,
                &mut map,
            )
            .await;

        assert_eq!(summary, ResolveSummary::default());
        assert!(map.is_empty());
    }

    #[tokio::test]
    async fn test_same_name_falls_back_when_first_download_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/a/logo.png"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/b/logo.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"b".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let temp = TempDir::new().unwrap();
        let resolver = resolver(temp.path(), CancelFlag::new());
        let page = Url::parse(&format!("{}/", server.uri())).unwrap();
        let mut map = ResourceMap::new();

        let summary = resolver
            .resolve(&refs(&["a/logo.png", "b/logo.png"]), ResourceCategory::Image, &page, &mut map)
            .await;

        assert_eq!(summary.downloaded, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(map.path_for("a/logo.png"), None);
        assert_eq!(map.path_for("b/logo.png"), Some("assets/images/logo.png"));
        assert_eq!(
            std::fs::read(temp.path().join("assets/images/logo.png")).unwrap(),
            b"b"
        );
    }

    #[tokio::test]
    async fn test_same_name_shares_written_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/a/logo.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"a".to_vec()))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/b/logo.png"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let temp = TempDir::new().unwrap();
        let resolver = resolver(temp.path(), CancelFlag::new());
        let page = Url::parse(&format!("{}/", server.uri())).unwrap();
        let mut map = ResourceMap::new();

        let summary = resolver
            .resolve(&refs(&["a/logo.png", "b/logo.png"]), ResourceCategory::Image, &page, &mut map)
            .await;

        assert_eq!(summary.downloaded, 1);
        assert_eq!(summary.reused, 1);
        assert_eq!(map.path_for("b/logo.png"), Some("assets/images/logo.png"));
        let owners: Vec<&str> = map.records().iter().map(|r| r.absolute_url.path()).collect();
        assert_eq!(owners, vec!["/a/logo.png", "/b/logo.png"]);
    }

    #[tokio::test]
    async fn test_same_name_reuses_file_found_on_disk() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let temp = TempDir::new().unwrap();
        let resolver = resolver(temp.path(), CancelFlag::new());
        std::fs::write(temp.path().join("assets/images/logo.png"), "old").unwrap();
        let page = Url::parse(&format!("{}/", server.uri())).unwrap();
        let mut map = ResourceMap::new();

        let summary = resolver
            .resolve(&refs(&["a/logo.png", "b/logo.png"]), ResourceCategory::Image, &page, &mut map)
            .await;

        assert_eq!(summary.reused, 2);
        assert_eq!(map.path_for("b/logo.png"), Some("assets/images/logo.png"));
    }

    #[tokio::test]
    async fn test_dot_segment_name_is_downloaded_not_reused() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"img".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let temp = TempDir::new().unwrap();
        let resolver = resolver(temp.path(), CancelFlag::new());
        let page = Url::parse(&format!("{}/", server.uri())).unwrap();
        let mut map = ResourceMap::new();

        let summary = resolver
            .resolve(&refs(&["x/a%2F.."]), ResourceCategory::Image, &page, &mut map)
            .await;

        assert_eq!(summary.downloaded, 1);
        let local = map.path_for("x/a%2F..").unwrap();
        assert!(local.starts_with("assets/images/resource_"), "{}", local);
        assert!(temp.path().join(local).is_file());
    }
}
