//! Integration tests for the mirror
//!
//! These tests use wiremock to create mock HTTP servers and run full
//! mirror cycles into temporary directories.

use site_mirror::config::Config;
use site_mirror::crawler::{mirror, MessageKind, Reporter, StatusMessage};
use site_mirror::{CancelFlag, CrawlReport, RunState};
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration writing into `output`
fn create_test_config(output: &Path, max_pages: u32) -> Config {
    let mut config = Config::default();
    config.crawler.max_pages = max_pages;
    config.crawler.use_browser = false;
    config.output.directory = Some(output.to_string_lossy().into_owned());
    config
}

/// Accepts every validity pre-check
async fn mount_head_ok(server: &MockServer) {
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
}

async fn mount_page(server: &MockServer, page_path: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

fn recording_reporter() -> (Reporter, Arc<Mutex<Vec<StatusMessage>>>) {
    let messages: Arc<Mutex<Vec<StatusMessage>>> = Arc::default();
    let sink = messages.clone();
    let reporter = Reporter::new().with_status_callback(Arc::new(move |m: StatusMessage| {
        sink.lock().unwrap().push(m)
    }));
    (reporter, messages)
}

async fn run(server: &MockServer, config: &Config) -> CrawlReport {
    mirror(
        &format!("{}/", server.uri()),
        config,
        Reporter::new(),
        CancelFlag::new(),
    )
    .await
    .expect("mirror should run")
}

fn read(root: &Path, relative: &str) -> String {
    std::fs::read_to_string(root.join(relative))
        .unwrap_or_else(|e| panic!("failed to read {}: {}", relative, e))
}

#[tokio::test]
async fn test_page_budget_of_one_saves_only_the_seed() {
    let server = MockServer::start().await;
    mount_head_ok(&server).await;
    mount_page(
        &server,
        "/",
        r#"<html><body><a href="/about">About</a><a href="/contact">Contact</a></body></html>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let root = temp.path().join("mirror");
    let report = run(&server, &create_test_config(&root, 1)).await;

    assert_eq!(report.state, RunState::Completed);
    assert_eq!(report.pages.len(), 1);
    assert!(root.join("index.html").is_file());
    assert_eq!(std::fs::read_dir(root.join("pages")).unwrap().count(), 0);
    assert!(root.join("netlify.toml").is_file());
}

#[tokio::test]
async fn test_visited_pages_respect_budget_and_are_unique() {
    let server = MockServer::start().await;
    mount_head_ok(&server).await;
    mount_page(
        &server,
        "/",
        r##"<html><body>
            <a href="/p1">1</a><a href="/p1#top">1 again</a>
            <a href="/p2">2</a><a href="/p3">3</a><a href="/">home</a>
        </body></html>"##,
    )
    .await;
    mount_page(&server, "/p1", r#"<html><body><a href="/p2">2</a></body></html>"#).await;
    Mock::given(method("GET"))
        .and(path("/p3"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    mount_page(&server, "/p2", "<html><body>two</body></html>").await;

    let temp = TempDir::new().unwrap();
    let root = temp.path().join("mirror");
    let report = run(&server, &create_test_config(&root, 3)).await;

    assert_eq!(report.visited.len(), 3);
    let unique: HashSet<&str> = report.visited.iter().map(|u| u.as_str()).collect();
    assert_eq!(unique.len(), report.visited.len());

    let paths: Vec<&str> = report.visited.iter().map(|u| u.path()).collect();
    assert_eq!(paths, vec!["/", "/p1", "/p2"]);
    assert!(root.join("pages/p1.html").is_file());
    assert!(root.join("pages/p2.html").is_file());
}

#[tokio::test]
async fn test_nested_page_uses_fonts_found_in_stylesheet() {
    let server = MockServer::start().await;
    mount_head_ok(&server).await;
    mount_page(
        &server,
        "/",
        r#"<html><head><link rel="stylesheet" href="site.css"></head>
           <body><a href="/about">About</a></body></html>"#,
    )
    .await;
    mount_page(
        &server,
        "/about",
        r#"<html><head><link rel="stylesheet" href="/site.css">
           <link rel="preload" href="fonts/a.woff2" as="font"></head>
           <body><a href="/">Home</a></body></html>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/site.css"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "@font-face { font-family: A; src: url('fonts/a.woff2') format('woff2'); }",
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/fonts/a.woff2"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"wOF2".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let root = temp.path().join("mirror");
    let report = run(&server, &create_test_config(&root, 5)).await;
    assert_eq!(report.state, RunState::Completed);

    let index = read(&root, "index.html");
    assert!(index.contains(r#"href="assets/css/site.css""#), "{}", index);

    let about = read(&root, "pages/about.html");
    assert!(about.contains(r#"href="../assets/fonts/a.woff2""#), "{}", about);
    assert!(about.contains(r#"href="../assets/css/site.css""#), "{}", about);
    assert!(!about.contains(r#""fonts/a.woff2""#));

    let css = read(&root, "assets/css/site.css");
    assert!(css.contains("url('../fonts/a.woff2')"), "{}", css);
    assert_eq!(std::fs::read(root.join("assets/fonts/a.woff2")).unwrap(), b"wOF2");
}

#[tokio::test]
async fn test_shared_asset_is_downloaded_once() {
    let server = MockServer::start().await;
    mount_head_ok(&server).await;
    mount_page(
        &server,
        "/",
        r#"<html><body><img src="/img/logo.png"><a href="/blog/post">Post</a></body></html>"#,
    )
    .await;
    mount_page(
        &server,
        "/blog/post",
        r#"<html><body><img src="../img/logo.png"><img src="/img/logo.png"></body></html>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/img/logo.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"png".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let root = temp.path().join("mirror");
    let report = run(&server, &create_test_config(&root, 5)).await;

    assert_eq!(report.statistics.resources_downloaded(), 1);
    let post = read(&root, "pages/blog_post.html");
    assert_eq!(post.matches(r#"src="../assets/images/logo.png""#).count(), 2);
    assert!(read(&root, "index.html").contains(r#"src="assets/images/logo.png""#));
}

#[tokio::test]
async fn test_base_element_is_removed_and_references_rewritten() {
    let server = MockServer::start().await;
    mount_head_ok(&server).await;
    mount_page(
        &server,
        "/",
        r#"<html><head><base href="https://cdn.example.com/"><script src="js/app.js"></script></head>
           <body><img src='img/a.png'></body></html>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/js/app.js"))
        .respond_with(ResponseTemplate::new(200).set_body_string("console.log(1);"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/img/a.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"png".to_vec()))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let root = temp.path().join("mirror");
    run(&server, &create_test_config(&root, 1)).await;

    let index = read(&root, "index.html");
    assert!(!index.to_ascii_lowercase().contains("<base"));
    assert!(index.contains(r#"src="assets/js/app.js""#), "{}", index);
    assert!(index.contains("src='assets/images/a.png'"), "{}", index);
    assert!(!index.contains(r#""js/app.js""#));
    assert!(!index.contains("'img/a.png'"));
    assert!(!index.contains("../"));
}

#[tokio::test]
async fn test_failed_page_fetch_is_skipped() {
    let server = MockServer::start().await;
    mount_head_ok(&server).await;
    mount_page(
        &server,
        "/",
        r#"<html><body><a href="/broken">Broken</a><a href="/good">Good</a></body></html>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_page(&server, "/good", "<html><body>ok</body></html>").await;

    let temp = TempDir::new().unwrap();
    let root = temp.path().join("mirror");
    let (reporter, messages) = recording_reporter();
    let report = mirror(
        &format!("{}/", server.uri()),
        &create_test_config(&root, 10),
        reporter,
        CancelFlag::new(),
    )
    .await
    .unwrap();

    assert_eq!(report.state, RunState::Completed);
    assert_eq!(report.statistics.pages_saved, 2);
    assert_eq!(report.statistics.pages_failed, 1);
    assert!(!root.join("pages/broken.html").exists());
    assert!(root.join("pages/good.html").is_file());

    let messages = messages.lock().unwrap();
    assert!(messages
        .iter()
        .any(|m| m.kind == MessageKind::Log && m.text.starts_with("Failed to fetch: ")));
    let last_status = messages
        .iter()
        .filter(|m| m.kind == MessageKind::Status)
        .last()
        .unwrap();
    assert_eq!(last_status.text, "Completed (3 pages)");
}

#[tokio::test]
async fn test_precheck_rejects_missing_pages() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    mount_head_ok(&server).await;
    mount_page(
        &server,
        "/",
        r#"<html><body><a href="/missing">Gone</a></body></html>"#,
    )
    .await;

    let temp = TempDir::new().unwrap();
    let root = temp.path().join("mirror");
    let report = run(&server, &create_test_config(&root, 10)).await;

    assert_eq!(report.visited.len(), 1);
    assert_eq!(report.statistics.pages_skipped, 1);
    assert!(!root.join("pages/missing.html").exists());
}

#[tokio::test]
async fn test_foreign_and_non_page_links_are_not_followed() {
    let server = MockServer::start().await;
    mount_head_ok(&server).await;
    mount_page(
        &server,
        "/",
        r#"<html><body>
            <a href="http://localhost:1/elsewhere">Foreign</a>
            <a href="/files/report.pdf">PDF</a>
            <a href="/photo.JPG">Photo</a>
            <a href="mailto:someone@example.com">Mail</a>
        </body></html>"#,
    )
    .await;

    let temp = TempDir::new().unwrap();
    let root = temp.path().join("mirror");
    let report = run(&server, &create_test_config(&root, 10)).await;

    assert_eq!(report.state, RunState::Completed);
    assert_eq!(report.visited.len(), 1);
    assert_eq!(report.statistics.pages_skipped, 0);
}

#[tokio::test]
async fn test_cancel_before_start_stops_without_fetching() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let root = temp.path().join("mirror");
    let cancel = CancelFlag::new();
    cancel.cancel();
    let (reporter, messages) = recording_reporter();

    let report = mirror(
        &format!("{}/", server.uri()),
        &create_test_config(&root, 10),
        reporter,
        cancel,
    )
    .await
    .unwrap();

    assert_eq!(report.state, RunState::Stopped);
    assert!(report.visited.is_empty());
    let messages = messages.lock().unwrap();
    assert_eq!(
        messages
            .iter()
            .filter(|m| m.kind == MessageKind::Status)
            .last()
            .map(|m| m.text.as_str()),
        Some("Stopped by user")
    );
}

#[tokio::test]
async fn test_disabled_categories_are_left_untouched() {
    let server = MockServer::start().await;
    mount_head_ok(&server).await;
    mount_page(
        &server,
        "/",
        r#"<html><body><img src="a.png"><script src="app.js"></script></body></html>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/a.png"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/app.js"))
        .respond_with(ResponseTemplate::new(200).set_body_string("1;"))
        .expect(1)
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let root = temp.path().join("mirror");
    let mut config = create_test_config(&root, 1);
    config.resources.images = false;
    config.output.netlify = false;
    run(&server, &config).await;

    let index = read(&root, "index.html");
    assert!(index.contains(r#"src="a.png""#));
    assert!(index.contains(r#"src="assets/js/app.js""#));
    assert!(!root.join("netlify.toml").exists());
}
