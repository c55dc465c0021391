//! Font discovery inside stylesheets
//!
//! Fonts are never referenced by HTML elements directly; they are found by
//! scanning `url(...)` values in stylesheets. Each stylesheet is scanned at
//! most once per run. When the stylesheet was mirrored, its font references
//! are rewritten to the sibling `fonts/` directory.

use crate::resources::{Reference, ResolveSummary, ResourceCategory, ResourceMap, ResourceResolver};
use crate::url::resolve_reference;
use regex::{Captures, Regex};
use std::sync::LazyLock;
use url::Url;

static FONT_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)url\(\s*["']?([^"'()]+\.(?:woff2?|ttf|otf|eot))["']?\s*\)"#)
        .expect("font url pattern is valid")
});

/// Returns the distinct font references in a stylesheet, in order of appearance
///
/// # Examples
///
/// ```
/// use site_mirror::resources::find_font_references;
///
/// let css = r#"@font-face { src: url("../fonts/a.woff2") format("woff2"), url(b.ttf); }"#;
/// assert_eq!(find_font_references(css), vec!["../fonts/a.woff2", "b.ttf"]);
/// ```
pub fn find_font_references(css: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for captures in FONT_URL.captures_iter(css) {
        let reference = captures[1].trim().to_string();
        if !found.contains(&reference) {
            found.push(reference);
        }
    }
    found
}

/// Rewrites mirrored font references in stylesheet text to `../fonts/<file>`
///
/// Stylesheets live in `assets/css/`, so their fonts are one directory up.
/// References that were not mirrored are left as they are.
pub fn localize_stylesheet(css: &str, stylesheet_url: &Url, map: &ResourceMap) -> String {
    let font_prefix = format!("{}/", ResourceCategory::Font.relative_dir());

    FONT_URL
        .replace_all(css, |captures: &Captures| {
            let whole = &captures[0];
            let reference = captures[1].trim();

            let local = resolve_reference(stylesheet_url, reference)
                .and_then(|absolute| map.path_for(absolute.as_str()))
                .and_then(|path| path.strip_prefix(&font_prefix));

            match local {
                Some(file) => whole.replacen(
                    reference,
                    &format!("../{}/{}", ResourceCategory::Font.dir_name(), file),
                    1,
                ),
                None => whole.to_string(),
            }
        })
        .into_owned()
}

impl ResourceResolver {
    /// Scans one stylesheet for fonts and downloads them
    ///
    /// A stylesheet that was mirrored is read from disk and rewritten in place
    /// to point at the local fonts. Otherwise it is fetched over HTTP and only
    /// inspected. That includes a stylesheet mapped onto a same-named file
    /// written for another URL.
    pub async fn scan_stylesheet(&self, stylesheet_url: &Url, map: &mut ResourceMap) -> ResolveSummary {
        let local_path = map
            .own_path(stylesheet_url)
            .map(|relative| self.layout().resolve(relative))
            .filter(|path| path.is_file());

        let css = match &local_path {
            Some(path) => match tokio::fs::read(path).await {
                Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                Err(e) => {
                    tracing::warn!("Failed to read stylesheet {}: {}", path.display(), e);
                    return ResolveSummary::default();
                }
            },
            None => {
                if self.cancel_flag().is_cancelled() {
                    return ResolveSummary::default();
                }
                match self.fetcher().fetch_stylesheet(stylesheet_url).await {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::debug!("Could not fetch stylesheet {}: {}", stylesheet_url, e);
                        return ResolveSummary::default();
                    }
                }
            }
        };

        let references: Vec<Reference> = find_font_references(&css)
            .into_iter()
            .map(Reference::new)
            .collect();
        if references.is_empty() {
            return ResolveSummary::default();
        }

        let summary = self
            .resolve(&references, ResourceCategory::Font, stylesheet_url, map)
            .await;

        if let Some(path) = local_path {
            let localized = localize_stylesheet(&css, stylesheet_url, map);
            if localized != css {
                if let Err(e) = tokio::fs::write(&path, localized).await {
                    tracing::warn!("Failed to rewrite stylesheet {}: {}", path.display(), e);
                }
            }
        }

        summary
    }
}
