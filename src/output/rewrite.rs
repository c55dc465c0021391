//! Rewrites a fetched document so it loads its resources from the mirror
//!
//! # Passes
//!
//! 1. Every mapped key, longest first, is replaced in its quoted forms
//!    (`"key"`, `'key'`) and as a bare `url(key)`. Keys containing `&` are
//!    also matched in their `&amp;` escaped form.
//! 2. Relative keys are also replaced in their absolute form, resolved
//!    against the page URL.
//! 3. Nested documents get a coarse pass that points leftover `assets/`
//!    and common top-level asset paths at `../assets/`.
//! 4. All `<base>` elements are removed.
//!
//! Replacement is literal text substitution; the document is never
//! re-serialized, so markup the parser would normalize survives untouched.

use crate::resources::ResourceMap;
use crate::state::Depth;
use crate::url::{is_relative_reference, resolve_reference};
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static BASE_ELEMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<base\b[^>]*>").expect("base element pattern is valid"));

/// Top-level directory patterns and the asset directory they are moved to
const TOP_LEVEL_DIRS: &[(&str, &str)] = &[
    ("css", "css"),
    ("js", "js"),
    ("javascript", "js"),
    ("images?", "images"),
    ("img", "images"),
    ("fonts?", "fonts"),
    ("videos?", "videos"),
    ("audio", "audio"),
    ("media", "images"),
];

const REWRITTEN_ATTRIBUTES: &str = "href|src|content|data-src|data-href";

/// Regex/replacement pairs applied to nested documents
static NESTED_RULES: LazyLock<Vec<(Regex, String)>> = LazyLock::new(|| {
    let mut rules = vec![
        (
            format!(r#"(?i)\b({})=(["'])assets/"#, REWRITTEN_ATTRIBUTES),
            "${1}=${2}../assets/".to_string(),
        ),
        (
            r#"(?i)url\((["']?)assets/"#.to_string(),
            "url(${1}../assets/".to_string(),
        ),
    ];

    for (pattern, target) in TOP_LEVEL_DIRS {
        rules.push((
            format!(r#"(?i)\b({})=(["'])/{}/"#, REWRITTEN_ATTRIBUTES, pattern),
            format!("${{1}}=${{2}}../assets/{}/", target),
        ));
        rules.push((
            format!(r#"(?i)url\((["']?)/{}/"#, pattern),
            format!("url(${{1}}../assets/{}/", target),
        ));
    }

    rules
        .into_iter()
        .map(|(pattern, replacement)| {
            (
                Regex::new(&pattern).expect("nested rewrite pattern is valid"),
                replacement,
            )
        })
        .collect()
});

/// Rewrites resource references in `html` to local mirror paths
///
/// # Arguments
///
/// * `html` - The fetched document text
/// * `map` - Resource mapping built so far in this run
/// * `source_url` - URL the document was fetched from
/// * `depth` - Where the document is stored relative to the output root
///
/// # Example
///
/// ```
/// use site_mirror::output::rewrite_document;
/// use site_mirror::resources::{ResourceCategory, ResourceMap, ResourceRecord};
/// use site_mirror::Depth;
/// use url::Url;
///
/// let page = Url::parse("https://example.com/about").unwrap();
/// let mut map = ResourceMap::new();
/// map.record(ResourceRecord {
///     absolute_url: Url::parse("https://example.com/img/a.png").unwrap(),
///     original_reference: "/img/a.png".to_string(),
///     local_relative_path: "assets/images/a.png".to_string(),
///     category: ResourceCategory::Image,
/// });
///
/// let html = r#"<base href="/"><img src="/img/a.png">"#;
/// let rewritten = rewrite_document(html, &map, &page, Depth::Nested);
/// assert_eq!(rewritten, r#"<img src="../assets/images/a.png">"#);
/// ```
pub fn rewrite_document(html: &str, map: &ResourceMap, source_url: &Url, depth: Depth) -> String {
    let mut document = html.to_string();

    for (key, local_path) in map.keys_longest_first() {
        let local = format!("{}{}", depth.prefix(), local_path);
        document = replace_reference(&document, key, &local);

        if is_relative_reference(key) {
            if let Some(absolute) = resolve_reference(source_url, key) {
                if absolute.as_str() != key {
                    document = replace_reference(&document, absolute.as_str(), &local);
                }
            }
        }
    }

    if depth == Depth::Nested {
        document = rewrite_nested_prefixes(&document);
    }

    strip_base_elements(&document)
}

/// Replaces the quoted and `url()` forms of `key`, plain and `&amp;`-escaped
fn replace_reference(document: &str, key: &str, local: &str) -> String {
    let mut out = replace_forms(document, key, local);
    if key.contains('&') {
        let escaped = key.replace('&', "&amp;");
        out = replace_forms(&out, &escaped, local);
    }
    out
}

fn replace_forms(document: &str, key: &str, local: &str) -> String {
    if key.is_empty() || !document.contains(key) {
        return document.to_string();
    }

    document
        .replace(&format!("\"{}\"", key), &format!("\"{}\"", local))
        .replace(&format!("'{}'", key), &format!("'{}'", local))
        .replace(&format!("url({})", key), &format!("url({})", local))
}

/// Points leftover asset paths of a nested document one directory up
pub fn rewrite_nested_prefixes(document: &str) -> String {
    NESTED_RULES
        .iter()
        .fold(document.to_string(), |text, (regex, replacement)| {
            regex.replace_all(&text, replacement.as_str()).into_owned()
        })
}

/// Removes every `<base ...>` element
pub fn strip_base_elements(document: &str) -> String {
    BASE_ELEMENT.replace_all(document, "").into_owned()
}
