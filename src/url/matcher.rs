use crate::url::domain::leading_label;
use url::Url;

/// Checks if a host sits on a blocklisted subdomain
///
/// Only the leading label is compared, case-insensitively, and only when the
/// host actually has a subdomain part.
///
/// # Examples
///
/// ```
/// use site_mirror::url::is_blocked_subdomain;
///
/// let blocklist = vec!["admin".to_string(), "api".to_string()];
/// assert!(is_blocked_subdomain("admin.example.com", &blocklist));
/// assert!(is_blocked_subdomain("API.example.com", &blocklist));
/// assert!(!is_blocked_subdomain("blog.example.com", &blocklist));
/// assert!(!is_blocked_subdomain("example.com", &blocklist));
/// ```
pub fn is_blocked_subdomain(host: &str, blocklist: &[String]) -> bool {
    match leading_label(host) {
        Some(label) => blocklist
            .iter()
            .any(|blocked| blocked.eq_ignore_ascii_case(label)),
        None => false,
    }
}

/// Checks if a URL path ends in one of the given extensions
///
/// The comparison ignores case and looks only at the path, so query strings
/// such as `?v=2` do not hide the extension.
pub fn has_skipped_extension(url: &Url, extensions: &[String]) -> bool {
    let path = url.path().to_ascii_lowercase();
    extensions
        .iter()
        .any(|ext| path.ends_with(&ext.to_ascii_lowercase()))
}
