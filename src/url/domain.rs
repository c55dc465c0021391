use url::Url;

/// Extracts the lowercase host from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use site_mirror::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Removes a leading `www.` label from a host
pub fn strip_www(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}

/// Returns the registered base domain of a host: its last two labels
///
/// A leading `www.` is ignored and single-label hosts are returned unchanged.
///
/// # Examples
///
/// ```
/// use site_mirror::url::base_domain;
///
/// assert_eq!(base_domain("www.example.com"), "example.com");
/// assert_eq!(base_domain("blog.eu.example.com"), "example.com");
/// assert_eq!(base_domain("localhost"), "localhost");
/// ```
pub fn base_domain(host: &str) -> String {
    let host = host.to_lowercase();
    let host = strip_www(&host);
    let labels: Vec<&str> = host.split('.').collect();

    if labels.len() < 2 {
        return host.to_string();
    }

    labels[labels.len() - 2..].join(".")
}

/// Returns the leading label of a host that has a subdomain part
///
/// Hosts with two labels or fewer (e.g. `example.com`) have no subdomain and
/// yield `None`.
pub fn leading_label(host: &str) -> Option<&str> {
    if host.matches('.').count() > 1 {
        host.split('.').next()
    } else {
        None
    }
}
