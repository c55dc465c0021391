use crate::UrlError;
use percent_encoding::percent_decode_str;
use url::Url;

/// Normalizes a user-supplied seed URL
///
/// # Normalization Steps
///
/// 1. Trim surrounding whitespace
/// 2. Prefix `https://` when no http(s) scheme is present
/// 3. Parse; reject if malformed, non-HTTP(S), or host-less
/// 4. Remove the fragment
///
/// # Examples
///
/// ```
/// use site_mirror::url::normalize_seed;
///
/// let url = normalize_seed("example.com").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/");
/// ```
pub fn normalize_seed(input: &str) -> Result<Url, UrlError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Parse("empty URL".to_string()));
    }

    let lower = trimmed.to_ascii_lowercase();
    let with_scheme = if lower.starts_with("http://") || lower.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let url = Url::parse(&with_scheme).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingDomain);
    }

    Ok(page_identity(&url))
}

/// Returns the URL used to identify a page in the frontier (fragment removed)
pub fn page_identity(url: &Url) -> Url {
    let mut url = url.clone();
    url.set_fragment(None);
    url
}

/// Resolves a reference found in a document against the document's URL
///
/// Returns None for empty references, references that fail to resolve, and
/// anything that does not end up as an http(s) URL.
pub fn resolve_reference(base: &Url, reference: &str) -> Option<Url> {
    let reference = reference.trim();
    if reference.is_empty() {
        return None;
    }

    let resolved = base.join(reference).ok()?;
    match resolved.scheme() {
        "http" | "https" => Some(resolved),
        _ => None,
    }
}

/// Returns true if the reference carries neither a scheme nor a `//` authority
///
/// # Examples
///
/// ```
/// use site_mirror::url::is_relative_reference;
///
/// assert!(is_relative_reference("img/logo.png"));
/// assert!(is_relative_reference("/css/site.css"));
/// assert!(!is_relative_reference("https://cdn.example.com/a.js"));
/// assert!(!is_relative_reference("//cdn.example.com/a.js"));
/// ```
pub fn is_relative_reference(reference: &str) -> bool {
    if reference.starts_with("//") {
        return false;
    }
    !has_scheme(reference)
}

/// Checks for a leading `scheme:` per RFC 3986 (ALPHA *( ALPHA / DIGIT / "+" / "-" / "." ))
fn has_scheme(reference: &str) -> bool {
    let Some(colon) = reference.find(':') else {
        return false;
    };
    let scheme = &reference[..colon];
    let mut chars = scheme.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.')
        }
        _ => false,
    }
}

/// Percent-decodes a URL path, replacing invalid UTF-8 sequences
pub fn decode_path(path: &str) -> String {
    percent_decode_str(path).decode_utf8_lossy().into_owned()
}
