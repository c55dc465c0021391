//! Deterministic local filenames for downloaded resources

use crate::url::decode_path;
use sha2::{Digest, Sha256};
use url::Url;

/// Extension used when nothing better can be guessed
const FALLBACK_EXTENSION: &str = ".bin";

/// Derives the local filename for a resource URL
///
/// The percent-decoded basename of the path is used when it has an
/// extension and names a regular file (`.` and `..` do not). Otherwise a `resource_<hash>` name is synthesized with an
/// extension guessed from the declared MIME type. The result is always
/// sanitized.
///
/// # Examples
///
/// ```
/// use site_mirror::resources::derive_filename;
/// use url::Url;
///
/// let url = Url::parse("https://example.com/img/my%20logo.png?v=3").unwrap();
/// assert_eq!(derive_filename(&url, None), "my_logo.png");
///
/// let url = Url::parse("https://example.com/api/image").unwrap();
/// let name = derive_filename(&url, None);
/// assert!(name.starts_with("resource_") && name.ends_with(".bin"));
/// ```
pub fn derive_filename(url: &Url, declared_type: Option<&str>) -> String {
    let decoded = decode_path(url.path());
    let basename = decoded.rsplit('/').next().unwrap_or_default();

    let name = if !is_usable_basename(basename) {
        format!(
            "resource_{}{}",
            stable_hash(url),
            extension_for_mime(declared_type)
        )
    } else {
        basename.to_string()
    };

    sanitize_filename(&name)
}

fn is_usable_basename(basename: &str) -> bool {
    basename.contains('.') && !basename.chars().all(|c| c == '.')
}

/// Short hex digest identifying a URL (first 16 hex chars of its SHA-256)
pub fn stable_hash(url: &Url) -> String {
    let digest = Sha256::digest(url.as_str().as_bytes());
    let mut hex = hex::encode(digest);
    hex.truncate(16);
    hex
}

/// Guesses a file extension (with leading dot) for a MIME type
pub fn extension_for_mime(mime: Option<&str>) -> String {
    mime.map(|m| m.split(';').next().unwrap_or(m).trim().to_ascii_lowercase())
        .filter(|m| !m.is_empty())
        .and_then(|m| mime_guess::get_mime_extensions_str(&m))
        .and_then(|extensions| extensions.first())
        .map(|ext| format!(".{}", ext))
        .unwrap_or_else(|| FALLBACK_EXTENSION.to_string())
}

/// Replaces every character outside `[A-Za-z0-9_.-]` with `_`
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
