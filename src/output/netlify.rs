//! Static-hosting configuration written next to the mirror

use std::path::{Path, PathBuf};

pub const NETLIFY_FILE: &str = "netlify.toml";

/// Publishes the mirror root and serves `index.html` for unknown paths
pub const NETLIFY_TEMPLATE: &str = r#"[build]
  publish = "."

[[redirects]]
  from = "/*"
  to = "/index.html"
  status = 200
"#;

/// Writes `netlify.toml` into the output root
pub async fn write_netlify_config(root: &Path) -> std::io::Result<PathBuf> {
    let path = root.join(NETLIFY_FILE);
    tokio::fs::write(&path, NETLIFY_TEMPLATE).await?;
    Ok(path)
}
