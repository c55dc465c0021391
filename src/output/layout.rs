//! On-disk layout of a mirror
//!
//! ```text
//! <root>/
//!   index.html
//!   pages/<name>.html
//!   assets/{images,videos,audio,css,js,fonts}/
//!   netlify.toml
//! ```

use crate::resources::{ResourceCategory, ASSETS_DIR};
use crate::state::{PageRecord, PAGES_DIR};
use crate::url::strip_www;
use crate::MirrorError;
use std::path::{Path, PathBuf};
use url::Url;

#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Default output directory for a seed: `scraped_<domain>_<unix seconds>`
    ///
    /// The domain drops any `www.` prefix and has its dots replaced by underscores.
    pub fn default_root_for(seed: &Url, unix_seconds: i64) -> PathBuf {
        let domain = strip_www(seed.host_str().unwrap_or("site")).replace('.', "_");
        PathBuf::from(format!("scraped_{}_{}", domain, unix_seconds))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the root, `pages/` and every asset directory
    pub fn create(&self) -> Result<(), MirrorError> {
        let mut dirs = vec![self.root.clone(), self.root.join(PAGES_DIR)];
        dirs.extend(ResourceCategory::ALL.iter().map(|c| self.category_dir(*c)));

        for dir in dirs {
            std::fs::create_dir_all(&dir).map_err(|source| MirrorError::OutputSetup {
                path: dir.display().to_string(),
                source,
            })?;
        }
        Ok(())
    }

    /// Absolute directory holding one resource category
    pub fn category_dir(&self, category: ResourceCategory) -> PathBuf {
        self.root.join(ASSETS_DIR).join(category.dir_name())
    }

    /// Resolves a root-relative path such as `assets/css/site.css`
    pub fn resolve(&self, relative: &str) -> PathBuf {
        relative
            .split('/')
            .filter(|part| !part.is_empty())
            .fold(self.root.clone(), |path, part| path.join(part))
    }

    /// Writes a rewritten page document to its storage path
    pub async fn write_page(&self, record: &PageRecord, contents: &str) -> std::io::Result<PathBuf> {
        let path = self.resolve(&record.storage_relative_path);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, contents).await?;
        Ok(path)
    }
}
