//! Run-scoped mapping from resource references to local paths

use crate::resources::ResourceCategory;
use std::collections::HashMap;
use url::Url;

/// A resource that was downloaded (or found already on disk) during the run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRecord {
    pub absolute_url: Url,
    /// Reference string exactly as it appeared in the referencing document
    pub original_reference: String,
    /// Path relative to the output root, e.g. `assets/css/site.css`
    pub local_relative_path: String,
    pub category: ResourceCategory,
}

/// Maps absolute URLs and original reference strings to local paths
///
/// Entries are append-only: once a key is mapped it is never overwritten.
#[derive(Debug, Default)]
pub struct ResourceMap {
    paths: HashMap<String, String>,
    records: Vec<ResourceRecord>,
}

impl ResourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the absolute URL already has a local path
    pub fn contains_url(&self, url: &Url) -> bool {
        self.paths.contains_key(url.as_str())
    }

    /// Looks up the local path for an absolute URL or original reference
    pub fn path_for(&self, key: &str) -> Option<&str> {
        self.paths.get(key).map(String::as_str)
    }

    /// Records a resource under both its absolute URL and its original reference
    ///
    /// Returns false (and changes nothing) if the absolute URL is already mapped.
    /// The original reference is only added if no earlier entry claimed it.
    pub fn record(&mut self, record: ResourceRecord) -> bool {
        if self.contains_url(&record.absolute_url) {
            return false;
        }

        self.paths.insert(
            record.absolute_url.to_string(),
            record.local_relative_path.clone(),
        );
        self.paths
            .entry(record.original_reference.clone())
            .or_insert_with(|| record.local_relative_path.clone());
        self.records.push(record);
        true
    }

    /// Maps another reference string to the path of an already-mapped URL
    ///
    /// Returns true if a new key was added.
    pub fn add_alias(&mut self, reference: &str, url: &Url) -> bool {
        if self.paths.contains_key(reference) {
            return false;
        }
        match self.paths.get(url.as_str()).cloned() {
            Some(path) => {
                self.paths.insert(reference.to_string(), path);
                true
            }
            None => false,
        }
    }

    /// All `(key, local path)` pairs, longest key first
    ///
    /// Ties are broken lexicographically so rewriting is deterministic.
    pub fn keys_longest_first(&self) -> Vec<(&str, &str)> {
        let mut entries: Vec<(&str, &str)> = self
            .paths
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        entries.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(b.0)));
        entries
    }

    /// Local path holding the content fetched from `url` itself
    ///
    /// None when the URL is unmapped or was mapped onto a file first recorded
    /// for another URL that derived the same name.
    pub fn own_path(&self, url: &Url) -> Option<&str> {
        let path = self.path_for(url.as_str())?;
        let owner = self
            .records()
            .iter()
            .find(|record| record.local_relative_path == path)?;
        (owner.absolute_url == *url).then_some(path)
    }

    /// Records in the order they were added
    pub fn records(&self) -> &[ResourceRecord] {
        &self.records
    }

    /// Number of distinct resources
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of lookup keys (absolute URLs plus reference aliases)
    pub fn key_count(&self) -> usize {
        self.paths.len()
    }
}
