use crate::{Error, Result};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Persistent mapping of project hash to last-known absolute path.
///
/// An empty-string value is the "known-unlocated" sentinel: the resolver
/// searched every tier without a match, and further runs should not rescan.
/// A missing key means the hash has not been resolved yet.
pub struct Cache {
    entries: BTreeMap<String, String>,
    config_path: PathBuf,
}

impl Cache {
    pub fn new(config_path: PathBuf) -> Self {
        Self {
            entries: BTreeMap::new(),
            config_path,
        }
    }

    /// Read the cache from disk. A missing file is an empty cache.
    pub fn load(&mut self) -> Result<()> {
        let data = match fs::read_to_string(&self.config_path) {
            Ok(data) => data,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                self.entries = BTreeMap::new();
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };

        self.entries = serde_json::from_str(&data).map_err(|source| Error::Parse {
            path: self.config_path.clone(),
            source,
        })?;
        Ok(())
    }

    /// Rewrite the cache file whole, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        if let Some(dir) = self.config_path.parent() {
            fs::create_dir_all(dir)?;
        }
        let data = serde_json::to_string_pretty(&self.entries).map_err(|source| Error::Parse {
            path: self.config_path.clone(),
            source,
        })?;
        fs::write(&self.config_path, data)?;
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.entries.get(id).map(String::as_str)
    }

    /// Insert or replace an entry. Any other entry holding the same non-empty
    /// path is evicted: a location identifies exactly one project.
    pub fn set(&mut self, id: &str, path: &str) {
        if !path.is_empty() {
            self.entries
                .retain(|key, value| key.as_str() == id || value.as_str() != path);
        }
        self.entries.insert(id.to_string(), path.to_string());
    }

    pub fn delete(&mut self, id: &str) -> bool {
        self.entries.remove(id).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Trusted write path for user-supplied locations: accept only when the
    /// path actually hashes to the project ID.
    pub fn verify_and_set(&mut self, id: &str, path: &Path) -> Result<()> {
        let actual = geminictl_core::project_hash(path)?;
        if actual != id {
            return Err(Error::Mismatch {
                expected: id.to_string(),
                actual,
            });
        }
        self.set(id, &path.to_string_lossy());
        self.save()
    }

    /// Garbage-collect entries whose hash is no longer enumerable on disk.
    /// Returns true when anything was dropped.
    pub fn retain_known(&mut self, live_ids: &[String]) -> bool {
        let before = self.entries.len();
        self.entries.retain(|id, _| live_ids.iter().any(|l| l == id));
        self.entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
