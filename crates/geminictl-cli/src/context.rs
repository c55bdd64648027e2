use anyhow::{Context, Result};
use geminictl_core::{cache_path, expand_tilde, storage_root};
use std::path::{Path, PathBuf};

/// Resolved filesystem locations for a run.
///
/// Paths are resolved once at construction and carried explicitly; nothing
/// downstream consults the environment again.
pub struct ExecutionContext {
    storage_root: PathBuf,
    cache_path: PathBuf,
}

impl ExecutionContext {
    pub fn new(testbed: Option<&str>) -> Result<Self> {
        let testbed = testbed.map(expand_tilde);
        let base = testbed.as_deref();

        Ok(Self {
            storage_root: storage_root(base).context("Failed to resolve storage root")?,
            cache_path: cache_path(base).context("Failed to resolve cache path")?,
        })
    }

    pub fn storage_root(&self) -> &Path {
        &self.storage_root
    }

    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }
}
