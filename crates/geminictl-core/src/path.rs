use crate::{Error, Result};
use sha2::{Digest, Sha256};
use std::path::{Component, Path, PathBuf};

/// Produce the absolute form of a path without touching the filesystem.
///
/// Relative paths are resolved against the current working directory and
/// `.`/`..` components are collapsed lexically. Symlinks are deliberately NOT
/// resolved: the external assistant hashes the path as the user sees it, and
/// canonicalizing here would break identity matching against its storage.
pub fn absolutize(path: &Path) -> Result<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::Prefix(p) => out.push(p.as_os_str()),
            Component::RootDir => out.push(Component::RootDir.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                // ".." above the root is dropped, same as the OS cleaner
                out.pop();
            }
            Component::Normal(name) => out.push(name),
        }
    }
    Ok(out)
}

/// Calculate a project identity hash from a directory path.
///
/// The hash is the SHA-256 of the absolutized path's UTF-8 bytes, rendered as
/// lowercase hex. This matches how the Gemini CLI names its per-project
/// storage directories.
pub fn project_hash(path: &Path) -> Result<String> {
    let abs = absolutize(path)?;
    let mut hasher = Sha256::new();
    hasher.update(abs.to_string_lossy().as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

/// Expand tilde (~) in paths to the user's home directory
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(stripped);
    }
    PathBuf::from(path)
}

/// The user's home directory, or a Config error when it cannot be determined.
pub fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or_else(|| Error::Config("Could not determine home directory".to_string()))
}

/// Storage root holding `<hash>/chats/` trees.
///
/// Defaults to `~/.gemini/tmp`; a testbed base directory redirects it to
/// `<base>/gemini` for isolated development data.
pub fn storage_root(testbed: Option<&Path>) -> Result<PathBuf> {
    match testbed {
        Some(base) => Ok(base.join("gemini")),
        None => Ok(home_dir()?.join(".gemini").join("tmp")),
    }
}

/// Identity cache file path.
///
/// Defaults to `~/.config/geminictl/cache.json`; a testbed base directory
/// redirects it to `<base>/cache.json`.
pub fn cache_path(testbed: Option<&Path>) -> Result<PathBuf> {
    match testbed {
        Some(base) => Ok(base.join("cache.json")),
        None => Ok(home_dir()?
            .join(".config")
            .join("geminictl")
            .join("cache.json")),
    }
}
