mod cache;
mod layout;
mod relocate;

pub use cache::Cache;
pub use layout::{
    MAX_SESSION_FILE_BYTES, ProjectData, SESSION_DIR, SESSION_PREFIX, SESSION_SUFFIX,
    delete_project, delete_session, list_project_ids, move_session, read_sessions, scan_projects,
    session_filename, write_session,
};
pub use relocate::move_project;

use std::fmt;
use std::path::PathBuf;

/// Result type for geminictl-storage operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the storage layer
#[derive(Debug)]
pub enum Error {
    /// IO operation failed
    Io(std::io::Error),

    /// Path hashing/absolutization failed
    Path(geminictl_core::Error),

    /// Corrupt transcript JSON
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Destination already occupied (no merge policy exists)
    Conflict(String),

    /// Supplied path does not hash to the expected project ID
    Mismatch { expected: String, actual: String },

    /// Target not present
    NotFound(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::Path(err) => write!(f, "Path error: {}", err),
            Error::Parse { path, source } => {
                write!(f, "Corrupt transcript {}: {}", path.display(), source)
            }
            Error::Conflict(msg) => write!(f, "Conflict: {}", msg),
            Error::Mismatch { expected, actual } => {
                write!(f, "Path hash mismatch: expected {}, got {}", expected, actual)
            }
            Error::NotFound(msg) => write!(f, "Not found: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Path(err) => Some(err),
            Error::Parse { source, .. } => Some(source),
            Error::Conflict(_) | Error::Mismatch { .. } | Error::NotFound(_) => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<geminictl_core::Error> for Error {
    fn from(err: geminictl_core::Error) -> Self {
        Error::Path(err)
    }
}
