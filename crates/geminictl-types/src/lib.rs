mod transcript;
mod util;

use chrono::{DateTime, Utc};

pub use transcript::{Message, Thought, TokenStats, Transcript};
pub use util::*;

/// Derived display state of a project. Never persisted; recomputed from the
/// identity cache and the filesystem on every refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectStatus {
    /// No cache entry yet; the resolver may still find a path.
    Scanning,
    /// Cached path exists on disk.
    Valid,
    /// Cached path recorded but currently absent.
    Orphaned,
    /// Resolver exhausted all tiers without a match.
    Unlocated,
}

/// One session as shown in the inventory, aggregated across all of its
/// transcript files (a session may be split over several files).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub id: String,
    pub message_count: usize,
    pub last_update: DateTime<Utc>,
}
