//! Background resolution of project hashes to filesystem paths.
//!
//! The Gemini CLI names its per-project storage after the SHA-256 of the
//! project's absolute path, so recovering the path means walking the
//! filesystem, hashing candidate directories, and comparing against the set
//! of unresolved hashes. The walk is tiered: likely locations first, a full
//! root sweep last, stopping as soon as every target is found.

use geminictl_core::project_hash;
use std::collections::HashSet;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, SyncSender, sync_channel};
use std::thread;
use walkdir::WalkDir;

pub use std::sync::mpsc::TryRecvError;

/// A found project mapping. The hash was computed from the path at emission
/// time, so consumers may treat it as authoritative without re-hashing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub hash: String,
    pub path: PathBuf,
}

/// Subtree names that are never descended into. These are either hot spots
/// (package caches, VCS metadata) or would re-enter the assistant's own state
/// store mid-scan.
const IGNORE_DIRS: [&str; 9] = [
    "node_modules",
    ".git",
    ".npm",
    ".cache",
    ".gemini",
    ".vscode",
    ".idea",
    "go",
    "Library",
];

/// Ordered scan regions. Tiers are tried in order until all targets are
/// resolved or every tier is exhausted; a missing tier root is skipped.
#[derive(Debug, Clone)]
pub struct Tiers {
    roots: Vec<PathBuf>,
}

impl Tiers {
    /// The standard tier order: `~/Desktop`, the home subtree, common
    /// external roots, and (when `deep` is set) the full filesystem sweep.
    pub fn standard(deep: bool) -> geminictl_core::Result<Self> {
        let home = geminictl_core::home_dir()?;
        let mut roots = vec![home.join("Desktop"), home];
        roots.extend(
            ["/opt", "/var/www", "/usr/local/src", "/srv"]
                .iter()
                .map(PathBuf::from),
        );
        if deep {
            roots.push(PathBuf::from("/"));
        }
        Ok(Self { roots })
    }

    /// An explicit tier list, mainly for tests and testbeds.
    pub fn custom(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }
}

/// Consumer side of a running resolver.
///
/// Results arrive in walk order over a rendezvous-bounded channel; the
/// producer closes the channel when all targets are resolved or all tiers are
/// exhausted. Dropping the handle cancels the walk: the producer's next send
/// fails and the background thread winds down.
pub struct ResolverHandle {
    receiver: Receiver<Resolution>,
}

impl ResolverHandle {
    /// Non-blocking poll, for integration into an event loop.
    pub fn try_recv(&self) -> Result<Resolution, TryRecvError> {
        self.receiver.try_recv()
    }

    /// Blocking iterator over resolutions until the channel closes.
    pub fn iter(&self) -> impl Iterator<Item = Resolution> + '_ {
        self.receiver.iter()
    }
}

/// Start a background scan for the given target hashes.
///
/// An empty target set produces a handle whose channel closes immediately.
pub fn spawn(tiers: Tiers, targets: Vec<String>) -> ResolverHandle {
    let (sender, receiver) = sync_channel(1);

    thread::spawn(move || {
        run(&tiers, targets, &sender);
    });

    ResolverHandle { receiver }
}

fn run(tiers: &Tiers, targets: Vec<String>, sender: &SyncSender<Resolution>) {
    let mut targets: HashSet<String> = targets.into_iter().collect();
    if targets.is_empty() {
        return;
    }

    // Fully-processed directories, shared across tiers so overlapping roots
    // are not walked twice.
    let mut visited: HashSet<PathBuf> = HashSet::new();

    for root in tiers.roots() {
        if targets.is_empty() {
            return;
        }
        if !root.is_dir() {
            continue;
        }
        if scan_tier(root, &mut targets, &mut visited, sender).is_break() {
            return;
        }
    }
}

/// Walk one tier. Breaks when the whole scan must stop: either every target
/// has been resolved or the consumer has gone away.
fn scan_tier(
    root: &Path,
    targets: &mut HashSet<String>,
    visited: &mut HashSet<PathBuf>,
    sender: &SyncSender<Resolution>,
) -> ControlFlow<()> {
    let mut walker = WalkDir::new(root).follow_links(false).into_iter();

    loop {
        let entry = match walker.next() {
            None => return ControlFlow::Continue(()),
            // Stat/permission errors prune the affected subtree and the walk
            // goes on.
            Some(Err(_)) => continue,
            Some(Ok(entry)) => entry,
        };

        if !entry.file_type().is_dir() {
            continue;
        }

        let path = entry.path();
        if visited.contains(path) {
            walker.skip_current_dir();
            continue;
        }

        // Tier roots descend even when their name would normally be pruned;
        // the visited set alone guards against duplicates at depth 0.
        if entry.depth() > 0 {
            let name = entry.file_name().to_string_lossy();
            if IGNORE_DIRS.contains(&name.as_ref()) || name.starts_with('.') {
                walker.skip_current_dir();
                continue;
            }
        }

        if let Ok(hash) = project_hash(path)
            && targets.remove(&hash)
        {
            let resolution = Resolution {
                hash,
                path: path.to_path_buf(),
            };
            if sender.send(resolution).is_err() {
                return ControlFlow::Break(());
            }
            if targets.is_empty() {
                return ControlFlow::Break(());
            }
        }

        visited.insert(path.to_path_buf());
    }
}
