use crate::{Error, Result, layout};
use geminictl_types::short_session_id;
use std::fs;
use std::path::Path;

/// Relocate a project to a new working-directory path.
///
/// The directory name under the storage root IS the path hash, so a move
/// re-hashes, renames `<root>/<h_old>` to `<root>/<h_new>`, and rewrites the
/// projectHash field inside every transcript. Returns the new hash.
///
/// A failure after the rename leaves the directory renamed with transcripts
/// possibly inconsistent; callers reload and surface the error rather than
/// attempting a rollback.
pub fn move_project(root: &Path, old_hash: &str, new_path: &Path) -> Result<String> {
    let new_hash = geminictl_core::project_hash(new_path)?;
    if new_hash == old_hash {
        return Ok(new_hash);
    }

    let src_dir = root.join(old_hash);
    let dst_dir = root.join(&new_hash);

    if !src_dir.exists() {
        return Err(Error::NotFound(format!("project {}", old_hash)));
    }
    if dst_dir.exists() {
        return Err(Error::Conflict(format!(
            "destination project already exists: {}",
            new_hash
        )));
    }

    fs::rename(&src_dir, &dst_dir)?;

    for mut transcript in layout::read_sessions(root, &new_hash)? {
        let old_file = transcript.file_path.clone();
        transcript.project_hash = new_hash.clone();
        layout::write_session(root, &new_hash, &transcript)?;

        // The writer names files by session short-id. When the pre-move
        // basename lacks that token the write landed on a different name and
        // the stale file must go.
        let old_base = old_file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if !old_base.contains(short_session_id(&transcript.session_id)) {
            fs::remove_file(&old_file)?;
        }
    }

    Ok(new_hash)
}
