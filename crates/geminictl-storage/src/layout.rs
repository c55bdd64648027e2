use crate::{Error, Result};
use geminictl_types::{SessionSummary, Transcript, short_session_id};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Subdirectory of a project that holds its transcript files.
pub const SESSION_DIR: &str = "chats";
pub const SESSION_PREFIX: &str = "session-";
pub const SESSION_SUFFIX: &str = ".json";

/// Transcript files at or above this size are treated as corrupt.
pub const MAX_SESSION_FILE_BYTES: u64 = 10 * 1024 * 1024;

/// A project hash together with its aggregated sessions.
#[derive(Debug, Clone)]
pub struct ProjectData {
    pub id: String,
    pub sessions: Vec<SessionSummary>,
}

/// Discover all project hash directories in the storage root.
///
/// Direct children whose name is exactly 64 characters long count as
/// projects; everything else is ignored. A missing root yields an empty list.
pub fn list_project_ids(root: &Path) -> Result<Vec<String>> {
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err.into()),
    };

    let mut ids = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if name.len() == 64 {
            ids.push(name.to_string());
        }
    }
    ids.sort();
    Ok(ids)
}

/// Parse all transcript files for a specific project.
///
/// Oversize and unparseable files are skipped, not fatal. A missing chats
/// directory yields an empty list.
pub fn read_sessions(root: &Path, project_id: &str) -> Result<Vec<Transcript>> {
    let session_dir = root.join(project_id).join(SESSION_DIR);
    let entries = match fs::read_dir(&session_dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err.into()),
    };

    let mut transcripts = Vec::new();
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if entry.file_type()?.is_dir()
            || !name.starts_with(SESSION_PREFIX)
            || !name.ends_with(SESSION_SUFFIX)
        {
            continue;
        }

        if let Ok(transcript) = parse_session_file(&entry.path()) {
            transcripts.push(transcript);
        }
    }
    Ok(transcripts)
}

fn parse_session_file(path: &Path) -> Result<Transcript> {
    let metadata = fs::metadata(path)?;
    if metadata.len() >= MAX_SESSION_FILE_BYTES {
        return Err(Error::Io(std::io::Error::new(
            ErrorKind::InvalidData,
            format!("session file too large: {}", path.display()),
        )));
    }

    let data = fs::read_to_string(path)?;
    let mut transcript: Transcript =
        serde_json::from_str(&data).map_err(|source| Error::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    transcript.file_path = path.to_path_buf();
    transcript.file_modified = metadata.modified().ok();
    Ok(transcript)
}

/// Filename for a transcript: `session-YYYY-MM-DDTHH-MM-<shortId>.json`,
/// derived from the transcript's startTime and session ID.
pub fn session_filename(transcript: &Transcript) -> String {
    let ts: String = transcript
        .start_time
        .chars()
        .take(16)
        .map(|c| if c == ':' { '-' } else { c })
        .collect();
    format!(
        "{}{}-{}{}",
        SESSION_PREFIX,
        ts,
        short_session_id(&transcript.session_id),
        SESSION_SUFFIX
    )
}

/// Serialize a transcript into the project's chats directory.
///
/// Returns the path that was written.
pub fn write_session(root: &Path, project_id: &str, transcript: &Transcript) -> Result<PathBuf> {
    let session_dir = root.join(project_id).join(SESSION_DIR);
    fs::create_dir_all(&session_dir)?;

    let data = serde_json::to_string_pretty(transcript).map_err(|source| Error::Parse {
        path: session_dir.join(session_filename(transcript)),
        source,
    })?;

    let path = session_dir.join(session_filename(transcript));
    fs::write(&path, data)?;
    Ok(path)
}

/// Recursively remove a project directory.
pub fn delete_project(root: &Path, project_id: &str) -> Result<()> {
    match fs::remove_dir_all(root.join(project_id)) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}

/// Remove every transcript file belonging to a session.
pub fn delete_session(root: &Path, project_id: &str, session_id: &str) -> Result<()> {
    let mut removed = false;
    for transcript in read_sessions(root, project_id)? {
        if transcript.session_id == session_id {
            fs::remove_file(&transcript.file_path)?;
            removed = true;
        }
    }
    if !removed {
        return Err(Error::NotFound(format!(
            "session {} in project {}",
            session_id, project_id
        )));
    }
    Ok(())
}

/// Migrate a session's transcript files from one project to another,
/// restoring the invariant that each file's projectHash matches the
/// directory it lives under. No-op when source and destination coincide.
pub fn move_session(
    root: &Path,
    src_project: &str,
    dst_project: &str,
    session_id: &str,
) -> Result<()> {
    if src_project == dst_project {
        return Ok(());
    }

    let mut moved = false;
    for mut transcript in read_sessions(root, src_project)? {
        if transcript.session_id != session_id {
            continue;
        }
        let source_path = transcript.file_path.clone();
        transcript.project_hash = dst_project.to_string();
        write_session(root, dst_project, &transcript)?;
        fs::remove_file(&source_path)?;
        moved = true;
    }

    if !moved {
        return Err(Error::NotFound(format!(
            "session {} in project {}",
            session_id, src_project
        )));
    }
    Ok(())
}

/// Enumerate all projects and aggregate their sessions for display.
///
/// A session split over several files is folded into one summary: message
/// counts sum, the newest timestamp wins. Sessions sort newest-first.
pub fn scan_projects(root: &Path) -> Result<Vec<ProjectData>> {
    let mut projects = Vec::new();
    for id in list_project_ids(root)? {
        let Ok(transcripts) = read_sessions(root, &id) else {
            continue;
        };

        let mut by_session: HashMap<String, SessionSummary> = HashMap::new();
        for transcript in &transcripts {
            let last_update = transcript.last_update();
            by_session
                .entry(transcript.session_id.clone())
                .and_modify(|summary| {
                    summary.message_count += transcript.messages.len();
                    if last_update > summary.last_update {
                        summary.last_update = last_update;
                    }
                })
                .or_insert_with(|| SessionSummary {
                    id: transcript.session_id.clone(),
                    message_count: transcript.messages.len(),
                    last_update,
                });
        }

        let mut sessions: Vec<SessionSummary> = by_session.into_values().collect();
        sessions.sort_by(|a, b| b.last_update.cmp(&a.last_update));

        projects.push(ProjectData { id, sessions });
    }
    Ok(projects)
}
