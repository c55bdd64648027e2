use geminictl_storage::*;
use geminictl_types::Transcript;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn sample_transcript(session_id: &str, project_hash: &str, start_time: &str) -> Transcript {
    let raw = serde_json::json!({
        "sessionId": session_id,
        "projectHash": project_hash,
        "startTime": start_time,
        "lastUpdated": start_time,
        "messages": [
            {"id": "1", "timestamp": start_time, "type": "user", "content": "hello"},
            {"id": "2", "timestamp": start_time, "type": "gemini", "content": "hi", "model": "gemini-2.5-pro"}
        ]
    });
    serde_json::from_value(raw).unwrap()
}

fn hash_of(path: &Path) -> String {
    geminictl_core::project_hash(path).unwrap()
}

#[test]
fn list_project_ids_missing_root_is_empty() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("does-not-exist");
    assert!(list_project_ids(&root).unwrap().is_empty());
}

#[test]
fn list_project_ids_filters_by_name_length() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    let hash = "a".repeat(64);
    fs::create_dir(root.join(&hash)).unwrap();
    fs::create_dir(root.join("not-a-project")).unwrap();
    fs::write(root.join("b".repeat(64)), "a 64-char file, not a dir").unwrap();

    let ids = list_project_ids(root).unwrap();
    assert_eq!(ids, vec![hash]);
}

#[test]
fn write_then_read_round_trips() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let hash = "c".repeat(64);

    let transcript = sample_transcript("0123456789abcdef", &hash, "2026-02-02T12:55:00Z");
    let written = write_session(root, &hash, &transcript).unwrap();

    assert_eq!(
        written.file_name().unwrap().to_str().unwrap(),
        "session-2026-02-02T12-55-01234567.json"
    );

    let read = read_sessions(root, &hash).unwrap();
    assert_eq!(read.len(), 1);
    assert_eq!(read[0].session_id, "0123456789abcdef");
    assert_eq!(read[0].project_hash, hash);
    assert_eq!(read[0].start_time, "2026-02-02T12:55:00Z");
    assert_eq!(read[0].messages.len(), 2);
    assert_eq!(read[0].file_path, written);
    assert!(read[0].file_modified.is_some());
}

#[test]
fn short_session_ids_use_full_id_in_filename() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let hash = "c".repeat(64);

    let transcript = sample_transcript("abc", &hash, "2026-02-02T12:55:00Z");
    let written = write_session(root, &hash, &transcript).unwrap();
    assert_eq!(
        written.file_name().unwrap().to_str().unwrap(),
        "session-2026-02-02T12-55-abc.json"
    );
}

#[test]
fn read_sessions_skips_corrupt_and_oversize_files() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let hash = "d".repeat(64);
    let chats = root.join(&hash).join(SESSION_DIR);
    fs::create_dir_all(&chats).unwrap();

    let good = sample_transcript("good-session", &hash, "2026-01-01T08:00:00Z");
    write_session(root, &hash, &good).unwrap();

    fs::write(chats.join("session-corrupt.json"), "{not json").unwrap();
    fs::write(
        chats.join("session-huge.json"),
        vec![b' '; MAX_SESSION_FILE_BYTES as usize],
    )
    .unwrap();
    fs::write(chats.join("notes.txt"), "ignored").unwrap();

    let read = read_sessions(root, &hash).unwrap();
    assert_eq!(read.len(), 1);
    assert_eq!(read[0].session_id, "good-session");
}

#[test]
fn read_sessions_missing_chats_dir_is_empty() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let hash = "e".repeat(64);
    fs::create_dir(root.join(&hash)).unwrap();
    assert!(read_sessions(root, &hash).unwrap().is_empty());
}

#[test]
fn scan_projects_aggregates_split_sessions() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let hash = "f".repeat(64);

    // Same session across two files: counts sum, newest timestamp wins.
    let older = sample_transcript("shared-session", &hash, "2026-01-01T08:00:00Z");
    let mut newer = sample_transcript("shared-session", &hash, "2026-01-02T08:00:00Z");
    newer.last_updated = "2026-01-03T10:00:00Z".to_string();
    write_session(root, &hash, &older).unwrap();
    write_session(root, &hash, &newer).unwrap();

    let projects = scan_projects(root).unwrap();
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].id, hash);
    assert_eq!(projects[0].sessions.len(), 1);

    let summary = &projects[0].sessions[0];
    assert_eq!(summary.id, "shared-session");
    assert_eq!(summary.message_count, 4);
    assert_eq!(
        summary.last_update.to_rfc3339(),
        "2026-01-03T10:00:00+00:00"
    );
}

#[test]
fn delete_session_removes_all_files_for_that_id() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let hash = "1".repeat(64);

    write_session(
        root,
        &hash,
        &sample_transcript("target-session", &hash, "2026-01-01T08:00:00Z"),
    )
    .unwrap();
    write_session(
        root,
        &hash,
        &sample_transcript("target-session", &hash, "2026-01-02T08:00:00Z"),
    )
    .unwrap();
    write_session(
        root,
        &hash,
        &sample_transcript("other-session", &hash, "2026-01-03T08:00:00Z"),
    )
    .unwrap();

    delete_session(root, &hash, "target-session").unwrap();

    let remaining = read_sessions(root, &hash).unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].session_id, "other-session");

    assert!(matches!(
        delete_session(root, &hash, "target-session"),
        Err(Error::NotFound(_))
    ));
}

#[test]
fn delete_project_removes_directory() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let hash = "2".repeat(64);
    write_session(
        root,
        &hash,
        &sample_transcript("s", &hash, "2026-01-01T08:00:00Z"),
    )
    .unwrap();

    delete_project(root, &hash).unwrap();
    assert!(!root.join(&hash).exists());

    // Deleting again is not an error.
    delete_project(root, &hash).unwrap();
}

#[test]
fn move_session_rewrites_hash_and_removes_source() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let src = "3".repeat(64);
    let dst = "4".repeat(64);

    write_session(
        root,
        &src,
        &sample_transcript("moving-session", &src, "2026-01-01T08:00:00Z"),
    )
    .unwrap();
    write_session(
        root,
        &src,
        &sample_transcript("staying-session", &src, "2026-01-02T08:00:00Z"),
    )
    .unwrap();

    move_session(root, &src, &dst, "moving-session").unwrap();

    let src_sessions = read_sessions(root, &src).unwrap();
    assert_eq!(src_sessions.len(), 1);
    assert_eq!(src_sessions[0].session_id, "staying-session");

    let dst_sessions = read_sessions(root, &dst).unwrap();
    assert_eq!(dst_sessions.len(), 1);
    assert_eq!(dst_sessions[0].session_id, "moving-session");
    assert_eq!(dst_sessions[0].project_hash, dst);

    // Same source and destination is a no-op, even for unknown sessions.
    move_session(root, &src, &src, "no-such-session").unwrap();

    assert!(matches!(
        move_session(root, &src, &dst, "no-such-session"),
        Err(Error::NotFound(_))
    ));
}

#[test]
fn cache_load_missing_file_is_empty() {
    let temp = TempDir::new().unwrap();
    let mut cache = Cache::new(temp.path().join("cache.json"));
    cache.load().unwrap();
    assert!(cache.is_empty());
}

#[test]
fn cache_save_and_load_round_trip() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested").join("cache.json");

    let mut cache = Cache::new(path.clone());
    cache.set(&"a".repeat(64), "/work/proj");
    cache.set(&"b".repeat(64), "");
    cache.save().unwrap();

    let data = fs::read_to_string(&path).unwrap();
    assert!(data.contains("  \""), "expected two-space indent: {}", data);

    let mut reloaded = Cache::new(path);
    reloaded.load().unwrap();
    assert_eq!(reloaded.get(&"a".repeat(64)), Some("/work/proj"));
    assert_eq!(reloaded.get(&"b".repeat(64)), Some(""));
    assert_eq!(reloaded.get(&"c".repeat(64)), None);
}

#[test]
fn cache_set_evicts_duplicate_paths() {
    let temp = TempDir::new().unwrap();
    let mut cache = Cache::new(temp.path().join("cache.json"));

    cache.set(&"a".repeat(64), "/same/path");
    cache.set(&"b".repeat(64), "/same/path");

    assert_eq!(cache.get(&"a".repeat(64)), None);
    assert_eq!(cache.get(&"b".repeat(64)), Some("/same/path"));

    // The unlocated sentinel is not a location; many entries may carry it.
    cache.set(&"c".repeat(64), "");
    cache.set(&"d".repeat(64), "");
    assert_eq!(cache.get(&"c".repeat(64)), Some(""));
    assert_eq!(cache.get(&"d".repeat(64)), Some(""));
}

#[test]
fn cache_gc_drops_unknown_hashes() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("cache.json");

    let a = "a".repeat(64);
    let c = "c".repeat(64);

    let mut cache = Cache::new(path.clone());
    cache.set(&a, "/path/a");
    cache.set(&c, "/path/c");

    let live = vec![a.clone(), "b".repeat(64)];
    assert!(cache.retain_known(&live));
    cache.save().unwrap();

    let mut reloaded = Cache::new(path);
    reloaded.load().unwrap();
    assert_eq!(reloaded.len(), 1);
    assert_eq!(reloaded.get(&a), Some("/path/a"));
    assert_eq!(reloaded.get(&c), None);

    // Second pass with the same live set changes nothing.
    assert!(!reloaded.retain_known(&live));
}

#[test]
fn cache_verify_and_set_rejects_mismatched_paths() {
    let temp = TempDir::new().unwrap();
    let workdir = temp.path().join("proj");
    fs::create_dir(&workdir).unwrap();

    let mut cache = Cache::new(temp.path().join("cache.json"));
    let hash = hash_of(&workdir);

    assert!(matches!(
        cache.verify_and_set(&"0".repeat(64), &workdir),
        Err(Error::Mismatch { .. })
    ));
    assert!(cache.is_empty());

    cache.verify_and_set(&hash, &workdir).unwrap();
    assert_eq!(cache.get(&hash), Some(&*workdir.to_string_lossy()));
}

#[test]
fn move_project_rehashes_directory_and_transcripts() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("gemini");
    let old_workdir = temp.path().join("old-workdir");
    let new_workdir = temp.path().join("new-workdir");
    fs::create_dir_all(&new_workdir).unwrap();

    let old_hash = hash_of(&old_workdir);
    let new_hash = hash_of(&new_workdir);

    // One session split over two files.
    let first = sample_transcript("split-session", &old_hash, "2026-01-01T08:00:00Z");
    let second = sample_transcript("split-session", &old_hash, "2026-01-02T09:30:00Z");
    write_session(&root, &old_hash, &first).unwrap();
    write_session(&root, &old_hash, &second).unwrap();

    let returned = move_project(&root, &old_hash, &new_workdir).unwrap();
    assert_eq!(returned, new_hash);

    assert!(!root.join(&old_hash).exists());
    assert!(root.join(&new_hash).exists());

    let transcripts = read_sessions(&root, &new_hash).unwrap();
    assert_eq!(transcripts.len(), 2);
    for transcript in &transcripts {
        assert_eq!(transcript.project_hash, new_hash);
        assert_eq!(transcript.session_id, "split-session");
    }

    let projects = scan_projects(&root).unwrap();
    assert_eq!(projects[0].sessions[0].message_count, 4);
}

#[test]
fn move_project_to_same_path_is_noop() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("gemini");
    let workdir = temp.path().join("workdir");
    fs::create_dir_all(&workdir).unwrap();

    let hash = hash_of(&workdir);
    write_session(
        &root,
        &hash,
        &sample_transcript("s", &hash, "2026-01-01T08:00:00Z"),
    )
    .unwrap();

    assert_eq!(move_project(&root, &hash, &workdir).unwrap(), hash);
    assert_eq!(read_sessions(&root, &hash).unwrap().len(), 1);
}

#[test]
fn move_project_conflict_leaves_storage_untouched() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("gemini");
    let old_workdir = temp.path().join("old-workdir");
    let occupied_workdir = temp.path().join("occupied");
    fs::create_dir_all(&occupied_workdir).unwrap();

    let old_hash = hash_of(&old_workdir);
    let occupied_hash = hash_of(&occupied_workdir);

    let original = sample_transcript("kept-session", &old_hash, "2026-01-01T08:00:00Z");
    write_session(&root, &old_hash, &original).unwrap();
    write_session(
        &root,
        &occupied_hash,
        &sample_transcript("other", &occupied_hash, "2026-01-02T08:00:00Z"),
    )
    .unwrap();

    assert!(matches!(
        move_project(&root, &old_hash, &occupied_workdir),
        Err(Error::Conflict(_))
    ));

    // Nothing renamed, nothing rewritten.
    let kept = read_sessions(&root, &old_hash).unwrap();
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].project_hash, old_hash);
}

#[test]
fn move_project_missing_source_is_not_found() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("gemini");
    fs::create_dir_all(&root).unwrap();
    let new_workdir = temp.path().join("somewhere");
    fs::create_dir_all(&new_workdir).unwrap();

    assert!(matches!(
        move_project(&root, &"9".repeat(64), &new_workdir),
        Err(Error::NotFound(_))
    ));
}

#[test]
fn move_project_unlinks_stale_filenames() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("gemini");
    let old_workdir = temp.path().join("old-workdir");
    let new_workdir = temp.path().join("new-workdir");
    fs::create_dir_all(&new_workdir).unwrap();

    let old_hash = hash_of(&old_workdir);
    let new_hash = hash_of(&new_workdir);

    // A file whose basename does not carry the session short-id (written by
    // an older tool); the rewrite produces a fresh name and the stale file
    // must disappear.
    let chats = root.join(&old_hash).join(SESSION_DIR);
    fs::create_dir_all(&chats).unwrap();
    let transcript = sample_transcript("renamed-session", &old_hash, "2026-01-01T08:00:00Z");
    let stale = chats.join("session-2026-01-01T08-00-legacy00.json");
    fs::write(&stale, serde_json::to_string_pretty(&transcript).unwrap()).unwrap();

    move_project(&root, &old_hash, &new_workdir).unwrap();

    let files: Vec<String> = fs::read_dir(root.join(&new_hash).join(SESSION_DIR))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(files, vec!["session-2026-01-01T08-00-renamed-.json"]);
}
