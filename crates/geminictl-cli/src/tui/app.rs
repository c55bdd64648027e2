use crate::tui::modal::{ListOption, Modal, ModalResult};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use geminictl_resolver::{ResolverHandle, Tiers, TryRecvError};
use geminictl_storage::{Cache, ProjectData};
use geminictl_types::{ProjectStatus, SessionSummary, is_project_hash, short_session_id, truncate};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Projects,
    Sessions,
}

/// One project as shown in the sidebar.
pub struct ProjectView {
    pub hash: String,
    pub path: Option<String>,
    pub status: ProjectStatus,
    pub sessions: Vec<SessionSummary>,
}

impl ProjectView {
    /// Sort and display key: the cached path when one is known, otherwise
    /// the hash string itself.
    pub fn display_path(&self) -> &str {
        match &self.path {
            Some(path) if !path.is_empty() => path,
            _ => &self.hash,
        }
    }
}

/// What the currently-open modal will decide when it returns.
enum PendingAction {
    DeleteProject { hash: String },
    DeleteSession { hash: String, session_id: String },
    MoveProject { hash: String },
    MoveSession { src_hash: String, session_id: String },
    OpenSession { path: PathBuf, session_id: String },
    Dismiss,
}

/// Side effects the event-loop runner must perform on the controller's
/// behalf (they need the terminal, which the controller never touches).
#[derive(Debug, PartialEq, Eq)]
pub enum AppCommand {
    Quit,
    OpenSession { path: PathBuf, session_id: String },
}

pub struct App {
    storage_root: PathBuf,
    cache: Cache,
    pub projects: Vec<ProjectView>,
    pub project_cursor: usize,
    pub session_cursor: usize,
    pub focus: Focus,
    pub modal: Option<Modal>,
    pending: Option<PendingAction>,
    resolver: Option<ResolverHandle>,
}

impl App {
    pub fn new(storage_root: PathBuf, cache: Cache) -> geminictl_storage::Result<Self> {
        let mut app = Self {
            storage_root,
            cache,
            projects: Vec::new(),
            project_cursor: 0,
            session_cursor: 0,
            focus: Focus::Projects,
            modal: None,
            pending: None,
            resolver: None,
        };
        let scanned = geminictl_storage::scan_projects(&app.storage_root)?;
        app.projects = app.build_views(scanned);
        app.sort_preserving_selection();
        Ok(app)
    }

    pub fn storage_root(&self) -> &Path {
        &self.storage_root
    }

    /// Launch the background resolver for every project still Scanning.
    pub fn start_resolver(&mut self, tiers: Tiers) {
        let targets: Vec<String> = self
            .projects
            .iter()
            .filter(|p| p.status == ProjectStatus::Scanning && is_project_hash(&p.hash))
            .map(|p| p.hash.clone())
            .collect();
        if targets.is_empty() {
            return;
        }
        self.resolver = Some(geminictl_resolver::spawn(tiers, targets));
    }

    /// Drain pending resolver messages; on channel close, record the
    /// unlocated sentinel for everything the scan failed to find.
    pub fn poll_resolver(&mut self) {
        loop {
            let message = match &self.resolver {
                None => return,
                Some(handle) => handle.try_recv(),
            };
            match message {
                Ok(resolution) => {
                    self.apply_resolution(&resolution.hash, &resolution.path.to_string_lossy());
                }
                Err(TryRecvError::Empty) => return,
                Err(TryRecvError::Disconnected) => {
                    self.resolver = None;
                    self.finish_resolution();
                    return;
                }
            }
        }
    }

    /// Integrate one resolver result: persist the mapping and re-sort while
    /// keeping the cursor on the same project.
    pub fn apply_resolution(&mut self, hash: &str, path: &str) {
        self.cache.set(hash, path);
        let _ = self.cache.save();

        if let Some(project) = self.projects.iter_mut().find(|p| p.hash == hash) {
            project.path = Some(path.to_string());
            project.status = ProjectStatus::Valid;
        }
        self.sort_preserving_selection();
    }

    /// The resolver exhausted every tier: whatever is still Scanning is now
    /// known-unlocated, remembered so later runs do not rescan.
    pub fn finish_resolution(&mut self) {
        let mut changed = false;
        for project in &mut self.projects {
            if project.status == ProjectStatus::Scanning {
                project.status = ProjectStatus::Unlocated;
                self.cache.set(&project.hash, "");
                changed = true;
            }
        }
        if changed {
            let _ = self.cache.save();
        }
    }

    pub fn resolving(&self) -> bool {
        self.resolver.is_some()
    }

    /// Re-read storage and rebuild the view, restoring selection by identity.
    pub fn refresh(&mut self) {
        let selected = self.selection_identity();
        match geminictl_storage::scan_projects(&self.storage_root) {
            Ok(scanned) => {
                self.projects = self.build_views(scanned);
                self.sort_projects();
                self.restore_selection(selected);
            }
            Err(err) => self.show_error(format!("Refresh failed: {}", err)),
        }
    }

    fn build_views(&self, scanned: Vec<ProjectData>) -> Vec<ProjectView> {
        scanned
            .into_iter()
            .map(|project| {
                let (path, status) = match self.cache.get(&project.id) {
                    None => (None, ProjectStatus::Scanning),
                    Some("") => (None, ProjectStatus::Unlocated),
                    Some(p) if Path::new(p).exists() => {
                        (Some(p.to_string()), ProjectStatus::Valid)
                    }
                    Some(p) => (Some(p.to_string()), ProjectStatus::Orphaned),
                };
                ProjectView {
                    hash: project.id,
                    path,
                    status,
                    sessions: project.sessions,
                }
            })
            .collect()
    }

    fn sort_projects(&mut self) {
        self.projects
            .sort_by(|a, b| a.display_path().cmp(b.display_path()));
    }

    /// Identity of whatever the cursors rest on, captured before any
    /// mutation or reorder so it can be re-located afterwards.
    fn selection_identity(&self) -> (Option<String>, Option<String>) {
        let project = self.selected_project().map(|p| p.hash.clone());
        let session = self.selected_session().map(|s| s.id.clone());
        (project, session)
    }

    fn restore_selection(&mut self, (project, session): (Option<String>, Option<String>)) {
        if let Some(hash) = project
            && let Some(index) = self.projects.iter().position(|p| p.hash == hash)
        {
            self.project_cursor = index;
        }
        self.clamp_project_cursor();

        if let Some(id) = session
            && let Some(index) = self
                .selected_project()
                .and_then(|p| p.sessions.iter().position(|s| s.id == id))
        {
            self.session_cursor = index;
        }
        self.clamp_session_cursor();
    }

    fn sort_preserving_selection(&mut self) {
        let selected = self.selection_identity();
        self.sort_projects();
        self.restore_selection(selected);
    }

    fn clamp_project_cursor(&mut self) {
        if self.project_cursor >= self.projects.len() {
            self.project_cursor = self.projects.len().saturating_sub(1);
        }
    }

    fn clamp_session_cursor(&mut self) {
        let len = self.selected_project().map_or(0, |p| p.sessions.len());
        if self.session_cursor >= len {
            self.session_cursor = len.saturating_sub(1);
        }
        if len == 0 && self.focus == Focus::Sessions {
            self.focus = Focus::Projects;
        }
    }

    pub fn selected_project(&self) -> Option<&ProjectView> {
        self.projects.get(self.project_cursor)
    }

    pub fn selected_session(&self) -> Option<&SessionSummary> {
        self.selected_project()
            .and_then(|p| p.sessions.get(self.session_cursor))
    }

    /// Serialize one key press through the controller. Returns a command
    /// when the runner has work to do outside the draw loop.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<AppCommand> {
        if let Some(modal) = &mut self.modal {
            if let Some(result) = modal.update(key) {
                self.modal = None;
                let pending = self.pending.take();
                return self.dispatch(pending, result);
            }
            return None;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(AppCommand::Quit);
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Some(AppCommand::Quit),
            KeyCode::Up | KeyCode::Char('k') => {
                self.move_cursor(-1);
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.move_cursor(1);
                None
            }
            KeyCode::Tab => {
                self.toggle_focus();
                None
            }
            KeyCode::Left => {
                self.focus = Focus::Projects;
                None
            }
            KeyCode::Right => {
                self.focus_sessions();
                None
            }
            KeyCode::Enter => {
                match self.focus {
                    Focus::Projects => self.focus_sessions(),
                    Focus::Sessions => self.begin_inspect(),
                }
                None
            }
            KeyCode::Char('i') => {
                if self.focus == Focus::Sessions {
                    self.begin_inspect();
                }
                None
            }
            KeyCode::Char('o') => {
                self.begin_open();
                None
            }
            KeyCode::Char('d') => {
                self.begin_delete();
                None
            }
            KeyCode::Char('m') => {
                self.begin_move();
                None
            }
            _ => None,
        }
    }

    fn move_cursor(&mut self, delta: isize) {
        match self.focus {
            Focus::Projects => {
                let len = self.projects.len();
                if len == 0 {
                    return;
                }
                let next = self.project_cursor.saturating_add_signed(delta);
                let next = next.min(len - 1);
                if next != self.project_cursor {
                    self.project_cursor = next;
                    self.session_cursor = 0;
                }
            }
            Focus::Sessions => {
                let len = self.selected_project().map_or(0, |p| p.sessions.len());
                if len == 0 {
                    return;
                }
                self.session_cursor = self
                    .session_cursor
                    .saturating_add_signed(delta)
                    .min(len - 1);
            }
        }
    }

    fn toggle_focus(&mut self) {
        match self.focus {
            Focus::Projects => self.focus_sessions(),
            Focus::Sessions => self.focus = Focus::Projects,
        }
    }

    fn focus_sessions(&mut self) {
        if self
            .selected_project()
            .is_some_and(|p| !p.sessions.is_empty())
        {
            self.focus = Focus::Sessions;
        }
    }

    fn begin_delete(&mut self) {
        match self.focus {
            Focus::Projects => {
                let Some(project) = self.selected_project() else {
                    return;
                };
                let prompt = format!(
                    "Delete project {} and its {} session(s)?",
                    truncate(project.display_path(), 48),
                    project.sessions.len()
                );
                self.pending = Some(PendingAction::DeleteProject {
                    hash: project.hash.clone(),
                });
                self.modal = Some(Modal::confirm("Delete project", prompt));
            }
            Focus::Sessions => {
                let (Some(project), Some(session)) =
                    (self.selected_project(), self.selected_session())
                else {
                    return;
                };
                let prompt = format!(
                    "Delete session {} ({} messages)?",
                    short_session_id(&session.id),
                    session.message_count
                );
                self.pending = Some(PendingAction::DeleteSession {
                    hash: project.hash.clone(),
                    session_id: session.id.clone(),
                });
                self.modal = Some(Modal::confirm("Delete session", prompt));
            }
        }
    }

    fn begin_move(&mut self) {
        match self.focus {
            Focus::Projects => {
                let Some(project) = self.selected_project() else {
                    return;
                };
                let initial = project.path.clone().unwrap_or_default();
                self.pending = Some(PendingAction::MoveProject {
                    hash: project.hash.clone(),
                });
                self.modal = Some(Modal::text_input("Move project to", initial));
            }
            Focus::Sessions => {
                let (Some(project), Some(session)) =
                    (self.selected_project(), self.selected_session())
                else {
                    return;
                };
                let src_hash = project.hash.clone();
                let options: Vec<ListOption> = self
                    .projects
                    .iter()
                    .filter(|p| p.hash != src_hash)
                    .map(|p| ListOption {
                        id: p.hash.clone(),
                        label: p.display_path().to_string(),
                    })
                    .collect();
                self.pending = Some(PendingAction::MoveSession {
                    src_hash,
                    session_id: session.id.clone(),
                });
                self.modal = Some(Modal::list_select("Move session to project", options));
            }
        }
    }

    fn begin_open(&mut self) {
        let (Some(project), Some(session)) = (self.selected_project(), self.selected_session())
        else {
            return;
        };
        if project.status != ProjectStatus::Valid {
            self.show_error("Project path is not available; resolve it before opening".to_string());
            return;
        }
        let Some(path) = project.path.clone() else {
            return;
        };
        let prompt = format!(
            "Resume session {} in {}?",
            short_session_id(&session.id),
            path
        );
        self.pending = Some(PendingAction::OpenSession {
            path: PathBuf::from(path),
            session_id: session.id.clone(),
        });
        self.modal = Some(Modal::confirm("Open session", prompt));
    }

    fn begin_inspect(&mut self) {
        let (Some(project), Some(session)) = (self.selected_project(), self.selected_session())
        else {
            return;
        };
        let lines = vec![
            format!("Session:  {}", session.id),
            format!("Messages: {}", session.message_count),
            format!("Updated:  {}", session.last_update.to_rfc3339()),
            format!("Project:  {}", project.display_path()),
            format!("Hash:     {}", project.hash),
        ];
        self.pending = Some(PendingAction::Dismiss);
        self.modal = Some(Modal::inspect("Session details", lines));
    }

    pub(crate) fn show_error(&mut self, message: String) {
        self.pending = Some(PendingAction::Dismiss);
        self.modal = Some(Modal::error(message));
    }

    fn dispatch(
        &mut self,
        pending: Option<PendingAction>,
        result: ModalResult,
    ) -> Option<AppCommand> {
        let Some(action) = pending else {
            return None;
        };
        let value = match result {
            ModalResult::Canceled => return None,
            ModalResult::Value(value) => value,
        };

        match action {
            PendingAction::DeleteProject { hash } => {
                match geminictl_storage::delete_project(&self.storage_root, &hash) {
                    Ok(()) => {
                        self.cache.delete(&hash);
                        let _ = self.cache.save();
                        self.projects.retain(|p| p.hash != hash);
                        self.clamp_project_cursor();
                        self.session_cursor = 0;
                        self.clamp_session_cursor();
                    }
                    Err(err) => self.show_error(format!("Delete failed: {}", err)),
                }
            }
            PendingAction::DeleteSession { hash, session_id } => {
                match geminictl_storage::delete_session(&self.storage_root, &hash, &session_id) {
                    Ok(()) => self.refresh(),
                    Err(err) => self.show_error(format!("Delete failed: {}", err)),
                }
            }
            PendingAction::MoveProject { hash } => self.move_project(&hash, &value),
            PendingAction::MoveSession {
                src_hash,
                session_id,
            } => {
                match geminictl_storage::move_session(
                    &self.storage_root,
                    &src_hash,
                    &value,
                    &session_id,
                ) {
                    Ok(()) => self.refresh(),
                    Err(err) => self.show_error(format!("Move failed: {}", err)),
                }
            }
            PendingAction::OpenSession { path, session_id } => {
                return Some(AppCommand::OpenSession { path, session_id });
            }
            PendingAction::Dismiss => {}
        }
        None
    }

    fn move_project(&mut self, old_hash: &str, input: &str) {
        let input = input.trim();
        if input.is_empty() {
            return;
        }
        let target = geminictl_core::expand_tilde(input);
        let target = match geminictl_core::absolutize(&target) {
            Ok(path) => path,
            Err(err) => {
                self.show_error(format!("Move failed: {}", err));
                return;
            }
        };

        match geminictl_storage::move_project(&self.storage_root, old_hash, &target) {
            Ok(new_hash) => {
                self.cache.delete(old_hash);
                self.cache.set(&new_hash, &target.to_string_lossy());
                let _ = self.cache.save();
                self.refresh();
                if let Some(index) = self.projects.iter().position(|p| p.hash == new_hash) {
                    self.project_cursor = index;
                    self.session_cursor = 0;
                }
            }
            Err(err) => self.show_error(format!("Move failed: {}", err)),
        }
    }
}
