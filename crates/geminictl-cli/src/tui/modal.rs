use crossterm::event::{KeyCode, KeyEvent};

/// Outcome of a finished modal. The controller dispatches on the pending
/// action it recorded when it opened the modal; the payload carries whatever
/// the modal collected (input text, selected ID, nothing for confirms).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalResult {
    Canceled,
    Value(String),
}

/// One entry of a list-selector modal.
#[derive(Debug, Clone)]
pub struct ListOption {
    pub id: String,
    pub label: String,
}

/// A modal consumes all keyboard input until it returns a result.
#[derive(Debug)]
pub enum Modal {
    Confirm {
        title: String,
        prompt: String,
    },
    TextInput {
        title: String,
        value: String,
    },
    ListSelect {
        title: String,
        options: Vec<ListOption>,
        cursor: usize,
    },
    Inspect {
        title: String,
        lines: Vec<String>,
    },
    ShowError {
        message: String,
    },
}

impl Modal {
    pub fn confirm(title: impl Into<String>, prompt: impl Into<String>) -> Self {
        Modal::Confirm {
            title: title.into(),
            prompt: prompt.into(),
        }
    }

    pub fn text_input(title: impl Into<String>, initial: impl Into<String>) -> Self {
        Modal::TextInput {
            title: title.into(),
            value: initial.into(),
        }
    }

    pub fn list_select(title: impl Into<String>, options: Vec<ListOption>) -> Self {
        Modal::ListSelect {
            title: title.into(),
            options,
            cursor: 0,
        }
    }

    pub fn inspect(title: impl Into<String>, lines: Vec<String>) -> Self {
        Modal::Inspect {
            title: title.into(),
            lines,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Modal::ShowError {
            message: message.into(),
        }
    }

    /// Feed one key event. `Some` means the modal is done.
    pub fn update(&mut self, key: KeyEvent) -> Option<ModalResult> {
        match self {
            Modal::Confirm { .. } => match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => Some(ModalResult::Value(String::new())),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    Some(ModalResult::Canceled)
                }
                _ => None,
            },
            Modal::TextInput { value, .. } => match key.code {
                KeyCode::Enter => Some(ModalResult::Value(value.clone())),
                KeyCode::Esc => Some(ModalResult::Canceled),
                KeyCode::Backspace => {
                    value.pop();
                    None
                }
                KeyCode::Char(c) => {
                    value.push(c);
                    None
                }
                _ => None,
            },
            Modal::ListSelect {
                options, cursor, ..
            } => match key.code {
                KeyCode::Up | KeyCode::Char('k') => {
                    *cursor = cursor.saturating_sub(1);
                    None
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    if *cursor + 1 < options.len() {
                        *cursor += 1;
                    }
                    None
                }
                KeyCode::Enter => options
                    .get(*cursor)
                    .map(|option| ModalResult::Value(option.id.clone())),
                KeyCode::Esc => Some(ModalResult::Canceled),
                _ => None,
            },
            Modal::Inspect { .. } | Modal::ShowError { .. } => match key.code {
                KeyCode::Enter | KeyCode::Esc | KeyCode::Char('q') => Some(ModalResult::Canceled),
                _ => None,
            },
        }
    }
}
