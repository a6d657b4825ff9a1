// View editor state machine.
// Drives the create/rename modal and validates names before anything is dispatched.

use super::views::{ViewId, ViewStore};

/// What the modal is editing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorMode {
    Create,
    Rename {
        view_id: ViewId,
        current_name: String,
    },
}

/// Modal state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditorState {
    #[default]
    Idle,
    /// Modal open, waiting for the user.
    Editing {
        mode: EditorMode,
        /// Inline validation message from the last confirm.
        error: Option<String>,
    },
    /// Name accepted, waiting for persistence to resolve.
    Submitting { mode: EditorMode, name: String },
}

/// Work the controller performs once a name is accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorCommand {
    Create { name: String },
    Rename { view_id: ViewId, name: String },
}

#[derive(Debug, Clone, Default)]
pub struct ViewEditor {
    state: EditorState,
}

impl ViewEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        !matches!(self.state, EditorState::Idle)
    }

    /// Inline error to show under the name field.
    pub fn error(&self) -> Option<&str> {
        match &self.state {
            EditorState::Editing { error, .. } => error.as_deref(),
            _ => None,
        }
    }

    /// Open the modal for a new view. Ignored while the modal is open.
    pub fn request_create(&mut self) -> bool {
        if self.is_open() {
            return false;
        }
        self.state = EditorState::Editing {
            mode: EditorMode::Create,
            error: None,
        };
        true
    }

    /// Open the modal to rename a custom view. Unknown and default views are ignored.
    pub fn request_rename(&mut self, view_id: ViewId, store: &ViewStore) -> bool {
        if self.is_open() {
            return false;
        }
        let Some(view) = store.view(view_id).filter(|v| !v.is_default) else {
            return false;
        };
        self.state = EditorState::Editing {
            mode: EditorMode::Rename {
                view_id,
                current_name: view.name.clone(),
            },
            error: None,
        };
        true
    }

    /// Validate the entered name.
    ///
    /// On success the modal moves to `Submitting` and the command to run is
    /// returned. On failure it stays in `Editing` with an inline error.
    pub fn confirm(&mut self, name: &str, store: &ViewStore) -> Option<EditorCommand> {
        let EditorState::Editing { mode, .. } = &self.state else {
            return None;
        };
        let mode = mode.clone();

        let exclude = match &mode {
            EditorMode::Create => None,
            EditorMode::Rename { view_id, .. } => Some(*view_id),
        };

        match store.validate_name(name, exclude) {
            Ok(name) => {
                let command = match &mode {
                    EditorMode::Create => EditorCommand::Create { name: name.clone() },
                    EditorMode::Rename { view_id, .. } => EditorCommand::Rename {
                        view_id: *view_id,
                        name: name.clone(),
                    },
                };
                self.state = EditorState::Submitting { mode, name };
                Some(command)
            }
            Err(e) => {
                self.state = EditorState::Editing {
                    mode,
                    error: Some(e.to_string()),
                };
                None
            }
        }
    }

    /// Close the modal once the dispatched command has resolved.
    pub fn finish(&mut self) {
        if matches!(self.state, EditorState::Submitting { .. }) {
            self.state = EditorState::Idle;
        }
    }

    /// Close the modal without doing anything. A pending submit cannot be cancelled.
    pub fn cancel(&mut self) -> bool {
        if matches!(self.state, EditorState::Editing { .. }) {
            self.state = EditorState::Idle;
            return true;
        }
        false
    }
}
