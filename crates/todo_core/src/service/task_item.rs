//! Task item view-model.
//!
//! # Responsibility
//! - Hold one task's displayed state and its transient edit draft.
//! - Forward every persistent change to the store before touching the
//!   displayed state.
//!
//! # Invariants
//! - A `TaskItem` always mirrors an existing row id; items are built only
//!   after the store returned that id.
//! - Displayed `text`/`done` change only after the store call succeeded.
//! - Completion cannot be toggled while the edit draft is open.

use crate::model::task::{validate_task_text, Task, TaskId, TaskValidationError};
use crate::repo::task_store::{StoreError, TaskStore};
use log::{info, warn};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type TaskResult<T> = Result<T, TaskError>;

/// Errors from task item and task list operations.
#[derive(Debug)]
pub enum TaskError {
    /// Submitted text is empty or whitespace-only. No store call was made.
    EmptyText,
    /// The id is not part of the visible list.
    UnknownTask(TaskId),
    /// Save/draft requested while the item is not being edited.
    NotEditing(TaskId),
    /// Completion change requested while the item is being edited.
    Editing(TaskId),
    /// Store-level failure.
    Store(StoreError),
}

impl TaskError {
    /// True when the target row or item no longer exists.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::UnknownTask(_) | Self::Store(StoreError::NotFound(_))
        )
    }

    /// True when the store connection or SQL layer failed.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Store(StoreError::Unavailable(_)))
    }
}

impl Display for TaskError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyText => write!(f, "task text must not be blank"),
            Self::UnknownTask(id) => write!(f, "task is not in the list: {id}"),
            Self::NotEditing(id) => write!(f, "task is not being edited: {id}"),
            Self::Editing(id) => write!(f, "finish editing task {id} first"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TaskError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for TaskError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<TaskValidationError> for TaskError {
    fn from(value: TaskValidationError) -> Self {
        match value {
            TaskValidationError::EmptyText => Self::EmptyText,
        }
    }
}

/// Which sub-view of the item is visible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemMode {
    Display,
    Editing { draft: String },
}

/// Plain data snapshot consumed by rendering layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskItemView {
    pub id: TaskId,
    pub text: String,
    pub done: bool,
    pub editing: bool,
    /// Current edit field content. `None` in display mode.
    pub draft: Option<String>,
}

/// In-memory, UI-bound representation of one task row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItem {
    id: TaskId,
    text: String,
    done: bool,
    mode: ItemMode,
}

impl TaskItem {
    pub(crate) fn new(id: TaskId, text: impl Into<String>, done: bool) -> Self {
        Self {
            id,
            text: text.into(),
            done,
            mode: ItemMode::Display,
        }
    }

    pub(crate) fn from_task(task: Task) -> Self {
        Self::new(task.id, task.text, task.done)
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn done(&self) -> bool {
        self.done
    }

    pub fn mode(&self) -> &ItemMode {
        &self.mode
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.mode, ItemMode::Editing { .. })
    }

    pub fn draft(&self) -> Option<&str> {
        match &self.mode {
            ItemMode::Editing { draft } => Some(draft.as_str()),
            ItemMode::Display => None,
        }
    }

    /// Mutable access to the edit field, for character-level input.
    pub fn draft_mut(&mut self) -> Option<&mut String> {
        match &mut self.mode {
            ItemMode::Editing { draft } => Some(draft),
            ItemMode::Display => None,
        }
    }

    /// Opens the edit sub-view pre-filled with the displayed text.
    ///
    /// Already-open drafts are kept as they are. No store call.
    pub fn begin_edit(&mut self) {
        if self.is_editing() {
            return;
        }
        self.mode = ItemMode::Editing {
            draft: self.text.clone(),
        };
    }

    /// Replaces the edit field content.
    pub fn set_draft(&mut self, draft: impl Into<String>) -> TaskResult<()> {
        match self.draft_mut() {
            Some(current) => {
                *current = draft.into();
                Ok(())
            }
            None => Err(TaskError::NotEditing(self.id)),
        }
    }

    /// Closes the edit sub-view and discards the draft. No store call.
    pub fn cancel_edit(&mut self) {
        self.mode = ItemMode::Display;
    }

    /// Persists the draft and returns to display mode.
    ///
    /// # Errors
    /// - `NotEditing` when no draft is open.
    /// - `EmptyText` for a blank draft; the draft stays open.
    /// - `Store(..)` when the row update fails; the displayed text is not
    ///   changed and the draft stays open for retry or cancel.
    pub fn save<S: TaskStore + ?Sized>(&mut self, store: &S) -> TaskResult<()> {
        let draft = self.draft().ok_or(TaskError::NotEditing(self.id))?;
        validate_task_text(draft)?;
        let text = draft.to_string();

        if let Err(err) = store.update_text(self.id, &text) {
            warn!(
                "event=task_save module=service status=error task_id={} error={}",
                self.id, err
            );
            return Err(err.into());
        }

        self.text = text;
        self.mode = ItemMode::Display;
        info!("event=task_save module=service status=ok task_id={}", self.id);
        Ok(())
    }

    /// Flips the completion flag and returns the new value.
    pub fn toggle_done<S: TaskStore + ?Sized>(&mut self, store: &S) -> TaskResult<bool> {
        let next = !self.done;
        self.set_done(store, next)?;
        Ok(next)
    }

    /// Sets the completion flag, persisting it first.
    ///
    /// On failure the displayed checkbox keeps its previous value.
    pub fn set_done<S: TaskStore + ?Sized>(&mut self, store: &S, done: bool) -> TaskResult<()> {
        if self.is_editing() {
            return Err(TaskError::Editing(self.id));
        }

        if let Err(err) = store.update_done(self.id, done) {
            warn!(
                "event=task_set_done module=service status=error task_id={} error={}",
                self.id, err
            );
            return Err(err.into());
        }

        self.done = done;
        info!(
            "event=task_set_done module=service status=ok task_id={} done={}",
            self.id, done
        );
        Ok(())
    }

    pub fn view(&self) -> TaskItemView {
        TaskItemView {
            id: self.id,
            text: self.text.clone(),
            done: self.done,
            editing: self.is_editing(),
            draft: self.draft().map(str::to_string),
        }
    }
}
