//! Task row model and text validation.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned row identifier. Immutable once assigned.
pub type TaskId = i64;

/// One persisted task row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    pub done: bool,
    /// Persisted ordering key. Lower values render first.
    pub position: i64,
}

/// Validation failures for task text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskValidationError {
    /// Text is empty or whitespace-only.
    EmptyText,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyText => write!(f, "task text must not be blank"),
        }
    }
}

impl Error for TaskValidationError {}

/// Rejects empty or whitespace-only text.
///
/// Accepted text is stored exactly as typed, surrounding spaces included.
pub fn validate_task_text(text: &str) -> Result<(), TaskValidationError> {
    if text.trim().is_empty() {
        return Err(TaskValidationError::EmptyText);
    }
    Ok(())
}
