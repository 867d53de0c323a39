//! Core logic for the to-do application.
//! This crate is the single source of truth for task CRUD invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::task::{validate_task_text, Task, TaskId, TaskValidationError};
pub use repo::task_store::{SqliteTaskStore, StoreError, StoreResult, TaskStore};
pub use service::task_item::{ItemMode, TaskError, TaskItem, TaskItemView, TaskResult};
pub use service::task_list::{TaskList, TaskListView};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
