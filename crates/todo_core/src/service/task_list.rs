//! Task list orchestration.
//!
//! # Responsibility
//! - Own the ordered collection of visible task items and the new-task input.
//! - Orchestrate create, delete and reorder against the store.
//! - Perform the initial load from the store.
//!
//! # Invariants
//! - Visible order equals persisted order (`position ASC, task_id ASC`).
//! - Delete is atomic from the caller's view: the visible entry is removed
//!   only after the row delete succeeded.
//! - A failed store call leaves every visible item unchanged.

use crate::model::task::{validate_task_text, TaskId};
use crate::repo::task_store::TaskStore;
use crate::service::task_item::{TaskError, TaskItem, TaskItemView, TaskResult};
use log::{info, warn};
use serde::Serialize;

/// Plain data snapshot of the whole list for rendering layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskListView {
    pub input: String,
    pub items: Vec<TaskItemView>,
}

/// Ordered collection of task items bound to one store.
pub struct TaskList<S: TaskStore> {
    store: S,
    items: Vec<TaskItem>,
    input: String,
}

impl<S: TaskStore> TaskList<S> {
    /// Builds the list and loads every stored row once.
    pub fn load(store: S) -> TaskResult<Self> {
        let mut list = Self {
            store,
            items: Vec::new(),
            input: String::new(),
        };
        list.reload()?;
        Ok(list)
    }

    /// Replaces visible items with the current store contents.
    ///
    /// Open edit drafts are discarded. On failure the visible items are kept.
    pub fn reload(&mut self) -> TaskResult<()> {
        let tasks = match self.store.list_all() {
            Ok(tasks) => tasks,
            Err(err) => {
                warn!("event=task_list_load module=service status=error error={err}");
                return Err(err.into());
            }
        };

        self.items = tasks.into_iter().map(TaskItem::from_task).collect();
        info!(
            "event=task_list_load module=service status=ok count={}",
            self.items.len()
        );
        Ok(())
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn items(&self) -> &[TaskItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of items not yet checked off.
    pub fn pending_count(&self) -> usize {
        self.items.iter().filter(|item| !item.done()).count()
    }

    pub fn item(&self, id: TaskId) -> Option<&TaskItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn index_of(&self, id: TaskId) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut String {
        &mut self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Creates a task row and appends its item.
    ///
    /// Blank text returns `EmptyText` without any store call.
    pub fn add(&mut self, text: &str) -> TaskResult<TaskId> {
        validate_task_text(text)?;
        let id = match self.store.insert(text, false) {
            Ok(id) => id,
            Err(err) => {
                warn!("event=task_add module=service status=error error={err}");
                return Err(err.into());
            }
        };

        self.items.push(TaskItem::new(id, text, false));
        info!("event=task_add module=service status=ok task_id={id}");
        Ok(id)
    }

    /// Adds a task from the input field and clears the field on success.
    ///
    /// On any error the field keeps its content.
    pub fn submit_input(&mut self) -> TaskResult<TaskId> {
        let text = self.input.clone();
        let id = self.add(&text)?;
        self.input.clear();
        Ok(id)
    }

    pub fn begin_edit(&mut self, id: TaskId) -> TaskResult<()> {
        self.item_mut(id)?.begin_edit();
        Ok(())
    }

    pub fn set_draft(&mut self, id: TaskId, draft: impl Into<String>) -> TaskResult<()> {
        self.item_mut(id)?.set_draft(draft)
    }

    pub fn draft_mut(&mut self, id: TaskId) -> TaskResult<&mut String> {
        self.item_mut(id)?
            .draft_mut()
            .ok_or(TaskError::NotEditing(id))
    }

    pub fn cancel_edit(&mut self, id: TaskId) -> TaskResult<()> {
        self.item_mut(id)?.cancel_edit();
        Ok(())
    }

    pub fn save_edit(&mut self, id: TaskId) -> TaskResult<()> {
        let index = self.require_index(id)?;
        self.items[index].save(&self.store)
    }

    pub fn toggle_done(&mut self, id: TaskId) -> TaskResult<bool> {
        let index = self.require_index(id)?;
        self.items[index].toggle_done(&self.store)
    }

    pub fn set_done(&mut self, id: TaskId, done: bool) -> TaskResult<()> {
        let index = self.require_index(id)?;
        self.items[index].set_done(&self.store, done)
    }

    /// Deletes the row, then removes the visible item.
    pub fn remove(&mut self, id: TaskId) -> TaskResult<()> {
        let index = self.require_index(id)?;
        if let Err(err) = self.store.delete(id) {
            warn!("event=task_delete module=service status=error task_id={id} error={err}");
            return Err(err.into());
        }

        self.items.remove(index);
        info!("event=task_delete module=service status=ok task_id={id}");
        Ok(())
    }

    /// Moves one item a step towards the top. No-op for the first item.
    pub fn move_up(&mut self, id: TaskId) -> TaskResult<()> {
        let index = self.require_index(id)?;
        if index == 0 {
            return Ok(());
        }
        self.move_to(id, index, index - 1)
    }

    /// Moves one item a step towards the bottom. No-op for the last item.
    pub fn move_down(&mut self, id: TaskId) -> TaskResult<()> {
        let index = self.require_index(id)?;
        if index + 1 >= self.items.len() {
            return Ok(());
        }
        self.move_to(id, index, index + 1)
    }

    pub fn view(&self) -> TaskListView {
        TaskListView {
            input: self.input.clone(),
            items: self.items.iter().map(TaskItem::view).collect(),
        }
    }

    /// Moves relative to the visible neighbour's id, so stale visible rows
    /// cannot skew the stored order.
    fn move_to(&mut self, id: TaskId, from: usize, to: usize) -> TaskResult<()> {
        let anchor = self.items[to].id();
        if let Err(err) = self.store.move_task(id, anchor) {
            warn!("event=task_move module=service status=error task_id={id} error={err}");
            return Err(err.into());
        }

        let item = self.items.remove(from);
        self.items.insert(to, item);
        info!("event=task_move module=service status=ok task_id={id} from={from} to={to}");
        Ok(())
    }

    fn require_index(&self, id: TaskId) -> TaskResult<usize> {
        self.index_of(id).ok_or(TaskError::UnknownTask(id))
    }

    fn item_mut(&mut self, id: TaskId) -> TaskResult<&mut TaskItem> {
        self.items
            .iter_mut()
            .find(|item| item.id() == id)
            .ok_or(TaskError::UnknownTask(id))
    }
}
