//! Terminal app state and key dispatch.
//!
//! # Responsibility
//! - Map key presses to task list operations.
//! - Turn every operation failure into a transient notice.
//!
//! # Invariants
//! - No key press can end the event loop except quit.
//! - `selected` is always a valid index while the list is non-empty.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use todo_core::{TaskError, TaskId, TaskList, TaskResult, TaskStore};

/// Which widget receives character input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    List,
}

pub struct App<S: TaskStore> {
    list: TaskList<S>,
    selected: usize,
    focus: Focus,
    notice: Option<String>,
    should_quit: bool,
}

impl<S: TaskStore> App<S> {
    /// Starts with the input focused when there is nothing to select.
    pub fn new(list: TaskList<S>) -> Self {
        let focus = if list.is_empty() {
            Focus::Input
        } else {
            Focus::List
        };
        Self {
            list,
            selected: 0,
            focus,
            notice: None,
            should_quit: false,
        }
    }

    pub fn list(&self) -> &TaskList<S> {
        &self.list
    }

    pub fn selected(&self) -> Option<usize> {
        if self.list.is_empty() {
            None
        } else {
            Some(self.selected)
        }
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match (self.focus, self.editing_id()) {
            (Focus::Input, _) => self.handle_input_key(key),
            (Focus::List, Some(id)) => self.handle_edit_key(id, key),
            (Focus::List, None) => self.handle_list_key(key),
        }
    }

    fn handle_input_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => match self.list.submit_input() {
                Ok(_) => {
                    self.notice = None;
                    self.selected = self.list.len() - 1;
                }
                // Blank input: nothing happens and the field keeps its content.
                Err(TaskError::EmptyText) => {}
                Err(err) => self.notify("add", err),
            },
            KeyCode::Esc | KeyCode::Tab => {
                if !self.list.is_empty() {
                    self.focus = Focus::List;
                }
            }
            KeyCode::Backspace => {
                self.list.input_mut().pop();
            }
            KeyCode::Char(c) => self.list.input_mut().push(c),
            _ => {}
        }
    }

    fn handle_edit_key(&mut self, id: TaskId, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                let result = self.list.save_edit(id);
                self.report("save", result);
            }
            KeyCode::Esc => {
                let result = self.list.cancel_edit(id);
                self.report("cancel", result);
            }
            KeyCode::Delete => {
                let result = self.list.remove(id);
                self.report("delete", result);
                self.clamp_selection();
            }
            KeyCode::Backspace => {
                if let Ok(draft) = self.list.draft_mut(id) {
                    draft.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Ok(draft) = self.list.draft_mut(id) {
                    draft.push(c);
                }
            }
            _ => {}
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('i') | KeyCode::Char('a') | KeyCode::Tab => self.focus = Focus::Input,
            KeyCode::Up | KeyCode::Char('k') => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.list.len() {
                    self.selected += 1;
                }
            }
            KeyCode::Char('r') => {
                let result = self.list.reload();
                self.report("reload", result);
            }
            _ => {
                if let Some(id) = self.selected_id() {
                    self.handle_item_key(id, key);
                }
            }
        }
        self.clamp_selection();
    }

    fn handle_item_key(&mut self, id: TaskId, key: KeyEvent) {
        match key.code {
            KeyCode::Char(' ') | KeyCode::Char('x') => {
                let result = self.list.toggle_done(id);
                self.report("toggle", result);
            }
            KeyCode::Char('e') | KeyCode::Enter => {
                let result = self.list.begin_edit(id);
                self.report("edit", result);
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                let result = self.list.remove(id);
                self.report("delete", result);
            }
            KeyCode::Char('K') => {
                let result = self.list.move_up(id);
                if self.report("move", result).is_some() {
                    self.follow(id);
                }
            }
            KeyCode::Char('J') => {
                let result = self.list.move_down(id);
                if self.report("move", result).is_some() {
                    self.follow(id);
                }
            }
            _ => {}
        }
    }

    fn report<T>(&mut self, action: &str, result: TaskResult<T>) -> Option<T> {
        match result {
            Ok(value) => {
                self.notice = None;
                Some(value)
            }
            Err(err) => {
                self.notify(action, err);
                None
            }
        }
    }

    fn notify(&mut self, action: &str, err: TaskError) {
        let hint = if err.is_not_found() {
            " (press r to reload)"
        } else {
            ""
        };
        self.notice = Some(format!("{action} failed: {err}{hint}"));
    }

    fn follow(&mut self, id: TaskId) {
        if let Some(index) = self.list.index_of(id) {
            self.selected = index;
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.list.len();
        if len == 0 {
            self.selected = 0;
            self.focus = Focus::Input;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }

    fn selected_id(&self) -> Option<TaskId> {
        self.list.items().get(self.selected).map(|item| item.id())
    }

    fn editing_id(&self) -> Option<TaskId> {
        self.list
            .items()
            .get(self.selected)
            .filter(|item| item.is_editing())
            .map(|item| item.id())
    }
}
