//! Task store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide durable CRUD over `tasks_table` rows.
//! - Keep the persisted `position` ordering dense and deterministic.
//!
//! # Invariants
//! - `list_all` order is `position ASC, task_id ASC`.
//! - `move_task` resolves both ids against stored order and resequences
//!   positions inside one immediate transaction.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::task::{Task, TaskId};
use log::debug;
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

const TASK_SELECT_SQL: &str = "SELECT
    task_id,
    task_text,
    task_status,
    position
FROM tasks_table";

const TASK_TABLE: &str = "tasks_table";
const TASK_COLUMNS: [&str; 4] = ["task_id", "task_text", "task_status", "position"];

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from task store operations.
#[derive(Debug)]
pub enum StoreError {
    /// Connection or SQL failure. The caller's in-memory state is unchanged.
    Unavailable(DbError),
    /// Mutation targeted a row that does not exist.
    NotFound(TaskId),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted data cannot be converted to a valid task.
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(err) => write!(f, "task store unavailable: {err}"),
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "task store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "task store requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "task store requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted task data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Unavailable(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Unavailable(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Unavailable(DbError::Sqlite(value))
    }
}

/// Durable CRUD contract over task rows.
pub trait TaskStore {
    /// Inserts a row at the end of the persisted order and returns its id.
    fn insert(&self, text: &str, done: bool) -> StoreResult<TaskId>;
    /// Overwrites the text of one row.
    fn update_text(&self, id: TaskId, text: &str) -> StoreResult<()>;
    /// Overwrites the completion flag of one row.
    fn update_done(&self, id: TaskId, done: bool) -> StoreResult<()>;
    /// Removes one row.
    fn delete(&self, id: TaskId) -> StoreResult<()>;
    /// Loads one row by id.
    fn get(&self, id: TaskId) -> StoreResult<Option<Task>>;
    /// Returns every row in persisted order.
    fn list_all(&self) -> StoreResult<Vec<Task>>;
    /// Moves one row into the stored slot currently held by `anchor` and
    /// resequences all rows. The row lands before `anchor` when it came from
    /// below and after it when it came from above.
    fn move_task(&self, id: TaskId, anchor: TaskId) -> StoreResult<()>;
}

/// SQLite-backed task store borrowing the process-lifetime connection.
pub struct SqliteTaskStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskStore<'conn> {
    /// Creates a store from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_task_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl TaskStore for SqliteTaskStore<'_> {
    fn insert(&self, text: &str, done: bool) -> StoreResult<TaskId> {
        let position = next_position(self.conn)?;
        self.conn.execute(
            "INSERT INTO tasks_table (task_text, task_status, position)
             VALUES (?1, ?2, ?3);",
            params![text, done, position],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!("event=task_insert module=store status=ok task_id={id} position={position}");
        Ok(id)
    }

    fn update_text(&self, id: TaskId, text: &str) -> StoreResult<()> {
        let changed = self.conn.execute(
            "UPDATE tasks_table SET task_text = ?2 WHERE task_id = ?1;",
            params![id, text],
        )?;
        ensure_changed(changed, id, "task_update_text")
    }

    fn update_done(&self, id: TaskId, done: bool) -> StoreResult<()> {
        let changed = self.conn.execute(
            "UPDATE tasks_table SET task_status = ?2 WHERE task_id = ?1;",
            params![id, done],
        )?;
        ensure_changed(changed, id, "task_update_done")
    }

    fn delete(&self, id: TaskId) -> StoreResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM tasks_table WHERE task_id = ?1;", [id])?;
        ensure_changed(changed, id, "task_delete")
    }

    fn get(&self, id: TaskId) -> StoreResult<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE task_id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }
        Ok(None)
    }

    fn list_all(&self) -> StoreResult<Vec<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TASK_SELECT_SQL} ORDER BY position ASC, task_id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }
        Ok(tasks)
    }

    fn move_task(&self, id: TaskId, anchor: TaskId) -> StoreResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        let mut ordered_ids = list_ordered_ids(&tx)?;
        let from = ordered_ids
            .iter()
            .position(|current| *current == id)
            .ok_or(StoreError::NotFound(id))?;
        let to = ordered_ids
            .iter()
            .position(|current| *current == anchor)
            .ok_or(StoreError::NotFound(anchor))?;
        if from == to {
            return Ok(());
        }

        ordered_ids.remove(from);
        ordered_ids.insert(to, id);

        for (index, current) in ordered_ids.into_iter().enumerate() {
            tx.execute(
                "UPDATE tasks_table SET position = ?2 WHERE task_id = ?1;",
                params![current, index as i64],
            )?;
        }

        tx.commit()?;
        debug!("event=task_move module=store status=ok task_id={id} anchor_id={anchor}");
        Ok(())
    }
}

fn ensure_changed(changed: usize, id: TaskId, event: &str) -> StoreResult<()> {
    if changed == 0 {
        debug!("event={event} module=store status=not_found task_id={id}");
        return Err(StoreError::NotFound(id));
    }
    debug!("event={event} module=store status=ok task_id={id}");
    Ok(())
}

fn next_position(conn: &Connection) -> StoreResult<i64> {
    let next = conn.query_row(
        "SELECT COALESCE(MAX(position), -1) + 1 FROM tasks_table;",
        [],
        |row| row.get(0),
    )?;
    Ok(next)
}

fn list_ordered_ids(conn: &Connection) -> StoreResult<Vec<TaskId>> {
    let mut stmt =
        conn.prepare("SELECT task_id FROM tasks_table ORDER BY position ASC, task_id ASC;")?;
    let mut rows = stmt.query([])?;
    let mut ids = Vec::new();
    while let Some(row) = rows.next()? {
        ids.push(row.get(0)?);
    }
    Ok(ids)
}

fn parse_task_row(row: &Row<'_>) -> StoreResult<Task> {
    let id: TaskId = row.get("task_id")?;

    // Legacy rows may carry NULL text or status.
    let text = row.get::<_, Option<String>>("task_text")?.unwrap_or_default();
    let done = match row.get::<_, Option<i64>>("task_status")? {
        None | Some(0) => false,
        Some(1) => true,
        Some(other) => {
            return Err(StoreError::InvalidData(format!(
                "invalid task_status value `{other}` for task {id}"
            )));
        }
    };

    Ok(Task {
        id,
        text,
        done,
        position: row.get("position")?,
    })
}

fn ensure_task_connection_ready(conn: &Connection) -> StoreResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(StoreError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, TASK_TABLE)? {
        return Err(StoreError::MissingRequiredTable(TASK_TABLE));
    }

    for column in TASK_COLUMNS {
        if !table_has_column(conn, TASK_TABLE, column)? {
            return Err(StoreError::MissingRequiredColumn {
                table: TASK_TABLE,
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> StoreResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> StoreResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
