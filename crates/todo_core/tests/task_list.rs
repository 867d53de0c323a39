use std::collections::HashSet;
use todo_core::db::{open_db, open_db_in_memory};
use todo_core::{SqliteTaskStore, StoreError, TaskError, TaskList, TaskStore};

fn row_count(conn: &rusqlite::Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM tasks_table;", [], |row| row.get(0))
        .unwrap()
}

#[test]
fn add_creates_one_row_and_one_item() {
    let conn = open_db_in_memory().unwrap();
    let mut list = TaskList::load(SqliteTaskStore::try_new(&conn).unwrap()).unwrap();

    let id = list.add("Buy milk").unwrap();

    assert_eq!(row_count(&conn), 1);
    assert_eq!(list.len(), 1);
    let item = &list.items()[0];
    assert_eq!(item.id(), id);
    assert_eq!(item.text(), "Buy milk");
    assert!(!item.done());

    let row = list.store().get(id).unwrap().unwrap();
    assert_eq!(row.text, "Buy milk");
    assert!(!row.done);
}

#[test]
fn add_rejects_blank_text_without_touching_store() {
    let conn = open_db_in_memory().unwrap();
    let mut list = TaskList::load(SqliteTaskStore::try_new(&conn).unwrap()).unwrap();

    assert!(matches!(list.add(""), Err(TaskError::EmptyText)));
    assert!(matches!(list.add("   "), Err(TaskError::EmptyText)));

    assert_eq!(row_count(&conn), 0);
    assert!(list.is_empty());
}

#[test]
fn submit_input_clears_field_only_on_success() {
    let conn = open_db_in_memory().unwrap();
    let mut list = TaskList::load(SqliteTaskStore::try_new(&conn).unwrap()).unwrap();

    list.set_input("   ");
    assert!(matches!(list.submit_input(), Err(TaskError::EmptyText)));
    assert_eq!(list.input(), "   ");

    list.set_input("Write report");
    list.submit_input().unwrap();
    assert_eq!(list.input(), "");
    assert_eq!(list.items()[0].text(), "Write report");
}

#[test]
fn toggle_updates_only_that_row() {
    let conn = open_db_in_memory().unwrap();
    let mut list = TaskList::load(SqliteTaskStore::try_new(&conn).unwrap()).unwrap();
    let a = list.add("a").unwrap();
    let b = list.add("b").unwrap();

    assert!(list.toggle_done(a).unwrap());

    assert!(list.store().get(a).unwrap().unwrap().done);
    assert!(!list.store().get(b).unwrap().unwrap().done);
    assert!(list.item(a).unwrap().done());
    assert_eq!(list.pending_count(), 1);

    assert!(!list.toggle_done(a).unwrap());
    assert!(!list.store().get(a).unwrap().unwrap().done);
}

#[test]
fn edit_and_save_persists_text_across_reload() {
    let conn = open_db_in_memory().unwrap();
    let mut list = TaskList::load(SqliteTaskStore::try_new(&conn).unwrap()).unwrap();
    let id = list.add("Buy milk").unwrap();
    let other = list.add("Walk dog").unwrap();

    list.begin_edit(id).unwrap();
    assert_eq!(list.item(id).unwrap().draft(), Some("Buy milk"));
    list.set_draft(id, "Buy oat milk").unwrap();
    list.save_edit(id).unwrap();
    assert!(!list.item(id).unwrap().is_editing());

    let reloaded = TaskList::load(SqliteTaskStore::try_new(&conn).unwrap()).unwrap();
    assert_eq!(reloaded.item(id).unwrap().text(), "Buy oat milk");
    assert_eq!(reloaded.item(other).unwrap().text(), "Walk dog");
}

#[test]
fn save_without_begin_edit_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let mut list = TaskList::load(SqliteTaskStore::try_new(&conn).unwrap()).unwrap();
    let id = list.add("x").unwrap();

    assert!(matches!(list.save_edit(id), Err(TaskError::NotEditing(_))));
}

#[test]
fn remove_deletes_row_and_item() {
    let conn = open_db_in_memory().unwrap();
    let mut list = TaskList::load(SqliteTaskStore::try_new(&conn).unwrap()).unwrap();
    let keep = list.add("keep").unwrap();
    let gone = list.add("gone").unwrap();

    list.remove(gone).unwrap();
    assert_eq!(list.len(), 1);
    assert!(list.item(gone).is_none());

    let reloaded = TaskList::load(SqliteTaskStore::try_new(&conn).unwrap()).unwrap();
    assert_eq!(reloaded.len(), 1);
    assert!(reloaded.item(gone).is_none());
    assert!(reloaded.item(keep).is_some());
}

#[test]
fn remove_keeps_visible_item_when_row_delete_fails() {
    let conn = open_db_in_memory().unwrap();
    let mut list = TaskList::load(SqliteTaskStore::try_new(&conn).unwrap()).unwrap();
    let id = list.add("deleted elsewhere").unwrap();

    conn.execute("DELETE FROM tasks_table WHERE task_id = ?1;", [id])
        .unwrap();

    let err = list.remove(id).unwrap_err();
    assert!(matches!(err, TaskError::Store(StoreError::NotFound(_))));
    assert!(list.item(id).is_some());
}

#[test]
fn stale_item_operations_surface_not_found() {
    let conn = open_db_in_memory().unwrap();
    let mut list = TaskList::load(SqliteTaskStore::try_new(&conn).unwrap()).unwrap();
    let id = list.add("stale").unwrap();
    conn.execute("DELETE FROM tasks_table;", []).unwrap();

    assert!(list.toggle_done(id).unwrap_err().is_not_found());
    assert!(!list.item(id).unwrap().done());

    list.begin_edit(id).unwrap();
    list.set_draft(id, "renamed").unwrap();
    assert!(list.save_edit(id).unwrap_err().is_not_found());
    assert_eq!(list.item(id).unwrap().text(), "stale");
}

#[test]
fn unknown_ids_are_rejected() {
    let conn = open_db_in_memory().unwrap();
    let mut list = TaskList::load(SqliteTaskStore::try_new(&conn).unwrap()).unwrap();

    assert!(matches!(list.remove(5), Err(TaskError::UnknownTask(5))));
    assert!(matches!(list.begin_edit(5), Err(TaskError::UnknownTask(5))));
    assert!(matches!(list.move_up(5), Err(TaskError::UnknownTask(5))));
}

#[test]
fn unavailable_store_keeps_in_memory_state() {
    let conn = open_db_in_memory().unwrap();
    let mut list = TaskList::load(SqliteTaskStore::try_new(&conn).unwrap()).unwrap();
    let id = list.add("before outage").unwrap();
    conn.execute_batch("DROP TABLE tasks_table;").unwrap();

    let add_err = list.add("during outage").unwrap_err();
    assert!(add_err.is_unavailable());
    assert_eq!(list.len(), 1);

    assert!(list.reload().unwrap_err().is_unavailable());
    assert_eq!(list.len(), 1);
    assert!(list.item(id).is_some());
}

#[test]
fn round_trip_through_file_restart_preserves_pairs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.sqlite");
    let expected: HashSet<(String, bool)> = [
        ("Buy milk", false),
        ("Walk dog", true),
        ("Pay rent", true),
        ("Read book", false),
    ]
    .into_iter()
    .map(|(text, done)| (text.to_string(), done))
    .collect();

    {
        let conn = open_db(&path).unwrap();
        let mut list = TaskList::load(SqliteTaskStore::try_new(&conn).unwrap()).unwrap();
        for (text, done) in &expected {
            let id = list.add(text).unwrap();
            list.set_done(id, *done).unwrap();
        }
    }

    let conn = open_db(&path).unwrap();
    let list = TaskList::load(SqliteTaskStore::try_new(&conn).unwrap()).unwrap();
    let actual: HashSet<(String, bool)> = list
        .items()
        .iter()
        .map(|item| (item.text().to_string(), item.done()))
        .collect();
    assert_eq!(list.len(), expected.len());
    assert_eq!(actual, expected);
}

#[test]
fn loading_twice_yields_same_view() {
    let conn = open_db_in_memory().unwrap();
    let mut list = TaskList::load(SqliteTaskStore::try_new(&conn).unwrap()).unwrap();
    list.add("one").unwrap();
    let two = list.add("two").unwrap();
    list.toggle_done(two).unwrap();

    let first = TaskList::load(SqliteTaskStore::try_new(&conn).unwrap())
        .unwrap()
        .view();
    let second = TaskList::load(SqliteTaskStore::try_new(&conn).unwrap())
        .unwrap()
        .view();
    assert_eq!(first, second);
    assert_eq!(first.items, list.view().items);
}

#[test]
fn move_up_and_down_persist_order() {
    let conn = open_db_in_memory().unwrap();
    let mut list = TaskList::load(SqliteTaskStore::try_new(&conn).unwrap()).unwrap();
    let a = list.add("a").unwrap();
    let b = list.add("b").unwrap();
    let c = list.add("c").unwrap();

    list.move_up(c).unwrap();
    list.move_up(a).unwrap();
    list.move_down(c).unwrap();
    let visible: Vec<_> = list.items().iter().map(|item| item.id()).collect();
    assert_eq!(visible, vec![a, b, c]);

    list.move_down(a).unwrap();
    list.move_down(c).unwrap();
    let visible: Vec<_> = list.items().iter().map(|item| item.id()).collect();
    assert_eq!(visible, vec![b, a, c]);

    let reloaded = TaskList::load(SqliteTaskStore::try_new(&conn).unwrap()).unwrap();
    let persisted: Vec<_> = reloaded.items().iter().map(|item| item.id()).collect();
    assert_eq!(persisted, visible);
}

#[test]
fn move_with_stale_rows_keeps_visible_and_persisted_order_aligned() {
    let conn = open_db_in_memory().unwrap();
    let mut list = TaskList::load(SqliteTaskStore::try_new(&conn).unwrap()).unwrap();
    let a = list.add("a").unwrap();
    let b = list.add("b").unwrap();
    let c = list.add("c").unwrap();
    let d = list.add("d").unwrap();

    conn.execute("DELETE FROM tasks_table WHERE task_id = ?1;", [a])
        .unwrap();

    list.move_up(d).unwrap();
    let visible: Vec<_> = list
        .items()
        .iter()
        .map(|item| item.id())
        .filter(|id| *id != a)
        .collect();
    assert_eq!(visible, vec![b, d, c]);

    let reloaded = TaskList::load(SqliteTaskStore::try_new(&conn).unwrap()).unwrap();
    let persisted: Vec<_> = reloaded.items().iter().map(|item| item.id()).collect();
    assert_eq!(persisted, visible);

    // The stale row is the neighbour: nothing moves.
    let err = list.move_up(b).unwrap_err();
    assert!(matches!(err, TaskError::Store(StoreError::NotFound(id)) if id == a));
    let visible: Vec<_> = list.items().iter().map(|item| item.id()).collect();
    assert_eq!(visible, vec![a, b, d, c]);
}

#[test]
fn remove_while_editing_deletes_row_and_item() {
    let conn = open_db_in_memory().unwrap();
    let mut list = TaskList::load(SqliteTaskStore::try_new(&conn).unwrap()).unwrap();
    let keep = list.add("keep").unwrap();
    let id = list.add("half edited").unwrap();

    list.begin_edit(id).unwrap();
    list.set_draft(id, "never saved").unwrap();
    list.remove(id).unwrap();

    assert!(list.item(id).is_none());
    assert!(list.store().get(id).unwrap().is_none());
    assert_eq!(row_count(&conn), 1);
    assert!(list.item(keep).is_some());
}

#[test]
fn accepted_text_is_stored_as_typed() {
    let conn = open_db_in_memory().unwrap();
    let mut list = TaskList::load(SqliteTaskStore::try_new(&conn).unwrap()).unwrap();

    let id = list.add("  Buy milk ").unwrap();
    assert_eq!(list.item(id).unwrap().text(), "  Buy milk ");
    assert_eq!(list.store().get(id).unwrap().unwrap().text, "  Buy milk ");

    list.begin_edit(id).unwrap();
    list.set_draft(id, " Call mom").unwrap();
    list.save_edit(id).unwrap();
    assert_eq!(list.store().get(id).unwrap().unwrap().text, " Call mom");
}

#[test]
fn view_serializes_for_rendering_layers() {
    let conn = open_db_in_memory().unwrap();
    let mut list = TaskList::load(SqliteTaskStore::try_new(&conn).unwrap()).unwrap();
    let id = list.add("Buy milk").unwrap();
    list.begin_edit(id).unwrap();
    list.set_input("next");

    let json = serde_json::to_value(list.view()).unwrap();
    assert_eq!(json["input"], "next");
    assert_eq!(json["items"][0]["id"], id);
    assert_eq!(json["items"][0]["text"], "Buy milk");
    assert_eq!(json["items"][0]["done"], false);
    assert_eq!(json["items"][0]["editing"], true);
    assert_eq!(json["items"][0]["draft"], "Buy milk");
}
