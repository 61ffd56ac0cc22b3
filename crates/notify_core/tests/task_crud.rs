use notify_core::db::migrations::latest_version;
use notify_core::db::open_db_in_memory;
use notify_core::{RepoError, SqliteTaskRepository, Task, TaskRepository};
use rusqlite::Connection;

#[test]
fn upsert_without_id_assigns_fresh_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let first = repo.upsert_task(&Task::new("buy milk", "2 litres")).unwrap();
    let second = repo.upsert_task(&Task::new("call mom", "")).unwrap();
    assert_ne!(first, second);

    let tasks = repo.list_tasks().unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0], Task::with_id(first, "buy milk", "2 litres"));
    assert_eq!(tasks[1], Task::with_id(second, "call mom", ""));
}

#[test]
fn upsert_with_zero_id_is_an_insert() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let id = repo.upsert_task(&Task::with_id(0, "a", "b")).unwrap();
    assert!(id > 0);
    assert_eq!(repo.list_tasks().unwrap().len(), 1);
}

#[test]
fn upsert_with_existing_id_replaces_in_place() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let id = repo.upsert_task(&Task::new("draft", "body")).unwrap();
    repo.upsert_task(&Task::new("other", "row")).unwrap();

    let returned = repo
        .upsert_task(&Task::with_id(id, "final", "new body"))
        .unwrap();
    assert_eq!(returned, id);

    let tasks = repo.list_tasks().unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0], Task::with_id(id, "final", "new body"));
}

#[test]
fn upsert_with_unknown_positive_id_inserts_that_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let id = repo.upsert_task(&Task::with_id(42, "imported", "")).unwrap();
    assert_eq!(id, 42);

    let next = repo.upsert_task(&Task::new("after", "")).unwrap();
    assert!(next > 42);
}

#[test]
fn repeated_upsert_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let id = repo.upsert_task(&Task::new("same", "content")).unwrap();
    let task = Task::with_id(id, "same", "content");
    repo.upsert_task(&task).unwrap();
    let once = repo.list_tasks().unwrap();
    repo.upsert_task(&task).unwrap();
    let twice = repo.list_tasks().unwrap();

    assert_eq!(once, twice);
    assert_eq!(twice, vec![task]);
}

#[test]
fn empty_title_and_description_are_accepted() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let id = repo.upsert_task(&Task::new("", "")).unwrap();
    assert_eq!(repo.list_tasks().unwrap(), vec![Task::with_id(id, "", "")]);
}

#[test]
fn update_existing_task() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let id = repo.upsert_task(&Task::new("draft", "")).unwrap();
    repo.update_task(&Task::with_id(id, "draft", "filled in"))
        .unwrap();

    assert_eq!(
        repo.list_tasks().unwrap(),
        vec![Task::with_id(id, "draft", "filled in")]
    );
}

#[test]
fn update_requires_persisted_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let err = repo.update_task(&Task::new("unsaved", "")).unwrap_err();
    assert!(matches!(err, RepoError::MissingId));
}

#[test]
fn update_not_found_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let err = repo.update_task(&Task::with_id(5, "ghost", "")).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(5)));
    assert!(repo.list_tasks().unwrap().is_empty());
}

#[test]
fn delete_removes_exactly_one_row() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let keep = repo.upsert_task(&Task::new("keep", "")).unwrap();
    let drop_id = repo.upsert_task(&Task::new("drop", "")).unwrap();

    assert!(repo.delete_task(&Task::with_id(drop_id, "", "")).unwrap());

    let tasks = repo.list_tasks().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, Some(keep));
}

#[test]
fn delete_of_absent_or_unsaved_task_is_noop() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();
    repo.upsert_task(&Task::new("only", "")).unwrap();

    assert!(!repo.delete_task(&Task::with_id(999, "", "")).unwrap());
    assert!(!repo.delete_task(&Task::new("unsaved", "")).unwrap());
    assert_eq!(repo.list_tasks().unwrap().len(), 1);
}

#[test]
fn deleted_ids_are_never_reused() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let first = repo.upsert_task(&Task::new("one", "")).unwrap();
    repo.delete_task(&Task::with_id(first, "", "")).unwrap();
    let second = repo.upsert_task(&Task::new("two", "")).unwrap();

    assert!(second > first);
}

#[test]
fn end_to_end_create_edit_delete() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();
    assert!(repo.list_tasks().unwrap().is_empty());

    repo.upsert_task(&Task::new("Title 1", "Description 1"))
        .unwrap();
    assert_eq!(
        repo.list_tasks().unwrap(),
        vec![Task::with_id(1, "Title 1", "Description 1")]
    );

    repo.upsert_task(&Task::with_id(1, "Title 1 edited", "Description 1"))
        .unwrap();
    assert_eq!(
        repo.list_tasks().unwrap(),
        vec![Task::with_id(1, "Title 1 edited", "Description 1")]
    );

    assert!(repo
        .delete_task(&Task::with_id(1, "Title 1 edited", "Description 1"))
        .unwrap());
    assert!(repo.list_tasks().unwrap().is_empty());
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let result = SqliteTaskRepository::try_new(&conn);
    match result {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert!(expected_version > 0),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_task_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteTaskRepository::try_new(&conn);
    assert!(matches!(result, Err(RepoError::MissingRequiredTable("task"))));
}

#[test]
fn repository_rejects_connection_missing_task_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE task (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteTaskRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "task",
            column: "description"
        })
    ));
}
