use notify_core::db::open_db_in_memory;
use notify_core::{RepoError, StoreError, Task, TaskStore};
use rusqlite::Connection;

#[test]
fn every_mutation_publishes_a_newer_snapshot() {
    let store = TaskStore::open_in_memory().unwrap();
    let mut subscription = store.subscribe();
    assert!(!subscription.has_changed().unwrap());

    let id = store.upsert(&Task::new("Title 1", "Description 1")).unwrap();
    assert!(subscription.has_changed().unwrap());
    let after_insert = subscription.borrow_and_update().clone();
    assert_eq!(after_insert.revision, 1);
    assert_eq!(
        after_insert.tasks.as_slice(),
        &[Task::with_id(id, "Title 1", "Description 1")]
    );

    store
        .update(&Task::with_id(id, "Title 1 edited", "Description 1"))
        .unwrap();
    let after_update = subscription.borrow_and_update().clone();
    assert_eq!(after_update.revision, 2);
    assert_eq!(after_update.tasks[0].title, "Title 1 edited");

    assert!(store.delete(&Task::with_id(id, "", "")).unwrap());
    let after_delete = subscription.borrow_and_update().clone();
    assert_eq!(after_delete.revision, 3);
    assert!(after_delete.is_empty());
}

#[test]
fn noop_delete_does_not_publish() {
    let store = TaskStore::open_in_memory().unwrap();
    store.upsert(&Task::new("keep", "")).unwrap();
    let subscription = store.subscribe();

    assert!(!store.delete(&Task::with_id(404, "", "")).unwrap());
    assert!(!subscription.has_changed().unwrap());
    assert_eq!(store.snapshot().revision, 1);
    assert_eq!(store.snapshot().len(), 1);
}

#[test]
fn all_subscribers_see_the_same_snapshot() {
    let store = TaskStore::open_in_memory().unwrap();
    let first = store.subscribe();
    let second = store.subscribe();

    store.upsert(&Task::new("shared", "")).unwrap();

    assert_eq!(*first.borrow(), *second.borrow());
    assert_eq!(*first.borrow(), store.snapshot());
}

#[test]
fn older_snapshots_stay_immutable() {
    let store = TaskStore::open_in_memory().unwrap();
    store.upsert(&Task::new("one", "")).unwrap();
    let held = store.snapshot();

    store.upsert(&Task::new("two", "")).unwrap();

    assert_eq!(held.len(), 1);
    assert_eq!(store.snapshot().len(), 2);
}

#[test]
fn update_errors_are_returned_and_not_published() {
    let store = TaskStore::open_in_memory().unwrap();

    let err = store.update(&Task::new("unsaved", "")).unwrap_err();
    assert!(matches!(err, StoreError::Repo(RepoError::MissingId)));
    assert_eq!(store.snapshot().revision, 0);
}

#[test]
fn reopening_file_store_restores_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.db");

    let deleted = {
        let store = TaskStore::open(&path).unwrap();
        store.upsert(&Task::new("persisted", "across restarts")).unwrap();
        let doomed = store.upsert(&Task::new("doomed", "")).unwrap();
        store.delete(&Task::with_id(doomed, "", "")).unwrap();
        doomed
    };

    let store = TaskStore::open(&path).unwrap();
    let snapshot = store.snapshot();
    assert_eq!(snapshot.revision, 0);
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot.tasks[0].title, "persisted");

    let fresh = store.upsert(&Task::new("fresh", "")).unwrap();
    assert!(fresh > deleted);
}

#[test]
fn from_connection_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();
    let err = TaskStore::from_connection(conn).err().unwrap();
    assert!(matches!(
        err,
        StoreError::Repo(RepoError::UninitializedConnection { .. })
    ));
}

#[test]
fn from_connection_loads_existing_rows() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO task (title, description) VALUES ('seeded', 'row');",
        [],
    )
    .unwrap();

    let store = TaskStore::from_connection(conn).unwrap();
    assert_eq!(
        store.snapshot().tasks.as_slice(),
        &[Task::with_id(1, "seeded", "row")]
    );
}

#[test]
fn store_is_shareable_across_threads() {
    let store = std::sync::Arc::new(TaskStore::open_in_memory().unwrap());
    let handles = (0..4)
        .map(|worker| {
            let store = std::sync::Arc::clone(&store);
            std::thread::spawn(move || {
                for n in 0..5 {
                    store
                        .upsert(&Task::new(format!("w{worker}-{n}"), ""))
                        .unwrap();
                }
            })
        })
        .collect::<Vec<_>>();
    for handle in handles {
        handle.join().unwrap();
    }

    let snapshot = store.snapshot();
    assert_eq!(snapshot.len(), 20);
    assert_eq!(snapshot.revision, 20);
}

#[test]
fn committed_write_succeeds_even_when_list_reload_fails() {
    let conn = open_db_in_memory().unwrap();
    // Turns the marked row's title into a BLOB so reading the list fails.
    conn.execute_batch(
        "CREATE TRIGGER corrupt_marked_title AFTER INSERT ON task
         WHEN NEW.title = 'unreadable'
         BEGIN
            UPDATE task SET title = x'00' WHERE id = NEW.id;
         END;",
    )
    .unwrap();
    let store = TaskStore::from_connection(conn).unwrap();

    let bad_id = store.upsert(&Task::new("unreadable", "")).unwrap();
    assert_eq!(store.snapshot().revision, 0);

    store.upsert(&Task::new("readable", "")).unwrap();
    assert_eq!(store.snapshot().revision, 0);

    assert!(store.delete(&Task::with_id(bad_id, "", "")).unwrap());
    let snapshot = store.snapshot();
    assert_eq!(snapshot.revision, 1);
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot.tasks[0].title, "readable");
}

