//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `notify_core` linkage.
//! - Exercise the store and reminder path against an in-memory database.

use notify_core::db::migrations::latest_version;
use notify_core::{post_reminder, LogNotifier, Task, TaskStore};

fn main() {
    println!("notify_core ping={}", notify_core::ping());
    println!("notify_core version={}", notify_core::core_version());
    println!("notify_core schema_version={}", latest_version());

    match smoke_store() {
        Ok(count) => println!("notify_core store=ok tasks={count}"),
        Err(err) => {
            eprintln!("notify_core store=error error={err}");
            std::process::exit(1);
        }
    }
}

fn smoke_store() -> Result<usize, notify_core::StoreError> {
    let store = TaskStore::open_in_memory()?;
    let id = store.upsert(&Task::new("Title 1", "Description 1"))?;
    let snapshot = store.snapshot();
    if let Some(task) = snapshot.tasks.iter().find(|task| task.id == Some(id)) {
        post_reminder(&LogNotifier, task);
    }
    Ok(snapshot.len())
}
