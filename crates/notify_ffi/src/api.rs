//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable task list/add/update/delete/reminder functions to Dart.
//! - Act as the composition root: one `TaskStore` per process, opened on
//!   first use.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Failures come back as `ok=false` envelopes with a message.

use log::error;
use notify_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    Reminder, ReminderChannel, StoreError, Task, TaskStore,
};
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

const TASK_DB_FILE_NAME: &str = "notify_tasks.sqlite3";
const TASK_DB_PATH_ENV: &str = "NOTIFY_DB_PATH";
static TASK_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static TASK_STORE: OnceLock<Arc<TaskStore>> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// One task row as seen by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItem {
    pub id: i64,
    pub title: String,
    pub description: String,
}

/// Full-list response for task screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListResponse {
    pub ok: bool,
    /// Every stored task ordered by id.
    pub items: Vec<TaskItem>,
    /// Snapshot revision; changes whenever the list changes.
    pub revision: u64,
    pub message: String,
}

/// Result envelope for task mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskActionResponse {
    pub ok: bool,
    /// Affected task id, when known.
    pub task_id: Option<i64>,
    pub message: String,
}

impl TaskActionResponse {
    fn success(message: impl Into<String>, task_id: i64) -> Self {
        Self {
            ok: true,
            task_id: Some(task_id),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            task_id: None,
            message: message.into(),
        }
    }
}

/// Notification payload the shell posts for a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderResponse {
    pub ok: bool,
    pub channel_id: String,
    pub title: String,
    pub body: String,
    pub message: String,
}

/// Channel registration data for the shell's notification setup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderChannelInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub high_importance: bool,
}

/// Returns the current task list.
///
/// # FFI contract
/// - Sync call, reads the in-memory snapshot (no SQL after first open).
#[flutter_rust_bridge::frb(sync)]
pub fn tasks_list() -> TaskListResponse {
    match task_store() {
        Ok(store) => {
            let snapshot = store.snapshot();
            let items = snapshot
                .tasks
                .iter()
                .filter_map(to_task_item)
                .collect::<Vec<_>>();
            TaskListResponse {
                ok: true,
                message: format!("{} task(s).", items.len()),
                items,
                revision: snapshot.revision,
            }
        }
        Err(err) => TaskListResponse {
            ok: false,
            items: Vec::new(),
            revision: 0,
            message: format!("tasks_list failed: {err}"),
        },
    }
}

/// Creates a task. Empty title/description are accepted.
#[flutter_rust_bridge::frb(sync)]
pub fn task_add(title: String, description: String) -> TaskActionResponse {
    match task_store().and_then(|store| store.upsert(&Task::new(title, description))) {
        Ok(id) => TaskActionResponse::success("Task created.", id),
        Err(err) => TaskActionResponse::failure(format!("task_add failed: {err}")),
    }
}

/// Saves edited title/description, creating the row when it is absent.
///
/// A non-positive `task_id` creates a new task; the returned `task_id` is
/// always the stored row id.
#[flutter_rust_bridge::frb(sync)]
pub fn task_update(task_id: i64, title: String, description: String) -> TaskActionResponse {
    let task = Task::with_id(task_id, title, description);
    match task_store().and_then(|store| store.upsert(&task)) {
        Ok(id) => TaskActionResponse::success("Task saved.", id),
        Err(err) => TaskActionResponse::failure(format!("task_update failed: {err}")),
    }
}

/// Deletes a task. Unknown ids succeed as a no-op.
#[flutter_rust_bridge::frb(sync)]
pub fn task_delete(task_id: i64) -> TaskActionResponse {
    let task = Task::with_id(task_id, "", "");
    match task_store().and_then(|store| store.delete(&task)) {
        Ok(true) => TaskActionResponse::success("Task deleted.", task_id),
        Ok(false) => TaskActionResponse::success("Task already absent.", task_id),
        Err(err) => TaskActionResponse::failure(format!("task_delete failed: {err}")),
    }
}

/// Builds the reminder payload for a stored task.
#[flutter_rust_bridge::frb(sync)]
pub fn task_reminder(task_id: i64) -> ReminderResponse {
    let found = task_store().map(|store| {
        store
            .snapshot()
            .tasks
            .iter()
            .find(|task| task.persisted_id() == Some(task_id))
            .map(Reminder::for_task)
    });

    match found {
        Ok(Some(reminder)) => ReminderResponse {
            ok: true,
            channel_id: reminder.channel_id,
            title: reminder.title,
            body: reminder.body,
            message: String::new(),
        },
        Ok(None) => reminder_failure(format!("task_reminder failed: task not found: {task_id}")),
        Err(err) => reminder_failure(format!("task_reminder failed: {err}")),
    }
}

/// Describes the notification channel the shell registers at startup.
#[flutter_rust_bridge::frb(sync)]
pub fn reminder_channel() -> ReminderChannelInfo {
    let channel = ReminderChannel::default();
    ReminderChannelInfo {
        id: channel.id,
        name: channel.name,
        description: channel.description,
        high_importance: channel.importance == notify_core::Importance::High,
    }
}

fn reminder_failure(message: String) -> ReminderResponse {
    ReminderResponse {
        ok: false,
        channel_id: String::new(),
        title: String::new(),
        body: String::new(),
        message,
    }
}

fn to_task_item(task: &Task) -> Option<TaskItem> {
    Some(TaskItem {
        id: task.persisted_id()?,
        title: task.title.clone(),
        description: task.description.clone(),
    })
}

fn resolve_task_db_path() -> PathBuf {
    TASK_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(TASK_DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(TASK_DB_FILE_NAME)
        })
        .clone()
}

fn task_store() -> Result<Arc<TaskStore>, StoreError> {
    if let Some(store) = TASK_STORE.get() {
        return Ok(Arc::clone(store));
    }

    let store = TaskStore::open(resolve_task_db_path()).map_err(|err| {
        error!("event=store_open module=ffi status=error error={err}");
        err
    })?;
    // A concurrent first call may have won; keep whichever instance landed.
    Ok(Arc::clone(TASK_STORE.get_or_init(|| Arc::new(store))))
}
