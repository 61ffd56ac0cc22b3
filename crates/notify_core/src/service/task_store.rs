//! Process-wide task store with snapshot publishing.
//!
//! # Responsibility
//! - Own the single SQLite connection used for task rows.
//! - Publish an immutable full-list snapshot after every mutation.
//!
//! # Invariants
//! - All SQL access is serialized by one connection lock.
//! - A snapshot is published while the lock is still held, so revisions
//!   observed by subscribers follow mutation order.
//! - Revision `0` is the state loaded at open; each publish adds one.
//! - Mutations that change nothing (unknown-id delete) do not publish.
//! - A committed write is reported as success even when re-reading the list
//!   fails; the snapshot is then marked stale and re-read on the next
//!   `snapshot()` call or mutation.

use crate::db::{open_db, open_db_in_memory, DbError};
use crate::model::task::{Task, TaskId};
use crate::repo::task_repo::{RepoError, RepoResult, SqliteTaskRepository, TaskRepository};
use log::{debug, error, info};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::sync::watch;

pub type StoreResult<T> = Result<T, StoreError>;

/// Error for store-level operations.
#[derive(Debug)]
pub enum StoreError {
    /// Opening or migrating the database failed.
    Db(DbError),
    /// A repository operation failed.
    Repo(RepoError),
    /// A previous holder of the connection lock panicked.
    LockPoisoned,
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::LockPoisoned => write!(f, "task store connection lock poisoned"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::LockPoisoned => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Immutable full task list as seen after one mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskSnapshot {
    /// Publish counter, starting at `0` for the state loaded at open.
    pub revision: u64,
    /// Every stored task ordered by id.
    pub tasks: Arc<Vec<Task>>,
}

impl TaskSnapshot {
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Subscriber handle for the live task list.
pub type TaskSubscription = watch::Receiver<TaskSnapshot>;

/// SQLite-backed task store.
///
/// Construct once and share it as `Arc<TaskStore>`; every view-model or FFI
/// entry point receives the same instance.
pub struct TaskStore {
    conn: Mutex<Connection>,
    snapshots: watch::Sender<TaskSnapshot>,
    /// Set when a committed write could not be followed by a publish.
    stale: AtomicBool,
}

impl TaskStore {
    /// Opens (or creates) a task database file.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::from_connection(open_db(path)?)
    }

    /// Opens a throwaway in-memory task database.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::from_connection(open_db_in_memory()?)
    }

    /// Wraps an already migrated connection and loads the initial snapshot.
    ///
    /// # Errors
    /// - Repository readiness errors when `conn` was not opened through
    ///   [`open_db`]/[`open_db_in_memory`].
    pub fn from_connection(conn: Connection) -> StoreResult<Self> {
        let tasks = SqliteTaskRepository::try_new(&conn)?.list_tasks()?;
        info!(
            "event=store_open module=store status=ok task_count={}",
            tasks.len()
        );
        let (snapshots, _) = watch::channel(TaskSnapshot {
            revision: 0,
            tasks: Arc::new(tasks),
        });
        Ok(Self {
            conn: Mutex::new(conn),
            snapshots,
            stale: AtomicBool::new(false),
        })
    }

    /// Returns a receiver that observes every future snapshot.
    ///
    /// The receiver starts with the current snapshot marked as seen; a slow
    /// subscriber may skip intermediate revisions but always ends on the
    /// latest one.
    pub fn subscribe(&self) -> TaskSubscription {
        self.snapshots.subscribe()
    }

    /// Returns the most recently published snapshot.
    ///
    /// Retries a pending refresh first when an earlier write committed but
    /// its snapshot could not be read back.
    pub fn snapshot(&self) -> TaskSnapshot {
        if self.stale.load(Ordering::Acquire) {
            if let Ok(conn) = self.conn.lock() {
                self.refresh(&SqliteTaskRepository::assume_ready(&conn), "snapshot");
            }
        }
        self.snapshots.borrow().clone()
    }

    /// Inserts a new task or replaces the row with the same id.
    ///
    /// Returns the id of the stored row.
    pub fn upsert(&self, task: &Task) -> StoreResult<TaskId> {
        self.mutate("task_upsert", task.persisted_id(), |repo| {
            repo.upsert_task(task).map(|id| (id, true))
        })
    }

    /// Replaces title/description of an existing task.
    ///
    /// # Errors
    /// - `RepoError::MissingId` when `task` was never persisted.
    /// - `RepoError::NotFound` when no row has that id.
    pub fn update(&self, task: &Task) -> StoreResult<()> {
        self.mutate("task_update", task.persisted_id(), |repo| {
            repo.update_task(task).map(|()| ((), true))
        })
    }

    /// Deletes the row matching the task's id.
    ///
    /// Returns `false` (and publishes nothing) when no row matched.
    pub fn delete(&self, task: &Task) -> StoreResult<bool> {
        self.mutate("task_delete", task.persisted_id(), |repo| {
            repo.delete_task(task).map(|removed| (removed, removed))
        })
    }

    fn mutate<T>(
        &self,
        event: &'static str,
        task_id: Option<TaskId>,
        op: impl FnOnce(&SqliteTaskRepository<'_>) -> RepoResult<(T, bool)>,
    ) -> StoreResult<T> {
        let started_at = Instant::now();
        let conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        let repo = SqliteTaskRepository::assume_ready(&conn);

        match op(&repo) {
            Ok((value, changed)) => {
                if changed || self.stale.load(Ordering::Acquire) {
                    self.refresh(&repo, event);
                }
                debug!(
                    "event={} module=store status=ok task_id={} changed={} duration_ms={}",
                    event,
                    format_task_id(task_id),
                    changed,
                    started_at.elapsed().as_millis()
                );
                Ok(value)
            }
            Err(err) => {
                error!(
                    "event={} module=store status=error task_id={} duration_ms={} error={}",
                    event,
                    format_task_id(task_id),
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err.into())
            }
        }
    }

    /// Re-reads the table and publishes it. Caller must hold the connection lock.
    fn refresh(&self, repo: &SqliteTaskRepository<'_>, trigger: &'static str) {
        match repo.list_tasks() {
            Ok(tasks) => {
                self.publish(tasks);
                self.stale.store(false, Ordering::Release);
            }
            Err(err) => {
                self.stale.store(true, Ordering::Release);
                error!(
                    "event=snapshot_refresh module=store status=error trigger={} error={}",
                    trigger, err
                );
            }
        }
    }

    fn publish(&self, tasks: Vec<Task>) {
        self.snapshots.send_modify(|snapshot| {
            snapshot.revision += 1;
            snapshot.tasks = Arc::new(tasks);
        });
    }
}

fn format_task_id(task_id: Option<TaskId>) -> String {
    task_id.map_or_else(|| "new".to_string(), |id| id.to_string())
}
