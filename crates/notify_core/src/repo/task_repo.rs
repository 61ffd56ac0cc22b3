//! Task repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide list/upsert/update/delete over the `task` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Upsert without a persisted id always inserts and lets SQLite assign a
//!   fresh, never-reused id (`AUTOINCREMENT`).
//! - Upsert with a persisted id replaces title/description in place, or
//!   inserts a row with exactly that id when none exists.
//! - Delete of an unknown id is a no-op.
//! - Listing order is `id ASC`.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::task::{Task, TaskId};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const TASK_TABLE: &str = "task";
const TASK_COLUMNS: [&str; 3] = ["id", "title", "description"];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for task persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// No row exists for the requested id.
    NotFound(TaskId),
    /// The operation needs a persisted id but the task has none.
    MissingId,
    /// Connection has not been migrated to the schema this build expects.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::MissingId => write!(f, "task has no persisted id"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it through db::open_db"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for task CRUD operations.
pub trait TaskRepository {
    /// Lists every stored task ordered by id.
    fn list_tasks(&self) -> RepoResult<Vec<Task>>;
    /// Inserts or replaces by id and returns the stored id.
    fn upsert_task(&self, task: &Task) -> RepoResult<TaskId>;
    /// Replaces title/description of an existing row.
    fn update_task(&self, task: &Task) -> RepoResult<()>;
    /// Removes the row with the task's id. Returns whether a row was removed.
    fn delete_task(&self, task: &Task) -> RepoResult<bool>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    /// Constructs a repository after checking the connection is migrated.
    ///
    /// # Errors
    /// - `UninitializedConnection` when `user_version` differs from the
    ///   latest known migration.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when the schema
    ///   was tampered with.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    /// Skips readiness checks for connections validated earlier.
    pub(crate) fn assume_ready(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn list_tasks(&self) -> RepoResult<Vec<Task>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, title, description FROM task ORDER BY id ASC;")?;
        let mut rows = stmt.query([])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }
        Ok(tasks)
    }

    fn upsert_task(&self, task: &Task) -> RepoResult<TaskId> {
        // NULL id makes SQLite allocate the next AUTOINCREMENT value.
        let id = self.conn.query_row(
            "INSERT INTO task (id, title, description)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                description = excluded.description
             RETURNING id;",
            params![
                task.persisted_id(),
                task.title.as_str(),
                task.description.as_str()
            ],
            |row| row.get::<_, TaskId>(0),
        )?;
        Ok(id)
    }

    fn update_task(&self, task: &Task) -> RepoResult<()> {
        let id = task.persisted_id().ok_or(RepoError::MissingId)?;
        let changed = self.conn.execute(
            "UPDATE task
             SET
                title = ?2,
                description = ?3
             WHERE id = ?1;",
            params![id, task.title.as_str(), task.description.as_str()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn delete_task(&self, task: &Task) -> RepoResult<bool> {
        let Some(id) = task.persisted_id() else {
            return Ok(false);
        };
        let changed = self
            .conn
            .execute("DELETE FROM task WHERE id = ?1;", [id])?;
        Ok(changed > 0)
    }
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    Ok(Task {
        id: Some(row.get("id")?),
        title: row.get("title")?,
        description: row.get("description")?,
    })
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, TASK_TABLE)? {
        return Err(RepoError::MissingRequiredTable(TASK_TABLE));
    }

    for column in TASK_COLUMNS {
        if !table_has_column(conn, TASK_TABLE, column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: TASK_TABLE,
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
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

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
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
