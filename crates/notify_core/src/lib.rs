//! Core domain logic for the Notify task list.
//! This crate is the single source of truth for task persistence invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod notify;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::task::{Task, TaskId};
pub use notify::reminder::{
    post_reminder, Importance, LogNotifier, Notifier, NotifyError, Reminder, ReminderChannel,
};
pub use repo::task_repo::{RepoError, RepoResult, SqliteTaskRepository, TaskRepository};
pub use service::task_store::{StoreError, StoreResult, TaskSnapshot, TaskStore, TaskSubscription};
pub use service::task_view_model::TaskViewModel;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
