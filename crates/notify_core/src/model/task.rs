//! Task record shared by store, view-model and reminders.
//!
//! # Responsibility
//! - Define the single canonical task shape.
//! - Encode the "unsaved" identity convention in one place.
//!
//! # Invariants
//! - A positive `id` identifies exactly one stored row.
//! - `None` or a non-positive `id` means "not persisted yet".
//! - Title and description carry no length or format constraint.

use serde::{Deserialize, Serialize};

/// Store-assigned row identifier (SQLite rowid).
pub type TaskId = i64;

/// User-authored to-do item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Assigned by the store on first insert.
    pub id: Option<TaskId>,
    pub title: String,
    pub description: String,
}

impl Task {
    /// Creates an unsaved task. The store assigns the id on upsert.
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            description: description.into(),
        }
    }

    /// Creates a task bound to an existing (or caller-chosen) row id.
    pub fn with_id(id: TaskId, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            title: title.into(),
            description: description.into(),
        }
    }

    /// Returns the id only when it can address a stored row.
    ///
    /// `Some(0)` is the legacy "unsaved" marker and maps to `None`.
    pub fn persisted_id(&self) -> Option<TaskId> {
        self.id.filter(|id| *id > 0)
    }

    /// Returns whether this task addresses a stored row.
    pub fn is_persisted(&self) -> bool {
        self.persisted_id().is_some()
    }
}
