//! Reminder payloads and the notifier seam.
//!
//! # Responsibility
//! - Describe the notification channel the shell registers once.
//! - Build one reminder per task with normalized, length-capped text.
//! - Post reminders best-effort through an injected `Notifier`.
//!
//! # Invariants
//! - Reminder body never contains line breaks and never exceeds
//!   `MAX_REMINDER_BODY_CHARS` characters (plus an ellipsis).
//! - Task text is never written to logs.

use crate::model::task::{Task, TaskId};
use log::{info, warn};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const REMINDER_CHANNEL_ID: &str = "task_reminders";
pub const REMINDER_TITLE: &str = "Your Task";
pub const MAX_REMINDER_BODY_CHARS: usize = 240;

static WHITESPACE_RE: Lazy<regex::Regex> =
    Lazy::new(|| regex::Regex::new(r"\s+").expect("valid ws regex"));

/// Delivery priority requested for the reminder channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Importance {
    Default,
    High,
}

/// Channel metadata registered by the platform shell before posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderChannel {
    pub id: String,
    pub name: String,
    pub description: String,
    pub importance: Importance,
}

impl Default for ReminderChannel {
    fn default() -> Self {
        Self {
            id: REMINDER_CHANNEL_ID.to_string(),
            name: "Mdhe Notify".to_string(),
            description: "Will be used to send you timely notifications about your tasks"
                .to_string(),
            importance: Importance::High,
        }
    }
}

/// One local notification request about a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub channel_id: String,
    pub title: String,
    pub body: String,
    /// Source task, when it has been persisted.
    pub task_id: Option<TaskId>,
}

impl Reminder {
    /// Builds the reminder shown for `task`.
    ///
    /// Body is `"<title>: <description>"`, or whichever part is non-empty.
    pub fn for_task(task: &Task) -> Self {
        let title = collapse_whitespace(&task.title);
        let description = collapse_whitespace(&task.description);
        let text = match (title.is_empty(), description.is_empty()) {
            (false, false) => format!("{title}: {description}"),
            (false, true) => title,
            (true, _) => description,
        };

        Self {
            channel_id: REMINDER_CHANNEL_ID.to_string(),
            title: REMINDER_TITLE.to_string(),
            body: truncate_chars(&text, MAX_REMINDER_BODY_CHARS),
            task_id: task.persisted_id(),
        }
    }
}

/// Failure reported by a notifier backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyError {
    /// Backend cannot post right now (no permission, no channel).
    Unavailable(String),
    /// Backend refused this particular reminder.
    Rejected(String),
}

impl Display for NotifyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(reason) => write!(f, "notifier unavailable: {reason}"),
            Self::Rejected(reason) => write!(f, "reminder rejected: {reason}"),
        }
    }
}

impl Error for NotifyError {}

/// Platform hook that displays reminders.
pub trait Notifier {
    fn post(&self, reminder: &Reminder) -> Result<(), NotifyError>;
}

/// Notifier that only records a metadata line in the core log.
///
/// Used where no platform notification service is attached (CLI, tests).
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn post(&self, reminder: &Reminder) -> Result<(), NotifyError> {
        info!(
            "event=reminder_post module=notify status=ok channel={} task_id={} body_chars={}",
            reminder.channel_id,
            reminder
                .task_id
                .map_or_else(|| "none".to_string(), |id| id.to_string()),
            reminder.body.chars().count()
        );
        Ok(())
    }
}

/// Builds and posts a reminder for `task`.
///
/// Returns whether the notifier accepted it.
pub fn post_reminder(notifier: &dyn Notifier, task: &Task) -> bool {
    let reminder = Reminder::for_task(task);
    match notifier.post(&reminder) {
        Ok(()) => true,
        Err(err) => {
            warn!(
                "event=reminder_post module=notify status=error task_id={} error={}",
                reminder
                    .task_id
                    .map_or_else(|| "none".to_string(), |id| id.to_string()),
                err
            );
            false
        }
    }
}

fn collapse_whitespace(value: &str) -> String {
    WHITESPACE_RE.replace_all(value, " ").trim().to_string()
}

fn truncate_chars(value: &str, max_chars: usize) -> String {
    let mut truncated = value.chars().take(max_chars).collect::<String>();
    if value.chars().count() > max_chars {
        truncated.push_str("...");
    }
    truncated
}
