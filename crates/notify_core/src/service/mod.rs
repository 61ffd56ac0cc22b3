//! Core use-case services.
//!
//! # Responsibility
//! - Own the shared task store and its snapshot channel.
//! - Adapt store operations to UI-facing fire-and-forget calls.

pub mod task_store;
pub mod task_view_model;
