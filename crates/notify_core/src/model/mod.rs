//! Task domain model.
//!
//! # Invariants
//! - `Task` is the only persisted entity.
//! - Identity is store-assigned; unsaved tasks carry no id.

pub mod task;
