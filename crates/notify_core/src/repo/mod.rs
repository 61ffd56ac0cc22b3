//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from store/view-model orchestration.
//!
//! # Invariants
//! - Repositories only operate on migrated connections.
//! - Repository APIs return semantic errors (`NotFound`, `MissingId`) in
//!   addition to DB transport errors.

pub mod task_repo;
