//! Local reminder requests built from tasks.
//!
//! # Responsibility
//! - Shape task text into a notification payload the platform shell shows.
//! - Hand payloads to a pluggable `Notifier` on a best-effort basis.
//!
//! # Invariants
//! - Posting never fails the caller; failures are logged and reported as
//!   `false`.

pub mod reminder;
