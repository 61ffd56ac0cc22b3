//! Flutter-facing bindings for the Notify task core.
//!
//! # Responsibility
//! - Expose use-case level APIs to the mobile shell via flutter_rust_bridge.
//! - Own the process-wide task store instance.

pub mod api;
