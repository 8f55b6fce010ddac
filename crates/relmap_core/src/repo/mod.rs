//! Repository layer for persisted type reference snapshots.
//!
//! # Responsibility
//! - Define snapshot storage contracts.
//! - Isolate SQLite query details from type resolution.

pub mod snapshot_repo;
