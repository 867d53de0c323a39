//! Domain model for persisted to-do tasks.
//!
//! # Responsibility
//! - Define the canonical task row shape shared by store and view-model.
//! - Own the only text validation rule: task text must not be blank.
//!
//! # Invariants
//! - Every task is identified by a store-assigned `TaskId`.
//! - Deletion is a hard delete; no tombstones are kept.

pub mod task;
