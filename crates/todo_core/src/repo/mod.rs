//! Store layer contract and SQLite implementation.
//!
//! # Responsibility
//! - Define the narrow CRUD contract the view-model depends on.
//! - Isolate SQL details from task item/list orchestration.
//!
//! # Invariants
//! - Every mutation commits immediately; no call spans another call's
//!   transaction.
//! - Mutations on a missing id return `StoreError::NotFound`, never succeed
//!   silently.

pub mod task_store;
