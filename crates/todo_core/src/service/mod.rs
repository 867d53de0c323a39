//! Task view-model: item and list state bound to the store.
//!
//! # Responsibility
//! - Translate UI intents (add, edit, toggle, delete, move) into store calls.
//! - Expose plain data snapshots so rendering stays swappable.

pub mod task_item;
pub mod task_list;
