#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

//! Bounded, newest-first history of successful generations
//!
//! The log lives in memory for the session and is written back wholesale to
//! a single storage slot after every append. Durability is best effort.

mod entry;
mod error;
mod storage;
mod store;

pub use entry::{HistoryEntry, HistoryLog, MAX_HISTORY};
pub use error::{HistoryError, Result};
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use store::HistoryStore;
