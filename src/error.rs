//! Error types for the task store

use crate::models::TaskId;
use thiserror::Error;

/// Routine, recoverable outcomes of store commands.
///
/// Neither variant leaves the store modified.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Task name cannot be empty")]
    EmptyName,

    #[error("No task with id {id} (store holds {len} tasks)")]
    NotFound { id: TaskId, len: usize },
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
