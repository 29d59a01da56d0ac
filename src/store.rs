// In-memory task store for a single session

use crate::error::{StoreError, StoreResult};
use crate::filter::TaskFilter;
use crate::models::{Task, TaskId, TaskStatus};
use chrono::NaiveDate;
use tracing::{debug, info, warn};

/// Ordered collection of tasks held for the lifetime of a session
///
/// Tasks are addressed by their position in insertion order. Nothing is ever
/// removed individually, so an id stays valid until the next `reset`.
#[derive(Debug, Default, Clone)]
pub struct TaskStore {
    tasks: Vec<Task>,
}

impl TaskStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Drop every task
    pub fn reset(&mut self) {
        info!(cleared = self.tasks.len(), "Resetting task store");
        self.tasks.clear();
    }

    /// Append a task and return its id
    ///
    /// An empty name is rejected with `StoreError::EmptyName` and the store
    /// is left untouched. Any other name, whitespace included, is stored as is.
    pub fn add(
        &mut self,
        framework: impl Into<String>,
        name: impl Into<String>,
        status: TaskStatus,
        due_date: NaiveDate,
        notes: impl Into<String>,
    ) -> StoreResult<TaskId> {
        let name = name.into();
        if name.is_empty() {
            debug!("add: rejected empty task name");
            return Err(StoreError::EmptyName);
        }

        let id = self.tasks.len();
        self.tasks.push(Task {
            framework: framework.into(),
            name,
            status,
            due_date,
            notes: notes.into(),
        });

        debug!(id, framework = %self.tasks[id].framework, "add: task stored");
        Ok(id)
    }

    /// Set the status of the task at `id`
    ///
    /// A stale id (e.g. the store was reset after the view was rendered)
    /// returns `StoreError::NotFound` and changes nothing.
    pub fn update_status(&mut self, id: TaskId, status: TaskStatus) -> StoreResult<()> {
        let len = self.tasks.len();
        match self.tasks.get_mut(id) {
            Some(task) => {
                debug!(id, from = %task.status, to = %status, "update_status");
                task.status = status;
                Ok(())
            }
            None => {
                warn!(id, len, "update_status: id out of range, ignoring");
                Err(StoreError::NotFound { id, len })
            }
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Tasks matching `filter`, paired with their ids, in insertion order
    pub fn filter(&self, filter: &TaskFilter) -> Vec<(TaskId, &Task)> {
        self.tasks
            .iter()
            .enumerate()
            .filter(|(_, task)| filter.matches(task))
            .collect()
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    /// Distinct frameworks in use, in first-seen order
    pub fn frameworks(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for task in &self.tasks {
            if !seen.contains(&task.framework.as_str()) {
                seen.push(&task.framework);
            }
        }
        seen
    }
}
