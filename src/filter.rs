// Query filtering for tasks

use crate::models::{Task, TaskStatus};

/// Criteria for selecting tasks
///
/// Each constraint is optional: an empty set (or empty query) matches every
/// task. Constraints combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Frameworks to keep (exact match)
    pub frameworks: Vec<String>,
    /// Statuses to keep (exact match)
    pub statuses: Vec<TaskStatus>,
    /// Case-insensitive substring of the task name
    pub name_query: Option<String>,
}

impl TaskFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn framework(mut self, framework: impl Into<String>) -> Self {
        self.frameworks.push(framework.into());
        self
    }

    pub fn status(mut self, status: TaskStatus) -> Self {
        self.statuses.push(status);
        self
    }

    pub fn name_contains(mut self, query: impl Into<String>) -> Self {
        self.name_query = Some(query.into());
        self
    }

    /// True when no constraint is set
    pub fn is_unconstrained(&self) -> bool {
        self.frameworks.is_empty()
            && self.statuses.is_empty()
            && self.name_query.as_deref().is_none_or(|q| q.trim().is_empty())
    }

    pub fn matches(&self, task: &Task) -> bool {
        if !self.frameworks.is_empty() && !self.frameworks.iter().any(|f| *f == task.framework) {
            return false;
        }

        if !self.statuses.is_empty() && !self.statuses.contains(&task.status) {
            return false;
        }

        match self.name_query.as_deref().map(str::trim) {
            Some(query) if !query.is_empty() => task.name.to_lowercase().contains(&query.to_lowercase()),
            _ => true,
        }
    }
}

impl std::fmt::Display for TaskFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_unconstrained() {
            return write!(f, "All");
        }

        let mut parts = Vec::new();
        if !self.frameworks.is_empty() {
            parts.push(format!("framework in [{}]", self.frameworks.join(", ")));
        }
        if !self.statuses.is_empty() {
            let labels: Vec<&str> = self.statuses.iter().map(|s| s.label()).collect();
            parts.push(format!("status in [{}]", labels.join(", ")));
        }
        if let Some(query) = self.name_query.as_deref().filter(|q| !q.trim().is_empty()) {
            parts.push(format!("name contains '{}'", query.trim()));
        }
        write!(f, "{}", parts.join(" and "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn task(framework: &str, name: &str, status: TaskStatus) -> Task {
        Task {
            framework: framework.to_string(),
            name: name.to_string(),
            status,
            due_date: NaiveDate::from_ymd_opt(2024, 11, 21).unwrap(),
            notes: String::new(),
        }
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = TaskFilter::new();
        assert!(filter.is_unconstrained());
        assert!(filter.matches(&task("PyTorch", "a", TaskStatus::Pending)));
        assert!(filter.matches(&task("Custom", "b", TaskStatus::Completed)));
    }

    #[test]
    fn test_framework_set_membership() {
        let filter = TaskFilter::new().framework("PyTorch").framework("NumPy");
        assert!(filter.matches(&task("PyTorch", "a", TaskStatus::Pending)));
        assert!(filter.matches(&task("NumPy", "a", TaskStatus::Pending)));
        assert!(!filter.matches(&task("Pandas", "a", TaskStatus::Pending)));
        // Exact match only
        assert!(!filter.matches(&task("pytorch", "a", TaskStatus::Pending)));
    }

    #[test]
    fn test_status_and_framework_combine() {
        let filter = TaskFilter::new().framework("PyTorch").status(TaskStatus::Completed);
        assert!(filter.matches(&task("PyTorch", "a", TaskStatus::Completed)));
        assert!(!filter.matches(&task("PyTorch", "a", TaskStatus::Pending)));
        assert!(!filter.matches(&task("NumPy", "a", TaskStatus::Completed)));
    }

    #[test]
    fn test_name_query_is_case_insensitive() {
        let filter = TaskFilter::new().name_contains("ENV");
        assert!(filter.matches(&task("PyTorch", "Setup env", TaskStatus::Pending)));
        assert!(!filter.matches(&task("PyTorch", "Train model", TaskStatus::Pending)));
    }

    #[test]
    fn test_blank_name_query_is_unconstrained() {
        let filter = TaskFilter::new().name_contains("   ");
        assert!(filter.is_unconstrained());
        assert!(filter.matches(&task("PyTorch", "anything", TaskStatus::Pending)));
    }

    #[test]
    fn test_filter_display() {
        assert_eq!(TaskFilter::new().to_string(), "All");
        let filter = TaskFilter::new().framework("PyTorch").status(TaskStatus::InProgress);
        assert_eq!(
            filter.to_string(),
            "framework in [PyTorch] and status in [In Progress]"
        );
    }
}
