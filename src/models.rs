// Data models for TaskBoard

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Frameworks offered by default when adding a task.
///
/// This is a convenience list only: any framework string is accepted.
pub const FRAMEWORK_CATALOG: [&str; 10] = [
    "PyTorch",
    "TensorFlow",
    "Scikit-learn",
    "XGBoost",
    "Hugging Face Transformers",
    "LangChain",
    "NumPy",
    "Pandas",
    "Matplotlib",
    "Seaborn",
];

/// Positional index of a task within the store
pub type TaskId = usize;

/// A single to-do item tied to a framework
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub framework: String,
    pub name: String,
    pub status: TaskStatus,
    pub due_date: NaiveDate,
    pub notes: String,
}

/// Progress of a task
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
}

impl TaskStatus {
    /// Label shown in tables and written to CSV
    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    /// Accepts the display label in any case, with or without the space/underscore/dash.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "pending" => Ok(TaskStatus::Pending),
            "inprogress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            _ => Err(format!(
                "Invalid status '{}'. Valid options are: Pending, In Progress, Completed",
                s
            )),
        }
    }
}

/// Today's date in the local timezone, used as the default due date
pub fn local_date_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse a `YYYY-MM-DD` due date
pub fn parse_due_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| format!("Invalid date '{}'. Use YYYY-MM-DD (e.g., '2024-11-21')", s))
}
