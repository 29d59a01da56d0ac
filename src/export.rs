// CSV export of the task table

use crate::models::Task;
use eyre::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const CSV_HEADER: &str = "Framework,Task,Status,Due Date,Notes";

/// Filename for an export of the task table
pub const TASKS_FILE: &str = "tasks.csv";

/// Filename used once task statuses have been edited
pub const UPDATED_TASKS_FILE: &str = "updated_tasks.csv";

/// Render tasks as CSV text: header plus one row per task, `\n` line endings
pub fn to_csv<'a, I>(tasks: I) -> String
where
    I: IntoIterator<Item = &'a Task>,
{
    let mut out = String::from(CSV_HEADER);
    out.push('\n');

    for task in tasks {
        let due = task.due_date.format("%Y-%m-%d").to_string();
        let fields = [
            task.framework.as_str(),
            task.name.as_str(),
            task.status.label(),
            due.as_str(),
            task.notes.as_str(),
        ];
        let row: Vec<String> = fields.iter().map(|f| quote_field(f)).collect();
        out.push_str(&row.join(","));
        out.push('\n');
    }

    out
}

/// Quote a field only when it holds a delimiter, quote or line break
fn quote_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Writes CSV exports into a fixed directory
#[derive(Debug, Clone)]
pub struct ExportSink {
    dir: PathBuf,
}

impl ExportSink {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Write `tasks` to `file_name` inside the export directory, replacing any
    /// earlier export of the same name. Returns the written path.
    pub fn export<'a, I>(&self, file_name: &str, tasks: I) -> Result<PathBuf>
    where
        I: IntoIterator<Item = &'a Task>,
    {
        let path = self.dir.join(file_name);
        let tasks: Vec<&Task> = tasks.into_iter().collect();
        let rows = tasks.len();
        let csv = to_csv(tasks);

        fs::write(&path, csv).with_context(|| format!("Failed to write export {}", path.display()))?;

        info!(file = ?path, rows, "Exported tasks to CSV");
        Ok(path)
    }
}
