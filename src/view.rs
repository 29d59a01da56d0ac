// Terminal rendering of the task table

use crate::filter::TaskFilter;
use crate::models::{Task, TaskId, TaskStatus};
use crate::store::TaskStore;
use colored::{ColoredString, Colorize};

const NOTES_PREVIEW_CHARS: usize = 40;
const HEADERS: [&str; 6] = ["ID", "Framework", "Task", "Status", "Due Date", "Notes"];

fn paint_status(status: TaskStatus, padded: &str) -> ColoredString {
    match status {
        TaskStatus::Pending => padded.yellow(),
        TaskStatus::InProgress => padded.cyan(),
        TaskStatus::Completed => padded.green(),
    }
}

fn notes_preview(notes: &str) -> String {
    let first_line = notes.lines().next().unwrap_or("");
    let mut preview: String = first_line.chars().take(NOTES_PREVIEW_CHARS).collect();
    if first_line.chars().count() > NOTES_PREVIEW_CHARS || notes.lines().nth(1).is_some() {
        preview.push_str("...");
    }
    preview
}

/// Current view of the store under `filter`, rebuilt from scratch
pub fn render_view(store: &TaskStore, filter: &TaskFilter) -> String {
    if store.is_empty() {
        return "No tasks available yet. Add your first task with `add <name>`.\n".to_string();
    }

    let rows = store.filter(filter);
    if rows.is_empty() {
        return format!(
            "No tasks match the filter: {}. Try adjusting your filters or add a new task.\n",
            filter
        );
    }

    let mut out = render_table(&rows);
    out.push_str(&format!("{} of {} tasks ({})\n", rows.len(), store.len(), filter).dimmed().to_string());
    out
}

/// Fixed-width table of tasks with their ids
pub fn render_table(rows: &[(TaskId, &Task)]) -> String {
    let cells: Vec<[String; 6]> = rows
        .iter()
        .map(|(id, task)| {
            [
                id.to_string(),
                task.framework.clone(),
                task.name.clone(),
                task.status.label().to_string(),
                task.due_date.format("%Y-%m-%d").to_string(),
                notes_preview(&task.notes),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header: Vec<String> = HEADERS
        .iter()
        .zip(widths.iter())
        .map(|(h, w)| format!("{:<w$}", h, w = *w))
        .collect();
    out.push_str(&header.join("  ").bold().to_string());
    out.push('\n');

    for ((_, task), row) in rows.iter().zip(cells.iter()) {
        let mut line: Vec<String> = Vec::with_capacity(row.len());
        for (col, (cell, w)) in row.iter().zip(widths.iter()).enumerate() {
            let padded = format!("{:<w$}", cell, w = *w);
            if col == 3 {
                line.push(paint_status(task.status, &padded).to_string());
            } else {
                line.push(padded);
            }
        }
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    }

    out
}

/// Expanded view of one task
pub fn render_task(id: TaskId, task: &Task) -> String {
    let mut out = format!("{}\n", format!("[{}] {} - {}", id, task.framework, task.name).bold());
    out.push_str(&format!("  Status:   {}\n", paint_status(task.status, task.status.label())));
    out.push_str(&format!("  Due Date: {}\n", task.due_date.format("%Y-%m-%d")));
    if task.notes.is_empty() {
        out.push_str("  Notes:    -\n");
    } else {
        out.push_str("  Notes:\n");
        for line in task.notes.lines() {
            out.push_str(&format!("    {}\n", line));
        }
    }
    out
}
