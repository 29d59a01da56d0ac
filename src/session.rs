// Interactive command session driving the task store

use crate::config::Config;
use crate::error::StoreError;
use crate::export::{ExportSink, TASKS_FILE, UPDATED_TASKS_FILE};
use crate::filter::TaskFilter;
use crate::models::{Task, TaskId, TaskStatus, local_date_today, parse_due_date};
use crate::notes::NotesSink;
use crate::store::TaskStore;
use crate::view;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use colored::Colorize;
use eyre::{Result, eyre};
use serde::Serialize;
use std::borrow::Cow;
use std::io::{BufRead, Write};
use tracing::{debug, warn};

/// One line of session input
#[derive(Parser, Debug)]
#[command(no_binary_name = true, disable_help_subcommand = true, disable_version_flag = true)]
struct SessionLine {
    #[command(subcommand)]
    command: SessionCommand,
}

#[derive(Subcommand, Debug)]
enum SessionCommand {
    /// Add a task
    Add {
        /// Task name (words are joined with spaces)
        name: Vec<String>,

        /// Framework (defaults to the configured default)
        #[arg(short, long)]
        framework: Option<String>,

        /// Pending, "In Progress" or Completed
        #[arg(short, long, default_value = "Pending")]
        status: TaskStatus,

        /// Due date, YYYY-MM-DD (defaults to today)
        #[arg(short, long, value_parser = parse_due_date)]
        due: Option<NaiveDate>,

        /// Free-text notes
        #[arg(short, long, default_value = "")]
        notes: String,
    },

    /// Show tasks; any filter given here replaces the current one
    #[command(alias = "ls")]
    List {
        /// Keep only these frameworks (repeatable)
        #[arg(short, long = "framework")]
        frameworks: Vec<String>,

        /// Keep only these statuses (repeatable)
        #[arg(short, long = "status")]
        statuses: Vec<TaskStatus>,

        /// Keep tasks whose name contains this text
        #[arg(short, long)]
        query: Option<String>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Drop the current filter
    ClearFilter,

    /// Show one task in full
    Show { id: TaskId },

    /// Change the status of a task
    Status { id: TaskId, status: TaskStatus },

    /// Remove every task
    Reset,

    /// Append text to the project notes file
    Note { text: Vec<String> },

    /// Write tasks to CSV
    Export {
        /// Export every task instead of the filtered view
        #[arg(long)]
        all: bool,

        /// Write updated_tasks.csv instead of tasks.csv
        #[arg(long)]
        updated: bool,
    },

    /// List known frameworks
    Frameworks,

    /// Show available commands
    Help,

    /// Leave the session
    #[command(alias = "exit")]
    Quit,
}

/// A task as shown by `list --json`, with the id `show` and `status` take
#[derive(Serialize)]
struct TaskRow<'a> {
    id: TaskId,
    #[serde(flatten)]
    task: &'a Task,
}

/// Whether the session should keep reading input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// A single user's session: the store plus the sinks it writes to
pub struct Session {
    store: TaskStore,
    filter: TaskFilter,
    notes: NotesSink,
    export: ExportSink,
    config: Config,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Self {
            store: TaskStore::new(),
            filter: TaskFilter::new(),
            notes: NotesSink::new(&config.notes_path),
            export: ExportSink::new(&config.export_dir),
            config,
        }
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn filter(&self) -> &TaskFilter {
        &self.filter
    }

    /// Read commands until end of input or `quit`
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W, interactive: bool) -> Result<()> {
        if interactive {
            writeln!(out, "{}", "AI/ML Tech Stack Project Management".bold())?;
            writeln!(out, "Type `help` for commands, `quit` to leave.")?;
        }

        let mut input = input;
        let mut buf = Vec::new();
        loop {
            if interactive {
                write!(out, "{}", "taskboard> ".bold())?;
                out.flush()?;
            }

            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            while matches!(buf.last(), Some(b'\n' | b'\r')) {
                buf.pop();
            }

            // Invalid UTF-8 is replaced rather than ending the session
            let line = String::from_utf8_lossy(&buf);
            if matches!(line, Cow::Owned(_)) {
                warn!("Input line was not valid UTF-8, replacing invalid bytes");
            }

            if self.execute(&line, out)? == Flow::Quit {
                break;
            }
        }

        Ok(())
    }

    /// Execute one command line
    ///
    /// Store rejections, parse errors and sink failures are reported to `out`
    /// and the session continues. Only a failure to write to `out` is an error.
    pub fn execute<W: Write>(&mut self, line: &str, out: &mut W) -> Result<Flow> {
        let words = match split_words(line) {
            Ok(words) => words,
            Err(e) => {
                writeln!(out, "{} {}", "error:".red().bold(), e)?;
                return Ok(Flow::Continue);
            }
        };

        if words.is_empty() || words[0].starts_with('#') {
            return Ok(Flow::Continue);
        }

        let parsed = match SessionLine::try_parse_from(&words) {
            Ok(parsed) => parsed,
            Err(e) => {
                write!(out, "{}", e)?;
                return Ok(Flow::Continue);
            }
        };

        debug!(command = ?parsed.command, "execute");
        self.dispatch(parsed.command, out)
    }

    fn dispatch<W: Write>(&mut self, command: SessionCommand, out: &mut W) -> Result<Flow> {
        match command {
            SessionCommand::Add {
                name,
                framework,
                status,
                due,
                notes,
            } => {
                let framework = framework.unwrap_or_else(|| self.config.default_framework.clone());
                let due = due.unwrap_or_else(local_date_today);
                match self.store.add(framework, name.join(" "), status, due, notes) {
                    Ok(id) => {
                        writeln!(out, "{}", format!("Task {} added successfully!", id).green())?;
                        self.render(out)?;
                    }
                    Err(e) => self.report_rejection(&e, out)?,
                }
            }

            SessionCommand::List {
                frameworks,
                statuses,
                query,
                json,
            } => {
                if !frameworks.is_empty() || !statuses.is_empty() || query.is_some() {
                    self.filter = TaskFilter {
                        frameworks,
                        statuses,
                        name_query: query,
                    };
                }

                if json {
                    let rows: Vec<TaskRow> = self
                        .store
                        .filter(&self.filter)
                        .into_iter()
                        .map(|(id, task)| TaskRow { id, task })
                        .collect();
                    writeln!(out, "{}", serde_json::to_string_pretty(&rows)?)?;
                } else {
                    self.render(out)?;
                }
            }

            SessionCommand::ClearFilter => {
                self.filter = TaskFilter::new();
                self.render(out)?;
            }

            SessionCommand::Show { id } => match self.store.get(id) {
                Some(task) => write!(out, "{}", view::render_task(id, task))?,
                None => {
                    let e = StoreError::NotFound {
                        id,
                        len: self.store.len(),
                    };
                    self.report_rejection(&e, out)?;
                }
            },

            SessionCommand::Status { id, status } => match self.store.update_status(id, status) {
                Ok(()) => {
                    writeln!(out, "{}", format!("Task {} status updated to {}!", id, status).green())?;
                    self.render(out)?;
                }
                Err(e) => self.report_rejection(&e, out)?,
            },

            SessionCommand::Reset => {
                self.store.reset();
                writeln!(out, "{}", "All tasks have been cleared.".green())?;
                self.render(out)?;
            }

            SessionCommand::Note { text } => match self.notes.append(&text.join(" ")) {
                Ok(()) => writeln!(out, "{}", "Notes saved successfully!".green())?,
                Err(e) => self.report_sink_failure(&e, out)?,
            },

            SessionCommand::Export { all, updated } => {
                let file_name = if updated { UPDATED_TASKS_FILE } else { TASKS_FILE };
                let result = if all {
                    self.export.export(file_name, self.store.iter())
                } else {
                    let rows = self.store.filter(&self.filter);
                    self.export.export(file_name, rows.into_iter().map(|(_, t)| t))
                };
                match result {
                    Ok(path) => writeln!(out, "{}", format!("Exported tasks to {}", path.display()).green())?,
                    Err(e) => self.report_sink_failure(&e, out)?,
                }
            }

            SessionCommand::Frameworks => {
                let in_use = self.store.frameworks();
                let catalog = self.config.catalog();
                for framework in &catalog {
                    let marker = if in_use.contains(&framework.as_str()) { "*" } else { " " };
                    writeln!(out, "{} {}", marker, framework)?;
                }
                for framework in in_use.iter().filter(|f| !catalog.iter().any(|c| c.as_str() == **f)) {
                    writeln!(out, "* {}", framework)?;
                }
            }

            SessionCommand::Help => {
                use clap::CommandFactory;
                let help = SessionLine::command().name("commands").render_help();
                write!(out, "{}", help)?;
            }

            SessionCommand::Quit => return Ok(Flow::Quit),
        }

        Ok(Flow::Continue)
    }

    fn render<W: Write>(&self, out: &mut W) -> Result<()> {
        write!(out, "{}", view::render_view(&self.store, &self.filter))?;
        Ok(())
    }

    fn report_rejection<W: Write>(&self, e: &StoreError, out: &mut W) -> Result<()> {
        writeln!(out, "{} {}", "warning:".yellow().bold(), e)?;
        Ok(())
    }

    fn report_sink_failure<W: Write>(&self, e: &eyre::Report, out: &mut W) -> Result<()> {
        warn!(error = ?e, "Sink write failed");
        writeln!(out, "{} {:#}", "error:".red().bold(), e)?;
        Ok(())
    }
}

/// Split a command line into words
///
/// Single and double quotes group words; a backslash escapes the next
/// character outside single quotes.
pub fn split_words(line: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some('\''), '\'') => quote = None,
            (Some('"'), '"') => quote = None,
            (Some('\''), _) => current.push(c),
            (_, '\\') => {
                let next = chars.next().ok_or_else(|| eyre!("Trailing backslash"))?;
                current.push(next);
                in_word = true;
            }
            (Some(_), _) => current.push(c),
            (None, '\'' | '"') => {
                quote = Some(c);
                in_word = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            (None, _) => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if let Some(q) = quote {
        return Err(eyre!("Unterminated quote {}", q));
    }
    if in_word {
        words.push(current);
    }

    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn session(temp: &TempDir) -> Session {
        colored::control::set_override(false);
        let config = Config {
            notes_path: temp.path().join("project_notes.txt"),
            export_dir: temp.path().to_path_buf(),
            ..Config::default()
        };
        Session::new(config)
    }

    fn exec(session: &mut Session, line: &str) -> (Flow, String) {
        let mut out = Vec::new();
        let flow = session.execute(line, &mut out).unwrap();
        (flow, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_split_words() {
        assert_eq!(
            split_words(r#"add "Setup env" -f 'Hugging Face Transformers' -n a\ b"#).unwrap(),
            vec!["add", "Setup env", "-f", "Hugging Face Transformers", "-n", "a b"]
        );
        assert_eq!(split_words(r#"add """#).unwrap(), vec!["add", ""]);
        assert!(split_words("   ").unwrap().is_empty());
        assert!(split_words(r#"add "oops"#).is_err());
    }

    #[test]
    fn test_add_and_status_flow() {
        let temp = TempDir::new().unwrap();
        let mut session = session(&temp);

        let (_, out) = exec(&mut session, "add Setup env -f PyTorch -d 2024-11-21");
        assert!(out.contains("Task 0 added successfully!"));
        assert!(out.contains("Setup env"));

        let task = session.store().get(0).unwrap();
        assert_eq!(task.framework, "PyTorch");
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.due_date, NaiveDate::from_ymd_opt(2024, 11, 21).unwrap());
        assert_eq!(task.notes, "");

        let (_, out) = exec(&mut session, "status 0 Completed");
        assert!(out.contains("status updated to Completed"));
        assert_eq!(session.store().get(0).unwrap().status, TaskStatus::Completed);
    }

    #[test]
    fn test_add_uses_default_framework() {
        let temp = TempDir::new().unwrap();
        let mut session = session(&temp);

        exec(&mut session, "add Train -s 'in progress'");
        let task = session.store().get(0).unwrap();
        assert_eq!(task.framework, "PyTorch");
        assert_eq!(task.status, TaskStatus::InProgress);
    }

    #[test]
    fn test_empty_name_is_reported_not_fatal() {
        let temp = TempDir::new().unwrap();
        let mut session = session(&temp);

        let (flow, out) = exec(&mut session, "add");
        assert_eq!(flow, Flow::Continue);
        assert!(out.contains("Task name cannot be empty"));
        assert!(session.store().is_empty());

        let (_, out) = exec(&mut session, r#"add """#);
        assert!(out.contains("Task name cannot be empty"));
        assert!(session.store().is_empty());
    }

    #[test]
    fn test_stale_status_update_is_ignored() {
        let temp = TempDir::new().unwrap();
        let mut session = session(&temp);
        exec(&mut session, "add a");
        exec(&mut session, "reset");

        let (flow, out) = exec(&mut session, "status 0 Completed");
        assert_eq!(flow, Flow::Continue);
        assert!(out.contains("No task with id 0"));
        assert!(session.store().is_empty());
    }

    #[test]
    fn test_bad_input_keeps_session_running() {
        let temp = TempDir::new().unwrap();
        let mut session = session(&temp);

        let (flow, out) = exec(&mut session, "frobnicate");
        assert_eq!(flow, Flow::Continue);
        assert!(!out.is_empty());

        let (flow, _) = exec(&mut session, "status 0 Done");
        assert_eq!(flow, Flow::Continue);

        let (flow, out) = exec(&mut session, "add \"unterminated");
        assert_eq!(flow, Flow::Continue);
        assert!(out.contains("Unterminated quote"));
    }

    #[test]
    fn test_list_sets_sticky_filter() {
        let temp = TempDir::new().unwrap();
        let mut session = session(&temp);
        exec(&mut session, "add a -f PyTorch");
        exec(&mut session, "add b -f NumPy");

        let (_, out) = exec(&mut session, "list -f NumPy");
        assert!(out.contains("1 of 2 tasks"));
        assert_eq!(session.filter().frameworks, vec!["NumPy".to_string()]);

        // Re-render after a mutation still applies the filter
        let (_, out) = exec(&mut session, "add c -f PyTorch");
        assert!(out.contains("1 of 3 tasks"));

        let (_, out) = exec(&mut session, "clear-filter");
        assert!(out.contains("3 of 3 tasks (All)"));
    }

    #[test]
    fn test_list_json() {
        let temp = TempDir::new().unwrap();
        let mut session = session(&temp);
        exec(&mut session, "add Setup env -d 2024-11-21");

        exec(&mut session, "add Train -d 2024-11-22");
        exec(&mut session, "list -q train --json");

        let (_, out) = exec(&mut session, "list --json");
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 1);
        assert_eq!(value[0]["id"], 1);
        assert_eq!(value[0]["name"], "Train");
        assert_eq!(value[0]["status"], "Pending");
        assert_eq!(value[0]["due_date"], "2024-11-22");

        exec(&mut session, "clear-filter");
        let (_, out) = exec(&mut session, "list --json");
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value[0]["id"], 0);
        assert_eq!(value[0]["name"], "Setup env");
        assert_eq!(value[0]["status"], "Pending");
        assert_eq!(value[0]["due_date"], "2024-11-21");
    }

    #[test]
    fn test_show_task() {
        let temp = TempDir::new().unwrap();
        let mut session = session(&temp);
        exec(&mut session, "add Setup env -n 'pin versions'");

        let (_, out) = exec(&mut session, "show 0");
        assert!(out.contains("[0] PyTorch - Setup env"));
        assert!(out.contains("pin versions"));

        let (_, out) = exec(&mut session, "show 7");
        assert!(out.contains("No task with id 7"));
    }

    #[test]
    fn test_note_appends_to_file() {
        let temp = TempDir::new().unwrap();
        let mut session = session(&temp);

        let (_, out) = exec(&mut session, "note try mixed precision");
        assert!(out.contains("Notes saved successfully!"));

        let content = fs::read_to_string(temp.path().join("project_notes.txt")).unwrap();
        assert!(content.starts_with("\n["));
        assert!(content.ends_with("]\ntry mixed precision\n"));
    }

    #[test]
    fn test_note_failure_is_reported() {
        let temp = TempDir::new().unwrap();
        let config = Config {
            notes_path: temp.path().join("missing").join("notes.txt"),
            export_dir: temp.path().to_path_buf(),
            ..Config::default()
        };
        let mut session = Session::new(config);
        exec(&mut session, "add keep me");

        let (flow, out) = exec(&mut session, "note lost");
        assert_eq!(flow, Flow::Continue);
        assert!(out.contains("Failed to open notes file"));
        assert_eq!(session.store().len(), 1);
    }

    #[test]
    fn test_export_filtered_and_all() {
        let temp = TempDir::new().unwrap();
        let mut session = session(&temp);
        exec(&mut session, "add a -f PyTorch -d 2024-11-21");
        exec(&mut session, "add b -f NumPy -d 2024-11-21");
        exec(&mut session, "list -f NumPy");

        exec(&mut session, "export");
        let csv = fs::read_to_string(temp.path().join("tasks.csv")).unwrap();
        assert_eq!(
            csv,
            "Framework,Task,Status,Due Date,Notes\nNumPy,b,Pending,2024-11-21,\n"
        );

        exec(&mut session, "status 0 Completed");
        exec(&mut session, "export --all --updated");
        let csv = fs::read_to_string(temp.path().join("updated_tasks.csv")).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "PyTorch,a,Completed,2024-11-21,");
        assert_eq!(lines[2], "NumPy,b,Pending,2024-11-21,");
    }

    #[test]
    fn test_frameworks_marks_in_use() {
        let temp = TempDir::new().unwrap();
        let mut session = session(&temp);
        exec(&mut session, "add a -f NumPy");
        exec(&mut session, "add b -f JAX");

        let (_, out) = exec(&mut session, "frameworks");
        assert!(out.contains("* NumPy"));
        assert!(out.contains("  PyTorch"));
        assert!(out.contains("* JAX"));
    }

    #[test]
    fn test_frameworks_with_empty_config_list_uses_catalog() {
        let temp = TempDir::new().unwrap();
        let config = Config {
            notes_path: temp.path().join("project_notes.txt"),
            export_dir: temp.path().to_path_buf(),
            frameworks: Vec::new(),
            ..Config::default()
        };
        let mut session = Session::new(config);

        let (_, out) = exec(&mut session, "frameworks");
        assert_eq!(out.lines().count(), 10);
        assert!(out.contains("  Seaborn"));
    }

    #[test]
    fn test_empty_note_is_saved() {
        let temp = TempDir::new().unwrap();
        let mut session = session(&temp);

        let (_, out) = exec(&mut session, "note");
        assert!(out.contains("Notes saved successfully!"));

        let content = fs::read_to_string(temp.path().join("project_notes.txt")).unwrap();
        assert!(content.ends_with("]\n\n"));
    }

    #[test]
    fn test_invalid_utf8_line_does_not_end_session() {
        let temp = TempDir::new().unwrap();
        let mut session = session(&temp);
        let input = Cursor::new(b"add one\nadd \xff\xfe bad\r\nadd two\n".to_vec());
        let mut out = Vec::new();

        session.run(input, &mut out, false).unwrap();

        assert_eq!(session.store().len(), 3);
        assert_eq!(session.store().get(1).unwrap().name, "\u{FFFD}\u{FFFD} bad");
        assert_eq!(session.store().get(2).unwrap().name, "two");
    }

    #[test]
    fn test_run_until_quit() {
        let temp = TempDir::new().unwrap();
        let mut session = session(&temp);
        let input = Cursor::new("add one\n# comment\n\nadd two\nquit\nadd three\n");
        let mut out = Vec::new();

        session.run(input, &mut out, false).unwrap();

        assert_eq!(session.store().len(), 2);
    }
}
