// Append-only project notes file

use chrono::{Local, NaiveDateTime};
use eyre::{Context, Result};
use fs2::FileExt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Default notes file, relative to the working directory
pub const DEFAULT_NOTES_FILE: &str = "project_notes.txt";

/// Timestamped free-text log. Only ever appended to.
#[derive(Debug, Clone)]
pub struct NotesSink {
    path: PathBuf,
}

impl NotesSink {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `text` stamped with the current local time
    pub fn append(&self, text: &str) -> Result<()> {
        self.append_at(text, Local::now().naive_local())
    }

    /// Append `text` as `\n[<timestamp>]\n<text>\n`
    pub fn append_at(&self, text: &str, at: NaiveDateTime) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open notes file {}", self.path.display()))?;

        // Keep a block from interleaving with another session's write
        file.lock_exclusive().context("Failed to acquire notes file lock")?;

        write!(file, "{}", format_entry(text, at)).context("Failed to write notes")?;
        file.sync_all().context("Failed to sync notes file")?;

        info!(file = ?self.path, bytes = text.len(), "Appended project notes");
        Ok(())
    }
}

fn format_entry(text: &str, at: NaiveDateTime) -> String {
    format!("\n[{}]\n{}\n", at.format("%Y-%m-%d %H:%M:%S%.6f"), text)
}
