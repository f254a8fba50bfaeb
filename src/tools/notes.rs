//! Markdown daily-note vault.
//!
//! One file per day, `{prefix}{YYYY-MM-DD}.md`, inside the configured vault
//! directory.  A new file gets a front-matter header; each note is an
//! `## HH:MM:SS` section.  Rewrite and delete operate on the most recent
//! section, which is all the voice flow ever needs ("fix that", "scratch
//! that").

use std::path::{Path, PathBuf};

use chrono::Local;
use thiserror::Error;

// ---------------------------------------------------------------------------
// NotesError
// ---------------------------------------------------------------------------

/// Errors from the daily-note store.
#[derive(Debug, Error)]
pub enum NotesError {
    #[error("note I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Nothing to rewrite or delete — today's file is missing or has no
    /// entries.
    #[error("no note entry to operate on")]
    NoEntries,
}

// ---------------------------------------------------------------------------
// NoteStore trait
// ---------------------------------------------------------------------------

/// Note-taking capability consumed by the NOTE, CANCEL, and CLIPBOARD
/// actions.
pub trait NoteStore: Send + Sync {
    /// Append a new entry to today's note, creating the file on first use.
    fn append_daily(&self, content: &str) -> Result<(), NotesError>;

    /// Replace the text of today's most recent entry.
    fn rewrite_last(&self, content: &str) -> Result<(), NotesError>;

    /// Remove today's most recent entry.
    fn delete_last(&self) -> Result<(), NotesError>;
}

// ---------------------------------------------------------------------------
// DailyNotes
// ---------------------------------------------------------------------------

/// [`NoteStore`] over a directory of Markdown files.
pub struct DailyNotes {
    vault_path: PathBuf,
    prefix: String,
}

impl DailyNotes {
    pub fn new(vault_path: impl Into<PathBuf>, prefix: &str) -> Self {
        Self {
            vault_path: vault_path.into(),
            prefix: prefix.to_string(),
        }
    }

    /// Path of today's note file.
    fn daily_file(&self) -> PathBuf {
        let date = Local::now().format("%Y-%m-%d");
        self.vault_path.join(format!("{}{}.md", self.prefix, date))
    }

    fn front_matter() -> String {
        format!(
            "---\ndate: {}\nsource: hark\ntags: [voice-note, inbox]\n---\n\n",
            Local::now().to_rfc3339()
        )
    }

    fn entry(content: &str) -> String {
        format!("## {}\n{}\n\n", Local::now().format("%H:%M:%S"), content)
    }

    /// Index of the line starting the last `## ` section, if any.
    fn last_entry_index(lines: &[&str]) -> Option<usize> {
        lines.iter().rposition(|line| line.starts_with("## "))
    }

    fn read_lines(path: &Path) -> Result<Option<String>, NotesError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl NoteStore for DailyNotes {
    fn append_daily(&self, content: &str) -> Result<(), NotesError> {
        std::fs::create_dir_all(&self.vault_path)?;
        let path = self.daily_file();
        let is_new = !path.exists();

        let mut text = String::new();
        if is_new {
            text.push_str(&Self::front_matter());
        }
        text.push_str(&Self::entry(content));

        use std::io::Write;
        let mut file = std::fs::OpenOptions::new()
            .append(true)
            .create(true)
            .open(&path)?;
        file.write_all(text.as_bytes())?;
        Ok(())
    }

    fn rewrite_last(&self, content: &str) -> Result<(), NotesError> {
        let path = self.daily_file();
        let Some(text) = Self::read_lines(&path)? else {
            // Nothing written today yet — a rewrite becomes a plain append.
            return self.append_daily(content);
        };

        let lines: Vec<&str> = text.lines().collect();
        let Some(idx) = Self::last_entry_index(&lines) else {
            return self.append_daily(content);
        };

        let mut rebuilt = lines[..idx].join("\n");
        if !rebuilt.is_empty() {
            rebuilt.push('\n');
        }
        rebuilt.push_str(&Self::entry(content));

        std::fs::write(&path, rebuilt)?;
        Ok(())
    }

    fn delete_last(&self) -> Result<(), NotesError> {
        let path = self.daily_file();
        let Some(text) = Self::read_lines(&path)? else {
            return Err(NotesError::NoEntries);
        };

        let lines: Vec<&str> = text.lines().collect();
        let Some(idx) = Self::last_entry_index(&lines) else {
            return Err(NotesError::NoEntries);
        };

        let mut rebuilt = lines[..idx].join("\n");
        if !rebuilt.is_empty() {
            rebuilt.push('\n');
        }

        std::fs::write(&path, rebuilt)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store(dir: &tempfile::TempDir) -> DailyNotes {
        DailyNotes::new(dir.path(), "")
    }

    fn today_text(store: &DailyNotes) -> String {
        std::fs::read_to_string(store.daily_file()).expect("daily file must exist")
    }

    #[test]
    fn append_creates_file_with_front_matter() {
        let dir = tempdir().unwrap();
        let notes = store(&dir);

        notes.append_daily("buy bread").unwrap();

        let text = today_text(&notes);
        assert!(text.starts_with("---\n"));
        assert!(text.contains("source: hark"));
        assert!(text.contains("tags: [voice-note, inbox]"));
        assert!(text.contains("buy bread"));
    }

    #[test]
    fn second_append_does_not_repeat_front_matter() {
        let dir = tempdir().unwrap();
        let notes = store(&dir);

        notes.append_daily("one").unwrap();
        notes.append_daily("two").unwrap();

        let text = today_text(&notes);
        assert_eq!(text.matches("---\n").count(), 2, "one front-matter block");
        assert_eq!(text.matches("## ").count(), 2);
        assert!(text.contains("one"));
        assert!(text.contains("two"));
    }

    #[test]
    fn rewrite_replaces_only_the_last_entry() {
        let dir = tempdir().unwrap();
        let notes = store(&dir);

        notes.append_daily("keep me").unwrap();
        notes.append_daily("wrong").unwrap();
        notes.rewrite_last("corrected").unwrap();

        let text = today_text(&notes);
        assert!(text.contains("keep me"));
        assert!(!text.contains("wrong"));
        assert!(text.contains("corrected"));
        assert_eq!(text.matches("## ").count(), 2);
    }

    #[test]
    fn rewrite_on_missing_file_appends() {
        let dir = tempdir().unwrap();
        let notes = store(&dir);

        notes.rewrite_last("first ever").unwrap();

        let text = today_text(&notes);
        assert!(text.starts_with("---\n"));
        assert!(text.contains("first ever"));
    }

    #[test]
    fn delete_removes_the_last_entry() {
        let dir = tempdir().unwrap();
        let notes = store(&dir);

        notes.append_daily("stay").unwrap();
        notes.append_daily("go away").unwrap();
        notes.delete_last().unwrap();

        let text = today_text(&notes);
        assert!(text.contains("stay"));
        assert!(!text.contains("go away"));
        assert_eq!(text.matches("## ").count(), 1);
    }

    #[test]
    fn delete_with_no_file_reports_no_entries() {
        let dir = tempdir().unwrap();
        let notes = store(&dir);

        assert!(matches!(notes.delete_last(), Err(NotesError::NoEntries)));
    }

    #[test]
    fn delete_after_deleting_everything_reports_no_entries() {
        let dir = tempdir().unwrap();
        let notes = store(&dir);

        notes.append_daily("only").unwrap();
        notes.delete_last().unwrap();

        assert!(matches!(notes.delete_last(), Err(NotesError::NoEntries)));
    }

    #[test]
    fn prefix_lands_in_the_filename() {
        let dir = tempdir().unwrap();
        let notes = DailyNotes::new(dir.path(), "inbox-");

        notes.append_daily("x").unwrap();

        let name = notes.daily_file();
        let name = name.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("inbox-"));
        assert!(name.ends_with(".md"));
    }
}
