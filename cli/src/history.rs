//! In-memory command log with Up/Down style recall.

use chrono::{DateTime, Local};

/// One executed command and what it printed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// The input line as typed.
    pub command: String,
    /// The output shown for it.
    pub output: String,
    /// When the entry was recorded.
    pub recorded_at: DateTime<Local>,
}

/// Ordered, append-only log of this run's commands plus a recall cursor.
///
/// The cursor ranges over `0..=len`; `len` means "past the end", which is where it sits
/// after every append and after [`History::reset`].
#[derive(Debug, Clone, Default)]
pub struct History {
    entries: Vec<HistoryEntry>,
    cursor: usize,
}

impl History {
    /// Creates an empty history.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            cursor: 0,
        }
    }

    /// Records a command. Entries with empty output are ignored.
    pub fn append(&mut self, command: impl Into<String>, output: impl Into<String>) {
        let output = output.into();
        if output.is_empty() {
            return;
        }
        self.entries.push(HistoryEntry {
            command: command.into(),
            output,
            recorded_at: Local::now(),
        });
        self.cursor = self.entries.len();
    }

    /// Steps back one entry and returns its command.
    ///
    /// Returns `None` when already at the oldest entry (or the log is empty).
    pub fn recall_previous(&mut self) -> Option<&str> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(self.entries[self.cursor].command.as_str())
    }

    /// Steps forward one entry and returns its command.
    ///
    /// Moving past the newest entry returns `""`.
    pub fn recall_next(&mut self) -> &str {
        if self.cursor < self.entries.len() {
            self.cursor += 1;
        }
        self.entries
            .get(self.cursor)
            .map_or("", |entry| entry.command.as_str())
    }

    /// All entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Forgets every entry.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three() -> History {
        let mut history = History::new();
        history.append("ls", "a b");
        history.append("pwd", "/tmp");
        history.append("whoami", "root");
        history
    }

    #[test]
    fn recall_walks_back_then_forward() {
        let mut history = three();
        assert_eq!(history.recall_previous(), Some("whoami"));
        assert_eq!(history.recall_previous(), Some("pwd"));
        assert_eq!(history.recall_previous(), Some("ls"));
        assert_eq!(history.recall_previous(), None);

        assert_eq!(history.recall_next(), "pwd");
        assert_eq!(history.recall_next(), "whoami");
        assert_eq!(history.recall_next(), "");
        assert_eq!(history.recall_next(), "");
    }

    #[test]
    fn append_resets_cursor() {
        let mut history = three();
        history.recall_previous();
        history.recall_previous();
        history.append("date", "today");
        assert_eq!(history.recall_previous(), Some("date"));
    }

    #[test]
    fn empty_output_is_not_recorded() {
        let mut history = History::new();
        history.append("true", "");
        assert!(history.is_empty());
        assert_eq!(history.recall_previous(), None);
        assert_eq!(history.recall_next(), "");
    }

    #[test]
    fn reset_clears_entries_and_cursor() {
        let mut history = three();
        history.recall_previous();
        history.reset();
        assert_eq!(history.len(), 0);
        assert_eq!(history.recall_previous(), None);
        history.append("ls", "x");
        assert_eq!(history.recall_previous(), Some("ls"));
    }

    #[test]
    fn entries_keep_insertion_order() {
        let history = three();
        let commands: Vec<_> = history
            .entries()
            .iter()
            .map(|entry| entry.command.as_str())
            .collect();
        assert_eq!(commands, ["ls", "pwd", "whoami"]);
        assert!(history.entries()[0].recorded_at <= history.entries()[2].recorded_at);
    }
}
