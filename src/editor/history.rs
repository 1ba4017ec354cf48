//! Command history ring for the line editor.

use crate::fileio::{FileIo, FileMode};

/// Max number of commands kept in the history.
pub const CMD_HISTORY_MAX_SIZE: usize = 40;

/// File used by `histSave`/`histLoad`: one command per line, no quoting.
pub const COMMAND_HIST_FILE: &str = "cmdhist.txt";

/// Fixed-size history of submitted command lines, oldest first, with a
/// traversal cursor for the Up/Down arrow keys.
pub struct History {
    entries: Vec<String>,
    cursor: usize,
}

impl History {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            cursor: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Append a command. At capacity the oldest entry is shifted out. The
    /// traversal cursor is reset to the newest entry.
    pub fn add(&mut self, command: &str) {
        if self.entries.len() == CMD_HISTORY_MAX_SIZE {
            self.entries.remove(0);
        }
        self.entries.push(command.to_string());
        self.cursor = self.entries.len() - 1;
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }

    /// Point the traversal cursor back at the newest entry.
    pub fn reset_cursor(&mut self) {
        self.cursor = self.entries.len().saturating_sub(1);
    }

    /// Walk towards older entries (Up arrow). If the candidate equals the
    /// current edit line, one more step is taken.
    pub fn up(&mut self, current_line: &str) -> String {
        let mut command = self
            .entries
            .get(self.cursor)
            .cloned()
            .unwrap_or_default();
        if self.cursor > 0 {
            self.cursor -= 1;
            if command == current_line {
                command = self.entries[self.cursor].clone();
            }
        }
        command
    }

    /// Walk towards newer entries (Down arrow). Walking past the newest
    /// entry yields an empty line.
    pub fn down(&mut self, current_line: &str) -> String {
        if self.entries.is_empty() || self.cursor + 1 >= self.entries.len() {
            return String::new();
        }
        self.cursor += 1;
        let mut command = self.entries[self.cursor].clone();
        // Needed when going up and down over the same two commands.
        if command == current_line {
            self.cursor += 1;
            command = self.entries.get(self.cursor).cloned().unwrap_or_default();
            if self.cursor >= self.entries.len() {
                self.cursor = self.entries.len() - 1;
            }
        }
        command
    }

    /// Save the history to [`COMMAND_HIST_FILE`], one command per line.
    pub fn save(&self, files: &mut dyn FileIo) -> bool {
        let Some(handle) = files.open(COMMAND_HIST_FILE, FileMode::Write) else {
            return false;
        };
        for entry in &self.entries {
            files.write_line(handle, entry);
        }
        files.close(handle);
        true
    }

    /// Replace the current history with the contents of
    /// [`COMMAND_HIST_FILE`]. Trailing whitespace is trimmed on load.
    pub fn load(&mut self, files: &mut dyn FileIo) -> bool {
        let Some(handle) = files.open(COMMAND_HIST_FILE, FileMode::Read) else {
            return false;
        };
        self.clear();
        let mut line = String::new();
        while files.read_line(handle, &mut line) {
            let trimmed = line.trim_end();
            if !trimmed.is_empty() {
                self.add(trimmed);
            }
        }
        files.close(handle);
        true
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_capacity() {
        let mut history = History::new();
        for i in 0..(CMD_HISTORY_MAX_SIZE + 5) {
            history.add(&format!("cmd {i}"));
        }
        assert_eq!(history.len(), CMD_HISTORY_MAX_SIZE);
        // Oldest entries were shifted out.
        assert_eq!(history.get(0), Some("cmd 5"));
        assert_eq!(
            history.get(CMD_HISTORY_MAX_SIZE - 1),
            Some(&*format!("cmd {}", CMD_HISTORY_MAX_SIZE + 4))
        );
    }

    #[test]
    fn test_up_walks_older() {
        let mut history = History::new();
        history.add("first");
        history.add("second");
        history.add("third");

        assert_eq!(history.up(""), "third");
        assert_eq!(history.up("third"), "second");
        assert_eq!(history.up("second"), "first");
        // Pinned at the oldest entry.
        assert_eq!(history.up("first"), "first");
    }

    #[test]
    fn test_down_walks_newer_then_blank() {
        let mut history = History::new();
        history.add("first");
        history.add("second");
        history.add("third");

        history.up("");
        history.up("third");
        history.up("second");

        assert_eq!(history.down("first"), "second");
        assert_eq!(history.down("second"), "third");
        assert_eq!(history.down("third"), "");
    }

    #[test]
    fn test_up_on_empty_history() {
        let mut history = History::new();
        assert_eq!(history.up(""), "");
        assert_eq!(history.down(""), "");
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let old_cwd = std::env::current_dir().unwrap();
        std::env::set_current_dir(dir.path()).unwrap();

        let mut files = crate::fileio::StdFileIo::new();
        let mut history = History::new();
        history.add("echo one");
        history.add("echo two  ");
        assert!(history.save(&mut files));

        let mut restored = History::new();
        assert!(restored.load(&mut files));
        assert_eq!(restored.len(), 2);
        assert_eq!(restored.get(0), Some("echo one"));
        // Trailing whitespace trimmed on load.
        assert_eq!(restored.get(1), Some("echo two"));

        std::env::set_current_dir(old_cwd).unwrap();
    }
}
