//! Tab-completion state for the line editor.
//!
//! The completer is a two-state machine. The first Tab press gathers and
//! lists the matches (Idle); subsequent presses cycle through the saved list
//! (Cycling). Any other key drops it back to Idle.

/// Maximum number of completion matches gathered and cycled.
pub const MAX_COMPLETION_MATCHES: usize = 64;

/// Matches listed per line for command-name completion.
pub const MAX_CMD_MATCHES_PER_LINE: usize = 4;

/// Matches listed per line for CVar-name completion.
pub const MAX_CVAR_MATCHES_PER_LINE: usize = 1;

/// Matches listed per line for argument-value completion.
pub const MAX_ARG_MATCHES_PER_LINE: usize = 1;

pub struct Completer {
    /// True while Idle; the first Tab fills the match list, later ones cycle.
    pub first_tab: bool,
    /// Set after the first Tab on an empty line; the second lists commands.
    pub list_all_on_tab: bool,
    /// Saved matches being cycled.
    pub matches: Vec<String>,
    /// Length of the partial string the matches were gathered for.
    pub partial_len: usize,
    /// Edit-line length at the time the matches were gathered.
    pub old_line_len: usize,
    /// Next match to display when cycling.
    pub next_cycle: usize,
}

impl Completer {
    pub fn new() -> Self {
        Self {
            first_tab: true,
            list_all_on_tab: false,
            matches: Vec::new(),
            partial_len: 0,
            old_line_len: 0,
            next_cycle: 0,
        }
    }

    /// Drop back to Idle. Called on any key that isn't Tab.
    pub fn reset(&mut self) {
        self.first_tab = true;
        self.list_all_on_tab = false;
        self.next_cycle = 0;
        self.old_line_len = 0;
        self.matches.clear();
        self.partial_len = 0;
    }

    /// Save a match list and enter the Cycling state.
    pub fn begin_cycling(&mut self, matches: Vec<String>, partial_len: usize, line_len: usize) {
        self.first_tab = false;
        self.matches = matches;
        self.partial_len = partial_len;
        self.old_line_len = line_len;
        self.next_cycle = 0;
    }
}

impl Default for Completer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_returns_to_idle() {
        let mut completer = Completer::new();
        completer.begin_cycling(vec!["one".into(), "two".into()], 1, 5);
        assert!(!completer.first_tab);

        completer.reset();
        assert!(completer.first_tab);
        assert!(completer.matches.is_empty());
        assert_eq!(completer.next_cycle, 0);
    }
}
