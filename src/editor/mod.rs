//! Interactive line editor.
//!
//! Consumes logical [`Key`] events from a [`Terminal`], maintains the edit
//! line with an insertion cursor, the command history and the tab-completion
//! state, and submits finished lines to the command processor. A handful of
//! terminal-level commands (`exit`, `clear`, the history commands) are
//! handled here as built-ins, before the command manager sees the line.

pub mod completer;
pub mod history;

use crate::core::args::CommandArgs;
use crate::core::command::{ExecContext, ExecMode, MAX_COMMAND_NAME_LENGTH};
use crate::core::command_manager::CommandManager;
use crate::core::cvar_manager::CVarManager;
use crate::core::strings::is_whitespace;
use crate::terminal::{color, Key, Terminal};

pub use completer::{
    Completer, MAX_ARG_MATCHES_PER_LINE, MAX_CMD_MATCHES_PER_LINE, MAX_COMPLETION_MATCHES,
    MAX_CVAR_MATCHES_PER_LINE,
};
pub use history::{History, CMD_HISTORY_MAX_SIZE, COMMAND_HIST_FILE};

/// Max length in bytes of the line input buffer.
pub const LINE_BUFFER_MAX_SIZE: usize = 2048;

/// Prompt marker printed at the start of every input line.
pub const DEFAULT_PROMPT: &str = "> ";

/// A terminal built-in command. Built-ins take no arguments and run before
/// the command manager is consulted.
pub struct BuiltInCmd {
    pub name: &'static str,
    pub desc: &'static str,
    run: fn(&mut LineEditor, &mut ExecContext<'_>),
}

/// The built-in command table: `exit`, `clear` and the history commands.
pub const BUILT_IN_COMMANDS: [BuiltInCmd; 6] = [
    BuiltInCmd {
        name: "exit",
        desc: "Exits the interactive terminal mode.",
        run: |editor, _| editor.set_exit(),
    },
    BuiltInCmd {
        name: "clear",
        desc: "Clears the terminal screen.",
        run: |editor, ctx| editor.clear(&mut *ctx.term),
    },
    BuiltInCmd {
        name: "histView",
        desc: "Prints the current command history.",
        run: |editor, ctx| editor.print_history(&mut *ctx.term),
    },
    BuiltInCmd {
        name: "histClear",
        desc: "Erases the current command history.",
        run: |editor, _| editor.history.clear(),
    },
    BuiltInCmd {
        name: "histSave",
        desc: "Saves the current command history to \"cmdhist.txt\".",
        run: |editor, ctx| {
            if editor.history.save(&mut *ctx.files) {
                ctx.term.print(&format!(
                    "Command history saved to \"{COMMAND_HIST_FILE}\".\n"
                ));
            }
        },
    },
    BuiltInCmd {
        name: "histLoad",
        desc: "Load previous command history from \"cmdhist.txt\".",
        run: |editor, ctx| {
            if editor.history.load(&mut *ctx.files) {
                ctx.term.print(&format!(
                    "Command history restored from \"{COMMAND_HIST_FILE}\".\n"
                ));
            }
        },
    },
];

/// Look up a built-in command by name.
pub fn built_in_command(name: &str) -> Option<&'static BuiltInCmd> {
    BUILT_IN_COMMANDS.iter().find(|cmd| cmd.name == name)
}

/// The interactive line editor.
///
/// The editor does not own the managers or the terminal; the host loop
/// assembles an [`ExecContext`] and feeds key events through
/// [`LineEditor::handle_key`].
pub struct LineEditor {
    line: String,
    cursor: usize,
    prompt: String,
    has_marker: bool,
    exit_flag: bool,
    exec_mode: ExecMode,
    pub history: History,
    completer: Completer,
}

impl LineEditor {
    pub fn new() -> Self {
        Self::with_prompt(DEFAULT_PROMPT)
    }

    pub fn with_prompt(prompt: impl Into<String>) -> Self {
        Self {
            line: String::new(),
            cursor: 0,
            prompt: prompt.into(),
            has_marker: false,
            exit_flag: false,
            exec_mode: ExecMode::Append,
            history: History::new(),
            completer: Completer::new(),
        }
    }

    /// The current edit line.
    pub fn line(&self) -> &str {
        &self.line
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Execution mode used when dispatching user commands on Return.
    pub fn set_exec_mode(&mut self, mode: ExecMode) {
        self.exec_mode = mode;
    }

    /// True after the built-in `exit` command ran.
    pub fn should_exit(&self) -> bool {
        self.exit_flag
    }

    pub fn set_exit(&mut self) {
        self.exit_flag = true;
    }

    pub fn cancel_exit(&mut self) {
        self.exit_flag = false;
    }

    /// Print the initial prompt marker. Call once before the key loop.
    pub fn begin(&mut self, term: &mut dyn Terminal) {
        term.print(&self.prompt);
        self.has_marker = true;
    }

    /// Handle one key event. Returns `true` when the event was consumed.
    pub fn handle_key(&mut self, key: Key, ctx: &mut ExecContext<'_>) -> bool {
        if key != Key::Tab {
            self.completer.reset();
        }

        match key {
            Key::Return => self.finish_command(ctx),
            Key::Tab => {
                let ExecContext {
                    commands,
                    cvars,
                    term,
                    ..
                } = ctx;
                self.tab_completion(&**commands, &**cvars, &mut **term)
            }
            Key::Backspace => self.pop_char(&mut *ctx.term),
            Key::Delete => self.del_char(&mut *ctx.term),
            Key::UpArrow => {
                let command = self.history.up(&self.line);
                self.set_line(&command, &mut *ctx.term);
                true
            }
            Key::DownArrow => {
                let command = self.history.down(&self.line);
                self.set_line(&command, &mut *ctx.term);
                true
            }
            Key::RightArrow => self.navigate_right(&mut *ctx.term),
            Key::LeftArrow => self.navigate_left(&mut *ctx.term),
            Key::Escape => self.discard_input(&mut *ctx.term),
            Key::Control(chr) => self.handle_ctrl_key(chr, ctx),
            Key::Char(chr) => self.insert_char(chr, &mut *ctx.term),
        }
    }

    /// Reprint the prompt marker if a drained command batch left the line
    /// without one. Call after [`CommandManager::exec_buffered`].
    pub fn update(&mut self, term: &mut dyn Terminal) {
        if !self.has_marker && !self.exit_flag {
            term.print(&self.prompt);
            self.has_marker = true;
        }
    }

    /// Clear the screen and reset the edit line and completion state.
    pub fn clear(&mut self, term: &mut dyn Terminal) {
        term.clear_screen();
        term.print(&self.prompt);
        self.line.clear();
        self.cursor = 0;
        self.has_marker = true;
        self.completer.reset();
    }

    // ========================================================
    // Line submission:
    // ========================================================

    fn finish_command(&mut self, ctx: &mut ExecContext<'_>) -> bool {
        // Break the line but hold the marker until the command has run.
        self.new_line_no_marker(&mut *ctx.term);

        if !self.line.is_empty() {
            if !self.line.trim().is_empty() {
                let line = std::mem::take(&mut self.line);
                self.history.add(&line);
                self.exec_cmd_line(&line, ctx);
            } else {
                self.line.clear();
            }
            self.cursor = 0;
        }

        // Defer the marker while buffered commands are pending; update()
        // prints it after the host drains them.
        let can_add_marker = !ctx.commands.has_buffered_commands();
        if can_add_marker && !self.has_marker && !self.exit_flag {
            ctx.term.print(&self.prompt);
            self.has_marker = true;
        }
        true
    }

    fn exec_cmd_line(&mut self, command_line: &str, ctx: &mut ExecContext<'_>) {
        let trimmed = command_line.trim_start();
        let Some(name) = trimmed.split_whitespace().next() else {
            return;
        };

        // Short-form CVar interaction: a bare name prints the value, a name
        // plus argument sets it.
        if ctx.cvars.find(name).is_some() {
            let args = CommandArgs::new(trimmed);
            if args.is_empty() {
                if let Some(cvar) = ctx.cvars.find(name) {
                    ctx.term.print(&format!(
                        "{} is: \"{}\"  |  default: \"{}\"\n",
                        cvar.name(),
                        cvar.get_string_value(),
                        cvar.default_value_string()
                    ));
                }
            } else {
                if args.arg_count() > 1 {
                    ctx.term.set_color(color::yellow());
                    ctx.term
                        .print("CVar update takes one argument. Ignoring extraneous ones...\n");
                    ctx.term.restore_color();
                }
                let value = args.get_or(0, "");
                let updated = ctx
                    .cvars
                    .find_mut(name)
                    .is_some_and(|cvar| cvar.set_string_value(value));
                if !updated {
                    ctx.term.set_color(color::yellow());
                    ctx.term
                        .print(&format!("Cannot set {name} to \"{value}\"!\n"));
                    ctx.term.restore_color();
                }
            }
            return;
        }

        // Terminal built-ins second:
        if let Some(built_in) = built_in_command(name) {
            (built_in.run)(self, ctx);
            return;
        }

        // User-defined commands last:
        if ctx.commands.find(name).is_some() {
            let mode = self.exec_mode;
            let (commands, mut env) = ctx.split();
            commands.execute(mode, trimmed, &mut env);
            return;
        }

        ctx.term.print(&format!("{name}: Command not found.\n"));
    }

    // ========================================================
    // Cursor and text editing:
    // ========================================================

    fn insert_char(&mut self, chr: char, term: &mut dyn Terminal) -> bool {
        if !chr.is_ascii() || chr.is_ascii_control() {
            return false; // Not printable, don't consume the event.
        }
        if self.line.len() >= LINE_BUFFER_MAX_SIZE - 1 {
            return false;
        }

        if self.cursor == self.line.len() {
            // Inserting at the end, usual case.
            self.line.push(chr);
            self.cursor += 1;
            term.print(&chr.to_string());
        } else {
            self.line.insert(self.cursor, chr);
            self.cursor += 1;
            self.clear_visible_edit_line(term);
            term.print(&self.line);
            self.redraw_input_line(term);
        }
        true
    }

    fn pop_char(&mut self, term: &mut dyn Terminal) -> bool {
        if self.line.is_empty() || self.cursor == 0 {
            return true;
        }

        self.clear_visible_edit_line(term);
        self.line.remove(self.cursor - 1);
        self.cursor -= 1;
        term.print(&self.line);
        if self.cursor != self.line.len() {
            self.redraw_input_line(term);
        }
        true
    }

    fn del_char(&mut self, term: &mut dyn Terminal) -> bool {
        if self.line.is_empty() || self.cursor == self.line.len() {
            return true;
        }

        self.clear_visible_edit_line(term);
        self.line.remove(self.cursor);
        term.print(&self.line);
        self.redraw_input_line(term);
        true
    }

    fn navigate_left(&mut self, term: &mut dyn Terminal) -> bool {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.redraw_input_line(term);
        }
        true
    }

    fn navigate_right(&mut self, term: &mut dyn Terminal) -> bool {
        if self.cursor < self.line.len() {
            self.cursor += 1;
            self.redraw_input_line(term);
        }
        true
    }

    fn discard_input(&mut self, term: &mut dyn Terminal) -> bool {
        self.history.reset_cursor();
        self.set_line("", term);
        true
    }

    fn handle_ctrl_key(&mut self, chr: char, ctx: &mut ExecContext<'_>) -> bool {
        match chr {
            // Copy the input line to the clipboard.
            'c' => {
                let line = self.line.clone();
                ctx.term.set_clipboard(&line);
                true
            }
            // Paste, inserting at the current cursor position.
            'v' => {
                if let Some(text) = ctx.term.get_clipboard() {
                    for pasted in text.chars() {
                        self.insert_char(pasted, &mut *ctx.term);
                    }
                }
                true
            }
            'l' => {
                self.clear(&mut *ctx.term);
                true
            }
            // Unix-style history chords.
            'n' => {
                let command = self.history.down(&self.line);
                self.set_line(&command, &mut *ctx.term);
                true
            }
            'p' => {
                let command = self.history.up(&self.line);
                self.set_line(&command, &mut *ctx.term);
                true
            }
            _ => false,
        }
    }

    /// Replace the edit line as if the user had typed `text`.
    pub fn set_line(&mut self, text: &str, term: &mut dyn Terminal) {
        self.clear_visible_edit_line(term);
        if text.is_empty() {
            self.line.clear();
            self.cursor = 0;
        } else {
            term.print(text);
            self.line = text.to_string();
            self.line.truncate(LINE_BUFFER_MAX_SIZE - 1);
            self.cursor = self.line.len();
        }
    }

    fn new_line_no_marker(&mut self, term: &mut dyn Terminal) {
        term.print("\n");
        self.has_marker = false;
    }

    fn new_line_with_marker(&mut self, term: &mut dyn Terminal) {
        term.print(&format!("\n{}", self.prompt));
        self.has_marker = true;
    }

    fn clear_visible_edit_line(&mut self, term: &mut dyn Terminal) {
        // Fill the line with blanks to clear it out.
        let blank = " ".repeat(self.line.len() + self.prompt.len());
        term.print(&format!("\r{}\r{}", blank, self.prompt));
        self.has_marker = true;
    }

    fn redraw_input_line(&mut self, term: &mut dyn Terminal) {
        // Position the cursor by redrawing the line up to it.
        term.print(&format!("\r{}{}", self.prompt, &self.line[..self.cursor]));
    }

    // ========================================================
    // History display:
    // ========================================================

    pub fn print_history(&mut self, term: &mut dyn Terminal) {
        term.print("----- Command History -----\n");
        for (index, command) in self.history.iter().enumerate() {
            term.print(&format!("[{index:02}]: {command}\n"));
        }
    }

    // ========================================================
    // Tab completion:
    // ========================================================

    fn tab_completion(
        &mut self,
        commands: &CommandManager,
        cvars: &CVarManager,
        term: &mut dyn Terminal,
    ) -> bool {
        // Not attempted unless the cursor sits at the end of the line.
        if self.cursor != self.line.len() {
            return true;
        }

        if self.line.is_empty() {
            self.list_all_commands(commands, term);
            return true;
        }

        if self.has_full_name_in_line() {
            self.argument_completion(commands, cvars, term);
        } else {
            self.name_completion(commands, cvars, term);
        }
        true
    }

    /// A name is complete once whitespace separates it from the cursor.
    fn has_full_name_in_line(&self) -> bool {
        let mut found_non_white = false;
        for &byte in self.line.as_bytes() {
            if byte != b' ' {
                found_non_white = true;
            } else if found_non_white {
                return true;
            }
        }
        false
    }

    fn argument_completion(
        &mut self,
        commands: &CommandManager,
        cvars: &CVarManager,
        term: &mut dyn Terminal,
    ) {
        // An unclosed "$(" before the cursor completes CVar names.
        if let Some(dollar) = self.line.rfind('$') {
            let after = &self.line[dollar + 1..];
            if let Some(inner) = after.strip_prefix('(') {
                if !inner.contains(')') {
                    let partial = inner.to_string();
                    self.display_completion_matches(
                        term,
                        &partial,
                        MAX_CVAR_MATCHES_PER_LINE,
                        false,
                        true,
                        |p, max| {
                            let (names, total) = cvars.find_names_with_partial(p, max);
                            (names.into_iter().map(str::to_string).collect(), total)
                        },
                    );
                    return;
                }
            }
        }

        // Find the command/CVar name and the partial argument at the end.
        let bytes = self.line.as_bytes();
        let mut i = 0;
        while i < bytes.len() && is_whitespace(bytes[i]) {
            i += 1;
        }
        let name_start = i;
        while i < bytes.len() && !is_whitespace(bytes[i]) {
            i += 1;
        }
        let name = self.line[name_start..i].to_string();

        // The last whitespace outside quotes starts the completion target.
        let mut quotes = false;
        let mut last_white = i;
        while i < bytes.len() {
            let byte = bytes[i];
            if !quotes && is_whitespace(byte) {
                last_white = i;
            } else if byte == b'"' || byte == b'\'' {
                quotes = !quotes;
            }
            i += 1;
        }
        let mut partial_start = last_white;
        while partial_start < bytes.len() && is_whitespace(bytes[partial_start]) {
            partial_start += 1;
        }
        let partial = self.line[partial_start..].to_string();

        if let Some(cvar) = cvars.find(&name) {
            // Cycling raw value suggestions only makes sense for an empty
            // partial or a completion callback.
            let allow_cycling = partial.is_empty() || cvar.has_value_completion();
            self.display_completion_matches(
                term,
                &partial,
                MAX_ARG_MATCHES_PER_LINE,
                false,
                allow_cycling,
                |p, max| {
                    let mut values = cvar.completion_values(p);
                    let total = values.len();
                    values.truncate(max);
                    (values, total)
                },
            );
        } else if let Some(command) = commands.find(&name) {
            self.display_completion_matches(
                term,
                &partial,
                MAX_ARG_MATCHES_PER_LINE,
                true,
                true,
                |p, max| {
                    let mut values = command.argument_completion(p, cvars, commands);
                    let total = values.len();
                    values.truncate(max);
                    (values, total)
                },
            );
        }
    }

    fn name_completion(
        &mut self,
        commands: &CommandManager,
        cvars: &CVarManager,
        term: &mut dyn Terminal,
    ) {
        let partial = self.line.trim_start().to_string();
        if partial.is_empty() {
            return;
        }

        // Built-ins first:
        let mut matched = self.display_completion_matches(
            term,
            &partial,
            MAX_CMD_MATCHES_PER_LINE,
            true,
            true,
            |p, max| {
                let mut names = Vec::new();
                let mut total = 0;
                for built_in in &BUILT_IN_COMMANDS {
                    if built_in.name.starts_with(p) {
                        if names.len() < max {
                            names.push(built_in.name.to_string());
                        }
                        total += 1;
                    }
                }
                (names, total)
            },
        );

        // CVar names second, to cover setting a var value:
        if !matched {
            matched = self.display_completion_matches(
                term,
                &partial,
                MAX_CVAR_MATCHES_PER_LINE,
                true,
                true,
                |p, max| {
                    let (names, total) = cvars.find_names_with_partial(p, max);
                    (names.into_iter().map(str::to_string).collect(), total)
                },
            );
        }

        // Lastly the user-defined commands:
        if !matched {
            self.display_completion_matches(
                term,
                &partial,
                MAX_CMD_MATCHES_PER_LINE,
                true,
                true,
                |p, max| {
                    let (names, total) = commands.find_names_with_partial(p, max);
                    (names.into_iter().map(str::to_string).collect(), total)
                },
            );
        }
    }

    /// First-Tab listing/completion and subsequent-Tab cycling.
    ///
    /// `find` receives the partial string and the match cap and returns the
    /// matches plus the total found (which may exceed the cap).
    fn display_completion_matches(
        &mut self,
        term: &mut dyn Terminal,
        partial: &str,
        max_per_line: usize,
        whitespace_after_single_match: bool,
        allow_cycling: bool,
        find: impl FnOnce(&str, usize) -> (Vec<String>, usize),
    ) -> bool {
        if self.completer.first_tab {
            let (matches, total) = find(partial, MAX_COMPLETION_MATCHES);
            if total == 0 || matches.is_empty() {
                return false;
            }

            if total == 1 {
                // Exactly one match: complete in place.
                let matched = &matches[0];
                let tail_start = partial.len().min(matched.len());
                let mut completion = matched[tail_start..].to_string();
                if whitespace_after_single_match {
                    completion.push(' ');
                }
                self.line.push_str(&completion);
                self.line.truncate(LINE_BUFFER_MAX_SIZE - 1);
                self.cursor = self.line.len();
                term.print(&completion);
            } else {
                self.new_line_no_marker(term);
                list_matches(term, partial, &matches, total, max_per_line, allow_cycling);
                self.new_line_with_marker(term);
                term.print(&self.line);

                if allow_cycling {
                    self.completer
                        .begin_cycling(matches, partial.len(), self.line.len());
                }
            }
            true
        } else {
            if self.completer.matches.is_empty() {
                return false;
            }
            let index = self.completer.next_cycle % self.completer.matches.len();
            let matched = self.completer.matches[index].clone();
            let partial_len = self.completer.partial_len.min(matched.len());

            self.clear_visible_edit_line(term);
            let prefix_end = self
                .completer
                .old_line_len
                .saturating_sub(self.completer.partial_len);
            if prefix_end > 0 {
                term.print(&self.line[..prefix_end]);
            }

            // Partial in the default color, completed tail in the accent.
            term.print(&matched[..partial_len]);
            term.set_color(color::cyan());
            term.print(&matched[partial_len..]);
            term.restore_color();

            self.line.truncate(self.completer.old_line_len);
            self.line.push_str(&matched[partial_len..]);
            self.line.truncate(LINE_BUFFER_MAX_SIZE - 1);
            self.cursor = self.line.len();

            self.completer.next_cycle = (index + 1) % self.completer.matches.len();
            true
        }
    }

    /// Double-Tab on an empty line: hint first, then the command listing.
    fn list_all_commands(&mut self, commands: &CommandManager, term: &mut dyn Terminal) {
        if !self.completer.list_all_on_tab {
            term.print(&format!(
                "\rPress [{}] again to list commands...\n",
                Key::Tab.name()
            ));
            term.print(&self.prompt);
            self.has_marker = true;
            self.completer.list_all_on_tab = true;
            return;
        }

        let mut names: Vec<&str> = commands
            .iter()
            .take(MAX_COMPLETION_MATCHES)
            .map(|command| command.name())
            .collect();
        names.sort_unstable();

        let mut written_in_line = 0;

        // Built-ins first, in the alternate color:
        term.set_color(color::cyan());
        for (index, built_in) in BUILT_IN_COMMANDS.iter().enumerate() {
            term.print(&format!("{:<width$}", built_in.name, width = MAX_COMMAND_NAME_LENGTH));
            written_in_line += 1;
            if written_in_line >= MAX_CMD_MATCHES_PER_LINE && index != BUILT_IN_COMMANDS.len() - 1 {
                written_in_line = 0;
                term.print("\n");
            }
        }

        // Now the registered commands in the normal color:
        term.restore_color();
        for (index, name) in names.iter().enumerate() {
            term.print(&format!("{name:<width$}", width = MAX_COMMAND_NAME_LENGTH));
            written_in_line += 1;
            if written_in_line >= MAX_CMD_MATCHES_PER_LINE && index != names.len() - 1 {
                written_in_line = 0;
                term.print("\n");
            }
        }

        let total = commands.len();
        if names.len() < total {
            term.set_color(color::cyan());
            term.print(&format!("\n+{} commands...", total - names.len()));
            term.restore_color();
        }

        self.new_line_with_marker(term);
        self.completer.list_all_on_tab = false;
    }
}

impl Default for LineEditor {
    fn default() -> Self {
        Self::new()
    }
}

/// Print a completion match list, the shared partial prefix optionally in
/// the accent color, several matches per line padded into columns.
fn list_matches(
    term: &mut dyn Terminal,
    partial: &str,
    matches: &[String],
    total: usize,
    max_per_line: usize,
    colored: bool,
) {
    let mut written_in_line = 0;
    for index in 0..total {
        if index == matches.len() {
            term.set_color(color::cyan());
            term.print(&format!("+{} matches...", total - matches.len()));
            term.restore_color();
            break;
        }

        let matched = &matches[index];
        let partial_len = partial.len().min(matched.len());

        if colored {
            term.set_color(color::cyan());
            term.print(&matched[..partial_len]);
            term.restore_color();
        } else {
            term.print(&matched[..partial_len]);
        }

        if max_per_line > 1 {
            let width = MAX_COMMAND_NAME_LENGTH.saturating_sub(partial_len);
            term.print(&format!("{:<width$}", &matched[partial_len..]));
        } else {
            term.print(&matched[partial_len..]);
        }

        written_in_line += 1;
        if written_in_line >= max_per_line {
            if total - index > 1 {
                term.print("\n");
            }
            written_in_line = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::command::CommandDef;
    use crate::core::cvar::{CVar, CVarFlags};
    use crate::core::command_manager::EXEC_ALL;
    use crate::core::command::ExecEnv;
    use crate::fileio::StdFileIo;
    use crate::terminal::BufferTerminal;
    use std::sync::{Arc, Mutex};

    struct Fixture {
        commands: CommandManager,
        cvars: CVarManager,
        term: BufferTerminal,
        files: StdFileIo,
    }

    impl Fixture {
        fn new() -> Self {
            // Keep output assertions free of ANSI codes.
            color::set_enabled(false);
            Self {
                commands: CommandManager::new(),
                cvars: CVarManager::new(),
                term: BufferTerminal::new(),
                files: StdFileIo::new(),
            }
        }

        fn press(&mut self, editor: &mut LineEditor, key: Key) {
            let mut ctx = ExecContext {
                commands: &mut self.commands,
                cvars: &mut self.cvars,
                term: &mut self.term,
                files: &mut self.files,
            };
            editor.handle_key(key, &mut ctx);
        }

        fn type_text(&mut self, editor: &mut LineEditor, text: &str) {
            for chr in text.chars() {
                self.press(editor, Key::Char(chr));
            }
        }

        fn submit(&mut self, editor: &mut LineEditor, text: &str) {
            self.type_text(editor, text);
            self.press(editor, Key::Return);
        }

        fn drain(&mut self) {
            let mut env = ExecEnv {
                cvars: &mut self.cvars,
                term: &mut self.term,
                files: &mut self.files,
            };
            self.commands.exec_buffered(EXEC_ALL, &mut env);
        }
    }

    fn recording_command(name: &str, log: &Arc<Mutex<Vec<String>>>) -> CommandDef {
        let log = Arc::clone(log);
        CommandDef::new(name, move |args, _| {
            log.lock()
                .unwrap()
                .push(args.iter().collect::<Vec<_>>().join(" "));
        })
    }

    #[test]
    fn test_typing_builds_line() {
        let mut fixture = Fixture::new();
        let mut editor = LineEditor::new();

        fixture.type_text(&mut editor, "echo hi");
        assert_eq!(editor.line(), "echo hi");
        assert_eq!(editor.cursor(), 7);
        assert!(fixture.term.output.contains("echo hi"));
    }

    #[test]
    fn test_backspace_and_delete() {
        let mut fixture = Fixture::new();
        let mut editor = LineEditor::new();

        fixture.type_text(&mut editor, "abcd");
        fixture.press(&mut editor, Key::Backspace);
        assert_eq!(editor.line(), "abc");

        fixture.press(&mut editor, Key::LeftArrow);
        fixture.press(&mut editor, Key::LeftArrow);
        assert_eq!(editor.cursor(), 1);
        fixture.press(&mut editor, Key::Delete);
        assert_eq!(editor.line(), "ac");
        fixture.press(&mut editor, Key::Backspace);
        assert_eq!(editor.line(), "c");
        assert_eq!(editor.cursor(), 0);
    }

    #[test]
    fn test_cursor_insertion_in_middle() {
        let mut fixture = Fixture::new();
        let mut editor = LineEditor::new();

        fixture.type_text(&mut editor, "ac");
        fixture.press(&mut editor, Key::LeftArrow);
        fixture.press(&mut editor, Key::Char('b'));
        assert_eq!(editor.line(), "abc");
        assert_eq!(editor.cursor(), 2);
    }

    #[test]
    fn test_return_runs_user_command() {
        let mut fixture = Fixture::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        fixture
            .commands
            .register(recording_command("greet", &log), None);

        let mut editor = LineEditor::new();
        fixture.submit(&mut editor, "greet world");
        // Default exec mode buffers the command until the host drains it.
        assert!(fixture.commands.has_buffered_commands());
        fixture.drain();

        assert_eq!(*log.lock().unwrap(), ["world"]);
        assert_eq!(editor.line(), "");
    }

    #[test]
    fn test_immediate_exec_mode() {
        let mut fixture = Fixture::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        fixture
            .commands
            .register(recording_command("greet", &log), None);

        let mut editor = LineEditor::new();
        editor.set_exec_mode(ExecMode::Immediate);
        fixture.submit(&mut editor, "greet now");

        assert_eq!(*log.lock().unwrap(), ["now"]);
        assert!(!fixture.commands.has_buffered_commands());
    }

    #[test]
    fn test_marker_deferred_until_update() {
        let mut fixture = Fixture::new();
        fixture
            .commands
            .register(CommandDef::new("noop", |_, _| {}), None);

        let mut editor = LineEditor::new();
        fixture.submit(&mut editor, "noop");
        let before = fixture.term.output.clone();
        assert!(!before.ends_with(DEFAULT_PROMPT));

        fixture.drain();
        editor.update(&mut fixture.term);
        assert!(fixture.term.output.ends_with(DEFAULT_PROMPT));
    }

    #[test]
    fn test_short_form_cvar_print() {
        let mut fixture = Fixture::new();
        fixture
            .cvars
            .register(CVar::int("r_fov", 90, 60, 120));

        let mut editor = LineEditor::new();
        fixture.submit(&mut editor, "r_fov");
        assert!(fixture
            .term
            .output
            .contains("r_fov is: \"90\"  |  default: \"90\""));
    }

    #[test]
    fn test_short_form_cvar_set() {
        let mut fixture = Fixture::new();
        fixture
            .cvars
            .register(CVar::int("r_fov", 90, 60, 120).flags(CVarFlags::RANGE_CHECK));

        let mut editor = LineEditor::new();
        fixture.submit(&mut editor, "r_fov 100");
        assert_eq!(fixture.cvars.get_int_value("r_fov"), 100);

        // Extra arguments warn but the first one still applies.
        fixture.submit(&mut editor, "r_fov 80 extra");
        assert_eq!(fixture.cvars.get_int_value("r_fov"), 80);
        assert!(fixture.term.output.contains("takes one argument"));

        fixture.submit(&mut editor, "r_fov 999");
        assert!(fixture.term.output.contains("Cannot set r_fov to \"999\"!"));
        assert_eq!(fixture.cvars.get_int_value("r_fov"), 80);
    }

    #[test]
    fn test_unknown_name_reports() {
        let mut fixture = Fixture::new();
        let mut editor = LineEditor::new();
        fixture.submit(&mut editor, "bogus");
        assert!(fixture.term.output.contains("bogus: Command not found."));
    }

    #[test]
    fn test_builtin_exit() {
        let mut fixture = Fixture::new();
        let mut editor = LineEditor::new();
        assert!(!editor.should_exit());
        fixture.submit(&mut editor, "exit");
        assert!(editor.should_exit());
    }

    #[test]
    fn test_builtin_clear_resets_line_state() {
        let mut fixture = Fixture::new();
        let mut editor = LineEditor::new();
        fixture.submit(&mut editor, "clear");
        assert_eq!(fixture.term.cleared, 1);
        assert_eq!(editor.line(), "");
    }

    #[test]
    fn test_history_walk() {
        let mut fixture = Fixture::new();
        let mut editor = LineEditor::new();
        editor.set_exec_mode(ExecMode::Immediate);

        fixture.submit(&mut editor, "first");
        fixture.submit(&mut editor, "second");

        fixture.press(&mut editor, Key::UpArrow);
        assert_eq!(editor.line(), "second");
        fixture.press(&mut editor, Key::UpArrow);
        assert_eq!(editor.line(), "first");
        fixture.press(&mut editor, Key::DownArrow);
        assert_eq!(editor.line(), "second");
    }

    #[test]
    fn test_escape_discards_input() {
        let mut fixture = Fixture::new();
        let mut editor = LineEditor::new();
        fixture.type_text(&mut editor, "half typed");
        fixture.press(&mut editor, Key::Escape);
        assert_eq!(editor.line(), "");
        assert_eq!(editor.cursor(), 0);
    }

    #[test]
    fn test_clipboard_copy_paste() {
        let mut fixture = Fixture::new();
        let mut editor = LineEditor::new();
        fixture.type_text(&mut editor, "copy me");
        fixture.press(&mut editor, Key::Control('c'));
        assert_eq!(fixture.term.clipboard.as_deref(), Some("copy me"));

        fixture.press(&mut editor, Key::Escape);
        fixture.press(&mut editor, Key::Control('v'));
        assert_eq!(editor.line(), "copy me");
    }

    #[test]
    fn test_tab_single_match_completes_with_space() {
        let mut fixture = Fixture::new();
        fixture
            .commands
            .register(CommandDef::new("listCmds", |_, _| {}), None);

        let mut editor = LineEditor::new();
        fixture.type_text(&mut editor, "listC");
        fixture.press(&mut editor, Key::Tab);
        assert_eq!(editor.line(), "listCmds ");
        assert_eq!(editor.cursor(), 9);
    }

    #[test]
    fn test_tab_cycles_multiple_matches() {
        let mut fixture = Fixture::new();
        fixture
            .cvars
            .register(CVar::int("sv_gravity", 800, 0, 2000));
        fixture.cvars.register(CVar::int("sv_cheats", 0, 0, 1));

        let mut editor = LineEditor::new();
        fixture.type_text(&mut editor, "sv_");
        // First Tab lists the matches.
        fixture.press(&mut editor, Key::Tab);
        assert!(fixture.term.output.contains("cheats"));
        assert!(fixture.term.output.contains("gravity"));
        assert_eq!(editor.line(), "sv_");

        // Subsequent Tabs cycle through the sorted list.
        fixture.press(&mut editor, Key::Tab);
        assert_eq!(editor.line(), "sv_cheats");
        fixture.press(&mut editor, Key::Tab);
        assert_eq!(editor.line(), "sv_gravity");
        fixture.press(&mut editor, Key::Tab);
        assert_eq!(editor.line(), "sv_cheats");

        // Any other key resets the cycle state.
        fixture.press(&mut editor, Key::Escape);
        assert!(editor.line().is_empty());
    }

    #[test]
    fn test_tab_on_empty_line_hints_then_lists() {
        let mut fixture = Fixture::new();
        fixture
            .commands
            .register(CommandDef::new("mycmd", |_, _| {}), None);

        let mut editor = LineEditor::new();
        fixture.press(&mut editor, Key::Tab);
        assert!(fixture.term.output.contains("Press [Tab] again"));

        fixture.press(&mut editor, Key::Tab);
        assert!(fixture.term.output.contains("mycmd"));
        assert!(fixture.term.output.contains("exit"));
        assert!(fixture.term.output.contains("histView"));
    }

    #[test]
    fn test_tab_completes_cvar_value() {
        let mut fixture = Fixture::new();
        fixture.cvars.register(
            CVar::string("team", "red").allowed_values(["red", "blue"]),
        );

        let mut editor = LineEditor::new();
        fixture.type_text(&mut editor, "team ");
        fixture.press(&mut editor, Key::Tab);
        assert!(fixture.term.output.contains("red"));
        assert!(fixture.term.output.contains("blue"));
    }

    #[test]
    fn test_tab_completes_cvar_name_inside_substitution() {
        let mut fixture = Fixture::new();
        fixture
            .cvars
            .register(CVar::string("myvalue", "x"));

        let mut editor = LineEditor::new();
        fixture.type_text(&mut editor, "echo $(myv");
        fixture.press(&mut editor, Key::Tab);
        assert_eq!(editor.line(), "echo $(myvalue");
    }

    #[test]
    fn test_tab_not_at_line_end_is_ignored() {
        let mut fixture = Fixture::new();
        fixture
            .commands
            .register(CommandDef::new("listCmds", |_, _| {}), None);

        let mut editor = LineEditor::new();
        fixture.type_text(&mut editor, "listC");
        fixture.press(&mut editor, Key::LeftArrow);
        fixture.press(&mut editor, Key::Tab);
        assert_eq!(editor.line(), "listC");
    }

    #[test]
    fn test_print_history_format() {
        let mut fixture = Fixture::new();
        let mut editor = LineEditor::new();
        editor.history.add("echo one");
        editor.history.add("echo two");
        editor.print_history(&mut fixture.term);
        assert!(fixture.term.output.contains("[00]: echo one"));
        assert!(fixture.term.output.contains("[01]: echo two"));
    }
}
