//! Command registry, command buffer and command-string processor.

use crate::core::args::{CommandArgs, MAX_COMMAND_ARG_STR_LENGTH};
use crate::core::command::{
    Command, CommandDef, CommandKind, ExecContext, ExecEnv, ExecMode, MAX_COMMAND_NAME_LENGTH,
};
use crate::core::cvar_manager::CVarManager;
use crate::core::registry::{CaseSensitive, Registry};
use crate::core::strings::is_whitespace;
use crate::error::report_error;
use crate::fileio::FileMode;

/// Character separating commands on the same line or in the buffer.
pub const COMMAND_TEXT_SEPARATOR: u8 = b';';

/// Max length in bytes of the command buffer.
pub const COMMAND_BUFFER_SIZE: usize = 65535;

/// If this many commands run in a single drain, there's probably a reentrant
/// loop; the buffer is discarded.
pub const MAX_REENTRANT_COMMANDS: u32 = 999_999;

/// Pass to [`CommandManager::exec_buffered`] to drain every buffered command.
pub const EXEC_ALL: u32 = u32::MAX;

/// Pass to [`CommandManager::disable_commands_with_flags`] to stop every
/// command regardless of its flags.
pub const DISABLE_ALL: u32 = u32::MAX;

// Recursion cap for nested `$(var)` expansions.
const MAX_EXPANSION_DEPTH: u32 = 15;

struct Extraction {
    consumed: usize,
    overflowed: bool,
    found: bool,
}

/// Owns every registered [`Command`] and processes command text.
///
/// Command strings pass through [`extract_next_command`]: commands are
/// separated by `;` or newlines, quotes group text, a trailing backslash
/// continues to the next line, and `$(var)` interpolates CVar values.
/// Buffered text accumulates in a fixed 64 KiB buffer drained by
/// [`CommandManager::exec_buffered`].
pub struct CommandManager {
    commands: Registry<Command, CaseSensitive>,
    disabled_flags: u32,
    alias_count: usize,
    buffer: Box<[u8]>,
    buffer_used: usize,
}

impl CommandManager {
    pub fn new() -> Self {
        Self {
            commands: Registry::new(),
            disabled_flags: 0,
            alias_count: 0,
            buffer: vec![0; COMMAND_BUFFER_SIZE].into_boxed_slice(),
            buffer_used: 0,
        }
    }

    pub fn with_bucket_count(bucket_count: usize) -> Self {
        Self {
            commands: Registry::with_bucket_count(bucket_count),
            ..Self::new()
        }
    }

    /// Tests if a string complies with the command naming rules: a C
    /// identifier shorter than [`MAX_COMMAND_NAME_LENGTH`]. Unlike CVar
    /// names, dots are not allowed.
    pub fn is_valid_command_name(name: &str) -> bool {
        let bytes = name.as_bytes();
        let Some(&first) = bytes.first() else {
            return false;
        };
        if !first.is_ascii_alphabetic() && first != b'_' {
            return false;
        }
        if !bytes[1..]
            .iter()
            .all(|&c| c.is_ascii_alphanumeric() || c == b'_')
        {
            return false;
        }
        name.len() < MAX_COMMAND_NAME_LENGTH
    }

    // ========================================================
    // Registration / querying:
    // ========================================================

    /// Register a command. Fails on a bad name, a duplicate, or a collision
    /// with a CVar name when a CVar manager is supplied for the check.
    pub fn register(&mut self, def: CommandDef, cvars: Option<&CVarManager>) -> bool {
        if !self.register_pre_validate(&def.name, cvars) {
            return false;
        }
        self.commands.link(Command::new(def));
        true
    }

    fn register_pre_validate(&self, name: &str, cvars: Option<&CVarManager>) -> bool {
        if !Self::is_valid_command_name(name) {
            report_error!("Bad command name '{}'! Can't register it.", name);
            return false;
        }
        if self.commands.contains(name) {
            report_error!(
                "Command '{}' already registered! Duplicate commands are not allowed.",
                name
            );
            return false;
        }
        if let Some(cvars) = cvars {
            if cvars.find(name).is_some() {
                report_error!(
                    "A CVar named '{}' already exists. Cannot declare a new command with this name!",
                    name
                );
                return false;
            }
        }
        true
    }

    /// Create an alias that re-submits `target` with the given mode whenever
    /// it is invoked.
    pub fn create_alias(
        &mut self,
        name: &str,
        target: &str,
        mode: ExecMode,
        description: &str,
        cvars: Option<&CVarManager>,
    ) -> bool {
        if target.is_empty() {
            report_error!("Can't create a command alias for an empty string!");
            return false;
        }
        if !self.register_pre_validate(name, cvars) {
            return false;
        }
        self.commands.link(Command::new_alias(
            name.into(),
            description.into(),
            target.to_string(),
            mode,
        ));
        self.alias_count += 1;
        true
    }

    pub fn find(&self, name: &str) -> Option<&Command> {
        self.commands.find(name)
    }

    /// Find commands whose name starts with `partial`. Up to `max_matches`
    /// references are returned sorted alphabetically; the second value is
    /// the total number of matches.
    pub fn find_with_partial_name(
        &self,
        partial: &str,
        max_matches: usize,
    ) -> (Vec<&Command>, usize) {
        if partial.is_empty() || max_matches == 0 {
            return (Vec::new(), 0);
        }
        let mut matches = Vec::new();
        let mut total = 0;
        for command in self.commands.iter() {
            if command.name().starts_with(partial) {
                if matches.len() < max_matches {
                    matches.push(command);
                }
                total += 1;
            }
        }
        matches.sort_by(|a, b| a.name().cmp(b.name()));
        (matches, total)
    }

    /// Same as [`CommandManager::find_with_partial_name`] but yields names.
    pub fn find_names_with_partial(&self, partial: &str, max_matches: usize) -> (Vec<&str>, usize) {
        let (matches, total) = self.find_with_partial_name(partial, max_matches);
        (matches.into_iter().map(Command::name).collect(), total)
    }

    /// Find commands with any of the given flag bits, sorted alphabetically.
    pub fn find_with_flags(&self, flags: u32, max_matches: usize) -> (Vec<&Command>, usize) {
        if flags == 0 || max_matches == 0 {
            return (Vec::new(), 0);
        }
        let mut matches = Vec::new();
        let mut total = 0;
        for command in self.commands.iter() {
            if command.get_flags() & flags != 0 {
                if matches.len() < max_matches {
                    matches.push(command);
                }
                total += 1;
            }
        }
        matches.sort_by(|a, b| a.name().cmp(b.name()));
        (matches, total)
    }

    /// Remove a command or alias by name, destroying it.
    pub fn remove(&mut self, name: &str) -> bool {
        if !Self::is_valid_command_name(name) {
            report_error!("'{}' is not a valid command name! Nothing to remove.", name);
            return false;
        }
        match self.commands.unlink(name) {
            Some(command) => {
                if command.is_alias() {
                    self.alias_count -= 1;
                }
                true
            }
            None => false,
        }
    }

    /// Remove the command only if it is an alias.
    pub fn remove_alias(&mut self, name: &str) -> bool {
        if !Self::is_valid_command_name(name) {
            return false;
        }
        if !self.find(name).is_some_and(Command::is_alias) {
            return false;
        }
        self.remove(name)
    }

    /// Remove every registered alias, leaving regular commands untouched.
    pub fn remove_all_aliases(&mut self) {
        let names: Vec<String> = self
            .commands
            .iter()
            .filter(|c| c.is_alias())
            .map(|c| c.name().to_string())
            .collect();
        for name in names {
            self.remove(&name);
        }
        self.alias_count = 0;
    }

    /// Remove every command and alias.
    pub fn remove_all(&mut self) {
        self.commands.clear();
        self.alias_count = 0;
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn alias_count(&self) -> usize {
        self.alias_count
    }

    /// Iterate all registered commands, most recently registered first.
    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter()
    }

    /// Commands whose flags intersect `flags` will be refused execution.
    /// [`DISABLE_ALL`] stops every command.
    pub fn disable_commands_with_flags(&mut self, flags: u32) {
        self.disabled_flags = flags;
    }

    /// Restore execution of all commands.
    pub fn enable_all_commands(&mut self) {
        self.disabled_flags = 0;
    }

    // ========================================================
    // Command text execution:
    // ========================================================

    /// Execute the command text immediately, without touching the buffer.
    pub fn exec_now(&mut self, text: &str, env: &mut ExecEnv<'_>) {
        if text.is_empty() {
            return;
        }

        let bytes = text.as_bytes();
        let mut pos = 0;
        loop {
            let mut command_text = String::new();
            let extraction = extract_next_command(&bytes[pos..], &mut command_text, env.cvars);
            pos += extraction.consumed;
            if !extraction.found {
                break;
            }
            if extraction.overflowed {
                report_error!("Discarding rest of command line due to malformed string...");
                break;
            }
            let args = CommandArgs::new(&command_text);
            self.exec_tokenized(&args, env);
        }
    }

    /// Prepend the command text to the buffer, to run at the next drain.
    pub fn exec_insert(&mut self, text: &str) {
        let bytes = text.as_bytes();
        if bytes.is_empty() {
            return;
        }
        let needed = bytes.len() + 1;
        if self.buffer_used + needed >= COMMAND_BUFFER_SIZE {
            report_error!("Buffer overflow! Command buffer depleted in exec_insert().");
            return;
        }

        self.buffer.copy_within(0..self.buffer_used, needed);
        self.buffer[..bytes.len()].copy_from_slice(bytes);
        self.buffer[bytes.len()] = COMMAND_TEXT_SEPARATOR;
        self.buffer_used += needed;
    }

    /// Append the command text to the buffer, to run at a future drain.
    pub fn exec_append(&mut self, text: &str) {
        let bytes = text.as_bytes();
        if bytes.is_empty() {
            return;
        }
        let needed = bytes.len() + 1;
        if self.buffer_used + needed >= COMMAND_BUFFER_SIZE {
            report_error!("Buffer overflow! Command buffer depleted in exec_append().");
            return;
        }

        self.buffer[self.buffer_used..self.buffer_used + bytes.len()].copy_from_slice(bytes);
        self.buffer[self.buffer_used + bytes.len()] = COMMAND_TEXT_SEPARATOR;
        self.buffer_used += needed;
    }

    /// Execute a command string with any of the available modes.
    pub fn execute(&mut self, mode: ExecMode, text: &str, env: &mut ExecEnv<'_>) {
        match mode {
            ExecMode::Immediate => self.exec_now(text, env),
            ExecMode::Insert => self.exec_insert(text),
            ExecMode::Append => self.exec_append(text),
        }
    }

    pub fn has_buffered_commands(&self) -> bool {
        self.buffer_used > 0
    }

    /// Drain the command buffer, executing up to `max_commands` commands
    /// ([`EXEC_ALL`] for no limit). Returns the number executed.
    ///
    /// The buffer is shift-compacted before each dispatch so handlers that
    /// call [`CommandManager::exec_insert`]/[`CommandManager::exec_append`]
    /// see a coherent buffer. A runaway reentrant loop trips the
    /// [`MAX_REENTRANT_COMMANDS`] guard and discards everything.
    pub fn exec_buffered(&mut self, max_commands: u32, env: &mut ExecEnv<'_>) -> u32 {
        if self.buffer_used == 0 || max_commands == 0 {
            return 0;
        }

        let mut executed = 0;
        loop {
            let mut command_text = String::new();
            let extraction = extract_next_command(
                &self.buffer[..self.buffer_used],
                &mut command_text,
                env.cvars,
            );

            if !extraction.found {
                // Only separators and whitespace remained.
                self.buffer_used = 0;
                break;
            }
            if extraction.overflowed {
                self.buffer_used = 0;
                report_error!("Discarding rest of command buffer due to malformed command string...");
                break;
            }

            // Slide the remaining text to the front before dispatching, so
            // handlers pushing further commands see a coherent buffer.
            self.buffer.copy_within(extraction.consumed..self.buffer_used, 0);
            self.buffer_used -= extraction.consumed;

            let args = CommandArgs::new(&command_text);
            self.exec_tokenized(&args, env);
            executed += 1;

            if executed == MAX_REENTRANT_COMMANDS {
                self.buffer_used = 0;
                report_error!(
                    "{} commands executed in sequence! Possible reentrant loop...",
                    executed
                );
                break;
            }
            if max_commands != EXEC_ALL && executed == max_commands {
                break;
            }
            if self.buffer_used == 0 {
                break;
            }
        }

        executed
    }

    /// Dispatch one tokenized command: resolve the handler, apply the
    /// disable mask and argument-count bounds, then run it.
    pub fn exec_tokenized(&mut self, args: &CommandArgs, env: &mut ExecEnv<'_>) {
        let name = args.command_name();
        if name.is_empty() {
            return;
        }
        if name.len() >= MAX_COMMAND_NAME_LENGTH {
            report_error!(
                "Command name too long! Max command name length is {} characters.",
                MAX_COMMAND_NAME_LENGTH
            );
            return;
        }

        let (flags, min_args, max_args, alias) = {
            let Some(command) = self.commands.find(name) else {
                report_error!("{}: Command not found.", name);
                return;
            };
            (
                command.get_flags(),
                command.min_args(),
                command.max_args(),
                command
                    .alias_target()
                    .map(|(target, mode)| (target.to_string(), mode)),
            )
        };

        if self.disabled_flags != 0 {
            if self.disabled_flags == DISABLE_ALL {
                report_error!("Command execution is globally disabled!");
                return;
            }
            if flags & self.disabled_flags != 0 {
                report_error!("{}: Command is disabled!", name);
                return;
            }
        }

        // Optional arg-count validation; negative bounds are unchecked.
        if min_args >= 0 && (args.arg_count() as i32) < min_args {
            report_error!("{}: Not enough arguments! Expected at least {}.", name, min_args);
            return;
        }
        if max_args >= 0 && (args.arg_count() as i32) > max_args {
            report_error!("{}: Too many arguments provided! Expected up to {}.", name, max_args);
            return;
        }

        // An alias just re-submits its target string.
        if let Some((target, mode)) = alias {
            self.execute(mode, &target, env);
            return;
        }

        // Detach the command while it runs so the handler gets unrestricted
        // mutable access to this manager.
        let Some(command) = self.commands.unlink(name) else {
            return;
        };
        if let CommandKind::Handler { exec, .. } = &command.kind {
            let mut ctx = ExecContext {
                commands: &mut *self,
                cvars: &mut *env.cvars,
                term: &mut *env.term,
                files: &mut *env.files,
            };
            exec(args, &mut ctx);
        }
        // Re-attach unless the handler removed or replaced itself.
        if !self.commands.contains(command.name()) {
            self.commands.link(command);
        }
    }

    // ========================================================
    // Config files and the startup command line:
    // ========================================================

    /// Load and execute a configuration file line-by-line. Lines starting
    /// with `#` or `//` and blank lines are skipped; everything else runs
    /// immediately. With `echo` set, each executed line is printed as
    /// `filename(lineno): text`.
    pub fn exec_config_file(&mut self, filename: &str, echo: bool, env: &mut ExecEnv<'_>) -> bool {
        let Some(handle) = env.files.open(filename, FileMode::Read) else {
            return false;
        };

        let mut line = String::new();
        let mut line_number = 0;
        loop {
            if env.files.eof(handle) || !env.files.read_line(handle, &mut line) {
                break;
            }
            line_number += 1;

            if line.is_empty() || line.starts_with('#') || line.starts_with("//") {
                continue;
            }

            let mut text = std::mem::take(&mut line);
            // A trailing backslash continues the command on the next line.
            while text.trim_end().ends_with('\\')
                && !env.files.eof(handle)
                && env.files.read_line(handle, &mut line)
            {
                line_number += 1;
                text.push('\n');
                text.push_str(&line);
            }

            if echo {
                env.term
                    .print(&format!("{}({}): {}\n", filename, line_number, text));
            }
            self.exec_now(&text, env);
        }

        env.files.close(handle);
        true
    }

    /// Process the program command line. `+` starts a new command; `set` and
    /// `reset` commands run immediately inside an init-only override window,
    /// everything else is appended to the command buffer.
    pub fn exec_startup_command_line(&mut self, argv: &[String], env: &mut ExecEnv<'_>) {
        env.cvars.allow_write_init_only(true);

        let mut command_line = String::new();
        let mut immediate = false;
        for argument in argv {
            let mut text = argument.as_str();
            if let Some(stripped) = text.strip_prefix('+') {
                self.dispatch_startup_command(&command_line, immediate, env);
                command_line.clear();
                text = stripped;
                // 'set'/'reset' shall not be buffered when running the
                // startup command line.
                immediate = text == "set" || text == "reset";
            }
            command_line.push_str(text);
            command_line.push(' ');
        }
        self.dispatch_startup_command(&command_line, immediate, env);

        env.cvars.allow_write_init_only(false);
    }

    fn dispatch_startup_command(&mut self, text: &str, immediate: bool, env: &mut ExecEnv<'_>) {
        if text.trim().is_empty() {
            return;
        }
        if immediate {
            self.exec_now(text, env);
        } else {
            self.exec_append(text);
        }
    }
}

impl Default for CommandManager {
    fn default() -> Self {
        Self::new()
    }
}

// ========================================================
// Command-string extraction and CVar substitution:
// ========================================================

/// Extract one whole command starting at the front of `input` into `dest`.
///
/// Leading whitespace and separators are skipped; `\r` is dropped; a
/// backslash continues the command across the following newline; quotes keep
/// separators literal; `$(var)` outside quotes expands to the CVar's string
/// value.
fn extract_next_command(input: &[u8], dest: &mut String, cvars: &CVarManager) -> Extraction {
    let mut pos = 0;

    // Sanitize leading separators and whitespace left over from a previous
    // pass.
    while pos < input.len() {
        let c = input[pos];
        if !is_whitespace(c) && c != COMMAND_TEXT_SEPARATOR {
            break;
        }
        pos += 1;
    }

    let mut overflowed = false;
    let mut quote_count = 0u32;
    let mut quoted = false;
    let mut single_quote = false;
    let mut backslash = false;
    let mut done = false;

    while !done && pos < input.len() && dest.len() < MAX_COMMAND_ARG_STR_LENGTH {
        let c = input[pos];
        match c {
            b'\r' => {
                // Silently ignore carriage returns; only newlines matter.
                pos += 1;
                continue;
            }
            b'\\' => {
                // A backslash allows a multi-line command.
                backslash = true;
                pos += 1;
                continue;
            }
            b'\n' => {
                // The newline ends the command unless escaped or quoted.
                done = !backslash && !quoted;
                backslash = false;
            }
            b'"' => {
                if !single_quote {
                    quote_count += 1;
                    quoted = quote_count & 1 != 0;
                }
            }
            b'\'' => {
                // Single quotes can open a block or appear inside doubles.
                if !quoted {
                    quote_count += 1;
                    quoted = quote_count & 1 != 0;
                    single_quote = true;
                } else if single_quote {
                    quote_count += 1;
                    quoted = quote_count & 1 != 0;
                    single_quote = false;
                }
            }
            COMMAND_TEXT_SEPARATOR => {
                done = !quoted;
            }
            b'$' if !quoted && input.get(pos + 1) == Some(&b'(') => {
                match expand_cvar(input, pos, dest, 1, cvars) {
                    Some(next) => {
                        pos = next;
                        continue;
                    }
                    None => {
                        // Skip the rest of the broken command and have the
                        // caller discard it.
                        while pos < input.len()
                            && input[pos] != b'\n'
                            && input[pos] != COMMAND_TEXT_SEPARATOR
                        {
                            pos += 1;
                        }
                        overflowed = true;
                        break;
                    }
                }
            }
            _ => {}
        }

        if backslash && c != b' ' && c != b'\t' {
            // A stray backslash in the middle of a string is a leftover from
            // collapsing a line; just drop it.
            backslash = false;
        }

        if !done {
            dest.push(c as char);
        }
        pos += 1;
    }

    if dest.len() >= MAX_COMMAND_ARG_STR_LENGTH {
        overflowed = true;
        report_error!("Command string too long! Can't parse all arguments from it...");
    }

    Extraction {
        consumed: pos,
        overflowed,
        found: !dest.is_empty(),
    }
}

/// Expand a `$(var)` reference starting at `start` (pointing at the `$`),
/// appending the CVar's string value to `dest`. Returns the index just past
/// the closing parenthesis, or `None` on any error.
fn expand_cvar(
    input: &[u8],
    start: usize,
    dest: &mut String,
    depth: u32,
    cvars: &CVarManager,
) -> Option<usize> {
    debug_assert_eq!(input.get(start), Some(&b'$'));

    let mut name = String::new();
    let mut parenthesis = 0i32;
    let mut pos = start + 1;
    let mut closed = false;

    while pos < input.len() {
        let c = input[pos];
        if c == b'\n' || c == COMMAND_TEXT_SEPARATOR {
            break;
        }
        if c == b'(' {
            parenthesis += 1;
        } else if c == b')' {
            parenthesis -= 1;
            pos += 1;
            closed = true;
            break;
        } else if c == b'$' && input.get(pos + 1) == Some(&b'(') {
            // Reentrant expansion.
            if depth == MAX_EXPANSION_DEPTH {
                report_error!("Too many reentrant CVar argument expansions!");
                return None;
            }
            pos = expand_cvar(input, pos, &mut name, depth + 1, cvars)?;
            continue;
        } else if !is_whitespace(c) {
            if name.len() == MAX_COMMAND_ARG_STR_LENGTH {
                report_error!("Buffer overflow in CVar name expansion!");
                return None;
            }
            name.push(c as char);
        }
        pos += 1;
    }

    if !closed || parenthesis != 0 {
        report_error!("Unbalanced opening or closing parenthesis in CVar argument expansion!");
        return None;
    }
    if name.is_empty() {
        report_error!("Missing CVar name in argument expansion!");
        return None;
    }
    if !CVarManager::is_valid_cvar_name(&name) {
        report_error!("Invalid CVar name '{}' in argument expansion!", name);
        return None;
    }
    let Some(cvar) = cvars.find(&name) else {
        report_error!("Trying to expand undefined CVar '$({})'.", name);
        return None;
    };

    let value = cvar.get_string_value();
    if dest.len() + value.len() >= MAX_COMMAND_ARG_STR_LENGTH {
        report_error!("Buffer overflow in CVar argument expansion!");
        return None;
    }
    dest.push_str(&value);
    Some(pos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cvar::{CVar, CVarFlags};
    use crate::fileio::StdFileIo;
    use crate::terminal::BufferTerminal;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    struct Fixture {
        commands: CommandManager,
        cvars: CVarManager,
        term: BufferTerminal,
        files: StdFileIo,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                commands: CommandManager::new(),
                cvars: CVarManager::new(),
                term: BufferTerminal::new(),
                files: StdFileIo::new(),
            }
        }

        fn run(&mut self, text: &str) {
            let mut env = ExecEnv {
                cvars: &mut self.cvars,
                term: &mut self.term,
                files: &mut self.files,
            };
            self.commands.exec_now(text, &mut env);
        }

        fn drain(&mut self, max_commands: u32) -> u32 {
            let mut env = ExecEnv {
                cvars: &mut self.cvars,
                term: &mut self.term,
                files: &mut self.files,
            };
            self.commands.exec_buffered(max_commands, &mut env)
        }
    }

    fn counter_command(name: &str, counter: &Arc<AtomicUsize>) -> CommandDef {
        let counter = Arc::clone(counter);
        CommandDef::new(name, move |_, _| {
            counter.fetch_add(1, Ordering::Relaxed);
        })
    }

    fn recording_command(name: &str, log: &Arc<Mutex<Vec<Vec<String>>>>) -> CommandDef {
        let log = Arc::clone(log);
        CommandDef::new(name, move |args, _| {
            log.lock()
                .unwrap()
                .push(args.iter().map(str::to_string).collect());
        })
    }

    #[test]
    fn test_command_name_validation() {
        assert!(CommandManager::is_valid_command_name("exit"));
        assert!(CommandManager::is_valid_command_name("_cmd2"));
        assert!(!CommandManager::is_valid_command_name(""));
        assert!(!CommandManager::is_valid_command_name("9lives"));
        assert!(!CommandManager::is_valid_command_name("has.dot"));
        assert!(!CommandManager::is_valid_command_name("has space"));
        assert!(!CommandManager::is_valid_command_name(
            "a_name_well_beyond_the_thirty_two_limit"
        ));
    }

    #[test]
    fn test_register_rejects_duplicates_and_cvar_collisions() {
        let mut fixture = Fixture::new();
        fixture.cvars.register(CVar::bool("shadow", true));

        assert!(fixture
            .commands
            .register(CommandDef::new("cmd", |_, _| {}), Some(&fixture.cvars)));
        assert!(!fixture
            .commands
            .register(CommandDef::new("cmd", |_, _| {}), Some(&fixture.cvars)));
        assert!(!fixture
            .commands
            .register(CommandDef::new("shadow", |_, _| {}), Some(&fixture.cvars)));
        assert_eq!(fixture.commands.len(), 1);
    }

    #[test]
    fn test_exec_now_runs_handler_with_args() {
        let mut fixture = Fixture::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        fixture
            .commands
            .register(recording_command("probe", &log), None);

        fixture.run("probe one \"two words\" three");

        let calls = log.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0], ["one", "two words", "three"]);
    }

    #[test]
    fn test_semicolon_separates_commands() {
        let mut fixture = Fixture::new();
        let counter = Arc::new(AtomicUsize::new(0));
        fixture
            .commands
            .register(counter_command("inc", &counter), None);

        fixture.run("inc; inc ;inc");
        assert_eq!(counter.load(Ordering::Relaxed), 3);
    }

    #[test]
    fn test_separator_inside_quotes_is_literal() {
        let mut fixture = Fixture::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        fixture
            .commands
            .register(recording_command("probe", &log), None);

        fixture.run("probe \"a; b\"");
        let calls = log.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0], ["a; b"]);
    }

    #[test]
    fn test_backslash_continues_line() {
        let mut fixture = Fixture::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        fixture
            .commands
            .register(recording_command("probe", &log), None);

        fixture.run("probe one \\\ntwo\nprobe three");
        let calls = log.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], ["one", "two"]);
        assert_eq!(calls[1], ["three"]);
    }

    #[test]
    fn test_carriage_returns_ignored() {
        let mut fixture = Fixture::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        fixture
            .commands
            .register(recording_command("probe", &log), None);

        fixture.run("probe one\r\nprobe two\r\n");
        let calls = log.lock().unwrap();
        assert_eq!(calls.len(), 2);
    }

    #[test]
    fn test_unknown_command_is_reported_and_skipped() {
        let mut fixture = Fixture::new();
        let counter = Arc::new(AtomicUsize::new(0));
        fixture
            .commands
            .register(counter_command("known", &counter), None);

        fixture.run("unknown; known");
        assert_eq!(counter.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_arg_count_bounds() {
        let mut fixture = Fixture::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let def = counter_command("bounded", &counter).min_args(1).max_args(2);
        fixture.commands.register(def, None);

        fixture.run("bounded");
        assert_eq!(counter.load(Ordering::Relaxed), 0);
        fixture.run("bounded a");
        assert_eq!(counter.load(Ordering::Relaxed), 1);
        fixture.run("bounded a b");
        assert_eq!(counter.load(Ordering::Relaxed), 2);
        fixture.run("bounded a b c");
        assert_eq!(counter.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_disable_mask() {
        let mut fixture = Fixture::new();
        let counter = Arc::new(AtomicUsize::new(0));
        fixture
            .commands
            .register(counter_command("plain", &counter), None);
        fixture
            .commands
            .register(counter_command("cheaty", &counter).flags(0x4), None);

        fixture.commands.disable_commands_with_flags(0x4);
        fixture.run("plain; cheaty");
        assert_eq!(counter.load(Ordering::Relaxed), 1);

        fixture.commands.disable_commands_with_flags(DISABLE_ALL);
        fixture.run("plain");
        assert_eq!(counter.load(Ordering::Relaxed), 1);

        fixture.commands.enable_all_commands();
        fixture.run("plain; cheaty");
        assert_eq!(counter.load(Ordering::Relaxed), 3);
    }

    #[test]
    fn test_buffer_shape_after_append_and_insert() {
        let mut manager = CommandManager::new();
        manager.exec_append("second");
        manager.exec_append("third");
        manager.exec_insert("first");
        assert!(manager.has_buffered_commands());

        let text = std::str::from_utf8(&manager.buffer[..manager.buffer_used]).unwrap();
        assert_eq!(text, "first;second;third;");
    }

    #[test]
    fn test_buffer_overflow_is_refused() {
        let mut manager = CommandManager::new();
        let big = "x".repeat(COMMAND_BUFFER_SIZE);
        manager.exec_append(&big);
        assert!(!manager.has_buffered_commands());
        manager.exec_insert(&big);
        assert!(!manager.has_buffered_commands());
    }

    #[test]
    fn test_drain_executes_in_order() {
        let mut fixture = Fixture::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        fixture
            .commands
            .register(recording_command("probe", &log), None);

        fixture.commands.exec_append("probe 1");
        fixture.commands.exec_append("probe 2");
        fixture.commands.exec_insert("probe 0");

        let executed = fixture.drain(EXEC_ALL);
        assert_eq!(executed, 3);
        assert!(!fixture.commands.has_buffered_commands());

        let calls = log.lock().unwrap();
        assert_eq!(*calls, [vec!["0"], vec!["1"], vec!["2"]]);
    }

    #[test]
    fn test_drain_bound() {
        let mut fixture = Fixture::new();
        let counter = Arc::new(AtomicUsize::new(0));
        fixture
            .commands
            .register(counter_command("inc", &counter), None);

        for _ in 0..5 {
            fixture.commands.exec_append("inc");
        }
        assert_eq!(fixture.drain(2), 2);
        assert_eq!(counter.load(Ordering::Relaxed), 2);
        assert!(fixture.commands.has_buffered_commands());

        assert_eq!(fixture.drain(EXEC_ALL), 3);
        assert_eq!(counter.load(Ordering::Relaxed), 5);
        assert!(!fixture.commands.has_buffered_commands());
    }

    #[test]
    fn test_handler_appends_are_seen_by_same_drain() {
        let mut fixture = Fixture::new();
        let counter = Arc::new(AtomicUsize::new(0));
        fixture
            .commands
            .register(counter_command("target", &counter), None);
        fixture.commands.register(
            CommandDef::new("pusher", |_, ctx| {
                ctx.commands.exec_append("target");
            }),
            None,
        );

        fixture.commands.exec_append("pusher");
        let executed = fixture.drain(EXEC_ALL);
        assert_eq!(executed, 2);
        assert_eq!(counter.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_insert_runs_before_remaining_buffer() {
        let mut fixture = Fixture::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        fixture
            .commands
            .register(recording_command("probe", &log), None);
        fixture.commands.register(
            CommandDef::new("pusher", |_, ctx| {
                ctx.commands.exec_insert("probe inserted");
            }),
            None,
        );

        fixture.commands.exec_append("pusher");
        fixture.commands.exec_append("probe appended");
        fixture.drain(EXEC_ALL);

        let calls = log.lock().unwrap();
        assert_eq!(*calls, [vec!["inserted"], vec!["appended"]]);
    }

    #[test]
    fn test_reentrancy_guard_discards_buffer() {
        let mut fixture = Fixture::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = Arc::clone(&counter);
        fixture.commands.register(
            CommandDef::new("selfloop", move |_, ctx| {
                counter_clone.fetch_add(1, Ordering::Relaxed);
                ctx.commands.exec_append("selfloop");
            }),
            None,
        );

        fixture.commands.exec_append("selfloop");
        let executed = fixture.drain(EXEC_ALL);

        assert_eq!(executed, MAX_REENTRANT_COMMANDS);
        assert_eq!(counter.load(Ordering::Relaxed) as u32, MAX_REENTRANT_COMMANDS);
        assert!(!fixture.commands.has_buffered_commands());
    }

    #[test]
    fn test_alias_executes_target() {
        let mut fixture = Fixture::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        fixture
            .commands
            .register(recording_command("probe", &log), None);

        assert!(fixture.commands.create_alias(
            "greet",
            "probe hello; probe world",
            ExecMode::Append,
            "",
            None,
        ));
        assert_eq!(fixture.commands.alias_count(), 1);

        fixture.run("greet");
        // Append-mode alias only buffers its target.
        assert!(log.lock().unwrap().is_empty());
        assert!(fixture.commands.has_buffered_commands());

        fixture.drain(EXEC_ALL);
        let calls = log.lock().unwrap();
        assert_eq!(*calls, [vec!["hello"], vec!["world"]]);
    }

    #[test]
    fn test_immediate_alias_runs_inline() {
        let mut fixture = Fixture::new();
        let counter = Arc::new(AtomicUsize::new(0));
        fixture
            .commands
            .register(counter_command("inc", &counter), None);
        fixture
            .commands
            .create_alias("now", "inc; inc", ExecMode::Immediate, "", None);

        fixture.run("now");
        assert_eq!(counter.load(Ordering::Relaxed), 2);
        assert!(!fixture.commands.has_buffered_commands());
    }

    #[test]
    fn test_remove_alias_only_removes_aliases() {
        let mut fixture = Fixture::new();
        fixture
            .commands
            .register(CommandDef::new("real", |_, _| {}), None);
        fixture
            .commands
            .create_alias("fake", "real", ExecMode::Append, "", None);

        assert!(!fixture.commands.remove_alias("real"));
        assert!(fixture.commands.remove_alias("fake"));
        assert_eq!(fixture.commands.alias_count(), 0);
        assert!(fixture.commands.find("real").is_some());

        fixture
            .commands
            .create_alias("a1", "real", ExecMode::Append, "", None);
        fixture
            .commands
            .create_alias("a2", "real", ExecMode::Append, "", None);
        fixture.commands.remove_all_aliases();
        assert_eq!(fixture.commands.alias_count(), 0);
        assert!(fixture.commands.find("real").is_some());
        assert_eq!(fixture.commands.len(), 1);
    }

    #[test]
    fn test_cvar_substitution_matches_literal_args() {
        let mut fixture = Fixture::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        fixture
            .commands
            .register(recording_command("probe", &log), None);
        fixture
            .cvars
            .register(CVar::string("name", "World"));

        fixture.run("probe $(name)");
        fixture.run("probe World");

        let calls = log.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], calls[1]);
    }

    #[test]
    fn test_substitution_with_whitespace_in_parens() {
        let mut fixture = Fixture::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        fixture
            .commands
            .register(recording_command("probe", &log), None);
        fixture.cvars.register(CVar::int("num", 42, 0, 100));

        fixture.run("probe $( num )");
        assert_eq!(log.lock().unwrap()[0], ["42"]);
    }

    #[test]
    fn test_substitution_of_undefined_cvar_discards_command() {
        let mut fixture = Fixture::new();
        let counter = Arc::new(AtomicUsize::new(0));
        fixture
            .commands
            .register(counter_command("probe", &counter), None);

        fixture.run("probe $(undef)");
        assert_eq!(counter.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_nested_substitution() {
        let mut fixture = Fixture::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        fixture
            .commands
            .register(recording_command("probe", &log), None);
        fixture.cvars.register(CVar::string("inner", "outer"));
        fixture.cvars.register(CVar::string("outer", "value"));

        fixture.run("probe $($(inner))");
        assert_eq!(log.lock().unwrap()[0], ["value"]);
    }

    #[test]
    fn test_unbalanced_substitution_discards_command() {
        let mut fixture = Fixture::new();
        let counter = Arc::new(AtomicUsize::new(0));
        fixture
            .commands
            .register(counter_command("probe", &counter), None);
        fixture.cvars.register(CVar::string("name", "x"));

        fixture.run("probe $(name");
        fixture.run("probe $()");
        assert_eq!(counter.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_startup_command_line() {
        let mut fixture = Fixture::new();
        fixture.cvars.register(
            CVar::int("r_width", 640, 0, 8192).flags(CVarFlags::INIT_ONLY),
        );
        let counter = Arc::new(AtomicUsize::new(0));
        fixture
            .commands
            .register(counter_command("map_load", &counter), None);
        fixture.commands.register(
            CommandDef::new("set", |args, ctx| {
                if args.arg_count() >= 2 {
                    ctx.cvars
                        .set_cvar_string(args.get_or(0, ""), args.get_or(1, ""));
                }
            }),
            None,
        );

        let argv: Vec<String> = ["+set", "r_width", "1920", "+map_load", "demo"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        {
            let mut env = ExecEnv {
                cvars: &mut fixture.cvars,
                term: &mut fixture.term,
                files: &mut fixture.files,
            };
            fixture.commands.exec_startup_command_line(&argv, &mut env);
        }

        // The init-only var was written immediately through the window.
        assert_eq!(fixture.cvars.get_int_value("r_width"), 1920);
        // Other commands were buffered, not run.
        assert_eq!(counter.load(Ordering::Relaxed), 0);
        assert!(fixture.commands.has_buffered_commands());
        fixture.drain(EXEC_ALL);
        assert_eq!(counter.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_exec_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.cfg");
        std::fs::write(
            &path,
            "# comment\n// another comment\n\nprobe one\nprobe two; probe three\n",
        )
        .unwrap();

        let mut fixture = Fixture::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        fixture
            .commands
            .register(recording_command("probe", &log), None);

        let ok = {
            let mut env = ExecEnv {
                cvars: &mut fixture.cvars,
                term: &mut fixture.term,
                files: &mut fixture.files,
            };
            fixture
                .commands
                .exec_config_file(path.to_str().unwrap(), false, &mut env)
        };
        assert!(ok);

        let calls = log.lock().unwrap();
        assert_eq!(*calls, [vec!["one"], vec!["two"], vec!["three"]]);
    }

    #[test]
    fn test_exec_config_file_joins_continuation_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cont.cfg");
        std::fs::write(&path, "probe one \\\ntwo\nprobe three\n").unwrap();

        let mut fixture = Fixture::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        fixture
            .commands
            .register(recording_command("probe", &log), None);

        let ok = {
            let mut env = ExecEnv {
                cvars: &mut fixture.cvars,
                term: &mut fixture.term,
                files: &mut fixture.files,
            };
            fixture
                .commands
                .exec_config_file(path.to_str().unwrap(), false, &mut env)
        };
        assert!(ok);

        let calls = log.lock().unwrap();
        assert_eq!(*calls, [vec!["one", "two"], vec!["three"]]);
    }

    #[test]
    fn test_exec_config_file_missing() {
        let mut fixture = Fixture::new();
        let ok = {
            let mut env = ExecEnv {
                cvars: &mut fixture.cvars,
                term: &mut fixture.term,
                files: &mut fixture.files,
            };
            fixture.commands.exec_config_file("no_such.cfg", false, &mut env)
        };
        assert!(!ok);
    }

    #[test]
    fn test_handler_can_remove_itself() {
        let mut fixture = Fixture::new();
        fixture.commands.register(
            CommandDef::new("once", |_, ctx| {
                ctx.commands.remove("once");
            }),
            None,
        );

        fixture.run("once");
        assert!(fixture.commands.find("once").is_none());
    }
}
