//! Command entries and handler plumbing.
//!
//! A command couples immutable metadata (name, description, flags, argument
//! bounds) with either a handler closure or an alias to another command
//! string. Handlers receive an [`ExecContext`] giving them mutable access to
//! every console service for the duration of the call.

use std::fmt;

use crate::core::args::CommandArgs;
use crate::core::cvar_manager::CVarManager;
use crate::core::registry::Keyed;
use crate::fileio::FileIo;
use crate::terminal::Terminal;

/// Maximum length in characters of a command name.
pub const MAX_COMMAND_NAME_LENGTH: usize = 32;

/// Execution modes for submitting command text to the
/// [`CommandManager`](crate::core::command_manager::CommandManager).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecMode {
    /// Immediate execution. Doesn't return until completed.
    Immediate,
    /// Insert at the front of the command buffer, but don't run yet.
    Insert,
    /// Append to the end of the command buffer for a future drain.
    #[default]
    Append,
}

impl ExecMode {
    /// The `-append`/`-insert`/`-immediate` spelling used by `alias` and the
    /// config file format.
    pub fn flag_str(self) -> &'static str {
        match self {
            ExecMode::Immediate => "-immediate",
            ExecMode::Insert => "-insert",
            ExecMode::Append => "-append",
        }
    }
}

/// Services available to a command handler while it runs.
///
/// The command manager detaches the running command from its registry, so
/// the handler may freely mutate every service here, including registering
/// or removing commands.
pub struct ExecContext<'a> {
    pub commands: &'a mut crate::core::command_manager::CommandManager,
    pub cvars: &'a mut CVarManager,
    pub term: &'a mut dyn Terminal,
    pub files: &'a mut dyn FileIo,
}

impl<'a> ExecContext<'a> {
    /// Split into the command manager and the remaining services, for calls
    /// that need both halves mutably at once.
    pub fn split(
        &mut self,
    ) -> (
        &mut crate::core::command_manager::CommandManager,
        ExecEnv<'_>,
    ) {
        (
            &mut *self.commands,
            ExecEnv {
                cvars: &mut *self.cvars,
                term: &mut *self.term,
                files: &mut *self.files,
            },
        )
    }
}

/// The services a [`CommandManager`](crate::core::command_manager::CommandManager)
/// needs alongside itself to execute command text.
pub struct ExecEnv<'a> {
    pub cvars: &'a mut CVarManager,
    pub term: &'a mut dyn Terminal,
    pub files: &'a mut dyn FileIo,
}

impl<'a> ExecEnv<'a> {
    pub fn reborrow(&mut self) -> ExecEnv<'_> {
        ExecEnv {
            cvars: &mut *self.cvars,
            term: &mut *self.term,
            files: &mut *self.files,
        }
    }
}

/// Command handler closure.
pub type CommandHandlerFn =
    Box<dyn Fn(&CommandArgs, &mut ExecContext<'_>) + Send + Sync>;

/// Argument-completion provider: receives the partial argument plus the two
/// registries and returns matching suggestions.
pub type ArgCompletionFn =
    Box<dyn Fn(&str, &CVarManager, &crate::core::command_manager::CommandManager) -> Vec<String> + Send + Sync>;

pub(crate) enum CommandKind {
    Handler {
        exec: CommandHandlerFn,
        completion: Option<ArgCompletionFn>,
    },
    Alias {
        target: String,
        mode: ExecMode,
    },
}

/// A registered console command or command alias.
pub struct Command {
    name: Box<str>,
    description: Box<str>,
    flags: u32,
    min_args: i32,
    max_args: i32,
    pub(crate) kind: CommandKind,
}

impl Command {
    pub(crate) fn new(def: CommandDef) -> Self {
        Self {
            name: def.name,
            description: def.description,
            flags: def.flags,
            min_args: def.min_args,
            max_args: def.max_args,
            kind: CommandKind::Handler {
                exec: def.handler,
                completion: def.completion,
            },
        }
    }

    pub(crate) fn new_alias(
        name: Box<str>,
        description: Box<str>,
        target: String,
        mode: ExecMode,
    ) -> Self {
        Self {
            name,
            description,
            flags: 0,
            min_args: 0,
            max_args: 0,
            kind: CommandKind::Alias { target, mode },
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn get_description(&self) -> &str {
        &self.description
    }

    #[inline]
    pub fn get_flags(&self) -> u32 {
        self.flags
    }

    #[inline]
    pub fn set_flags(&mut self, flags: u32) {
        self.flags = flags;
    }

    /// Minimum accepted argument count, negative when unchecked.
    #[inline]
    pub fn min_args(&self) -> i32 {
        self.min_args
    }

    /// Maximum accepted argument count, negative when unchecked.
    #[inline]
    pub fn max_args(&self) -> i32 {
        self.max_args
    }

    #[inline]
    pub fn is_alias(&self) -> bool {
        matches!(self.kind, CommandKind::Alias { .. })
    }

    /// The aliased command string and execution mode, for aliases only.
    pub fn alias_target(&self) -> Option<(&str, ExecMode)> {
        match &self.kind {
            CommandKind::Alias { target, mode } => Some((target, *mode)),
            CommandKind::Handler { .. } => None,
        }
    }

    /// Argument completion suggestions for the given partial input. Aliases
    /// and handler-less completion return nothing.
    pub fn argument_completion(
        &self,
        partial: &str,
        cvars: &CVarManager,
        commands: &crate::core::command_manager::CommandManager,
    ) -> Vec<String> {
        match &self.kind {
            CommandKind::Handler {
                completion: Some(provider),
                ..
            } => provider(partial, cvars, commands),
            _ => Vec::new(),
        }
    }

    pub fn has_argument_completion(&self) -> bool {
        matches!(
            self.kind,
            CommandKind::Handler {
                completion: Some(_),
                ..
            }
        )
    }

    /// Format the `alias` command line that recreates this alias in a config
    /// file. Returns `None` for regular commands.
    pub fn to_cfg_string(&self) -> Option<String> {
        let (target, mode) = self.alias_target()?;
        Some(if self.description.is_empty() {
            format!("alias {} \"{}\" {}", self.name, target, mode.flag_str())
        } else {
            format!(
                "alias {} \"{}\" {} \"{}\"",
                self.name,
                target,
                mode.flag_str(),
                self.description
            )
        })
    }
}

impl Keyed for Command {
    fn key(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("flags", &self.flags)
            .field("is_alias", &self.is_alias())
            .finish_non_exhaustive()
    }
}

/// Builder for command registration.
///
/// # Examples
///
/// ```no_run
/// use cvar_console::core::command::CommandDef;
///
/// let def = CommandDef::new("greet", |args, ctx| {
///     let who = args.get_or(0, "world");
///     ctx.term.print(&format!("hello {who}\n"));
/// })
/// .description("Print a greeting.")
/// .max_args(1);
/// ```
pub struct CommandDef {
    pub(crate) name: Box<str>,
    pub(crate) description: Box<str>,
    pub(crate) flags: u32,
    pub(crate) min_args: i32,
    pub(crate) max_args: i32,
    pub(crate) handler: CommandHandlerFn,
    pub(crate) completion: Option<ArgCompletionFn>,
}

impl CommandDef {
    pub fn new<F>(name: impl Into<Box<str>>, handler: F) -> Self
    where
        F: Fn(&CommandArgs, &mut ExecContext<'_>) + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            description: "".into(),
            flags: 0,
            min_args: -1,
            max_args: -1,
            handler: Box::new(handler),
            completion: None,
        }
    }

    pub fn description(mut self, description: impl Into<Box<str>>) -> Self {
        self.description = description.into();
        self
    }

    pub fn flags(mut self, flags: u32) -> Self {
        self.flags = flags;
        self
    }

    pub fn min_args(mut self, min_args: i32) -> Self {
        self.min_args = min_args;
        self
    }

    pub fn max_args(mut self, max_args: i32) -> Self {
        self.max_args = max_args;
        self
    }

    pub fn completion<F>(mut self, provider: F) -> Self
    where
        F: Fn(&str, &CVarManager, &crate::core::command_manager::CommandManager) -> Vec<String>
            + Send
            + Sync
            + 'static,
    {
        self.completion = Some(Box::new(provider));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_metadata() {
        let command = Command::new(
            CommandDef::new("test", |_, _| {})
                .description("A test command")
                .flags(0x10)
                .min_args(1)
                .max_args(3),
        );
        assert_eq!(command.name(), "test");
        assert_eq!(command.get_description(), "A test command");
        assert_eq!(command.get_flags(), 0x10);
        assert_eq!(command.min_args(), 1);
        assert_eq!(command.max_args(), 3);
        assert!(!command.is_alias());
        assert!(command.alias_target().is_none());
    }

    #[test]
    fn test_alias_cfg_string() {
        let alias = Command::new_alias(
            "d1".into(),
            "".into(),
            "demomap idlog.cin; set nextserver d2".into(),
            ExecMode::Append,
        );
        assert!(alias.is_alias());
        assert_eq!(
            alias.to_cfg_string().as_deref(),
            Some("alias d1 \"demomap idlog.cin; set nextserver d2\" -append")
        );

        let alias = Command::new_alias("q".into(), "quick exit".into(), "exit".into(), ExecMode::Immediate);
        assert_eq!(
            alias.to_cfg_string().as_deref(),
            Some("alias q \"exit\" -immediate \"quick exit\"")
        );
    }

    #[test]
    fn test_exec_mode_flags() {
        assert_eq!(ExecMode::Append.flag_str(), "-append");
        assert_eq!(ExecMode::Insert.flag_str(), "-insert");
        assert_eq!(ExecMode::Immediate.flag_str(), "-immediate");
    }
}
