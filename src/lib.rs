//! An embeddable configuration-variable and command engine for interactive
//! applications.
//!
//! Three tightly coupled subsystems:
//!
//! - **CVars**: typed, optionally constrained configuration variables with
//!   range/enum/allowed-set enforcement and modified-tracking
//!   ([`CVar`], [`CVarManager`])
//! - **Commands**: a registry of named handlers plus a command-string
//!   processor with quoting, `;` separation, buffered execution and
//!   `$(var)` substitution ([`CommandDef`], [`CommandManager`])
//! - **Line editor**: an interactive terminal frontend with history, tab
//!   completion and built-in commands ([`LineEditor`])
//!
//! Configuration state round-trips through plain-text command files written
//! by `saveConfig` and replayed by `reloadConfig`/`exec`.
//!
//! Platform facilities stay behind thin seams: output, key input and the
//! clipboard behind [`Terminal`], file access behind [`FileIo`].
//!
//! # Quick Start
//!
//! ```
//! use cvar_console::prelude::*;
//!
//! let mut cvars = CVarManager::new();
//! let mut commands = CommandManager::new();
//! cvar_console::register_default_commands(&mut commands);
//!
//! cvars.register(
//!     CVar::float("sv_gravity", 800.0, 0.0, 2000.0)
//!         .description("World gravity")
//!         .flags(CVarFlags::PERSISTENT | CVarFlags::RANGE_CHECK),
//! );
//!
//! commands.register(
//!     CommandDef::new("status", |_args, ctx| {
//!         let gravity = ctx.cvars.get_float_value("sv_gravity");
//!         ctx.term.print(&format!("gravity is {gravity}\n"));
//!     })
//!     .description("Show server status"),
//!     Some(&cvars),
//! );
//!
//! # struct NullTerm;
//! # impl cvar_console::Terminal for NullTerm {
//! #     fn print(&mut self, _text: &str) {}
//! # }
//! # let mut term = NullTerm;
//! # let mut files = cvar_console::StdFileIo::new();
//! // Run command text against the registries:
//! let mut env = ExecEnv {
//!     cvars: &mut cvars,
//!     term: &mut term,
//!     files: &mut files,
//! };
//! commands.exec_now("set sv_gravity 500; status", &mut env);
//! assert_eq!(cvars.get_float_value("sv_gravity"), 500.0);
//! ```

pub mod core;
pub mod editor;
pub mod error;
pub mod fileio;
pub mod persist;
pub mod terminal;
pub mod tty;

mod commands;

pub use commands::register_default_commands;
pub use core::{
    CVar, CVarFlags, CVarManager, CVarType, Command, CommandArgs, CommandDef, CommandManager,
    EnumConst, ExecContext, ExecEnv, ExecMode, NumberFormat, COMMAND_BUFFER_SIZE, DISABLE_ALL,
    EXEC_ALL, MAX_COMMAND_ARGUMENTS, MAX_COMMAND_ARG_STR_LENGTH, MAX_COMMAND_NAME_LENGTH,
    MAX_REENTRANT_COMMANDS,
};
pub use editor::{LineEditor, BUILT_IN_COMMANDS, DEFAULT_PROMPT, LINE_BUFFER_MAX_SIZE};
pub use error::silence_errors;
pub use fileio::{FileHandle, FileIo, FileMode, StdFileIo};
pub use persist::{write_config, DEFAULT_CONFIG_FILE};
pub use terminal::{color, Key, Terminal};
pub use tty::TtyTerminal;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::core::{
        CVar, CVarFlags, CVarManager, CVarType, CommandArgs, CommandDef, CommandManager,
        ExecContext, ExecEnv, ExecMode, NumberFormat, EXEC_ALL,
    };
    pub use crate::editor::LineEditor;
    pub use crate::fileio::{FileIo, FileMode};
    pub use crate::terminal::{Key, Terminal};
}

#[cfg(test)]
mod tests {
    use crate::core::{CVar, CVarFlags, CVarManager, CommandManager, ExecEnv, EXEC_ALL};
    use crate::fileio::StdFileIo;
    use crate::register_default_commands;
    use crate::terminal::BufferTerminal;

    // End-to-end smoke test over the whole stack: registries, default
    // commands, substitution and the command buffer.
    #[test]
    fn test_full_stack_smoke() {
        crate::terminal::color::set_enabled(false);
        let mut cvars = CVarManager::new();
        let mut commands = CommandManager::new();
        let mut term = BufferTerminal::new();
        let mut files = StdFileIo::new();
        register_default_commands(&mut commands);

        cvars.register(
            CVar::int("iVar", 10, -10, 10)
                .description("an integer")
                .flags(CVarFlags::RANGE_CHECK),
        );

        {
            let mut env = ExecEnv {
                cvars: &mut cvars,
                term: &mut term,
                files: &mut files,
            };
            commands.exec_now("set iVar 5; echo iVar is $(iVar)", &mut env);
        }
        assert_eq!(cvars.get_int_value("iVar"), 5);
        assert_eq!(term.output, "iVar is 5 \n");

        // Buffered execution via an alias:
        {
            let mut env = ExecEnv {
                cvars: &mut cvars,
                term: &mut term,
                files: &mut files,
            };
            commands.exec_now("alias report \"echo $(iVar)\" -append", &mut env);
        }
        term.output.clear();
        {
            let mut env = ExecEnv {
                cvars: &mut cvars,
                term: &mut term,
                files: &mut files,
            };
            commands.exec_now("report", &mut env);
            assert!(commands.has_buffered_commands());
            commands.exec_buffered(EXEC_ALL, &mut env);
        }
        assert_eq!(term.output, "5 \n");
    }
}
