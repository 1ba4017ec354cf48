//! Engine-agnostic console core.
//!
//! The fundamental building blocks:
//! - [`CVar`] - typed configuration variables with constraints and flags
//! - [`CVarManager`] - the CVar registry with the override window
//! - [`Command`] / [`CommandDef`] - console commands with handlers
//! - [`CommandManager`] - command registry, buffer and string processor
//! - [`CommandArgs`] - tokenized command arguments
//! - [`Registry`] - the keyed store both managers are built on

pub mod args;
pub mod command;
pub mod command_manager;
pub mod cvar;
pub mod cvar_manager;
pub mod registry;
pub mod strings;

pub use args::{CommandArgs, MAX_COMMAND_ARGUMENTS, MAX_COMMAND_ARG_STR_LENGTH};
pub use command::{
    ArgCompletionFn, Command, CommandDef, CommandHandlerFn, ExecContext, ExecEnv, ExecMode,
    MAX_COMMAND_NAME_LENGTH,
};
pub use command_manager::{
    CommandManager, COMMAND_BUFFER_SIZE, COMMAND_TEXT_SEPARATOR, DISABLE_ALL, EXEC_ALL,
    MAX_REENTRANT_COMMANDS,
};
pub use cvar::{CVar, CVarFlags, CVarType, EnumConst, NumberFormat, ValueCompletionFn};
pub use cvar_manager::CVarManager;
pub use registry::{CaseFolded, CaseSensitive, KeyHasher, Keyed, Registry};
pub use strings::set_bool_strings;
