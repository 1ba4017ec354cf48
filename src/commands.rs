//! The default command set.
//!
//! [`register_default_commands`] installs the common utilities for
//! manipulating CVars, aliases and configuration files: `print`, `help`,
//! `echo`, `alias`, `unalias`, `isCmd`, `isCVar`, `reset`, `toggle`, `set`,
//! `varAdd`/`varSub`/`varMul`/`varDiv`, `listCmds`, `listCVars`,
//! `saveConfig`, `reloadConfig` and `exec`.

use crate::core::args::CommandArgs;
use crate::core::command::{CommandDef, ExecContext, ExecMode};
use crate::core::command_manager::CommandManager;
use crate::core::cvar::{CVarFlags, CVarType};
use crate::core::cvar_manager::CVarManager;
use crate::core::strings::{find_substring, parse_float};
use crate::editor::{built_in_command, BUILT_IN_COMMANDS, MAX_COMPLETION_MATCHES};
use crate::persist::{self, DEFAULT_CONFIG_FILE};
use crate::terminal::{color, Terminal};

/// Register the default command set with the manager.
pub fn register_default_commands(commands: &mut CommandManager) {
    register_print(commands);
    register_help(commands);
    register_echo(commands);
    register_alias(commands);
    register_unalias(commands);
    register_is_cmd(commands);
    register_is_cvar(commands);
    register_reset(commands);
    register_toggle(commands);
    register_set(commands);
    register_var_op(commands, "varAdd", |a, b| a + b,
        "Adds a value to a numeric CVar. Does nothing for strings, enums or booleans.");
    register_var_op(commands, "varSub", |a, b| a - b,
        "Subtract a value from a numeric CVar. Does nothing for strings, enums or booleans.");
    register_var_op(commands, "varMul", |a, b| a * b,
        "Multiply a value to a numeric CVar. Does nothing for strings, enums or booleans.");
    register_var_op(commands, "varDiv", |a, b| a / b,
        "Divide a value with a numeric CVar. Does nothing for strings, enums or booleans.");
    register_list_cmds(commands);
    register_list_cvars(commands);
    register_save_config(commands);
    register_reload_config(commands);
    register_exec(commands);
}

// ========================================================
// Shared helpers:
// ========================================================

fn print_usage(term: &mut dyn Terminal, name: &str, description: &str, usage_args: &str) {
    term.print("Wrong number of arguments!\n");
    if description.is_empty() {
        term.print(&format!("Usage: {name} {usage_args}\n"));
    } else {
        term.print(&format!("{name}: {description}\nUsage: {name} {usage_args}\n"));
    }
}

fn print_warning(term: &mut dyn Terminal, message: &str) {
    term.set_color(color::yellow());
    term.print(message);
    term.restore_color();
}

fn cvar_name_completion(
    partial: &str,
    cvars: &CVarManager,
    _commands: &CommandManager,
) -> Vec<String> {
    let (names, _) = cvars.find_names_with_partial(partial, MAX_COMPLETION_MATCHES);
    names.into_iter().map(str::to_string).collect()
}

/// Completion over built-ins, then user commands, then CVar names; the first
/// set with matches wins.
fn any_name_completion(
    partial: &str,
    cvars: &CVarManager,
    commands: &CommandManager,
) -> Vec<String> {
    if !partial.is_empty() {
        let built_ins: Vec<String> = BUILT_IN_COMMANDS
            .iter()
            .filter(|cmd| cmd.name.starts_with(partial))
            .map(|cmd| cmd.name.to_string())
            .collect();
        if !built_ins.is_empty() {
            return built_ins;
        }
    }

    let (names, _) = commands.find_names_with_partial(partial, MAX_COMPLETION_MATCHES);
    if !names.is_empty() {
        return names.into_iter().map(str::to_string).collect();
    }
    cvar_name_completion(partial, cvars, commands)
}

/// Strip an optional trailing `/i` (case-insensitive marker) from a search
/// pattern.
fn split_search_pattern(pattern: &str) -> (&str, bool) {
    if pattern.len() > 2 && pattern.ends_with("/i") {
        (&pattern[..pattern.len() - 2], true)
    } else {
        (pattern, false)
    }
}

// ========================================================
// print / help / echo:
// ========================================================

const PRINT_DESC: &str = "Print CVar value, flags and description.";

fn register_print(commands: &mut CommandManager) {
    commands.register(
        CommandDef::new("print", |args, ctx| {
            if args.arg_count() != 1 {
                print_usage(ctx.term, "print", PRINT_DESC, "<cvar>");
                return;
            }
            let name = args.get_or(0, "");
            let Some(cvar) = ctx.cvars.find(name) else {
                ctx.term.print(&format!("CVar '{name}' is not defined.\n"));
                return;
            };

            let mut text = format!("{} = {};", cvar.name(), cvar.get_string_value());

            let flags = cvar.flags_string();
            if !flags.is_empty() {
                text.push_str(&format!("  flags:'{flags}';"));
            }
            text.push_str(&format!("  type:{};", cvar.type_str()));

            if matches!(cvar.var_type(), CVarType::Int | CVarType::Float) {
                let range = cvar.allowed_value_strings();
                if range.len() == 2 {
                    text.push_str(&format!("  range:[{}, {}];", range[0], range[1]));
                }
            }

            let default_value = cvar.default_value_string();
            if !default_value.is_empty() {
                text.push_str(&format!("  default:{default_value};"));
            }
            if !cvar.get_description().is_empty() {
                text.push_str(&format!("  description:\"{}\";", cvar.get_description()));
            }

            ctx.term.print(&text);
            ctx.term.print("\n\n");
        })
        .description(PRINT_DESC)
        .completion(cvar_name_completion),
        None,
    );
}

const HELP_DESC: &str = "Prints a description comment for the given command or CVar.";

fn register_help(commands: &mut CommandManager) {
    commands.register(
        CommandDef::new("help", |args, ctx| {
            if args.arg_count() != 1 {
                print_usage(ctx.term, "help", HELP_DESC, "<command | cvar>");
                return;
            }
            let name = args.get_or(0, "");

            let described = ctx
                .commands
                .find(name)
                .map(|command| command.get_description().to_string())
                .or_else(|| {
                    ctx.cvars
                        .find(name)
                        .map(|cvar| cvar.get_description().to_string())
                })
                .or_else(|| built_in_command(name).map(|cmd| cmd.desc.to_string()));

            match described {
                Some(description) => {
                    let description = if description.is_empty() {
                        "No description provided.".to_string()
                    } else {
                        description
                    };
                    ctx.term.set_color(color::cyan());
                    ctx.term.print(&format!("{name}: "));
                    ctx.term.restore_color();
                    ctx.term.print(&format!("{description}\n"));
                }
                None => {
                    ctx.term.print(&format!(
                        "No command or CVar found with name \"{name}\".\n"
                    ));
                }
            }
        })
        .description(HELP_DESC)
        .completion(any_name_completion),
        None,
    );
}

fn register_echo(commands: &mut CommandManager) {
    commands.register(
        CommandDef::new("echo", |args, ctx| {
            if args.is_empty() {
                ctx.term.print("\n");
                return;
            }
            for argument in args.iter() {
                ctx.term.print(&format!("{argument} "));
            }
            ctx.term.print("\n");
        })
        .description(
            "Echoes the given arguments to the terminal. If no args provided, prints a blank line.",
        ),
        None,
    );
}

// ========================================================
// alias / unalias:
// ========================================================

const ALIAS_DESC: &str = "Create an alias for a command string.";

fn register_alias(commands: &mut CommandManager) {
    commands.register(
        CommandDef::new("alias", |args, ctx| {
            if args.arg_count() < 3 {
                print_usage(
                    ctx.term,
                    "alias",
                    ALIAS_DESC,
                    "<name> <command string> <mode: -append | -insert | -immediate> [optional description]",
                );
                return;
            }

            let name = args.get_or(0, "");
            let target = args.get_or(1, "");
            let description = args.get_or(3, "");

            let mode = match args.get_or(2, "") {
                "-append" => ExecMode::Append,
                "-insert" => ExecMode::Insert,
                "-immediate" => ExecMode::Immediate,
                other => {
                    print_warning(
                        ctx.term,
                        &format!("Unrecognized flag \"{other}\". Defaulting to '-append'...\n"),
                    );
                    ExecMode::Append
                }
            };

            let created = ctx
                .commands
                .create_alias(name, target, mode, description, Some(&*ctx.cvars));
            if created {
                ctx.term
                    .print(&format!("New command alias '{name}' created successfully.\n"));
            } else {
                print_warning(ctx.term, "Failed to create new command alias!\n");
            }
        })
        .description(ALIAS_DESC),
        None,
    );
}

const UNALIAS_DESC: &str =
    "Removes the command alias. Does nothing if the name refers to a command or CVar.";

fn register_unalias(commands: &mut CommandManager) {
    commands.register(
        CommandDef::new("unalias", |args, ctx| {
            if args.arg_count() != 1 {
                print_usage(ctx.term, "unalias", UNALIAS_DESC, "<name | -all>");
                return;
            }

            if args.arg_is(0, "-all") {
                ctx.commands.remove_all_aliases();
                ctx.term.print("All command aliases removed.\n");
            } else {
                let name = args.get_or(0, "");
                if ctx.commands.remove_alias(name) {
                    ctx.term.print("Command alias removed.\n");
                } else {
                    ctx.term.print(&format!("'{name}' is not a command alias.\n"));
                }
            }
        })
        .description(UNALIAS_DESC),
        None,
    );
}

// ========================================================
// isCmd / isCVar:
// ========================================================

fn register_is_cmd(commands: &mut CommandManager) {
    const DESC: &str = "Test if the name defines a command or a command alias.";
    commands.register(
        CommandDef::new("isCmd", |args, ctx| {
            if args.arg_count() != 1 {
                print_usage(ctx.term, "isCmd", DESC, "<name>");
                return;
            }
            match ctx.commands.find(args.get_or(0, "")) {
                Some(command) if command.is_alias() => {
                    ctx.term.print("yes");
                    ctx.term.set_color(color::cyan());
                    ctx.term.print(" (command alias)\n");
                    ctx.term.restore_color();
                }
                Some(_) => ctx.term.print("yes\n"),
                None => ctx.term.print("no\n"),
            }
        })
        .description(DESC),
        None,
    );
}

fn register_is_cvar(commands: &mut CommandManager) {
    const DESC: &str = "Test if the name defines a CVar.";
    commands.register(
        CommandDef::new("isCVar", |args, ctx| {
            if args.arg_count() != 1 {
                print_usage(ctx.term, "isCVar", DESC, "<name>");
                return;
            }
            if ctx.cvars.find(args.get_or(0, "")).is_some() {
                ctx.term.print("yes\n");
            } else {
                ctx.term.print("no\n");
            }
        })
        .description(DESC),
        None,
    );
}

// ========================================================
// reset / toggle / set / var ops:
// ========================================================

const RESET_DESC: &str = "Resets the CVar to its default value.";

fn register_reset(commands: &mut CommandManager) {
    commands.register(
        CommandDef::new("reset", |args, ctx| {
            if args.arg_count() != 1 {
                print_usage(ctx.term, "reset", RESET_DESC, "<cvar>");
                return;
            }
            let name = args.get_or(0, "");
            if ctx.cvars.find(name).is_none() {
                ctx.term.print(&format!("CVar '{name}' is not defined.\n"));
                return;
            }
            if !ctx.cvars.reset_cvar(name) {
                print_warning(ctx.term, &format!("Cannot reset {name}!\n"));
            }
        })
        .description(RESET_DESC)
        .completion(cvar_name_completion),
        None,
    );
}

const TOGGLE_DESC: &str =
    "Cycles the allowed values of a CVar. Toggles boolean CVars between true and false.";

fn register_toggle(commands: &mut CommandManager) {
    commands.register(
        CommandDef::new("toggle", |args, ctx| {
            if args.arg_count() != 1 {
                print_usage(ctx.term, "toggle", TOGGLE_DESC, "<cvar>");
                return;
            }
            let name = args.get_or(0, "");

            let Some(cvar) = ctx.cvars.find(name) else {
                ctx.term.print(&format!("CVar '{name}' is not defined.\n"));
                return;
            };

            if cvar.var_type() == CVarType::Bool {
                let value = cvar.get_bool_value();
                if let Some(cvar) = ctx.cvars.find_mut(name) {
                    cvar.set_bool_value(!value);
                }
                return;
            }

            // Cycle the allowed value strings in listed order.
            let allowed = cvar.allowed_value_strings();
            if allowed.is_empty() {
                ctx.term.print("No values to toggle...\n");
                return;
            }
            let current = cvar.get_string_value();

            let toggled = allowed
                .iter()
                .position(|value| *value == current)
                .is_some_and(|index| {
                    let next = &allowed[(index + 1) % allowed.len()];
                    ctx.cvars
                        .find_mut(name)
                        .is_some_and(|cvar| cvar.set_string_value(next))
                });
            if !toggled {
                print_warning(ctx.term, &format!("Cannot toggle {name}!\n"));
            }
        })
        .description(TOGGLE_DESC)
        .completion(cvar_name_completion),
        None,
    );
}

const SET_DESC: &str =
    "Set the value of a CVar if it is writable. Optionally creates the var if it doesn't exists.";

fn register_set(commands: &mut CommandManager) {
    commands.register(
        CommandDef::new("set", |args, ctx| {
            if args.arg_count() < 2 {
                print_usage(
                    ctx.term,
                    "set",
                    SET_DESC,
                    "<cvar> <value> [flags: -persistent | -volatile | -readonly | -initonly | -modified | -nocreate]",
                );
                return;
            }

            let name = args.get_or(0, "");
            let value = args.get_or(1, "");

            if ctx.cvars.find(name).is_some() {
                if !ctx.cvars.set_cvar_string(name, value) {
                    print_warning(ctx.term, &format!("Cannot set {name} to \"{value}\"!\n"));
                }
                return;
            }

            // Unknown name: optionally create a user-defined var.
            let mut no_create = false;
            let mut flags = CVarFlags::USER_DEFINED;
            for index in 2..args.arg_count() {
                match args.get_or(index, "") {
                    "-persistent" => flags |= CVarFlags::PERSISTENT,
                    "-volatile" => flags |= CVarFlags::VOLATILE,
                    "-readonly" => flags |= CVarFlags::READ_ONLY,
                    "-initonly" => flags |= CVarFlags::INIT_ONLY,
                    "-modified" => flags |= CVarFlags::MODIFIED,
                    "-nocreate" => no_create = true,
                    _ => {}
                }
            }

            if no_create {
                ctx.term
                    .print(&format!("CVar '{name}' is not defined and won't be created.\n"));
                return;
            }
            ctx.cvars.set_value_string(name, value, flags);
        })
        .description(SET_DESC)
        .completion(cvar_name_completion),
        None,
    );
}

fn register_var_op(
    commands: &mut CommandManager,
    op_name: &'static str,
    op: fn(f64, f64) -> f64,
    description: &'static str,
) {
    commands.register(
        CommandDef::new(op_name, move |args, ctx| {
            cvar_value_op(op_name, description, op, args, ctx);
        })
        .description(description)
        .completion(cvar_name_completion),
        None,
    );
}

fn cvar_value_op(
    op_name: &str,
    description: &str,
    op: fn(f64, f64) -> f64,
    args: &CommandArgs,
    ctx: &mut ExecContext<'_>,
) {
    if args.arg_count() != 2 {
        print_usage(ctx.term, op_name, description, "<cvar> <value>");
        return;
    }
    let name = args.get_or(0, "");

    let Some(cvar) = ctx.cvars.find(name) else {
        ctx.term.print(&format!("CVar '{name}' is not defined.\n"));
        return;
    };
    if !matches!(cvar.var_type(), CVarType::Int | CVarType::Float) {
        ctx.term
            .print(&format!("Cannot {op_name} to value of non-numeric CVar.\n"));
        return;
    }

    let operand = parse_float(args.get_or(1, "")).unwrap_or(0.0);
    let current = cvar.get_float_value();

    let updated = ctx
        .cvars
        .find_mut(name)
        .is_some_and(|cvar| cvar.set_float_value(op(current, operand)));
    if !updated {
        print_warning(ctx.term, &format!("Cannot {op_name} to value of CVar {name}!\n"));
    }
}

// ========================================================
// listCmds / listCVars:
// ========================================================

const LIST_CMDS_DESC: &str = "Prints a list of the available commands.";

fn register_list_cmds(commands: &mut CommandManager) {
    commands.register(
        CommandDef::new("listCmds", |args, ctx| {
            if args.arg_count() > 2 {
                print_usage(ctx.term, "listCmds", LIST_CMDS_DESC, "[search-pattern [/i]] [-sort]");
                return;
            }

            let mut pattern = None;
            if !args.is_empty() && !args.arg_is(0, "-sort") {
                let (text, ignore_case) = split_search_pattern(args.get_or(0, ""));
                pattern = Some((text.to_string(), ignore_case));
            }

            struct Row {
                name: String,
                desc: String,
                alias: bool,
                built_in: bool,
            }

            let matches_pattern = |name: &str| match &pattern {
                Some((text, ignore_case)) => find_substring(name, text, *ignore_case),
                None => true,
            };

            let mut rows: Vec<Row> = ctx
                .commands
                .iter()
                .filter(|command| matches_pattern(command.name()))
                .map(|command| Row {
                    name: command.name().to_string(),
                    desc: command.get_description().to_string(),
                    alias: command.is_alias(),
                    built_in: false,
                })
                .collect();
            for built_in in &BUILT_IN_COMMANDS {
                if matches_pattern(built_in.name) {
                    rows.push(Row {
                        name: built_in.name.to_string(),
                        desc: built_in.desc.to_string(),
                        alias: false,
                        built_in: true,
                    });
                }
            }

            if rows.is_empty() {
                match &pattern {
                    Some((text, _)) => ctx
                        .term
                        .print(&format!("No matching commands found for pattern \"{text}\".\n")),
                    None => ctx.term.print("No commands found.\n"),
                }
                return;
            }

            // "-sort" can follow the command name or the search pattern.
            if args.arg_is(0, "-sort") || args.arg_is(1, "-sort") {
                rows.sort_by(|a, b| a.name.cmp(&b.name));
            }

            let longest = rows.iter().map(|row| row.name.len()).max().unwrap_or(0);

            ctx.term.print("================ Command Listing ================\n");
            for row in &rows {
                if row.alias {
                    ctx.term.set_color(color::magenta());
                } else if row.built_in {
                    ctx.term.set_color(color::white());
                }
                ctx.term.print(&format!("{:<longest$} ", row.name));
                if row.alias || row.built_in {
                    ctx.term.restore_color();
                }
                if !row.desc.is_empty() {
                    ctx.term.print(&format!(" \"{}\"", row.desc));
                }
                ctx.term.print("\n");
            }

            ctx.term.set_color(color::cyan());
            ctx.term.print(&format!("listed {} commands.\n\n", rows.len()));

            ctx.term.set_color(color::magenta());
            ctx.term.print("magenta");
            ctx.term.restore_color();
            ctx.term.print(" = command aliases\n");

            ctx.term.set_color(color::white());
            ctx.term.print("white  ");
            ctx.term.restore_color();
            ctx.term.print(" = built-in commands\n");

            ctx.term.print("=================================================\n");
        })
        .description(LIST_CMDS_DESC),
        None,
    );
}

const LIST_CVARS_DESC: &str = "Prints a list of the registered CVars.";

fn register_list_cvars(commands: &mut CommandManager) {
    commands.register(
        CommandDef::new("listCVars", |args, ctx| {
            if args.arg_count() > 3 {
                print_usage(
                    ctx.term,
                    "listCVars",
                    LIST_CVARS_DESC,
                    "[search-pattern[/i]] [-sort] [-values]",
                );
                return;
            }

            let mut pattern = None;
            if !args.is_empty() && !args.arg_is(0, "-sort") && !args.arg_is(0, "-values") {
                let (text, ignore_case) = split_search_pattern(args.get_or(0, ""));
                pattern = Some((text.to_string(), ignore_case));
            }

            struct Row {
                name: String,
                value: String,
                type_str: &'static str,
                flags: String,
                desc: String,
            }

            let matches_pattern = |name: &str| match &pattern {
                Some((text, ignore_case)) => find_substring(name, text, *ignore_case),
                None => true,
            };

            let mut rows: Vec<Row> = ctx
                .cvars
                .iter()
                .filter(|cvar| matches_pattern(cvar.name()))
                .map(|cvar| Row {
                    name: cvar.name().to_string(),
                    value: cvar.get_string_value(),
                    type_str: cvar.type_str(),
                    flags: cvar.flags_string(),
                    desc: cvar.get_description().to_string(),
                })
                .collect();

            if rows.is_empty() {
                match &pattern {
                    Some((text, _)) => ctx
                        .term
                        .print(&format!("No matching CVars found for pattern \"{text}\".\n")),
                    None => ctx.term.print("No CVars found.\n"),
                }
                return;
            }

            let sort = args.arg_is(0, "-sort") || args.arg_is(1, "-sort") || args.arg_is(2, "-sort");
            if sort {
                rows.sort_by(|a, b| a.name.cmp(&b.name));
            }
            let values_only = args.arg_is(0, "-values")
                || args.arg_is(1, "-values")
                || args.arg_is(2, "-values");

            let longest = rows.iter().map(|row| row.name.len()).max().unwrap_or(0);

            ctx.term.print("================== CVar Listing =================\n");
            if values_only {
                for row in &rows {
                    ctx.term
                        .print(&format!("{:<longest$} \"{}\"\n", row.name, row.value));
                }
            } else {
                for row in &rows {
                    ctx.term.print(&format!(
                        "{:<longest$} | {:<6} | {:<11} |",
                        row.name, row.type_str, row.flags
                    ));
                    if !row.desc.is_empty() {
                        ctx.term.print(&format!(" \"{}\"", row.desc));
                    }
                    ctx.term.print("\n");
                }
            }

            ctx.term.set_color(color::cyan());
            ctx.term.print(&format!("listed {} variables.\n", rows.len()));
            if !values_only {
                ctx.term.print("\n");
                ctx.term.print("Flags reference:\n");
                ctx.term.print("M = Modified\n");
                ctx.term.print("P = Persistent\n");
                ctx.term.print("V = Volatile\n");
                ctx.term.print("R = Read only\n");
                ctx.term.print("I = Init only\n");
                ctx.term.print("C = Range check\n");
                ctx.term.print("U = User defined\n");
                ctx.term.print("0 = No flags\n");
            }
            ctx.term.restore_color();
            ctx.term.print("=================================================\n");
        })
        .description(LIST_CVARS_DESC),
        None,
    );
}

// ========================================================
// saveConfig / reloadConfig / exec:
// ========================================================

const SAVE_CONFIG_DESC: &str =
    "Writes a configuration file with the registered CVars and command aliases. Clears modified flags.";

fn register_save_config(commands: &mut CommandManager) {
    commands.register(
        CommandDef::new("saveConfig", |args, ctx| {
            if args.arg_count() > 1 {
                print_usage(ctx.term, "saveConfig", SAVE_CONFIG_DESC, "[filename]");
                return;
            }
            let filename = args.get_or(0, DEFAULT_CONFIG_FILE).to_string();

            if persist::write_config(ctx.cvars, ctx.commands, ctx.files, &filename) {
                ctx.term
                    .print(&format!("Config file \"{filename}\" successfully written.\n"));
            }
        })
        .description(SAVE_CONFIG_DESC),
        None,
    );
}

const RELOAD_CONFIG_DESC: &str =
    "Loads a configuration file updating existing CVars and possibly creating new ones.";

fn register_reload_config(commands: &mut CommandManager) {
    commands.register(
        CommandDef::new("reloadConfig", |args, ctx| {
            if args.arg_count() > 3 {
                print_usage(
                    ctx.term,
                    "reloadConfig",
                    RELOAD_CONFIG_DESC,
                    "[filename] [-echo] [-force]",
                );
                return;
            }

            let filename = if args.is_empty() || args.arg_is(0, "-echo") || args.arg_is(0, "-force")
            {
                DEFAULT_CONFIG_FILE.to_string()
            } else {
                args.get_or(0, DEFAULT_CONFIG_FILE).to_string()
            };

            let mut echo = false;
            let mut force = false;
            for index in 0..args.arg_count() {
                match args.get_or(index, "") {
                    "-echo" => echo = true,
                    "-force" => force = true,
                    _ => {}
                }
            }

            // Refuse to clobber pending modifications unless forced.
            if ctx.cvars.any_modified() && !force {
                print_warning(
                    ctx.term,
                    "There are pending modifications on CVars that haven't been saved yet; Stopping.\n",
                );
                print_warning(
                    ctx.term,
                    "To force a reload use: \"reloadConfig [filename] -force\".\n",
                );
                return;
            }

            // The whole file may update ReadOnly and InitOnly CVars alike.
            let (commands, mut env) = ctx.split();
            env.cvars.allow_write_read_only(true);
            let loaded = commands.exec_config_file(&filename, echo, &mut env);
            env.cvars.allow_write_read_only(false);

            if loaded {
                env.term
                    .print(&format!("Config file \"{filename}\" successfully loaded.\n"));
            } else {
                env.term.set_color(color::red());
                env.term
                    .print(&format!("Failed to reload config file \"{filename}\".\n"));
                env.term.restore_color();
            }
        })
        .description(RELOAD_CONFIG_DESC),
        None,
    );
}

const EXEC_DESC: &str = "Execute a command string or a configuration file.";

fn register_exec(commands: &mut CommandManager) {
    commands.register(
        CommandDef::new("exec", |args, ctx| {
            if args.arg_count() < 1 || args.arg_count() > 2 {
                print_usage(
                    ctx.term,
                    "exec",
                    EXEC_DESC,
                    "<config-file | command-string> [-echo]",
                );
                return;
            }
            if args.arg_is(0, "-echo") {
                ctx.term
                    .print("Expected filename or command string after 'exec' command.\n");
                return;
            }

            let target = args.get_or(0, "").to_string();
            let echo = args.arg_is(1, "-echo");

            // Strings ending in a config extension are treated as files.
            let is_filename = target
                .rsplit_once('.')
                .is_some_and(|(_, ext)| ext == "cfg" || ext == "ini");

            if is_filename {
                ctx.term
                    .print(&format!("Executing config file \"{target}\"...\n"));
                let (commands, mut env) = ctx.split();
                if commands.exec_config_file(&target, echo, &mut env) {
                    env.term.print("Done!\n");
                } else {
                    env.term.set_color(color::red());
                    env.term
                        .print(&format!("Failed to exec config file \"{target}\".\n"));
                    env.term.restore_color();
                }
            } else {
                ctx.term
                    .print(&format!("Appending command line \"{target}\"...\n"));
                ctx.commands.exec_append(&target);
            }
        })
        .description(EXEC_DESC),
        None,
    );
}
