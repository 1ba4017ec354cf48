//! Interactive console binary.
//!
//! Wires the library to a raw-mode TTY: registers the default command set
//! and a few demo CVars, feeds the program command line through the startup
//! processor (`+CMD ARGS` groups), then pumps keys through the line editor
//! until `exit`.

use std::time::Duration;

use cvar_console::prelude::*;
use cvar_console::{
    color, register_default_commands, StdFileIo, Terminal, TtyTerminal, EXEC_ALL,
};

fn register_demo_cvars(cvars: &mut CVarManager) {
    cvars.register(
        CVar::float("sv_gravity", 800.0, 0.0, 4000.0)
            .description("World gravity")
            .flags(CVarFlags::PERSISTENT | CVarFlags::RANGE_CHECK),
    );
    cvars.register(
        CVar::int("sv_maxplayers", 32, 1, 64)
            .description("Maximum number of players")
            .flags(CVarFlags::INIT_ONLY | CVarFlags::RANGE_CHECK),
    );
    cvars.register(
        CVar::string("sv_hostname", "localhost")
            .description("Server name")
            .flags(CVarFlags::PERSISTENT),
    );
    cvars.register(
        CVar::enumeration(
            "r_textureMode",
            1,
            &[("nearest", 0), ("bilinear", 1), ("trilinear", 2)],
        )
        .description("Texture filtering mode")
        .flags(CVarFlags::PERSISTENT | CVarFlags::RANGE_CHECK),
    );
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .without_time()
        .with_target(false)
        .init();

    let mut cvars = CVarManager::new();
    let mut commands = CommandManager::new();
    register_default_commands(&mut commands);
    register_demo_cvars(&mut cvars);

    let mut term = TtyTerminal::new();
    let mut files = StdFileIo::new();
    let mut editor = LineEditor::new();

    // Process "+CMD ARGS" groups from the program command line.
    let argv: Vec<String> = std::env::args().skip(1).collect();
    {
        let mut env = ExecEnv {
            cvars: &mut cvars,
            term: &mut term,
            files: &mut files,
        };
        commands.exec_startup_command_line(&argv, &mut env);
    }

    if !term.is_tty() {
        // Batch mode: run whatever the command line queued, then leave.
        let mut env = ExecEnv {
            cvars: &mut cvars,
            term: &mut term,
            files: &mut files,
        };
        commands.exec_buffered(EXEC_ALL, &mut env);
        return;
    }

    term.print(&format!(
        "{}cvar-console{} - type a command, Tab completes, 'exit' quits.\n",
        color::cyan(),
        color::restore()
    ));
    editor.begin(&mut term);

    while !editor.should_exit() {
        let mut idle = true;

        while term.has_input() {
            let Some(key) = term.get_input() else {
                break;
            };
            idle = false;
            let mut ctx = ExecContext {
                commands: &mut commands,
                cvars: &mut cvars,
                term: &mut term,
                files: &mut files,
            };
            editor.handle_key(key, &mut ctx);
        }

        if commands.has_buffered_commands() {
            idle = false;
            let mut env = ExecEnv {
                cvars: &mut cvars,
                term: &mut term,
                files: &mut files,
            };
            commands.exec_buffered(EXEC_ALL, &mut env);
            editor.update(&mut term);
        }

        if idle {
            std::thread::sleep(Duration::from_millis(10));
        }
    }

    term.print("\n");
}
