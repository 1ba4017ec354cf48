//! Config file writing.
//!
//! `saveConfig` walks the CVar registry and serializes every persistent
//! variable as a `set` line, then every command alias as an `alias` line.
//! The resulting file is plain command text, executed back through the
//! command processor by `reloadConfig`/`exec`.

use crate::core::command_manager::CommandManager;
use crate::core::cvar_manager::CVarManager;
use crate::fileio::{FileIo, FileMode};

/// Config file used when `saveConfig`/`reloadConfig` get no filename.
pub const DEFAULT_CONFIG_FILE: &str = "default.cfg";

const CONFIG_HEADER: [&str; 4] = [
    "#",
    "# File automatically generated; do not modify.",
    "#",
    "",
];

/// Write the configuration file: a fixed header, one `set` line per
/// persistent CVar, then one `alias` line per command alias.
///
/// As a side effect the modified flag of **every** CVar is cleared, since
/// the registry state is now synchronized with persistent storage.
pub fn write_config(
    cvars: &mut CVarManager,
    commands: &CommandManager,
    files: &mut dyn FileIo,
    filename: &str,
) -> bool {
    let Some(handle) = files.open(filename, FileMode::Write) else {
        return false;
    };

    for line in CONFIG_HEADER {
        files.write_line(handle, line);
    }

    if !cvars.is_empty() {
        files.write_line(handle, "# CVars:");
        let mut lines = Vec::new();
        cvars.for_each_mut(|cvar| {
            if cvar.is_persistent() {
                lines.push(cvar.to_cfg_string());
            }
            // Synchronized with persistent storage now.
            cvar.clear_modified();
        });
        // Registry iteration is newest-first; the file reads better oldest-first.
        for line in lines.iter().rev() {
            files.write_line(handle, line);
        }
        files.write_line(handle, "");
    }

    if commands.alias_count() > 0 {
        files.write_line(handle, "# Command aliases:");
        let alias_lines: Vec<String> = commands
            .iter()
            .filter_map(|command| command.to_cfg_string())
            .collect();
        for line in alias_lines.iter().rev() {
            files.write_line(handle, line);
        }
        files.write_line(handle, "");
    }

    files.close(handle);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::command::ExecMode;
    use crate::core::cvar::{CVar, CVarFlags};
    use crate::fileio::StdFileIo;

    #[test]
    fn test_write_config_persists_flagged_vars_and_aliases() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.cfg");
        let path = path.to_str().unwrap();

        let mut cvars = CVarManager::new();
        cvars.register(CVar::bool("bVar", false).flags(CVarFlags::PERSISTENT));
        cvars.register(CVar::int("transient", 1, 0, 9));
        cvars.find_mut("bVar").unwrap().set_bool_value(true);

        let mut commands = CommandManager::new();
        commands.create_alias("greet", "echo hello", ExecMode::Append, "", None);

        let mut files = StdFileIo::new();
        assert!(write_config(&mut cvars, &commands, &mut files, path));

        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.contains("set bVar true"));
        assert!(!text.contains("transient"));
        assert!(text.contains("alias greet \"echo hello\" -append"));
        assert!(text.starts_with("#\n"));

        // Every var had its modified bit cleared by the save.
        assert!(!cvars.any_modified());
    }

    #[test]
    fn test_write_config_quotes_string_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.cfg");
        let path = path.to_str().unwrap();

        let mut cvars = CVarManager::new();
        cvars.register(
            CVar::string("greeting", "hello world")
                .flags(CVarFlags::PERSISTENT | CVarFlags::USER_DEFINED),
        );

        let commands = CommandManager::new();
        let mut files = StdFileIo::new();
        assert!(write_config(&mut cvars, &commands, &mut files, path));

        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.contains("set greeting \"hello world\" -persistent"));
    }

    #[test]
    fn test_write_config_unopenable_path_fails() {
        let mut cvars = CVarManager::new();
        let commands = CommandManager::new();
        let mut files = StdFileIo::new();
        assert!(!write_config(
            &mut cvars,
            &commands,
            &mut files,
            "no/such/dir/out.cfg"
        ));
    }
}
