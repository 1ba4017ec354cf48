//! CVar registry: validation, registration, lookup and enumeration.

use crate::core::cvar::{CVar, CVarFlags};
use crate::core::registry::{CaseSensitive, Registry};
use crate::error::report_error;

/// Owns every registered [`CVar`] and provides lookup by name, partial-name
/// and flag queries, and the override window used by config reload and the
/// startup command line.
///
/// # Examples
///
/// ```
/// use cvar_console::core::cvar::{CVar, CVarFlags};
/// use cvar_console::core::cvar_manager::CVarManager;
///
/// let mut cvars = CVarManager::new();
/// cvars.register(CVar::int("sv_maxplayers", 32, 1, 64)
///     .description("Maximum number of players")
///     .flags(CVarFlags::RANGE_CHECK));
///
/// assert_eq!(cvars.get_int_value("sv_maxplayers"), 32);
/// assert!(cvars.find("sv_maxplayers").is_some());
/// ```
pub struct CVarManager {
    vars: Registry<CVar, CaseSensitive>,
    allow_write_read_only: bool,
    allow_write_init_only: bool,
}

impl CVarManager {
    pub fn new() -> Self {
        Self {
            vars: Registry::new(),
            allow_write_read_only: false,
            allow_write_init_only: false,
        }
    }

    pub fn with_bucket_count(bucket_count: usize) -> Self {
        Self {
            vars: Registry::with_bucket_count(bucket_count),
            allow_write_read_only: false,
            allow_write_init_only: false,
        }
    }

    /// Tests if a string complies with the CVar naming rules. It does NOT
    /// check whether the variable is already registered.
    ///
    /// Names follow C identifier rules, extended with `.` separators for
    /// multi-part names such as `Obj.Prop`: a dot must be followed by a
    /// letter or underscore and cannot end the name.
    pub fn is_valid_cvar_name(name: &str) -> bool {
        let bytes = name.as_bytes();
        let Some(&first) = bytes.first() else {
            return false;
        };
        if !first.is_ascii_alphabetic() && first != b'_' {
            return false;
        }

        let mut i = 1;
        while i < bytes.len() {
            let c = bytes[i];
            if c.is_ascii_alphanumeric() {
                i += 1;
                continue;
            }
            match c {
                // A non-leading underscore must be followed by a letter,
                // digit, underscore or dot (validated next iteration).
                b'_' => {
                    if i + 1 == bytes.len() {
                        return false;
                    }
                    i += 1;
                }
                // A dot must be followed by a letter or underscore.
                b'.' => match bytes.get(i + 1) {
                    Some(&next) if next.is_ascii_alphabetic() || next == b'_' => i += 2,
                    _ => return false,
                },
                _ => return false,
            }
        }
        true
    }

    /// Register a CVar, taking ownership. Fails (returning `false`) on an
    /// invalid name or a duplicate.
    pub fn register(&mut self, cvar: CVar) -> bool {
        let name = cvar.name();
        if name.is_empty() {
            report_error!("Null or empty string for CVar name!");
            return false;
        }
        if !Self::is_valid_cvar_name(name) {
            report_error!("Invalid CVar name '{}'. Can't register it.", name);
            return false;
        }
        if let Some(existing) = self.vars.find(name) {
            if existing.get_flags() != cvar.get_flags() {
                report_error!("CVar '{}' already registered with different flags!", name);
            } else if existing.get_string_value() != cvar.get_string_value() {
                report_error!("CVar '{}' already registered with different value!", name);
            } else {
                report_error!(
                    "CVar '{}' already registered! Duplicate names are not allowed.",
                    name
                );
            }
            return false;
        }

        self.vars.link(cvar);
        true
    }

    pub fn find(&self, name: &str) -> Option<&CVar> {
        self.vars.find(name)
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut CVar> {
        self.vars.find_mut(name)
    }

    /// Find CVars whose name starts with `partial`. Up to `max_matches`
    /// references are returned sorted alphabetically; the second value is
    /// the total number of matches, which may be larger.
    pub fn find_with_partial_name(&self, partial: &str, max_matches: usize) -> (Vec<&CVar>, usize) {
        if partial.is_empty() || max_matches == 0 {
            return (Vec::new(), 0);
        }

        let mut matches = Vec::new();
        let mut total = 0;
        for cvar in self.vars.iter() {
            if cvar.name().starts_with(partial) {
                if matches.len() < max_matches {
                    matches.push(cvar);
                }
                total += 1;
            }
        }
        matches.sort_by(|a, b| a.name().cmp(b.name()));
        (matches, total)
    }

    /// Same as [`CVarManager::find_with_partial_name`] but yields just the
    /// names, for completion listings.
    pub fn find_names_with_partial(&self, partial: &str, max_matches: usize) -> (Vec<&str>, usize) {
        let (matches, total) = self.find_with_partial_name(partial, max_matches);
        (matches.into_iter().map(CVar::name).collect(), total)
    }

    /// Find CVars with any of the given flag bits set, sorted alphabetically.
    /// Returns the total number found alongside up to `max_matches` entries.
    pub fn find_with_flags(&self, flags: CVarFlags, max_matches: usize) -> (Vec<&CVar>, usize) {
        if flags.is_empty() || max_matches == 0 {
            return (Vec::new(), 0);
        }

        let mut matches = Vec::new();
        let mut total = 0;
        for cvar in self.vars.iter() {
            if cvar.get_flags().intersects(flags) {
                if matches.len() < max_matches {
                    matches.push(cvar);
                }
                total += 1;
            }
        }
        matches.sort_by(|a, b| a.name().cmp(b.name()));
        (matches, total)
    }

    /// Remove a CVar by name, destroying it. Any outstanding references are
    /// gone with it; this is a documented contract, not a runtime error.
    pub fn remove(&mut self, name: &str) -> bool {
        if !Self::is_valid_cvar_name(name) {
            report_error!("'{}' is not a valid CVar name. Nothing to remove.", name);
            return false;
        }
        self.vars.unlink(name).is_some()
    }

    /// Unregister and destroy every CVar owned by this manager.
    pub fn remove_all(&mut self) {
        self.vars.clear();
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Iterate all registered CVars, most recently registered first.
    pub fn iter(&self) -> impl Iterator<Item = &CVar> {
        self.vars.iter()
    }

    /// Visit every CVar mutably.
    pub fn for_each_mut(&mut self, visit: impl FnMut(&mut CVar)) {
        self.vars.for_each_mut(visit);
    }

    // ========================================================
    // Value queries by name:
    // ========================================================

    pub fn get_bool_value(&self, name: &str) -> bool {
        match self.find(name) {
            Some(cvar) => cvar.get_bool_value(),
            None => {
                report_error!("CVar '{}' not found.", name);
                false
            }
        }
    }

    pub fn get_int_value(&self, name: &str) -> i64 {
        match self.find(name) {
            Some(cvar) => cvar.get_int_value(),
            None => {
                report_error!("CVar '{}' not found.", name);
                0
            }
        }
    }

    pub fn get_float_value(&self, name: &str) -> f64 {
        match self.find(name) {
            Some(cvar) => cvar.get_float_value(),
            None => {
                report_error!("CVar '{}' not found.", name);
                0.0
            }
        }
    }

    pub fn get_string_value(&self, name: &str) -> String {
        match self.find(name) {
            Some(cvar) => cvar.get_string_value(),
            None => {
                report_error!("CVar '{}' not found.", name);
                String::new()
            }
        }
    }

    // ========================================================
    // Value updates with on-demand registration:
    // ========================================================

    /// Set an existing CVar or register a new one with the given flags.
    /// Returns `false` only when a new registration fails.
    pub fn set_value_bool(&mut self, name: &str, value: bool, flags: CVarFlags) -> bool {
        if let Some(cvar) = self.vars.find_mut(name) {
            cvar.set_bool_value(value);
            return true;
        }
        self.register(CVar::bool(name, value).flags(flags))
    }

    pub fn set_value_int(&mut self, name: &str, value: i64, flags: CVarFlags) -> bool {
        if let Some(cvar) = self.vars.find_mut(name) {
            cvar.set_int_value(value);
            return true;
        }
        self.register(CVar::int(name, value, i64::MIN, i64::MAX).flags(flags))
    }

    pub fn set_value_float(&mut self, name: &str, value: f64, flags: CVarFlags) -> bool {
        if let Some(cvar) = self.vars.find_mut(name) {
            cvar.set_float_value(value);
            return true;
        }
        self.register(CVar::float(name, value, f64::MIN, f64::MAX).flags(flags))
    }

    pub fn set_value_string(&mut self, name: &str, value: &str, flags: CVarFlags) -> bool {
        if let Some(cvar) = self.vars.find_mut(name) {
            cvar.set_string_value(value);
            return true;
        }
        self.register(CVar::string(name, value).flags(flags))
    }

    // ========================================================
    // Override window for `set`/`reset` commands:
    // ========================================================

    /// Allow `set`/`reset` to write read-only CVars. Init-only vars inherit
    /// the setting; the opposite is not true.
    pub fn allow_write_read_only(&mut self, allow: bool) {
        self.allow_write_read_only = allow;
        self.allow_write_init_only = allow;
    }

    /// Allow `set`/`reset` to write init-only CVars.
    pub fn allow_write_init_only(&mut self, allow: bool) {
        self.allow_write_init_only = allow;
    }

    /// Set a CVar's string value, routing through the override path when the
    /// variable is not writable and an override window is open. The override
    /// path does not mark the variable as modified.
    pub fn set_cvar_string(&mut self, name: &str, value: &str) -> bool {
        let allow_ro = self.allow_write_read_only;
        let allow_init = self.allow_write_init_only;
        let Some(cvar) = self.vars.find_mut(name) else {
            report_error!("CVar '{}' not found.", name);
            return false;
        };
        if !cvar.is_writable() && (allow_ro || allow_init) {
            cvar.set_string_value_override(value, allow_ro, allow_init)
        } else {
            cvar.set_string_value(value)
        }
    }

    /// Reset a CVar to its default, honoring the override window like
    /// [`CVarManager::set_cvar_string`].
    pub fn reset_cvar(&mut self, name: &str) -> bool {
        let allow_ro = self.allow_write_read_only;
        let allow_init = self.allow_write_init_only;
        let Some(cvar) = self.vars.find_mut(name) else {
            report_error!("CVar '{}' not found.", name);
            return false;
        };
        if !cvar.is_writable() && (allow_ro || allow_init) {
            cvar.set_default_override(allow_ro, allow_init)
        } else {
            cvar.set_default_value()
        }
    }

    /// True if any registered CVar carries the modified flag.
    pub fn any_modified(&self) -> bool {
        self.vars.iter().any(CVar::is_modified)
    }
}

impl Default for CVarManager {
    fn default() -> Self {
        Self::new()
    }
}
