//! Configuration variable (CVar) implementation.
//!
//! A CVar is a named, typed, optionally constrained value that can be read
//! and written in four scalar views (int, bool, float, string). The five
//! variants carry their own constraint payload: numeric ranges, allowed
//! string lists, or enum constant tables.

use std::fmt;

use crate::core::registry::Keyed;
use crate::core::strings::{
    bool_to_string, float_to_string, int_to_string, parse_bool_string, parse_float, parse_int,
};
use crate::error::{report_error, report_warning};

/// Flags controlling CVar behavior.
///
/// The low 16 bits are reserved by the library; applications may define
/// their own bits with [`CVarFlags::user`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CVarFlags(u32);

impl CVarFlags {
    /// No flags set.
    pub const NONE: Self = Self(0);

    /// Value changed since the last config save (internal bookkeeping).
    pub const MODIFIED: Self = Self(1 << 0);

    /// Value is written to the config file and restored on the next run.
    pub const PERSISTENT: Self = Self(1 << 1);

    /// Value lives only for the current run. Mutually exclusive with
    /// `PERSISTENT`.
    pub const VOLATILE: Self = Self(1 << 2);

    /// Display only; cannot be changed by commands or the set methods.
    pub const READ_ONLY: Self = Self(1 << 3);

    /// Like `READ_ONLY` but writable from the startup command line.
    pub const INIT_ONLY: Self = Self(1 << 4);

    /// Enforce min/max bounds, allowed strings, or enum membership.
    pub const RANGE_CHECK: Self = Self(1 << 5);

    /// Created by a `set` command or a config file rather than by code.
    pub const USER_DEFINED: Self = Self(1 << 6);

    /// An application-defined flag bit. `index` 0 maps to bit 16.
    pub const fn user(index: u32) -> Self {
        Self(1 << (16 + index))
    }

    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    #[inline]
    pub const fn intersects(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }

    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    #[inline]
    pub const fn difference(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for CVarFlags {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl std::ops::BitOrAssign for CVarFlags {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

/// Formatting used when converting integer CVar values to strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumberFormat {
    Binary,
    Octal,
    #[default]
    Decimal,
    Hexadecimal,
}

/// Type tag of a CVar's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CVarType {
    Int,
    Bool,
    Float,
    String,
    Enum,
}

/// Optional value-completion callback. Receives the partial argument and
/// returns the matching value suggestions. When absent, completion falls
/// back to the allowed-values list.
pub type ValueCompletionFn = Box<dyn Fn(&str) -> Vec<String> + Send + Sync>;

/// One named constant of an enum CVar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumConst {
    pub name: Box<str>,
    pub value: i64,
}

/// The tagged value payload of a CVar, constraints included.
pub enum CVarValue {
    Int {
        current: i64,
        default: i64,
        min: i64,
        max: i64,
    },
    Bool {
        current: bool,
        default: bool,
    },
    Float {
        current: f64,
        default: f64,
        min: f64,
        max: f64,
    },
    String {
        current: String,
        default: String,
        allowed: Option<Vec<String>>,
    },
    Enum {
        current: i64,
        default: i64,
        constants: Vec<EnumConst>,
    },
}

impl CVarValue {
    fn var_type(&self) -> CVarType {
        match self {
            CVarValue::Int { .. } => CVarType::Int,
            CVarValue::Bool { .. } => CVarType::Bool,
            CVarValue::Float { .. } => CVarType::Float,
            CVarValue::String { .. } => CVarType::String,
            CVarValue::Enum { .. } => CVarType::Enum,
        }
    }

    fn enum_name_for(constants: &[EnumConst], value: i64) -> Option<&str> {
        constants
            .iter()
            .find(|c| c.value == value)
            .map(|c| c.name.as_ref())
    }

    fn get_int(&self, name: &str) -> i64 {
        match self {
            CVarValue::Int { current, .. } => *current,
            CVarValue::Bool { current, .. } => i64::from(*current),
            CVarValue::Float { current, .. } => *current as i64,
            CVarValue::Enum { current, .. } => *current,
            CVarValue::String { current, .. } => match parse_int(current) {
                Some(value) => value,
                None => {
                    report_error!(
                        "No available conversion from \"{}\" to integer for CVar '{}'.",
                        current,
                        name
                    );
                    0
                }
            },
        }
    }

    fn get_float(&self, name: &str) -> f64 {
        match self {
            CVarValue::Int { current, .. } => *current as f64,
            CVarValue::Bool { current, .. } => f64::from(u8::from(*current)),
            CVarValue::Float { current, .. } => *current,
            CVarValue::Enum { current, .. } => *current as f64,
            CVarValue::String { current, .. } => match parse_float(current) {
                Some(value) => value,
                None => {
                    report_error!(
                        "No available conversion from \"{}\" to float for CVar '{}'.",
                        current,
                        name
                    );
                    0.0
                }
            },
        }
    }

    fn get_string(&self, format: NumberFormat) -> String {
        match self {
            CVarValue::Int { current, .. } => int_to_string(*current, format),
            CVarValue::Bool { current, .. } => bool_to_string(*current),
            CVarValue::Float { current, .. } => float_to_string(*current),
            CVarValue::String { current, .. } => current.clone(),
            CVarValue::Enum {
                current, constants, ..
            } => match Self::enum_name_for(constants, *current) {
                Some(name) => name.to_string(),
                None => int_to_string(*current, format),
            },
        }
    }

    fn default_string(&self, format: NumberFormat) -> String {
        match self {
            CVarValue::Int { default, .. } => int_to_string(*default, format),
            CVarValue::Bool { default, .. } => bool_to_string(*default),
            CVarValue::Float { default, .. } => float_to_string(*default),
            CVarValue::String { default, .. } => default.clone(),
            CVarValue::Enum {
                default, constants, ..
            } => match Self::enum_name_for(constants, *default) {
                Some(name) => name.to_string(),
                None => int_to_string(*default, format),
            },
        }
    }

    fn set_int(&mut self, value: i64, range_checked: bool, format: NumberFormat, name: &str) -> bool {
        match self {
            CVarValue::Int {
                current, min, max, ..
            } => {
                if range_checked {
                    if value < *min {
                        report_error!("Value {} below minimum ({}) for '{}'.", value, min, name);
                        return false;
                    }
                    if value > *max {
                        report_error!("Value {} above maximum ({}) for '{}'.", value, max, name);
                        return false;
                    }
                }
                *current = value;
                true
            }
            CVarValue::Bool { current, .. } => {
                // Range never checked for booleans.
                *current = value > 0;
                true
            }
            CVarValue::Float {
                current, min, max, ..
            } => {
                let value = value as f64;
                if range_checked {
                    if value < *min {
                        report_error!("Value {} below minimum ({}) for '{}'.", value, min, name);
                        return false;
                    }
                    if value > *max {
                        report_error!("Value {} above maximum ({}) for '{}'.", value, max, name);
                        return false;
                    }
                }
                *current = value;
                true
            }
            CVarValue::Enum {
                current, constants, ..
            } => {
                if range_checked
                    && !constants.is_empty()
                    && Self::enum_name_for(constants, value).is_none()
                {
                    report_error!("Value {} is not a constant of enum CVar '{}'.", value, name);
                    return false;
                }
                *current = value;
                true
            }
            CVarValue::String { current, allowed, .. } => {
                let text = int_to_string(value, format);
                if range_checked {
                    if let Some(list) = allowed {
                        if !list.iter().any(|s| s == &text) {
                            report_error!(
                                "Value \"{}\" is not in the allowed list for '{}'.",
                                text,
                                name
                            );
                            return false;
                        }
                    }
                }
                *current = text;
                true
            }
        }
    }

    fn set_float(&mut self, value: f64, range_checked: bool, name: &str) -> bool {
        match self {
            CVarValue::Int {
                current, min, max, ..
            } => {
                if range_checked {
                    if value < *min as f64 {
                        report_error!("Value {} below minimum ({}) for '{}'.", value, min, name);
                        return false;
                    }
                    if value > *max as f64 {
                        report_error!("Value {} above maximum ({}) for '{}'.", value, max, name);
                        return false;
                    }
                }
                *current = value as i64;
                true
            }
            CVarValue::Bool { current, .. } => {
                *current = value > 0.0;
                true
            }
            CVarValue::Float {
                current, min, max, ..
            } => {
                if range_checked {
                    if value < *min {
                        report_error!("Value {} below minimum ({}) for '{}'.", value, min, name);
                        return false;
                    }
                    if value > *max {
                        report_error!("Value {} above maximum ({}) for '{}'.", value, max, name);
                        return false;
                    }
                }
                *current = value;
                true
            }
            // Enums can only be integers, so reuse the int path.
            CVarValue::Enum { .. } => {
                self.set_int(value as i64, range_checked, NumberFormat::Decimal, name)
            }
            CVarValue::String { current, allowed, .. } => {
                let text = float_to_string(value);
                if range_checked {
                    if let Some(list) = allowed {
                        if !list.iter().any(|s| s == &text) {
                            report_error!(
                                "Value \"{}\" is not in the allowed list for '{}'.",
                                text,
                                name
                            );
                            return false;
                        }
                    }
                }
                *current = text;
                true
            }
        }
    }

    fn set_string(
        &mut self,
        value: &str,
        range_checked: bool,
        format: NumberFormat,
        name: &str,
    ) -> bool {
        match self {
            CVarValue::Int { .. } => match parse_int(value).or_else(|| {
                parse_bool_string(value).map(i64::from)
            }) {
                Some(number) => self.set_int(number, range_checked, format, name),
                None => {
                    report_error!("Can't set number CVar '{}' from string \"{}\".", name, value);
                    false
                }
            },
            CVarValue::Bool { current, .. } => match parse_bool_string(value) {
                Some(flag) => {
                    *current = flag;
                    true
                }
                None => {
                    report_error!("Can't set boolean CVar '{}' from string \"{}\".", name, value);
                    false
                }
            },
            CVarValue::Float { .. } => match parse_float(value).or_else(|| {
                parse_bool_string(value).map(|b| f64::from(u8::from(b)))
            }) {
                Some(number) => self.set_float(number, range_checked, name),
                None => {
                    report_error!("Can't set number CVar '{}' from string \"{}\".", name, value);
                    false
                }
            },
            CVarValue::Enum { constants, .. } => {
                let by_name = constants
                    .iter()
                    .find(|c| c.name.as_ref() == value)
                    .map(|c| c.value);
                match by_name.or_else(|| parse_int(value)) {
                    Some(number) => self.set_int(number, range_checked, format, name),
                    None => {
                        report_error!(
                            "\"{}\" is not a constant of enum CVar '{}'.",
                            value,
                            name
                        );
                        false
                    }
                }
            }
            CVarValue::String { current, allowed, .. } => {
                if range_checked {
                    if let Some(list) = allowed {
                        if !list.iter().any(|s| s == value) {
                            report_error!(
                                "Value \"{}\" is not in the allowed list for '{}'.",
                                value,
                                name
                            );
                            return false;
                        }
                    }
                }
                *current = value.to_string();
                true
            }
        }
    }

    fn reset_to_default(&mut self) {
        match self {
            CVarValue::Int { current, default, .. } => *current = *default,
            CVarValue::Bool { current, default } => *current = *default,
            CVarValue::Float { current, default, .. } => *current = *default,
            CVarValue::String { current, default, .. } => *current = default.clone(),
            CVarValue::Enum { current, default, .. } => *current = *default,
        }
    }

    fn allowed_strings(&self, format: NumberFormat) -> Vec<String> {
        match self {
            CVarValue::Int { min, max, .. } => {
                vec![int_to_string(*min, format), int_to_string(*max, format)]
            }
            CVarValue::Bool { .. } => vec![bool_to_string(false), bool_to_string(true)],
            CVarValue::Float { min, max, .. } => {
                vec![float_to_string(*min), float_to_string(*max)]
            }
            CVarValue::String { allowed, .. } => allowed.clone().unwrap_or_default(),
            CVarValue::Enum { constants, .. } => {
                constants.iter().map(|c| c.name.to_string()).collect()
            }
        }
    }
}

/// A configuration variable.
///
/// Construct with one of the typed constructors and the builder methods,
/// then hand ownership to a [`CVarManager`](crate::core::cvar_manager::CVarManager).
///
/// # Examples
///
/// ```
/// use cvar_console::core::cvar::{CVar, CVarFlags};
///
/// let mut fov = CVar::int("r_fov", 90, 60, 120)
///     .description("Camera field of view")
///     .flags(CVarFlags::RANGE_CHECK | CVarFlags::PERSISTENT);
///
/// assert!(fov.set_int_value(100));
/// assert!(!fov.set_int_value(500)); // out of range
/// assert_eq!(fov.get_int_value(), 100);
/// assert!(fov.is_modified());
/// ```
pub struct CVar {
    name: Box<str>,
    description: Box<str>,
    flags: CVarFlags,
    number_format: NumberFormat,
    value: CVarValue,
    completion: Option<ValueCompletionFn>,
}

impl CVar {
    fn new(name: impl Into<Box<str>>, value: CVarValue) -> Self {
        let name = name.into();
        debug_assert!(!name.is_empty(), "CVar name must not be empty");
        Self {
            name,
            description: "".into(),
            flags: CVarFlags::NONE,
            number_format: NumberFormat::Decimal,
            value,
            completion: None,
        }
    }

    /// Integer CVar with an inclusive `[min, max]` range. The range is only
    /// enforced when the `RANGE_CHECK` flag is set.
    pub fn int(name: impl Into<Box<str>>, value: i64, min: i64, max: i64) -> Self {
        Self::new(
            name,
            CVarValue::Int {
                current: value,
                default: value,
                min,
                max,
            },
        )
    }

    /// Boolean CVar.
    pub fn bool(name: impl Into<Box<str>>, value: bool) -> Self {
        Self::new(
            name,
            CVarValue::Bool {
                current: value,
                default: value,
            },
        )
    }

    /// Float CVar with an inclusive `[min, max]` range.
    pub fn float(name: impl Into<Box<str>>, value: f64, min: f64, max: f64) -> Self {
        Self::new(
            name,
            CVarValue::Float {
                current: value,
                default: value,
                min,
                max,
            },
        )
    }

    /// String CVar. Use [`CVar::allowed_values`] to constrain it.
    pub fn string(name: impl Into<Box<str>>, value: impl Into<String>) -> Self {
        let value = value.into();
        Self::new(
            name,
            CVarValue::String {
                current: value.clone(),
                default: value,
                allowed: None,
            },
        )
    }

    /// Enum CVar over `(name, value)` constant pairs.
    pub fn enumeration(
        name: impl Into<Box<str>>,
        value: i64,
        constants: &[(&str, i64)],
    ) -> Self {
        Self::new(
            name,
            CVarValue::Enum {
                current: value,
                default: value,
                constants: constants
                    .iter()
                    .map(|(n, v)| EnumConst {
                        name: (*n).into(),
                        value: *v,
                    })
                    .collect(),
            },
        )
    }

    /// Set the description.
    pub fn description(mut self, description: impl Into<Box<str>>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the flags. Warns when `PERSISTENT` and `VOLATILE` are combined.
    pub fn flags(mut self, flags: CVarFlags) -> Self {
        if flags.contains(CVarFlags::PERSISTENT | CVarFlags::VOLATILE) {
            report_warning!(
                "{}: 'Persistent' and 'Volatile' flags are mutually exclusive!",
                self.name
            );
        }
        self.flags = flags;
        self
    }

    /// Set the initial number formatting.
    pub fn number_format(mut self, format: NumberFormat) -> Self {
        self.number_format = format;
        self
    }

    /// Constrain a string CVar to a unique, ordered list of allowed values.
    /// Implies nothing by itself; enforcement needs `RANGE_CHECK`.
    pub fn allowed_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let CVarValue::String { allowed, .. } = &mut self.value {
            let mut list: Vec<String> = Vec::new();
            for value in values {
                let value = value.into();
                if !list.contains(&value) {
                    list.push(value);
                }
            }
            *allowed = (!list.is_empty()).then_some(list);
        } else {
            report_warning!("'{}': allowed values only apply to string CVars.", self.name);
        }
        self
    }

    /// Attach a value-completion callback.
    pub fn value_completion<F>(mut self, callback: F) -> Self
    where
        F: Fn(&str) -> Vec<String> + Send + Sync + 'static,
    {
        self.completion = Some(Box::new(callback));
        self
    }

    // ========================================================
    // Accessors:
    // ========================================================

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn get_description(&self) -> &str {
        &self.description
    }

    #[inline]
    pub fn var_type(&self) -> CVarType {
        self.value.var_type()
    }

    /// Printable type name: `int`, `bool`, `float`, `string` or `enum`.
    pub fn type_str(&self) -> &'static str {
        match self.var_type() {
            CVarType::Int => "int",
            CVarType::Bool => "bool",
            CVarType::Float => "float",
            CVarType::String => "string",
            CVarType::Enum => "enum",
        }
    }

    #[inline]
    pub fn get_flags(&self) -> CVarFlags {
        self.flags
    }

    #[inline]
    pub fn set_flags(&mut self, flags: CVarFlags) {
        self.flags = flags;
    }

    #[inline]
    pub fn get_number_format(&self) -> NumberFormat {
        self.number_format
    }

    #[inline]
    pub fn set_number_format(&mut self, format: NumberFormat) {
        self.number_format = format;
    }

    #[inline]
    pub fn set_modified(&mut self) {
        self.flags |= CVarFlags::MODIFIED;
    }

    #[inline]
    pub fn clear_modified(&mut self) {
        self.flags = self.flags.difference(CVarFlags::MODIFIED);
    }

    #[inline]
    pub fn is_modified(&self) -> bool {
        self.flags.contains(CVarFlags::MODIFIED)
    }

    #[inline]
    pub fn is_writable(&self) -> bool {
        !self
            .flags
            .intersects(CVarFlags::READ_ONLY | CVarFlags::INIT_ONLY)
    }

    #[inline]
    pub fn is_persistent(&self) -> bool {
        self.flags.contains(CVarFlags::PERSISTENT)
    }

    #[inline]
    pub fn is_range_checked(&self) -> bool {
        self.flags.contains(CVarFlags::RANGE_CHECK)
    }

    /// Flags as a short display string, e.g. `"M P C"`, or `"0"` when none.
    pub fn flags_string(&self) -> String {
        let mut text = String::new();
        let pairs = [
            (CVarFlags::MODIFIED, "M "),
            (CVarFlags::PERSISTENT, "P "),
            (CVarFlags::VOLATILE, "V "),
            (CVarFlags::READ_ONLY, "R "),
            (CVarFlags::INIT_ONLY, "I "),
            (CVarFlags::RANGE_CHECK, "C "),
            (CVarFlags::USER_DEFINED, "U "),
        ];
        for (flag, label) in pairs {
            if self.flags.contains(flag) {
                text.push_str(label);
            }
        }
        if text.is_empty() {
            "0".to_string()
        } else {
            text.trim_end().to_string()
        }
    }

    // ========================================================
    // Value access:
    // ========================================================

    pub fn get_int_value(&self) -> i64 {
        self.value.get_int(&self.name)
    }

    pub fn get_bool_value(&self) -> bool {
        self.value.get_int(&self.name) != 0
    }

    pub fn get_float_value(&self) -> f64 {
        self.value.get_float(&self.name)
    }

    pub fn get_string_value(&self) -> String {
        self.value.get_string(self.number_format)
    }

    fn check_writable(&self) -> bool {
        if self.is_writable() {
            true
        } else {
            report_error!("CVar '{}' is read-only!", self.name);
            false
        }
    }

    pub fn set_int_value(&mut self, value: i64) -> bool {
        if !self.check_writable() {
            return false;
        }
        if self
            .value
            .set_int(value, self.is_range_checked(), self.number_format, &self.name)
        {
            self.set_modified();
            true
        } else {
            false
        }
    }

    pub fn set_bool_value(&mut self, value: bool) -> bool {
        self.set_int_value(i64::from(value))
    }

    pub fn set_float_value(&mut self, value: f64) -> bool {
        if !self.check_writable() {
            return false;
        }
        if self.value.set_float(value, self.is_range_checked(), &self.name) {
            self.set_modified();
            true
        } else {
            false
        }
    }

    pub fn set_string_value(&mut self, value: &str) -> bool {
        if !self.check_writable() {
            return false;
        }
        if self
            .value
            .set_string(value, self.is_range_checked(), self.number_format, &self.name)
        {
            self.set_modified();
            true
        } else {
            false
        }
    }

    /// Reset to the default value and mark as modified. Read-only and
    /// init-only CVars cannot be reset, not even to defaults.
    pub fn set_default_value(&mut self) -> bool {
        if !self.check_writable() {
            return false;
        }
        self.value.reset_to_default();
        self.set_modified();
        true
    }

    /// Set from string regardless of `READ_ONLY`/`INIT_ONLY` when the
    /// matching permission is granted. Does **not** set the modified flag.
    /// This is the config-reload and startup-command-line path.
    pub(crate) fn set_string_value_override(
        &mut self,
        value: &str,
        allow_read_only: bool,
        allow_init_only: bool,
    ) -> bool {
        if self.flags.contains(CVarFlags::READ_ONLY) && !allow_read_only {
            return report_not_writable(&self.name);
        }
        if self.flags.contains(CVarFlags::INIT_ONLY) && !allow_init_only {
            return report_not_writable(&self.name);
        }
        self.value
            .set_string(value, self.is_range_checked(), self.number_format, &self.name)
    }

    /// Override-window variant of [`CVar::set_default_value`]. Does not set
    /// the modified flag.
    pub(crate) fn set_default_override(
        &mut self,
        allow_read_only: bool,
        allow_init_only: bool,
    ) -> bool {
        if self.flags.contains(CVarFlags::READ_ONLY) && !allow_read_only {
            return report_not_writable(&self.name);
        }
        if self.flags.contains(CVarFlags::INIT_ONLY) && !allow_init_only {
            return report_not_writable(&self.name);
        }
        self.value.reset_to_default();
        true
    }

    /// Default reset value rendered for display.
    pub fn default_value_string(&self) -> String {
        self.value.default_string(self.number_format)
    }

    /// The allowed values rendered for display: `[min, max]` for numbers,
    /// the allowed list for strings, the constant names for enums.
    pub fn allowed_value_strings(&self) -> Vec<String> {
        self.value.allowed_strings(self.number_format)
    }

    pub fn allowed_value_count(&self) -> usize {
        match &self.value {
            CVarValue::Int { .. } | CVarValue::Bool { .. } | CVarValue::Float { .. } => 2,
            CVarValue::String { allowed, .. } => allowed.as_ref().map_or(0, Vec::len),
            CVarValue::Enum { constants, .. } => constants.len(),
        }
    }

    /// Value suggestions for the given partial input: forwards to the
    /// completion callback when one is set, else the allowed values.
    pub fn completion_values(&self, partial: &str) -> Vec<String> {
        match &self.completion {
            Some(callback) => callback(partial),
            None => self.allowed_value_strings(),
        }
    }

    pub fn has_value_completion(&self) -> bool {
        self.completion.is_some()
    }

    /// Format the `set` command line that recreates this CVar's value in a
    /// config file. Flags are included only for user-defined CVars; string
    /// and enum values are quoted.
    pub fn to_cfg_string(&self) -> String {
        let mut flag_text = String::new();
        if self.flags.contains(CVarFlags::USER_DEFINED) {
            let pairs = [
                (CVarFlags::PERSISTENT, "-persistent "),
                (CVarFlags::VOLATILE, "-volatile "),
                (CVarFlags::READ_ONLY, "-readonly "),
                (CVarFlags::INIT_ONLY, "-initonly "),
                (CVarFlags::MODIFIED, "-modified "),
            ];
            for (flag, label) in pairs {
                if self.flags.contains(flag) {
                    flag_text.push_str(label);
                }
            }
        }

        let value = self.get_string_value();
        let quoted = matches!(self.var_type(), CVarType::String | CVarType::Enum);

        match (quoted, flag_text.is_empty()) {
            (true, true) => format!("set {} \"{}\"", self.name, value),
            (true, false) => format!("set {} \"{}\" {}", self.name, value, flag_text.trim_end()),
            (false, true) => format!("set {} {}", self.name, value),
            (false, false) => format!("set {} {} {}", self.name, value, flag_text.trim_end()),
        }
    }
}

fn report_not_writable(name: &str) -> bool {
    report_error!("CVar '{}' is read-only!", name);
    false
}

impl Keyed for CVar {
    fn key(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for CVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CVar")
            .field("name", &self.name)
            .field("type", &self.var_type())
            .field("value", &self.get_string_value())
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for CVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" = \"{}\"", self.name, self.get_string_value())?;
        if !self.description.is_empty() {
            write!(f, " - {}", self.description)?;
        }
        Ok(())
    }
}
