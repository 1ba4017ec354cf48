//! Tokenized command arguments.
//!
//! A command string is split into a name plus up to [`MAX_COMMAND_ARGUMENTS`]
//! argument tokens. Token bytes live in a fixed arena inside the
//! [`CommandArgs`] value, so the whole structure is self-contained and the
//! argument slices borrow from it.

use crate::core::strings::is_whitespace;
use crate::error::report_error;

/// Maximum number of argument strings for a single command.
pub const MAX_COMMAND_ARGUMENTS: usize = 64;

/// Maximum total length in bytes of all tokens of one command, counting a
/// separator byte per token.
pub const MAX_COMMAND_ARG_STR_LENGTH: usize = 2048;

/// Parsed command arguments backed by a fixed character arena.
///
/// The first token parsed is the command name, kept separate from the
/// argument list.
///
/// # Syntax
///
/// - Whitespace separates arguments.
/// - A pair of double quotes captures bytes verbatim, whitespace included.
/// - Single quotes behave the same and may also appear inside a
///   double-quoted block; only a matching single quote closes them.
/// - Outer quotes are stripped from the stored token.
/// - An unclosed quote at the end of input is reported but the tokens parsed
///   so far are still delivered.
///
/// # Examples
///
/// ```
/// use cvar_console::core::args::CommandArgs;
///
/// let args = CommandArgs::new("bind F1 \"toggle sv_cheats\"");
/// assert_eq!(args.command_name(), "bind");
/// assert_eq!(args.arg_count(), 2);
/// assert_eq!(args.get(0), Some("F1"));
/// assert_eq!(args.get(1), Some("toggle sv_cheats"));
/// ```
pub struct CommandArgs {
    arena: [u8; MAX_COMMAND_ARG_STR_LENGTH],
    arena_used: usize,
    command_name: (u16, u16),
    tokens: [(u16, u16); MAX_COMMAND_ARGUMENTS],
    arg_count: usize,
}

impl CommandArgs {
    /// Parse a whole command string, name first.
    pub fn new(command_str: &str) -> Self {
        let mut args = Self {
            arena: [0; MAX_COMMAND_ARG_STR_LENGTH],
            arena_used: 0,
            command_name: (0, 0),
            tokens: [(0, 0); MAX_COMMAND_ARGUMENTS],
            arg_count: 0,
        };
        args.tokenize(command_str);
        args
    }

    /// Build from pre-split Unix-style arguments; the first entry is the
    /// command/program name.
    pub fn from_argv(argv: &[&str]) -> Self {
        let mut args = Self {
            arena: [0; MAX_COMMAND_ARG_STR_LENGTH],
            arena_used: 0,
            command_name: (0, 0),
            tokens: [(0, 0); MAX_COMMAND_ARGUMENTS],
            arg_count: 0,
        };
        let mut first = true;
        for argument in argv {
            let Some(span) = args.append_token(argument.as_bytes()) else {
                break;
            };
            if first {
                args.command_name = span;
                first = false;
            } else if !args.push_arg(span) {
                break;
            }
        }
        args
    }

    /// The command name, or an empty string when nothing was parsed.
    pub fn command_name(&self) -> &str {
        self.token_str(self.command_name)
    }

    /// Number of argument strings parsed, NOT counting the command name.
    #[inline]
    pub fn arg_count(&self) -> usize {
        self.arg_count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.arg_count == 0
    }

    /// Get an argument by index.
    pub fn get(&self, index: usize) -> Option<&str> {
        (index < self.arg_count).then(|| self.token_str(self.tokens[index]))
    }

    /// Get an argument or a default.
    pub fn get_or<'a>(&'a self, index: usize, default: &'a str) -> &'a str {
        self.get(index).unwrap_or(default)
    }

    /// Compare an argument against `text`. Out-of-range indexes compare
    /// unequal.
    pub fn arg_is(&self, index: usize, text: &str) -> bool {
        self.get(index) == Some(text)
    }

    /// Try to parse an argument as a specific type.
    pub fn parse<T: std::str::FromStr>(&self, index: usize) -> Option<T> {
        self.get(index).and_then(|s| s.parse().ok())
    }

    /// Iterate over the argument strings.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        (0..self.arg_count).map(|i| self.token_str(self.tokens[i]))
    }

    fn token_str(&self, (offset, len): (u16, u16)) -> &str {
        let bytes = &self.arena[offset as usize..(offset + len) as usize];
        std::str::from_utf8(bytes).unwrap_or("")
    }

    fn tokenize(&mut self, command_str: &str) {
        let bytes = command_str.as_bytes();

        let mut quote_count = 0u32;
        let mut quoted = false;
        let mut single_quote = false;
        let mut first_token = true;
        let mut token_start: Option<usize> = None;
        let mut done = false;

        let mut i = 0;
        while i < bytes.len() && !done {
            match bytes[i] {
                // Quotes keep whitespace-separated text together as one
                // argument.
                b'"' => {
                    if !single_quote {
                        quote_count += 1;
                        quoted = quote_count & 1 != 0;
                    }
                    token_start.get_or_insert(i);
                }
                // Single quotes may open an argument or appear inside a
                // double-quoted block.
                b'\'' => {
                    if !quoted {
                        quote_count += 1;
                        quoted = quote_count & 1 != 0;
                        single_quote = true;
                    } else if single_quote {
                        quote_count += 1;
                        quoted = quote_count & 1 != 0;
                        single_quote = false;
                    }
                    token_start.get_or_insert(i);
                }
                c if is_whitespace(c) => {
                    if !quoted {
                        if let Some(start) = token_start.take() {
                            if !self.finish_token(&bytes[start..i], &mut first_token) {
                                done = true;
                            }
                        }
                    }
                }
                _ => {
                    token_start.get_or_insert(i);
                }
            }
            i += 1;
        }

        // End reached with an open quote? The tokens parsed so far are still
        // delivered; failing is up to the command handler.
        if quoted {
            report_error!("Command string ended with an open quotation block!");
        }

        if let Some(start) = token_start {
            if !done {
                self.finish_token(&bytes[start..], &mut first_token);
            }
        }
    }

    fn finish_token(&mut self, token: &[u8], first_token: &mut bool) -> bool {
        let Some(span) = self.append_token(token) else {
            return false;
        };
        if *first_token {
            self.command_name = span;
            *first_token = false;
            true
        } else {
            self.push_arg(span)
        }
    }

    fn push_arg(&mut self, span: (u16, u16)) -> bool {
        if self.arg_count == MAX_COMMAND_ARGUMENTS {
            report_error!("Too many arguments! Ignoring extraneous ones...");
            return false;
        }
        self.tokens[self.arg_count] = span;
        self.arg_count += 1;
        true
    }

    fn append_token(&mut self, token: &[u8]) -> Option<(u16, u16)> {
        // Strip the enclosing quotes, if any.
        let token = match token.first() {
            Some(&q @ (b'"' | b'\'')) => {
                let inner = &token[1..];
                match inner.last() {
                    Some(&last) if last == q => &inner[..inner.len() - 1],
                    _ => inner,
                }
            }
            _ => token,
        };

        // Each token accounts for a trailing separator byte.
        if self.arena_used + token.len() + 1 > MAX_COMMAND_ARG_STR_LENGTH {
            report_error!(
                "Command argument string too long! Max is {} characters.",
                MAX_COMMAND_ARG_STR_LENGTH - 1
            );
            return None;
        }

        let offset = self.arena_used;
        self.arena[offset..offset + token.len()].copy_from_slice(token);
        self.arena_used += token.len() + 1;

        Some((offset as u16, token.len() as u16))
    }
}

impl std::fmt::Debug for CommandArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandArgs")
            .field("command_name", &self.command_name())
            .field("args", &self.iter().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_command() {
        let args = CommandArgs::new("echo hello world");
        assert_eq!(args.command_name(), "echo");
        assert_eq!(args.arg_count(), 2);
        assert_eq!(args.get(0), Some("hello"));
        assert_eq!(args.get(1), Some("world"));
        assert_eq!(args.get(2), None);
    }

    #[test]
    fn test_no_args() {
        let args = CommandArgs::new("quit");
        assert_eq!(args.command_name(), "quit");
        assert!(args.is_empty());
    }

    #[test]
    fn test_surrounding_whitespace() {
        let args = CommandArgs::new("   echo \t hello   ");
        assert_eq!(args.command_name(), "echo");
        assert_eq!(args.get(0), Some("hello"));
        assert_eq!(args.arg_count(), 1);
    }

    #[test]
    fn test_double_quotes_keep_whitespace() {
        let args = CommandArgs::new("say \"hello world\"");
        assert_eq!(args.command_name(), "say");
        assert_eq!(args.arg_count(), 1);
        assert_eq!(args.get(0), Some("hello world"));
    }

    #[test]
    fn test_single_quotes() {
        let args = CommandArgs::new("say 'hello world'");
        assert_eq!(args.get(0), Some("hello world"));
    }

    #[test]
    fn test_single_quotes_inside_double_quotes() {
        let args = CommandArgs::new("say \"it's alive\"");
        assert_eq!(args.arg_count(), 1);
        assert_eq!(args.get(0), Some("it's alive"));
    }

    #[test]
    fn test_separator_kept_inside_quotes() {
        let args = CommandArgs::new("echo \"a; b\"");
        assert_eq!(args.get(0), Some("a; b"));
    }

    #[test]
    fn test_unclosed_quote_still_delivers() {
        let args = CommandArgs::new("echo \"unterminated text");
        assert_eq!(args.command_name(), "echo");
        assert_eq!(args.arg_count(), 1);
        assert_eq!(args.get(0), Some("unterminated text"));
    }

    #[test]
    fn test_too_many_arguments_truncated() {
        let mut text = String::from("cmd");
        for i in 0..(MAX_COMMAND_ARGUMENTS + 8) {
            text.push_str(&format!(" a{i}"));
        }
        let args = CommandArgs::new(&text);
        assert_eq!(args.arg_count(), MAX_COMMAND_ARGUMENTS);
        assert_eq!(args.get(0), Some("a0"));
    }

    #[test]
    fn test_arena_overflow_reports_and_stops() {
        let long = "x".repeat(MAX_COMMAND_ARG_STR_LENGTH);
        let args = CommandArgs::new(&format!("cmd {long}"));
        assert_eq!(args.command_name(), "cmd");
        assert_eq!(args.arg_count(), 0);
    }

    #[test]
    fn test_from_argv() {
        let args = CommandArgs::from_argv(&["prog", "one", "two"]);
        assert_eq!(args.command_name(), "prog");
        assert_eq!(args.arg_count(), 2);
        assert_eq!(args.get(1), Some("two"));
    }

    #[test]
    fn test_arg_is_and_parse() {
        let args = CommandArgs::new("set count 42");
        assert!(args.arg_is(0, "count"));
        assert!(!args.arg_is(5, "count"));
        assert_eq!(args.parse::<i32>(1), Some(42));
        assert_eq!(args.parse::<i32>(0), None);
    }

    #[test]
    fn test_iter_collects_all() {
        let args = CommandArgs::new("cmd a b c");
        let collected: Vec<_> = args.iter().collect();
        assert_eq!(collected, ["a", "b", "c"]);
    }
}
