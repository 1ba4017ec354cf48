//! Terminal abstraction consumed by the editor and command handlers.
//!
//! The core never talks to a platform console directly; it prints through
//! the [`Terminal`] trait and reads decoded [`Key`] events from it. The
//! crossterm-backed implementation lives in [`crate::tty`].

/// Logical key events delivered by a [`Terminal`].
///
/// Ordinary printable input arrives as [`Key::Char`]; control chords used by
/// the editor (`Ctrl+c/v/l/n/p`) arrive as [`Key::Control`] with the ASCII
/// letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Return,
    Tab,
    Backspace,
    Delete,
    UpArrow,
    DownArrow,
    LeftArrow,
    RightArrow,
    Escape,
    Control(char),
    Char(char),
}

impl Key {
    /// Display name used in messages such as the completion hint.
    pub fn name(self) -> String {
        match self {
            Key::Return => "Return".to_string(),
            Key::Tab => "Tab".to_string(),
            Key::Backspace => "Backspace".to_string(),
            Key::Delete => "Delete".to_string(),
            Key::UpArrow => "UpArrow".to_string(),
            Key::DownArrow => "DownArrow".to_string(),
            Key::LeftArrow => "LeftArrow".to_string(),
            Key::RightArrow => "RightArrow".to_string(),
            Key::Escape => "Escape".to_string(),
            Key::Control(c) => format!("Ctrl+{c}"),
            Key::Char(c) => c.to_string(),
        }
    }
}

/// Output sink, input source and clipboard pair for the interactive console.
///
/// Only `print` is mandatory; sinks without input, colors or a clipboard can
/// rely on the defaults.
pub trait Terminal {
    /// Print a string as-is.
    fn print(&mut self, text: &str);

    /// Print a string followed by a newline.
    fn print_line(&mut self, text: &str) {
        self.print(text);
        self.print("\n");
    }

    /// Emit an ANSI color code. Sinks that don't render colors can ignore it.
    fn set_color(&mut self, code: &str) {
        self.print(code);
    }

    /// Restore the default text color.
    fn restore_color(&mut self) {
        self.print(color::restore());
    }

    /// Clear the screen. The caller repaints the prompt afterwards.
    fn clear_screen(&mut self) {}

    /// Whether output goes to an interactive terminal.
    fn is_tty(&self) -> bool {
        false
    }

    /// Whether a key event is waiting. Never blocks.
    fn has_input(&mut self) -> bool {
        false
    }

    /// Pop the next key event, if any. Never blocks.
    fn get_input(&mut self) -> Option<Key> {
        None
    }

    fn set_clipboard(&mut self, _text: &str) {}

    fn get_clipboard(&mut self) -> Option<String> {
        None
    }
}

/// ANSI SGR color codes for terminal text.
///
/// Every query returns an empty string when color is disabled or the
/// standard streams are not TTYs, so callers can print the codes
/// unconditionally.
pub mod color {
    use std::io::IsTerminal;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::OnceLock;

    static ENABLED: AtomicBool = AtomicBool::new(true);
    static IS_TTY: OnceLock<bool> = OnceLock::new();

    /// Globally enable or disable color output.
    pub fn set_enabled(enabled: bool) {
        ENABLED.store(enabled, Ordering::Relaxed);
    }

    /// True when color codes will actually be emitted.
    pub fn can_color_print() -> bool {
        ENABLED.load(Ordering::Relaxed)
            && *IS_TTY
                .get_or_init(|| std::io::stdout().is_terminal() && std::io::stderr().is_terminal())
    }

    macro_rules! color_fn {
        ($name:ident, $code:literal) => {
            pub fn $name() -> &'static str {
                if can_color_print() {
                    $code
                } else {
                    ""
                }
            }
        };
    }

    color_fn!(restore, "\x1b[0;1m");
    color_fn!(red, "\x1b[31;1m");
    color_fn!(green, "\x1b[32;1m");
    color_fn!(yellow, "\x1b[33;1m");
    color_fn!(blue, "\x1b[34;1m");
    color_fn!(magenta, "\x1b[35;1m");
    color_fn!(cyan, "\x1b[36;1m");
    color_fn!(white, "\x1b[37;1m");
}

/// Capturing terminal used across the crate's unit tests: output accumulates
/// in a string and input comes from a scripted key queue.
#[cfg(test)]
pub(crate) struct BufferTerminal {
    pub output: String,
    pub keys: std::collections::VecDeque<Key>,
    pub clipboard: Option<String>,
    pub cleared: usize,
}

#[cfg(test)]
impl BufferTerminal {
    pub fn new() -> Self {
        Self {
            output: String::new(),
            keys: std::collections::VecDeque::new(),
            clipboard: None,
            cleared: 0,
        }
    }

    pub fn queue_keys(&mut self, keys: impl IntoIterator<Item = Key>) {
        self.keys.extend(keys);
    }

    pub fn queue_text(&mut self, text: &str) {
        self.keys.extend(text.chars().map(Key::Char));
    }
}

#[cfg(test)]
impl Terminal for BufferTerminal {
    fn print(&mut self, text: &str) {
        self.output.push_str(text);
    }

    fn clear_screen(&mut self) {
        self.cleared += 1;
    }

    fn has_input(&mut self) -> bool {
        !self.keys.is_empty()
    }

    fn get_input(&mut self) -> Option<Key> {
        self.keys.pop_front()
    }

    fn set_clipboard(&mut self, text: &str) {
        self.clipboard = Some(text.to_string());
    }

    fn get_clipboard(&mut self) -> Option<String> {
        self.clipboard.clone()
    }
}
