//! Crossterm-backed [`Terminal`] for Unix-style consoles.
//!
//! Raw mode is enabled for the lifetime of the [`TtyTerminal`]; a background
//! thread decodes crossterm key events into logical [`Key`]s and hands them
//! to the main thread over a channel. The main thread owns stdout.

use std::io::{self, IsTerminal, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, Clear, ClearType};
use crossterm::{cursor, execute};

use crate::error::report_error;
use crate::terminal::{Key, Terminal};

/// Interactive raw-mode terminal over stdin/stdout.
///
/// Construction fails soft: when the standard streams are not TTYs the
/// instance reports `is_tty() == false` and never produces input, so a host
/// can fall back to batch behavior.
pub struct TtyTerminal {
    receiver: Option<Receiver<Key>>,
    reader: Option<JoinHandle<()>>,
    quit: Arc<AtomicBool>,
    pending: Option<Key>,
    is_tty: bool,
    raw_mode: bool,
    clipboard: String,
}

impl TtyTerminal {
    pub fn new() -> Self {
        if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
            report_error!("STDIN/STDOUT is not a TTY! Interactive terminal refuses to run.");
            return Self::detached();
        }
        if enable_raw_mode().is_err() {
            report_error!("Failed to set new terminal settings!");
            return Self::detached();
        }

        let quit = Arc::new(AtomicBool::new(false));
        let (sender, receiver) = mpsc::channel();
        let reader = spawn_key_reader(sender, Arc::clone(&quit));

        Self {
            receiver: Some(receiver),
            reader: Some(reader),
            quit,
            pending: None,
            is_tty: true,
            raw_mode: true,
            clipboard: String::new(),
        }
    }

    fn detached() -> Self {
        Self {
            receiver: None,
            reader: None,
            quit: Arc::new(AtomicBool::new(true)),
            pending: None,
            is_tty: false,
            raw_mode: false,
            clipboard: String::new(),
        }
    }
}

impl Default for TtyTerminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TtyTerminal {
    fn drop(&mut self) {
        self.quit.store(true, Ordering::Relaxed);
        if let Some(reader) = self.reader.take() {
            let _ = reader.join();
        }
        if self.raw_mode {
            // Restore the original attributes, otherwise the shell may be
            // left without echo after the application exits.
            let _ = disable_raw_mode();
        }
    }
}

fn spawn_key_reader(sender: Sender<Key>, quit: Arc<AtomicBool>) -> JoinHandle<()> {
    std::thread::spawn(move || {
        while !quit.load(Ordering::Relaxed) {
            match crossterm::event::poll(Duration::from_millis(100)) {
                Ok(true) => {
                    if let Ok(Event::Key(event)) = crossterm::event::read() {
                        if let Some(key) = translate_key(event) {
                            if sender.send(key).is_err() {
                                break;
                            }
                        }
                    }
                }
                Ok(false) => {}
                Err(_) => break,
            }
        }
    })
}

fn translate_key(event: KeyEvent) -> Option<Key> {
    if !matches!(event.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
        return None;
    }
    let key = match event.code {
        KeyCode::Enter => Key::Return,
        KeyCode::Tab => Key::Tab,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Delete => Key::Delete,
        KeyCode::Up => Key::UpArrow,
        KeyCode::Down => Key::DownArrow,
        KeyCode::Left => Key::LeftArrow,
        KeyCode::Right => Key::RightArrow,
        KeyCode::Esc => Key::Escape,
        KeyCode::Char(chr) if event.modifiers.contains(KeyModifiers::CONTROL) => {
            Key::Control(chr.to_ascii_lowercase())
        }
        KeyCode::Char(chr) => Key::Char(chr),
        _ => return None,
    };
    Some(key)
}

impl Terminal for TtyTerminal {
    fn print(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let mut stdout = io::stdout();
        if self.raw_mode {
            // Raw mode disables output post-processing, so newlines need an
            // explicit carriage return.
            let _ = stdout.write_all(text.replace('\n', "\r\n").as_bytes());
        } else {
            let _ = stdout.write_all(text.as_bytes());
        }
        let _ = stdout.flush();
    }

    fn clear_screen(&mut self) {
        let mut stdout = io::stdout();
        let _ = execute!(stdout, Clear(ClearType::All), cursor::MoveTo(0, 0));
    }

    fn is_tty(&self) -> bool {
        self.is_tty
    }

    fn has_input(&mut self) -> bool {
        if self.pending.is_some() {
            return true;
        }
        let Some(receiver) = &self.receiver else {
            return false;
        };
        match receiver.try_recv() {
            Ok(key) => {
                self.pending = Some(key);
                true
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => false,
        }
    }

    fn get_input(&mut self) -> Option<Key> {
        if let Some(key) = self.pending.take() {
            return Some(key);
        }
        self.receiver.as_ref()?.try_recv().ok()
    }

    fn set_clipboard(&mut self, text: &str) {
        // Application-local clipboard; not shared with the host system.
        self.clipboard = text.to_string();
    }

    fn get_clipboard(&mut self) -> Option<String> {
        (!self.clipboard.is_empty()).then(|| self.clipboard.clone())
    }
}
