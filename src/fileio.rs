//! File access abstraction for config and history I/O.
//!
//! The engine reads and writes files only through the [`FileIo`] trait, so a
//! host can redirect config traffic to an archive, a virtual filesystem or a
//! network mount. [`StdFileIo`] is the std-backed default.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom, Write};

use crate::error::report_error;

/// Mode for [`FileIo::open`]. Files are treated as line-oriented text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileMode {
    Read,
    Write,
}

/// Opaque handle to an open file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHandle(pub usize);

/// Line-oriented file access.
pub trait FileIo {
    /// Open a file, reporting an error and returning `None` on failure.
    fn open(&mut self, path: &str, mode: FileMode) -> Option<FileHandle>;

    /// Close a handle. Unknown handles are ignored.
    fn close(&mut self, handle: FileHandle);

    /// True once the reader has consumed the whole file.
    fn eof(&mut self, handle: FileHandle) -> bool;

    /// Seek back to the beginning.
    fn rewind(&mut self, handle: FileHandle);

    /// Read the next line into `out` (cleared first), without the trailing
    /// newline. Returns `false` at end of file or on error.
    fn read_line(&mut self, handle: FileHandle, out: &mut String) -> bool;

    /// Write `text` followed by a newline.
    fn write_line(&mut self, handle: FileHandle, text: &str) -> bool;
}

enum StdFile {
    Reader { reader: BufReader<File>, eof: bool },
    Writer(File),
}

/// [`FileIo`] over `std::fs`.
pub struct StdFileIo {
    files: HashMap<usize, StdFile>,
    next_id: usize,
}

impl StdFileIo {
    pub fn new() -> Self {
        Self {
            files: HashMap::new(),
            next_id: 1,
        }
    }
}

impl Default for StdFileIo {
    fn default() -> Self {
        Self::new()
    }
}

impl FileIo for StdFileIo {
    fn open(&mut self, path: &str, mode: FileMode) -> Option<FileHandle> {
        if path.is_empty() {
            return None;
        }

        let result = match mode {
            FileMode::Read => File::open(path).map(|file| StdFile::Reader {
                reader: BufReader::new(file),
                eof: false,
            }),
            FileMode::Write => File::create(path).map(StdFile::Writer),
        };

        match result {
            Ok(file) => {
                let id = self.next_id;
                self.next_id += 1;
                self.files.insert(id, file);
                Some(FileHandle(id))
            }
            Err(error) => {
                report_error!("Unable to open file \"{}\": {}.", path, error);
                None
            }
        }
    }

    fn close(&mut self, handle: FileHandle) {
        self.files.remove(&handle.0);
    }

    fn eof(&mut self, handle: FileHandle) -> bool {
        match self.files.get(&handle.0) {
            Some(StdFile::Reader { eof, .. }) => *eof,
            _ => true,
        }
    }

    fn rewind(&mut self, handle: FileHandle) {
        if let Some(StdFile::Reader { reader, eof }) = self.files.get_mut(&handle.0) {
            if reader.seek(SeekFrom::Start(0)).is_ok() {
                *eof = false;
            }
        }
    }

    fn read_line(&mut self, handle: FileHandle, out: &mut String) -> bool {
        out.clear();
        let Some(StdFile::Reader { reader, eof }) = self.files.get_mut(&handle.0) else {
            return false;
        };
        if *eof {
            return false;
        }
        match reader.read_line(out) {
            Ok(0) => {
                *eof = true;
                false
            }
            Ok(_) => {
                while out.ends_with('\n') || out.ends_with('\r') {
                    out.pop();
                }
                true
            }
            Err(_) => {
                *eof = true;
                false
            }
        }
    }

    fn write_line(&mut self, handle: FileHandle, text: &str) -> bool {
        let Some(StdFile::Writer(file)) = self.files.get_mut(&handle.0) else {
            return false;
        };
        writeln!(file, "{text}").is_ok()
    }
}
