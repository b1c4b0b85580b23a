//! Secondary "highlighted" output: plain text, one reading per line.

use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// File name used when the configuration does not override it.
pub const DEFAULT_HIGHLIGHT_FILE: &str = "output_app.txt";

/// Receives readings that fall inside the session's selected band.
pub trait HighlightSink: Send + Sync {
    fn record(&self, line: &str);
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHighlightSink;

impl HighlightSink for NullHighlightSink {
    fn record(&self, _line: &str) {}
}

/// Appends lines to a file opened on first use.
///
/// Failures never reach the sampler; the next record retries the open.
#[derive(Debug)]
pub struct FileHighlightSink {
    path: PathBuf,
    file: Mutex<Option<File>>,
}

impl FileHighlightSink {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            file: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HighlightSink for FileHighlightSink {
    fn record(&self, line: &str) {
        let mut guard = self.file.lock();

        if guard.is_none() {
            match OpenOptions::new().create(true).append(true).open(&self.path) {
                Ok(file) => *guard = Some(file),
                Err(e) => {
                    log::warn!("Cannot open highlight file {:?}: {}", self.path, e);
                    return;
                }
            }
        }

        if let Some(file) = guard.as_mut() {
            let mut buf = String::with_capacity(line.len() + 1);
            buf.push_str(line);
            buf.push('\n');
            if let Err(e) = file.write_all(buf.as_bytes()) {
                log::warn!("Failed to write highlight file {:?}: {}", self.path, e);
                *guard = None;
            }
        }
    }
}
