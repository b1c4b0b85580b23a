//! Thread-safe, level-filtered, append-only log file.
//!
//! # Examples
//!
//! ```no_run
//! use resmon::core::logger::FileLogger;
//! use resmon::core::severity::Severity;
//!
//! let logger = FileLogger::open("monitor.log", Severity::Info)?;
//! logger.write("Average CPU Load: 12.50%", Severity::Info);
//! logger.set_minimum_severity(Severity::Error);
//! logger.write("dropped", Severity::Warning);
//! logger.shutdown();
//! # Ok::<(), resmon::MonitorError>(())
//! ```

use chrono::{DateTime, Local};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::core::severity::{Severity, SeverityCell};
use crate::error::{MonitorError, Result};

/// Timestamp layout of every log line.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One log line, built at call time and discarded after it is written.
#[derive(Debug, Clone)]
pub struct LogRecord {
    timestamp: DateTime<Local>,
    severity: Severity,
    text: String,
}

impl LogRecord {
    pub fn new(severity: Severity, text: impl Into<String>) -> Self {
        Self::at(Local::now(), severity, text)
    }

    pub fn at(timestamp: DateTime<Local>, severity: Severity, text: impl Into<String>) -> Self {
        Self {
            timestamp,
            severity,
            text: text.into(),
        }
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// `[YYYY-MM-DD HH:MM:SS][LEVEL] message\n`
    ///
    /// CR and LF inside the message become spaces so a record is always one
    /// line.
    pub fn format_line(&self) -> String {
        let text: String = self
            .text
            .chars()
            .map(|c| if matches!(c, '\n' | '\r') { ' ' } else { c })
            .collect();

        format!(
            "[{}][{}] {}\n",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.severity.name(),
            text
        )
    }
}

/// Sink shared by every sampler thread.
///
/// The file is opened once in [`FileLogger::open`] and closed once, by
/// [`FileLogger::shutdown`] or on drop. Each record is rendered to a single
/// buffer and handed to the file under the lock, so lines never interleave.
#[derive(Debug)]
pub struct FileLogger {
    path: PathBuf,
    minimum: SeverityCell,
    file: Mutex<Option<File>>,
    failed_writes: AtomicU64,
}

impl FileLogger {
    /// Open `path` for appending. Fails if the path is empty, points into a
    /// missing directory, or is not writable.
    pub fn open<P: AsRef<Path>>(path: P, minimum: Severity) -> Result<Self> {
        let path = path.as_ref();

        if path.as_os_str().is_empty() {
            return Err(MonitorError::log_file_open(
                path,
                io::Error::new(io::ErrorKind::InvalidInput, "empty log file path"),
            ));
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| MonitorError::log_file_open(path, e))?;

        log::debug!("Opened log file {:?} (minimum {})", path, minimum);

        Ok(Self {
            path: path.to_path_buf(),
            minimum: SeverityCell::new(minimum),
            file: Mutex::new(Some(file)),
            failed_writes: AtomicU64::new(0),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `text` if `severity` is at or above the current minimum.
    ///
    /// Never fails: storage errors are counted and reported as diagnostics.
    /// Writes issued after [`FileLogger::shutdown`] are dropped.
    pub fn write(&self, text: &str, severity: Severity) {
        if severity < self.minimum.load() {
            return;
        }

        let line = LogRecord::new(severity, text).format_line();

        let mut guard = self.file.lock();
        let Some(file) = guard.as_mut() else {
            return;
        };

        if let Err(e) = file.write_all(line.as_bytes()) {
            self.failed_writes.fetch_add(1, Ordering::Relaxed);
            log::warn!("Failed to write to log file {:?}: {}", self.path, e);
        }
    }

    pub fn set_minimum_severity(&self, level: Severity) {
        self.minimum.store(level);
        log::info!("Log level changed to {}", level);
    }

    pub fn minimum_severity(&self) -> Severity {
        self.minimum.load()
    }

    /// Number of records the file refused since construction.
    pub fn failed_writes(&self) -> u64 {
        self.failed_writes.load(Ordering::Relaxed)
    }

    pub fn is_closed(&self) -> bool {
        self.file.lock().is_none()
    }

    /// Flush and close the file. Only the first call has an effect; writers
    /// blocked on the lock finish before the file is taken.
    pub fn shutdown(&self) {
        let Some(mut file) = self.file.lock().take() else {
            return;
        };

        if let Err(e) = file.flush().and_then(|_| file.sync_all()) {
            log::warn!("Failed to flush log file {:?}: {}", self.path, e);
        }
        log::debug!("Closed log file {:?}", self.path);
    }
}

impl Drop for FileLogger {
    fn drop(&mut self) {
        self.shutdown();
    }
}
