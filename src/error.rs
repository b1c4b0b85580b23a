use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Custom error type for the resource monitor
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Unable to open log file: {}", path.display())]
    LogFileOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid mode '{0}'. Use 'all', 'cpu', 'memory', or 'disk'.")]
    InvalidMode(String),

    #[error("Invalid log level '{0}'. Use 'info', 'warning', or 'error'.")]
    InvalidLevel(String),

    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("Metric read failed: {0}")]
    MetricRead(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for the resource monitor
pub type Result<T> = std::result::Result<T, MonitorError>;

impl MonitorError {
    /// Create a log file open error
    pub fn log_file_open<P: Into<PathBuf>>(path: P, source: io::Error) -> Self {
        MonitorError::LogFileOpen {
            path: path.into(),
            source,
        }
    }

    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        MonitorError::Config(msg.into())
    }

    pub fn invalid_mode<S: Into<String>>(mode: S) -> Self {
        MonitorError::InvalidMode(mode.into())
    }

    pub fn invalid_level<S: Into<String>>(level: S) -> Self {
        MonitorError::InvalidLevel(level.into())
    }

    pub fn invalid_command<S: Into<String>>(msg: S) -> Self {
        MonitorError::InvalidCommand(msg.into())
    }

    pub fn metric_read<S: Into<String>>(msg: S) -> Self {
        MonitorError::MetricRead(msg.into())
    }

    /// Operator mistakes at the control boundary. These abort one command
    /// and never tear down running samplers.
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            MonitorError::InvalidMode(_)
                | MonitorError::InvalidLevel(_)
                | MonitorError::InvalidCommand(_)
        )
    }
}
