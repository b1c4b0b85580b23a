// Core business logic module

pub mod config;
pub mod logger;
pub mod severity;
pub mod system_monitor;

// Re-export commonly used items
pub use config::{MonitorConfig, SourceChoice};
pub use logger::{FileLogger, LogRecord};
pub use severity::{boundary_for, classify, severity_to_name, translate_level, Severity, SeverityBand};
