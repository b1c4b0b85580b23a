// resmon Library - Public API

// Re-export error types
pub mod error;
pub use error::{MonitorError, Result};

// Module declarations
pub mod commands;
pub mod core;
pub mod platform;
pub mod ui;

// Re-export commonly used types
pub use core::config::MonitorConfig;
pub use core::logger::FileLogger;
pub use core::severity::Severity;
pub use core::system_monitor::MonitorManager;

// Initialize diagnostic logging; RUST_LOG overrides the default filter
pub fn init_logging() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();
}
