// Integration tests for startup configuration

use resmon::core::config::{MonitorConfig, SourceChoice};
use resmon::core::logger::FileLogger;
use resmon::core::system_monitor::{CpuLoadTracker, ResourceKind};
use resmon::{MonitorError, Severity};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

#[test]
fn test_config_default() {
    let config = MonitorConfig::default();
    assert!(config.log_file.is_none());
    assert!(config.level.is_none());
    assert!(config.mode.is_none());
    assert_eq!(config.interval_ms, 2_000);
}

#[test]
fn test_missing_values_fail_validation() {
    assert!(matches!(
        MonitorConfig::default().validate(),
        Err(MonitorError::Config(_))
    ));

    let config = MonitorConfig {
        log_file: Some(PathBuf::from("monitor.log")),
        ..Default::default()
    };
    assert!(matches!(config.validate(), Err(MonitorError::Config(_))));
}

#[test]
fn test_unknown_startup_level_is_rejected_before_logger() {
    let dir = TempDir::new().unwrap();
    let log_file = dir.path().join("never.log");
    let config = MonitorConfig {
        log_file: Some(log_file.clone()),
        level: Some("chatty".to_string()),
        ..Default::default()
    };

    let err = config.validate().unwrap_err();
    assert!(matches!(err, MonitorError::InvalidLevel(_)));
    assert!(!log_file.exists());
}

#[test]
fn test_directory_as_log_file_is_rejected() {
    let dir = TempDir::new().unwrap();
    let config = MonitorConfig {
        log_file: Some(dir.path().to_path_buf()),
        level: Some("info".to_string()),
        ..Default::default()
    };
    assert!(matches!(config.validate(), Err(MonitorError::Config(_))));
}

#[test]
fn test_zero_interval_is_rejected() {
    let config = MonitorConfig {
        log_file: Some(PathBuf::from("monitor.log")),
        level: Some("info".to_string()),
        interval_ms: 0,
        ..Default::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_load_file_and_open_logger() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("config.json");
    let log_file = dir.path().join("monitor.log");

    fs::write(
        &config_path,
        serde_json::json!({
            "log_file": log_file,
            "level": "Warning",
            "mode": "all",
            "highlight_file": null,
            "source": "sysinfo"
        })
        .to_string(),
    )
    .unwrap();

    let config = MonitorConfig::load_from(&config_path).unwrap();
    config.validate().unwrap();

    assert_eq!(config.startup_level(), Severity::Warning);
    assert_eq!(config.mode.as_deref(), Some("all"));
    assert_eq!(config.mode.as_deref().unwrap().parse::<ResourceKind>().unwrap(), ResourceKind::All);
    assert!(config.highlight_file.is_none());
    assert_eq!(config.source, SourceChoice::Sysinfo);

    let logger = FileLogger::open(config.log_file.as_ref().unwrap(), config.startup_level()).unwrap();
    assert_eq!(logger.minimum_severity(), Severity::Warning);
    assert!(log_file.exists());
}

#[test]
fn test_invalid_json_is_an_error() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("config.json");
    fs::write(&config_path, "{ not json").unwrap();

    assert!(MonitorConfig::load_from(&config_path).is_err());
}

#[test]
fn test_sysinfo_source_builds_everywhere() {
    let source = SourceChoice::Sysinfo.build(Arc::new(CpuLoadTracker::new()));
    assert!(source.is_ok());
}
