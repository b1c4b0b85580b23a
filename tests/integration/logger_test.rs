// Integration tests for the level-filtered log file

use super::common::read_lines;
use resmon::core::logger::FileLogger;
use resmon::core::severity::Severity;
use resmon::MonitorError;
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

fn line_parts(line: &str) -> (&str, &str, &str) {
    // [YYYY-MM-DD HH:MM:SS][LEVEL] text
    let (stamp, rest) = line[1..].split_once("][").unwrap();
    let (level, text) = rest.split_once("] ").unwrap();
    (stamp, level, text)
}

#[test]
fn test_line_format() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("format.log");
    let logger = FileLogger::open(&path, Severity::Info).unwrap();

    logger.write("Average CPU Load: 3.00%", Severity::Info);
    logger.shutdown();

    let lines = read_lines(&path);
    assert_eq!(lines.len(), 1);
    let (stamp, level, text) = line_parts(&lines[0]);
    assert!(
        chrono::NaiveDateTime::parse_from_str(stamp, "%Y-%m-%d %H:%M:%S").is_ok(),
        "bad timestamp {:?}",
        stamp
    );
    assert_eq!(level, "INFO");
    assert_eq!(text, "Average CPU Load: 3.00%");
}

#[test]
fn test_filtering_by_minimum() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("filter.log");
    let logger = FileLogger::open(&path, Severity::Warning).unwrap();

    logger.write("info", Severity::Info);
    logger.write("warning", Severity::Warning);
    logger.write("error", Severity::Error);
    logger.write("unknown", Severity::Unknown);
    logger.shutdown();

    let levels: Vec<String> = read_lines(&path)
        .iter()
        .map(|l| line_parts(l).1.to_string())
        .collect();
    assert_eq!(levels, vec!["WARNING", "ERROR"]);
}

#[test]
fn test_filtering_holds_for_every_pair() {
    let dir = TempDir::new().unwrap();

    for minimum in Severity::ALL {
        let path = dir.path().join(format!("pairs-{}.log", minimum));
        let logger = FileLogger::open(&path, minimum).unwrap();

        for severity in Severity::ALL {
            logger.write(severity.name(), severity);
        }
        logger.shutdown();

        let written: Vec<String> = read_lines(&path)
            .iter()
            .map(|l| line_parts(l).1.to_string())
            .collect();
        let expected: Vec<String> = Severity::ALL
            .iter()
            .filter(|&&s| s >= minimum)
            .map(|s| s.name().to_string())
            .collect();
        assert_eq!(written, expected, "minimum {}", minimum);
    }
}

#[test]
fn test_multiline_text_stays_one_record() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("multiline.log");
    let logger = FileLogger::open(&path, Severity::Info).unwrap();

    logger.write("first half\nsecond half", Severity::Error);
    logger.write("  leading spaces", Severity::Error);
    logger.shutdown();

    let lines = read_lines(&path);
    assert_eq!(lines.len(), 2);
    assert_eq!(line_parts(&lines[0]).2, "first half second half");
    assert_eq!(line_parts(&lines[1]).2, "  leading spaces");
}

#[test]
fn test_below_minimum_leaves_file_empty() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.log");
    let logger = FileLogger::open(&path, Severity::Warning).unwrap();

    logger.write("Memory Usage: 1.00 GB used of 8.00 GB total (12.50%)", Severity::Info);
    logger.shutdown();

    assert!(path.exists());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
}

#[test]
fn test_change_minimum_at_runtime() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("change.log");
    let logger = FileLogger::open(&path, Severity::Error).unwrap();

    logger.write("dropped", Severity::Warning);
    logger.set_minimum_severity(Severity::Unknown);
    assert_eq!(logger.minimum_severity(), Severity::Unknown);
    logger.write("kept", Severity::Info);
    logger.write("also kept", Severity::Unknown);
    logger.shutdown();

    let texts: Vec<String> = read_lines(&path)
        .iter()
        .map(|l| line_parts(l).2.to_string())
        .collect();
    assert_eq!(texts, vec!["kept", "also kept"]);
}

#[test]
fn test_appends_to_existing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("append.log");
    std::fs::write(&path, "previous run\n").unwrap();

    let logger = FileLogger::open(&path, Severity::Info).unwrap();
    logger.write("this run", Severity::Info);
    logger.shutdown();

    let lines = read_lines(&path);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "previous run");
}

#[test]
fn test_concurrent_writers_never_interleave() {
    const THREADS: usize = 8;
    const LINES: usize = 250;

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("concurrent.log");
    let logger = Arc::new(FileLogger::open(&path, Severity::Info).unwrap());
    let padding = "x".repeat(200);

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let logger = logger.clone();
            let padding = padding.clone();
            thread::spawn(move || {
                for i in 0..LINES {
                    logger.write(&format!("writer {} line {} {}", t, i, padding), Severity::Warning);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    logger.shutdown();

    let lines = read_lines(&path);
    assert_eq!(lines.len(), THREADS * LINES);

    let mut seen = HashSet::new();
    for line in &lines {
        let (_, level, text) = line_parts(line);
        assert_eq!(level, "WARNING");
        assert!(text.ends_with(&padding), "truncated line: {:?}", line);
        assert!(seen.insert(text.to_string()), "duplicate line: {:?}", line);
    }
}

#[test]
fn test_writes_after_shutdown_are_dropped() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("closed.log");
    let logger = FileLogger::open(&path, Severity::Info).unwrap();

    logger.write("before", Severity::Info);
    logger.shutdown();
    logger.shutdown();
    logger.write("after", Severity::Error);

    assert!(logger.is_closed());
    assert_eq!(read_lines(&path).len(), 1);
}

#[test]
fn test_missing_directory_fails_without_artifact() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("no-such-dir").join("monitor.log");

    let err = FileLogger::open(&path, Severity::Info).unwrap_err();
    assert!(matches!(err, MonitorError::LogFileOpen { .. }));
    assert!(err.to_string().starts_with("Unable to open log file: "));
    assert!(!path.exists());
    assert!(!path.parent().unwrap().exists());
}

#[cfg(unix)]
#[test]
fn test_read_only_directory_fails_without_artifact() {
    use std::fs::{self, OpenOptions};
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let locked = dir.path().join("locked");
    fs::create_dir(&locked).unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();

    // Permission bits do not bind a privileged user
    let probe = locked.join("probe");
    if OpenOptions::new().create(true).write(true).open(&probe).is_ok() {
        let _ = fs::remove_file(&probe);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let path = locked.join("monitor.log");
    let result = FileLogger::open(&path, Severity::Info);

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
    assert!(matches!(result, Err(MonitorError::LogFileOpen { .. })));
    assert!(!path.exists());
}
