// Integration tests for the sampler lifecycle owned by MonitorManager

use super::common::{read_lines, wait_until, FixedSource, ScriptedSource};
use resmon::core::logger::FileLogger;
use resmon::core::severity::Severity;
use resmon::core::system_monitor::{
    MonitorManager, ResourceKind, SessionState, StartOutcome, StopOutcome,
};
use resmon::MonitorError;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tempfile::TempDir;

const FAST: Duration = Duration::from_millis(20);
const PATIENCE: Duration = Duration::from_secs(5);

fn setup(source: Arc<FixedSource>) -> (TempDir, PathBuf, MonitorManager) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("monitor.log");
    let logger = Arc::new(FileLogger::open(&path, Severity::Info).unwrap());
    let manager = MonitorManager::new(source, logger).with_interval(FAST);
    (dir, path, manager)
}

#[test]
fn test_start_then_stop_cpu() {
    let source = Arc::new(FixedSource::new(12.5));
    let (_dir, path, manager) = setup(source.clone());

    let outcome = manager.start("cpu", Severity::Info).unwrap();
    assert_eq!(
        outcome,
        StartOutcome::Started {
            mode: ResourceKind::Cpu,
            samplers: 1
        }
    );
    assert_eq!(manager.state(), SessionState::Running);

    assert!(wait_until(PATIENCE, || source.reads() >= 3));

    let started = Instant::now();
    assert_eq!(manager.stop(), StopOutcome::Stopped { joined: 1 });
    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(manager.state(), SessionState::Idle);
    assert_eq!(manager.active_samplers(), 0);

    let lines = read_lines(&path);
    assert!(lines.len() >= 3);
    assert!(lines
        .iter()
        .all(|l| l.ends_with("[INFO] Average CPU Load: 12.50%")));
}

#[test]
fn test_no_ticks_after_stop() {
    let source = Arc::new(FixedSource::new(40.0));
    let (_dir, _path, manager) = setup(source.clone());

    manager.start("all", Severity::Info).unwrap();
    assert!(wait_until(PATIENCE, || source.reads() >= 3));
    manager.stop();

    let reads = source.reads();
    thread::sleep(FAST * 5);
    assert_eq!(source.reads(), reads);
}

#[test]
fn test_stop_latency_not_bound_by_interval() {
    let source = Arc::new(FixedSource::new(40.0));
    let dir = TempDir::new().unwrap();
    let logger = Arc::new(FileLogger::open(dir.path().join("slow.log"), Severity::Info).unwrap());
    let manager =
        MonitorManager::new(source.clone(), logger).with_interval(Duration::from_secs(30));

    manager.start("memory", Severity::Info).unwrap();
    assert!(wait_until(PATIENCE, || source.reads() >= 1));

    let started = Instant::now();
    manager.stop();
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[test]
fn test_restart_after_stop_produces_output() {
    let source = Arc::new(FixedSource::new(65.0));
    let (_dir, path, manager) = setup(source.clone());

    manager.start("disk", Severity::Warning).unwrap();
    assert!(wait_until(PATIENCE, || source.reads() >= 1));
    manager.stop();
    let first = read_lines(&path).len();

    manager.start("disk", Severity::Warning).unwrap();
    assert!(wait_until(PATIENCE, || read_lines(&path).len() > first));
    manager.stop();

    let lines = read_lines(&path);
    assert!(lines.iter().all(|l| l.contains("[WARNING] Disk usage for root filesystem")));
}

#[test]
fn test_stop_from_another_thread() {
    let source = Arc::new(FixedSource::new(90.0));
    let (_dir, _path, manager) = setup(source.clone());
    let manager = Arc::new(manager);

    manager.start("all", Severity::Error).unwrap();

    let remote = manager.clone();
    let outcome = thread::spawn(move || remote.stop()).join().unwrap();

    assert_eq!(outcome, StopOutcome::Stopped { joined: 3 });
    assert_eq!(manager.state(), SessionState::Idle);
    assert_eq!(manager.stop(), StopOutcome::NotRunning);
}

#[test]
fn test_concurrent_stops_join_once() {
    let source = Arc::new(FixedSource::new(10.0));
    let (_dir, _path, manager) = setup(source);
    let manager = Arc::new(manager);

    manager.start("all", Severity::Info).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let manager = manager.clone();
            thread::spawn(move || manager.stop())
        })
        .collect();
    let outcomes: Vec<StopOutcome> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let stopped = outcomes
        .iter()
        .filter(|o| matches!(o, StopOutcome::Stopped { joined: 3 }))
        .count();
    assert_eq!(stopped, 1);
    assert_eq!(manager.active_samplers(), 0);
}

#[test]
fn test_invalid_mode_is_rejected() {
    let source = Arc::new(FixedSource::new(10.0));
    let (_dir, path, manager) = setup(source.clone());

    let err = manager.start("network", Severity::Info).unwrap_err();
    assert!(matches!(err, MonitorError::InvalidMode(_)));
    assert!(err.is_usage());
    assert_eq!(manager.state(), SessionState::Idle);
    assert_eq!(source.reads(), 0);
    assert!(read_lines(&path).is_empty());
}

#[test]
fn test_read_failures_are_logged_and_loop_continues() {
    let source = Arc::new(ScriptedSource::new(vec![
        Err(MonitorError::metric_read("Failed to read CPU statistics")),
        Ok(30.0),
        Err(MonitorError::metric_read("Failed to read CPU statistics")),
        Ok(85.0),
    ]));
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("failures.log");
    let logger = Arc::new(FileLogger::open(&path, Severity::Info).unwrap());
    let manager = MonitorManager::new(source, logger).with_interval(FAST);

    manager.start("cpu", Severity::Info).unwrap();
    assert!(wait_until(PATIENCE, || read_lines(&path).len() >= 4));
    manager.stop();

    let lines = read_lines(&path);
    assert!(lines[0].ends_with("[ERROR] Failed to read CPU statistics"));
    assert!(lines[1].ends_with("[INFO] Average CPU Load: 30.00%"));
    assert!(lines[2].ends_with("[ERROR] Failed to read CPU statistics"));
    assert!(lines[3].ends_with("[ERROR] Average CPU Load: 85.00%"));
}

#[test]
fn test_drop_stops_session() {
    let source = Arc::new(FixedSource::new(10.0));
    let (_dir, _path, manager) = setup(source.clone());

    manager.start("all", Severity::Info).unwrap();
    assert!(wait_until(PATIENCE, || source.reads() >= 3));
    drop(manager);

    let reads = source.reads();
    thread::sleep(FAST * 5);
    assert_eq!(source.reads(), reads);
}
