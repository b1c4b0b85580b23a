//! Lifecycle owner for a set of running samplers.
//!
//! A manager runs at most one session at a time:
//!
//! ```text
//! Idle --start--> Running --stop--> Stopping --(all joined)--> Idle
//! ```
//!
//! `start` while running and `stop` while idle are reported no-ops. Dropping
//! the manager stops the session, so no sampler thread outlives it.

use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::highlight::{HighlightSink, NullHighlightSink};
use super::metrics::ResourceKind;
use super::sampler::{Sampler, SAMPLE_INTERVAL};
use super::source::MetricSource;
use super::task::{self, TaskHandle};
use crate::core::logger::FileLogger;
use crate::core::severity::Severity;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Running,
    Stopping,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::Idle => "idle",
            SessionState::Running => "running",
            SessionState::Stopping => "stopping",
        };
        f.write_str(s)
    }
}

/// Snapshot of the manager's current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionInfo {
    pub state: SessionState,
    pub mode: Option<ResourceKind>,
    pub level: Option<Severity>,
    pub samplers: usize,
}

impl SessionInfo {
    const IDLE: SessionInfo = SessionInfo {
        state: SessionState::Idle,
        mode: None,
        level: None,
        samplers: 0,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started {
        mode: ResourceKind,
        samplers: usize,
    },
    AlreadyRunning {
        mode: ResourceKind,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    Stopped { joined: usize },
    NotRunning,
}

struct Session {
    mode: ResourceKind,
    tasks: Vec<TaskHandle>,
}

impl Session {
    /// Samplers only return once cancelled, so a session whose threads have
    /// all finished without a stop lost them to panics.
    fn is_dead(&self) -> bool {
        self.tasks.iter().all(TaskHandle::is_finished)
    }
}

pub struct MonitorManager {
    source: Arc<dyn MetricSource>,
    logger: Arc<FileLogger>,
    highlight: Arc<dyn HighlightSink>,
    interval: Duration,
    /// Held for the whole of `start` and `stop`, which serialises them.
    session: Mutex<Option<Session>>,
    /// Readable while a stop is joining.
    info: Mutex<SessionInfo>,
}

impl MonitorManager {
    pub fn new(source: Arc<dyn MetricSource>, logger: Arc<FileLogger>) -> Self {
        Self {
            source,
            logger,
            highlight: Arc::new(NullHighlightSink),
            interval: SAMPLE_INTERVAL,
            session: Mutex::new(None),
            info: Mutex::new(SessionInfo::IDLE),
        }
    }

    pub fn with_highlight(mut self, highlight: Arc<dyn HighlightSink>) -> Self {
        self.highlight = highlight;
        self
    }

    /// Override the 2 second tick interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn logger(&self) -> &Arc<FileLogger> {
        &self.logger
    }

    pub fn info(&self) -> SessionInfo {
        *self.info.lock()
    }

    pub fn state(&self) -> SessionState {
        self.info.lock().state
    }

    pub fn is_running(&self) -> bool {
        self.state() == SessionState::Running
    }

    pub fn mode(&self) -> Option<ResourceKind> {
        self.info.lock().mode
    }

    /// Level whose band the running samplers highlight.
    pub fn session_level(&self) -> Option<Severity> {
        self.info.lock().level
    }

    /// Sampler threads of the current session that have not exited yet.
    pub fn active_samplers(&self) -> usize {
        self.session
            .lock()
            .as_ref()
            .map_or(0, |s| s.tasks.iter().filter(|t| !t.is_finished()).count())
    }

    /// Start a session from an operator mode token (`cpu`, `memory`,
    /// `disk` or `all`).
    ///
    /// An unrecognised mode is a usage error whether or not a session is
    /// running, and never touches the running session.
    pub fn start(&self, mode: &str, level: Severity) -> Result<StartOutcome> {
        let kind: ResourceKind = mode.parse().map_err(|e| {
            log::error!("Refusing to start monitoring: {}", e);
            e
        })?;

        self.start_kind(kind, level)
    }

    pub fn start_kind(&self, kind: ResourceKind, level: Severity) -> Result<StartOutcome> {
        let mut session = self.session.lock();

        if let Some(active) = session.take() {
            if !active.is_dead() {
                let mode = active.mode;
                *session = Some(active);
                log::warn!("Monitoring already running ({})", mode);
                return Ok(StartOutcome::AlreadyRunning { mode });
            }

            log::warn!(
                "Every {} sampler has exited; clearing the dead session",
                active.mode
            );
            self.wind_down(active);
        }

        self.launch(&mut session, kind, level)
    }

    fn launch(
        &self,
        session: &mut Option<Session>,
        mode: ResourceKind,
        level: Severity,
    ) -> Result<StartOutcome> {
        let mut tasks = Vec::with_capacity(mode.expand().len());

        for &kind in mode.expand() {
            let sampler = Sampler::new(
                kind,
                level,
                self.source.clone(),
                self.logger.clone(),
                self.highlight.clone(),
            )
            .with_interval(self.interval);

            match task::spawn(format!("resmon-{}", kind), move |token| sampler.run(&token)) {
                Ok(handle) => tasks.push(handle),
                Err(e) => {
                    log::error!("Failed to spawn {} sampler: {}", kind, e);
                    // Handles already spawned are cancelled and joined on drop
                    drop(tasks);
                    return Err(e.into());
                }
            }
        }

        let samplers = tasks.len();
        *session = Some(Session { mode, tasks });
        *self.info.lock() = SessionInfo {
            state: SessionState::Running,
            mode: Some(mode),
            level: Some(level),
            samplers,
        };

        log::info!("Monitoring started: {} ({} samplers, level {})", mode, samplers, level);
        Ok(StartOutcome::Started { mode, samplers })
    }

    /// Signal every sampler, wait for all of them to exit, and return to
    /// idle. Callable from any thread.
    pub fn stop(&self) -> StopOutcome {
        let mut session = self.session.lock();

        let Some(active) = session.take() else {
            log::info!("No monitoring processes to stop");
            return StopOutcome::NotRunning;
        };

        let joined = self.wind_down(active);
        StopOutcome::Stopped { joined }
    }

    /// Cancel and join every sampler of `active`. Caller holds `session`.
    fn wind_down(&self, active: Session) -> usize {
        self.info.lock().state = SessionState::Stopping;
        log::info!("Stopping {} monitoring", active.mode);

        for handle in &active.tasks {
            handle.cancel();
        }

        let mut joined = 0;
        for handle in active.tasks {
            let name = handle.name().to_string();
            if handle.join().is_err() {
                log::error!("Sampler '{}' panicked", name);
            }
            joined += 1;
        }

        *self.info.lock() = SessionInfo::IDLE;
        log::info!("Monitoring stopped ({} samplers joined)", joined);
        joined
    }
}

impl Drop for MonitorManager {
    fn drop(&mut self) {
        self.stop();
    }
}
