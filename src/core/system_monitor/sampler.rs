//! Periodic sampling loop for one resource.

use std::sync::Arc;
use std::time::Duration;

use super::highlight::HighlightSink;
use super::metrics::ResourceKind;
use super::source::MetricSource;
use super::task::CancelToken;
use crate::core::logger::FileLogger;
use crate::core::severity::{boundary_for, classify, Severity};
use crate::error::MonitorError;

/// Interval between two ticks of a sampler.
pub const SAMPLE_INTERVAL: Duration = Duration::from_secs(2);

/// Reads one resource, classifies it and logs it, once per interval.
///
/// Holds no state between ticks; running statistics live in the source.
pub struct Sampler {
    kind: ResourceKind,
    session_level: Severity,
    interval: Duration,
    source: Arc<dyn MetricSource>,
    logger: Arc<FileLogger>,
    highlight: Arc<dyn HighlightSink>,
}

impl Sampler {
    pub fn new(
        kind: ResourceKind,
        session_level: Severity,
        source: Arc<dyn MetricSource>,
        logger: Arc<FileLogger>,
        highlight: Arc<dyn HighlightSink>,
    ) -> Self {
        Self {
            kind,
            session_level,
            interval: SAMPLE_INTERVAL,
            source,
            logger,
            highlight,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Take one sample. Read failures become an `ERROR` record.
    pub fn tick(&self) {
        let reading = match self.source.read(self.kind) {
            Ok(reading) => reading,
            Err(e) => {
                log::debug!("{} sampler read failed: {}", self.kind, e);
                self.logger.write(&failure_text(&e), Severity::Error);
                return;
            }
        };

        let message = reading.message();

        // Band follows the session level, not the reading's own tier
        if boundary_for(self.session_level).is_some_and(|band| band.contains(reading.percent)) {
            self.highlight.record(&message);
        }

        self.logger.write(&message, classify(reading.percent));
    }

    /// Tick until `token` is cancelled. The token is checked before every
    /// tick and again before every sleep.
    pub fn run(&self, token: &CancelToken) {
        log::info!("{} sampler started", self.kind);

        while !token.is_cancelled() {
            self.tick();

            if token.is_cancelled() || token.sleep(self.interval) {
                break;
            }
        }

        log::info!("{} sampler stopped", self.kind);
    }
}

fn failure_text(err: &MonitorError) -> String {
    match err {
        MonitorError::MetricRead(msg) => msg.clone(),
        other => other.to_string(),
    }
}
