//! Resource sampling core.
//!
//! Metric sources produce readings, samplers turn them into log records on
//! their own threads, and the manager owns the samplers of one session.

mod collector;
pub mod highlight;
pub mod manager;
mod metrics;
pub mod sampler;
pub mod source;
pub mod task;

pub use collector::SysinfoMetricSource;
pub use highlight::{FileHighlightSink, HighlightSink, NullHighlightSink, DEFAULT_HIGHLIGHT_FILE};
pub use manager::{MonitorManager, SessionInfo, SessionState, StartOutcome, StopOutcome};
pub use metrics::{Reading, ResourceKind};
pub use sampler::{Sampler, SAMPLE_INTERVAL};
pub use source::{default_source, CpuLoadTracker, MetricSource};
pub use task::{spawn, CancelToken, TaskHandle};

#[cfg(target_os = "linux")]
pub use source::ProcMetricSource;
