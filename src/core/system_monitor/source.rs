//! Metric sources: where a sampler gets its usage percentages from.

use parking_lot::Mutex;
use std::sync::Arc;

use super::metrics::{Reading, ResourceKind};
use crate::error::{MonitorError, Result};
use crate::platform::CpuTicks;

/// Yields one reading per call for a concrete resource.
///
/// Implementations are shared by every sampler thread of a manager, so any
/// running statistic they keep must be internally synchronised.
pub trait MetricSource: Send + Sync {
    fn read(&self, kind: ResourceKind) -> Result<Reading>;
}

impl<T: MetricSource + ?Sized> MetricSource for Arc<T> {
    fn read(&self, kind: ResourceKind) -> Result<Reading> {
        (**self).read(kind)
    }
}

/// Previous CPU tick totals, kept for the lifetime of the process.
///
/// Load is computed from the delta between two consecutive samples, so the
/// tracker must outlive monitoring sessions: construct one per process and
/// hand it to every source.
#[derive(Debug, Default)]
pub struct CpuLoadTracker {
    previous: Mutex<CpuTicks>,
}

impl CpuLoadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `current` and return the load since the previous sample,
    /// rounded to two decimals. The very first sample measures since boot.
    pub fn update(&self, current: CpuTicks) -> Result<f64> {
        let mut previous = self.previous.lock();

        let delta_idle = current.idle as i128 - previous.idle as i128;
        let delta_total = current.total as i128 - previous.total as i128;
        *previous = current;

        if delta_total <= 0 {
            return Err(MonitorError::metric_read(
                "CPU Load calculation error: deltaTotal <= 0",
            ));
        }

        let load = 100.0 * (delta_total - delta_idle) as f64 / delta_total as f64;
        Ok((load * 100.0).round() / 100.0)
    }

    pub fn previous(&self) -> CpuTicks {
        *self.previous.lock()
    }

    pub fn reset(&self) {
        *self.previous.lock() = CpuTicks::default();
    }
}

pub(crate) fn not_a_single_resource(kind: ResourceKind) -> MonitorError {
    MonitorError::metric_read(format!("'{}' is not a single resource", kind))
}

/// Reads the kernel counters directly: `/proc/stat`, `/proc/meminfo` and
/// `statvfs("/")`.
#[cfg(target_os = "linux")]
pub struct ProcMetricSource {
    cpu: Arc<CpuLoadTracker>,
}

#[cfg(target_os = "linux")]
impl ProcMetricSource {
    pub fn new(cpu: Arc<CpuLoadTracker>) -> Self {
        Self { cpu }
    }
}

#[cfg(target_os = "linux")]
impl MetricSource for ProcMetricSource {
    fn read(&self, kind: ResourceKind) -> Result<Reading> {
        use crate::platform;

        match kind {
            ResourceKind::Cpu => {
                let ticks = platform::read_cpu_ticks()?;
                Ok(Reading::cpu(self.cpu.update(ticks)?))
            }
            ResourceKind::Memory => {
                let info = platform::read_meminfo()?;
                Ok(Reading::memory_from_kb(info.total_kb, info.available_kb))
            }
            ResourceKind::Disk => {
                let fs = platform::root_fs_usage()?;
                Ok(Reading::disk_from_bytes(fs.total_bytes, fs.free_bytes))
            }
            ResourceKind::All => Err(not_a_single_resource(kind)),
        }
    }
}

/// Source used by the binary: procfs on Linux, sysinfo elsewhere.
#[cfg(target_os = "linux")]
pub fn default_source(cpu: Arc<CpuLoadTracker>) -> Arc<dyn MetricSource> {
    Arc::new(ProcMetricSource::new(cpu))
}

#[cfg(not(target_os = "linux"))]
pub fn default_source(_cpu: Arc<CpuLoadTracker>) -> Arc<dyn MetricSource> {
    Arc::new(super::collector::SysinfoMetricSource::new())
}
