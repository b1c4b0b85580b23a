use parking_lot::Mutex;
use std::path::Path;

use sysinfo::{CpuRefreshKind, Disks, MemoryRefreshKind, RefreshKind, System};

use super::metrics::{Reading, ResourceKind};
use super::source::{not_a_single_resource, MetricSource};
use crate::error::{MonitorError, Result};

/// Portable source backed by `sysinfo`.
///
/// `System` keeps its own previous CPU counters, so a single instance must be
/// shared for the whole process, the same way [`super::CpuLoadTracker`] is.
pub struct SysinfoMetricSource {
    system: Mutex<System>,
    disks: Mutex<Disks>,
}

impl SysinfoMetricSource {
    pub fn new() -> Self {
        let refresh_kind = RefreshKind::nothing()
            .with_cpu(CpuRefreshKind::nothing().with_cpu_usage())
            .with_memory(MemoryRefreshKind::nothing().with_ram());

        Self {
            system: Mutex::new(System::new_with_specifics(refresh_kind)),
            disks: Mutex::new(Disks::new_with_refreshed_list()),
        }
    }

    fn read_cpu(&self) -> Reading {
        let mut system = self.system.lock();
        system.refresh_cpu_usage();
        let usage = f64::from(system.global_cpu_usage());
        Reading::cpu((usage * 100.0).round() / 100.0)
    }

    fn read_memory(&self) -> Result<Reading> {
        let mut system = self.system.lock();
        system.refresh_memory();

        let total = system.total_memory();
        if total == 0 {
            return Err(MonitorError::metric_read("Failed to parse memory info"));
        }
        Ok(Reading::memory_from_bytes(total, system.available_memory()))
    }

    fn read_disk(&self) -> Result<Reading> {
        let mut disks = self.disks.lock();
        disks.refresh(true);

        // Root filesystem, or the largest disk where there is no `/` mount
        let disk = disks
            .iter()
            .find(|disk| disk.mount_point() == Path::new("/"))
            .or_else(|| disks.iter().max_by_key(|disk| disk.total_space()))
            .ok_or_else(|| MonitorError::metric_read("Failed to get disk stats"))?;

        Ok(Reading::disk_from_bytes(
            disk.total_space(),
            disk.available_space(),
        ))
    }
}

impl MetricSource for SysinfoMetricSource {
    fn read(&self, kind: ResourceKind) -> Result<Reading> {
        match kind {
            ResourceKind::Cpu => Ok(self.read_cpu()),
            ResourceKind::Memory => self.read_memory(),
            ResourceKind::Disk => self.read_disk(),
            ResourceKind::All => Err(not_a_single_resource(kind)),
        }
    }
}

impl Default for SysinfoMetricSource {
    fn default() -> Self {
        Self::new()
    }
}
