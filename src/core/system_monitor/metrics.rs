use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::MonitorError;

const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;
const KB_PER_GB: f64 = 1024.0 * 1024.0;

/// Resource a session monitors. `All` means one sampler per concrete kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Cpu,
    Memory,
    Disk,
    All,
}

impl ResourceKind {
    pub const CONCRETE: [ResourceKind; 3] =
        [ResourceKind::Cpu, ResourceKind::Memory, ResourceKind::Disk];

    /// Concrete kinds covered by this mode, `All` expanded.
    pub fn expand(self) -> &'static [ResourceKind] {
        match self {
            ResourceKind::Cpu => &[ResourceKind::Cpu],
            ResourceKind::Memory => &[ResourceKind::Memory],
            ResourceKind::Disk => &[ResourceKind::Disk],
            ResourceKind::All => &Self::CONCRETE,
        }
    }

    pub fn is_concrete(self) -> bool {
        self != ResourceKind::All
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Cpu => "cpu",
            ResourceKind::Memory => "memory",
            ResourceKind::Disk => "disk",
            ResourceKind::All => "all",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cpu" => Ok(ResourceKind::Cpu),
            "memory" => Ok(ResourceKind::Memory),
            "disk" => Ok(ResourceKind::Disk),
            "all" => Ok(ResourceKind::All),
            _ => Err(MonitorError::invalid_mode(s.trim())),
        }
    }
}

/// One sample of a concrete resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub kind: ResourceKind,
    pub percent: f64,
    pub used_gb: Option<f64>,
    pub total_gb: Option<f64>,
}

impl Reading {
    pub fn cpu(percent: f64) -> Self {
        Self {
            kind: ResourceKind::Cpu,
            percent,
            used_gb: None,
            total_gb: None,
        }
    }

    /// Memory usage from `/proc/meminfo` style kB counts.
    pub fn memory_from_kb(total_kb: u64, available_kb: u64) -> Self {
        let total_gb = total_kb as f64 / KB_PER_GB;
        let used_gb = total_kb.saturating_sub(available_kb) as f64 / KB_PER_GB;
        Self::capacity(ResourceKind::Memory, used_gb, total_gb)
    }

    pub fn memory_from_bytes(total: u64, available: u64) -> Self {
        let total_gb = total as f64 / BYTES_PER_GB;
        let used_gb = total.saturating_sub(available) as f64 / BYTES_PER_GB;
        Self::capacity(ResourceKind::Memory, used_gb, total_gb)
    }

    pub fn disk_from_bytes(total: u64, free: u64) -> Self {
        let total_gb = total as f64 / BYTES_PER_GB;
        let used_gb = total.saturating_sub(free) as f64 / BYTES_PER_GB;
        Self::capacity(ResourceKind::Disk, used_gb, total_gb)
    }

    fn capacity(kind: ResourceKind, used_gb: f64, total_gb: f64) -> Self {
        let percent = if total_gb > 0.0 {
            used_gb / total_gb * 100.0
        } else {
            0.0
        };
        Self {
            kind,
            percent,
            used_gb: Some(used_gb),
            total_gb: Some(total_gb),
        }
    }

    /// Human-readable line used for both the log and the highlighted output.
    pub fn message(&self) -> String {
        let used = self.used_gb.unwrap_or_default();
        let total = self.total_gb.unwrap_or_default();
        match self.kind {
            ResourceKind::Cpu | ResourceKind::All => {
                format!("Average CPU Load: {:.2}%", self.percent)
            }
            ResourceKind::Memory => format!(
                "Memory Usage: {:.2} GB used of {:.2} GB total ({:.2}%)",
                used, total, self.percent
            ),
            ResourceKind::Disk => format!(
                "Disk usage for root filesystem: Total space = {:.2} GB, Used = {:.2} GB ({:.2}%)",
                total, used, self.percent
            ),
        }
    }
}
