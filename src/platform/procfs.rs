// Raw kernel counters from /proc and statvfs

use crate::error::{MonitorError, Result};

pub const PROC_STAT: &str = "/proc/stat";
pub const PROC_MEMINFO: &str = "/proc/meminfo";

/// Aggregate CPU tick counts from the first `cpu` line of `/proc/stat`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuTicks {
    /// idle + iowait
    pub idle: u64,
    /// user + nice + system + idle + iowait + irq + softirq + steal
    pub total: u64,
}

/// `MemTotal` and `MemAvailable` in kB.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemInfo {
    pub total_kb: u64,
    pub available_kb: u64,
}

/// Root filesystem capacity in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FsUsage {
    pub total_bytes: u64,
    pub free_bytes: u64,
}

pub fn parse_cpu_ticks(stat: &str) -> Result<CpuTicks> {
    let line = stat
        .lines()
        .next()
        .filter(|line| line.starts_with("cpu"))
        .ok_or_else(|| MonitorError::metric_read("Failed to read CPU stats from /proc/stat"))?;

    let fields: Vec<u64> = line
        .split_whitespace()
        .skip(1)
        .take(8)
        .map(|field| field.parse::<u64>())
        .collect::<std::result::Result<_, _>>()
        .map_err(|e| MonitorError::metric_read(format!("Malformed /proc/stat cpu line: {}", e)))?;

    // Kernels before 2.6.11 report no steal column
    if fields.len() < 7 {
        return Err(MonitorError::metric_read(
            "Failed to read CPU stats from /proc/stat",
        ));
    }

    let field = |i: usize| fields.get(i).copied().unwrap_or(0);
    let (user, nice, system, idle, iowait, irq, softirq, steal) = (
        field(0),
        field(1),
        field(2),
        field(3),
        field(4),
        field(5),
        field(6),
        field(7),
    );

    let idle = idle + iowait;
    Ok(CpuTicks {
        idle,
        total: user + nice + system + idle + irq + softirq + steal,
    })
}

pub fn parse_meminfo(meminfo: &str) -> Result<MemInfo> {
    let mut info = MemInfo::default();

    for line in meminfo.lines() {
        let Some((key, rest)) = line.split_once(':') else {
            continue;
        };
        let Some(value) = rest
            .split_whitespace()
            .next()
            .and_then(|v| v.parse::<u64>().ok())
        else {
            continue;
        };

        match key {
            "MemTotal" => info.total_kb = value,
            "MemAvailable" => info.available_kb = value,
            _ => {}
        }

        if info.total_kb > 0 && info.available_kb > 0 {
            return Ok(info);
        }
    }

    Err(MonitorError::metric_read("Failed to parse memory info"))
}

#[cfg(target_os = "linux")]
pub fn read_cpu_ticks() -> Result<CpuTicks> {
    let stat = std::fs::read_to_string(PROC_STAT)
        .map_err(|e| MonitorError::metric_read(format!("Failed to open {}: {}", PROC_STAT, e)))?;
    parse_cpu_ticks(&stat)
}

#[cfg(target_os = "linux")]
pub fn read_meminfo() -> Result<MemInfo> {
    let meminfo = std::fs::read_to_string(PROC_MEMINFO).map_err(|e| {
        MonitorError::metric_read(format!("Failed to open {}: {}", PROC_MEMINFO, e))
    })?;
    parse_meminfo(&meminfo)
}

#[cfg(unix)]
pub fn root_fs_usage() -> Result<FsUsage> {
    use std::ffi::CString;

    let root = CString::new("/").map_err(|e| MonitorError::metric_read(e.to_string()))?;
    let mut stats: libc::statvfs = unsafe { std::mem::zeroed() };

    // SAFETY: `root` is a valid NUL-terminated path and `stats` is a
    // properly sized out-parameter owned by this frame.
    let rc = unsafe { libc::statvfs(root.as_ptr(), &mut stats) };
    if rc != 0 {
        return Err(MonitorError::metric_read(format!(
            "Failed to get disk stats: {}",
            std::io::Error::last_os_error()
        )));
    }

    let fragment = stats.f_frsize as u64;
    Ok(FsUsage {
        total_bytes: (stats.f_blocks as u64).saturating_mul(fragment),
        free_bytes: (stats.f_bfree as u64).saturating_mul(fragment),
    })
}
