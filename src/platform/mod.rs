// Platform-specific code module

pub mod procfs;

// Re-exports for cleaner imports
pub use procfs::{parse_cpu_ticks, parse_meminfo, CpuTicks, FsUsage, MemInfo};

#[cfg(unix)]
pub use procfs::root_fs_usage;

#[cfg(target_os = "linux")]
pub use procfs::{read_cpu_ticks, read_meminfo};
