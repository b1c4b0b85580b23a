use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::core::severity::{translate_level, Severity};
use crate::core::system_monitor::{
    default_source, CpuLoadTracker, MetricSource, ResourceKind, SysinfoMetricSource,
    DEFAULT_HIGHLIGHT_FILE,
};
use crate::error::MonitorError;

const DEFAULT_INTERVAL_MS: u64 = 2_000;

/// Which metric backend to sample from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceChoice {
    /// procfs on Linux, sysinfo elsewhere
    #[default]
    Auto,
    Procfs,
    Sysinfo,
}

impl SourceChoice {
    pub fn build(self, cpu: Arc<CpuLoadTracker>) -> crate::Result<Arc<dyn MetricSource>> {
        match self {
            SourceChoice::Auto => Ok(default_source(cpu)),
            SourceChoice::Sysinfo => Ok(Arc::new(SysinfoMetricSource::new())),
            #[cfg(target_os = "linux")]
            SourceChoice::Procfs => Ok(Arc::new(
                crate::core::system_monitor::ProcMetricSource::new(cpu),
            )),
            #[cfg(not(target_os = "linux"))]
            SourceChoice::Procfs => Err(MonitorError::config(
                "the procfs source is only available on Linux",
            )),
        }
    }
}

impl std::str::FromStr for SourceChoice {
    type Err = MonitorError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(SourceChoice::Auto),
            "procfs" => Ok(SourceChoice::Procfs),
            "sysinfo" => Ok(SourceChoice::Sysinfo),
            other => Err(MonitorError::config(format!("unknown metric source '{}'", other))),
        }
    }
}

/// Startup configuration.
///
/// Layered by the binary: defaults, then the JSON file, then command-line
/// flags, then interactive prompts for whatever is still missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub log_file: Option<PathBuf>,
    pub level: Option<String>,
    /// Session to start right after startup
    pub mode: Option<String>,
    /// `null` disables the highlighted output
    pub highlight_file: Option<PathBuf>,
    pub interval_ms: u64,
    pub source: SourceChoice,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            log_file: None,
            level: None,
            mode: None,
            highlight_file: Some(PathBuf::from(DEFAULT_HIGHLIGHT_FILE)),
            interval_ms: DEFAULT_INTERVAL_MS,
            source: SourceChoice::Auto,
        }
    }
}

impl MonitorConfig {
    /// Load from the per-user config file, or defaults if there is none.
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        if data.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let data = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, data).with_context(|| format!("Failed to write config file: {:?}", path))
    }

    /// `<config_dir>/resmon/config.json`
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("resmon").join("config.json"))
    }

    /// Check everything the logger and the first session need. Runs before
    /// the logger is constructed.
    pub fn validate(&self) -> crate::Result<()> {
        let log_file = self
            .log_file
            .as_ref()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| MonitorError::config("a log file name is required"))?;

        if log_file.is_dir() {
            return Err(MonitorError::config(format!(
                "log file {:?} is a directory",
                log_file
            )));
        }

        let level = self
            .level
            .as_deref()
            .ok_or_else(|| MonitorError::config("an initial log level is required"))?;
        if translate_level(level) == Severity::Unknown {
            return Err(MonitorError::invalid_level(level));
        }

        if let Some(mode) = &self.mode {
            mode.parse::<ResourceKind>()?;
        }

        if self.interval_ms == 0 {
            return Err(MonitorError::config("interval_ms must be greater than zero"));
        }

        Ok(())
    }

    /// Initial level; `Unknown` unless [`MonitorConfig::validate`] passed.
    pub fn startup_level(&self) -> Severity {
        self.level.as_deref().map_or(Severity::Unknown, translate_level)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}
