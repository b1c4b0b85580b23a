//! Severity tiers for log filtering and usage classification.
//!
//! One ordered scale serves both purposes: the logger drops records below
//! its configured minimum, and every sampled percentage is mapped onto the
//! same scale before it is logged.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Ordered severity. `Unknown` sorts below `Info`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Severity {
    #[default]
    Unknown = 0,
    Info = 1,
    Warning = 2,
    Error = 3,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Unknown,
        Severity::Info,
        Severity::Warning,
        Severity::Error,
    ];

    /// Upper-case name used in log lines.
    pub fn name(self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Unknown => "UNKNOWN",
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            1 => Severity::Info,
            2 => Severity::Warning,
            3 => Severity::Error,
            _ => Severity::Unknown,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Formatting helper, equivalent to [`Severity::name`].
pub fn severity_to_name(level: Severity) -> &'static str {
    level.name()
}

/// Parse a textual level, ignoring case and surrounding whitespace.
///
/// Total: anything that is not `info`, `warning` or `error` maps to
/// [`Severity::Unknown`].
pub fn translate_level(name: &str) -> Severity {
    match name.trim().to_ascii_lowercase().as_str() {
        "info" => Severity::Info,
        "warning" => Severity::Warning,
        "error" => Severity::Error,
        _ => Severity::Unknown,
    }
}

/// Inclusive percentage band `[min, max]` belonging to one severity tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeverityBand {
    pub min: u8,
    pub max: u8,
}

impl SeverityBand {
    /// Closed-interval check on the raw percentage. Values between two
    /// bands (50.5, 80.2) belong to neither.
    pub fn contains(&self, percentage: f64) -> bool {
        f64::from(self.min) <= percentage && percentage <= f64::from(self.max)
    }
}

/// Threshold table:
///
/// | percentage | severity |
/// |------------|----------|
/// | `<= 50`    | Info     |
/// | `51..=80`  | Warning  |
/// | `>= 81`    | Error    |
pub fn classify(percentage: f64) -> Severity {
    let whole = whole_percent(percentage);
    if whole <= 50 {
        Severity::Info
    } else if whole <= 80 {
        Severity::Warning
    } else {
        Severity::Error
    }
}

/// Band matching a configured minimum severity. `Unknown` has none.
pub fn boundary_for(minimum: Severity) -> Option<SeverityBand> {
    match minimum {
        Severity::Info => Some(SeverityBand { min: 0, max: 50 }),
        Severity::Warning => Some(SeverityBand { min: 51, max: 80 }),
        Severity::Error => Some(SeverityBand { min: 81, max: 100 }),
        Severity::Unknown => None,
    }
}

fn whole_percent(percentage: f64) -> i64 {
    if percentage.is_nan() {
        return 0;
    }
    percentage.trunc() as i64
}

/// Severity shared between one writer and many readers.
///
/// Stores use release ordering and loads use acquire, so a level change is
/// seen by every write that starts after `store` returns.
#[derive(Debug)]
pub struct SeverityCell(AtomicU8);

impl SeverityCell {
    pub fn new(level: Severity) -> Self {
        Self(AtomicU8::new(level as u8))
    }

    pub fn load(&self) -> Severity {
        Severity::from_u8(self.0.load(Ordering::Acquire))
    }

    pub fn store(&self, level: Severity) {
        self.0.store(level as u8, Ordering::Release);
    }
}

impl Default for SeverityCell {
    fn default() -> Self {
        Self::new(Severity::Unknown)
    }
}
