//! Shared primitive types used across the explorer.

use crate::error::{ExplorerError, ExplorerResult};
use serde::Serialize;
use std::fmt;

/// Identifies one interactive session. Each session owns its own cache
/// and threshold.
pub type SessionId = String;

/// Threshold used when nothing else is configured.
pub const DEFAULT_THRESHOLD: f64 = 0.06;

/// Granularity of the threshold control (0.01).
pub const THRESHOLD_STEPS_PER_UNIT: f64 = 100.0;

/// A churn probability threshold in [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(into = "f64")]
pub struct Threshold(f64);

impl Threshold {
    pub fn new(value: f64) -> ExplorerResult<Self> {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            return Err(ExplorerError::InvalidThreshold { value });
        }
        Ok(Self(value))
    }

    /// Snap to the nearest control step before validating, the way the
    /// slider would report it.
    pub fn from_slider(value: f64) -> ExplorerResult<Self> {
        if !value.is_finite() {
            return Err(ExplorerError::InvalidThreshold { value });
        }
        Self::new((value * THRESHOLD_STEPS_PER_UNIT).round() / THRESHOLD_STEPS_PER_UNIT)
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self(DEFAULT_THRESHOLD)
    }
}

impl From<Threshold> for f64 {
    fn from(t: Threshold) -> Self {
        t.0
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}
