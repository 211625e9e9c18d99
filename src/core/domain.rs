//! Domain types for uploaded targets and pointing simulation.

use serde::{Deserialize, Serialize};

/// Spectral resolution mode of the instrument.
///
/// Low- and medium-resolution targets are scheduled independently: a pointing
/// is configured for exactly one mode, so the simulation partitions the target
/// list by this attribute before invoking the optimizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resolution {
    #[serde(rename = "L")]
    Low,
    #[serde(rename = "M")]
    Medium,
}

impl Resolution {
    /// One-letter code used in uploaded target lists (`L` or `M`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::Low => "L",
            Resolution::Medium => "M",
        }
    }

    /// Parse the one-letter upload code. Anything other than exactly `L` or
    /// `M` is rejected.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "L" => Some(Resolution::Low),
            "M" => Some(Resolution::Medium),
            _ => None,
        }
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single observable target handed to the pointing optimizer.
///
/// Extracted from the validated, visibility-filtered upload frame; `ob_code`
/// is the proposer-assigned logical key, unique within one submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetPoint {
    pub ob_code: String,
    pub ra_deg: f64,
    pub dec_deg: f64,
    /// Scheduling priority, 0 (most important) through 9.
    pub priority: i32,
    /// Requested exposure time in seconds.
    pub exptime_sec: f64,
    pub resolution: Resolution,
}

/// Weight vector steering the optimizer's objective trade-off.
///
/// The three components trade off minimizing the number of pointings against
/// fairness across priority classes and fairness across individual targets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveWeights {
    pub pointing_count: f64,
    pub priority_fairness: f64,
    pub target_fairness: f64,
}

impl Default for ObjectiveWeights {
    fn default() -> Self {
        // Production weights used by the online pointing planner.
        Self {
            pointing_count: 4.02,
            priority_fairness: 0.01,
            target_fairness: 0.01,
        }
    }
}
