//! Maps a model probability to a risk tier with a fixed advisory message.

use serde::{Deserialize, Serialize};

/// Probability at or above which the tier is Medium.
pub const MEDIUM_THRESHOLD: f64 = 0.3;
/// Probability at or above which the tier is High.
pub const HIGH_THRESHOLD: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_probability(p: f64) -> Self {
        if p >= HIGH_THRESHOLD {
            RiskLevel::High
        } else if p >= MEDIUM_THRESHOLD {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn advisory(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low risk of diabetes",
            RiskLevel::Medium => "Moderate risk of diabetes. Consider lifestyle changes.",
            RiskLevel::High => "High risk of diabetes. Please consult a healthcare professional.",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }
}
