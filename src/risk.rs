use std::fmt;

use crate::error::{DashboardError, Result};

/// Scores at or above this are high risk.
pub const HIGH_THRESHOLD: f64 = 0.7;
/// Scores at or above this (and below [`HIGH_THRESHOLD`]) are moderate risk.
pub const MODERATE_THRESHOLD: f64 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RiskTier {
    Low,
    Moderate,
    High,
}

/// Display tag for a tier; rendering picks the actual shade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierColor {
    Green,
    Orange,
    Red,
}

impl RiskTier {
    pub fn label(self) -> &'static str {
        match self {
            RiskTier::Low => "low risk of default",
            RiskTier::Moderate => "moderate risk of default",
            RiskTier::High => "high risk of default",
        }
    }

    pub fn color(self) -> TierColor {
        match self {
            RiskTier::Low => TierColor::Green,
            RiskTier::Moderate => TierColor::Orange,
            RiskTier::High => TierColor::Red,
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify a default probability. Rejects NaN, infinities and values
/// outside [0, 1].
pub fn interpret(score: f64) -> Result<(RiskTier, &'static str)> {
    if !score.is_finite() || !(0.0..=1.0).contains(&score) {
        return Err(DashboardError::invalid(format!(
            "score must be a finite number in [0, 1], got {score}"
        )));
    }
    let tier = if score >= HIGH_THRESHOLD {
        RiskTier::High
    } else if score >= MODERATE_THRESHOLD {
        RiskTier::Moderate
    } else {
        RiskTier::Low
    };
    Ok((tier, tier.label()))
}
