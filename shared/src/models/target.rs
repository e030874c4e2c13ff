//! Target resolution for shot styles

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::shot::ShotStyle;
use crate::validation::{SECONDS_MAX, YIELD_MAX_GRAMS};

/// Caller-supplied targets for the Custom style
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustomTargets {
    pub target_yield: Decimal,
    pub time_min: Decimal,
    pub time_max: Decimal,
}

/// Rejected custom targets
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TargetError {
    #[error("time window is inverted: min {min}s is above max {max}s")]
    InvertedWindow { min: Decimal, max: Decimal },

    #[error("target yield must be positive, got {0}g")]
    NonPositiveYield(Decimal),

    #[error("time window bounds cannot be negative")]
    NegativeTime,

    #[error("target yield cannot exceed 500g, got {0}g")]
    YieldTooLarge(Decimal),

    #[error("time window bounds cannot exceed 600s")]
    TimeTooLong,
}

impl CustomTargets {
    /// Input defaults offered for a fresh Custom shot
    pub fn defaults_for(dose: Decimal) -> Self {
        Self {
            target_yield: dose * Decimal::TWO,
            time_min: Decimal::from(25),
            time_max: Decimal::from(30),
        }
    }

    /// Check the targets before handing them to the resolver
    pub fn validate(&self) -> Result<(), TargetError> {
        if self.target_yield <= Decimal::ZERO {
            return Err(TargetError::NonPositiveYield(self.target_yield));
        }
        if self.target_yield > Decimal::from(YIELD_MAX_GRAMS) {
            return Err(TargetError::YieldTooLarge(self.target_yield));
        }
        if self.time_min < Decimal::ZERO || self.time_max < Decimal::ZERO {
            return Err(TargetError::NegativeTime);
        }
        if self.time_min > Decimal::from(SECONDS_MAX) || self.time_max > Decimal::from(SECONDS_MAX) {
            return Err(TargetError::TimeTooLong);
        }
        if self.time_min > self.time_max {
            return Err(TargetError::InvertedWindow {
                min: self.time_min,
                max: self.time_max,
            });
        }
        Ok(())
    }
}

/// Resolved yield ratio and extraction time window
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TargetProfile {
    pub style: ShotStyle,
    /// Yield / dose; zero for Custom
    pub ratio: Decimal,
    pub time_min: Decimal,
    pub time_max: Decimal,
    pub target_yield: Decimal,
}

impl TargetProfile {
    /// Midpoint of the time window
    pub fn center(&self) -> Decimal {
        (self.time_min + self.time_max) / Decimal::TWO
    }

    pub fn contains(&self, time: Decimal) -> bool {
        time >= self.time_min && time <= self.time_max
    }

    /// Signed distance of `time` from the window; zero inside it
    pub fn deviation(&self, time: Decimal) -> Decimal {
        if time < self.time_min {
            time - self.time_min
        } else if time > self.time_max {
            time - self.time_max
        } else {
            Decimal::ZERO
        }
    }

    /// Yield a host pre-fills before the shot is weighed
    pub fn suggested_yield(&self) -> Decimal {
        self.target_yield
    }
}

/// Ratio and time window for a predefined style
fn style_targets(style: ShotStyle) -> (Decimal, Decimal, Decimal) {
    match style {
        ShotStyle::Ristretto => (Decimal::new(125, 2), Decimal::from(15), Decimal::from(20)),
        ShotStyle::Lungo => (Decimal::from(3), Decimal::from(35), Decimal::from(45)),
        // Profiled two-stage shots run slower
        ShotStyle::SlayerLiteDecaf => (Decimal::TWO, Decimal::from(35), Decimal::from(55)),
        ShotStyle::Normale | ShotStyle::Custom => {
            (Decimal::TWO, Decimal::from(25), Decimal::from(30))
        }
    }
}

/// Resolve the targets for a shot style.
///
/// Custom targets are taken verbatim and are not validated here; an inverted
/// window must be rejected by the caller (see [`CustomTargets::validate`]).
/// Custom without targets uses [`CustomTargets::defaults_for`].
pub fn resolve_targets(
    style: ShotStyle,
    dose: Decimal,
    custom: Option<&CustomTargets>,
) -> TargetProfile {
    match style {
        ShotStyle::Custom => {
            let custom = custom.copied().unwrap_or_else(|| CustomTargets::defaults_for(dose));
            TargetProfile {
                style,
                ratio: Decimal::ZERO,
                time_min: custom.time_min,
                time_max: custom.time_max,
                target_yield: custom.target_yield,
            }
        }
        _ => {
            let (ratio, time_min, time_max) = style_targets(style);
            TargetProfile {
                style,
                ratio,
                time_min,
                time_max,
                target_yield: dose * ratio,
            }
        }
    }
}
