//! Grind ladder and sensitivity scaling

use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::{CalibrationOverride, RoastLevel, TargetProfile};

/// Where a shot time falls relative to the target window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowBand {
    InWindow,
    /// More than 8s under the window
    FarTooFast,
    /// More than 4s under the window
    TooFast,
    SlightlyFast,
    /// More than 10s over the window
    FarTooSlow,
    /// More than 5s over the window
    TooSlow,
    SlightlySlow,
}

impl FlowBand {
    pub fn matches(&self, time: Decimal, targets: &TargetProfile) -> bool {
        let min = targets.time_min;
        let max = targets.time_max;
        match self {
            FlowBand::InWindow => targets.contains(time),
            FlowBand::FarTooFast => time < min - Decimal::from(8),
            FlowBand::TooFast => time < min - Decimal::from(4),
            FlowBand::SlightlyFast => time < min,
            FlowBand::FarTooSlow => time > max + Decimal::from(10),
            FlowBand::TooSlow => time > max + Decimal::from(5),
            FlowBand::SlightlySlow => time > max,
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            FlowBand::InWindow => "inside the time window",
            FlowBand::FarTooFast => "more than 8s under the window",
            FlowBand::TooFast => "more than 4s under the window",
            FlowBand::SlightlyFast => "under the window",
            FlowBand::FarTooSlow => "more than 10s over the window",
            FlowBand::TooSlow => "more than 5s over the window",
            FlowBand::SlightlySlow => "over the window",
        }
    }
}

/// One rung of the grind ladder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LadderStep {
    pub band: FlowBand,
    pub base: Decimal,
}

const fn tenths(value: u32, negative: bool) -> Decimal {
    Decimal::from_parts(value, 0, 0, negative, 1)
}

/// Grind ladder in priority order; the first matching band wins
pub const GRIND_LADDER: [LadderStep; 7] = [
    LadderStep { band: FlowBand::InWindow, base: Decimal::ZERO },
    LadderStep { band: FlowBand::FarTooFast, base: tenths(20, true) },
    LadderStep { band: FlowBand::TooFast, base: tenths(10, true) },
    LadderStep { band: FlowBand::SlightlyFast, base: tenths(5, true) },
    LadderStep { band: FlowBand::FarTooSlow, base: tenths(15, false) },
    LadderStep { band: FlowBand::TooSlow, base: tenths(10, false) },
    LadderStep { band: FlowBand::SlightlySlow, base: tenths(5, false) },
];

/// Classify a shot time against the ladder
pub fn classify_flow(time: Decimal, targets: &TargetProfile) -> LadderStep {
    GRIND_LADDER
        .iter()
        .copied()
        .find(|step| step.band.matches(time, targets))
        .unwrap_or(GRIND_LADDER[0])
}

/// Flow so fast that temperature feedback is unreliable
pub fn is_flow_far_too_fast(time: Decimal, targets: &TargetProfile) -> bool {
    FlowBand::FarTooFast.matches(time, targets)
}

/// Manual override if supplied, else the roast-level default
pub fn sensitivity_for(roast: RoastLevel, calibration: Option<&CalibrationOverride>) -> Decimal {
    calibration
        .map(|c| c.sensitivity)
        .unwrap_or_else(|| roast.grind_sensitivity())
}

/// Round to the nearest 0.5, ties to even (0.25 -> 0.0, 0.75 -> 1.0)
pub fn round_to_half(value: Decimal) -> Decimal {
    let halves = (value * Decimal::TWO)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven);
    let rounded = halves / Decimal::TWO;
    if rounded.is_zero() {
        Decimal::ZERO
    } else {
        rounded.normalize()
    }
}

/// Scaled grind correction
pub fn grind_delta(base: Decimal, sensitivity: Decimal) -> Decimal {
    round_to_half(base * sensitivity)
}
