//! Slayer-lite rule set for two-stage decaf shots.
//!
//! Diagnosis follows the observed stream during the low-pressure stage
//! rather than total shot time.

use rust_decimal::Decimal;

use super::ProfileOutcome;
use crate::models::{
    Alert, BeanProfile, Effect, ExtractionAdjustment, GrindAdvice, PiPowerAdvice, RoastLevel,
    Rule, RuleFiring, ShotObservation, TargetProfile, TemperatureAdvice, Taste, Texture,
};

/// PI power that reaches the ~6 bar low-pressure stage
pub const TARGET_PI_POWER: i32 = 80;
pub const PI_POWER_TOLERANCE: i32 = 2;
/// Shortest PI that covers saturation plus low-bar flow
pub const MIN_PI_TIME_SECONDS: i64 = 15;
/// Low-bar flow shorter than this means the grind is too coarse
pub const MIN_LOW_BAR_FLOW_SECONDS: i64 = 3;

/// Brew temperature each roast is calibrated to
pub fn calibration_temperature(roast: RoastLevel) -> Decimal {
    match roast {
        RoastLevel::Dark => Decimal::from(91),
        RoastLevel::Medium => Decimal::from(93),
        RoastLevel::Light => Decimal::from(95),
    }
}

/// Thin shots tighten to this ratio
pub fn tightened_ratio() -> Decimal {
    Decimal::new(175, 2)
}

pub(super) fn apply(
    bean: &BeanProfile,
    targets: &TargetProfile,
    observation: &ShotObservation,
    rationale: &mut Vec<RuleFiring>,
) -> ProfileOutcome {
    let mut alerts = Vec::new();

    // Machine configuration (advisory only)
    let current_pi = observation.pi_power_percent;
    let pi_range = (TARGET_PI_POWER - PI_POWER_TOLERANCE)..=(TARGET_PI_POWER + PI_POWER_TOLERANCE);
    let next_pi = if pi_range.contains(&current_pi) {
        current_pi
    } else {
        alerts.push(Alert::PiPowerOutOfRange {
            current: current_pi,
            suggested: TARGET_PI_POWER,
        });
        rationale.push(RuleFiring::new(
            Rule::MachineConfig,
            format!(
                "PI power {}% outside {}-{}%",
                current_pi,
                pi_range.start(),
                pi_range.end()
            ),
            Effect::PiPowerTo(TARGET_PI_POWER),
        ));
        TARGET_PI_POWER
    };

    let min_pi_time = Decimal::from(MIN_PI_TIME_SECONDS);
    if observation.pi_time_seconds < min_pi_time {
        alerts.push(Alert::PiTimeTooShort {
            current: observation.pi_time_seconds,
            minimum: min_pi_time,
        });
        rationale.push(RuleFiring::new(
            Rule::MachineConfig,
            format!("PI time {}s under {}s", observation.pi_time_seconds, min_pi_time),
            Effect::Warning,
        ));
    }

    // Grind, from the low-pressure stream
    let delta = match observation.two_stage {
        None => {
            rationale.push(RuleFiring::new(
                Rule::Grind,
                "no stage observation recorded",
                Effect::NoChange,
            ));
            Decimal::ZERO
        }
        Some(stage) if !stage.stream_before_ramp => {
            let delta = Decimal::ONE;
            rationale.push(RuleFiring::new(
                Rule::Grind,
                "no stream before pressure ramp: too fine",
                Effect::GrindDelta(delta),
            ));
            delta
        }
        Some(stage) if stage.low_bar_flow_seconds < Decimal::from(MIN_LOW_BAR_FLOW_SECONDS) => {
            let delta = Decimal::new(-5, 1);
            rationale.push(RuleFiring::new(
                Rule::Grind,
                format!(
                    "low-bar flow {}s under {}s: too coarse",
                    stage.low_bar_flow_seconds, MIN_LOW_BAR_FLOW_SECONDS
                ),
                Effect::GrindDelta(delta),
            ));
            delta
        }
        Some(_) => Decimal::ZERO,
    };
    let grind = GrindAdvice {
        current: observation.grind,
        deviation: targets.deviation(observation.time_seconds),
        base_adjustment: delta,
        sensitivity: None,
        delta,
        next: observation.grind + delta,
    };

    // Ratio: thin shots get a tighter ratio
    let extraction = if observation.texture == Texture::Watery {
        let next = observation.dose_grams * tightened_ratio();
        rationale.push(RuleFiring::new(
            Rule::Ratio,
            format!("thin texture, tightening to 1:{}", tightened_ratio()),
            Effect::TargetYieldTo(next),
        ));
        ExtractionAdjustment::TargetYield { next }
    } else {
        ExtractionAdjustment::Unchanged
    };

    // Temperature: snap an ashy shot back to the calibration point
    let current_temp = observation.temperature_celsius;
    let calibration = calibration_temperature(bean.roast_level);
    let temperature = if observation.taste == Taste::Bitter && current_temp > calibration {
        rationale.push(RuleFiring::new(
            Rule::Temperature,
            format!("ashy above {} calibration {}°C", bean.roast_level, calibration),
            Effect::TemperatureTo(calibration),
        ));
        TemperatureAdvice::Adjust {
            current: current_temp,
            next: calibration,
        }
    } else {
        TemperatureAdvice::Hold {
            current: current_temp,
        }
    };

    ProfileOutcome {
        grind,
        extraction,
        temperature,
        pi_power: PiPowerAdvice {
            current: current_pi,
            next: next_pi,
        },
        pi_time: None,
        alerts,
    }
}
