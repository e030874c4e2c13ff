//! Standard rule set: ladder-driven grind, roast-band temperature, PI power

use rust_decimal::Decimal;

use super::grind::{classify_flow, grind_delta, is_flow_far_too_fast, sensitivity_for};
use super::ProfileOutcome;
use crate::models::{
    BeanProfile, CalibrationOverride, Effect, ExtractionAdjustment, GrindAdvice, PiPowerAdvice,
    PiTimeInstruction, RoastLevel, Rule, RuleFiring, ShotObservation, Suppression,
    TargetProfile, TemperatureAdvice, Taste, Texture,
};

pub const PI_POWER_MIN: i32 = 55;
pub const PI_POWER_MAX: i32 = 99;

/// Decaf beans never go above this brew temperature
pub const DECAF_MAX_TEMPERATURE: i64 = 92;

/// Allowed brew temperature band as (min, max) in °C
pub fn temperature_band(roast: RoastLevel, decaf: bool) -> (Decimal, Decimal) {
    let (min, max) = match roast {
        RoastLevel::Dark => (86, 91),
        RoastLevel::Medium => (91, 94),
        RoastLevel::Light => (93, 96),
    };
    let max = if decaf { max.min(DECAF_MAX_TEMPERATURE) } else { max };
    (Decimal::from(min), Decimal::from(max))
}

/// PI power change for a texture: (adjustment, condition)
fn pi_power_adjustment(texture: Texture, decaf: bool) -> Option<(i32, &'static str)> {
    match texture {
        Texture::Channeling if decaf => Some((-15, "channeling on a fragile decaf puck")),
        Texture::Channeling => Some((-10, "channeling")),
        Texture::Watery => Some((5, "watery texture")),
        Texture::Syrupy | Texture::Dry => None,
    }
}

pub(super) fn apply(
    bean: &BeanProfile,
    targets: &TargetProfile,
    observation: &ShotObservation,
    calibration: Option<&CalibrationOverride>,
    rationale: &mut Vec<RuleFiring>,
) -> ProfileOutcome {
    let decaf = bean.is_decaf();
    let time = observation.time_seconds;

    // Grind
    let step = classify_flow(time, targets);
    let sensitivity = sensitivity_for(bean.roast_level, calibration);
    let delta = grind_delta(step.base, sensitivity);
    let grind = GrindAdvice {
        current: observation.grind,
        deviation: targets.deviation(time),
        base_adjustment: step.base,
        sensitivity: Some(sensitivity),
        delta,
        next: observation.grind + delta,
    };
    if !delta.is_zero() {
        rationale.push(RuleFiring::new(
            Rule::Grind,
            format!(
                "time {}s {} {}-{}s (base {}, sensitivity {}x)",
                time,
                step.band.describe(),
                targets.time_min,
                targets.time_max,
                step.base,
                sensitivity
            ),
            Effect::GrindDelta(delta),
        ));
    }

    // Dose: a watery shot the grind can't explain
    let mut extraction = ExtractionAdjustment::Unchanged;
    if observation.texture == Texture::Watery && delta.is_zero() {
        let next = observation.dose_grams + Decimal::new(5, 1);
        extraction = ExtractionAdjustment::Dose {
            current: observation.dose_grams,
            next,
        };
        rationale.push(RuleFiring::new(
            Rule::Dose,
            "watery texture with grind on target",
            Effect::DoseTo(next),
        ));
    }

    // Temperature
    let (temp_min, temp_max) = temperature_band(bean.roast_level, decaf);
    let current_temp = observation.temperature_celsius;
    let temperature = if is_flow_far_too_fast(time, targets) {
        rationale.push(RuleFiring::new(
            Rule::Temperature,
            format!("time {}s more than 8s under the window", time),
            Effect::TemperatureSuppressed(Suppression::FlowTooFast),
        ));
        TemperatureAdvice::Suppressed {
            reason: Suppression::FlowTooFast,
        }
    } else if observation.taste == Taste::Harsh {
        let reason = if bean.roast_level == RoastLevel::Light {
            Suppression::HarshnessLightRoast
        } else {
            Suppression::Harshness
        };
        rationale.push(RuleFiring::new(
            Rule::Temperature,
            "harsh taste points to a puck fault",
            Effect::TemperatureSuppressed(reason),
        ));
        TemperatureAdvice::Suppressed { reason }
    } else if observation.taste == Taste::Sour && current_temp < temp_max {
        let next = current_temp + Decimal::ONE;
        rationale.push(RuleFiring::new(
            Rule::Temperature,
            format!("sour below band max {}°C", temp_max),
            Effect::TemperatureTo(next),
        ));
        TemperatureAdvice::Adjust {
            current: current_temp,
            next,
        }
    } else if observation.taste == Taste::Sour {
        // Temperature saturated: extract more liquid instead
        match extraction {
            ExtractionAdjustment::Unchanged => {
                let base = observation
                    .measured_yield()
                    .map_or(targets.target_yield, |measured| measured.max(targets.target_yield));
                let next = base + Decimal::TWO;
                extraction = ExtractionAdjustment::TargetYield { next };
                rationale.push(RuleFiring::new(
                    Rule::Ratio,
                    format!("sour at band max {}°C, extending ratio", temp_max),
                    Effect::TargetYieldTo(next),
                ));
            }
            _ => {
                rationale.push(RuleFiring::new(
                    Rule::Ratio,
                    format!("sour at band max {}°C, dose change takes precedence", temp_max),
                    Effect::NoChange,
                ));
            }
        }
        TemperatureAdvice::Hold {
            current: current_temp,
        }
    } else if observation.taste == Taste::Bitter && current_temp > temp_min {
        let next = current_temp - Decimal::ONE;
        rationale.push(RuleFiring::new(
            Rule::Temperature,
            format!("bitter above band min {}°C", temp_min),
            Effect::TemperatureTo(next),
        ));
        TemperatureAdvice::Adjust {
            current: current_temp,
            next,
        }
    } else {
        TemperatureAdvice::Hold {
            current: current_temp,
        }
    };

    // PI power and time
    let current_pi = observation.pi_power_percent;
    let adjustment = pi_power_adjustment(observation.texture, decaf);
    let next_pi = (current_pi + adjustment.map_or(0, |(adj, _)| adj))
        .clamp(PI_POWER_MIN, PI_POWER_MAX);
    match adjustment {
        Some((_, condition)) => rationale.push(RuleFiring::new(
            Rule::PiPower,
            condition,
            Effect::PiPowerTo(next_pi),
        )),
        None if next_pi != current_pi => rationale.push(RuleFiring::new(
            Rule::PiPower,
            format!("PI power {}% outside {}-{}%", current_pi, PI_POWER_MIN, PI_POWER_MAX),
            Effect::PiPowerTo(next_pi),
        )),
        None => {}
    }

    let pi_time = (observation.texture == Texture::Dry).then(|| {
        let instruction = PiTimeInstruction {
            extend_by_seconds: Decimal::from(3),
        };
        rationale.push(RuleFiring::new(
            Rule::PiTime,
            "dry finish from uneven saturation",
            Effect::PiTimeExtendBy(instruction.extend_by_seconds),
        ));
        instruction
    });

    ProfileOutcome {
        grind,
        extraction,
        temperature,
        pi_power: PiPowerAdvice {
            current: current_pi,
            next: next_pi,
        },
        pi_time,
        alerts: Vec::new(),
    }
}
