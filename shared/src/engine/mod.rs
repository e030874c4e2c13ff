//! Adjustment rule engine
//!
//! Maps one shot observation to a recommendation for the next shot. The
//! engine picks the Slayer-lite rule set for `SlayerLiteDecaf` shots and the
//! Standard rule set otherwise, then applies the warnings both profiles share.
//! Evaluation is pure apart from the injected [`Clock`].

mod diagnostics;
mod grind;
mod slayer;
mod standard;

pub use diagnostics::{
    decaf_tip, freshness, yield_miss, yield_tolerance, AGING_DAYS, REST_DAYS,
};
pub use grind::{
    classify_flow, grind_delta, is_flow_far_too_fast, round_to_half, sensitivity_for, FlowBand,
    LadderStep, GRIND_LADDER,
};
pub use slayer::{
    calibration_temperature, tightened_ratio, MIN_LOW_BAR_FLOW_SECONDS, MIN_PI_TIME_SECONDS,
    TARGET_PI_POWER,
};
pub use standard::{temperature_band, DECAF_MAX_TEMPERATURE, PI_POWER_MAX, PI_POWER_MIN};

use crate::models::{
    Alert, BeanProfile, CalibrationOverride, ExtractionAdjustment, GrindAdvice, PiPowerAdvice,
    PiTimeInstruction, Recommendation, RuleProfile, ShotObservation, ShotStyle, TargetProfile,
    TemperatureAdvice,
};
use crate::types::Clock;

/// Profile-specific part of a recommendation
pub(crate) struct ProfileOutcome {
    pub grind: GrindAdvice,
    pub extraction: ExtractionAdjustment,
    pub temperature: TemperatureAdvice,
    pub pi_power: PiPowerAdvice,
    pub pi_time: Option<PiTimeInstruction>,
    pub alerts: Vec<Alert>,
}

/// Rule set used for a shot style
pub fn rule_profile(style: ShotStyle) -> RuleProfile {
    match style {
        ShotStyle::SlayerLiteDecaf => RuleProfile::SlayerLite,
        _ => RuleProfile::Standard,
    }
}

/// Evaluate one shot against its resolved targets.
///
/// The calibration override only affects the Standard grind rule; the
/// Slayer-lite grind rule is observational and unscaled.
pub fn evaluate<C: Clock + ?Sized>(
    bean: &BeanProfile,
    targets: &TargetProfile,
    observation: &ShotObservation,
    calibration: Option<&CalibrationOverride>,
    clock: &C,
) -> Recommendation {
    let mut rationale = Vec::new();
    let profile = rule_profile(targets.style);

    let mut outcome = match profile {
        RuleProfile::Standard => {
            standard::apply(bean, targets, observation, calibration, &mut rationale)
        }
        RuleProfile::SlayerLite => slayer::apply(bean, targets, observation, &mut rationale),
    };

    let (freshness, yield_miss, decaf_tip) = diagnostics::apply(
        bean,
        targets,
        observation,
        clock.today(),
        &mut outcome.alerts,
        &mut rationale,
    );

    Recommendation {
        profile,
        targets: *targets,
        grind: outcome.grind,
        extraction: outcome.extraction,
        temperature: outcome.temperature,
        pi_power: outcome.pi_power,
        pi_time: outcome.pi_time,
        freshness,
        yield_miss,
        decaf_tip,
        alerts: outcome.alerts,
        rationale,
    }
}
