//! Input validation for the Espresso Advisor
//!
//! The rule engine trusts its inputs. Hosts run these checks at their
//! boundary before building an observation.

use rust_decimal::Decimal;

use crate::models::{CalibrationOverride, RuleProfile, ShotObservation};

// ============================================================================
// Machine Ranges
// ============================================================================

pub const BREW_TEMPERATURE_MIN: i64 = 86;
pub const BREW_TEMPERATURE_MAX: i64 = 96;

/// Lowest PI power the given profile accepts
pub fn pi_power_floor(profile: RuleProfile) -> i32 {
    match profile {
        RuleProfile::Standard => 55,
        RuleProfile::SlayerLite => 50,
    }
}

/// Validate brew temperature against the boiler range
pub fn validate_brew_temperature(temperature: Decimal) -> Result<(), &'static str> {
    if temperature < Decimal::from(BREW_TEMPERATURE_MIN)
        || temperature > Decimal::from(BREW_TEMPERATURE_MAX)
    {
        return Err("Brew temperature must be between 86 and 96°C");
    }
    Ok(())
}

/// Validate pre-infusion power for the profile
pub fn validate_pi_power(power: i32, profile: RuleProfile) -> Result<(), &'static str> {
    if power < pi_power_floor(profile) || power > 99 {
        return Err(match profile {
            RuleProfile::Standard => "PI power must be between 55 and 99%",
            RuleProfile::SlayerLite => "PI power must be between 50 and 99%",
        });
    }
    Ok(())
}

/// Validate a manual grind sensitivity
pub fn validate_sensitivity(sensitivity: Decimal) -> Result<(), &'static str> {
    if sensitivity < CalibrationOverride::MIN || sensitivity > CalibrationOverride::MAX {
        return Err("Sensitivity must be between 0.5 and 1.5");
    }
    Ok(())
}

// ============================================================================
// Shot Measurements
// ============================================================================

pub const DOSE_MAX_GRAMS: i64 = 100;
pub const YIELD_MAX_GRAMS: i64 = 500;
pub const SECONDS_MAX: i64 = 600;
/// Grinder dial range, either side of zero
pub const GRIND_SETTING_LIMIT: i64 = 1000;

pub fn validate_dose(dose: Decimal) -> Result<(), &'static str> {
    if dose <= Decimal::ZERO {
        return Err("Dose must be positive");
    }
    if dose > Decimal::from(DOSE_MAX_GRAMS) {
        return Err("Dose cannot exceed 100g");
    }
    Ok(())
}

/// Zero yield is allowed and means "not weighed"
pub fn validate_yield(yield_grams: Decimal) -> Result<(), &'static str> {
    if yield_grams < Decimal::ZERO {
        return Err("Yield cannot be negative");
    }
    if yield_grams > Decimal::from(YIELD_MAX_GRAMS) {
        return Err("Yield cannot exceed 500g");
    }
    Ok(())
}

pub fn validate_seconds(seconds: Decimal) -> Result<(), &'static str> {
    if seconds < Decimal::ZERO {
        return Err("Time cannot be negative");
    }
    if seconds > Decimal::from(SECONDS_MAX) {
        return Err("Time cannot exceed 600s");
    }
    Ok(())
}

pub fn validate_grind(grind: Decimal) -> Result<(), &'static str> {
    if grind.abs() > Decimal::from(GRIND_SETTING_LIMIT) {
        return Err("Grind setting must be between -1000 and 1000");
    }
    Ok(())
}

/// Validate a custom extraction window
pub fn validate_time_window(min: Decimal, max: Decimal) -> Result<(), &'static str> {
    validate_seconds(min)?;
    validate_seconds(max)?;
    if min > max {
        return Err("Minimum time cannot exceed maximum time");
    }
    Ok(())
}

pub fn validate_bean_name(name: &str) -> Result<(), &'static str> {
    if name.trim().is_empty() {
        return Err("Bean name is required");
    }
    Ok(())
}

/// Run every field check on an observation
pub fn validate_observation(
    observation: &ShotObservation,
    profile: RuleProfile,
) -> Result<(), &'static str> {
    validate_grind(observation.grind)?;
    validate_dose(observation.dose_grams)?;
    validate_yield(observation.yield_grams)?;
    validate_seconds(observation.time_seconds)?;
    validate_seconds(observation.pi_time_seconds)?;
    validate_brew_temperature(observation.temperature_celsius)?;
    validate_pi_power(observation.pi_power_percent, profile)?;
    if let Some(stage) = observation.two_stage {
        validate_seconds(stage.low_bar_flow_seconds)?;
    }
    Ok(())
}
