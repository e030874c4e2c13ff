//! WebAssembly module for the Espresso Advisor
//!
//! Provides client-side computation for:
//! - Target resolution per shot style
//! - Shot evaluation against the browser's calendar date
//! - Decaf detection and grind rounding helpers for form hints
//!
//! Requests and responses are JSON so the page can hold them as plain objects.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

use shared::{evaluate, is_decaf_name, round_to_half, rule_profile};

/// Today's date from the JavaScript runtime, if it is a real calendar date
fn browser_today() -> Option<NaiveDate> {
    let now = js_sys::Date::new_0();
    if now.get_time().is_nan() {
        return None;
    }
    // getMonth() is zero-based
    NaiveDate::from_ymd_opt(now.get_full_year() as i32, now.get_month() + 1, now.get_date())
}

#[derive(Debug, Deserialize)]
struct TargetsRequest {
    #[serde(default)]
    style: ShotStyle,
    dose_grams: Decimal,
    #[serde(default)]
    custom: Option<CustomTargets>,
}

#[derive(Debug, Deserialize)]
struct ShotRequest {
    bean: BeanProfile,
    #[serde(default)]
    style: ShotStyle,
    #[serde(default)]
    custom: Option<CustomTargets>,
    observation: ShotObservation,
    #[serde(default)]
    calibration: Option<CalibrationOverride>,
}

fn log(message: &str) {
    web_sys::console::log_1(&JsValue::from_str(message));
}

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    log(concat!("espresso advisor wasm v", env!("CARGO_PKG_VERSION")));
}

fn resolve_targets_inner(request_json: &str) -> Result<String, String> {
    let request: TargetsRequest = serde_json::from_str(request_json)
        .map_err(|e| format!("Invalid targets JSON: {}", e))?;
    validate_dose(request.dose_grams)?;
    if let Some(custom) = &request.custom {
        custom.validate().map_err(|e| e.to_string())?;
    }

    let targets = shared::resolve_targets(request.style, request.dose_grams, request.custom.as_ref());
    serde_json::to_string(&targets).map_err(|e| e.to_string())
}

/// Evaluate a request as of `today`. Without a date the bean's age is
/// unknown, so freshness is skipped.
fn evaluate_inner(request_json: &str, today: Option<NaiveDate>) -> Result<String, String> {
    let mut request: ShotRequest = serde_json::from_str(request_json)
        .map_err(|e| format!("Invalid shot JSON: {}", e))?;

    validate_bean_name(&request.bean.name)?;
    validate_observation(&request.observation, rule_profile(request.style))?;
    if let Some(custom) = &request.custom {
        custom.validate().map_err(|e| e.to_string())?;
    }
    if let Some(calibration) = &request.calibration {
        validate_sensitivity(calibration.sensitivity)?;
    }

    let clock = match today {
        Some(date) => FixedClock(date),
        None => {
            // Never read once the roast date is gone
            request.bean.roast_date = None;
            FixedClock(NaiveDate::MIN)
        }
    };

    let targets = shared::resolve_targets(
        request.style,
        request.observation.dose_grams,
        request.custom.as_ref(),
    );
    let recommendation = evaluate(
        &request.bean,
        &targets,
        &request.observation,
        request.calibration.as_ref(),
        &clock,
    );
    serde_json::to_string(&recommendation).map_err(|e| e.to_string())
}

/// Resolve ratio, time window and target yield for a style and dose
#[wasm_bindgen]
pub fn resolve_targets_json(request_json: &str) -> Result<String, JsValue> {
    resolve_targets_inner(request_json).map_err(|e| JsValue::from_str(&e))
}

/// Evaluate a shot, aging beans against the browser's date
#[wasm_bindgen]
pub fn evaluate_shot_json(request_json: &str) -> Result<String, JsValue> {
    let today = browser_today();
    if today.is_none() {
        log("browser date unavailable, skipping bean freshness");
    }
    evaluate_inner(request_json, today)
        .map(|json| {
            log("shot evaluated");
            json
        })
        .map_err(|e| {
            log(&format!("shot rejected: {}", e));
            JsValue::from_str(&e)
        })
}

/// Evaluate a shot as of a given date (YYYY-MM-DD)
#[wasm_bindgen]
pub fn evaluate_shot_on(request_json: &str, iso_date: &str) -> Result<String, JsValue> {
    evaluate_on_inner(request_json, iso_date).map_err(|e| JsValue::from_str(&e))
}

fn evaluate_on_inner(request_json: &str, iso_date: &str) -> Result<String, String> {
    let today = NaiveDate::parse_from_str(iso_date, "%Y-%m-%d")
        .map_err(|e| format!("Invalid date '{}': {}", iso_date, e))?;
    evaluate_inner(request_json, Some(today))
}

/// Whether the Slayer-lite decaf hints apply to this bean name
#[wasm_bindgen]
pub fn is_decaf_bean(name: &str) -> bool {
    is_decaf_name(name)
}

/// Round a raw grind correction to the nearest half step
#[wasm_bindgen]
pub fn round_grind_adjustment(value: f64) -> f64 {
    let decimal = Decimal::try_from(value).unwrap_or(Decimal::ZERO);
    round_to_half(decimal).to_string().parse().unwrap_or(0.0)
}
