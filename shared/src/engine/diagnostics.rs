//! Warnings shared by both rule profiles

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::grind::is_flow_far_too_fast;
use crate::models::{
    Alert, BeanProfile, DecafTip, Effect, Freshness, Rule, RuleFiring, ShotObservation,
    TargetProfile, Texture, YieldMiss,
};

/// Beans younger than this still need rest
pub const REST_DAYS: i64 = 7;
/// Beans older than this flow faster
pub const AGING_DAYS: i64 = 30;

pub fn freshness(bean: &BeanProfile, today: NaiveDate) -> Option<Freshness> {
    let age_days = bean.age_days(today)?;
    if age_days < REST_DAYS {
        Some(Freshness::NeedsRest { age_days })
    } else if age_days > AGING_DAYS {
        Some(Freshness::Aging { age_days })
    } else {
        None
    }
}

/// Allowed distance from the target: 10% of it, but never under 3g
pub fn yield_tolerance(target: Decimal) -> Decimal {
    (target * Decimal::new(1, 1)).max(Decimal::from(3))
}

pub fn yield_miss(targets: &TargetProfile, observation: &ShotObservation) -> Option<YieldMiss> {
    let actual = observation.measured_yield()?;
    let target = targets.target_yield;
    let tolerance = yield_tolerance(target);
    ((actual - target).abs() > tolerance).then_some(YieldMiss {
        actual,
        target,
        tolerance,
    })
}

pub fn decaf_tip(
    bean: &BeanProfile,
    targets: &TargetProfile,
    observation: &ShotObservation,
) -> Option<DecafTip> {
    (bean.is_decaf() && is_flow_far_too_fast(observation.time_seconds, targets)).then(|| DecafTip {
        extra_dose_grams: Decimal::new(5, 1),
    })
}

/// Append the shared warnings to a recommendation under construction
pub(super) fn apply(
    bean: &BeanProfile,
    targets: &TargetProfile,
    observation: &ShotObservation,
    today: NaiveDate,
    alerts: &mut Vec<Alert>,
    rationale: &mut Vec<RuleFiring>,
) -> (Option<Freshness>, Option<YieldMiss>, Option<DecafTip>) {
    let fresh = freshness(bean, today);
    if let Some(warning) = fresh {
        rationale.push(RuleFiring::new(Rule::Freshness, warning.to_string(), Effect::Warning));
    }

    let miss = yield_miss(targets, observation);
    if let Some(miss) = miss {
        rationale.push(RuleFiring::new(
            Rule::YieldMiss,
            format!("{} (tolerance {}g)", miss, miss.tolerance),
            Effect::Warning,
        ));
    }

    let tip = decaf_tip(bean, targets, observation);
    if tip.is_some() {
        rationale.push(RuleFiring::new(
            Rule::DecafTip,
            "decaf with flow more than 8s under the window",
            Effect::Warning,
        ));
    }

    if observation.texture == Texture::Channeling {
        alerts.push(Alert::Channeling);
        rationale.push(RuleFiring::new(
            Rule::Channeling,
            "channeling texture",
            Effect::Warning,
        ));
    }

    (fresh, miss, tip)
}
