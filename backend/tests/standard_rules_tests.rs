//! Standard rule set tests
//!
//! Covers the grind ladder with sensitivity scaling, the dose/ratio
//! tie-break, roast-band temperature steps and PI power clamping.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{
    evaluate, resolve_targets, BeanProfile, CalibrationOverride, Effect, ExtractionAdjustment,
    FixedClock, Recommendation, RoastLevel, Rule, RuleProfile, ShotObservation, ShotStyle,
    Suppression, Taste, TemperatureAdvice, Texture,
};

/// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn clock() -> FixedClock {
    FixedClock(NaiveDate::from_ymd_opt(2024, 6, 30).unwrap())
}

fn shot(time: &str) -> ShotObservation {
    ShotObservation {
        grind: dec("15"),
        dose_grams: dec("18"),
        yield_grams: Decimal::ZERO,
        time_seconds: dec(time),
        temperature_celsius: dec("93"),
        pi_power_percent: 65,
        pi_time_seconds: dec("8"),
        taste: Taste::Balanced,
        texture: Texture::Syrupy,
        two_stage: None,
    }
}

fn run(bean: &BeanProfile, style: ShotStyle, observation: &ShotObservation) -> Recommendation {
    let targets = resolve_targets(style, observation.dose_grams, None);
    evaluate(bean, &targets, observation, None, &clock())
}

fn medium() -> BeanProfile {
    BeanProfile::new("Onyx Geometry", RoastLevel::Medium)
}

// =============================================================================
// Grind
// =============================================================================

mod grind {
    use super::*;

    #[test]
    fn normale_medium_slightly_fast_scenario() {
        let recommendation = run(&medium(), ShotStyle::Normale, &shot("24"));

        assert_eq!(recommendation.profile, RuleProfile::Standard);
        assert_eq!(recommendation.grind.base_adjustment, dec("-0.5"));
        assert_eq!(recommendation.grind.sensitivity, Some(dec("0.8")));
        assert_eq!(recommendation.grind.delta, dec("-0.5"));
        assert_eq!(recommendation.grind.next, dec("14.5"));
        assert_eq!(recommendation.extraction, ExtractionAdjustment::Unchanged);
        assert_eq!(
            recommendation.temperature,
            TemperatureAdvice::Hold { current: dec("93") }
        );
        assert_eq!(recommendation.yield_miss, None);
    }

    #[test]
    fn in_window_is_optimal() {
        for time in ["25", "27.5", "30"] {
            let recommendation = run(&medium(), ShotStyle::Normale, &shot(time));
            assert!(recommendation.grind.is_optimal(), "time {}", time);
            assert_eq!(recommendation.grind.deviation, Decimal::ZERO);
            assert!(!recommendation.fired(Rule::Grind));
        }
    }

    #[test]
    fn dark_roast_damps_large_corrections() {
        let dark = BeanProfile::new("French Roast", RoastLevel::Dark);
        // -2.0 x 0.6 = -1.2 -> -1.0
        let recommendation = run(&dark, ShotStyle::Normale, &shot("15"));
        assert_eq!(recommendation.grind.delta, dec("-1.0"));
        // +1.5 x 0.6 = 0.9 -> 1.0
        let recommendation = run(&dark, ShotStyle::Normale, &shot("45"));
        assert_eq!(recommendation.grind.delta, dec("1.0"));
    }

    #[test]
    fn light_roast_is_unscaled() {
        let light = BeanProfile::new("Ethiopia Guji", RoastLevel::Light);
        let recommendation = run(&light, ShotStyle::Lungo, &shot("20"));
        assert_eq!(recommendation.grind.delta, dec("-2.0"));
        assert_eq!(recommendation.grind.next, dec("13"));
    }

    #[test]
    fn calibration_override_replaces_roast_sensitivity() {
        let targets = resolve_targets(ShotStyle::Normale, dec("18"), None);
        let calibration = CalibrationOverride::new(dec("1.5"));
        // -0.5 x 1.5 = -0.75 -> -1.0 (tie to even)
        let recommendation =
            evaluate(&medium(), &targets, &shot("24"), Some(&calibration), &clock());
        assert_eq!(recommendation.grind.sensitivity, Some(dec("1.5")));
        assert_eq!(recommendation.grind.delta, dec("-1.0"));

        // +0.5 x 0.5 = 0.25 -> 0.0 (tie to even)
        let calibration = CalibrationOverride::new(dec("0.5"));
        let recommendation =
            evaluate(&medium(), &targets, &shot("31"), Some(&calibration), &clock());
        assert_eq!(recommendation.grind.delta, Decimal::ZERO);
    }

    #[test]
    fn grind_rationale_records_delta() {
        let recommendation = run(&medium(), ShotStyle::Normale, &shot("24"));
        let firing = recommendation.firings(Rule::Grind).next().unwrap();
        assert_eq!(firing.effect, Effect::GrindDelta(dec("-0.5")));
        assert!(firing.condition.contains("24"));
    }

    #[test]
    fn recommended_grind_reaches_fixed_point() {
        let first = run(&medium(), ShotStyle::Normale, &shot("22"));
        let mut next_shot = shot("27");
        next_shot.grind = first.grind.next;

        let second = run(&medium(), ShotStyle::Normale, &next_shot);
        assert!(second.grind.is_optimal());
        assert_eq!(second.grind.next, first.grind.next);
        assert_eq!(second.extraction, ExtractionAdjustment::Unchanged);
        assert_eq!(second.temperature.next(), Some(dec("93")));
        assert!(!second.pi_power.changed());
        assert!(second.rationale.is_empty());
    }
}

// =============================================================================
// Dose and ratio
// =============================================================================

mod dose_and_ratio {
    use super::*;

    #[test]
    fn watery_on_target_adds_dose() {
        let mut observation = shot("27");
        observation.texture = Texture::Watery;
        let recommendation = run(&medium(), ShotStyle::Normale, &observation);

        assert_eq!(
            recommendation.extraction,
            ExtractionAdjustment::Dose {
                current: dec("18"),
                next: dec("18.5"),
            }
        );
        assert_eq!(recommendation.next_dose(), Some(dec("18.5")));
        assert_eq!(recommendation.next_target_yield(), None);
    }

    #[test]
    fn watery_with_grind_change_keeps_dose() {
        let mut observation = shot("20");
        observation.texture = Texture::Watery;
        let recommendation = run(&medium(), ShotStyle::Normale, &observation);
        assert!(!recommendation.grind.is_optimal());
        assert_eq!(recommendation.extraction, ExtractionAdjustment::Unchanged);
    }

    #[test]
    fn sour_at_band_max_extends_ratio() {
        let light = BeanProfile::new("Ethiopia Guji", RoastLevel::Light);
        let mut observation = shot("27");
        observation.taste = Taste::Sour;
        observation.temperature_celsius = dec("96");

        let recommendation = run(&light, ShotStyle::Normale, &observation);
        assert_eq!(recommendation.temperature, TemperatureAdvice::Hold { current: dec("96") });
        assert_eq!(recommendation.next_target_yield(), Some(dec("38")));
        assert!(recommendation.fired(Rule::Ratio));
    }

    #[test]
    fn ratio_extension_starts_from_larger_of_target_and_measured() {
        let light = BeanProfile::new("Ethiopia Guji", RoastLevel::Light);
        let mut observation = shot("27");
        observation.taste = Taste::Sour;
        observation.temperature_celsius = dec("96");
        observation.yield_grams = dec("39");

        let recommendation = run(&light, ShotStyle::Normale, &observation);
        assert_eq!(recommendation.next_target_yield(), Some(dec("41")));

        observation.yield_grams = dec("34");
        let recommendation = run(&light, ShotStyle::Normale, &observation);
        assert_eq!(recommendation.next_target_yield(), Some(dec("38")));
    }

    #[test]
    fn dose_wins_over_ratio_extension() {
        let light = BeanProfile::new("Ethiopia Guji", RoastLevel::Light);
        let mut observation = shot("27");
        observation.taste = Taste::Sour;
        observation.texture = Texture::Watery;
        observation.temperature_celsius = dec("96");

        let recommendation = run(&light, ShotStyle::Normale, &observation);
        assert_eq!(recommendation.next_dose(), Some(dec("18.5")));
        assert_eq!(recommendation.next_target_yield(), None);
        let ratio = recommendation.firings(Rule::Ratio).next().unwrap();
        assert_eq!(ratio.effect, Effect::NoChange);
    }
}

// =============================================================================
// Temperature
// =============================================================================

mod temperature {
    use super::*;

    #[test]
    fn sour_below_max_raises_one_degree() {
        let mut observation = shot("27");
        observation.taste = Taste::Sour;
        let recommendation = run(&medium(), ShotStyle::Normale, &observation);
        assert_eq!(
            recommendation.temperature,
            TemperatureAdvice::Adjust {
                current: dec("93"),
                next: dec("94"),
            }
        );
        assert_eq!(recommendation.extraction, ExtractionAdjustment::Unchanged);
    }

    #[test]
    fn bitter_above_min_lowers_one_degree() {
        let mut observation = shot("27");
        observation.taste = Taste::Bitter;
        let recommendation = run(&medium(), ShotStyle::Normale, &observation);
        assert_eq!(recommendation.temperature.next(), Some(dec("92")));
    }

    #[test]
    fn bitter_at_min_holds() {
        let mut observation = shot("27");
        observation.taste = Taste::Bitter;
        observation.temperature_celsius = dec("91");
        let recommendation = run(&medium(), ShotStyle::Normale, &observation);
        assert_eq!(recommendation.temperature, TemperatureAdvice::Hold { current: dec("91") });
        assert!(!recommendation.fired(Rule::Temperature));
    }

    #[test]
    fn far_too_fast_suppresses_temperature() {
        let mut observation = shot("16");
        observation.taste = Taste::Sour;
        let recommendation = run(&medium(), ShotStyle::Normale, &observation);
        assert_eq!(
            recommendation.temperature,
            TemperatureAdvice::Suppressed {
                reason: Suppression::FlowTooFast
            }
        );
        assert_eq!(recommendation.temperature.next(), None);
    }

    #[test]
    fn harsh_suppresses_with_roast_specific_message() {
        let mut observation = shot("27");
        observation.taste = Taste::Harsh;

        let recommendation = run(&medium(), ShotStyle::Normale, &observation);
        assert_eq!(
            recommendation.temperature,
            TemperatureAdvice::Suppressed {
                reason: Suppression::Harshness
            }
        );

        let light = BeanProfile::new("Ethiopia Guji", RoastLevel::Light);
        let recommendation = run(&light, ShotStyle::Normale, &observation);
        assert_eq!(
            recommendation.temperature,
            TemperatureAdvice::Suppressed {
                reason: Suppression::HarshnessLightRoast
            }
        );
    }

    #[test]
    fn decaf_caps_band_at_92() {
        let decaf = BeanProfile::new("Colombia Decaf", RoastLevel::Medium);
        let mut observation = shot("27");
        observation.taste = Taste::Sour;
        observation.temperature_celsius = dec("92");

        let recommendation = run(&decaf, ShotStyle::Normale, &observation);
        assert_eq!(recommendation.temperature, TemperatureAdvice::Hold { current: dec("92") });
        assert_eq!(recommendation.next_target_yield(), Some(dec("38")));
    }

    #[test]
    fn far_too_fast_outranks_harshness() {
        let mut observation = shot("16");
        observation.taste = Taste::Harsh;
        let light = BeanProfile::new("Ethiopia Guji", RoastLevel::Light);
        let recommendation = run(&light, ShotStyle::Normale, &observation);
        assert_eq!(
            recommendation.temperature,
            TemperatureAdvice::Suppressed {
                reason: Suppression::FlowTooFast
            }
        );
        assert_eq!(recommendation.firings(Rule::Temperature).count(), 1);
    }

    #[test]
    fn decaf_light_band_is_inverted() {
        // Light band [93, 96] capped at 92 becomes [93, 92]
        let decaf = BeanProfile::new("Ethiopia Decaf", RoastLevel::Light);

        let mut observation = shot("27");
        observation.taste = Taste::Sour;
        observation.temperature_celsius = dec("91");
        let recommendation = run(&decaf, ShotStyle::Normale, &observation);
        assert_eq!(recommendation.temperature.next(), Some(dec("92")));

        observation.temperature_celsius = dec("92");
        let recommendation = run(&decaf, ShotStyle::Normale, &observation);
        assert_eq!(recommendation.temperature, TemperatureAdvice::Hold { current: dec("92") });
        assert_eq!(recommendation.next_target_yield(), Some(dec("38")));

        observation.taste = Taste::Bitter;
        observation.temperature_celsius = dec("93");
        let recommendation = run(&decaf, ShotStyle::Normale, &observation);
        assert_eq!(recommendation.temperature, TemperatureAdvice::Hold { current: dec("93") });

        observation.temperature_celsius = dec("94");
        let recommendation = run(&decaf, ShotStyle::Normale, &observation);
        assert_eq!(recommendation.temperature.next(), Some(dec("93")));
    }
}

// =============================================================================
// Pre-infusion
// =============================================================================

mod pre_infusion {
    use super::*;

    #[test]
    fn channeling_drops_power() {
        let mut observation = shot("27");
        observation.texture = Texture::Channeling;
        let recommendation = run(&medium(), ShotStyle::Normale, &observation);
        assert_eq!(recommendation.pi_power.next, 55);

        observation.pi_power_percent = 80;
        let recommendation = run(&medium(), ShotStyle::Normale, &observation);
        assert_eq!(recommendation.pi_power.next, 70);

        let decaf = BeanProfile::new("Sumatra Decaf", RoastLevel::Medium);
        let recommendation = run(&decaf, ShotStyle::Normale, &observation);
        assert_eq!(recommendation.pi_power.next, 65);
    }

    #[test]
    fn watery_raises_power_within_clamp() {
        let mut observation = shot("20");
        observation.texture = Texture::Watery;
        observation.pi_power_percent = 99;
        let recommendation = run(&medium(), ShotStyle::Normale, &observation);
        assert_eq!(recommendation.pi_power.next, 99);

        observation.pi_power_percent = 70;
        let recommendation = run(&medium(), ShotStyle::Normale, &observation);
        assert_eq!(recommendation.pi_power.next, 75);
    }

    #[test]
    fn dry_extends_pi_time_only() {
        let mut observation = shot("27");
        observation.texture = Texture::Dry;
        let recommendation = run(&medium(), ShotStyle::Normale, &observation);
        assert_eq!(recommendation.pi_power.next, 65);
        assert_eq!(
            recommendation.pi_time.map(|i| i.extend_by_seconds),
            Some(dec("3"))
        );
        assert_eq!(recommendation.extraction, ExtractionAdjustment::Unchanged);
        assert!(recommendation.grind.is_optimal());
    }
}

// =============================================================================
// Properties
// =============================================================================

mod property_tests {
    use super::*;

    fn roast_strategy() -> impl Strategy<Value = RoastLevel> {
        prop_oneof![
            Just(RoastLevel::Light),
            Just(RoastLevel::Medium),
            Just(RoastLevel::Dark),
        ]
    }

    fn style_strategy() -> impl Strategy<Value = ShotStyle> {
        prop_oneof![
            Just(ShotStyle::Ristretto),
            Just(ShotStyle::Normale),
            Just(ShotStyle::Lungo),
            Just(ShotStyle::Custom),
        ]
    }

    fn taste_strategy() -> impl Strategy<Value = Taste> {
        prop_oneof![
            Just(Taste::Balanced),
            Just(Taste::Sour),
            Just(Taste::Bitter),
            Just(Taste::Harsh),
        ]
    }

    fn texture_strategy() -> impl Strategy<Value = Texture> {
        prop_oneof![
            Just(Texture::Syrupy),
            Just(Texture::Watery),
            Just(Texture::Dry),
            Just(Texture::Channeling),
        ]
    }

    /// Shot time in tenths of a second, 5.0s to 70.0s
    fn time_strategy() -> impl Strategy<Value = Decimal> {
        (50i64..=700).prop_map(|tenths| Decimal::new(tenths, 1))
    }

    fn observation_strategy() -> impl Strategy<Value = ShotObservation> {
        (
            time_strategy(),
            86i64..=96,
            55i32..=99,
            0i64..=600,
            taste_strategy(),
            texture_strategy(),
        )
            .prop_map(|(time, temp, pi, yield_tenths, taste, texture)| ShotObservation {
                grind: dec("15"),
                dose_grams: dec("18"),
                yield_grams: Decimal::new(yield_tenths, 1),
                time_seconds: time,
                temperature_celsius: Decimal::from(temp),
                pi_power_percent: pi,
                pi_time_seconds: dec("8"),
                taste,
                texture,
                two_stage: None,
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Grind delta is always a multiple of 0.5
        #[test]
        fn prop_grind_delta_is_half_step(
            roast in roast_strategy(),
            style in style_strategy(),
            observation in observation_strategy(),
        ) {
            let bean = BeanProfile::new("Test Bean", roast);
            let recommendation = run(&bean, style, &observation);
            let halves = recommendation.grind.delta * Decimal::TWO;
            prop_assert_eq!(halves, halves.trunc());
        }

        /// PI power always lands in 55..=99
        #[test]
        fn prop_pi_power_clamped(
            roast in roast_strategy(),
            observation in observation_strategy(),
            decaf in any::<bool>(),
        ) {
            let name = if decaf { "House Decaf" } else { "House Blend" };
            let bean = BeanProfile::new(name, roast);
            let recommendation = run(&bean, ShotStyle::Normale, &observation);
            prop_assert!((55..=99).contains(&recommendation.pi_power.next));
        }

        /// Dose and target-yield changes never fire together
        #[test]
        fn prop_dose_and_yield_exclusive(
            roast in roast_strategy(),
            style in style_strategy(),
            observation in observation_strategy(),
        ) {
            let bean = BeanProfile::new("Test Bean", roast);
            let recommendation = run(&bean, style, &observation);
            prop_assert!(
                recommendation.next_dose().is_none() || recommendation.next_target_yield().is_none()
            );
            prop_assert!(!(recommendation.fired(Rule::Dose)
                && recommendation
                    .firings(Rule::Ratio)
                    .any(|f| matches!(f.effect, Effect::TargetYieldTo(_)))));
        }

        /// Times inside the window never move the grind
        #[test]
        fn prop_in_window_zero_grind(
            roast in roast_strategy(),
            style in style_strategy(),
            mut observation in observation_strategy(),
            offset in 0i64..=50,
        ) {
            let bean = BeanProfile::new("Test Bean", roast);
            let targets = resolve_targets(style, observation.dose_grams, None);
            let time = (targets.time_min + Decimal::new(offset, 1)).min(targets.time_max);
            observation.time_seconds = time;
            let recommendation = evaluate(&bean, &targets, &observation, None, &clock());
            prop_assert_eq!(recommendation.grind.base_adjustment, Decimal::ZERO);
            prop_assert!(recommendation.grind.is_optimal());
        }

        /// Applying the grind advice and pulling in-window reaches a fixed point
        #[test]
        fn prop_grind_fixed_point(
            roast in roast_strategy(),
            style in style_strategy(),
            time in time_strategy(),
        ) {
            let bean = BeanProfile::new("Test Bean", roast);
            let mut observation = shot("27");
            observation.time_seconds = time;
            let first = run(&bean, style, &observation);

            let targets = resolve_targets(style, observation.dose_grams, None);
            let mut corrected = shot("27");
            corrected.grind = first.grind.next;
            corrected.time_seconds = targets.center();
            let second = evaluate(&bean, &targets, &corrected, None, &clock());

            prop_assert!(second.grind.is_optimal());
            prop_assert_eq!(second.grind.next, first.grind.next);
            prop_assert!(second.rationale.is_empty());
        }
    }
}
