//! Recommendation models produced by the rule engine

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::target::TargetProfile;

/// Rule set applied to a shot
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RuleProfile {
    Standard,
    SlayerLite,
}

impl std::fmt::Display for RuleProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleProfile::Standard => write!(f, "Standard"),
            RuleProfile::SlayerLite => write!(f, "Slayer-lite"),
        }
    }
}

/// Grind correction for the next shot
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GrindAdvice {
    pub current: Decimal,
    /// Signed seconds outside the time window, zero inside
    pub deviation: Decimal,
    pub base_adjustment: Decimal,
    /// None when the profile does not scale by sensitivity
    pub sensitivity: Option<Decimal>,
    /// Always a multiple of 0.5
    pub delta: Decimal,
    pub next: Decimal,
}

impl GrindAdvice {
    pub fn is_optimal(&self) -> bool {
        self.delta.is_zero()
    }
}

/// Dose or yield change; never both
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExtractionAdjustment {
    #[default]
    Unchanged,
    Dose { current: Decimal, next: Decimal },
    TargetYield { next: Decimal },
}

/// Why temperature advice was withheld
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Suppression {
    /// Erratic flow makes temperature feedback unreliable
    FlowTooFast,
    Harshness,
    /// Light roasts get a softer suggestion
    HarshnessLightRoast,
}

impl std::fmt::Display for Suppression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Suppression::FlowTooFast => write!(f, "Flow too fast. Ignore temperature until flow is fixed."),
            Suppression::Harshness => {
                write!(f, "Harshness detected. Check WDT and distribution for channeling.")
            }
            Suppression::HarshnessLightRoast => write!(
                f,
                "Harshness detected. Try -1°C or check puck prep (WDT, distribution)."
            ),
        }
    }
}

/// Brew temperature advice
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TemperatureAdvice {
    Hold { current: Decimal },
    Adjust { current: Decimal, next: Decimal },
    Suppressed { reason: Suppression },
}

impl TemperatureAdvice {
    /// Numeric next temperature, unless suppressed
    pub fn next(&self) -> Option<Decimal> {
        match self {
            TemperatureAdvice::Hold { current } => Some(*current),
            TemperatureAdvice::Adjust { next, .. } => Some(*next),
            TemperatureAdvice::Suppressed { .. } => None,
        }
    }
}

/// Pre-infusion power advice in percent
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PiPowerAdvice {
    pub current: i32,
    pub next: i32,
}

impl PiPowerAdvice {
    pub fn changed(&self) -> bool {
        self.current != self.next
    }
}

/// Instruction to lengthen pre-infusion
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PiTimeInstruction {
    pub extend_by_seconds: Decimal,
}

impl std::fmt::Display for PiTimeInstruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Dryness detected: increase pre-infusion time +{}s", self.extend_by_seconds)
    }
}

/// Bean age warning
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Freshness {
    NeedsRest { age_days: i64 },
    Aging { age_days: i64 },
}

impl std::fmt::Display for Freshness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Freshness::NeedsRest { age_days } => {
                write!(f, "Beans fresh ({}d). Rest needed.", age_days)
            }
            Freshness::Aging { age_days } => {
                write!(f, "Beans aging ({}d). Expect faster flow.", age_days)
            }
        }
    }
}

/// Measured yield outside tolerance of the target
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct YieldMiss {
    pub actual: Decimal,
    pub target: Decimal,
    pub tolerance: Decimal,
}

impl YieldMiss {
    pub fn difference(&self) -> Decimal {
        (self.actual - self.target).abs()
    }
}

impl std::fmt::Display for YieldMiss {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Yield {}g missed target {}g by {}g",
            self.actual,
            self.target,
            self.difference().round_dp(1)
        )
    }
}

/// Decaf-specific suggestion when the puck lacks structure
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DecafTip {
    pub extra_dose_grams: Decimal,
}

impl std::fmt::Display for DecafTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Decaf structure is weak. Consider dosing +{}g up.",
            self.extra_dose_grams
        )
    }
}

/// Standalone advisory alerts
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Alert {
    Channeling,
    PiPowerOutOfRange { current: i32, suggested: i32 },
    PiTimeTooShort { current: Decimal, minimum: Decimal },
}

impl std::fmt::Display for Alert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Alert::Channeling => write!(f, "Channeling detected: fix WDT and level the tamp."),
            Alert::PiPowerOutOfRange { current, suggested } => write!(
                f,
                "PI power {}% misses the 6-bar low-pressure stage; set ~{}%.",
                current, suggested
            ),
            Alert::PiTimeTooShort { current, minimum } => write!(
                f,
                "PI time {}s is too short for saturation and low-bar flow; use at least {}s.",
                current, minimum
            ),
        }
    }
}

/// Rule families in the engine
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    Grind,
    Dose,
    Ratio,
    Temperature,
    PiPower,
    PiTime,
    MachineConfig,
    Freshness,
    YieldMiss,
    DecafTip,
    Channeling,
}

impl Rule {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rule::Grind => "grind",
            Rule::Dose => "dose",
            Rule::Ratio => "ratio",
            Rule::Temperature => "temperature",
            Rule::PiPower => "pi_power",
            Rule::PiTime => "pi_time",
            Rule::MachineConfig => "machine_config",
            Rule::Freshness => "freshness",
            Rule::YieldMiss => "yield_miss",
            Rule::DecafTip => "decaf_tip",
            Rule::Channeling => "channeling",
        }
    }
}

/// What a fired rule did
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Effect {
    GrindDelta(Decimal),
    DoseTo(Decimal),
    TargetYieldTo(Decimal),
    TemperatureTo(Decimal),
    TemperatureSuppressed(Suppression),
    PiPowerTo(i32),
    PiTimeExtendBy(Decimal),
    Warning,
    NoChange,
}

impl std::fmt::Display for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Effect::GrindDelta(delta) => write!(f, "grind {:+}", delta),
            Effect::DoseTo(dose) => write!(f, "dose -> {}g", dose),
            Effect::TargetYieldTo(target) => write!(f, "target yield -> {}g", target),
            Effect::TemperatureTo(temp) => write!(f, "temperature -> {}°C", temp),
            Effect::TemperatureSuppressed(reason) => write!(f, "temperature withheld: {}", reason),
            Effect::PiPowerTo(power) => write!(f, "PI power -> {}%", power),
            Effect::PiTimeExtendBy(secs) => write!(f, "PI time +{}s", secs),
            Effect::Warning => write!(f, "warning"),
            Effect::NoChange => write!(f, "no change"),
        }
    }
}

/// One entry of the rationale log
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuleFiring {
    pub rule: Rule,
    pub condition: String,
    pub effect: Effect,
}

impl RuleFiring {
    pub fn new(rule: Rule, condition: impl Into<String>, effect: Effect) -> Self {
        Self {
            rule,
            condition: condition.into(),
            effect,
        }
    }
}

impl std::fmt::Display for RuleFiring {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.rule.as_str(), self.condition, self.effect)
    }
}

/// Advice for the next shot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Recommendation {
    pub profile: RuleProfile,
    pub targets: TargetProfile,
    pub grind: GrindAdvice,
    pub extraction: ExtractionAdjustment,
    pub temperature: TemperatureAdvice,
    pub pi_power: PiPowerAdvice,
    pub pi_time: Option<PiTimeInstruction>,
    pub freshness: Option<Freshness>,
    pub yield_miss: Option<YieldMiss>,
    pub decaf_tip: Option<DecafTip>,
    pub alerts: Vec<Alert>,
    pub rationale: Vec<RuleFiring>,
}

impl Recommendation {
    pub fn next_dose(&self) -> Option<Decimal> {
        match self.extraction {
            ExtractionAdjustment::Dose { next, .. } => Some(next),
            _ => None,
        }
    }

    pub fn next_target_yield(&self) -> Option<Decimal> {
        match self.extraction {
            ExtractionAdjustment::TargetYield { next } => Some(next),
            _ => None,
        }
    }

    /// Whether any rationale entry came from `rule`
    pub fn fired(&self, rule: Rule) -> bool {
        self.rationale.iter().any(|firing| firing.rule == rule)
    }

    /// Rationale entries from `rule`, in evaluation order
    pub fn firings(&self, rule: Rule) -> impl Iterator<Item = &RuleFiring> {
        self.rationale.iter().filter(move |firing| firing.rule == rule)
    }
}
