//! Shot observation models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Shot styles with predefined targets
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum ShotStyle {
    Ristretto,
    #[default]
    Normale,
    Lungo,
    /// Two-stage low-pressure profile tuned for decaf
    SlayerLiteDecaf,
    Custom,
}

impl ShotStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShotStyle::Ristretto => "ristretto",
            ShotStyle::Normale => "normale",
            ShotStyle::Lungo => "lungo",
            ShotStyle::SlayerLiteDecaf => "slayer_lite_decaf",
            ShotStyle::Custom => "custom",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "ristretto" => Some(ShotStyle::Ristretto),
            "normale" => Some(ShotStyle::Normale),
            "lungo" => Some(ShotStyle::Lungo),
            "slayer_lite_decaf" => Some(ShotStyle::SlayerLiteDecaf),
            "custom" => Some(ShotStyle::Custom),
            _ => None,
        }
    }

    /// Parse a style label, falling back to Normale when unrecognized
    pub fn from_label(s: &str) -> Self {
        Self::from_str(s).unwrap_or_default()
    }
}

impl std::fmt::Display for ShotStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShotStyle::Ristretto => write!(f, "Ristretto (1:1.25)"),
            ShotStyle::Normale => write!(f, "Normale (1:2)"),
            ShotStyle::Lungo => write!(f, "Lungo (1:3)"),
            ShotStyle::SlayerLiteDecaf => write!(f, "Slayer-lite Decaf (1:2)"),
            ShotStyle::Custom => write!(f, "Custom"),
        }
    }
}

/// Taste balance reported for the shot
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Taste {
    #[default]
    Balanced,
    Sour,
    /// "Ashy" under the Slayer-lite profile
    Bitter,
    Harsh,
}

impl Taste {
    pub fn as_str(&self) -> &'static str {
        match self {
            Taste::Balanced => "balanced",
            Taste::Sour => "sour",
            Taste::Bitter => "bitter",
            Taste::Harsh => "harsh",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "balanced" => Some(Taste::Balanced),
            "sour" => Some(Taste::Sour),
            "bitter" | "ashy" => Some(Taste::Bitter),
            "harsh" => Some(Taste::Harsh),
            _ => None,
        }
    }
}

impl std::fmt::Display for Taste {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Taste::Balanced => write!(f, "Balanced"),
            Taste::Sour => write!(f, "Sour"),
            Taste::Bitter => write!(f, "Bitter"),
            Taste::Harsh => write!(f, "Harsh"),
        }
    }
}

/// Mouthfeel reported for the shot
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Texture {
    #[default]
    Syrupy,
    /// "Thin" under the Slayer-lite profile
    Watery,
    Dry,
    Channeling,
}

impl Texture {
    pub fn as_str(&self) -> &'static str {
        match self {
            Texture::Syrupy => "syrupy",
            Texture::Watery => "watery",
            Texture::Dry => "dry",
            Texture::Channeling => "channeling",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "syrupy" => Some(Texture::Syrupy),
            "watery" | "thin" => Some(Texture::Watery),
            "dry" => Some(Texture::Dry),
            "channeling" => Some(Texture::Channeling),
            _ => None,
        }
    }
}

impl std::fmt::Display for Texture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Texture::Syrupy => write!(f, "Syrupy"),
            Texture::Watery => write!(f, "Watery"),
            Texture::Dry => write!(f, "Dry"),
            Texture::Channeling => write!(f, "Channeling"),
        }
    }
}

/// Stream behaviour observed during a two-stage (Slayer-lite) shot
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TwoStageObservation {
    /// Whether a stream formed before the pump ramped to full pressure
    pub stream_before_ramp: bool,
    /// Seconds of flow during the low-pressure stage
    pub low_bar_flow_seconds: Decimal,
}

/// One pulled shot, as measured by the barista
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShotObservation {
    /// Grinder setting in machine-specific units
    pub grind: Decimal,
    pub dose_grams: Decimal,
    /// Zero means the yield was not weighed
    #[serde(default)]
    pub yield_grams: Decimal,
    pub time_seconds: Decimal,
    pub temperature_celsius: Decimal,
    pub pi_power_percent: i32,
    pub pi_time_seconds: Decimal,
    pub taste: Taste,
    pub texture: Texture,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub two_stage: Option<TwoStageObservation>,
}

impl ShotObservation {
    /// The measured yield, if one was entered
    pub fn measured_yield(&self) -> Option<Decimal> {
        (self.yield_grams > Decimal::ZERO).then_some(self.yield_grams)
    }
}

/// Manual grind sensitivity replacing the roast-level default
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CalibrationOverride {
    pub sensitivity: Decimal,
}

impl CalibrationOverride {
    pub const MIN: Decimal = Decimal::from_parts(5, 0, 0, false, 1);
    pub const MAX: Decimal = Decimal::from_parts(15, 0, 0, false, 1);

    pub fn new(sensitivity: Decimal) -> Self {
        Self { sensitivity }
    }
}
