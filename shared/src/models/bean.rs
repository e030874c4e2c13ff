//! Bean profile models

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Roast levels the advisor distinguishes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RoastLevel {
    Light,
    Medium,
    Dark,
}

impl RoastLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoastLevel::Light => "light",
            RoastLevel::Medium => "medium",
            RoastLevel::Dark => "dark",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "light" => Some(RoastLevel::Light),
            "medium" => Some(RoastLevel::Medium),
            "dark" => Some(RoastLevel::Dark),
            _ => None,
        }
    }

    /// Default grind sensitivity multiplier.
    ///
    /// Darker roasts are more porous, so one grind step moves flow further
    /// and the correction is damped.
    pub fn grind_sensitivity(&self) -> Decimal {
        match self {
            RoastLevel::Light => Decimal::ONE,
            RoastLevel::Medium => Decimal::new(8, 1),
            RoastLevel::Dark => Decimal::new(6, 1),
        }
    }
}

impl std::fmt::Display for RoastLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoastLevel::Light => write!(f, "Light"),
            RoastLevel::Medium => write!(f, "Medium"),
            RoastLevel::Dark => write!(f, "Dark"),
        }
    }
}

/// The beans being pulled
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BeanProfile {
    pub name: String,
    pub roast_level: RoastLevel,
    /// Unknown roast dates suppress freshness diagnostics
    pub roast_date: Option<NaiveDate>,
}

impl BeanProfile {
    pub fn new(name: impl Into<String>, roast_level: RoastLevel) -> Self {
        Self {
            name: name.into(),
            roast_level,
            roast_date: None,
        }
    }

    pub fn roasted_on(mut self, date: NaiveDate) -> Self {
        self.roast_date = Some(date);
        self
    }

    /// Case-insensitive match on "decaf" anywhere in the name
    pub fn is_decaf(&self) -> bool {
        is_decaf_name(&self.name)
    }

    /// Days since roast, when the roast date is known
    pub fn age_days(&self, today: NaiveDate) -> Option<i64> {
        self.roast_date.map(|roasted| (today - roasted).num_days())
    }
}

/// Decaf detection shared by the engine and the bindings
pub fn is_decaf_name(name: &str) -> bool {
    name.to_lowercase().contains("decaf")
}
